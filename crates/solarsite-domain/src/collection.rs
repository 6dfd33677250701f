//! Caller-owned source collection and the collection flow
//!
//! [`SourceCollection`] holds at most one record per [`SourceKind`]:
//! re-supplying a kind replaces the earlier record. [`CollectionFlow`] wraps a
//! collection in the `collecting -> arbitrating -> done` state machine.

use crate::traits::MergedRecordSink;
use crate::{arbitrate_with_report, Arbitration, DomainError, SourceKind, SourceRecord};

/// Ordered collection of source records with replace-by-kind semantics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCollection {
    records: Vec<SourceRecord>,
}

impl SourceCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any record of the same kind
    ///
    /// The new record goes to the end of the sequence. Returns the record it
    /// replaced, if any.
    pub fn supply(&mut self, record: SourceRecord) -> Option<SourceRecord> {
        let replaced = self
            .records
            .iter()
            .position(|r| r.kind() == record.kind())
            .map(|pos| self.records.remove(pos));
        self.records.push(record);
        replaced
    }

    /// Remove the record of a kind, if present
    pub fn remove_kind(&mut self, kind: SourceKind) -> Option<SourceRecord> {
        let pos = self.records.iter().position(|r| r.kind() == kind)?;
        Some(self.records.remove(pos))
    }

    /// Record of a kind, if present
    pub fn get(&self, kind: SourceKind) -> Option<&SourceRecord> {
        self.records.iter().find(|r| r.kind() == kind)
    }

    /// Records in supply order
    pub fn as_slice(&self) -> &[SourceRecord] {
        &self.records
    }

    /// Iterate records in supply order
    pub fn iter(&self) -> std::slice::Iter<'_, SourceRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard all records
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a> IntoIterator for &'a SourceCollection {
    type Item = &'a SourceRecord;
    type IntoIter = std::slice::Iter<'a, SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<SourceRecord> for SourceCollection {
    fn from_iter<I: IntoIterator<Item = SourceRecord>>(iter: I) -> Self {
        let mut collection = SourceCollection::new();
        for record in iter {
            collection.supply(record);
        }
        collection
    }
}

/// State of a [`CollectionFlow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Accepting source records
    Collecting,
    /// Arbitration in progress
    Arbitrating,
    /// Result available; terminal until reset
    Done,
}

impl FlowState {
    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Collecting => "collecting",
            FlowState::Arbitrating => "arbitrating",
            FlowState::Done => "done",
        }
    }
}

/// The `collecting -> arbitrating -> done` flow over a caller-owned collection
///
/// `arbitrating` always moves on to `done`. `done` accepts nothing until
/// [`CollectionFlow::reset`] discards every source record.
#[derive(Debug, Clone)]
pub struct CollectionFlow {
    state: FlowState,
    sources: SourceCollection,
    result: Option<Arbitration>,
}

impl Default for CollectionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionFlow {
    /// Start a new flow in the collecting state
    pub fn new() -> Self {
        Self {
            state: FlowState::Collecting,
            sources: SourceCollection::new(),
            result: None,
        }
    }

    /// Current state
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Collected sources
    pub fn sources(&self) -> &SourceCollection {
        &self.sources
    }

    /// Arbitration result, once done
    pub fn result(&self) -> Option<&Arbitration> {
        self.result.as_ref()
    }

    /// Supply a source record (replace-by-kind)
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTransition`] unless collecting
    pub fn supply(&mut self, record: SourceRecord) -> Result<Option<SourceRecord>, DomainError> {
        self.require_collecting("supply a source")?;
        Ok(self.sources.supply(record))
    }

    /// Withdraw the record of a kind while collecting
    pub fn withdraw(&mut self, kind: SourceKind) -> Result<Option<SourceRecord>, DomainError> {
        self.require_collecting("withdraw a source")?;
        Ok(self.sources.remove_kind(kind))
    }

    /// Run arbitration, push the merged record to `sink`, and finish the flow
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTransition`] unless collecting
    pub fn arbitrate<S: MergedRecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<&Arbitration, DomainError> {
        self.require_collecting("arbitrate")?;

        self.state = FlowState::Arbitrating;
        let arbitration = arbitrate_with_report(self.sources.as_slice());
        sink.on_final_data_update(&arbitration.record);
        self.state = FlowState::Done;

        Ok(self.result.insert(arbitration))
    }

    /// Discard every source record and return to collecting
    pub fn reset(&mut self) {
        self.sources.clear();
        self.result = None;
        self.state = FlowState::Collecting;
    }

    fn require_collecting(&self, action: &'static str) -> Result<(), DomainError> {
        if self.state != FlowState::Collecting {
            return Err(DomainError::InvalidTransition {
                from: self.state.as_str(),
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MergedRecord, SiteField, SiteFields};

    fn maps(lat: f64) -> SourceRecord {
        SourceRecord::new(
            "Satellite",
            SourceKind::Maps,
            SiteFields::new().with_number(SiteField::Latitude, lat).unwrap(),
            0,
        )
    }

    fn bill(postcode: &str) -> SourceRecord {
        SourceRecord::new(
            "Bill",
            SourceKind::Bill,
            SiteFields::new().with_text(SiteField::Postcode, postcode).unwrap(),
            0,
        )
    }

    #[test]
    fn test_replace_by_kind() {
        let mut collection = SourceCollection::new();
        assert!(collection.supply(maps(1.0)).is_none());
        let replaced = collection.supply(maps(2.0)).unwrap();

        assert_eq!(replaced.fields().latitude(), Some(1.0));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(SourceKind::Maps).unwrap().fields().latitude(), Some(2.0));
    }

    #[test]
    fn test_replacement_moves_to_end() {
        let mut collection = SourceCollection::new();
        collection.supply(maps(1.0));
        collection.supply(bill("2000"));
        collection.supply(maps(2.0));

        let kinds: Vec<SourceKind> = collection.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![SourceKind::Bill, SourceKind::Maps]);
    }

    #[test]
    fn test_from_iterator_applies_replacement() {
        let collection: SourceCollection = vec![maps(1.0), bill("2000"), maps(3.0)].into_iter().collect();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(SourceKind::Maps).unwrap().fields().latitude(), Some(3.0));
    }

    #[test]
    fn test_remove_kind() {
        let mut collection = SourceCollection::new();
        collection.supply(bill("2000"));
        assert!(collection.remove_kind(SourceKind::Maps).is_none());
        assert!(collection.remove_kind(SourceKind::Bill).is_some());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_flow_happy_path() {
        let mut flow = CollectionFlow::new();
        assert_eq!(flow.state(), FlowState::Collecting);

        flow.supply(bill("2000")).unwrap();
        flow.supply(maps(-33.9)).unwrap();

        let mut received: Vec<MergedRecord> = Vec::new();
        let mut sink = |record: &MergedRecord| received.push(record.clone());
        let result = flow.arbitrate(&mut sink).unwrap();
        assert_eq!(result.record.postcode(), Some("2000"));

        assert_eq!(flow.state(), FlowState::Done);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].latitude(), Some(-33.9));
    }

    #[test]
    fn test_done_is_terminal_until_reset() {
        let mut flow = CollectionFlow::new();
        flow.supply(bill("2000")).unwrap();
        flow.arbitrate(&mut |_: &MergedRecord| {}).unwrap();

        assert!(matches!(
            flow.supply(maps(1.0)),
            Err(DomainError::InvalidTransition { from: "done", .. })
        ));
        assert!(flow.arbitrate(&mut |_: &MergedRecord| {}).is_err());
        assert!(flow.withdraw(SourceKind::Bill).is_err());
        assert!(flow.result().is_some());

        flow.reset();
        assert_eq!(flow.state(), FlowState::Collecting);
        assert!(flow.sources().is_empty());
        assert!(flow.result().is_none());
        assert!(flow.supply(maps(1.0)).is_ok());
    }

    #[test]
    fn test_arbitrate_empty_collection() {
        let mut flow = CollectionFlow::new();
        let result = flow.arbitrate(&mut |_: &MergedRecord| {}).unwrap();
        assert!(result.record.is_empty());
        assert_eq!(flow.state(), FlowState::Done);
    }
}
