//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and the
//! collaborators that feed it (OCR, map analysis, manual forms) or consume
//! its output. Implementations live in other crates.

use crate::{MergedRecord, SourceKind, SourceRecord};

/// A collaborator that produces source records
///
/// Implemented by the bill-OCR, proposal-OCR, map and manual-entry adapters.
/// A failed fetch contributes no record; the error goes to the caller.
pub trait SourceAdapter {
    /// Error type for fetch operations
    type Error;

    /// Kind of record this adapter produces
    fn kind(&self) -> SourceKind;

    /// Produce a fresh source record
    fn fetch(&mut self) -> Result<SourceRecord, Self::Error>;
}

/// Downstream consumer of arbitration results
///
/// Receives every freshly computed merged record. Closures taking
/// `&MergedRecord` implement it directly.
pub trait MergedRecordSink {
    /// Called with each new merged record
    fn on_final_data_update(&mut self, record: &MergedRecord);
}

impl<F> MergedRecordSink for F
where
    F: FnMut(&MergedRecord),
{
    fn on_final_data_update(&mut self, record: &MergedRecord) {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CollectionFlow, SiteField, SiteFields};

    /// Adapter that replays fixed postcodes
    struct ReplayAdapter {
        postcodes: Vec<&'static str>,
    }

    impl SourceAdapter for ReplayAdapter {
        type Error = String;

        fn kind(&self) -> SourceKind {
            SourceKind::Manual
        }

        fn fetch(&mut self) -> Result<SourceRecord, Self::Error> {
            let postcode = self.postcodes.pop().ok_or_else(|| "exhausted".to_string())?;
            let fields = SiteFields::new()
                .with_text(SiteField::Postcode, postcode)
                .map_err(|e| e.to_string())?;
            Ok(SourceRecord::new("Manual Entry", self.kind(), fields, 0))
        }
    }

    struct CountingSink(usize);

    impl MergedRecordSink for CountingSink {
        fn on_final_data_update(&mut self, _record: &MergedRecord) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_failed_fetch_contributes_nothing() {
        let mut adapter = ReplayAdapter { postcodes: vec!["2000"] };
        let mut flow = CollectionFlow::new();

        for _ in 0..2 {
            if let Ok(record) = adapter.fetch() {
                flow.supply(record).unwrap();
            }
        }

        assert_eq!(flow.sources().len(), 1);
        let mut sink = CountingSink(0);
        let result = flow.arbitrate(&mut sink).unwrap();
        assert_eq!(result.record.postcode(), Some("2000"));
        assert_eq!(sink.0, 1);
    }
}
