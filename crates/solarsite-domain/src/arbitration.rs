//! Source arbitration
//!
//! Merges any number of [`SourceRecord`]s into one [`MergedRecord`], picking
//! exactly one contributing source per field:
//!
//! 1. No source defines the field: it is omitted.
//! 2. One source defines it: that value is used, whatever its confidence.
//! 3. Otherwise the first matching entry of [`PRIORITY_RULES`] wins.
//! 4. With no matching rule, the strictly highest confidence wins; ties
//!    resolve to the earliest candidate in input order.
//!
//! Values are copied verbatim. Arbitration is pure and total: an empty input
//! yields an empty record.

use crate::{Confidence, MergedRecord, SiteField, SiteFields, SourceId, SourceKind, SourceRecord};

/// A declarative kind-priority rule for a set of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityRule {
    /// Evaluation order; lower ranks are tried first
    pub rank: u8,
    /// Fields the rule governs
    pub fields: &'static [SiteField],
    /// Kind that wins when it is among the candidates
    pub kind: SourceKind,
}

impl PriorityRule {
    /// Whether this rule governs `field`
    pub fn applies_to(&self, field: SiteField) -> bool {
        self.fields.contains(&field)
    }
}

/// Kind-priority rules in evaluation order
///
/// - Location and shading come from map analysis
/// - Roof geometry comes from the installer proposal
/// - The address comes from the electricity bill
pub const PRIORITY_RULES: [PriorityRule; 3] = [
    PriorityRule {
        rank: 0,
        fields: &[SiteField::Latitude, SiteField::Longitude, SiteField::ShadingFactor],
        kind: SourceKind::Maps,
    },
    PriorityRule {
        rank: 1,
        fields: &[SiteField::RoofTilt, SiteField::RoofAzimuth],
        kind: SourceKind::Proposal,
    },
    PriorityRule {
        rank: 2,
        fields: &[SiteField::Address],
        kind: SourceKind::Bill,
    },
];

/// Rules governing `field`, in evaluation order
pub fn rules_for(field: SiteField) -> impl Iterator<Item = &'static PriorityRule> {
    PRIORITY_RULES.iter().filter(move |rule| rule.applies_to(field))
}

/// Why a particular source was chosen for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Only one source defined the field
    SingleSource,
    /// A kind-priority rule selected the source
    KindPriority {
        /// Rank of the rule that fired
        rank: u8,
        /// Kind the rule prefers
        kind: SourceKind,
    },
    /// Highest confidence among the candidates (earliest on ties)
    HighestConfidence,
}

impl Resolution {
    /// Short label for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::SingleSource => "single-source",
            Resolution::KindPriority { .. } => "kind-priority",
            Resolution::HighestConfidence => "highest-confidence",
        }
    }
}

/// Per-field outcome of an arbitration run
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResolution {
    /// The field
    pub field: SiteField,
    /// Index of the chosen source in the input sequence
    pub source_index: usize,
    /// Identifier of the chosen source
    pub source_id: SourceId,
    /// Kind of the chosen source
    pub kind: SourceKind,
    /// How the choice was made
    pub resolution: Resolution,
    /// Number of sources that defined the field
    pub candidate_count: usize,
    /// Whether every candidate supplied the same value
    pub agreed: bool,
    /// Highest confidence among the candidates
    pub max_confidence: Confidence,
}

/// Merged record plus per-field diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Arbitration {
    /// The merged record
    pub record: MergedRecord,
    /// One entry per present field, in canonical field order
    pub resolutions: Vec<FieldResolution>,
}

impl Arbitration {
    /// Diagnostics for one field, if it is present in the record
    pub fn resolution(&self, field: SiteField) -> Option<&FieldResolution> {
        self.resolutions.iter().find(|r| r.field == field)
    }

    /// Fields whose candidates disagreed
    pub fn conflicts(&self) -> impl Iterator<Item = &FieldResolution> {
        self.resolutions.iter().filter(|r| !r.agreed)
    }
}

/// Merge `sources` into a single record
///
/// # Examples
///
/// ```
/// use solarsite_domain::{arbitrate, SiteField, SiteFields, SourceKind, SourceRecord};
///
/// let bill = SourceRecord::new(
///     "Bill",
///     SourceKind::Bill,
///     SiteFields::new().with_number(SiteField::RoofTilt, 10.0).unwrap(),
///     0,
/// );
/// let proposal = SourceRecord::new(
///     "Proposal",
///     SourceKind::Proposal,
///     SiteFields::new().with_number(SiteField::RoofTilt, 20.0).unwrap(),
///     0,
/// );
///
/// assert_eq!(arbitrate(&[bill, proposal]).roof_tilt(), Some(20.0));
/// assert!(arbitrate(&[]).is_empty());
/// ```
pub fn arbitrate(sources: &[SourceRecord]) -> MergedRecord {
    arbitrate_with_report(sources).record
}

/// Merge `sources` and report how each field was resolved
pub fn arbitrate_with_report(sources: &[SourceRecord]) -> Arbitration {
    let mut merged = SiteFields::new();
    let mut resolutions = Vec::new();

    for field in SiteField::ALL {
        let candidates: Vec<(usize, &SourceRecord)> = sources
            .iter()
            .enumerate()
            .filter(|(_, source)| source.fields().contains(field))
            .collect();

        let Some((chosen, resolution)) = select(field, &candidates) else {
            continue;
        };
        let (source_index, source) = candidates[chosen];

        merged.copy_field(field, source.fields());
        resolutions.push(FieldResolution {
            field,
            source_index,
            source_id: source.id(),
            kind: source.kind(),
            resolution,
            candidate_count: candidates.len(),
            agreed: candidates_agree(field, &candidates),
            max_confidence: candidates
                .iter()
                .fold(Confidence::ZERO, |acc, (_, s)| acc.max(s.confidence())),
        });
    }

    Arbitration {
        record: MergedRecord::from_fields(merged),
        resolutions,
    }
}

/// Pick a position in `candidates`, or `None` when there are none
fn select(field: SiteField, candidates: &[(usize, &SourceRecord)]) -> Option<(usize, Resolution)> {
    match candidates.len() {
        0 => return None,
        1 => return Some((0, Resolution::SingleSource)),
        _ => {}
    }

    for rule in rules_for(field) {
        if let Some(pos) = candidates.iter().position(|(_, s)| s.kind() == rule.kind) {
            return Some((
                pos,
                Resolution::KindPriority {
                    rank: rule.rank,
                    kind: rule.kind,
                },
            ));
        }
    }

    let mut best = 0;
    for (pos, (_, source)) in candidates.iter().enumerate().skip(1) {
        if source.confidence() > candidates[best].1.confidence() {
            best = pos;
        }
    }
    Some((best, Resolution::HighestConfidence))
}

fn candidates_agree(field: SiteField, candidates: &[(usize, &SourceRecord)]) -> bool {
    let mut values = candidates.iter().filter_map(|(_, s)| s.fields().get(field));
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;

    fn record(kind: SourceKind, fields: SiteFields) -> SourceRecord {
        SourceRecord::new(kind.default_name(), kind, fields, 0)
    }

    fn with_confidence(kind: SourceKind, fields: SiteFields, confidence: f64) -> SourceRecord {
        record(kind, fields).with_confidence(Confidence::new(confidence).unwrap())
    }

    fn number(field: SiteField, value: f64) -> SiteFields {
        SiteFields::new().with_number(field, value).unwrap()
    }

    fn text(field: SiteField, value: &str) -> SiteFields {
        SiteFields::new().with_text(field, value).unwrap()
    }

    #[test]
    fn test_rules_in_rank_order() {
        let ranks: Vec<u8> = PRIORITY_RULES.iter().map(|r| r.rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_at_most_one_rule_per_field() {
        for field in SiteField::ALL {
            assert!(rules_for(field).count() <= 1, "{} has several rules", field);
        }
        assert_eq!(rules_for(SiteField::Postcode).count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let result = arbitrate_with_report(&[]);
        assert!(result.record.is_empty());
        assert!(result.resolutions.is_empty());
    }

    #[test]
    fn test_single_source_pass_through_ignores_confidence() {
        let low = with_confidence(SourceKind::Manual, number(SiteField::RoofTilt, 30.0), 0.1);
        let other = record(SourceKind::Maps, number(SiteField::Latitude, -33.0));

        let result = arbitrate_with_report(&[low, other]);
        assert_eq!(result.record.roof_tilt(), Some(30.0));
        let res = result.resolution(SiteField::RoofTilt).unwrap();
        assert_eq!(res.resolution, Resolution::SingleSource);
        assert_eq!(res.source_index, 0);
        assert!(res.agreed);
    }

    #[test]
    fn test_maps_priority_for_location() {
        let bill = record(SourceKind::Bill, number(SiteField::Latitude, 1.0));
        let maps = record(SourceKind::Maps, number(SiteField::Latitude, 2.0));

        let result = arbitrate_with_report(&[bill, maps]);
        assert_eq!(result.record.latitude(), Some(2.0));
        assert_eq!(
            result.resolution(SiteField::Latitude).unwrap().resolution,
            Resolution::KindPriority { rank: 0, kind: SourceKind::Maps }
        );
    }

    #[test]
    fn test_maps_priority_beats_higher_confidence() {
        let manual = with_confidence(SourceKind::Manual, number(SiteField::ShadingFactor, 0.05), 1.0);
        let maps = with_confidence(SourceKind::Maps, number(SiteField::ShadingFactor, 0.2), 0.3);
        assert_eq!(arbitrate(&[manual, maps]).shading_factor(), Some(0.2));
    }

    #[test]
    fn test_proposal_priority_for_roof_geometry() {
        let bill = record(SourceKind::Bill, number(SiteField::RoofTilt, 10.0));
        let proposal = record(SourceKind::Proposal, number(SiteField::RoofTilt, 20.0));
        assert_eq!(arbitrate(&[bill, proposal]).roof_tilt(), Some(20.0));
    }

    #[test]
    fn test_bill_priority_for_address() {
        let maps = with_confidence(SourceKind::Maps, text(SiteField::Address, "A"), 0.9);
        let bill = with_confidence(SourceKind::Bill, text(SiteField::Address, "B"), 0.8);
        assert_eq!(arbitrate(&[maps, bill]).address(), Some("B"));
    }

    #[test]
    fn test_confidence_fallback() {
        let low = with_confidence(SourceKind::Bill, text(SiteField::Postcode, "2000"), 0.7);
        let high = with_confidence(SourceKind::Manual, text(SiteField::Postcode, "2001"), 0.9);

        let result = arbitrate_with_report(&[low, high]);
        assert_eq!(result.record.postcode(), Some("2001"));
        let res = result.resolution(SiteField::Postcode).unwrap();
        assert_eq!(res.resolution, Resolution::HighestConfidence);
        assert_eq!(res.source_index, 1);
        assert_eq!(res.max_confidence.value(), 0.9);
        assert!(!res.agreed);
    }

    #[test]
    fn test_rule_without_matching_kind_falls_back_to_confidence() {
        let bill = with_confidence(SourceKind::Bill, number(SiteField::Latitude, 1.0), 0.6);
        let manual = with_confidence(SourceKind::Manual, number(SiteField::Latitude, 3.0), 0.95);
        assert_eq!(arbitrate(&[bill, manual]).latitude(), Some(3.0));
    }

    #[test]
    fn test_tie_resolves_to_first() {
        let first = with_confidence(SourceKind::Bill, text(SiteField::Postcode, "first"), 0.8);
        let second = with_confidence(SourceKind::Manual, text(SiteField::Postcode, "second"), 0.8);
        assert_eq!(arbitrate(&[first, second]).postcode(), Some("first"));
    }

    #[test]
    fn test_agreement_reported() {
        let a = record(SourceKind::Bill, text(SiteField::Postcode, "2000"));
        let b = record(SourceKind::Proposal, text(SiteField::Postcode, "2000"));

        let result = arbitrate_with_report(&[a, b]);
        let res = result.resolution(SiteField::Postcode).unwrap();
        assert!(res.agreed);
        assert_eq!(res.candidate_count, 2);
        assert_eq!(result.conflicts().count(), 0);
    }

    #[test]
    fn test_fields_resolved_independently() {
        let bill = record(
            SourceKind::Bill,
            SiteFields::new()
                .with_text(SiteField::Address, "Bill St")
                .unwrap()
                .with_number(SiteField::Latitude, 1.0)
                .unwrap(),
        );
        let maps = record(
            SourceKind::Maps,
            SiteFields::new()
                .with_text(SiteField::Address, "Map St")
                .unwrap()
                .with_number(SiteField::Latitude, 2.0)
                .unwrap(),
        );

        let merged = arbitrate(&[bill, maps]);
        assert_eq!(merged.get(SiteField::Address), Some(FieldValue::Text("Bill St")));
        assert_eq!(merged.get(SiteField::Latitude), Some(FieldValue::Number(2.0)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = SourceKind> {
        prop_oneof![
            Just(SourceKind::Bill),
            Just(SourceKind::Proposal),
            Just(SourceKind::Maps),
            Just(SourceKind::Manual),
        ]
    }

    prop_compose! {
        fn source_strategy()(
            kind in kind_strategy(),
            confidence in 0.0f64..=1.0,
            postcode in proptest::option::of("[0-9]{4}"),
            tilt in proptest::option::of(0.0f64..90.0),
            lat in proptest::option::of(-90.0f64..90.0),
        ) -> SourceRecord {
            let mut fields = SiteFields::new();
            if let Some(p) = postcode {
                fields.set_text(SiteField::Postcode, p).unwrap();
            }
            if let Some(t) = tilt {
                fields.set_number(SiteField::RoofTilt, t).unwrap();
            }
            if let Some(l) = lat {
                fields.set_number(SiteField::Latitude, l).unwrap();
            }
            SourceRecord::new(kind.default_name(), kind, fields, 0)
                .with_confidence(Confidence::new(confidence).unwrap())
        }
    }

    proptest! {
        /// Property: repeated runs over the same input are identical
        #[test]
        fn test_determinism(sources in proptest::collection::vec(source_strategy(), 0..6)) {
            prop_assert_eq!(arbitrate_with_report(&sources), arbitrate_with_report(&sources));
        }

        /// Property: every merged value is the chosen source's value, verbatim
        #[test]
        fn test_field_provenance(sources in proptest::collection::vec(source_strategy(), 0..6)) {
            let result = arbitrate_with_report(&sources);
            for (field, value) in result.record.iter() {
                let res = result.resolution(field).unwrap();
                prop_assert_eq!(sources[res.source_index].fields().get(field), Some(value));
            }
        }

        /// Property: a field is present iff at least one source defines it
        #[test]
        fn test_presence(sources in proptest::collection::vec(source_strategy(), 0..6)) {
            let merged = arbitrate(&sources);
            for field in SiteField::ALL {
                let defined = sources.iter().any(|s| s.fields().contains(field));
                prop_assert_eq!(merged.get(field).is_some(), defined);
            }
        }

        /// Property: the chosen source never has lower confidence than another
        /// candidate unless a kind rule fired
        #[test]
        fn test_confidence_fallback_picks_max(sources in proptest::collection::vec(source_strategy(), 0..6)) {
            let result = arbitrate_with_report(&sources);
            for res in &result.resolutions {
                if res.resolution == Resolution::HighestConfidence {
                    let chosen = sources[res.source_index].confidence();
                    prop_assert_eq!(chosen, res.max_confidence);
                }
            }
        }
    }
}
