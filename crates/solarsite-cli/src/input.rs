//! JSON source-record input.
//!
//! Sources arrive as an array of objects:
//!
//! ```json
//! [
//!   {
//!     "name": "Electricity Bill",
//!     "kind": "bill",
//!     "confidence": 0.8,
//!     "observedAt": 1700000000000,
//!     "fields": {"address": "12 Harbour Rd", "postcode": "2000"}
//!   }
//! ]
//! ```
//!
//! `name`, `confidence`, and `observedAt` are optional.

use crate::config::ConfidenceTable;
use crate::error::{CliError, Result};
use serde::Deserialize;
use serde_json::Value;
use solarsite_domain::traits::SourceAdapter;
use solarsite_domain::{Confidence, SiteField, SiteFields, SourceKind, SourceRecord};
use std::collections::BTreeMap;

/// Source record definition for JSON input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceDefinition {
    #[serde(default)]
    name: Option<String>,
    kind: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    observed_at: Option<u64>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl SourceDefinition {
    /// Convert to a domain source record.
    pub fn to_record(&self, confidence: &ConfidenceTable, now: u64) -> Result<SourceRecord> {
        let kind: SourceKind = self.kind.parse()?;

        let mut fields = SiteFields::new();
        for (name, value) in &self.fields {
            let field: SiteField = name.parse()?;
            if fields.contains(field) {
                return Err(CliError::InvalidInput(format!("{} is given more than once", field)));
            }
            set_json_value(&mut fields, field, value)?;
        }

        let confidence = match self.confidence {
            Some(value) => Confidence::new(value)?,
            None => confidence.confidence_for(kind)?,
        };
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| kind.default_name().to_string());

        Ok(SourceRecord::new(name, kind, fields, self.observed_at.unwrap_or(now)).with_confidence(confidence))
    }
}

/// Parse a JSON array of source definitions into records.
pub fn parse_sources(json: &str, confidence: &ConfidenceTable) -> Result<Vec<SourceRecord>> {
    let definitions: Vec<SourceDefinition> = serde_json::from_str(json)?;
    let now = now_millis();
    definitions
        .iter()
        .map(|def| def.to_record(confidence, now))
        .collect()
}

/// Parse a value typed on the command line for a field.
pub fn parse_field_value(fields: &mut SiteFields, field: SiteField, raw: &str) -> Result<()> {
    if field.is_numeric() {
        let value: f64 = raw
            .parse()
            .map_err(|_| CliError::InvalidInput(format!("{} expects a number, got '{}'", field, raw)))?;
        fields.set_number(field, value)?;
    } else {
        fields.set_text(field, raw)?;
    }
    Ok(())
}

/// Manual-entry source built up one typed field at a time.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    fields: SiteFields,
    confidence: Confidence,
}

impl ManualEntry {
    /// Start from existing fields.
    pub fn new(fields: SiteFields, confidence: Confidence) -> Self {
        Self { fields, confidence }
    }

    /// Set a field from its command-line text.
    pub fn set(&mut self, field: SiteField, raw: &str) -> Result<()> {
        parse_field_value(&mut self.fields, field, raw)
    }
}

impl SourceAdapter for ManualEntry {
    type Error = CliError;

    fn kind(&self) -> SourceKind {
        SourceKind::Manual
    }

    fn fetch(&mut self) -> Result<SourceRecord> {
        Ok(SourceRecord::new(
            SourceKind::Manual.default_name(),
            SourceKind::Manual,
            self.fields.clone(),
            now_millis(),
        )
        .with_confidence(self.confidence))
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

fn set_json_value(fields: &mut SiteFields, field: SiteField, value: &Value) -> Result<()> {
    match value {
        Value::Number(n) if field.is_numeric() => {
            let number = n
                .as_f64()
                .ok_or_else(|| CliError::InvalidInput(format!("{} is not a finite number", field)))?;
            fields.set_number(field, number)?;
        }
        Value::String(s) if !field.is_numeric() => fields.set_text(field, s.as_str())?,
        // Postcodes are often written as bare numbers
        Value::Number(n) => fields.set_text(field, n.to_string())?,
        Value::Null => {
            return Err(CliError::InvalidInput(format!(
                "{} is null; omit absent fields instead",
                field
            )))
        }
        _ => {
            return Err(CliError::InvalidInput(format!(
                "{} has an unsupported value: {}",
                field, value
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarsite_domain::DomainError;

    const SOURCES: &str = r#"[
        {
            "kind": "bill",
            "observedAt": 1700000000000,
            "fields": {"address": "12 Harbour Rd, Sydney NSW", "postcode": 2000, "latitude": -33.80}
        },
        {
            "name": "Installer quote",
            "kind": "proposal",
            "confidence": 0.7,
            "fields": {"roofTilt": 22, "roofAzimuth": 5, "postcode": "2001"}
        },
        {
            "kind": "maps",
            "fields": {"latitude": -33.8688, "longitude": 151.2093, "shading_factor": 0.12}
        }
    ]"#;

    #[test]
    fn test_parse_sources() {
        let records = parse_sources(SOURCES, &ConfidenceTable::default()).unwrap();
        assert_eq!(records.len(), 3);

        let bill = &records[0];
        assert_eq!(bill.kind(), SourceKind::Bill);
        assert_eq!(bill.name(), "Electricity Bill");
        assert_eq!(bill.confidence().value(), 0.8);
        assert_eq!(bill.observed_at(), 1_700_000_000_000);
        assert_eq!(bill.fields().postcode(), Some("2000"));

        let proposal = &records[1];
        assert_eq!(proposal.name(), "Installer quote");
        assert_eq!(proposal.confidence().value(), 0.7);
        assert_eq!(proposal.fields().roof_tilt(), Some(22.0));

        assert_eq!(records[2].fields().shading_factor(), Some(0.12));
    }

    #[test]
    fn test_configured_confidence_applies() {
        let table = ConfidenceTable {
            maps: 0.5,
            ..ConfidenceTable::default()
        };
        let records = parse_sources(SOURCES, &table).unwrap();
        assert_eq!(records[2].confidence().value(), 0.5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"[{"kind": "manual", "fields": {"roofColour": "red"}}]"#;
        let result = parse_sources(json, &ConfidenceTable::default());
        assert!(matches!(result, Err(CliError::Domain(DomainError::UnknownField(_)))));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"[{"kind": "drone", "fields": {}}]"#;
        let result = parse_sources(json, &ConfidenceTable::default());
        assert!(matches!(result, Err(CliError::Domain(DomainError::UnknownKind(_)))));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let json = r#"[{"kind": "manual", "fields": {"latitude": "south"}}]"#;
        assert!(parse_sources(json, &ConfidenceTable::default()).is_err());

        let json = r#"[{"kind": "manual", "fields": {"address": null}}]"#;
        assert!(matches!(
            parse_sources(json, &ConfidenceTable::default()),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let json = r#"[{"kind": "manual", "weight": 3, "fields": {}}]"#;
        assert!(matches!(
            parse_sources(json, &ConfidenceTable::default()),
            Err(CliError::Serialization(_))
        ));
    }

    #[test]
    fn test_field_given_twice_rejected() {
        let json = r#"[{"kind": "proposal", "fields": {"roofTilt": 22, "roof_tilt": 30}}]"#;
        let result = parse_sources(json, &ConfidenceTable::default());
        assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("more than once")));
    }

    #[test]
    fn test_manual_entry_keeps_earlier_fields() {
        let fields = SiteFields::new().with_text(SiteField::Postcode, "3000").unwrap();
        let mut entry = ManualEntry::new(fields, Confidence::new(0.95).unwrap());
        entry.set(SiteField::RoofTilt, "25").unwrap();
        assert!(entry.set(SiteField::RoofAzimuth, "north").is_err());

        let record = entry.fetch().unwrap();
        assert_eq!(entry.kind(), SourceKind::Manual);
        assert_eq!(record.kind(), SourceKind::Manual);
        assert_eq!(record.fields().postcode(), Some("3000"));
        assert_eq!(record.fields().roof_tilt(), Some(25.0));
        assert!(record.fields().roof_azimuth().is_none());
        assert_eq!(record.confidence().value(), 0.95);
    }

    #[test]
    fn test_parse_field_value() {
        let mut fields = SiteFields::new();
        parse_field_value(&mut fields, SiteField::RoofTilt, "18.5").unwrap();
        parse_field_value(&mut fields, SiteField::Address, "1 Main St").unwrap();
        assert_eq!(fields.roof_tilt(), Some(18.5));
        assert_eq!(fields.address(), Some("1 Main St"));

        assert!(parse_field_value(&mut fields, SiteField::Latitude, "north").is_err());
        assert!(parse_field_value(&mut fields, SiteField::Latitude, "NaN").is_err());
    }
}
