//! Source records - one data source's partial contribution to the site fields

use crate::{Confidence, DomainError, SiteFields};
use std::fmt;

/// Unique identifier for a source record based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so records captured
/// later compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u128);

impl SourceId {
    /// Generate a new UUIDv7-based SourceId
    ///
    /// # Examples
    ///
    /// ```
    /// use solarsite_domain::SourceId;
    ///
    /// let id = SourceId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a SourceId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a SourceId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUID string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Provenance category of a source record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// Electricity bill OCR
    Bill,
    /// Installer proposal OCR
    Proposal,
    /// Map / satellite analysis
    Maps,
    /// Direct user entry
    Manual,
}

impl SourceKind {
    /// All kinds
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Bill,
        SourceKind::Proposal,
        SourceKind::Maps,
        SourceKind::Manual,
    ];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Bill => "bill",
            SourceKind::Proposal => "proposal",
            SourceKind::Maps => "maps",
            SourceKind::Manual => "manual",
        }
    }

    /// Parse a kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bill" => Some(SourceKind::Bill),
            "proposal" => Some(SourceKind::Proposal),
            "maps" | "map" => Some(SourceKind::Maps),
            "manual" => Some(SourceKind::Manual),
            _ => None,
        }
    }

    /// Fixed confidence for records of this kind
    pub fn default_confidence(&self) -> Confidence {
        match self {
            SourceKind::Bill => Confidence::from_const(0.80),
            SourceKind::Proposal => Confidence::from_const(0.85),
            SourceKind::Maps => Confidence::from_const(0.90),
            SourceKind::Manual => Confidence::from_const(0.95),
        }
    }

    /// Default display label
    pub fn default_name(&self) -> &'static str {
        match self {
            SourceKind::Bill => "Electricity Bill",
            SourceKind::Proposal => "Solar Proposal",
            SourceKind::Maps => "Satellite Analysis",
            SourceKind::Manual => "Manual Entry",
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data source's partial view of the site fields
///
/// Source records are immutable once created. Re-supplying a source of the
/// same kind creates a new record that replaces the old one in a
/// [`crate::SourceCollection`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    id: SourceId,
    name: String,
    kind: SourceKind,
    confidence: Confidence,
    fields: SiteFields,
    observed_at: u64,
}

impl SourceRecord {
    /// Create a source record with the kind's fixed confidence
    ///
    /// `observed_at` is milliseconds since the Unix epoch.
    pub fn new(name: impl Into<String>, kind: SourceKind, fields: SiteFields, observed_at: u64) -> Self {
        Self {
            id: SourceId::new(),
            name: name.into(),
            kind,
            confidence: kind.default_confidence(),
            fields,
            observed_at,
        }
    }

    /// Replace the confidence (builder style, consumes the record)
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Replace the identifier (storage/import use)
    pub fn with_id(mut self, id: SourceId) -> Self {
        self.id = id;
        self
    }

    /// Unique identifier
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Display label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provenance category
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Confidence score
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Partial field mapping
    pub fn fields(&self) -> &SiteFields {
        &self.fields
    }

    /// Capture time in milliseconds since the Unix epoch
    pub fn observed_at(&self) -> u64 {
        self.observed_at
    }
}
