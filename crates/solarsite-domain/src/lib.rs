//! SolarSite Domain Layer
//!
//! This crate contains the core domain model for SolarSite site assessment.
//! It depends only on `uuid` and `thiserror`, and defines the
//! value objects, the arbitration procedure, and the trait interfaces that
//! the other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Source Record**: one data source's partial view of the site fields,
//!   tagged with a kind and a confidence
//! - **Kind**: provenance category (bill, proposal, maps, manual)
//! - **Merged Record**: the single record produced by arbitration
//! - **Arbitration**: field-by-field selection by priority rule, falling
//!   back to highest confidence
//! - **Collection Flow**: `collecting -> arbitrating -> done`
//!
//! ## Example
//!
//! ```
//! use solarsite_domain::{arbitrate, SiteField, SiteFields, SourceKind, SourceRecord};
//!
//! let bill = SourceRecord::new(
//!     "Electricity Bill",
//!     SourceKind::Bill,
//!     SiteFields::new().with_text(SiteField::Address, "1 Sun St").unwrap(),
//!     1_700_000_000_000,
//! );
//! let maps = SourceRecord::new(
//!     "Satellite",
//!     SourceKind::Maps,
//!     SiteFields::new().with_number(SiteField::Latitude, -33.86).unwrap(),
//!     1_700_000_000_500,
//! );
//!
//! let merged = arbitrate(&[bill, maps]);
//! assert_eq!(merged.address(), Some("1 Sun St"));
//! assert_eq!(merged.latitude(), Some(-33.86));
//! ```
//!
//! ## Architecture
//!
//! - Pure logic only: no I/O, no logging, no global state
//! - Callers own the source collection and pass it in
//! - Infrastructure (OCR, maps, weather) lives behind the traits in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arbitration;
pub mod collection;
pub mod confidence;
pub mod error;
pub mod field;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use arbitration::{
    arbitrate, arbitrate_with_report, rules_for, Arbitration, FieldResolution, PriorityRule,
    Resolution, PRIORITY_RULES,
};
pub use collection::{CollectionFlow, FlowState, SourceCollection};
pub use confidence::Confidence;
pub use error::DomainError;
pub use field::{FieldValue, MergedRecord, SiteField, SiteFields};
pub use source::{SourceId, SourceKind, SourceRecord};
