//! Site field set and partial records
//!
//! The field set is fixed: two text fields (address, postcode) and five
//! numeric ones (roof geometry, shading, coordinates). A [`SiteFields`]
//! value is a partial mapping over that set where an absent field is simply
//! not present.

use crate::DomainError;
use std::fmt;
use std::str::FromStr;

/// One field of the fixed site field set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SiteField {
    /// Street address
    Address,
    /// Postcode (kept as text, leading zeros matter)
    Postcode,
    /// Roof tilt in degrees from horizontal
    RoofTilt,
    /// Roof azimuth in degrees clockwise from north
    RoofAzimuth,
    /// Fraction of output lost to shading
    ShadingFactor,
    /// Latitude in decimal degrees
    Latitude,
    /// Longitude in decimal degrees
    Longitude,
}

impl SiteField {
    /// All fields in canonical order
    pub const ALL: [SiteField; 7] = [
        SiteField::Address,
        SiteField::Postcode,
        SiteField::RoofTilt,
        SiteField::RoofAzimuth,
        SiteField::ShadingFactor,
        SiteField::Latitude,
        SiteField::Longitude,
    ];

    /// Wire name (camelCase) used in JSON input and output
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteField::Address => "address",
            SiteField::Postcode => "postcode",
            SiteField::RoofTilt => "roofTilt",
            SiteField::RoofAzimuth => "roofAzimuth",
            SiteField::ShadingFactor => "shadingFactor",
            SiteField::Latitude => "latitude",
            SiteField::Longitude => "longitude",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SiteField::Address => "Address",
            SiteField::Postcode => "Postcode",
            SiteField::RoofTilt => "Roof tilt",
            SiteField::RoofAzimuth => "Roof azimuth",
            SiteField::ShadingFactor => "Shading factor",
            SiteField::Latitude => "Latitude",
            SiteField::Longitude => "Longitude",
        }
    }

    /// Whether the field holds a number (otherwise text)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, SiteField::Address | SiteField::Postcode)
    }

    /// Parse a field from its wire name
    ///
    /// Accepts the camelCase name and its snake_case spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "address" => Some(SiteField::Address),
            "postcode" => Some(SiteField::Postcode),
            "roofTilt" | "roof_tilt" => Some(SiteField::RoofTilt),
            "roofAzimuth" | "roof_azimuth" => Some(SiteField::RoofAzimuth),
            "shadingFactor" | "shading_factor" => Some(SiteField::ShadingFactor),
            "latitude" => Some(SiteField::Latitude),
            "longitude" => Some(SiteField::Longitude),
            _ => None,
        }
    }
}

impl FromStr for SiteField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for SiteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of a present field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Text field value
    Text(&'a str),
    /// Numeric field value (always finite)
    Number(f64),
}

impl FieldValue<'_> {
    /// Get the text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Get the number, if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Partial record over the fixed site field set
///
/// Numeric fields are always finite and each field has the right value type,
/// so "present" always means "defined".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteFields {
    address: Option<String>,
    postcode: Option<String>,
    roof_tilt: Option<f64>,
    roof_azimuth: Option<f64>,
    shading_factor: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl SiteFields {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field's value, if present
    pub fn get(&self, field: SiteField) -> Option<FieldValue<'_>> {
        match field {
            SiteField::Address => self.address.as_deref().map(FieldValue::Text),
            SiteField::Postcode => self.postcode.as_deref().map(FieldValue::Text),
            SiteField::RoofTilt => self.roof_tilt.map(FieldValue::Number),
            SiteField::RoofAzimuth => self.roof_azimuth.map(FieldValue::Number),
            SiteField::ShadingFactor => self.shading_factor.map(FieldValue::Number),
            SiteField::Latitude => self.latitude.map(FieldValue::Number),
            SiteField::Longitude => self.longitude.map(FieldValue::Number),
        }
    }

    /// Whether a field is present
    pub fn contains(&self, field: SiteField) -> bool {
        self.get(field).is_some()
    }

    /// Set a text field
    ///
    /// # Errors
    /// Returns [`DomainError::FieldType`] if `field` is numeric
    pub fn set_text(&mut self, field: SiteField, value: impl Into<String>) -> Result<(), DomainError> {
        let slot = match field {
            SiteField::Address => &mut self.address,
            SiteField::Postcode => &mut self.postcode,
            _ => {
                return Err(DomainError::FieldType {
                    field: field.as_str(),
                    expected: "numeric",
                })
            }
        };
        *slot = Some(value.into());
        Ok(())
    }

    /// Set a numeric field
    ///
    /// # Errors
    /// Returns [`DomainError::FieldType`] if `field` is a text field and
    /// [`DomainError::NonFinite`] for NaN or infinite values
    pub fn set_number(&mut self, field: SiteField, value: f64) -> Result<(), DomainError> {
        if !field.is_numeric() {
            return Err(DomainError::FieldType {
                field: field.as_str(),
                expected: "text",
            });
        }
        if !value.is_finite() {
            return Err(DomainError::NonFinite {
                field: field.as_str(),
                value,
            });
        }
        *self.number_slot(field) = Some(value);
        Ok(())
    }

    /// Set a field from a borrowed value
    pub fn set(&mut self, field: SiteField, value: FieldValue<'_>) -> Result<(), DomainError> {
        match value {
            FieldValue::Text(s) => self.set_text(field, s),
            FieldValue::Number(n) => self.set_number(field, n),
        }
    }

    /// Builder form of [`SiteFields::set_text`]
    pub fn with_text(mut self, field: SiteField, value: impl Into<String>) -> Result<Self, DomainError> {
        self.set_text(field, value)?;
        Ok(self)
    }

    /// Builder form of [`SiteFields::set_number`]
    pub fn with_number(mut self, field: SiteField, value: f64) -> Result<Self, DomainError> {
        self.set_number(field, value)?;
        Ok(self)
    }

    /// Remove a field, leaving it absent
    pub fn remove(&mut self, field: SiteField) {
        match field {
            SiteField::Address => self.address = None,
            SiteField::Postcode => self.postcode = None,
            _ => *self.number_slot(field) = None,
        }
    }

    /// Copy one field verbatim from another record (absent stays absent)
    pub(crate) fn copy_field(&mut self, field: SiteField, from: &SiteFields) {
        match field {
            SiteField::Address => self.address = from.address.clone(),
            SiteField::Postcode => self.postcode = from.postcode.clone(),
            _ => *self.number_slot(field) = from.number(field),
        }
    }

    /// Number of present fields
    pub fn len(&self) -> usize {
        SiteField::ALL.iter().filter(|f| self.contains(**f)).count()
    }

    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate present fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SiteField, FieldValue<'_>)> + '_ {
        SiteField::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }

    /// Street address
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Postcode
    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    /// Roof tilt in degrees
    pub fn roof_tilt(&self) -> Option<f64> {
        self.roof_tilt
    }

    /// Roof azimuth in degrees
    pub fn roof_azimuth(&self) -> Option<f64> {
        self.roof_azimuth
    }

    /// Shading factor
    pub fn shading_factor(&self) -> Option<f64> {
        self.shading_factor
    }

    /// Latitude
    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    /// Longitude
    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn number(&self, field: SiteField) -> Option<f64> {
        self.get(field).and_then(|v| v.as_number())
    }

    fn number_slot(&mut self, field: SiteField) -> &mut Option<f64> {
        match field {
            SiteField::RoofTilt => &mut self.roof_tilt,
            SiteField::RoofAzimuth => &mut self.roof_azimuth,
            SiteField::ShadingFactor => &mut self.shading_factor,
            SiteField::Latitude => &mut self.latitude,
            SiteField::Longitude => &mut self.longitude,
            SiteField::Address | SiteField::Postcode => {
                unreachable!("text fields have no numeric slot")
            }
        }
    }
}

/// Result of arbitration: the site field set without provenance
///
/// Produced fresh on every run; it is recomputed, never updated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedRecord {
    fields: SiteFields,
}

impl MergedRecord {
    pub(crate) fn from_fields(fields: SiteFields) -> Self {
        Self { fields }
    }

    /// Get a field's value, if present
    pub fn get(&self, field: SiteField) -> Option<FieldValue<'_>> {
        self.fields.get(field)
    }

    /// Underlying partial record
    pub fn fields(&self) -> &SiteFields {
        &self.fields
    }

    /// Consume into the underlying partial record
    pub fn into_fields(self) -> SiteFields {
        self.fields
    }

    /// Number of present fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate present fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SiteField, FieldValue<'_>)> + '_ {
        self.fields.iter()
    }

    /// Street address
    pub fn address(&self) -> Option<&str> {
        self.fields.address()
    }

    /// Postcode
    pub fn postcode(&self) -> Option<&str> {
        self.fields.postcode()
    }

    /// Roof tilt in degrees
    pub fn roof_tilt(&self) -> Option<f64> {
        self.fields.roof_tilt()
    }

    /// Roof azimuth in degrees
    pub fn roof_azimuth(&self) -> Option<f64> {
        self.fields.roof_azimuth()
    }

    /// Shading factor
    pub fn shading_factor(&self) -> Option<f64> {
        self.fields.shading_factor()
    }

    /// Latitude
    pub fn latitude(&self) -> Option<f64> {
        self.fields.latitude()
    }

    /// Longitude
    pub fn longitude(&self) -> Option<f64> {
        self.fields.longitude()
    }
}
