//! Placeholder roof shading estimator
//!
//! Not a physical shading model. The estimate is:
//!
//! 1. a region bucket from proximity to reference cities,
//! 2. the bucket's base shading plus a small jitter,
//! 3. scaled by the roof orientation multiplier,
//! 4. clamped to `[0, max_shading]`.

use crate::error::validate_coordinates;
use crate::{EnergyError, EstimatorConfig, Result};
use rand::Rng;
use chrono::Utc;
use solarsite_domain::traits::SourceAdapter;
use solarsite_domain::{Confidence, SiteField, SiteFields, SourceKind, SourceRecord};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default satellite zoom level
const DEFAULT_ZOOM: u8 = 20;

/// Compass direction the roof face points toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// North-facing
    North,
    /// East-facing
    East,
    /// South-facing
    South,
    /// West-facing
    West,
}

impl Orientation {
    /// All orientations
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Shading multiplier for this orientation
    pub fn multiplier(&self) -> f64 {
        match self {
            Orientation::North => 0.8,
            Orientation::East => 1.1,
            Orientation::West => 1.2,
            Orientation::South => 1.4,
        }
    }

    /// Panel azimuth in degrees clockwise from north
    pub fn azimuth_deg(&self) -> f64 {
        match self {
            Orientation::North => 0.0,
            Orientation::East => 90.0,
            Orientation::South => 180.0,
            Orientation::West => 270.0,
        }
    }

    /// Get the orientation name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::North => "north",
            Orientation::East => "east",
            Orientation::South => "south",
            Orientation::West => "west",
        }
    }
}

impl FromStr for Orientation {
    type Err = EnergyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Ok(Orientation::North),
            "east" | "e" => Ok(Orientation::East),
            "south" | "s" => Ok(Orientation::South),
            "west" | "w" => Ok(Orientation::West),
            _ => Err(EnergyError::UnknownOrientation(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse location class used by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionBucket {
    /// Greater Sydney
    Sydney,
    /// Greater Melbourne
    Melbourne,
    /// Greater Brisbane
    Brisbane,
    /// Greater Perth
    Perth,
    /// Greater Adelaide
    Adelaide,
    /// Anywhere else
    Regional,
}

/// Reference points (lat, lng) for the city buckets
const REFERENCE_POINTS: [(RegionBucket, f64, f64); 5] = [
    (RegionBucket::Sydney, -33.8688, 151.2093),
    (RegionBucket::Melbourne, -37.8136, 144.9631),
    (RegionBucket::Brisbane, -27.4698, 153.0251),
    (RegionBucket::Perth, -31.9505, 115.8605),
    (RegionBucket::Adelaide, -34.9285, 138.6007),
];

impl RegionBucket {
    /// Nearest reference bucket within `radius_deg`, otherwise `Regional`
    pub fn locate(lat: f64, lng: f64, radius_deg: f64) -> Self {
        REFERENCE_POINTS
            .iter()
            .map(|(bucket, rlat, rlng)| (*bucket, ((lat - rlat).powi(2) + (lng - rlng).powi(2)).sqrt()))
            .filter(|(_, distance)| *distance <= radius_deg)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(bucket, _)| bucket)
            .unwrap_or(RegionBucket::Regional)
    }

    /// Base shading range (min, max) for the bucket
    pub fn base_range(&self) -> (f64, f64) {
        match self {
            RegionBucket::Sydney => (0.08, 0.18),
            RegionBucket::Melbourne => (0.10, 0.20),
            RegionBucket::Brisbane => (0.06, 0.14),
            RegionBucket::Perth => (0.04, 0.10),
            RegionBucket::Adelaide => (0.05, 0.12),
            RegionBucket::Regional => (0.02, 0.08),
        }
    }

    /// Get the bucket name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionBucket::Sydney => "sydney",
            RegionBucket::Melbourne => "melbourne",
            RegionBucket::Brisbane => "brisbane",
            RegionBucket::Perth => "perth",
            RegionBucket::Adelaide => "adelaide",
            RegionBucket::Regional => "regional",
        }
    }
}

/// Source of jitter added to the base shading
pub trait Jitter {
    /// Sample a value in `[-amplitude, amplitude]`
    fn sample(&mut self, amplitude: f64) -> f64;
}

/// Uniform jitter from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&mut self, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-amplitude..=amplitude)
    }
}

/// No jitter
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&mut self, _amplitude: f64) -> f64 {
        0.0
    }
}

/// Inputs to a shading estimate
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingRequest {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
    /// Roof orientation
    pub orientation: Orientation,
    /// Requested satellite zoom level; echoed back, it does not change the estimate
    pub zoom: u8,
}

impl ShadingRequest {
    /// Create a request at the default zoom level
    pub fn new(lat: f64, lng: f64, orientation: Orientation) -> Self {
        Self {
            lat,
            lng,
            orientation,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Set the zoom level
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}

/// Result of a shading estimate
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingEstimate {
    /// Latitude the estimate was made for
    pub lat: f64,
    /// Longitude the estimate was made for
    pub lng: f64,
    /// Roof orientation used
    pub orientation: Orientation,
    /// Zoom level requested
    pub zoom: u8,
    /// Region bucket the site fell into
    pub bucket: RegionBucket,
    /// Orientation multiplier applied
    pub multiplier: f64,
    /// Final shading fraction in `[0, max_shading]`
    pub shading: f64,
}

impl ShadingEstimate {
    /// Turn the estimate into a map-analysis source record
    ///
    /// Sets latitude, longitude and shading factor.
    pub fn to_source_record(&self, observed_at: u64) -> Result<SourceRecord> {
        let fields = SiteFields::new()
            .with_number(SiteField::Latitude, self.lat)
            .and_then(|f| f.with_number(SiteField::Longitude, self.lng))
            .and_then(|f| f.with_number(SiteField::ShadingFactor, self.shading))
            .map_err(|e| EnergyError::InvalidInput(e.to_string()))?;
        Ok(SourceRecord::new(
            SourceKind::Maps.default_name(),
            SourceKind::Maps,
            fields,
            observed_at,
        ))
    }
}

/// Placeholder shading estimator
#[derive(Debug, Clone, Default)]
pub struct ShadingEstimator {
    config: EstimatorConfig,
}

impl ShadingEstimator {
    /// Create an estimator with the given configuration
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimator configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate shading for a site
    ///
    /// # Errors
    /// Returns [`EnergyError::InvalidCoordinates`] for out-of-range or
    /// non-finite coordinates
    pub fn estimate<J: Jitter + ?Sized>(&self, request: &ShadingRequest, jitter: &mut J) -> Result<ShadingEstimate> {
        validate_coordinates(request.lat, request.lng)?;

        let bucket = RegionBucket::locate(request.lat, request.lng, self.config.bucket_radius_deg);
        let (low, high) = bucket.base_range();
        let base = ((low + high) / 2.0 + jitter.sample(self.config.jitter_amplitude)).max(0.0);
        let multiplier = request.orientation.multiplier();
        let shading = (base * multiplier).clamp(0.0, self.config.max_shading);

        debug!(
            lat = request.lat,
            lng = request.lng,
            bucket = bucket.as_str(),
            orientation = request.orientation.as_str(),
            shading,
            "Estimated shading"
        );

        Ok(ShadingEstimate {
            lat: request.lat,
            lng: request.lng,
            orientation: request.orientation,
            zoom: request.zoom,
            bucket,
            multiplier,
            shading,
        })
    }
}

/// Estimate shading with the default configuration and random jitter
///
/// Returns a fraction in `[0, 0.35]`.
pub fn estimate_shading(lat: f64, lng: f64, orientation: Orientation) -> Result<f64> {
    let request = ShadingRequest::new(lat, lng, orientation);
    ShadingEstimator::default()
        .estimate(&request, &mut RandomJitter)
        .map(|e| e.shading)
}

/// Map-analysis source backed by the shading estimator
///
/// Each fetch runs a fresh estimate for the configured site and keeps it
/// for inspection through [`ShadingAdapter::last_estimate`].
#[derive(Debug)]
pub struct ShadingAdapter<J> {
    estimator: ShadingEstimator,
    request: ShadingRequest,
    jitter: J,
    confidence: Option<Confidence>,
    last: Option<ShadingEstimate>,
}

impl<J: Jitter> ShadingAdapter<J> {
    /// Create an adapter for one site
    pub fn new(estimator: ShadingEstimator, request: ShadingRequest, jitter: J) -> Self {
        Self {
            estimator,
            request,
            jitter,
            confidence: None,
            last: None,
        }
    }

    /// Tag fetched records with this confidence instead of the maps default
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Estimate behind the most recent successful fetch
    pub fn last_estimate(&self) -> Option<&ShadingEstimate> {
        self.last.as_ref()
    }
}

impl<J: Jitter> SourceAdapter for ShadingAdapter<J> {
    type Error = EnergyError;

    fn kind(&self) -> SourceKind {
        SourceKind::Maps
    }

    fn fetch(&mut self) -> Result<SourceRecord> {
        let estimate = self.estimator.estimate(&self.request, &mut self.jitter)?;
        let observed_at = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut record = estimate.to_source_record(observed_at)?;
        if let Some(confidence) = self.confidence {
            record = record.with_confidence(confidence);
        }
        self.last = Some(estimate);
        Ok(record)
    }
}
