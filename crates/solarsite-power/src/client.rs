//! NASA POWER HTTP client
//!
//! Single request per call. There is no retry loop; a failed request is
//! reported to the caller as-is.

use crate::parse::{parse_hourly, PARAMETERS};
use crate::{PowerConfig, PowerError, Result};
use chrono::NaiveDate;
use serde_json::Value;
use solarsite_energy::HourlyIrradiance;
use std::time::Duration;
use tracing::{debug, info};

/// Date format used by the API
const DATE_FORMAT: &str = "%Y%m%d";

/// Client for the POWER hourly point API
#[derive(Debug, Clone)]
pub struct PowerClient {
    endpoint: String,
    client: reqwest::Client,
}

impl PowerClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns [`PowerError::Http`] if the HTTP client cannot be built
    pub fn new(config: &PowerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// API endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters for a request
    pub fn query(lat: f64, lng: f64, start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("community", "RE".to_string()),
            ("parameters", PARAMETERS.join(",")),
            ("latitude", lat.to_string()),
            ("longitude", lng.to_string()),
            ("start", start.format(DATE_FORMAT).to_string()),
            ("end", end.format(DATE_FORMAT).to_string()),
            ("format", "JSON".to_string()),
        ]
    }

    /// Fetch hourly irradiance for a site over an inclusive date range
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the coordinates or date range are invalid
    /// - the request fails or times out
    /// - the API answers with a non-success status
    /// - the response holds no hourly data
    pub async fn fetch_hourly(
        &self,
        lat: f64,
        lng: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HourlyIrradiance>> {
        validate_request(lat, lng, start, end)?;

        debug!(lat, lng, %start, %end, endpoint = %self.endpoint, "Requesting POWER hourly data");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&Self::query(lat, lng, start, end))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PowerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let rows = parse_hourly(&payload)?;

        info!(lat, lng, hours = rows.len(), "Fetched POWER hourly data");
        Ok(rows)
    }
}

pub(crate) fn validate_request(lat: f64, lng: f64, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if !(lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0) {
        return Err(PowerError::InvalidRequest(format!(
            "coordinates out of range: {}, {}",
            lat, lng
        )));
    }
    if end < start {
        return Err(PowerError::InvalidRequest(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}
