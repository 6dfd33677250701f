//! Time-of-use tariffs

use crate::{EnergyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Import price used when a tariff has no import rates, $/kWh
pub const DEFAULT_IMPORT_PRICE: f64 = 0.28;

/// Wall-clock time of day, minute resolution
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Create a clock time from hour and minute
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(EnergyError::InvalidTariff(format!(
                "time out of range: {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Minutes since midnight
    pub fn minutes(&self) -> u16 {
        self.minutes
    }

    /// Hour component
    pub fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    /// Minute component
    pub fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }
}

impl FromStr for ClockTime {
    type Err = EnergyError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EnergyError::InvalidTariff(format!("expected HH:MM, got '{}'", s));
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = EnergyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// One priced window of a tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRate {
    /// Price in $/kWh
    pub price: f64,
    /// Window start (inclusive)
    pub start: ClockTime,
    /// Window end (exclusive); may be earlier than `start` to wrap midnight
    pub end: ClockTime,
}

impl TariffRate {
    /// Whether the rate applies at `time`
    ///
    /// A window whose start equals its end covers the whole day.
    pub fn covers(&self, time: ClockTime) -> bool {
        match self.start.cmp(&self.end) {
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Less => time >= self.start && time < self.end,
            std::cmp::Ordering::Greater => time >= self.start || time < self.end,
        }
    }
}

/// Import, export, and demand rates for a site
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tariff {
    /// Import (grid purchase) rates
    #[serde(rename = "import", default)]
    pub import_rates: Vec<TariffRate>,
    /// Export (feed-in) rates
    #[serde(rename = "export", default, skip_serializing_if = "Option::is_none")]
    pub export_rates: Option<Vec<TariffRate>>,
    /// Demand charges
    #[serde(rename = "demand", default, skip_serializing_if = "Option::is_none")]
    pub demand_rates: Option<Vec<TariffRate>>,
}

impl Tariff {
    /// Flat tariff with a single all-day import rate
    pub fn flat(price: f64) -> Self {
        let midnight = ClockTime { minutes: 0 };
        Self {
            import_rates: vec![TariffRate {
                price,
                start: midnight,
                end: midnight,
            }],
            export_rates: None,
            demand_rates: None,
        }
    }

    /// Import price at a time of day, from the first matching rate
    pub fn import_price_at(&self, hour: u8, minute: u8) -> Result<Option<f64>> {
        let time = ClockTime::new(hour, minute)?;
        Ok(self
            .import_rates
            .iter()
            .find(|rate| rate.covers(time))
            .map(|rate| rate.price))
    }

    /// Price of the first import rate, or [`DEFAULT_IMPORT_PRICE`]
    pub fn headline_import_price(&self) -> f64 {
        self.import_rates
            .first()
            .map(|rate| rate.price)
            .unwrap_or(DEFAULT_IMPORT_PRICE)
    }
}
