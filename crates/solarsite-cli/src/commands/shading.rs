//! Shading command implementation.

use crate::cli::ShadingArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use solarsite_domain::traits::SourceAdapter;
use solarsite_domain::{SourceKind, SourceRecord};
use solarsite_energy::{
    Jitter, NoJitter, RandomJitter, ShadingAdapter, ShadingEstimate, ShadingEstimator, ShadingRequest,
};

/// Execute the shading command.
pub fn execute_shading(args: ShadingArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let (estimate, record) = estimate(&args, config)?;

    let output = if args.as_source {
        formatter.format_source(&record)?
    } else {
        formatter.format_shading(&estimate)?
    };
    println!("{}", output);
    Ok(())
}

fn estimate(args: &ShadingArgs, config: &Config) -> Result<(ShadingEstimate, SourceRecord)> {
    let estimator = ShadingEstimator::new(config.shading.clone());
    let request = ShadingRequest::new(args.lat, args.lng, args.orientation.into()).with_zoom(args.zoom);
    let confidence = config.confidence.confidence_for(SourceKind::Maps)?;

    if args.deterministic {
        fetch(ShadingAdapter::new(estimator, request, NoJitter).with_confidence(confidence))
    } else {
        fetch(ShadingAdapter::new(estimator, request, RandomJitter).with_confidence(confidence))
    }
}

/// Fetch one record and return it with the estimate behind it.
pub(crate) fn fetch<J: Jitter>(mut adapter: ShadingAdapter<J>) -> Result<(ShadingEstimate, SourceRecord)> {
    let record = adapter.fetch()?;
    let estimate = adapter
        .last_estimate()
        .cloned()
        .ok_or_else(|| CliError::InvalidInput("Shading estimate missing".to_string()))?;
    Ok((estimate, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OrientationArg;

    fn args(lat: f64, lng: f64) -> ShadingArgs {
        ShadingArgs {
            lat,
            lng,
            orientation: OrientationArg::South,
            zoom: 18,
            deterministic: true,
            as_source: false,
        }
    }

    #[test]
    fn test_estimate_uses_config() {
        let mut config = Config::default();
        config.shading.max_shading = 0.1;

        let (estimate, record) = estimate(&args(-37.8136, 144.9631), &config).unwrap();
        assert_eq!(estimate.shading, 0.1);
        assert_eq!(estimate.zoom, 18);
        assert_eq!(record.fields().shading_factor(), Some(0.1));
    }

    #[test]
    fn test_record_uses_configured_maps_confidence() {
        let mut config = Config::default();
        config.confidence.maps = 0.6;

        let (_, record) = estimate(&args(-27.4698, 153.0251), &config).unwrap();
        assert_eq!(record.kind(), SourceKind::Maps);
        assert_eq!(record.confidence().value(), 0.6);
    }

    #[test]
    fn test_invalid_coordinates() {
        let result = estimate(&args(-33.0, 200.0), &Config::default());
        assert!(matches!(result, Err(CliError::Energy(_))));
    }
}
