use tracing::warn;

use crate::pollutant::Pollutant;
use crate::ranking::types::{Anomaly, CityAggregate};

/// Lists every city whose mean is not a finite positive number.
///
/// `sorted` must already be in rank order; the first `ranked` entries are the
/// ones returned to the caller.
pub fn detect_anomalies(
    pollutant: Pollutant,
    sorted: &[CityAggregate],
    ranked: usize,
) -> Vec<Anomaly> {
    sorted
        .iter()
        .enumerate()
        .filter(|(_, agg)| !(agg.mean.is_finite() && agg.mean > 0.0))
        .map(|(idx, agg)| {
            warn!(
                pollutant = %pollutant,
                city = %agg.city,
                mean = agg.mean,
                samples = agg.samples,
                "Non-positive or non-finite mean concentration"
            );
            Anomaly {
                city: agg.city.clone(),
                mean: agg.mean,
                samples: agg.samples,
                in_ranking: idx < ranked,
            }
        })
        .collect()
}
