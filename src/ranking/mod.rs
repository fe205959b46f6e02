//! Pollutant ranking: clean, group by city, average, sort, take the top N.
//!
//! Every call is pure. Data-quality findings (non-positive means, short
//! rankings, blank city names) travel in the returned [`RankingOutcome`]
//! alongside the ranking instead of failing the request.

pub mod aggregate;
pub mod anomaly;
pub mod band;
pub mod clean;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, rank};
pub use anomaly::detect_anomalies;
pub use band::Band;
pub use clean::{clean, clean_joint};
pub use types::{
    Anomaly, CityAggregate, Cleaned, Observation, RankedCity, Ranking, RankingOutcome,
    RankingWarning,
};

use tracing::{debug, info, warn};

use crate::config::{CleaningPolicy, RankingConfig, ShortfallPolicy};
use crate::dataset::Dataset;
use crate::error::{RankingError, Result};
use crate::pipeline::Stage;
use crate::pollutant::Pollutant;

/// Ranks the `config.top_n` cities with the highest mean `pollutant`
/// concentration.
///
/// # Errors
///
/// - [`RankingError::InvalidLimit`] when `top_n` is zero.
/// - [`RankingError::MissingColumn`] when the dataset has no column for
///   `pollutant`.
/// - [`RankingError::InsufficientData`] when fewer cities than requested
///   remain and the shortfall policy is [`ShortfallPolicy::Fail`].
#[tracing::instrument(skip(dataset, config), fields(top_n = config.top_n))]
pub fn rank_top_n(
    dataset: &Dataset,
    pollutant: Pollutant,
    config: &RankingConfig,
) -> Result<RankingOutcome> {
    config.validate()?;
    dataset.schema.require(pollutant)?;

    let cleaned = match config.cleaning {
        CleaningPolicy::PerPollutant => clean(&dataset.records, pollutant),
        CleaningPolicy::Joint => {
            clean_joint(&dataset.records, pollutant, &dataset.schema.pollutants())
        }
    };
    debug!(
        stage = ?Stage::Clean,
        eligible = cleaned.observations.len(),
        missing_value = cleaned.missing_value,
        blank_city = cleaned.blank_city,
        "Records cleaned"
    );

    let mut aggregates = aggregate(&cleaned.observations);
    let available = aggregates.len();
    debug!(stage = ?Stage::Aggregate, cities = available, "Cities aggregated");
    let requested = config.top_n;

    let mut warnings = Vec::new();
    if cleaned.blank_city > 0 {
        warnings.push(RankingWarning::BlankCity {
            records: cleaned.blank_city,
        });
    }
    if available < requested {
        match config.shortfall {
            ShortfallPolicy::Fail => {
                return Err(RankingError::InsufficientData {
                    pollutant,
                    requested,
                    available,
                });
            }
            ShortfallPolicy::Truncate => {
                warn!(requested, available, "Fewer cities than requested");
                warnings.push(RankingWarning::Shortfall {
                    requested,
                    available,
                });
            }
        }
    }

    aggregate::sort_descending(&mut aggregates);
    let anomalies = detect_anomalies(pollutant, &aggregates, requested);
    aggregates.truncate(requested);

    let entries = aggregates
        .into_iter()
        .enumerate()
        .map(|(idx, agg)| RankedCity {
            rank: idx + 1,
            band: Band::classify(pollutant, agg.mean),
            city: agg.city,
            mean: agg.mean,
            stddev: agg.stddev,
            samples: agg.samples,
        })
        .collect::<Vec<_>>();

    info!(
        ranked = entries.len(),
        distinct_cities = available,
        anomalies = anomalies.len(),
        "Ranking computed"
    );

    Ok(RankingOutcome {
        pollutant,
        cleaning: config.cleaning,
        ranking: Ranking {
            pollutant,
            requested,
            entries,
        },
        anomalies,
        warnings,
        eligible_records: cleaned.observations.len(),
        discarded_records: cleaned.discarded(),
        distinct_cities: available,
    })
}

/// Like [`rank_top_n`], with the pollutant given by column name or alias.
pub fn rank_field(dataset: &Dataset, field: &str, config: &RankingConfig) -> Result<RankingOutcome> {
    let pollutant = field.parse::<Pollutant>()?;
    rank_top_n(dataset, pollutant, config)
}

/// Ranks every supported pollutant independently.
///
/// A failure for one pollutant (e.g. its column is absent) is reported in its
/// slot and does not stop the others.
pub fn rank_all(
    dataset: &Dataset,
    config: &RankingConfig,
) -> Vec<(Pollutant, Result<RankingOutcome>)> {
    Pollutant::ALL
        .into_iter()
        .map(|p| {
            let result = rank_top_n(dataset, p, config);
            if let Err(e) = &result {
                warn!(pollutant = %p, code = e.code(), error = %e, "Ranking failed");
            }
            (p, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{MeasurementRecord, Schema};

    fn dataset(records: Vec<MeasurementRecord>) -> Dataset {
        Dataset::new(Schema::full(), records)
    }

    fn pm10(city: &str, value: f64) -> MeasurementRecord {
        MeasurementRecord::new(city).with(Pollutant::Pm10, value)
    }

    #[test]
    fn test_concrete_scenario() {
        let data = dataset(vec![pm10("X", 80.0), pm10("X", 40.0), pm10("Y", 100.0)]);
        let config = RankingConfig::default().with_top_n(2);

        let outcome = rank_top_n(&data, Pollutant::Pm10, &config).unwrap();
        assert_eq!(outcome.ranking.pairs(), vec![("Y", 100.0), ("X", 60.0)]);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.anomalies.is_empty());
        assert_eq!(outcome.eligible_records, 3);
    }

    #[test]
    fn test_ranking_is_sorted_and_bounded() {
        let data = dataset(
            (0..25)
                .map(|i| pm10(&format!("City{i}"), ((i * 37) % 11) as f64 + 1.0))
                .collect(),
        );
        let outcome = rank_top_n(&data, Pollutant::Pm10, &RankingConfig::default()).unwrap();

        assert_eq!(outcome.ranking.len(), 10);
        let means: Vec<f64> = outcome.ranking.entries.iter().map(|e| e.mean).collect();
        assert!(means.windows(2).all(|w| w[0] >= w[1]));
        let ranks: Vec<usize> = outcome.ranking.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_idempotent() {
        let data = dataset(vec![pm10("A", 3.0), pm10("B", 7.0), pm10("A", 9.0)]);
        let config = RankingConfig::default();
        let first = rank_top_n(&data, Pollutant::Pm10, &config).unwrap();
        let second = rank_top_n(&data, Pollutant::Pm10, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shortfall_truncates_with_warning() {
        let data = dataset(vec![pm10("A", 3.0), pm10("B", 7.0)]);
        let outcome = rank_top_n(&data, Pollutant::Pm10, &RankingConfig::default()).unwrap();

        assert_eq!(outcome.ranking.cities(), vec!["B", "A"]);
        assert!(outcome.has_shortfall());
        assert!(outcome.warnings.contains(&RankingWarning::Shortfall {
            requested: 10,
            available: 2
        }));
    }

    #[test]
    fn test_shortfall_fails_under_strict_policy() {
        let data = dataset(vec![pm10("A", 3.0)]);
        let config = RankingConfig::default().with_shortfall(ShortfallPolicy::Fail);
        let err = rank_top_n(&data, Pollutant::Pm10, &config).unwrap_err();
        assert_eq!(
            err,
            RankingError::InsufficientData {
                pollutant: Pollutant::Pm10,
                requested: 10,
                available: 1
            }
        );
    }

    #[test]
    fn test_anomaly_reported_outside_ranking() {
        let mut records: Vec<_> = (0..3).map(|i| pm10(&format!("C{i}"), 50.0 + i as f64)).collect();
        records.push(pm10("Zero", 0.0));
        records.push(pm10("Negative", -5.0));
        records.push(pm10("Negative", 1.0));

        let config = RankingConfig::default().with_top_n(3);
        let outcome = rank_top_n(&dataset(records), Pollutant::Pm10, &config).unwrap();

        assert_eq!(outcome.ranking.cities(), vec!["C2", "C1", "C0"]);
        let flagged: Vec<_> = outcome.anomalies.iter().map(|a| a.city.as_str()).collect();
        assert_eq!(flagged, vec!["Zero", "Negative"]);
        assert!(outcome.anomalies.iter().all(|a| !a.in_ranking));
        assert_eq!(outcome.anomalies[1].mean, -2.0);
    }

    #[test]
    fn test_anomaly_inside_ranking_is_flagged() {
        let data = dataset(vec![pm10("Only", -1.0)]);
        let outcome = rank_top_n(&data, Pollutant::Pm10, &RankingConfig::default()).unwrap();
        assert_eq!(outcome.ranking.entries[0].band, Band::Invalid);
        assert_eq!(outcome.anomalies.len(), 1);
        assert!(outcome.anomalies[0].in_ranking);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = Dataset::new(
            Schema::new(["city", "pm10_concentration"]),
            vec![pm10("A", 1.0)],
        );
        let err = rank_top_n(&data, Pollutant::No2, &RankingConfig::default()).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        let data = dataset(vec![pm10("A", 1.0)]);
        let err = rank_field(&data, "so2_concentration", &RankingConfig::default()).unwrap_err();
        assert_eq!(err, RankingError::UnknownField("so2_concentration".into()));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let data = dataset(vec![pm10("A", 1.0)]);
        let config = RankingConfig::default().with_top_n(0);
        assert_eq!(
            rank_top_n(&data, Pollutant::Pm10, &config),
            Err(RankingError::InvalidLimit(0))
        );
    }

    #[test]
    fn test_cleaning_policies_differ() {
        let data = dataset(vec![
            pm10("A", 10.0).with(Pollutant::Pm25, 4.0).with(Pollutant::No2, 9.0),
            pm10("B", 90.0),
        ]);

        let per = rank_top_n(&data, Pollutant::Pm10, &RankingConfig::default()).unwrap();
        assert_eq!(per.ranking.cities(), vec!["B", "A"]);

        let joint_config = RankingConfig::default().with_cleaning(CleaningPolicy::Joint);
        let joint = rank_top_n(&data, Pollutant::Pm10, &joint_config).unwrap();
        assert_eq!(joint.ranking.cities(), vec!["A"]);
        assert_eq!(joint.discarded_records, 1);
    }

    #[test]
    fn test_rank_all_isolates_failures() {
        let data = Dataset::new(
            Schema::new(["city", "pm10_concentration", "no2_concentration"]),
            vec![pm10("A", 1.0).with(Pollutant::No2, 2.0)],
        );
        let results = rank_all(&data, &RankingConfig::default());

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.as_ref().unwrap_err().is_schema_error());
        assert_eq!(results[2].1.as_ref().unwrap().ranking.cities(), vec!["A"]);
    }

    #[test]
    fn test_blank_city_warning() {
        let data = dataset(vec![pm10("", 5.0), pm10("A", 1.0)]);
        let config = RankingConfig::default().with_top_n(1);
        let outcome = rank_top_n(&data, Pollutant::Pm10, &config).unwrap();
        assert_eq!(outcome.warnings, vec![RankingWarning::BlankCity { records: 1 }]);
    }
}
