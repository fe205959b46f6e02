use air_quality_ranker::config::{CleaningPolicy, RankingConfig, ShortfallPolicy};
use air_quality_ranker::dataset::{Dataset, DatasetSource, LoadOptions};
use air_quality_ranker::error::RankingError;
use air_quality_ranker::fetch::BasicClient;
use air_quality_ranker::pipeline::Pipeline;
use air_quality_ranker::pollutant::Pollutant;
use air_quality_ranker::ranking::{RankingWarning, rank_all, rank_top_n};
use std::path::PathBuf;

fn sample() -> Dataset {
    let bytes = include_bytes!("fixtures/who_sample.csv");
    Dataset::from_bytes(bytes, b',').expect("Failed to parse fixture")
}

#[test]
fn test_top_10_pm10() {
    let outcome = rank_top_n(&sample(), Pollutant::Pm10, &RankingConfig::default()).unwrap();

    assert_eq!(
        outcome.ranking.cities(),
        vec![
            "Delhi",
            "Kanpur",
            "Cairo",
            "Dhaka",
            "Accra",
            "Lima",
            "Istanbul",
            "Mexico City",
            "Milano",
            "Paris"
        ]
    );
    assert_eq!(outcome.ranking.entries[0].mean, 229.0);
    assert_eq!(outcome.ranking.entries[0].samples, 2);
    assert_eq!(outcome.eligible_records, 13);
    assert_eq!(outcome.discarded_records, 3);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_pm25_tie_and_zero_mean() {
    let outcome = rank_top_n(&sample(), Pollutant::Pm25, &RankingConfig::default()).unwrap();
    let cities = outcome.ranking.cities();

    // Istanbul and Milano both average 23.0; Istanbul appears first in the file.
    let istanbul = cities.iter().position(|c| *c == "Istanbul").unwrap();
    let milano = cities.iter().position(|c| *c == "Milano").unwrap();
    assert_eq!(milano, istanbul + 1);

    assert!(!cities.contains(&"Accra"));
    assert_eq!(outcome.anomalies.len(), 1);
    assert_eq!(outcome.anomalies[0].city, "Accra");
    assert!(!outcome.anomalies[0].in_ranking);
}

#[test]
fn test_no2_shortfall_is_a_warning() {
    let outcome = rank_top_n(&sample(), Pollutant::No2, &RankingConfig::default()).unwrap();

    assert_eq!(outcome.ranking.len(), 8);
    assert_eq!(
        outcome.warnings,
        vec![RankingWarning::Shortfall {
            requested: 10,
            available: 8
        }]
    );
    assert_eq!(outcome.ranking.cities()[0], "Istanbul");
}

#[test]
fn test_per_pollutant_cleaning_keeps_more_records() {
    let data = sample();
    let per = rank_top_n(&data, Pollutant::Pm10, &RankingConfig::default()).unwrap();
    let joint = rank_top_n(
        &data,
        Pollutant::Pm10,
        &RankingConfig::default().with_cleaning(CleaningPolicy::Joint),
    )
    .unwrap();

    assert!(per.eligible_records > joint.eligible_records);
    assert_eq!(joint.distinct_cities, 6);
    // Delhi's 2018 row lacks NO2, so joint cleaning averages only 2019.
    assert_eq!(per.ranking.entries[0].mean, 229.0);
    assert_eq!(joint.ranking.entries[0].mean, 217.0);
}

#[test]
fn test_strict_shortfall_only_fails_that_pollutant() {
    let config = RankingConfig::default().with_shortfall(ShortfallPolicy::Fail);
    let results = rank_all(&sample(), &config);

    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_ok());
    assert_eq!(
        results[2].1,
        Err(RankingError::InsufficientData {
            pollutant: Pollutant::No2,
            requested: 10,
            available: 8
        })
    );
}

#[tokio::test]
async fn test_full_pipeline() {
    let source = DatasetSource::File(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/who_sample.csv"),
    );
    let out_dir = std::env::temp_dir().join("air_quality_ranker_integration");
    let _ = std::fs::remove_dir_all(&out_dir);

    let client = BasicClient::new().unwrap();
    let (report, rendered) = Pipeline::new(RankingConfig::default().with_top_n(5))
        .run(&client, &source, LoadOptions::default(), Some(&out_dir), false)
        .await
        .expect("Pipeline failed");

    assert_eq!(report.records, 16);
    assert_eq!(report.outcomes().count(), 3);
    assert_eq!(rendered.len(), 3);
    for figures in &rendered {
        assert!(figures.map.exists());
        assert!(figures.bar.exists());
    }

    let map: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&rendered[0].map).unwrap()).unwrap();
    assert_eq!(map["type"], "FeatureCollection");
    assert_eq!(map["features"].as_array().unwrap().len(), 13);

    std::fs::remove_dir_all(&out_dir).unwrap();
}
