//! Data types produced by the ranking stages.

use serde::Serialize;

use crate::config::CleaningPolicy;
use crate::pollutant::Pollutant;
use crate::ranking::band::Band;

/// A record that survived cleaning for one pollutant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    pub city: &'a str,
    pub value: f64,
}

/// Output of the clean stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cleaned<'a> {
    pub observations: Vec<Observation<'a>>,
    /// Records dropped because a required concentration was missing.
    pub missing_value: usize,
    /// Records dropped because the city name was blank.
    pub blank_city: usize,
}

impl Cleaned<'_> {
    pub fn discarded(&self) -> usize {
        self.missing_value + self.blank_city
    }
}

/// Mean concentration of one city over its eligible records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAggregate {
    pub city: String,
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCity {
    /// 1-based position.
    pub rank: usize,
    pub city: String,
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
    pub band: Band,
}

/// Top-N cities for one pollutant, highest mean first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub pollutant: Pollutant,
    pub requested: usize,
    pub entries: Vec<RankedCity>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(city, mean)` pairs in rank order.
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.city.as_str(), e.mean))
            .collect()
    }

    pub fn cities(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.city.as_str()).collect()
    }
}

/// A city whose mean concentration is zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub city: String,
    pub mean: f64,
    pub samples: usize,
    /// Whether the city also made it into the returned top-N.
    pub in_ranking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingWarning {
    /// Fewer distinct cities than requested; the ranking is shorter.
    Shortfall { requested: usize, available: usize },
    /// Records ignored because their city name was blank.
    BlankCity { records: usize },
}

/// Everything one ranking request produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingOutcome {
    pub pollutant: Pollutant,
    pub cleaning: CleaningPolicy,
    pub ranking: Ranking,
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<RankingWarning>,
    pub eligible_records: usize,
    pub discarded_records: usize,
    pub distinct_cities: usize,
}

impl RankingOutcome {
    pub fn has_shortfall(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, RankingWarning::Shortfall { .. }))
    }
}
