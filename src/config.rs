//! Ranking configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

/// Which records are kept before a pollutant is ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CleaningPolicy {
    /// Drop a record only when the ranked pollutant itself is missing.
    #[default]
    PerPollutant,
    /// Drop a record when any tracked pollutant is missing.
    Joint,
}

/// What happens when fewer cities than requested survive cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ShortfallPolicy {
    /// Return the shorter ranking and attach a shortfall warning.
    #[default]
    Truncate,
    /// Fail with [`RankingError::InsufficientData`].
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub top_n: usize,
    pub cleaning: CleaningPolicy,
    pub shortfall: ShortfallPolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            cleaning: CleaningPolicy::default(),
            shortfall: ShortfallPolicy::default(),
        }
    }
}

impl RankingConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_cleaning(mut self, cleaning: CleaningPolicy) -> Self {
        self.cleaning = cleaning;
        self
    }

    pub fn with_shortfall(mut self, shortfall: ShortfallPolicy) -> Self {
        self.shortfall = shortfall;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(RankingError::InvalidLimit(self.top_n));
        }
        Ok(())
    }
}
