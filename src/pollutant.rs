//! The fixed set of pollutants tracked by the WHO ambient air quality database.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RankingError;

/// A pollutant with a concentration column in the measurement dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Pm10,
    Pm25,
    No2,
}

impl Pollutant {
    /// Every supported pollutant, in dashboard/report order.
    pub const ALL: [Pollutant; 3] = [Pollutant::Pm10, Pollutant::Pm25, Pollutant::No2];

    /// Column header carrying this pollutant's concentration.
    pub fn column(self) -> &'static str {
        match self {
            Pollutant::Pm10 => "pm10_concentration",
            Pollutant::Pm25 => "pm25_concentration",
            Pollutant::No2 => "no2_concentration",
        }
    }

    /// Short identifier used in file names and CLI flags.
    pub fn slug(self) -> &'static str {
        match self {
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm25",
            Pollutant::No2 => "no2",
        }
    }

    /// Human-readable label for chart titles and axes.
    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::No2 => "NO2",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Pollutant {
    type Err = RankingError;

    /// Accepts the dataset column name or a short alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm10_concentration" | "pm10" => Ok(Pollutant::Pm10),
            "pm25_concentration" | "pm25" | "pm2.5" | "pm2_5" => Ok(Pollutant::Pm25),
            "no2_concentration" | "no2" => Ok(Pollutant::No2),
            _ => Err(RankingError::UnknownField(s.to_string())),
        }
    }
}
