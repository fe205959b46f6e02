use serde::{Deserialize, Serialize};

use crate::pollutant::Pollutant;

/// Position of an annual mean concentration (µg/m³) against the WHO 2021
/// air quality guideline (AQG) and its interim targets (IT).
///
/// | Pollutant | AQG | IT-4 | IT-3 | IT-2 | IT-1 |
/// |-----------|-----|------|------|------|------|
/// | PM2.5     | 5   | 10   | 15   | 25   | 35   |
/// | PM10      | 15  | 20   | 30   | 50   | 70   |
/// | NO2       | 10  | -    | 20   | 30   | 40   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "AQG")]
    Guideline,
    #[serde(rename = "IT-4")]
    InterimTarget4,
    #[serde(rename = "IT-3")]
    InterimTarget3,
    #[serde(rename = "IT-2")]
    InterimTarget2,
    #[serde(rename = "IT-1")]
    InterimTarget1,
    #[serde(rename = ">IT-1")]
    AboveInterimTarget1,
}

fn thresholds(pollutant: Pollutant) -> &'static [(f64, Band)] {
    match pollutant {
        Pollutant::Pm25 => &[
            (5.0, Band::Guideline),
            (10.0, Band::InterimTarget4),
            (15.0, Band::InterimTarget3),
            (25.0, Band::InterimTarget2),
            (35.0, Band::InterimTarget1),
        ],
        Pollutant::Pm10 => &[
            (15.0, Band::Guideline),
            (20.0, Band::InterimTarget4),
            (30.0, Band::InterimTarget3),
            (50.0, Band::InterimTarget2),
            (70.0, Band::InterimTarget1),
        ],
        Pollutant::No2 => &[
            (10.0, Band::Guideline),
            (20.0, Band::InterimTarget3),
            (30.0, Band::InterimTarget2),
            (40.0, Band::InterimTarget1),
        ],
    }
}

impl Band {
    /// Classifies a mean concentration. Non-positive and non-finite values are
    /// [`Band::Invalid`].
    pub fn classify(pollutant: Pollutant, mean: f64) -> Band {
        if !mean.is_finite() || mean <= 0.0 {
            return Band::Invalid;
        }
        thresholds(pollutant)
            .iter()
            .find(|(limit, _)| mean <= *limit)
            .map(|(_, band)| *band)
            .unwrap_or(Band::AboveInterimTarget1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Invalid => "invalid",
            Band::Guideline => "AQG",
            Band::InterimTarget4 => "IT-4",
            Band::InterimTarget3 => "IT-3",
            Band::InterimTarget2 => "IT-2",
            Band::InterimTarget1 => "IT-1",
            Band::AboveInterimTarget1 => ">IT-1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pm25_boundaries() {
        assert_eq!(Band::classify(Pollutant::Pm25, 5.0), Band::Guideline);
        assert_eq!(Band::classify(Pollutant::Pm25, 5.1), Band::InterimTarget4);
        assert_eq!(Band::classify(Pollutant::Pm25, 15.0), Band::InterimTarget3);
        assert_eq!(Band::classify(Pollutant::Pm25, 35.0), Band::InterimTarget1);
        assert_eq!(Band::classify(Pollutant::Pm25, 35.1), Band::AboveInterimTarget1);
    }

    #[test]
    fn test_no2_has_no_fourth_interim_target() {
        assert_eq!(Band::classify(Pollutant::No2, 15.0), Band::InterimTarget3);
        assert_eq!(Band::classify(Pollutant::No2, 10.0), Band::Guideline);
    }

    #[test]
    fn test_non_positive_is_invalid() {
        assert_eq!(Band::classify(Pollutant::Pm10, 0.0), Band::Invalid);
        assert_eq!(Band::classify(Pollutant::Pm10, -3.0), Band::Invalid);
        assert_eq!(Band::classify(Pollutant::Pm10, f64::NAN), Band::Invalid);
    }

    #[test]
    fn test_label_matches_serialized_name() {
        let json = serde_json::to_string(&Band::AboveInterimTarget1).unwrap();
        assert_eq!(json, format!("\"{}\"", Band::AboveInterimTarget1.label()));
    }
}
