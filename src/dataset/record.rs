use serde::{Deserialize, Serialize};

use crate::pollutant::Pollutant;

/// One observation row from the measurement table.
///
/// Unparseable cells (`NA`, `-`, free text) deserialize to `None` rather than
/// failing the whole file; columns absent from the header also default to
/// `None`. Whether a pollutant column exists at all is tracked by
/// [`Schema`](super::Schema), not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub city: String,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub iso3: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub who_region: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pm10_concentration: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub pm25_concentration: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub no2_concentration: Option<f64>,
}

impl MeasurementRecord {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Default::default()
        }
    }

    /// Sets a pollutant value.
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        *self.slot(pollutant) = Some(value);
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    fn slot(&mut self, pollutant: Pollutant) -> &mut Option<f64> {
        match pollutant {
            Pollutant::Pm10 => &mut self.pm10_concentration,
            Pollutant::Pm25 => &mut self.pm25_concentration,
            Pollutant::No2 => &mut self.no2_concentration,
        }
    }

    /// The pollutant concentration, or `None` when the cell is missing.
    ///
    /// `NaN` and infinities count as missing.
    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        let value = match pollutant {
            Pollutant::Pm10 => self.pm10_concentration,
            Pollutant::Pm25 => self.pm25_concentration,
            Pollutant::No2 => self.no2_concentration,
        };
        value.filter(|v| v.is_finite())
    }

    /// Grouping key: the trimmed city name, `None` when blank.
    pub fn city_key(&self) -> Option<&str> {
        let city = self.city.trim();
        (!city.is_empty()).then_some(city)
    }

    /// `(latitude, longitude)` when both are present and within range.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
    }
}
