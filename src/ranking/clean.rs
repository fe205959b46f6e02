use crate::dataset::MeasurementRecord;
use crate::pollutant::Pollutant;
use crate::ranking::types::{Cleaned, Observation};

/// Keeps the records that have a value for `pollutant`.
///
/// Other pollutant columns are ignored: a row missing NO2 still counts
/// towards its PM10 mean.
pub fn clean(records: &[MeasurementRecord], pollutant: Pollutant) -> Cleaned<'_> {
    clean_joint(records, pollutant, &[])
}

/// Keeps the records that have a value for `pollutant` and for every
/// pollutant in `required`.
pub fn clean_joint<'a>(
    records: &'a [MeasurementRecord],
    pollutant: Pollutant,
    required: &[Pollutant],
) -> Cleaned<'a> {
    let mut cleaned = Cleaned::default();

    for record in records {
        let value = match record.concentration(pollutant) {
            Some(v) if required.iter().all(|p| record.concentration(*p).is_some()) => v,
            _ => {
                cleaned.missing_value += 1;
                continue;
            }
        };

        match record.city_key() {
            Some(city) => cleaned.observations.push(Observation { city, value }),
            None => cleaned.blank_city += 1,
        }
    }

    cleaned
}
