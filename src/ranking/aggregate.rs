use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ranking::types::{CityAggregate, Observation};
use crate::ranking::utility::{mean, stddev};

/// Groups observations by city and averages each group.
///
/// Groups come out in the order their city was first seen, which is what
/// [`rank`] relies on to keep ties stable.
pub fn aggregate(observations: &[Observation<'_>]) -> Vec<CityAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();

    for obs in observations {
        let slot = *index.entry(obs.city).or_insert_with(|| {
            groups.push((obs.city, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(obs.value);
    }

    groups
        .into_iter()
        .map(|(city, values)| {
            let avg = mean(&values);
            CityAggregate {
                city: city.to_string(),
                mean: avg,
                stddev: stddev(&values, avg),
                samples: values.len(),
            }
        })
        .collect()
}

/// Sorts by mean, highest first, and keeps the first `n`.
///
/// The sort is stable, so cities with equal means keep their input order.
pub fn rank(mut aggregates: Vec<CityAggregate>, n: usize) -> Vec<CityAggregate> {
    sort_descending(&mut aggregates);
    aggregates.truncate(n);
    aggregates
}

pub(crate) fn sort_descending(aggregates: &mut [CityAggregate]) {
    aggregates.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(Ordering::Equal));
}
