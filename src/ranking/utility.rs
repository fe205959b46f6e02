/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
///
/// Accumulated incrementally, so large finite inputs cannot overflow a sum.
pub fn mean(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0_f64, |acc, (i, v)| acc + (v - acc) / (i + 1) as f64)
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let deviations: Vec<f64> = values.iter().map(|v| (v - mean).powi(2)).collect();
    let variance = self::mean(&deviations);

    variance.sqrt()
}
