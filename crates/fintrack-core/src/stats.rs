//! Small descriptive statistics shared by the models

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`, 0.0 for fewer than two values
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ascending copy of `values`
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Truncated-index percentile: the value at `floor(p * n)` of sorted data.
///
/// The index is clamped to the last element so `p = 1.0` is well defined.
/// Not an interpolated quantile.
pub fn truncated_percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (p * sorted.len() as f64).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_eq!(m, 5.0);
        assert!((std_dev(&values, m) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[3.0], 3.0), 0.0);
    }

    #[test]
    fn test_truncated_percentile() {
        let data = sorted(&[50.0, 10.0, 40.0, 20.0, 30.0]);
        assert_eq!(truncated_percentile(&data, 0.5), 30.0);
        assert_eq!(truncated_percentile(&data, 0.9), 50.0);
        assert_eq!(truncated_percentile(&data, 0.25), 20.0);
        assert_eq!(truncated_percentile(&data, 1.0), 50.0);
        assert_eq!(truncated_percentile(&[], 0.5), 0.0);
    }
}
