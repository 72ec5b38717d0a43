/// Descriptive statistics for one group of samples.
///
/// `std_dev` is the sample standard deviation (n - 1 denominator). It is NaN
/// for a single sample, where the spread is undefined rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub std_dev: f64,
}

impl SeriesStats {
    /// Compute statistics, ignoring non-finite values.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let mean = mean(&vals)?;
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        vals.sort_by(|a, b| a.total_cmp(b));

        Some(SeriesStats {
            count,
            min,
            max,
            mean,
            q1: quantile(&vals, 0.25),
            median: quantile(&vals, 0.5),
            q3: quantile(&vals, 0.75),
            std_dev: sample_std(&vals),
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Quantile of already sorted values, interpolating linearly between the two
/// nearest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Sample standard deviation; NaN with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let count = values.len();
    if count < 2 {
        return f64::NAN;
    }
    let Some(m) = mean(values) else {
        return f64::NAN;
    };
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (count - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_samples() {
        let s = SeriesStats::compute(&[2.0, 4.0]).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean - 3.0).abs() < 1e-9);
        assert!((s.std_dev - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn single_sample_std_is_undefined() {
        let s = SeriesStats::compute(&[5.0]).unwrap();
        assert_eq!(s.mean, 5.0);
        assert!(s.std_dev.is_nan());
        assert_eq!((s.min, s.max), (5.0, 5.0));
    }

    #[test]
    fn non_finite_values_are_ignored() {
        assert!(SeriesStats::compute(&[f64::NAN]).is_none());
        let s = SeriesStats::compute(&[1.0, f64::NAN, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.median, 2.0);
    }

    #[test]
    fn quartiles_interpolate() {
        let s = SeriesStats::compute(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((s.q1 - 1.75).abs() < 1e-9);
        assert!((s.median - 2.5).abs() < 1e-9);
        assert!((s.q3 - 3.25).abs() < 1e-9);

        let single = SeriesStats::compute(&[7.0]).unwrap();
        assert_eq!((single.q1, single.median, single.q3), (7.0, 7.0, 7.0));
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn mean_is_exact() {
        let vals = [0.1, 0.2, 0.3, 0.4];
        assert!((mean(&vals).unwrap() - 0.25).abs() < 1e-9);
        assert_eq!(mean(&[]), None);
    }
}
