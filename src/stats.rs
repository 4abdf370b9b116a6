use std::f64::consts::PI;
use std::fmt;

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Count, mean, sample standard deviation, min, quartiles and max of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    /// Describe the finite values of `values`; anything else is ignored.
    /// Empty input gives `count == 0` and NaN everywhere else.
    pub fn of(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if count > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.50),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "{label:<8}{value:>16.6}")?;
        }
        Ok(())
    }
}

/// Linear-interpolation quantile of an ascending slice, NaN when empty.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

// ---------------------------------------------------------------------------
// Distribution curves
// ---------------------------------------------------------------------------

/// Empirical CDF of `values` evaluated at every point of `x`:
/// the fraction of samples `≤ x`. Empty input gives zeros.
pub fn ecdf(values: &[f64], x: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    x.iter()
        .map(|&xi| {
            if n == 0 {
                return 0.0;
            }
            sorted.partition_point(|&v| v <= xi) as f64 / n as f64
        })
        .collect()
}

/// Gaussian kernel density of `values` evaluated at every point of `x`,
/// bandwidth from Scott's rule `σ · n^(-1/5)`.
/// Fewer than two samples or zero spread gives zeros.
pub fn gaussian_kde(values: &[f64], x: &[f64]) -> Vec<f64> {
    let stats = Describe::of(values);
    let bandwidth = stats.std * (stats.count as f64).powf(-0.2);
    if stats.count < 2 || !bandwidth.is_finite() || bandwidth <= 0.0 {
        return vec![0.0; x.len()];
    }
    let norm = 1.0 / (stats.count as f64 * bandwidth * (2.0 * PI).sqrt());
    x.iter()
        .map(|&xi| {
            values
                .iter()
                .filter(|v| v.is_finite())
                .map(|&v| {
                    let z = (xi - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect()
}
