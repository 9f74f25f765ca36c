//! Sample Statistics
//!
//! Order statistics and moments over one benchmark's measurement samples.
//! The samples are sorted once on construction:
//! - Quantiles interpolate linearly between the two bracketing sorted samples
//! - Standard deviation uses the two-pass formula over `n - 1` degrees of freedom
//! - Every statistic of an empty sample set is `0.0`

/// Two-sided 95% normal-approximation critical value
pub const CONFIDENCE_Z: f64 = 1.96;

/// Statistics over a sorted copy of measurement samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStatistics {
    sorted: Vec<f64>,
}

impl SampleStatistics {
    /// Sort a copy of `samples` ascending
    pub fn new(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether no samples were recorded
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Samples in ascending order
    pub fn sorted(&self) -> &[f64] {
        &self.sorted
    }

    /// Interpolated value at `quantile`, a fraction in `[0, 1]`
    ///
    /// The sample position is `quantile * (n + 1)`. Positions below the first
    /// sample clamp to the minimum, positions at or past the last clamp to the
    /// maximum.
    ///
    /// # Panics
    ///
    /// Panics if `quantile` is outside `[0, 1]` or NaN.
    pub fn value_at(&self, quantile: f64) -> f64 {
        assert!(
            (0.0..=1.0).contains(&quantile),
            "quantile {quantile} is not in [0..1]"
        );

        let n = self.sorted.len();
        if n == 0 {
            return 0.0;
        }

        let pos = quantile * (n + 1) as f64;
        let index = pos as usize;
        if index < 1 {
            return self.sorted[0];
        }
        if index >= n {
            return self.sorted[n - 1];
        }

        let lower = self.sorted[index - 1];
        let upper = self.sorted[index];
        lower + (pos - pos.floor()) * (upper - lower)
    }

    /// Median (quantile 0.5)
    pub fn median(&self) -> f64 {
        self.value_at(0.5)
    }

    /// Smallest sample
    pub fn min(&self) -> f64 {
        self.sorted.first().copied().unwrap_or(0.0)
    }

    /// Largest sample
    pub fn max(&self) -> f64 {
        self.sorted.last().copied().unwrap_or(0.0)
    }

    /// Arithmetic mean
    pub fn mean(&self) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        self.sorted.iter().sum::<f64>() / self.sorted.len() as f64
    }

    /// Sample variance over `n - 1` degrees of freedom
    pub fn variance(&self) -> f64 {
        let n = self.sorted.len();
        if n <= 1 {
            return 0.0;
        }
        let mean = self.mean();
        self.sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    }

    /// Sample standard deviation
    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Half-width of the 95% confidence interval around the mean
    pub fn error_margin(&self) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        CONFIDENCE_Z * self.standard_deviation() / (self.sorted.len() as f64).sqrt()
    }

    /// `(mean - margin, mean + margin)`
    pub fn confidence_interval(&self) -> (f64, f64) {
        let mean = self.mean();
        let margin = self.error_margin();
        (mean - margin, mean + margin)
    }
}
