// Population z-scores over a player pool.

/// Mean and standard deviation for one column across the player pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

impl PoolStats {
    /// True when the pool has no spread to score against.
    pub fn is_degenerate(&self) -> bool {
        self.stdev < STDEV_EPSILON
    }
}

/// Compute mean and standard deviation for a slice of values.
///
/// Returns `PoolStats { mean: 0.0, stdev: 0.0 }` for an empty slice.
/// Uses the population standard deviation (N denominator): the catalog is
/// the whole player universe for the draft, not a sample of it.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Compute a z-score given a value and pool stats.
///
/// Returns 0.0 when the pool is degenerate.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.is_degenerate() {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}
