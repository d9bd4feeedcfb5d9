//! Configuration for pair evaluation.

/// Configuration options for [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional user-supplied detection window as percentile fractions
    /// `(lower, upper)` with `0.0 <= lower < upper <= 1.0` (default: `None`).
    ///
    /// When set, the optimal-window search is skipped for every pair and no
    /// timelines are produced; all pairs are validated against this window.
    pub window: Option<(f64, f64)>,

    /// Optional fixed validation sample size (default: `None`).
    ///
    /// When set, the minimum-sample-size search is skipped and every pair is
    /// validated at this size directly. Escalation by doubling still applies.
    /// Must be at least 1.
    pub fixed_sample_size: Option<usize>,

    /// Stop the bisection search once either truncated sequence has at most
    /// this many measurements (default: 10).
    pub bisection_floor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: None,
            fixed_sample_size: None,
            bisection_floor: 10,
        }
    }
}
