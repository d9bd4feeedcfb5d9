//! # leakbox
//!
//! Detect timing side channels in latency measurements.
//!
//! This crate takes labeled latency measurements (one stream per secret
//! input) and decides, for every ordered pair of secrets, whether one is
//! measurably faster than the other, outputting:
//! - The optimal percentile window where the separation shows
//! - The smallest validated sample size that reproduces the detection
//! - A confidence percentage from disjoint chronological sub-windows
//! - Per-percentile timelines of where detections cluster
//!
//! Detection uses percentile box tests over latency-sorted streams: a pair
//! counts as significant when some percentile window of one secret lies
//! entirely below the same window of the other. Validation replays the
//! test over disjoint chronological slices so a one-off burst cannot fake
//! a detection.
//!
//! ## Quick Start
//!
//! ```ignore
//! use leakbox::{read_file, Evaluator};
//!
//! let dataset = read_file("timings.csv")?;
//! let evaluation = Evaluator::new().run(&dataset)?;
//!
//! for result in evaluation.accepted() {
//!     println!(
//!         "{}: {} samples per secret suffice (confidence {:.0}%)",
//!         result.pair(),
//!         result.sample_size,
//!         result.confidence
//!     );
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod thread_pool;
mod types;

// Functional modules
pub mod dataset;
pub mod evaluation;
pub mod output;

// Re-exports for public API
pub use config::Config;
pub use dataset::{read_delimited, read_file, Dataset, IntegrityError, Measurement, ReadError, Secret};
pub use evaluation::{
    DetectionResult, EvalError, Evaluation, Evaluator, Marker, Outcome, Timeline,
};
pub use types::Window;

/// Convenience function for evaluating a dataset with default configuration.
///
/// Runs the full pipeline over every ordered secret pair: optimal-window
/// search, sample-size bisection, and chronological validation.
///
/// # Arguments
///
/// * `dataset` - Labeled latency measurements to evaluate
///
/// # Returns
///
/// An `Evaluation` with one result per validation attempt and one timeline
/// per searched pair.
pub fn evaluate(dataset: &Dataset) -> Result<Evaluation, EvalError> {
    Evaluator::new().run(dataset)
}
