//! Detection engine: percentile box tests, the optimal-window search,
//! sample-size bisection, and chronological cross-validation.

pub mod boxtest;
mod evaluator;
mod result;
mod timeline;

pub use boxtest::{box_test, box_test_window, optimal_box, overlap_window, percentile_index};
pub use evaluator::{EvalError, Evaluator};
pub use result::{DetectionResult, Evaluation, Marker, Outcome};
pub use timeline::{Timeline, TIMELINE_BUCKETS};
