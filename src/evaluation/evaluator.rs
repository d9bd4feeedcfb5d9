//! Pair evaluation pipeline.
//!
//! For every ordered secret pair the evaluator acquires a detection window
//! (user-supplied or found by the optimal-window search), estimates the
//! smallest usable sample size by bisection, then validates that size over
//! disjoint chronological sub-windows, doubling the size until the
//! validation holds or the data runs out.

use crate::config::Config;
use crate::dataset::{Dataset, IntegrityError, Measurement, Secret};
use crate::evaluation::boxtest;
use crate::evaluation::result::{DetectionResult, Evaluation, Marker, Outcome};
use crate::evaluation::timeline::Timeline;
use crate::types::Window;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Errors that abort an evaluation run.
///
/// Pair-local conditions (no detectable difference, no usable sample size)
/// are not errors; they are logged and the pair is skipped.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// User-supplied detection window outside `[0, 1]` or with inverted
    /// bounds.
    InvalidWindow {
        /// Lower fraction as configured.
        lower: f64,
        /// Upper fraction as configured.
        upper: f64,
    },
    /// Configured fixed sample size of zero.
    InvalidSampleSize,
    /// A chronological window lookup ran past the end of a secret's data.
    Integrity(IntegrityError),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::InvalidWindow { lower, upper } => {
                write!(
                    f,
                    "detection window {:?}-{:?} out of range: bounds must satisfy 0 <= lower < upper <= 1",
                    lower, upper
                )
            }
            EvalError::InvalidSampleSize => {
                write!(f, "fixed sample size must be at least 1")
            }
            EvalError::Integrity(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Integrity(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IntegrityError> for EvalError {
    fn from(e: IntegrityError) -> Self {
        EvalError::Integrity(e)
    }
}

/// Everything one pair evaluation produced.
struct PairOutcome {
    timeline: Option<Timeline>,
    attempts: Vec<DetectionResult>,
}

/// One validated attempt before its outcome is known.
struct Attempt {
    sample_size: usize,
    confidence: f64,
    wrong: usize,
    significant: Vec<Marker>,
    overlap_a: Vec<Marker>,
    overlap_b: Vec<Marker>,
}

impl Attempt {
    fn into_result(
        self,
        source: &str,
        a: &Secret,
        b: &Secret,
        window: Window,
        outcome: Outcome,
    ) -> DetectionResult {
        DetectionResult {
            source: source.to_string(),
            secret_a: a.ident().to_string(),
            secret_b: b.ident().to_string(),
            window,
            sample_size: self.sample_size,
            confidence: self.confidence,
            significant: self.significant,
            overlap_a: self.overlap_a,
            overlap_b: self.overlap_b,
            outcome,
        }
    }
}

/// Orchestrates detection across all ordered secret pairs of a dataset.
///
/// ```no_run
/// use leakbox::{Dataset, Evaluator};
///
/// let mut dataset = Dataset::new("demo", "memory");
/// // ... record measurements ...
/// let evaluation = Evaluator::new().run(&dataset)?;
/// for result in evaluation.accepted() {
///     println!("{}: confidence {}", result.pair(), result.confidence);
/// }
/// # Ok::<(), leakbox::EvalError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: Config,
}

impl Evaluator {
    /// Create an evaluator with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create an evaluator from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Use a fixed detection window instead of searching one per pair.
    pub fn window(mut self, lower: f64, upper: f64) -> Self {
        self.config.window = Some((lower, upper));
        self
    }

    /// Validate every pair at this sample size instead of bisecting.
    pub fn fixed_sample_size(mut self, size: usize) -> Self {
        self.config.fixed_sample_size = Some(size);
        self
    }

    /// Override the bisection stop floor.
    pub fn bisection_floor(mut self, floor: usize) -> Self {
        self.config.bisection_floor = floor;
        self
    }

    /// Evaluate all ordered secret pairs of `dataset`.
    ///
    /// Fails fast on configuration errors; a data-integrity failure inside
    /// any pair aborts the run. Pairs without a detectable difference are
    /// skipped with a warning and leave no result.
    pub fn run(&self, dataset: &Dataset) -> Result<Evaluation, EvalError> {
        let user_window = match self.config.window {
            Some((lower, upper)) => Some(Window::new(lower, upper)?),
            None => None,
        };
        if self.config.fixed_sample_size == Some(0) {
            return Err(EvalError::InvalidSampleSize);
        }

        let secrets = dataset.secrets();
        let mut pairs: Vec<(&Secret, &Secret)> = Vec::new();
        for (i, a) in secrets.iter().enumerate() {
            for (j, b) in secrets.iter().enumerate() {
                if i != j {
                    pairs.push((a, b));
                }
            }
        }

        let source = dataset.source();

        #[cfg(feature = "parallel")]
        let outcomes: Result<Vec<PairOutcome>, EvalError> = crate::thread_pool::install(|| {
            pairs
                .par_iter()
                .enumerate()
                .map(|(id, &(a, b))| self.evaluate_pair(source, id, a, b, user_window))
                .collect()
        });

        #[cfg(not(feature = "parallel"))]
        let outcomes: Result<Vec<PairOutcome>, EvalError> = pairs
            .iter()
            .enumerate()
            .map(|(id, &(a, b))| self.evaluate_pair(source, id, a, b, user_window))
            .collect();

        let mut results = Vec::new();
        let mut timelines = Vec::new();
        for outcome in outcomes? {
            if let Some(timeline) = outcome.timeline {
                timelines.push(timeline);
            }
            results.extend(outcome.attempts);
        }
        Ok(Evaluation { results, timelines })
    }

    /// Evaluate one ordered pair: window acquisition, size search, then the
    /// validation attempt loop.
    fn evaluate_pair(
        &self,
        source: &str,
        pair_id: usize,
        a: &Secret,
        b: &Secret,
        user_window: Option<Window>,
    ) -> Result<PairOutcome, EvalError> {
        let mut timeline = None;

        let window = match user_window {
            Some(window) => window,
            None => {
                let sorted_a = a.sorted_by_latency();
                let sorted_b = b.sorted_by_latency();
                eprintln!(
                    "[DEBUG] {} < {}: {} degenerate percentile windows at sizes {}/{}",
                    a.name(),
                    b.name(),
                    boxtest::degenerate_windows(sorted_a.len(), sorted_b.len()),
                    sorted_a.len(),
                    sorted_b.len()
                );

                let mut pair_timeline = Timeline::new(format!(
                    "timeline-{}-{}-smaller-{}",
                    pair_id,
                    a.ident(),
                    b.ident()
                ));
                let found = boxtest::optimal_box(&sorted_a, &sorted_b, &mut pair_timeline);
                // the timeline is kept even when nothing was detected
                timeline = Some(pair_timeline);

                match found {
                    Some(window) => {
                        eprintln!(
                            "[DEBUG] {} < {}: optimal window {}",
                            a.name(),
                            b.name(),
                            window
                        );
                        window
                    }
                    None => {
                        eprintln!(
                            "[WARNING] {} < {}: no significant difference found; measure more samples",
                            a.name(),
                            b.name()
                        );
                        return Ok(PairOutcome {
                            timeline,
                            attempts: Vec::new(),
                        });
                    }
                }
            }
        };

        let size = match self.config.fixed_sample_size {
            Some(size) => size,
            None => self.search_smallest_size(a, b),
        };
        if size == 0 {
            eprintln!(
                "[WARNING] {} < {}: no usable sample size; skipping pair",
                a.name(),
                b.name()
            );
            return Ok(PairOutcome {
                timeline,
                attempts: Vec::new(),
            });
        }

        let cap = a.len().min(b.len());
        if size > cap {
            eprintln!(
                "[WARNING] {} < {}: sample size {} exceeds the {} available samples; skipping pair",
                a.name(),
                b.name(),
                size,
                cap
            );
            return Ok(PairOutcome {
                timeline,
                attempts: Vec::new(),
            });
        }

        let mut attempts = Vec::new();
        let mut current = size;
        loop {
            let attempt = self.validate(a, b, current, window)?;
            if attempt.wrong == 0 {
                eprintln!(
                    "[DEBUG] {} < {}: valid minimal measures per secret: {}",
                    a.name(),
                    b.name(),
                    current
                );
                attempts.push(attempt.into_result(source, a, b, window, Outcome::Accepted));
                break;
            }
            match current.checked_mul(2).filter(|&doubled| doubled <= cap) {
                Some(doubled) => {
                    attempts.push(attempt.into_result(source, a, b, window, Outcome::Escalated));
                    current = doubled;
                }
                None => {
                    eprintln!(
                        "[WARNING] {} < {}: subsets failed at size {} and doubling exceeds the {} available samples",
                        a.name(),
                        b.name(),
                        current,
                        cap
                    );
                    attempts.push(attempt.into_result(source, a, b, window, Outcome::Exhausted));
                    break;
                }
            }
        }

        Ok(PairOutcome { timeline, attempts })
    }

    /// Bisect toward the smallest sample count that still reproduces a
    /// positive box test.
    ///
    /// Each round halves the kept chronological tail of both secrets,
    /// re-sorts, and re-tests; the answer is the pair-minimum length from
    /// the round before the test broke or the floor was hit. Returns 0
    /// only when a secret is empty.
    fn search_smallest_size(&self, a: &Secret, b: &Secret) -> usize {
        let mut cur_a = a.sorted_by_latency();
        let mut cur_b = b.sorted_by_latency();
        let mut smallest;
        let mut bisector = 100.0_f64;
        let mut rounds = 0u32;

        loop {
            smallest = cur_a.len().min(cur_b.len());
            rounds += 1;
            bisector -= bisector / 2.0;

            cur_a = sorted_tail(a, bisector);
            cur_b = sorted_tail(b, bisector);

            if cur_a.len() <= self.config.bisection_floor
                || cur_b.len() <= self.config.bisection_floor
            {
                break;
            }
            if !boxtest::box_test(&cur_a, &cur_b) {
                break;
            }
        }

        if rounds > 1 {
            eprintln!(
                "[DEBUG] {} < {}: minimal measures per secret: {}",
                a.name(),
                b.name(),
                smallest
            );
        }
        smallest
    }

    /// Validate one sample size: partition both chronological streams into
    /// disjoint windows of that length and re-test each against the fixed
    /// detection window.
    fn validate(
        &self,
        a: &Secret,
        b: &Secret,
        size: usize,
        window: Window,
    ) -> Result<Attempt, EvalError> {
        let number_subsets = (a.len() / size).min(b.len() / size);
        debug_assert!(number_subsets > 0);
        // the remainder is discarded at the front of each stream
        let rest_a = a.len() % (number_subsets * size);
        let rest_b = b.len() % (number_subsets * size);

        let mut significant = Vec::with_capacity(number_subsets);
        let mut overlap_a = Vec::with_capacity(number_subsets.saturating_sub(1));
        let mut overlap_b = Vec::with_capacity(number_subsets.saturating_sub(1));
        let mut wrong = 0usize;

        let mut prev_a: Vec<Measurement> = Vec::new();
        let mut prev_b: Vec<Measurement> = Vec::new();

        for k in 0..number_subsets {
            let mut subset_a = a.window(rest_a + size * k, size)?.to_vec();
            let mut subset_b = b.window(rest_b + size * k, size)?.to_vec();
            subset_a.sort_unstable();
            subset_b.sort_unstable();

            let mut invalid = 0;
            if boxtest::box_test_window(&subset_a, &subset_b, window) {
                significant.push(Marker::Pass);
            } else {
                significant.push(Marker::Fail);
                invalid += 1;
            }

            if k > 0 {
                if boxtest::overlap_window(&prev_a, &subset_a, window) {
                    overlap_a.push(Marker::Pass);
                } else {
                    overlap_a.push(Marker::Fail);
                    invalid += 1;
                }
                if boxtest::overlap_window(&prev_b, &subset_b, window) {
                    overlap_b.push(Marker::Pass);
                } else {
                    overlap_b.push(Marker::Fail);
                    invalid += 1;
                }
            }

            if invalid > 0 {
                wrong += 1;
            }
            prev_a = subset_a;
            prev_b = subset_b;
        }

        let confidence = (100 - wrong * 100 / number_subsets) as f64;
        eprintln!(
            "[DEBUG] {} < {}: validate size {}: {} of {} subsets returned wrong results",
            a.name(),
            b.name(),
            size,
            wrong,
            number_subsets
        );

        Ok(Attempt {
            sample_size: size,
            confidence,
            wrong,
            significant,
            overlap_a,
            overlap_b,
        })
    }
}

/// Latency-sorted chronological tail keeping the most recent `bisector`
/// percent of a secret's stream.
fn sorted_tail(secret: &Secret, bisector: f64) -> Vec<Measurement> {
    let n = secret.len() as f64;
    let start = (n - n * bisector / 100.0) as usize;
    let mut tail = secret.tail(start).to_vec();
    tail.sort_unstable();
    tail
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interleave two labeled streams 1:1 in arrival order.
    fn interleaved(fast: &[i64], slow: &[i64]) -> Dataset {
        let mut ds = Dataset::new("unit", "memory");
        for i in 0..fast.len().max(slow.len()) {
            if i < fast.len() {
                ds.record("fast", fast[i]);
            }
            if i < slow.len() {
                ds.record("slow", slow[i]);
            }
        }
        ds
    }

    fn separated_dataset() -> Dataset {
        let fast: Vec<i64> = (0..100).map(|i| 100 + (i % 10)).collect();
        let slow: Vec<i64> = (0..100).map(|i| 200 + (i % 10)).collect();
        interleaved(&fast, &slow)
    }

    #[test]
    fn separated_pair_is_accepted_with_the_full_window() {
        let evaluation = Evaluator::new().run(&separated_dataset()).unwrap();

        assert_eq!(evaluation.results.len(), 1);
        let result = &evaluation.results[0];
        assert_eq!(result.secret_a, "secret0");
        assert_eq!(result.secret_b, "secret1");
        assert_eq!(result.outcome, Outcome::Accepted);
        assert_eq!(result.window.points(), (0, 100));
        assert_eq!(result.sample_size, 13);
        assert_eq!(result.confidence, 100.0);
        assert!(result.significant.iter().all(|m| m.passed()));
        assert!(result.overlap_a.iter().all(|m| m.passed()));
        assert!(result.overlap_b.iter().all(|m| m.passed()));

        // both orderings were searched, only one detected
        assert_eq!(evaluation.timelines.len(), 2);
        assert_eq!(
            evaluation.timelines[0].name(),
            "timeline-0-secret0-smaller-secret1"
        );
        assert_eq!(
            evaluation.timelines[1].name(),
            "timeline-1-secret1-smaller-secret0"
        );
        assert!(evaluation.timelines[0].max_count() > 0);
        assert_eq!(evaluation.timelines[1].max_count(), 0);
    }

    #[test]
    fn identical_distributions_are_skipped_without_results() {
        let values: Vec<i64> = (0..60).map(|i| 500 + (i % 7)).collect();
        let ds = interleaved(&values, &values);
        let evaluation = Evaluator::new().run(&ds).unwrap();

        assert!(evaluation.results.is_empty());
        // the search still leaves a timeline per ordered pair
        assert_eq!(evaluation.timelines.len(), 2);
    }

    #[test]
    fn invalid_window_aborts_the_run() {
        let ds = separated_dataset();
        let err = Evaluator::new().window(0.9, 0.1).run(&ds).unwrap_err();
        assert!(matches!(err, EvalError::InvalidWindow { .. }));
        let err = Evaluator::new().window(0.0, 1.5).run(&ds).unwrap_err();
        assert!(matches!(err, EvalError::InvalidWindow { .. }));
    }

    #[test]
    fn zero_fixed_sample_size_aborts_the_run() {
        let err = Evaluator::new()
            .fixed_sample_size(0)
            .run(&separated_dataset())
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidSampleSize));
    }

    #[test]
    fn user_window_skips_the_search_and_records_the_reverse_failure() {
        let evaluation = Evaluator::new()
            .window(0.0, 1.0)
            .run(&separated_dataset())
            .unwrap();

        assert!(evaluation.timelines.is_empty());
        assert_eq!(evaluation.results.len(), 2);

        let forward = &evaluation.results[0];
        assert_eq!(forward.pair(), "secret0<secret1");
        assert_eq!(forward.outcome, Outcome::Accepted);

        // the user window applies to every ordered pair; the reverse
        // direction fails validation until the data runs out
        let reverse = &evaluation.results[1];
        assert_eq!(reverse.pair(), "secret1<secret0");
        assert_eq!(reverse.outcome, Outcome::Exhausted);
        assert_eq!(reverse.sample_size, 100);
        assert_eq!(reverse.confidence, 0.0);
    }

    #[test]
    fn fixed_sample_size_is_used_directly() {
        let evaluation = Evaluator::new()
            .fixed_sample_size(25)
            .run(&separated_dataset())
            .unwrap();

        assert_eq!(evaluation.results.len(), 1);
        let result = &evaluation.results[0];
        assert_eq!(result.sample_size, 25);
        assert_eq!(result.outcome, Outcome::Accepted);
        assert_eq!(result.significant.len(), 4);
        // the search still ran to find the window
        assert_eq!(evaluation.timelines.len(), 2);
    }

    #[test]
    fn oversized_fixed_sample_size_skips_the_pair() {
        let evaluation = Evaluator::new()
            .fixed_sample_size(1000)
            .run(&separated_dataset())
            .unwrap();

        assert!(evaluation.results.is_empty());
        assert_eq!(evaluation.timelines.len(), 2);
    }

    #[test]
    fn failed_validation_escalates_by_doubling() {
        // the fast stream drifts upward halfway through, so consecutive
        // sub-windows of size 20 do not overlap and the first attempt fails
        let fast: Vec<i64> = (0..40)
            .map(|i| if i < 20 { 100 + (i % 10) } else { 160 + (i % 10) })
            .collect();
        let slow: Vec<i64> = (0..40).map(|i| 1000 + (i % 10)).collect();
        let evaluation = Evaluator::new().run(&interleaved(&fast, &slow)).unwrap();

        assert_eq!(evaluation.results.len(), 2);

        let first = &evaluation.results[0];
        assert_eq!(first.outcome, Outcome::Escalated);
        assert_eq!(first.sample_size, 20);
        assert_eq!(first.confidence, 50.0);
        assert_eq!(first.significant, vec![Marker::Pass, Marker::Pass]);
        assert_eq!(first.overlap_a, vec![Marker::Fail]);
        assert_eq!(first.overlap_b, vec![Marker::Pass]);

        let second = &evaluation.results[1];
        assert_eq!(second.outcome, Outcome::Accepted);
        assert_eq!(second.sample_size, 40);
        assert_eq!(second.confidence, 100.0);
        assert_eq!(second.significant, vec![Marker::Pass]);
        assert!(second.overlap_a.is_empty());
    }

    #[test]
    fn smallest_size_never_grows_with_more_data() {
        let mut sizes = Vec::new();
        for n in [20, 50, 100, 400] {
            let fast: Vec<i64> = (0..n).map(|i| 100 + (i % 10)).collect();
            let slow: Vec<i64> = (0..n).map(|i| 200 + (i % 10)).collect();
            let evaluation = Evaluator::new().run(&interleaved(&fast, &slow)).unwrap();
            sizes.push(evaluation.accepted().next().unwrap().sample_size);
        }
        assert_eq!(sizes, vec![20, 13, 13, 13]);
        assert!(sizes.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn runs_are_deterministic() {
        let ds = separated_dataset();
        let first = Evaluator::new().run(&ds).unwrap();
        let second = Evaluator::new().run(&ds).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn integrity_errors_carry_their_context() {
        let err = EvalError::from(IntegrityError {
            secret: "fast".to_string(),
            start: 5,
            len: 10,
            available: 8,
        });
        assert!(matches!(err, EvalError::Integrity(_)));
        assert!(err.to_string().contains("'fast'"));
        assert!(err.to_string().contains("8"));
    }
}
