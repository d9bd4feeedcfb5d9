//! Detection result types.

use serde::{Deserialize, Serialize};

use crate::evaluation::timeline::Timeline;
use crate::types::Window;

/// Pass/fail marker for one validated sub-window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    /// The sub-window reproduced the expected relation.
    #[serde(rename = "o")]
    Pass,
    /// The sub-window contradicted it.
    #[serde(rename = "x")]
    Fail,
}

impl Marker {
    /// True for [`Marker::Pass`].
    pub fn passed(self) -> bool {
        matches!(self, Marker::Pass)
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Pass => write!(f, "o"),
            Marker::Fail => write!(f, "x"),
        }
    }
}

/// How one validation attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every sub-window passed; the sample size is validated.
    Accepted,
    /// A sub-window failed and the attempt was retried at double the size.
    Escalated,
    /// A sub-window failed and doubling would exceed the available samples.
    Exhausted,
}

/// The recorded outcome of one validation attempt for one secret pair.
///
/// A pair produces one record per attempt, so an escalating pair leaves a
/// trail of `Escalated` records behind its final `Accepted` or `Exhausted`
/// one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Where the measurements came from.
    pub source: String,

    /// Identifier of the secret expected to be smaller.
    pub secret_a: String,

    /// Identifier of the secret expected to be larger.
    pub secret_b: String,

    /// Detection window the attempt validated against.
    pub window: Window,

    /// Chronological sub-window length used for this attempt.
    pub sample_size: usize,

    /// Percentage of sub-windows whose tests all passed.
    pub confidence: f64,

    /// One marker per sub-window for the smaller-than test.
    pub significant: Vec<Marker>,

    /// One marker per consecutive sub-window pair of the smaller secret for
    /// the overlap test.
    pub overlap_a: Vec<Marker>,

    /// One marker per consecutive sub-window pair of the larger secret for
    /// the overlap test.
    pub overlap_b: Vec<Marker>,

    /// How the attempt ended.
    pub outcome: Outcome,
}

impl DetectionResult {
    /// True when this attempt validated its sample size.
    pub fn accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted)
    }

    /// The ordered pair as `a<b`.
    pub fn pair(&self) -> String {
        format!("{}<{}", self.secret_a, self.secret_b)
    }
}

/// Everything one evaluation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// One record per validation attempt, in pair order.
    pub results: Vec<DetectionResult>,

    /// One timeline per pair that went through the optimal-window search,
    /// in pair order.
    pub timelines: Vec<Timeline>,
}

impl Evaluation {
    /// Results that validated their sample size.
    pub fn accepted(&self) -> impl Iterator<Item = &DetectionResult> {
        self.results.iter().filter(|r| r.accepted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_render_as_o_and_x() {
        assert_eq!(Marker::Pass.to_string(), "o");
        assert_eq!(Marker::Fail.to_string(), "x");
        assert!(Marker::Pass.passed());
        assert!(!Marker::Fail.passed());
    }

    #[test]
    fn pair_formats_the_ordered_relation() {
        let result = DetectionResult {
            source: "run.csv".to_string(),
            secret_a: "secret0".to_string(),
            secret_b: "secret1".to_string(),
            window: Window::new(0.0, 1.0).unwrap(),
            sample_size: 50,
            confidence: 100.0,
            significant: vec![Marker::Pass, Marker::Pass],
            overlap_a: vec![Marker::Pass],
            overlap_b: vec![Marker::Pass],
            outcome: Outcome::Accepted,
        };
        assert_eq!(result.pair(), "secret0<secret1");
        assert!(result.accepted());
    }
}
