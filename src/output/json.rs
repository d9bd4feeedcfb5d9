//! JSON serialization for evaluation results.

use crate::evaluation::Evaluation;

/// Serialize an Evaluation to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// Evaluation).
pub fn to_json(evaluation: &Evaluation) -> Result<String, serde_json::Error> {
    serde_json::to_string(evaluation)
}

/// Serialize an Evaluation to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// Evaluation).
pub fn to_json_pretty(evaluation: &Evaluation) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{DetectionResult, Marker, Outcome, Timeline};
    use crate::types::Window;

    fn make_evaluation() -> Evaluation {
        let mut timeline = Timeline::new("timeline-0-secret0-smaller-secret1".to_string());
        timeline.mark_span(0, 100);
        Evaluation {
            results: vec![DetectionResult {
                source: "timings.csv".to_string(),
                secret_a: "secret0".to_string(),
                secret_b: "secret1".to_string(),
                window: Window::new(0.0, 1.0).unwrap(),
                sample_size: 13,
                confidence: 100.0,
                significant: vec![Marker::Pass, Marker::Pass],
                overlap_a: vec![Marker::Pass],
                overlap_b: vec![Marker::Fail],
                outcome: Outcome::Accepted,
            }],
            timelines: vec![timeline],
        }
    }

    #[test]
    fn test_to_json() {
        let evaluation = make_evaluation();
        let json = to_json(&evaluation).unwrap();
        assert!(json.contains("\"confidence\":100.0"));
        assert!(json.contains("\"sample_size\":13"));
        assert!(json.contains("\"outcome\":\"Accepted\""));
        assert!(json.contains("\"significant\":[\"o\",\"o\"]"));
        assert!(json.contains("\"overlap_b\":[\"x\"]"));
        assert!(json.contains("timeline-0-secret0-smaller-secret1"));
    }

    #[test]
    fn test_to_json_pretty() {
        let evaluation = make_evaluation();
        let json = to_json_pretty(&evaluation).unwrap();
        assert!(json.contains('\n')); // Pretty print has newlines
        assert!(json.contains("confidence"));
    }

    #[test]
    fn test_round_trip() {
        let evaluation = make_evaluation();
        let json = to_json(&evaluation).unwrap();
        let back: Evaluation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results.len(), 1);
        assert_eq!(back.results[0].pair(), "secret0<secret1");
        assert_eq!(back.timelines[0].counts(), evaluation.timelines[0].counts());
    }
}
