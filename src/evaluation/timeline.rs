//! Percentile timeline accumulator.

use serde::{Deserialize, Serialize};

/// Number of percentile points tracked, `0..=100`.
pub const TIMELINE_BUCKETS: usize = 101;

/// Per-pair accumulator of which percentile spans contributed to positive
/// detections during the optimal-window search.
///
/// One counter per percentile point; counters are only ever incremented.
/// The engine never renders timelines itself, it hands them to external
/// renderers under their generated names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    name: String,
    counts: Vec<u32>,
}

impl Timeline {
    /// Create a zeroed timeline under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counts: vec![0; TIMELINE_BUCKETS],
        }
    }

    /// Generated name identifying this timeline downstream.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increment the counter at one percentile point. Panics when `point`
    /// is greater than 100.
    pub fn increment(&mut self, point: usize) {
        self.counts[point] += 1;
    }

    /// Increment every percentile point in `lower..=upper`.
    pub fn mark_span(&mut self, lower: usize, upper: usize) {
        for point in lower..=upper {
            self.increment(point);
        }
    }

    /// The 101 bucket counters, indexed by percentile point.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// The largest bucket counter, 0 for an untouched timeline.
    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_with_101_buckets() {
        let timeline = Timeline::new("timeline-0-secret0-smaller-secret1");
        assert_eq!(timeline.counts().len(), TIMELINE_BUCKETS);
        assert!(timeline.counts().iter().all(|&c| c == 0));
        assert_eq!(timeline.max_count(), 0);
        assert_eq!(timeline.name(), "timeline-0-secret0-smaller-secret1");
    }

    #[test]
    fn mark_span_is_inclusive() {
        let mut timeline = Timeline::new("t");
        timeline.mark_span(10, 12);
        timeline.mark_span(12, 12);
        assert_eq!(timeline.counts()[9], 0);
        assert_eq!(timeline.counts()[10], 1);
        assert_eq!(timeline.counts()[11], 1);
        assert_eq!(timeline.counts()[12], 2);
        assert_eq!(timeline.counts()[13], 0);
        assert_eq!(timeline.max_count(), 2);
    }

    #[test]
    fn full_span_touches_every_bucket() {
        let mut timeline = Timeline::new("t");
        timeline.mark_span(0, 100);
        assert!(timeline.counts().iter().all(|&c| c == 1));
    }
}
