//! Semicolon-delimited export of validation results.
//!
//! One row per validation attempt. Marker strings concatenate the
//! per-sub-window `o`/`x` markers without a separator, and every row
//! carries its pass and fail counts next to the markers.

use crate::evaluation::{DetectionResult, Marker};

/// Column header row, including the trailing separator.
pub const CSV_HEADER: &str = "Input File;SecretA < SecretB;Optimal Box;Smallest Size;\
Confidence Interval;Graphic Overlaps Subset A;valid;invalid;Graphic Overlaps Subset B;\
valid;invalid;Graphic Significant Difference;valid;invalid;";

/// Render results as a semicolon-delimited table with a header row.
pub fn to_csv(results: &[DetectionResult]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&row(result));
        out.push('\n');
    }
    out
}

fn row(result: &DetectionResult) -> String {
    format!(
        "{};{};{};{};{:?};{};{};{};{};{};{};{};{};{};",
        result.source,
        result.pair(),
        result.window,
        result.sample_size,
        result.confidence,
        markers(&result.overlap_a),
        passed(&result.overlap_a),
        failed(&result.overlap_a),
        markers(&result.overlap_b),
        passed(&result.overlap_b),
        failed(&result.overlap_b),
        markers(&result.significant),
        passed(&result.significant),
        failed(&result.significant),
    )
}

fn markers(markers: &[Marker]) -> String {
    markers.iter().map(Marker::to_string).collect()
}

fn passed(markers: &[Marker]) -> usize {
    markers.iter().filter(|m| m.passed()).count()
}

fn failed(markers: &[Marker]) -> usize {
    markers.len() - passed(markers)
}
