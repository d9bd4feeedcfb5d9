//! Terminal output formatting with colors.

use colored::Colorize;

use crate::dataset::{Dataset, Secret};
use crate::evaluation::{Evaluation, Marker, Outcome};

/// Format an evaluation for human-readable terminal output.
///
/// Shows the dataset summary, per-secret statistics, and one line per
/// validation attempt with its markers.
pub fn format_evaluation(dataset: &Dataset, evaluation: &Evaluation) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("leakbox\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Dataset: {} ({})\n",
        dataset.name(),
        dataset.source()
    ));
    output.push_str(&format!(
        "  Measurements: {} across {} secrets\n\n",
        dataset.measurement_count(),
        dataset.secrets().len()
    ));
    for secret in dataset.secrets() {
        output.push_str(&format_secret_line(secret));
    }
    output.push('\n');

    if evaluation.accepted().next().is_some() {
        output.push_str(&format!(
            "  {}\n\n",
            "\u{26A0} Timing difference detected".yellow().bold()
        ));
    } else {
        output.push_str(&format!(
            "  {}\n\n",
            "\u{2713} No timing difference validated".green().bold()
        ));
    }

    for result in &evaluation.results {
        output.push_str(&format!(
            "    {} {}  window {}  size {}  confidence {:.0}%\n",
            format_outcome(result.outcome),
            result.pair(),
            result.window,
            result.sample_size,
            result.confidence
        ));
        output.push_str(&format!(
            "      significant {}  overlap {} | {}\n",
            marker_string(&result.significant),
            marker_string(&result.overlap_a),
            marker_string(&result.overlap_b)
        ));
    }
    if !evaluation.results.is_empty() {
        output.push('\n');
    }

    if !evaluation.timelines.is_empty() {
        output.push_str(&format!(
            "  Timelines: {} recorded\n",
            evaluation.timelines.len()
        ));
        for timeline in &evaluation.timelines {
            let counts = timeline.counts();
            let peak = timeline.max_count();
            let bucket = counts.iter().position(|&c| c == peak).unwrap_or(0);
            output.push_str(&format!(
                "    {}: peak {} at {}%\n",
                timeline.name(),
                peak,
                bucket
            ));
        }
        output.push('\n');
    }

    output.push_str(&sep);
    output.push('\n');
    output.push_str(
        "Note: Confidence is the share of chronological sub-windows that reproduced the detection.\n",
    );

    output
}

fn format_secret_line(secret: &Secret) -> String {
    match (
        secret.min(),
        secret.max(),
        secret.mean(),
        secret.median(),
    ) {
        (Some(min), Some(max), Some(mean), Some(median)) => format!(
            "  {} [{}]: n={}  min={}  max={}  mean={:.1}  median={:.1}\n",
            secret.name(),
            secret.ident(),
            secret.len(),
            min,
            max,
            mean,
            median
        ),
        _ => format!("  {} [{}]: no measurements\n", secret.name(), secret.ident()),
    }
}

/// Format an Outcome as a colored status glyph.
fn format_outcome(outcome: Outcome) -> String {
    match outcome {
        Outcome::Accepted => "\u{2713}".green().bold().to_string(),
        Outcome::Escalated => "\u{26A0}".yellow().to_string(),
        Outcome::Exhausted => "\u{26A0}".red().bold().to_string(),
    }
}

fn marker_string(markers: &[Marker]) -> String {
    if markers.is_empty() {
        return "-".to_string();
    }
    markers.iter().map(Marker::to_string).collect()
}
