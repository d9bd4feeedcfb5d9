//! In-memory measurement data.
//!
//! A [`Dataset`] holds one [`Secret`] per label, each owning its measurements
//! in chronological (arrival) order. Latency-sorted views are materialized on
//! demand; chronological sub-windows are checked slices over the same records,
//! so a window can never silently run past the end of a secret's data.

mod reader;

pub use reader::{read_delimited, read_file, ReadError};

use std::collections::HashMap;

/// A single latency sample.
///
/// Sorting order is latency ascending with ties broken by global arrival
/// order, so latency sorts are deterministic for any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Measurement {
    /// Exact integer latency.
    pub value: i64,
    /// Global arrival index, unique and monotonic across the whole input.
    pub row: usize,
    /// Arrival index within the owning secret, contiguous from 0.
    pub ordinal: usize,
}

/// Error raised when a chronological window lookup exceeds a secret's data.
#[derive(Debug, Clone)]
pub struct IntegrityError {
    /// Secret whose data was sliced.
    pub secret: String,
    /// Requested window start (ordinal).
    pub start: usize,
    /// Requested window length.
    pub len: usize,
    /// Measurements actually stored.
    pub available: usize,
}

impl std::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chronological window [{}, {}) of secret '{}' exceeds its {} measurements",
            self.start,
            self.start + self.len,
            self.secret,
            self.available
        )
    }
}

impl std::error::Error for IntegrityError {}

/// A labeled group of latency measurements for one input class under test.
#[derive(Debug, Clone)]
pub struct Secret {
    name: String,
    ident: String,
    measurements: Vec<Measurement>,
}

impl Secret {
    pub(crate) fn new(name: impl Into<String>, ident: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ident: ident.into(),
            measurements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, value: i64, row: usize) {
        let ordinal = self.measurements.len();
        self.measurements.push(Measurement {
            value,
            row,
            ordinal,
        });
    }

    /// The label as it appeared in the input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generated file-safe identifier (`secret0`, `secret1`, ... in
    /// first-seen order), used in timeline names and result rows.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True if the secret holds no measurements.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// All measurements in chronological order. `ordinal` equals the
    /// position in this slice.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// A freshly sorted copy of the measurements, latency ascending with
    /// arrival-order tie-break.
    pub fn sorted_by_latency(&self) -> Vec<Measurement> {
        let mut sorted = self.measurements.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Chronological tail starting at `start`. A start at or past the end
    /// yields an empty slice.
    pub fn tail(&self, start: usize) -> &[Measurement] {
        self.measurements.get(start..).unwrap_or(&[])
    }

    /// Chronological window `[start, start + len)`.
    ///
    /// Fails with [`IntegrityError`] when the window does not fit; a short
    /// or empty slice is never returned in its place.
    pub fn window(&self, start: usize, len: usize) -> Result<&[Measurement], IntegrityError> {
        start
            .checked_add(len)
            .and_then(|end| self.measurements.get(start..end))
            .ok_or_else(|| IntegrityError {
                secret: self.name.clone(),
                start,
                len,
                available: self.measurements.len(),
            })
    }

    /// Smallest latency, `None` when empty.
    pub fn min(&self) -> Option<i64> {
        self.measurements.iter().map(|m| m.value).min()
    }

    /// Largest latency, `None` when empty.
    pub fn max(&self) -> Option<i64> {
        self.measurements.iter().map(|m| m.value).max()
    }

    /// Arithmetic mean latency, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.measurements.is_empty() {
            return None;
        }
        let sum: i64 = self.measurements.iter().map(|m| m.value).sum();
        Some(sum as f64 / self.measurements.len() as f64)
    }

    /// Median latency (midpoint average for even counts), `None` when empty.
    pub fn median(&self) -> Option<f64> {
        if self.measurements.is_empty() {
            return None;
        }
        let sorted = self.sorted_by_latency();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Some(sorted[mid].value as f64)
        } else {
            Some((sorted[mid - 1].value + sorted[mid].value) as f64 / 2.0)
        }
    }
}

/// The full set of secrets for one run.
///
/// Secrets are kept in first-seen order; recording a measurement under a new
/// label creates the secret and assigns its identifier.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    source: String,
    secrets: Vec<Secret>,
    by_name: HashMap<String, usize>,
    rows: usize,
}

impl Dataset {
    /// Create an empty dataset with a display name and a measurement source
    /// (typically the input file path).
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            secrets: Vec::new(),
            by_name: HashMap::new(),
            rows: 0,
        }
    }

    /// Display name of the dataset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the measurements came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Record one measurement under `label`, assigning the next global
    /// arrival index.
    pub fn record(&mut self, label: &str, value: i64) {
        let idx = match self.by_name.get(label) {
            Some(&idx) => idx,
            None => {
                let idx = self.secrets.len();
                let ident = format!("secret{}", idx);
                self.secrets.push(Secret::new(label, ident));
                self.by_name.insert(label.to_string(), idx);
                idx
            }
        };
        self.secrets[idx].push(value, self.rows);
        self.rows += 1;
    }

    /// All secrets in first-seen order.
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    /// Look up a secret by its input label.
    pub fn secret(&self, label: &str) -> Option<&Secret> {
        self.by_name.get(label).map(|&idx| &self.secrets[idx])
    }

    /// Total number of recorded measurements.
    pub fn measurement_count(&self) -> usize {
        self.rows
    }
}
