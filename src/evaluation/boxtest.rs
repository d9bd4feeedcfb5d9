//! The percentile box test.
//!
//! Pure hypothesis-test primitives over latency-sorted measurement slices.
//! A "box" is a percentile window `(i, j)` with `0 <= i < j <= 100`; the
//! test asks whether one secret's window lies entirely below another's.
//! All index arithmetic is integer floor division on exact integer
//! latencies; no decision here involves floating point.

use crate::dataset::Measurement;
use crate::evaluation::timeline::Timeline;
use crate::types::Window;

/// Map a percentile point `p` in `0..=100` to an index into a sorted
/// sequence of length `n`.
///
/// This is a direct scaled index (`p*n/100`, with `p = 100` pinned to the
/// last element), not an interpolated percentile; for small `n` distinct
/// points routinely collapse onto the same index. Requires `n >= 1`.
pub fn percentile_index(p: usize, n: usize) -> usize {
    debug_assert!(p <= 100);
    debug_assert!(n >= 1);
    if p == 100 {
        n - 1
    } else {
        p * n / 100
    }
}

fn significantly_smaller(x: i64, y: i64) -> bool {
    x < y
}

fn significantly_different(lo_a: i64, hi_a: i64, lo_b: i64, hi_b: i64) -> bool {
    hi_a < lo_b || hi_b < lo_a
}

/// Indices of a percentile window into a sequence of length `len`, or
/// `None` when the window degenerates for this length (bounds collide).
fn window_indices(len: usize, lower: usize, upper: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let lo = percentile_index(lower, len);
    let hi = percentile_index(upper, len);
    if lo == hi {
        None
    } else {
        Some((lo, hi))
    }
}

/// Test whether any percentile window of `a` lies entirely below the same
/// window of `b`.
///
/// Scans all `(i, j)` pairs and returns on the first positive window;
/// windows that degenerate on either sequence are skipped. Existence only,
/// no position is reported.
pub fn box_test(a: &[Measurement], b: &[Measurement]) -> bool {
    for i in 0..100 {
        for j in (i + 1)..=100 {
            let Some((_, hi_a)) = window_indices(a.len(), i, j) else {
                continue;
            };
            let Some((lo_b, _)) = window_indices(b.len(), i, j) else {
                continue;
            };
            if significantly_smaller(a[hi_a].value, b[lo_b].value) {
                return true;
            }
        }
    }
    false
}

/// Find the widest percentile window of `a` lying entirely below the same
/// window of `b`.
///
/// Every positive window marks its full span on `timeline`; the widest one
/// wins, with ties kept by the first window encountered (ascending `i`,
/// then `j`). Returns `None` when no window anywhere is positive.
pub fn optimal_box(a: &[Measurement], b: &[Measurement], timeline: &mut Timeline) -> Option<Window> {
    let mut best: Option<(usize, usize)> = None;
    let mut best_width = 0;

    for i in 0..100 {
        for j in (i + 1)..=100 {
            let Some((_, hi_a)) = window_indices(a.len(), i, j) else {
                continue;
            };
            let Some((lo_b, _)) = window_indices(b.len(), i, j) else {
                continue;
            };
            if significantly_smaller(a[hi_a].value, b[lo_b].value) {
                timeline.mark_span(i, j);
                if best_width < j - i {
                    best_width = j - i;
                    best = Some((i, j));
                }
            }
        }
    }

    best.map(|(i, j)| Window::from_points(i, j))
}

/// Run the smaller-than test restricted to one fixed percentile window.
///
/// The window bounds are truncated to integer percentile points; a window
/// that degenerates on either sequence is never positive.
pub fn box_test_window(a: &[Measurement], b: &[Measurement], window: Window) -> bool {
    let (lower, upper) = window.points();
    let Some((_, hi_a)) = window_indices(a.len(), lower, upper) else {
        return false;
    };
    let Some((lo_b, _)) = window_indices(b.len(), lower, upper) else {
        return false;
    };
    significantly_smaller(a[hi_a].value, b[lo_b].value)
}

/// Test whether the fixed percentile windows of `a` and `b` overlap.
///
/// Positive when the two windows are *not* significantly different, i.e.
/// their extreme values intersect. Run against two chronological
/// sub-windows of the same secret, a positive result means its
/// distribution stayed put across them. Degenerate windows are never
/// positive.
pub fn overlap_window(a: &[Measurement], b: &[Measurement], window: Window) -> bool {
    let (lower, upper) = window.points();
    let Some((lo_a, hi_a)) = window_indices(a.len(), lower, upper) else {
        return false;
    };
    let Some((lo_b, hi_b)) = window_indices(b.len(), lower, upper) else {
        return false;
    };
    !significantly_different(
        a[lo_a].value,
        a[hi_a].value,
        b[lo_b].value,
        b[hi_b].value,
    )
}

/// Number of percentile-window grid cells the box-test scan skips as
/// degenerate for sequences of these lengths.
///
/// The scan stays silent about skipped cells; this makes the loss visible
/// for small sample counts, where most of the grid can collapse.
pub fn degenerate_windows(len_a: usize, len_b: usize) -> usize {
    let mut skipped = 0;
    for i in 0..100 {
        for j in (i + 1)..=100 {
            if window_indices(len_a, i, j).is_none() || window_indices(len_b, i, j).is_none() {
                skipped += 1;
            }
        }
    }
    skipped
}
