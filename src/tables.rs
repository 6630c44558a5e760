//! Table candidate detection over the raw cell grid.
//!
//! A minimal density heuristic: the inclusive bounding box of all
//! non-empty cells becomes a candidate when it holds enough cells at a
//! high enough fill ratio. Thresholds are plain runtime values so
//! operators can retune false-positive/false-negative trade-offs without
//! redeploying.

use serde::{Deserialize, Serialize};

use crate::cell_ref::format_range;
use crate::types::CellRow;

/// Tunable thresholds for table candidate detection.
///
/// `coverage_min` and `score_threshold` are carried for richer scoring
/// strategies beyond the density check and are not consulted by the
/// current algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Minimum count of non-empty cells inside the bounding box.
    pub min_nonempty_cells: usize,
    /// Minimum `non-empty / box area` ratio.
    pub density_min: f64,
    /// Reserved: minimum bounding-box coverage of the scanned region.
    pub coverage_min: f64,
    /// Reserved: minimum composite score for a candidate.
    pub score_threshold: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_nonempty_cells: 3,
            density_min: 0.05,
            coverage_min: 0.2,
            score_threshold: 0.35,
        }
    }
}

/// Detect table-like regions in one sheet's cell grid.
///
/// Returns at most one candidate: the inclusive A1 range of the bounding
/// box spanning every non-empty cell, provided the box passes the
/// configured count and density thresholds. An empty grid yields nothing.
#[must_use]
pub fn detect_table_candidates(rows: &[CellRow], params: &DetectionParams) -> Vec<String> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    let mut nonempty: usize = 0;

    for row in rows {
        for (&col, value) in &row.c {
            if value.trim().is_empty() {
                continue;
            }
            nonempty += 1;
            let row_idx = row.r.saturating_sub(1);
            bounds = Some(match bounds {
                None => (row_idx, col, row_idx, col),
                Some((r1, c1, r2, c2)) => {
                    (r1.min(row_idx), c1.min(col), r2.max(row_idx), c2.max(col))
                }
            });
        }
    }

    let Some((r1, c1, r2, c2)) = bounds else {
        return Vec::new();
    };

    if nonempty < params.min_nonempty_cells {
        return Vec::new();
    }

    let box_area = u64::from(r2 - r1 + 1) * u64::from(c2 - c1 + 1);
    #[allow(clippy::cast_precision_loss)]
    let density = nonempty as f64 / box_area as f64;
    if density < params.density_min {
        return Vec::new();
    }

    vec![format_range(r1, c1, r2, c2)]
}
