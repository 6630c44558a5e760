//! Data types for extracted workbook structure.

mod chart;
mod shape;
mod sheet;

pub use chart::*;
pub use shape::*;
pub use sheet::*;

use serde::{Deserialize, Serialize};

/// How much structure an extraction reports.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Cells and table candidates only; shapes, connectors, charts and
    /// print areas are skipped entirely.
    Light,
    /// Shapes with text, all connectors, arrow-labelled shapes, charts and
    /// print areas. Width/height are withheld.
    #[default]
    Standard,
    /// Every shape and connector, with width/height always reported.
    Verbose,
}

impl ExtractionMode {
    /// Whether shapes/connectors/charts/print areas are extracted at all.
    #[must_use]
    pub fn includes_structure(self) -> bool {
        !matches!(self, Self::Light)
    }
}
