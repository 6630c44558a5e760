use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chart::ChartRecord;
use super::shape::DrawingObject;
use crate::error::FallbackReason;

/// A single row of cell values with optional hyperlinks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CellRow {
    /// Row index (1-based).
    pub r: u32,
    /// Column index (0-based) to cell value map.
    pub c: BTreeMap<u32, String>,
    /// Optional hyperlink targets per column index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<u32, String>>,
}

/// Inclusive cell bounds of a print area.
///
/// Rows are 1-based and columns 0-based, matching the cell-row convention.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PrintArea {
    /// Start row (1-based).
    pub r1: u32,
    /// Start column (0-based).
    pub c1: u32,
    /// End row (1-based, inclusive).
    pub r2: u32,
    /// End column (0-based, inclusive).
    pub c2: u32,
}

/// Everything extracted from one sheet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SheetExtraction {
    /// Sheet name from the workbook manifest.
    pub name: String,
    /// Cell rows with values and optional hyperlinks.
    pub rows: Vec<CellRow>,
    /// Flattened shapes and connectors, in document order.
    pub shapes: Vec<DrawingObject>,
    /// Charts anchored to the sheet.
    pub charts: Vec<ChartRecord>,
    /// Cell ranges likely holding tabular data (inclusive A1 ranges).
    pub table_candidates: Vec<String>,
    /// User-defined print areas.
    pub print_areas: Vec<PrintArea>,
}

/// Extraction phase a warning is attributed to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Cells,
    Drawing,
    Chart,
    PrintArea,
    Backend,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cells => "cells",
            Self::Drawing => "drawing",
            Self::Chart => "chart",
            Self::PrintArea => "print_area",
            Self::Backend => "backend",
        };
        f.write_str(name)
    }
}

/// A recorded per-sheet or per-workbook degradation.
///
/// Warnings name the sheet and failing stage so no category ever comes
/// back empty without a diagnostic.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractWarning {
    /// Affected sheet, or `None` for workbook-level events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Extraction phase that degraded.
    pub stage: Stage,
    /// Human-readable detail.
    pub detail: String,
}

/// Workbook-level aggregate of per-sheet extractions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct WorkbookExtraction {
    /// Workbook file name (no path).
    pub book_name: String,
    /// Sheets in workbook manifest order.
    pub sheets: Vec<SheetExtraction>,
    /// Degradations recorded during extraction.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<ExtractWarning>,
    /// Why the richer backend was not used for structure, when it wasn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

impl WorkbookExtraction {
    /// Look up a sheet extraction by name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&SheetExtraction> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
