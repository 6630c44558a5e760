//! xlstruct - semantic structure extraction for XLSX packages
//!
//! Parses spreadsheet packages without the host application and extracts
//! the structure that matters to downstream consumers:
//! - cell rows as strings, with optional hyperlinks
//! - shapes and connectors from DrawingML, groups flattened, with stable
//!   per-sheet sequential ids and resolved connector endpoints
//! - charts from ChartML: type, title, series references, value-axis range
//! - table-candidate cell ranges detected on the raw grid
//! - user-defined print areas
//!
//! Serialization, rendering and CLI concerns live in separate
//! collaborators; this crate hands them an in-memory
//! [`types::WorkbookExtraction`] (all record types derive serde traits).
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use xlstruct::extract::extract_workbook;
//!
//! let workbook = extract_workbook(Path::new("report.xlsx"))?;
//! for sheet in &workbook.sheets {
//!     println!("{}: {} shapes, {} charts", sheet.name, sheet.shapes.len(), sheet.charts.len());
//! }
//! # Ok::<(), xlstruct::error::XlstructError>(())
//! ```

pub mod backend;
pub mod cell_ref;
pub mod cells;
pub mod charts;
pub mod drawings;
pub mod error;
pub mod extract;
pub mod maps;
pub mod package;
pub mod print_areas;
mod resolve;
pub mod tables;
pub mod types;
pub mod units;

use std::io::Cursor;

use zip::ZipArchive;

use error::{Result, XlstructError};
use types::{ChartRecord, DrawingObject, ExtractionMode};

pub use extract::{extract_workbook, extract_workbook_with_mode, ExtractOptions, Extractor};
pub use tables::{detect_table_candidates, DetectionParams};
pub use types::*;

/// Parse one sheet's shapes and connectors from package bytes.
///
/// Pure function over the archive: resolves the sheet's drawing part,
/// parses it, applies the mode filter and assigns sequential ids. A sheet
/// without a drawing yields an empty list.
///
/// # Errors
/// Fails when the bytes are not a valid package, the sheet name is
/// unknown, or the drawing XML is malformed.
pub fn parse_shapes(
    data: &[u8],
    sheet_name: &str,
    mode: ExtractionMode,
) -> Result<Vec<DrawingObject>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let sheet_path = sheet_path_by_name(&mut archive, sheet_name)?;
    let Some(drawing_path) = package::drawing_path_for_sheet(&mut archive, &sheet_path) else {
        return Ok(Vec::new());
    };
    drawings::extract_drawing_objects(&mut archive, &drawing_path, mode)
}

/// Parse one sheet's charts from package bytes.
///
/// # Errors
/// Fails when the bytes are not a valid package, the sheet name is
/// unknown, or a drawing/chart part is malformed.
pub fn parse_charts(
    data: &[u8],
    sheet_name: &str,
    mode: ExtractionMode,
) -> Result<Vec<ChartRecord>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let sheet_path = sheet_path_by_name(&mut archive, sheet_name)?;
    let Some(drawing_path) = package::drawing_path_for_sheet(&mut archive, &sheet_path) else {
        return Ok(Vec::new());
    };
    charts::extract_charts(&mut archive, &drawing_path, mode)
}

fn sheet_path_by_name(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    sheet_name: &str,
) -> Result<String> {
    let sheets = package::sheet_entries(archive)?;
    sheets
        .into_iter()
        .find(|entry| entry.name == sheet_name)
        .map(|entry| entry.path)
        .ok_or_else(|| XlstructError::InvalidPackage(format!("unknown sheet: {sheet_name}")))
}

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
