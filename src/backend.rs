//! Structure-extraction backends.
//!
//! Shapes, charts and print areas can come from two places: a rich
//! host-automation backend (the spreadsheet application itself, when one
//! is installed) or the pure OOXML parser in this crate. Both sides
//! implement one capability interface so the orchestrator keeps a single
//! selection and fallback path; which backend runs is decided by a
//! runtime availability probe, never by build-time conditionals.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::charts::extract_charts;
use crate::drawings::extract_drawing_objects;
use crate::error::{BackendError, Result};
use crate::package::{drawing_path_for_sheet, sheet_entries, SheetEntry};
use crate::print_areas::workbook_print_areas;
use crate::types::{ChartRecord, DrawingObject, ExtractionMode, PrintArea};

/// Capability interface for structural extraction on one sheet.
///
/// Implementations may signal that they cannot run at all via
/// [`BackendError::Unavailable`]; the orchestrator treats that as a
/// fallback trigger, not a failure of the extraction.
pub trait StructureBackend {
    /// Short backend name used in fallback diagnostics.
    fn name(&self) -> &'static str;

    /// Availability probe, called once per workbook before use.
    fn probe(&mut self) -> std::result::Result<(), BackendError> {
        Ok(())
    }

    /// Extract shapes and connectors for one sheet.
    fn extract_shapes(
        &mut self,
        sheet_name: &str,
        mode: ExtractionMode,
    ) -> std::result::Result<Vec<DrawingObject>, BackendError>;

    /// Extract charts for one sheet.
    fn extract_charts(
        &mut self,
        sheet_name: &str,
        mode: ExtractionMode,
    ) -> std::result::Result<Vec<ChartRecord>, BackendError>;

    /// Extract user-defined print areas for one sheet.
    fn extract_print_areas(
        &mut self,
        sheet_name: &str,
    ) -> std::result::Result<Vec<PrintArea>, BackendError>;
}

/// The pure OOXML-parser backend. Always available wherever the package
/// itself can be opened.
pub struct OoxmlBackend<R: Read + Seek> {
    archive: ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    print_areas: Option<HashMap<usize, Vec<PrintArea>>>,
}

impl OoxmlBackend<BufReader<File>> {
    /// Open a package from a filesystem path.
    ///
    /// # Errors
    /// Fails when the file cannot be opened, is not a zip archive, or has
    /// no workbook manifest.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Self::from_archive(archive)
    }
}

impl<R: Read + Seek> OoxmlBackend<R> {
    /// Wrap an already-open archive.
    ///
    /// # Errors
    /// Fails when the archive has no workbook manifest.
    pub fn from_archive(mut archive: ZipArchive<R>) -> Result<Self> {
        let sheets = sheet_entries(&mut archive)?;
        Ok(Self {
            archive,
            sheets,
            print_areas: None,
        })
    }

    fn sheet_path(&self, sheet_name: &str) -> std::result::Result<String, BackendError> {
        self.sheets
            .iter()
            .find(|entry| entry.name == sheet_name)
            .map(|entry| entry.path.clone())
            .ok_or_else(|| BackendError::Failed(format!("unknown sheet: {sheet_name}")))
    }
}

impl<R: Read + Seek> StructureBackend for OoxmlBackend<R> {
    fn name(&self) -> &'static str {
        "ooxml"
    }

    fn extract_shapes(
        &mut self,
        sheet_name: &str,
        mode: ExtractionMode,
    ) -> std::result::Result<Vec<DrawingObject>, BackendError> {
        let sheet_path = self.sheet_path(sheet_name)?;
        let Some(drawing_path) = drawing_path_for_sheet(&mut self.archive, &sheet_path) else {
            return Ok(Vec::new());
        };
        extract_drawing_objects(&mut self.archive, &drawing_path, mode)
            .map_err(|e| BackendError::Failed(e.to_string()))
    }

    fn extract_charts(
        &mut self,
        sheet_name: &str,
        mode: ExtractionMode,
    ) -> std::result::Result<Vec<ChartRecord>, BackendError> {
        let sheet_path = self.sheet_path(sheet_name)?;
        let Some(drawing_path) = drawing_path_for_sheet(&mut self.archive, &sheet_path) else {
            return Ok(Vec::new());
        };
        extract_charts(&mut self.archive, &drawing_path, mode)
            .map_err(|e| BackendError::Failed(e.to_string()))
    }

    fn extract_print_areas(
        &mut self,
        sheet_name: &str,
    ) -> std::result::Result<Vec<PrintArea>, BackendError> {
        if self.print_areas.is_none() {
            self.print_areas = Some(workbook_print_areas(&mut self.archive));
        }
        let sheet_index = self
            .sheets
            .iter()
            .position(|entry| entry.name == sheet_name)
            .ok_or_else(|| BackendError::Failed(format!("unknown sheet: {sheet_name}")))?;
        Ok(self
            .print_areas
            .as_ref()
            .and_then(|areas| areas.get(&sheet_index))
            .cloned()
            .unwrap_or_default())
    }
}
