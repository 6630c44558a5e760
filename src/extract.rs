//! Workbook extraction orchestrator.
//!
//! Runs the always-on steps (cells, table candidates) and the
//! mode-dependent structural steps (shapes, charts, print areas), picking
//! a backend at runtime: an injected host-automation backend when one is
//! available, the pure OOXML parser otherwise. Every degradation is
//! recorded as a named warning or fallback reason — an empty category
//! with no diagnostic never happens.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use crate::backend::{OoxmlBackend, StructureBackend};
use crate::cells::{parse_shared_strings, read_sheet_rows};
use crate::error::{BackendError, FallbackReason, Result};
use crate::package::sheet_entries;
use crate::tables::{detect_table_candidates, DetectionParams};
use crate::types::{
    ExtractWarning, ExtractionMode, SheetExtraction, Stage, WorkbookExtraction,
};

/// Extraction-time options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// How much structure to report.
    pub mode: ExtractionMode,
    /// Table-detection thresholds, adjustable per extraction.
    pub table_params: DetectionParams,
    /// Whether to resolve cell hyperlinks; `None` means verbose-only.
    pub include_cell_links: Option<bool>,
}

/// Configurable workbook extractor.
///
/// ```no_run
/// use xlstruct::extract::Extractor;
/// use std::path::Path;
///
/// let mut extractor = Extractor::new();
/// let workbook = extractor.extract(Path::new("report.xlsx"))?;
/// # Ok::<(), xlstruct::error::XlstructError>(())
/// ```
#[derive(Default)]
pub struct Extractor {
    options: ExtractOptions,
    rich: Option<Box<dyn StructureBackend>>,
}

impl Extractor {
    /// Extractor with default options (standard mode, default thresholds).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with explicit options.
    #[must_use]
    pub fn with_options(options: ExtractOptions) -> Self {
        Self {
            options,
            rich: None,
        }
    }

    /// Register a rich host-automation backend.
    ///
    /// The backend is probed at extraction time; when it is unavailable or
    /// fails, extraction falls back to the pure parser with a recorded
    /// reason.
    #[must_use]
    pub fn with_rich_backend(mut self, backend: Box<dyn StructureBackend>) -> Self {
        self.rich = Some(backend);
        self
    }

    /// Extract one workbook.
    ///
    /// # Errors
    /// Only package-level failures abort: the file cannot be opened, is
    /// not a zip archive, or carries no workbook manifest. Everything
    /// else degrades per sheet with a recorded warning.
    pub fn extract(&mut self, path: &Path) -> Result<WorkbookExtraction> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let sheets = sheet_entries(&mut archive)?;
        let shared_strings = parse_shared_strings(&mut archive);

        let mode = self.options.mode;
        let include_links = self
            .options
            .include_cell_links
            .unwrap_or(mode == ExtractionMode::Verbose);

        let mut warnings: Vec<ExtractWarning> = Vec::new();
        let mut fallback: Option<FallbackReason> = None;

        // Backend selection happens once per workbook, by availability.
        let mut rich_active = false;
        if !mode.includes_structure() {
            fallback = Some(FallbackReason::LightMode);
        } else if let Some(rich) = self.rich.as_mut() {
            match rich.probe() {
                Ok(()) => rich_active = true,
                Err(BackendError::Unavailable(detail)) => {
                    fallback = Some(FallbackReason::HostUnavailable);
                    push_warning(
                        &mut warnings,
                        None,
                        Stage::Backend,
                        format!("{} backend unavailable: {detail}", rich.name()),
                    );
                }
                Err(BackendError::Failed(detail)) => {
                    fallback = Some(FallbackReason::HostFailed);
                    push_warning(
                        &mut warnings,
                        None,
                        Stage::Backend,
                        format!("{} backend probe failed: {detail}", rich.name()),
                    );
                }
            }
        } else {
            fallback = Some(FallbackReason::HostUnavailable);
            log::debug!("no host-automation backend registered; using pure parser");
        }

        // The pure parser backs every structural category the rich
        // backend does not supply.
        let mut pure = if mode.includes_structure() {
            match OoxmlBackend::open(path) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    push_warning(
                        &mut warnings,
                        None,
                        Stage::Backend,
                        format!("parser backend failed to open package: {e}"),
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut extracted_sheets = Vec::with_capacity(sheets.len());
        for entry in &sheets {
            let rows = match read_sheet_rows(&mut archive, &entry.path, &shared_strings, include_links)
            {
                Ok(rows) => rows,
                Err(e) => {
                    push_warning(
                        &mut warnings,
                        Some(&entry.name),
                        Stage::Cells,
                        e.to_string(),
                    );
                    Vec::new()
                }
            };
            let table_candidates = detect_table_candidates(&rows, &self.options.table_params);

            let mut sheet = SheetExtraction {
                name: entry.name.clone(),
                rows,
                table_candidates,
                ..SheetExtraction::default()
            };

            if mode.includes_structure() {
                sheet.shapes = extract_category(
                    &entry.name,
                    Stage::Drawing,
                    rich_active.then(|| self.rich.as_mut()).flatten(),
                    pure.as_mut(),
                    &mut warnings,
                    |backend| backend.extract_shapes(&entry.name, mode),
                );
                sheet.charts = extract_category(
                    &entry.name,
                    Stage::Chart,
                    rich_active.then(|| self.rich.as_mut()).flatten(),
                    pure.as_mut(),
                    &mut warnings,
                    |backend| backend.extract_charts(&entry.name, mode),
                );
                sheet.print_areas = extract_category(
                    &entry.name,
                    Stage::PrintArea,
                    rich_active.then(|| self.rich.as_mut()).flatten(),
                    pure.as_mut(),
                    &mut warnings,
                    |backend| backend.extract_print_areas(&entry.name),
                );
            }

            extracted_sheets.push(sheet);
        }

        let book_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(WorkbookExtraction {
            book_name,
            sheets: extracted_sheets,
            warnings,
            fallback,
        })
    }
}

/// Extract one structural category for one sheet, preferring the rich
/// backend and degrading to the pure parser, then to an empty result.
/// Each degradation step records a warning naming the sheet and stage.
fn extract_category<T>(
    sheet_name: &str,
    stage: Stage,
    rich: Option<&mut Box<dyn StructureBackend>>,
    pure: Option<&mut OoxmlBackend<BufReader<File>>>,
    warnings: &mut Vec<ExtractWarning>,
    mut run: impl FnMut(&mut dyn StructureBackend) -> std::result::Result<T, BackendError>,
) -> T
where
    T: Default,
{
    if let Some(rich) = rich {
        match run(rich.as_mut()) {
            Ok(result) => return result,
            Err(e) => {
                push_warning(
                    warnings,
                    Some(sheet_name),
                    stage,
                    format!("host backend failed, falling back to parser: {e}"),
                );
            }
        }
    }

    if let Some(pure) = pure {
        match run(pure) {
            Ok(result) => return result,
            Err(e) => {
                push_warning(warnings, Some(sheet_name), stage, e.to_string());
            }
        }
    }

    T::default()
}

fn push_warning(
    warnings: &mut Vec<ExtractWarning>,
    sheet: Option<&str>,
    stage: Stage,
    detail: String,
) {
    match sheet {
        Some(name) => log::warn!("sheet '{name}' {stage} degraded: {detail}"),
        None => log::warn!("{stage} degraded: {detail}"),
    }
    warnings.push(ExtractWarning {
        sheet: sheet.map(ToString::to_string),
        stage,
        detail,
    });
}

/// Extract one workbook with default options.
///
/// # Errors
/// See [`Extractor::extract`].
pub fn extract_workbook(path: &Path) -> Result<WorkbookExtraction> {
    Extractor::new().extract(path)
}

/// Extract one workbook in an explicit mode with default thresholds.
///
/// # Errors
/// See [`Extractor::extract`].
pub fn extract_workbook_with_mode(path: &Path, mode: ExtractionMode) -> Result<WorkbookExtraction> {
    Extractor::with_options(ExtractOptions {
        mode,
        ..ExtractOptions::default()
    })
    .extract(path)
}
