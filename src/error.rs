//! Structured error types for xlstruct.
//!
//! Only package-level failures surface as errors: a file that cannot be
//! opened, an archive that is not a valid OOXML package, or a package with
//! no workbook manifest. Sheet- and element-level problems degrade into
//! empty results with recorded warnings instead (see [`crate::extract`]).

use serde::{Deserialize, Serialize};

/// All errors that can abort an extraction.
#[derive(Debug, thiserror::Error)]
pub enum XlstructError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive opened but is not shaped like a spreadsheet package.
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlstructError>;

/// Errors raised by a [`crate::backend::StructureBackend`].
///
/// `Unavailable` is the availability signal of the richer host-automation
/// backend; the orchestrator treats it as a fallback trigger, never as a
/// fatal error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend cannot run in this environment.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but failed to produce a result.
    #[error("backend failed: {0}")]
    Failed(String),
}

/// Reason codes for structural-extraction fallbacks.
///
/// Recorded on [`crate::types::WorkbookExtraction`] whenever shapes, charts
/// or print areas were not produced by the richer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Light mode skips structural extraction by design.
    LightMode,
    /// No host-automation backend is present in this environment.
    HostUnavailable,
    /// A host-automation backend was present but failed.
    HostFailed,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LightMode => "light_mode",
            Self::HostUnavailable => "host_unavailable",
            Self::HostFailed => "host_failed",
        };
        f.write_str(name)
    }
}
