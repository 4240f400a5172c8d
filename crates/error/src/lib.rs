//! Compiler diagnostics as reported in the standard-JSON output, and the
//! classification rules that decide whether a compilation can be indexed.

mod position;


pub use position::ErrorPosition;

use serde::{Deserialize, Serialize};
use solsense_span::{LineColRange, SourceLocation};

/// Marker appended by the import resolver to placeholder errors it
/// synthesizes while an import is still being fetched.
pub const DEFERRED_IMPORT: &str = "Deferred import";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

/// `sourceLocation` of a compiler error. Offsets are `-1` when the
/// compiler could not attach the error to any source range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ErrorSourceLocation {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
}

impl ErrorSourceLocation {
    /// Byte range of the error, clamped to non negative offsets.
    pub fn to_source_location(&self, file: Option<usize>) -> SourceLocation {
        let start = self.start.max(0) as usize;
        let end = self.end.max(0) as usize;
        SourceLocation::from_range(start, end, file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilationError {
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub formatted_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<ErrorSourceLocation>,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CompilationError {
    pub fn new(severity: Severity, message: &str) -> Self {
        Self {
            severity,
            message: message.to_string(),
            formatted_message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn with_source_location(mut self, file: &str, start: i64, end: i64) -> Self {
        self.source_location = Some(ErrorSourceLocation {
            file: file.to_string(),
            start,
            end,
        });
        self
    }

    pub fn with_formatted_message(mut self, formatted_message: &str) -> Self {
        self.formatted_message = formatted_message.to_string();
        self
    }

    pub fn class(&self) -> DiagnosticClass {
        if self.message.contains(DEFERRED_IMPORT) {
            DiagnosticClass::DeferredImport
        } else if self.severity == Severity::Warning {
            DiagnosticClass::Warning
        } else {
            DiagnosticClass::Fatal
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.class() == DiagnosticClass::Fatal
    }

    /// Where the error points to, parsed out of the formatted message.
    pub fn position(&self) -> ErrorPosition {
        ErrorPosition::parse(&self.formatted_message)
    }
}

/// How a diagnostic affects indexing. Only `Fatal` blocks a rebuild of the
/// symbol index; warnings and deferred import placeholders are shown but
/// otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticClass {
    Warning,
    DeferredImport,
    Fatal,
}

/// Returns true if any of the diagnostics is fatal.
pub fn has_fatal<'a, I>(errors: I) -> bool
where
    I: IntoIterator<Item = &'a CompilationError>,
{
    errors.into_iter().any(CompilationError::is_fatal)
}

/// An error decorated with its decoded line/column range, ready to be shown
/// by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMarker {
    pub error: CompilationError,
    pub line_column: Option<LineColRange>,
}
