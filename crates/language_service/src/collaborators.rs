//! Services the engine consumes from its host. All of them are shared between
//! the engine and the compiler's callback, so they must be `Send + Sync`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use solsense_error::ErrorMarker;
use solsense_sema::CompilationResult;
use solsense_span::{LineColRange, LineIndex, SourceLocation};

use crate::config::CompilerConfig;
use crate::file_state::FileState;

/// Source contents keyed by unit name.
pub type Sources = IndexMap<String, String>;

/// Resolves an import url to its content. Errors are reported to the
/// compiler as plain messages.
pub type ImportCallback = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// Called exactly once when a compilation ends.
pub type OnFinished = Box<dyn FnOnce(CompilationFinished) + Send>;

pub struct CompileRequest {
    /// The file the compilation was requested for.
    pub target: String,
    pub sources: Sources,
    pub import_callback: ImportCallback,
}

impl std::fmt::Debug for CompileRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileRequest")
            .field("target", &self.target)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompilationFinished {
    pub success: bool,
    /// Standard JSON output of the compiler.
    pub data: Value,
    /// Sources the compiler actually saw, imports included.
    pub sources: Sources,
    pub input: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub file: String,
}

pub trait CompilerService: Send + Sync {
    fn set_option(&self, name: &str, value: Value) -> anyhow::Result<()>;
    fn compile(&self, request: CompileRequest, on_finished: OnFinished) -> anyhow::Result<()>;
    fn load_version(&self, force: bool, url: &str) -> anyhow::Result<()>;
}

pub trait FileProvider: Send + Sync {
    /// The file open in the editor, if any.
    fn current_file(&self) -> anyhow::Result<Option<String>>;
    fn read_file(&self, path: &str) -> anyhow::Result<String>;
    fn resolve_url_to_file(&self, url: &str) -> anyhow::Result<ResolvedFile>;
}

pub trait ImportResolver: Send + Sync {
    /// Fetch `url`, store it in the workspace and return its content.
    fn resolve_and_save(&self, url: &str) -> anyhow::Result<String>;
}

pub trait LineColumnConverter: Send + Sync {
    /// Convert the byte range `range` of source `file_index` to lines and
    /// columns. With `asts`, the file index is looked up among the compiled
    /// sources, otherwise it is the position in `sources`.
    fn offset_to_line_column(
        &self,
        range: &SourceLocation,
        file_index: usize,
        sources: &Sources,
        asts: Option<&CompilationResult>,
    ) -> anyhow::Result<LineColRange>;
}

pub trait EditorSurface: Send + Sync {
    fn clear_annotations(&self) -> anyhow::Result<()>;
    fn add_error_markers(&self, markers: &[ErrorMarker]) -> anyhow::Result<()>;
    fn clear_error_markers(&self, sources: &[String]) -> anyhow::Result<()>;
}

pub trait FileStateStore: Send + Sync {
    fn set_file_states(&self, states: &[FileState]) -> anyhow::Result<()>;
}

pub trait CompilerConfigProvider: Send + Sync {
    fn compiler_config(&self) -> anyhow::Result<CompilerConfig>;
}

/// Default converter, 0-based lines and columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RopeLineColumnConverter;

impl LineColumnConverter for RopeLineColumnConverter {
    fn offset_to_line_column(
        &self,
        range: &SourceLocation,
        file_index: usize,
        sources: &Sources,
        asts: Option<&CompilationResult>,
    ) -> anyhow::Result<LineColRange> {
        let content = match asts {
            Some(result) => result
                .source_name(file_index)
                .and_then(|name| sources.get(name)),
            None => sources.get_index(file_index).map(|(_, content)| content),
        }
        .ok_or_else(|| anyhow::anyhow!("no source with file index {}", file_index))?;
        LineIndex::new(content)
            .range(range)
            .ok_or_else(|| anyhow::anyhow!("range {} is outside source {}", range, file_index))
    }
}
