use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use solsense_ast::AstNodeRef;
use solsense_error::CompilationError;

/// The part of the compiler's standard JSON output the analysis reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilationResult {
    /// Sources keyed by their unit name, in the compiler's own order.
    /// Entries the compiler emitted without an AST are left out.
    #[serde(default, deserialize_with = "sources_with_ast")]
    pub sources: IndexMap<String, CompilationSource>,
    #[serde(default)]
    pub errors: Vec<CompilationError>,
    /// Legacy single error.
    #[serde(default)]
    pub error: Option<CompilationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilationSource {
    /// File index used in `src` locations.
    pub id: usize,
    pub ast: AstNodeRef,
}

fn sources_with_ast<'de, D>(deserializer: D) -> Result<IndexMap<String, CompilationSource>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RawSource {
        id: usize,
        #[serde(default)]
        ast: Option<AstNodeRef>,
    }

    let raw = IndexMap::<String, RawSource>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, source)| match source.ast {
            Some(ast) => Some((name, CompilationSource { id: source.id, ast })),
            None => {
                log::debug!("source {} has no AST", name);
                None
            }
        })
        .collect())
}

/// Only the diagnostics of a compiler output. Decodes even when the
/// sources can not be.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilationDiagnostics {
    #[serde(default)]
    pub errors: Vec<CompilationError>,
    #[serde(default)]
    pub error: Option<CompilationError>,
}

impl CompilationDiagnostics {
    pub fn from_json(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    /// All diagnostics, the legacy `error` first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &CompilationError> {
        self.error.iter().chain(self.errors.iter())
    }

    pub fn has_fatal_error(&self) -> bool {
        solsense_error::has_fatal(self.diagnostics())
    }
}

impl CompilationResult {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// All diagnostics, the legacy `error` first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &CompilationError> {
        self.error.iter().chain(self.errors.iter())
    }

    pub fn has_fatal_error(&self) -> bool {
        solsense_error::has_fatal(self.diagnostics())
    }

    /// Unit name of the source with the given file index.
    pub fn source_name(&self, file_index: usize) -> Option<&str> {
        self.sources
            .iter()
            .find(|(_, source)| source.id == file_index)
            .map(|(name, _)| name.as_str())
    }

    pub fn source_ast(&self, name: &str) -> Option<&AstNodeRef> {
        self.sources.get(name).map(|source| &source.ast)
    }

    /// Source ASTs keyed by file index.
    pub fn asts(&self) -> IndexMap<usize, AstNodeRef> {
        self.sources
            .values()
            .map(|source| (source.id, source.ast.clone()))
            .collect()
    }
}
