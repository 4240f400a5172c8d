use std::sync::Arc;

use solsense_ast::AstNodeRef;
use solsense_sema::{CompilationResult, SymbolIndex};

use crate::collaborators::{CompilationFinished, Sources};

/// Everything derived from one successful compilation. A database is never
/// mutated, a newer compilation replaces it as a whole.
#[derive(Debug, Clone, Default)]
pub struct AnalysisDatabase {
    pub result: CompilationResult,
    pub index: SymbolIndex,
    /// Source contents the compiler saw, used for line/column conversion.
    pub sources: Sources,
    pub version: String,
}

impl AnalysisDatabase {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.index.generation()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileState {
    #[default]
    Idle,
    Compiling { generation: u64 },
    Succeeded,
    FailedFatal,
}

/// The last AST the fast parser produced for `path`.
#[derive(Debug, Clone)]
pub(crate) struct RetainedAst {
    pub path: String,
    pub ast: AstNodeRef,
}

#[derive(Debug, Default)]
pub(crate) struct AnalysisState {
    pub current_file: Option<String>,
    pub retained_ast: Option<RetainedAst>,
    /// Set while the last compilation reported a fatal error.
    pub error_state: bool,
    pub compile_state: CompileState,
    /// Generation of the latest compile request.
    pub generation: u64,
    pub db: Option<Arc<AnalysisDatabase>>,
}

/// A `Task` is sent from compiler callbacks to the engine, which applies it
/// in [`crate::CodeParser::process_tasks`].
#[derive(Debug)]
pub(crate) enum Task {
    CompilationFinished {
        generation: u64,
        finished: CompilationFinished,
    },
}

/// Notifications for [`crate::CodeParser::subscribe`] listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeParserEvent {
    /// A new index generation is ready.
    AstFinished { generation: u64 },
    CompilationFailed { generation: u64 },
}
