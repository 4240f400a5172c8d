use solsense_ast::NodeId;
use solsense_parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum CodeParserError {
    #[error("no file is open in the editor")]
    NoCurrentFile,
    #[error("there is no compilation result yet")]
    NoCompilationResult,
    #[error("no compiled source has file index {0}")]
    UnknownSource(usize),
    #[error("node {0} is not attached to a source")]
    DetachedNode(NodeId),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("malformed compilation output: {0}")]
    CompilationData(#[from] serde_json::Error),
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}
