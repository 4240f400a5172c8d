//! A tolerant Solidity parser.
//!
//! Parsing is done by the tree-sitter Solidity grammar, which never gives up
//! on broken input: missing tokens are inserted and unparsable input is
//! wrapped into `ERROR` nodes. The concrete syntax tree is then lowered into
//! [`solsense_ast`] nodes shaped like the compiler's AST, `ERROR` nodes
//! becoming `InvalidNode`s, so both trees can be queried with the same code.
//! The only hard failure is nesting deeper than
//! [`ParserOptions::max_nesting_depth`].

mod cst;
mod lower;
mod natspec;

#[cfg(test)]
mod tests;

use std::time::Instant;

use solsense_ast::AstNodeRef;
use solsense_span::SourceLocation;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("nesting exceeds {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
    #[error("failed to load the Solidity grammar: {0}")]
    Language(String),
    #[error("parsing was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub max_nesting_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// A recoverable syntax error, reported alongside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub src: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub ast: AstNodeRef,
    pub errors: Vec<SyntaxError>,
}

/// Parse `text` with the default options.
pub fn parse_solidity(text: &str) -> Result<ParseOutput, ParseError> {
    parse_solidity_with_options(text, ParserOptions::default())
}

pub fn parse_solidity_with_options(
    text: &str,
    options: ParserOptions,
) -> Result<ParseOutput, ParseError> {
    let start = Instant::now();
    let tree = cst::parse(text)?;
    let errors = cst::syntax_errors(&tree, text);
    let ast = lower::Lowering::new(text, options).source_unit(tree.root_node())?;
    log::debug!(
        "parsed {} bytes in {:?} ({} syntax errors)",
        text.len(),
        start.elapsed(),
        errors.len()
    );
    Ok(ParseOutput { ast, errors })
}
