//! The tree-sitter side: running the grammar and reading its error nodes.

use solsense_span::SourceLocation;
use tree_sitter::{Node, Parser, Tree};

use crate::{ParseError, SyntaxError};

/// Longest excerpt of skipped input quoted in a syntax error.
const EXCERPT_LEN: usize = 32;

pub(crate) fn parse(text: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_solidity::LANGUAGE.into())
        .map_err(|err| ParseError::Language(err.to_string()))?;
    parser.parse(text, None).ok_or(ParseError::Cancelled)
}

/// One error per `ERROR` node and per token the parser had to insert, in
/// document order. Subtrees without errors are not entered.
pub(crate) fn syntax_errors(tree: &Tree, src: &str) -> Vec<SyntaxError> {
    let mut errors = vec![];
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() {
            errors.push(syntax_error(
                format!("unexpected `{}`", excerpt(src, node)),
                node,
            ));
        } else if node.is_missing() {
            errors.push(syntax_error(format!("missing `{}`", node.kind()), node));
        } else if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return errors;
            }
        }
    }
}

fn syntax_error(message: String, node: Node<'_>) -> SyntaxError {
    log::debug!("syntax error at {}: {}", node.start_byte(), message);
    SyntaxError {
        message,
        src: SourceLocation::from_range(node.start_byte(), node.end_byte(), None),
    }
}

/// The first line of `node`, cut to [`EXCERPT_LEN`] chars.
fn excerpt(src: &str, node: Node<'_>) -> String {
    let text = src.get(node.byte_range()).unwrap_or_default();
    let line = text.lines().next().unwrap_or_default().trim_end();
    match line.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}
