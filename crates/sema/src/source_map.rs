//! Source map decoding over a compiler AST.

use solsense_ast::walker::walk;
use solsense_ast::{AstNodeRef, NodeType};
use solsense_span::{SourceLocation, SpanError};

/// Decode a `start:length:file` source location.
#[inline]
pub fn decode(src: &str) -> Result<SourceLocation, SpanError> {
    src.parse()
}

/// All nodes of `ast` whose source range encloses `offset`
/// (`start <= offset <= start + length`), outer to inner. Subtrees not
/// enclosing the offset are skipped. With `kind`, only nodes of that type
/// are returned, although the walk still descends through the others.
/// Unlocated nodes are never returned but their children are visited.
pub fn nodes_at_position(
    kind: Option<&NodeType>,
    offset: usize,
    ast: &AstNodeRef,
) -> Vec<AstNodeRef> {
    let mut found = vec![];
    walk(
        &mut |node: &AstNodeRef| {
            if !node.src.is_located() {
                return true;
            }
            if !node.src.contains(offset) {
                return false;
            }
            if kind.map_or(true, |kind| node.is(kind)) {
                found.push(node.clone());
            }
            true
        },
        ast,
    );
    found
}
