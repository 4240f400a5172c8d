//! NatSpec documentation of declarations.
//!
//! Comments are extras in the grammar, so they show up as siblings of the
//! declaration they precede.

use tree_sitter::Node;

/// The `///` lines directly preceding `node`, back to and including a
/// `/** */` block. Ordinary comments in between are skipped.
pub(crate) fn documentation(src: &str, node: Node<'_>) -> Option<String> {
    let mut lines = vec![];
    let mut sibling = node.prev_sibling();
    while let Some(comment) = sibling.filter(|sibling| sibling.kind() == "comment") {
        let text = src.get(comment.byte_range()).unwrap_or_default();
        if let Some(line) = text.strip_prefix("///") {
            if !line.starts_with('/') {
                lines.push(line.trim_end().to_string());
            }
        } else if let Some(doc) = block_doc(text) {
            lines.push(doc);
            break;
        }
        sibling = comment.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

/// Text of a `/** */` comment with the leading `*` of every line removed.
pub(crate) fn block_doc(text: &str) -> Option<String> {
    let inner = text.strip_prefix("/**")?;
    if inner.starts_with('*') || inner == "/" {
        return None;
    }
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('*').unwrap_or(line).trim_end()
        })
        .collect();
    let first = lines.iter().position(|line| !line.trim().is_empty())?;
    let last = lines.iter().rposition(|line| !line.trim().is_empty())?;
    Some(lines[first..=last].join("\n"))
}
