use solsense_ast::{AstNode, AstNodeRef};
use solsense_sema::SymbolIndex;

/// Nodes referring to the same declaration as `node`.
///
/// For a reference, the other references in index order followed by the
/// declaration itself. For anything else, the nodes referring to `node`.
pub(crate) fn references_of(index: &SymbolIndex, node: &AstNode) -> Vec<AstNodeRef> {
    match node.referenced_declaration {
        Some(declaration) => {
            let mut references = index
                .declaration(declaration)
                .map(<[AstNodeRef]>::to_vec)
                .unwrap_or_default();
            if let Some(declaration) = index.node_by_id(declaration) {
                references.push(declaration.clone());
            }
            references
        }
        None => index
            .declaration(node.id)
            .map(<[AstNodeRef]>::to_vec)
            .unwrap_or_default(),
    }
}
