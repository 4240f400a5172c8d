//! AST walker. The traversal is pre-order: a node is visited before its
//! children, children in document order. A [`Walker`] decides for every node
//! whether the traversal descends into its children, `walk_full` visits
//! everything.
//!
//! Traversal is iterative so deeply nested compiler output can not overflow
//! the stack.

use crate::ast::AstNodeRef;

pub trait Walker {
    /// Called on each node before its children. Returning false skips the
    /// children of `node`, the rest of the tree is still walked.
    fn enter(&mut self, node: &AstNodeRef) -> bool;
}

impl<F> Walker for F
where
    F: FnMut(&AstNodeRef) -> bool,
{
    #[inline]
    fn enter(&mut self, node: &AstNodeRef) -> bool {
        self(node)
    }
}

pub fn walk<W: Walker + ?Sized>(walker: &mut W, root: &AstNodeRef) {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if walker.enter(&node) {
            stack.extend(node.children.iter().rev().cloned());
        }
    }
}

/// Visit every node reachable from `root`.
pub fn walk_full<F>(root: &AstNodeRef, mut visit: F)
where
    F: FnMut(&AstNodeRef),
{
    walk(
        &mut |node: &AstNodeRef| {
            visit(node);
            true
        },
        root,
    );
}

/// Collect every node reachable from `root` in walk order.
pub fn flatten(root: &AstNodeRef) -> Vec<AstNodeRef> {
    let mut nodes = vec![];
    walk_full(root, |node| nodes.push(node.clone()));
    nodes
}
