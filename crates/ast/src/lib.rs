//! The Solidity AST shared by the fast parser and the compiler output.
//!
//! Both producers build the same [`ast::AstNode`] record: a common base
//! (`id`, `nodeType`, `src`, optional name, references and documentation)
//! plus a [`ast::NodeKind`] payload for the node kinds the analysis reads.
//! Nodes are reference counted so the symbol index can hold the very same
//! nodes as the tree it was built from.

pub mod ast;
pub mod json;
pub mod node_type;
pub mod walker;


pub use ast::*;
pub use json::AstError;
pub use node_type::NodeType;
