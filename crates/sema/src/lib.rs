//! Semantic data built on top of a compilation: the compiler output record,
//! the flat symbol index and source map decoding over the compiler's AST.

pub mod compilation;
pub mod index;
pub mod source_map;

#[cfg(test)]
mod tests;

pub use compilation::{CompilationDiagnostics, CompilationResult, CompilationSource};
pub use index::{FxIndexMap, SymbolIndex};
pub use source_map::{decode, nodes_at_position};
