//! The flat symbol index of one compilation.
//!
//! Two maps are built by walking every source AST once:
//! - `flat_references`: node id -> node, for every node;
//! - `declarations`: declaration id -> the nodes referencing it, in walk
//!   order.
//!
//! An index is never updated in place: every compilation builds a new one
//! tagged with the generation of the compile request it came from.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use solsense_ast::walker::walk_full;
use solsense_ast::{AstNodeRef, NodeId};

use crate::compilation::CompilationResult;

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    generation: u64,
    declarations: FxIndexMap<NodeId, Vec<AstNodeRef>>,
    flat_references: FxIndexMap<NodeId, AstNodeRef>,
}

impl SymbolIndex {
    /// Build the index of `result`, sources in the compiler's order. Node ids
    /// are unique within one compilation; should two sources still share an
    /// id, the node walked last is kept.
    pub fn build(result: &CompilationResult, generation: u64) -> Self {
        let mut index = SymbolIndex {
            generation,
            ..Default::default()
        };
        for (name, source) in &result.sources {
            log::debug!("indexing {} (file {})", name, source.id);
            walk_full(&source.ast, |node| index.insert(node));
        }
        log::debug!(
            "index generation {} holds {} nodes and {} declarations",
            generation,
            index.flat_references.len(),
            index.declarations.len()
        );
        index
    }

    fn insert(&mut self, node: &AstNodeRef) {
        if let Some(declaration) = node.referenced_declaration {
            self.declarations
                .entry(declaration)
                .or_default()
                .push(node.clone());
        }
        self.flat_references.insert(node.id, node.clone());
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flat_references.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flat_references.len()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&AstNodeRef> {
        self.flat_references.get(&id)
    }

    /// Nodes referencing the declaration `id`.
    pub fn declaration(&self, id: NodeId) -> Option<&[AstNodeRef]> {
        self.declarations.get(&id).map(Vec::as_slice)
    }

    pub fn nodes_with_scope(&self, scope: NodeId) -> Vec<AstNodeRef> {
        self.flat_references
            .values()
            .filter(|node| node.scope == Some(scope))
            .cloned()
            .collect()
    }

    pub fn nodes_with_name(&self, name: &str) -> Vec<AstNodeRef> {
        self.flat_references
            .values()
            .filter(|node| node.name() == Some(name))
            .cloned()
            .collect()
    }

    /// Every indexed node keyed by id.
    pub fn nodes(&self) -> &FxIndexMap<NodeId, AstNodeRef> {
        &self.flat_references
    }
}
