//! Definition lookup.
//!
//! With a compilation free of fatal errors, definitions come from the
//! compiler's `referencedDeclaration` links through the [`SymbolIndex`].
//! Otherwise the fast-parse nodes of the active file are searched by name,
//! which ignores scoping and is only a best guess.

use solsense_ast::walker::walk_full;
use solsense_ast::{AstNode, AstNodeRef, NodeId, NodeType};
use solsense_sema::{nodes_at_position, FxIndexMap, SymbolIndex};
use solsense_span::SourceLocation;

use crate::code_parser::CodeParser;

/// A definition and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Resolved through the compiler's declaration links.
    Authoritative(AstNodeRef),
    /// Name based guess over the fast-parse tree.
    Heuristic(AstNodeRef),
}

impl Resolution {
    pub fn node(&self) -> &AstNodeRef {
        match self {
            Resolution::Authoritative(node) | Resolution::Heuristic(node) => node,
        }
    }

    pub fn into_node(self) -> AstNodeRef {
        match self {
            Resolution::Authoritative(node) | Resolution::Heuristic(node) => node,
        }
    }
}

pub(crate) fn declaration_of(index: &SymbolIndex, node: &AstNode) -> Option<AstNodeRef> {
    index.node_by_id(node.referenced_declaration?).cloned()
}

/// Definition of the innermost of `nodes`, nodes ordered outer to inner.
pub(crate) fn definition_in(index: &SymbolIndex, nodes: &[AstNodeRef]) -> Option<AstNodeRef> {
    let node = nodes.last()?;
    let definition = if node.is_definition() {
        node.clone()
    } else {
        declaration_of(index, node).unwrap_or_else(|| node.clone())
    };
    if definition.is(&NodeType::ImportDirective) {
        if let Some(unit) = definition
            .source_unit()
            .and_then(|id| index.node_by_id(id))
        {
            return Some(unit.clone());
        }
    }
    Some(definition)
}

/// The latest starting node enclosing `offset`, an identifier being replaced
/// by the first non-identifier node of the same name. Unlike compiler
/// lookups the end of each range is exclusive, so the offset right after a
/// name no longer hits it.
pub(crate) fn guess_definition(nodes: &[AstNodeRef], offset: usize) -> Option<AstNodeRef> {
    let mut found: Option<&AstNodeRef> = None;
    let hits = |node: &&AstNodeRef| node.src.start <= offset && offset < node.src.end();
    for node in nodes.iter().filter(hits) {
        if found.map_or(true, |found| found.src.start < node.src.start) {
            found = Some(node);
        }
    }
    let found = found?;
    if found.is(&NodeType::Identifier) {
        return find_identifier(nodes, found);
    }
    Some(found.clone())
}

pub(crate) fn find_identifier(nodes: &[AstNodeRef], identifier: &AstNode) -> Option<AstNodeRef> {
    let name = identifier.name()?;
    nodes
        .iter()
        .find(|node| node.name() == Some(name) && !node.is(&NodeType::Identifier))
        .cloned()
}

/// Follow `node`, an import directive, to the unit it imports and from there
/// every transitive import. Units already in `visited` are not entered
/// again.
pub(crate) fn resolve_imports(
    index: &SymbolIndex,
    node: &AstNode,
    visited: &mut FxIndexMap<NodeId, AstNodeRef>,
) {
    let Some(unit_id) = node.source_unit() else {
        return;
    };
    if visited.contains_key(&unit_id) {
        return;
    }
    let Some(unit) = index.node_by_id(unit_id) else {
        log::debug!("imported unit {} is not indexed", unit_id);
        return;
    };
    visited.insert(unit_id, unit.clone());
    for child in &unit.children {
        resolve_imports(index, child, visited);
    }
}

#[inline]
pub(crate) fn position_of_definition(node: &AstNode) -> SourceLocation {
    node.src
}

/// The member access or identifier reaching furthest into `ast`, reduced to
/// the object it is accessed on.
pub(crate) fn last_node_in_line(ast: &AstNodeRef) -> Option<AstNodeRef> {
    let mut last: Option<AstNodeRef> = None;
    walk_full(ast, |node| {
        if !(node.is(&NodeType::MemberAccess) || node.is(&NodeType::Identifier)) {
            return;
        }
        if last
            .as_ref()
            .map_or(true, |last| last.src.end() < node.src.end())
        {
            last = Some(node.clone());
        }
    });
    let last = last?;
    Some(match last.expression() {
        Some(object) => object.expression().unwrap_or(object).clone(),
        None => last,
    })
}

impl CodeParser {
    /// Nodes of the active file's compiled AST enclosing `offset`, outer to
    /// inner.
    pub fn nodes_at_position(&self, offset: usize, kind: Option<&NodeType>) -> Vec<AstNodeRef> {
        let Ok(db) = self.db() else {
            return vec![];
        };
        let Some(file) = self.current_file() else {
            return vec![];
        };
        let ast = match db.result.source_ast(&file) {
            Some(ast) => ast.clone(),
            None => match self.collaborators.files.resolve_url_to_file(&file) {
                Ok(resolved) => match db.result.source_ast(&resolved.file) {
                    Some(ast) => ast.clone(),
                    None => return vec![],
                },
                Err(err) => {
                    log::warn!("failed to resolve {}: {:#}", file, err);
                    return vec![];
                }
            },
        };
        nodes_at_position(kind, offset, &ast)
    }

    pub fn definition_at_position(&self, offset: usize) -> Option<AstNodeRef> {
        self.resolve_definition(offset).map(Resolution::into_node)
    }

    pub fn resolve_definition(&self, offset: usize) -> Option<Resolution> {
        let nodes = self.nodes_at_position(offset, None);
        if !nodes.is_empty() && !self.error_state() {
            let db = self.db().ok()?;
            return definition_in(&db.index, &nodes).map(Resolution::Authoritative);
        }
        let resolution = guess_definition(&self.list_ast_nodes(), offset).map(Resolution::Heuristic);
        if let Some(Resolution::Heuristic(node)) = &resolution {
            log::debug!(
                "heuristic definition at {}: {} {:?}",
                offset,
                node.node_type,
                node.name()
            );
        }
        resolution
    }

    /// The first fast-parse node named like `identifier` that is not an
    /// identifier itself.
    pub fn find_identifier(&self, identifier: &AstNode) -> Option<AstNodeRef> {
        find_identifier(&self.list_ast_nodes(), identifier)
    }

    /// Units reachable from the import directive `node`, keyed by unit id.
    pub fn resolve_imports(
        &self,
        node: &AstNode,
        visited: Option<FxIndexMap<NodeId, AstNodeRef>>,
    ) -> FxIndexMap<NodeId, AstNodeRef> {
        let mut visited = visited.unwrap_or_default();
        if let Ok(db) = self.db() {
            resolve_imports(&db.index, node, &mut visited);
        }
        visited
    }

    pub fn get_last_node_in_line(&self, ast: &AstNodeRef) -> Option<AstNodeRef> {
        last_node_in_line(ast)
    }
}
