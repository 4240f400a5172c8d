use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use solsense_ast::walker::flatten;
use solsense_ast::{AstNodeRef, NodeId, NodeType};
use solsense_span::SourceLocation;

use crate::*;

fn load_test_result(name: &str) -> CompilationResult {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("src/test_data");
    path.push(name);
    let text = std::fs::read_to_string(&path).unwrap();
    CompilationResult::from_json_str(&text).unwrap()
}

fn ids(nodes: &[AstNodeRef]) -> Vec<i64> {
    nodes.iter().map(|node| node.id.0).collect()
}

#[test]
fn load_compilation_result() {
    let result = load_test_result("cyclic_imports.json");
    let names: Vec<&str> = result.sources.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["contracts/B.sol", "contracts/C.sol"]);
    assert_eq!(result.source_name(1), Some("contracts/C.sol"));
    assert_eq!(result.source_name(7), None);
    assert_eq!(
        result.source_ast("contracts/B.sol").map(|ast| ast.id),
        Some(NodeId(3))
    );
    assert!(!result.has_fatal_error());
    assert_eq!(result.asts().keys().copied().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn index_holds_the_tree_nodes() {
    let result = load_test_result("simple.json");
    let index = SymbolIndex::build(&result, 3);
    assert_eq!(index.generation(), 3);

    let ast = result.source_ast("contracts/A.sol").unwrap();
    let nodes = flatten(ast);
    assert_eq!(index.len(), nodes.len());
    for node in &nodes {
        assert!(Arc::ptr_eq(index.node_by_id(node.id).unwrap(), node));
        if let Some(declaration) = node.referenced_declaration {
            assert!(index
                .declaration(declaration)
                .unwrap()
                .iter()
                .any(|reference| Arc::ptr_eq(reference, node)));
        }
    }
    let references = nodes
        .iter()
        .filter(|node| node.referenced_declaration.is_some())
        .count();
    assert_eq!(references, index.declaration(NodeId(2)).unwrap().len());
}

#[test]
fn index_queries() {
    let result = load_test_result("simple.json");
    let index = SymbolIndex::build(&result, 1);

    assert_eq!(ids(index.declaration(NodeId(2)).unwrap()), vec![5]);
    assert_eq!(index.declaration(NodeId(5)), None);
    assert_eq!(index.node_by_id(NodeId(99)), None);
    assert_eq!(
        index.node_by_id(NodeId(10)).and_then(|node| node.name()),
        Some("f")
    );
    assert_eq!(ids(&index.nodes_with_scope(NodeId(11))), vec![2, 10]);
    assert_eq!(ids(&index.nodes_with_scope(NodeId(12))), vec![11]);
    assert_eq!(ids(&index.nodes_with_name("x")), vec![2, 5]);
    assert!(index.nodes_with_name("y").is_empty());
    assert_eq!(
        index.nodes().keys().map(|id| id.0).collect::<Vec<_>>(),
        vec![12, 11, 2, 1, 10, 3, 4, 9, 8, 7, 5, 6]
    );
}

#[test]
fn empty_result_builds_empty_index() {
    let index = SymbolIndex::build(&CompilationResult::default(), 0);
    assert!(index.is_empty());
    assert!(index.nodes_with_name("x").is_empty());
}

#[test]
fn duplicate_ids_keep_the_last_node() {
    let mut result = load_test_result("cyclic_imports.json");
    let first = result.sources["contracts/C.sol"].ast.clone();
    // A second copy of C reuses every id of the first one.
    let copy = load_test_result("cyclic_imports.json").sources["contracts/C.sol"]
        .ast
        .clone();
    result.sources.insert(
        "contracts/C2.sol".to_string(),
        CompilationSource {
            id: 2,
            ast: copy.clone(),
        },
    );
    let index = SymbolIndex::build(&result, 0);
    assert_eq!(index.len(), 6);
    assert!(Arc::ptr_eq(index.node_by_id(NodeId(6)).unwrap(), &copy));
    assert!(!Arc::ptr_eq(index.node_by_id(NodeId(6)).unwrap(), &first));
}

#[test]
fn nodes_at_offset() {
    let result = load_test_result("simple.json");
    let ast = result.source_ast("contracts/A.sol").unwrap();

    // The `x` in `x = 1`.
    assert_eq!(
        ids(&nodes_at_position(None, 43, ast)),
        vec![12, 11, 10, 9, 8, 7, 5]
    );
    assert_eq!(
        ids(&nodes_at_position(Some(&NodeType::Identifier), 43, ast)),
        vec![5]
    );
    assert_eq!(
        ids(&nodes_at_position(Some(&NodeType::FunctionDefinition), 43, ast)),
        vec![10]
    );
    // The declaration `uint x`.
    assert_eq!(ids(&nodes_at_position(None, 18, ast)), vec![12, 11, 2]);
    assert!(nodes_at_position(None, 60, ast).is_empty());
}

#[test]
fn unlocated_nodes_are_skipped_but_walked() {
    let result = CompilationResult::from_json(serde_json::json!({
        "sources": {
            "contracts/A.sol": {
                "id": 0,
                "ast": {
                    "id": 3,
                    "nodeType": "SourceUnit",
                    "src": "0:20:0",
                    "nodes": [{
                        "id": 2,
                        "nodeType": "ContractDefinition",
                        "name": "A",
                        "src": "-1:-1:-1",
                        "nodes": [{
                            "id": 1,
                            "nodeType": "VariableDeclaration",
                            "name": "x",
                            "src": "13:6:0"
                        }]
                    }]
                }
            }
        }
    }))
    .unwrap();
    let ast = result.source_ast("contracts/A.sol").unwrap();
    assert_eq!(ast.children[0].src, SourceLocation::unlocated(None));
    assert_eq!(ids(&nodes_at_position(None, 15, ast)), vec![3, 1]);
    assert_eq!(ids(&nodes_at_position(None, 0, ast)), vec![3]);
}

#[test]
fn sources_without_ast_are_left_out() {
    let value = serde_json::json!({
        "sources": {
            "contracts/A.sol": { "id": 0 },
            "contracts/B.sol": {
                "id": 1,
                "ast": { "id": 0, "nodeType": "SourceUnit", "src": "0:0:1" }
            }
        },
        "errors": [{
            "severity": "error",
            "message": "Expected ';'",
            "formattedMessage": "ParserError: Expected ';'",
            "type": "ParserError"
        }]
    });
    let diagnostics = CompilationDiagnostics::from_json(&value).unwrap();
    assert_eq!(diagnostics.errors.len(), 1);
    assert!(diagnostics.has_fatal_error());

    let result = CompilationResult::from_json(value).unwrap();
    let names: Vec<&str> = result.sources.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["contracts/B.sol"]);
    assert_eq!(result.source_name(1), Some("contracts/B.sol"));
}

#[test]
fn diagnostics_decode_without_sources() {
    let value = serde_json::json!({
        "sources": { "contracts/A.sol": { "id": 0, "ast": { "nodeType": "SourceUnit" } } },
        "error": { "severity": "warning", "message": "legacy" }
    });
    assert!(CompilationResult::from_json(value.clone()).is_err());
    let diagnostics = CompilationDiagnostics::from_json(&value).unwrap();
    assert_eq!(
        diagnostics
            .diagnostics()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>(),
        vec!["legacy"]
    );
    assert!(!diagnostics.has_fatal_error());
}

#[test]
fn decode_source_location() {
    assert_eq!(decode("43:1:0").unwrap(), SourceLocation::new(43, 1, Some(0)));
    assert_eq!(decode("0:5:-1").unwrap(), SourceLocation::new(0, 5, None));
    assert!(decode("43").is_err());
    assert!(!decode("-1:-1:-1").unwrap().is_located());
}
