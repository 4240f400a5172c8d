use std::fmt::Write;

use pretty_assertions::assert_eq;
use solsense_ast::walker::flatten;
use solsense_ast::{AstNodeRef, NodeKind, NodeType};
use solsense_span::{LineCol, LineColRange, SourceLocation};

use crate::*;

const SIMPLE: &str = "contract A { uint x; function f() public { x = 1; } }";

fn parse(src: &str) -> ParseOutput {
    parse_solidity(src).unwrap()
}

/// One line per node: type, name and byte range, indented by depth.
fn dump(node: &AstNodeRef) -> String {
    fn dump_into(out: &mut String, node: &AstNodeRef, depth: usize) {
        let name = node.name().map(|name| format!(" {name}")).unwrap_or_default();
        writeln!(
            out,
            "{}{}{} {}..{}",
            "  ".repeat(depth),
            node.node_type,
            name,
            node.src.start,
            node.src.end()
        )
        .unwrap();
        for child in &node.children {
            dump_into(out, child, depth + 1);
        }
    }
    let mut out = String::new();
    dump_into(&mut out, node, 0);
    out
}

fn types(nodes: &[AstNodeRef]) -> Vec<NodeType> {
    nodes.iter().map(|node| node.node_type.clone()).collect()
}

fn names(nodes: &[AstNodeRef]) -> Vec<Option<&str>> {
    nodes.iter().map(|node| node.name()).collect()
}

fn find(ast: &AstNodeRef, node_type: NodeType, name: &str) -> Option<AstNodeRef> {
    flatten(ast)
        .into_iter()
        .find(|node| node.node_type == node_type && node.name() == Some(name))
}

#[test]
fn simple_contract_shape() {
    let output = parse(SIMPLE);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    insta::assert_snapshot!(dump(&output.ast), @r"
    SourceUnit 0..53
      ContractDefinition A 0..53
        VariableDeclaration x 13..20
          ElementaryTypeName uint 13..17
        FunctionDefinition f 21..51
          ParameterList 31..33
          Block 41..51
            ExpressionStatement 43..49
              Assignment 43..48
                Identifier x 43..44
                Literal 47..48
    ");
}

#[test]
fn ids_are_post_order() {
    let output = parse(SIMPLE);
    let ids: Vec<i64> = flatten(&output.ast).iter().map(|node| node.id.0).collect();
    assert_eq!(ids, vec![10, 9, 1, 0, 8, 2, 7, 6, 5, 3, 4]);
}

#[test]
fn parse_is_deterministic() {
    let src = "contract A { uint x; function f() public { x = 1; } }\ncontract B is A {}";
    assert_eq!(parse_solidity(src).unwrap(), parse_solidity(src).unwrap());
}

#[test]
fn parse_empty_text() {
    let output = parse("");
    assert_eq!(output.ast.node_type, NodeType::SourceUnit);
    assert!(output.ast.children.is_empty());
    assert!(output.errors.is_empty());
}

#[test]
fn fast_parse_nodes_have_no_file() {
    let output = parse(SIMPLE);
    let identifier = flatten(&output.ast)
        .into_iter()
        .find(|node| node.node_type == NodeType::Identifier)
        .unwrap();
    assert_eq!(identifier.src, SourceLocation::new(43, 1, None));
    assert_eq!(
        identifier.loc,
        Some(LineColRange::new(LineCol::new(1, 43), LineCol::new(1, 44)))
    );
}

#[test]
fn loc_lines_are_one_based() {
    let output = parse("contract A {\n    uint x;\n}\n");
    let var = &output.ast.children[0].children[0];
    assert_eq!(
        var.loc,
        Some(LineColRange::new(LineCol::new(2, 4), LineCol::new(2, 11)))
    );
}

#[test]
fn block_comments_end_at_the_first_terminator() {
    let output = parse("/* see contracts/*.sol */\ncontract A { uint x; }");
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(types(&output.ast.children), vec![NodeType::ContractDefinition]);
    assert_eq!(output.ast.children[0].name(), Some("A"));

    // Comments do not nest, the inner `/*` is plain text.
    let output = parse("/* outer /* inner */ contract B {}");
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(names(&output.ast.children), vec![Some("B")]);
}

#[test]
fn state_variables() {
    let output = parse(
        "contract A { mapping(address => uint256) public balances; address private owner = address(0); uint[] internal list; }",
    );
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let members = &output.ast.children[0].children;
    assert_eq!(names(members), vec![Some("balances"), Some("owner"), Some("list")]);
    assert_eq!(members[0].visibility(), Some("public"));
    assert_eq!(members[1].visibility(), Some("private"));
    assert_eq!(members[2].visibility(), Some("internal"));
    assert_eq!(
        members[0].type_name().map(|ty| ty.node_type.clone()),
        Some(NodeType::Mapping)
    );
    assert_eq!(
        members[1].type_name().and_then(|ty| ty.name()),
        Some("address")
    );
    assert_eq!(
        members[2].type_name().map(|ty| ty.node_type.clone()),
        Some(NodeType::ArrayTypeName)
    );
    match &members[1].kind {
        NodeKind::VariableDeclaration(var) => {
            assert!(var.state_variable);
            assert!(var.value.is_some());
        }
        kind => panic!("unexpected kind {kind:?}"),
    }
}

#[test]
fn missing_visibility_stays_empty() {
    let output = parse(SIMPLE);
    let x = &output.ast.children[0].children[0];
    assert_eq!(x.visibility(), None);
}

#[test]
fn function_signature() {
    let output =
        parse("contract P { function g(uint256 a, address b) public returns (bool ok) {} }");
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let function = &output.ast.children[0].children[0];
    assert_eq!(function.node_type, NodeType::FunctionDefinition);
    assert_eq!(function.visibility(), Some("public"));
    assert_eq!(names(function.parameters().unwrap()), vec![Some("a"), Some("b")]);
    assert_eq!(names(function.return_parameters().unwrap()), vec![Some("ok")]);
    assert_eq!(
        function.parameters().unwrap()[0]
            .type_name()
            .and_then(|ty| ty.name()),
        Some("uint256")
    );
    // The parameter list spans its parentheses.
    assert_eq!(function.children[0].src, SourceLocation::new(23, 22, None));
    match &function.kind {
        NodeKind::Callable(callable) => {
            assert_eq!(callable.kind.as_deref(), Some("function"));
            assert!(callable.body.is_some());
        }
        kind => panic!("unexpected kind {kind:?}"),
    }
}

#[test]
fn contract_members() {
    let output = parse(
        r#"pragma solidity ^0.8.0;
import "./Base.sol";
import {Token as T} from './Token.sol';

contract C is Base {
    struct S { uint a; bytes32 b; }
    enum Color { Red, Green }
    event Moved(address indexed from, uint amount);
    modifier onlyOwner() { _; }
    constructor() {}
    function f() external view onlyOwner returns (uint) { return 1; }
}

interface I {}
library L {}
"#,
    );
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let unit = &output.ast;
    assert_eq!(
        types(&unit.children),
        vec![
            NodeType::PragmaDirective,
            NodeType::ImportDirective,
            NodeType::ImportDirective,
            NodeType::ContractDefinition,
            NodeType::ContractDefinition,
            NodeType::ContractDefinition,
        ]
    );
    let files: Vec<&str> = unit.children[1..3]
        .iter()
        .map(|node| match &node.kind {
            NodeKind::ImportDirective { file, .. } => file.as_str(),
            kind => panic!("unexpected kind {kind:?}"),
        })
        .collect();
    assert_eq!(files, vec!["./Base.sol", "./Token.sol"]);
    let kinds: Vec<&str> = unit.children[3..]
        .iter()
        .map(|node| match &node.kind {
            NodeKind::ContractDefinition { contract_kind } => contract_kind.as_str(),
            kind => panic!("unexpected kind {kind:?}"),
        })
        .collect();
    assert_eq!(kinds, vec!["contract", "interface", "library"]);

    let contract = &unit.children[3];
    assert_eq!(
        types(&contract.children),
        vec![
            NodeType::InheritanceSpecifier,
            NodeType::StructDefinition,
            NodeType::EnumDefinition,
            NodeType::EventDefinition,
            NodeType::ModifierDefinition,
            NodeType::FunctionDefinition,
            NodeType::FunctionDefinition,
        ]
    );
    assert_eq!(contract.children[0].children[0].name_path(), Some("Base"));
    assert_eq!(names(&contract.children[1].children), vec![Some("a"), Some("b")]);
    assert_eq!(
        names(&contract.children[2].children),
        vec![Some("Red"), Some("Green")]
    );
    assert_eq!(
        names(contract.children[3].parameters().unwrap()),
        vec![Some("from"), Some("amount")]
    );

    let constructor = &contract.children[5];
    assert_eq!(constructor.name(), None);
    match &constructor.kind {
        NodeKind::Callable(callable) => assert_eq!(callable.kind.as_deref(), Some("constructor")),
        kind => panic!("unexpected kind {kind:?}"),
    }

    let f = &contract.children[6];
    assert_eq!(f.name(), Some("f"));
    assert_eq!(f.visibility(), Some("external"));
    assert_eq!(
        types(&f.children),
        vec![
            NodeType::ParameterList,
            NodeType::ModifierInvocation,
            NodeType::ParameterList,
            NodeType::Block,
        ]
    );
    assert_eq!(f.children[1].name(), Some("onlyOwner"));
    assert_eq!(names(f.return_parameters().unwrap()), vec![None]);
}

#[test]
fn statements() {
    let output = parse(
        r#"contract A {
    function f(uint n) public returns (uint total) {
        uint[] memory xs = new uint[](n);
        for (uint i = 0; i < n; i++) { total += xs[i]; }
        while (n > 0) { n--; if (n == 3) break; else continue; }
        do { n++; } while (n < 10);
        unchecked { total = total * 2; }
        emit Done(total);
        return total;
    }
}
"#,
    );
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let function = &output.ast.children[0].children[0];
    let body = function.children.last().unwrap();
    assert_eq!(body.node_type, NodeType::Block);
    assert_eq!(
        types(&body.children),
        vec![
            NodeType::VariableDeclarationStatement,
            NodeType::ForStatement,
            NodeType::WhileStatement,
            NodeType::DoWhileStatement,
            NodeType::UncheckedBlock,
            NodeType::EmitStatement,
            NodeType::Return,
        ]
    );
    assert_eq!(names(&body.children[0].children[..1]), vec![Some("xs")]);
    let flat = flatten(&output.ast);
    for node_type in [
        NodeType::NewExpression,
        NodeType::IndexAccess,
        NodeType::BinaryOperation,
        NodeType::UnaryOperation,
        NodeType::IfStatement,
        NodeType::Break,
        NodeType::Continue,
    ] {
        assert!(
            flat.iter().any(|node| node.node_type == node_type),
            "no {node_type}"
        );
    }
}

#[test]
fn member_access() {
    let output = parse("contract A { function f() public { owner.wallet.balance; } }");
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let outer = flatten(&output.ast)
        .into_iter()
        .find(|node| node.node_type == NodeType::MemberAccess)
        .unwrap();
    match &outer.kind {
        NodeKind::MemberAccess { member_name, .. } => assert_eq!(member_name, "balance"),
        kind => panic!("unexpected kind {kind:?}"),
    }
    let inner = outer.expression().unwrap();
    assert_eq!(inner.node_type, NodeType::MemberAccess);
    assert_eq!(
        inner.expression().and_then(|object| object.name()),
        Some("owner")
    );
    // Member names are not identifiers of their own.
    let identifiers: Vec<_> = flatten(&output.ast)
        .into_iter()
        .filter(|node| node.node_type == NodeType::Identifier)
        .collect();
    assert_eq!(names(&identifiers), vec![Some("owner")]);
}

#[test]
fn natspec_is_attached() {
    let output = parse(
        "/// Does things.\n///   Twice.\ncontract P {\n    /** @notice Reads.\n     * @return x */\n    function g() public {}\n    // plain\n    uint y;\n}",
    );
    let contract = &output.ast.children[0];
    assert_eq!(
        contract.documentation.as_ref().map(|doc| doc.text.as_str()),
        Some(" Does things.\n   Twice.")
    );
    let function = &contract.children[0];
    assert_eq!(
        function.documentation.as_ref().map(|doc| doc.text.as_str()),
        Some("@notice Reads.\n @return x")
    );
    assert_eq!(contract.children[1].documentation, None);
}

#[test]
fn block_doc_text() {
    assert_eq!(
        natspec::block_doc("/**\n * First.\n *   Second.\n */"),
        Some("First.\n   Second.".to_string())
    );
    assert_eq!(natspec::block_doc("/* plain */"), None);
    assert_eq!(natspec::block_doc("/***/"), None);
    assert_eq!(natspec::block_doc("/**/"), None);
}

#[test]
fn recover_inside_function_body() {
    let output =
        parse_solidity("contract B { function f() public { uint x = ; } uint y; }").unwrap();
    assert!(!output.errors.is_empty());
    assert!(find(&output.ast, NodeType::ContractDefinition, "B").is_some());
    assert!(find(&output.ast, NodeType::FunctionDefinition, "f").is_some());
}

#[test]
fn recover_from_garbage() {
    let output = parse_solidity("@@@ contract E {}").unwrap();
    assert!(!output.errors.is_empty());
    assert!(find(&output.ast, NodeType::ContractDefinition, "E").is_some());
    assert!(flatten(&output.ast)
        .iter()
        .any(|node| node.node_type == NodeType::InvalidNode));
    // Errors point into the text.
    for error in &output.errors {
        assert!(error.src.end() <= 17, "{error:?}");
        assert_eq!(error.src.file, None);
    }
}

#[test]
fn truncated_input_is_reported() {
    let output = parse_solidity("contract A { function f(uint a").unwrap();
    assert!(!output.errors.is_empty());
    assert_eq!(output.ast.node_type, NodeType::SourceUnit);
    assert_eq!(output.ast.src, SourceLocation::new(0, 30, None));
}

#[test]
fn nesting_limit() {
    let src = "contract A { function f() public { x = ((((((1)))))); } }";
    let err = parse_solidity_with_options(
        src,
        ParserOptions {
            max_nesting_depth: 4,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { limit: 4, .. }));
    assert!(parse_solidity(src).is_ok());

    let deep = format!(
        "contract A {{ function f() public {{ x = {}1{}; }} }}",
        "(".repeat(1000),
        ")".repeat(1000)
    );
    assert!(matches!(
        parse_solidity(&deep),
        Err(ParseError::TooDeep {
            limit: DEFAULT_MAX_NESTING_DEPTH,
            ..
        })
    ));
}
