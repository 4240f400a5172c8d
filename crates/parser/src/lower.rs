//! Lowering of the concrete syntax tree into compiler shaped nodes.
//!
//! State variables become `VariableDeclaration`s, parameters are gathered
//! into `ParameterList`s and type names become `ElementaryTypeName`,
//! `UserDefinedTypeName`, `Mapping` or `ArrayTypeName`. Grammar nodes with no
//! compiler counterpart (contract bodies, expression wrappers) are dropped
//! and their children take their place. Node ids are assigned when a node is
//! finished, so children always have smaller ids than their parent and
//! lowering the same text twice gives the same ids.

use solsense_ast::{AstNode, AstNodeRef, Callable, NodeKind, NodeType, VariableDeclaration};
use solsense_span::{LineCol, LineColRange, LineIndex, SourceLocation};
use tree_sitter::Node;

use crate::natspec;
use crate::{ParseError, ParserOptions};

/// Grammar nodes dropped together with everything below them. Modifiers
/// like visibility are read by the declaration owning them.
const DROPPED: &[&str] = &[
    "comment",
    "visibility",
    "state_mutability",
    "virtual",
    "immutable",
    "constant",
    "transient",
];

const PARAMETERS: &[&str] = &["parameter", "event_parameter", "error_parameter"];

pub(crate) struct Lowering<'a> {
    src: &'a str,
    lines: LineIndex,
    options: ParserOptions,
    next_id: i64,
    depth: usize,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(src: &'a str, options: ParserOptions) -> Self {
        Self {
            src,
            lines: LineIndex::new(src),
            options,
            next_id: 0,
            depth: 0,
        }
    }

    pub(crate) fn source_unit(mut self, root: Node<'_>) -> Result<AstNodeRef, ParseError> {
        let mut children = vec![];
        if root.kind() == "source_file" {
            for child in named(root) {
                self.lower(child, &mut children)?;
            }
        } else {
            self.lower(root, &mut children)?;
        }
        Ok(self
            .finish(NodeType::SourceUnit, 0, self.src.len())
            .with_kind(NodeKind::SourceUnit {
                absolute_path: None,
            })
            .with_children(children)
            .into_ref())
    }

    // ~~~ Dispatch

    /// Lower `node` into zero or more nodes appended to `out`.
    fn lower(&mut self, node: Node<'_>, out: &mut Vec<AstNodeRef>) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            return Err(ParseError::TooDeep {
                limit: self.options.max_nesting_depth,
                offset: node.start_byte(),
            });
        }
        self.lower_kind(node, out)?;
        self.depth -= 1;
        Ok(())
    }

    /// Lower `node` into `out`, returning it when it became exactly one node.
    fn lower_tracked(
        &mut self,
        node: Node<'_>,
        out: &mut Vec<AstNodeRef>,
    ) -> Result<Option<AstNodeRef>, ParseError> {
        let before = out.len();
        self.lower(node, out)?;
        Ok(if out.len() == before + 1 {
            out.last().cloned()
        } else {
            None
        })
    }

    fn lower_kind(&mut self, node: Node<'_>, out: &mut Vec<AstNodeRef>) -> Result<(), ParseError> {
        let lowered = match node.kind() {
            "ERROR" => self.wrap(NodeType::InvalidNode, node)?,
            "pragma_directive" => self.leaf(NodeType::PragmaDirective, node),
            "import_directive" => self.import_directive(node),
            "contract_declaration" => self.contract(node, "contract")?,
            "interface_declaration" => self.contract(node, "interface")?,
            "library_declaration" => self.contract(node, "library")?,
            "inheritance_specifier" => self.wrap(NodeType::InheritanceSpecifier, node)?,
            "using_directive" => self.wrap(NodeType::UsingForDirective, node)?,
            "struct_declaration" => self.struct_definition(node)?,
            "enum_declaration" => self.declaration(NodeType::EnumDefinition, node)?,
            "enum_value" => {
                let name = self.text(node);
                self.leaf(NodeType::EnumValue, node).with_name(name)
            }
            "user_defined_type_definition" => {
                self.declaration(NodeType::UserDefinedValueTypeDefinition, node)?
            }
            "event_definition" => self.callable(NodeType::EventDefinition, None, node)?,
            "error_declaration" => self.callable(NodeType::ErrorDefinition, None, node)?,
            "modifier_definition" => self.callable(NodeType::ModifierDefinition, None, node)?,
            "function_definition" => {
                self.callable(NodeType::FunctionDefinition, Some("function"), node)?
            }
            "constructor_definition" => {
                self.callable(NodeType::FunctionDefinition, Some("constructor"), node)?
            }
            "fallback_receive_definition" => {
                let kind = if has_token(node, "receive") {
                    "receive"
                } else {
                    "fallback"
                };
                self.callable(NodeType::FunctionDefinition, Some(kind), node)?
            }
            "modifier_invocation" => self.modifier_invocation(node)?,
            "override_specifier" => self.wrap(NodeType::OverrideSpecifier, node)?,
            "return_type_definition" => self.parameter_list(node)?,
            "state_variable_declaration" => self.variable(node, true)?,
            "constant_variable_declaration"
            | "variable_declaration"
            | "struct_member"
            | "parameter"
            | "event_parameter"
            | "error_parameter" => self.variable(node, false)?,
            "type_name" => return self.type_name(node, out),
            "primitive_type" => self.elementary_type(node),
            "user_defined_type" => {
                let path: String = self.text(node).split_whitespace().collect();
                self.leaf(NodeType::UserDefinedTypeName, node)
                    .with_kind(NodeKind::UserDefinedTypeName {
                        name_path: Some(path),
                    })
            }
            // Statements
            "function_body" => self.wrap(NodeType::Block, node)?,
            "block_statement" if has_token(node, "unchecked") => {
                self.wrap(NodeType::UncheckedBlock, node)?
            }
            "block_statement" => self.wrap(NodeType::Block, node)?,
            "expression_statement" => self.wrap(NodeType::ExpressionStatement, node)?,
            "variable_declaration_statement" => {
                self.wrap(NodeType::VariableDeclarationStatement, node)?
            }
            "if_statement" => self.wrap(NodeType::IfStatement, node)?,
            "for_statement" => self.wrap(NodeType::ForStatement, node)?,
            "while_statement" => self.wrap(NodeType::WhileStatement, node)?,
            "do_while_statement" => self.wrap(NodeType::DoWhileStatement, node)?,
            "continue_statement" => self.leaf(NodeType::Continue, node),
            "break_statement" => self.leaf(NodeType::Break, node),
            "return_statement" => self.wrap(NodeType::Return, node)?,
            "emit_statement" => self.wrap(NodeType::EmitStatement, node)?,
            "revert_statement" => self.wrap(NodeType::RevertStatement, node)?,
            "try_statement" => self.wrap(NodeType::TryStatement, node)?,
            "catch_clause" => self.catch_clause(node)?,
            "assembly_statement" => self.leaf(NodeType::InlineAssembly, node),
            // Expressions
            "assignment_expression" | "augmented_assignment_expression" => {
                self.wrap(NodeType::Assignment, node)?
            }
            "binary_expression" => self.wrap(NodeType::BinaryOperation, node)?,
            "unary_expression" | "update_expression" => {
                self.wrap(NodeType::UnaryOperation, node)?
            }
            "ternary_expression" => self.wrap(NodeType::Conditional, node)?,
            "call_expression"
            | "type_cast_expression"
            | "payable_conversion_expression"
            | "meta_type_expression"
            | "struct_expression" => self.wrap(NodeType::FunctionCall, node)?,
            "member_expression" => self.member_access(node)?,
            "array_access" => self.wrap(NodeType::IndexAccess, node)?,
            "slice_access" => self.wrap(NodeType::IndexRangeAccess, node)?,
            "parenthesized_expression" | "tuple_expression" | "inline_array_expression" => {
                self.wrap(NodeType::TupleExpression, node)?
            }
            "new_expression" => self.wrap(NodeType::NewExpression, node)?,
            "identifier" => {
                let name = self.text(node);
                self.leaf(NodeType::Identifier, node).with_name(name)
            }
            "number_literal"
            | "boolean_literal"
            | "string_literal"
            | "hex_string_literal"
            | "unicode_string_literal"
            | "string" => self.leaf(NodeType::Literal, node),
            kind if DROPPED.contains(&kind) => return Ok(()),
            // No node of its own and no say in the nesting depth.
            _ => {
                self.depth -= 1;
                for child in named(node) {
                    self.lower(child, out)?;
                }
                self.depth += 1;
                return Ok(());
            }
        };
        out.push(lowered.into_ref());
        Ok(())
    }

    // ~~~ Declarations

    fn import_directive(&mut self, node: Node<'_>) -> AstNode {
        let source = node
            .child_by_field_name("source")
            .or_else(|| named(node).into_iter().find(|child| child.kind() == "string"));
        let file = source
            .map(|source| self.text(source).trim_matches(|c| c == '"' || c == '\''))
            .unwrap_or_default()
            .to_string();
        self.leaf(NodeType::ImportDirective, node)
            .with_kind(NodeKind::ImportDirective {
                file,
                absolute_path: None,
                source_unit: None,
            })
    }

    fn contract(&mut self, node: Node<'_>, contract_kind: &str) -> Result<AstNode, ParseError> {
        Ok(self
            .declaration(NodeType::ContractDefinition, node)?
            .with_kind(NodeKind::ContractDefinition {
                contract_kind: contract_kind.to_string(),
            }))
    }

    fn struct_definition(&mut self, node: Node<'_>) -> Result<AstNode, ParseError> {
        let definition = self.declaration(NodeType::StructDefinition, node)?;
        let members = definition
            .children
            .iter()
            .filter(|child| child.is(&NodeType::VariableDeclaration))
            .cloned()
            .collect();
        Ok(definition.with_kind(NodeKind::StructDefinition { members }))
    }

    /// A named, documented declaration. Its name is not lowered into a
    /// child.
    fn declaration(&mut self, node_type: NodeType, node: Node<'_>) -> Result<AstNode, ParseError> {
        let name = node.child_by_field_name("name");
        let mut children = vec![];
        for child in named(node) {
            if !is(Some(child), name) {
                self.lower(child, &mut children)?;
            }
        }
        let declaration = self.finish_node(node_type, node).with_children(children);
        Ok(self.declared(declaration, node, name))
    }

    fn callable(
        &mut self,
        node_type: NodeType,
        kind: Option<&str>,
        node: Node<'_>,
    ) -> Result<AstNode, ParseError> {
        let name = node.child_by_field_name("name");
        let parameters = self.parameter_list(node)?.into_ref();
        let mut children = vec![parameters.clone()];
        let mut visibility = None;
        let mut return_parameters = None;
        let mut body = None;
        for child in named(node) {
            if is(Some(child), name)
                || PARAMETERS.contains(&child.kind())
                || child.kind() == "parameter_list"
            {
                continue;
            }
            if child.kind() == "visibility" {
                visibility = Some(self.text(child).to_string());
                continue;
            }
            let lowered = self.lower_tracked(child, &mut children)?;
            match child.kind() {
                "return_type_definition" => return_parameters = lowered,
                "function_body" => body = lowered,
                _ => {}
            }
        }
        let callable = self
            .finish_node(node_type, node)
            .with_kind(NodeKind::Callable(Callable {
                kind: kind.map(str::to_string),
                visibility,
                parameters: Some(parameters),
                return_parameters,
                body,
            }))
            .with_children(children);
        Ok(self.declared(callable, node, name))
    }

    /// The parameters listed directly in `owner`, spanning its parentheses.
    fn parameter_list(&mut self, owner: Node<'_>) -> Result<AstNode, ParseError> {
        let mut open = None;
        let mut close = None;
        let mut found = vec![];
        let mut cursor = owner.walk();
        for child in owner.children(&mut cursor) {
            if child.kind() == "parameter_list" {
                let mut inner = child.walk();
                for child in child.children(&mut inner) {
                    scan_parameter(child, &mut open, &mut close, &mut found);
                }
            } else {
                scan_parameter(child, &mut open, &mut close, &mut found);
            }
        }
        let mut parameters = vec![];
        for parameter in found {
            self.lower(parameter, &mut parameters)?;
        }
        let lo = open.unwrap_or_else(|| {
            owner
                .child_by_field_name("name")
                .map_or(owner.start_byte(), |name| name.end_byte())
        });
        let hi = close
            .or_else(|| parameters.last().map(|parameter| parameter.src.end()))
            .unwrap_or(lo)
            .max(lo);
        Ok(self
            .finish(NodeType::ParameterList, lo, hi)
            .with_kind(NodeKind::ParameterList {
                parameters: parameters.clone(),
            })
            .with_children(parameters))
    }

    fn variable(&mut self, node: Node<'_>, state_variable: bool) -> Result<AstNode, ParseError> {
        let name = node.child_by_field_name("name");
        let ty = node.child_by_field_name("type");
        let value = node.child_by_field_name("value");
        let mut children = vec![];
        let mut visibility = None;
        let mut type_name = None;
        let mut initial_value = None;
        for child in named(node) {
            if is(Some(child), name) {
                continue;
            }
            if child.kind() == "visibility" {
                visibility = Some(self.text(child).to_string());
                continue;
            }
            let lowered = self.lower_tracked(child, &mut children)?;
            if is(Some(child), ty) {
                type_name = lowered;
            } else if is(Some(child), value) {
                initial_value = lowered;
            }
        }
        let type_name = type_name.or_else(|| {
            children
                .iter()
                .find(|child| is_type_name(&child.node_type))
                .cloned()
        });
        let variable = self
            .finish_node(NodeType::VariableDeclaration, node)
            .with_kind(NodeKind::VariableDeclaration(VariableDeclaration {
                type_name,
                visibility,
                state_variable,
                value: initial_value,
            }))
            .with_children(children);
        Ok(if state_variable {
            self.declared(variable, node, name)
        } else {
            self.with_declared_name(variable, name)
        })
    }

    fn modifier_invocation(&mut self, node: Node<'_>) -> Result<AstNode, ParseError> {
        let path: Vec<&str> = named(node)
            .into_iter()
            .take_while(|child| child.kind() == "identifier")
            .map(|child| self.text(child))
            .collect();
        let name = path.join(".");
        Ok(self
            .wrap(NodeType::ModifierInvocation, node)?
            .with_name(name))
    }

    fn catch_clause(&mut self, node: Node<'_>) -> Result<AstNode, ParseError> {
        let name = named(node)
            .into_iter()
            .find(|child| child.kind() == "identifier");
        let mut children = vec![];
        for child in named(node) {
            if !is(Some(child), name) {
                self.lower(child, &mut children)?;
            }
        }
        let clause = self
            .finish_node(NodeType::TryCatchClause, node)
            .with_children(children);
        Ok(self.with_declared_name(clause, name))
    }

    // ~~~ Types and expressions

    fn type_name(&mut self, node: Node<'_>, out: &mut Vec<AstNodeRef>) -> Result<(), ParseError> {
        let node_type = if has_token(node, "mapping") {
            NodeType::Mapping
        } else if has_token(node, "[") {
            NodeType::ArrayTypeName
        } else if has_token(node, "function") {
            NodeType::FunctionTypeName
        } else {
            let children = named(node);
            // `address payable` may keep `payable` outside the primitive.
            if let [primitive] = children.as_slice() {
                if primitive.kind() == "primitive_type" {
                    out.push(self.elementary_type(node).into_ref());
                    return Ok(());
                }
            }
            for child in children {
                self.lower(child, out)?;
            }
            return Ok(());
        };
        out.push(self.wrap(node_type, node)?.into_ref());
        Ok(())
    }

    fn elementary_type(&mut self, node: Node<'_>) -> AstNode {
        let name = self.text(node).split_whitespace().collect::<Vec<_>>().join(" ");
        self.leaf(NodeType::ElementaryTypeName, node).with_name(name)
    }

    fn member_access(&mut self, node: Node<'_>) -> Result<AstNode, ParseError> {
        let children_nodes = named(node);
        let property = node.child_by_field_name("property").or_else(|| {
            (children_nodes.len() >= 2)
                .then(|| children_nodes.last().copied())
                .flatten()
        });
        let object = node.child_by_field_name("object");
        let mut children = vec![];
        let mut expression = None;
        for child in children_nodes {
            if is(Some(child), property) {
                continue;
            }
            let lowered = self.lower_tracked(child, &mut children)?;
            if is(Some(child), object) {
                expression = lowered;
            }
        }
        let expression = expression.or_else(|| children.first().cloned());
        let member_name = property
            .map(|property| self.text(property).to_string())
            .unwrap_or_default();
        Ok(self
            .finish_node(NodeType::MemberAccess, node)
            .with_kind(NodeKind::MemberAccess {
                member_name,
                expression,
            })
            .with_children(children))
    }

    // ~~~ Nodes

    #[inline]
    fn text(&self, node: Node<'_>) -> &'a str {
        self.src.get(node.byte_range()).unwrap_or_default()
    }

    /// A node over `node` with every named child lowered below it.
    fn wrap(&mut self, node_type: NodeType, node: Node<'_>) -> Result<AstNode, ParseError> {
        let mut children = vec![];
        for child in named(node) {
            self.lower(child, &mut children)?;
        }
        Ok(self.finish_node(node_type, node).with_children(children))
    }

    #[inline]
    fn leaf(&mut self, node_type: NodeType, node: Node<'_>) -> AstNode {
        self.finish_node(node_type, node)
    }

    #[inline]
    fn finish_node(&mut self, node_type: NodeType, node: Node<'_>) -> AstNode {
        self.finish(node_type, node.start_byte(), node.end_byte())
    }

    /// Create a node over `lo..hi` with a fresh id.
    fn finish(&mut self, node_type: NodeType, lo: usize, hi: usize) -> AstNode {
        let id = self.next_id;
        self.next_id += 1;
        let mut ast = AstNode::new(id, node_type, SourceLocation::from_range(lo, hi, None));
        ast.loc = self.loc(lo, hi);
        ast
    }

    fn loc(&self, lo: usize, hi: usize) -> Option<LineColRange> {
        let one_based = |pos: LineCol| LineCol::new(pos.line + 1, pos.column);
        Some(LineColRange::new(
            one_based(self.lines.line_col(lo)?),
            one_based(self.lines.line_col(hi)?),
        ))
    }

    fn with_declared_name(&self, ast: AstNode, name: Option<Node<'_>>) -> AstNode {
        match name {
            Some(name) if !name.is_missing() => ast.with_name(self.text(name)),
            _ => ast,
        }
    }

    /// Name `ast` and attach the NatSpec preceding `node`.
    fn declared(&self, ast: AstNode, node: Node<'_>, name: Option<Node<'_>>) -> AstNode {
        let ast = self.with_declared_name(ast, name);
        match natspec::documentation(self.src, node) {
            Some(doc) => ast.with_documentation(doc),
            None => ast,
        }
    }
}

/// Named children of `node` in document order, leaving out comments and
/// nodes the parser inserted for missing input.
fn named<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_missing() && child.kind() != "comment")
        .collect()
}

/// Check if `node` has the anonymous token `token` as a direct child.
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

#[inline]
fn is(node: Option<Node<'_>>, other: Option<Node<'_>>) -> bool {
    matches!((node, other), (Some(node), Some(other)) if node.id() == other.id())
}

fn is_type_name(node_type: &NodeType) -> bool {
    matches!(
        node_type,
        NodeType::ElementaryTypeName
            | NodeType::UserDefinedTypeName
            | NodeType::Mapping
            | NodeType::ArrayTypeName
            | NodeType::FunctionTypeName
    )
}

fn scan_parameter<'t>(
    child: Node<'t>,
    open: &mut Option<usize>,
    close: &mut Option<usize>,
    found: &mut Vec<Node<'t>>,
) {
    match child.kind() {
        "(" if open.is_none() => *open = Some(child.start_byte()),
        ")" if open.is_some() && close.is_none() => *close = Some(child.end_byte()),
        kind if PARAMETERS.contains(&kind) && !child.is_missing() => found.push(child),
        _ => {}
    }
}
