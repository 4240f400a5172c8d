//! The fast-parse view of the active file, available before and between
//! successful compilations.

use solsense_ast::walker::flatten;
use solsense_ast::{AstNodeRef, NodeType};
use solsense_span::Position;

use crate::code_parser::CodeParser;
use crate::error::CodeParserError;
use crate::state::RetainedAst;

/// Node types kept by [`CodeParser::list_ast_nodes`].
const LISTED_NODE_TYPES: &[NodeType] = &[
    NodeType::VariableDeclaration,
    NodeType::UserDefinedTypeName,
    NodeType::FunctionDefinition,
    NodeType::ContractDefinition,
    NodeType::MemberAccess,
    NodeType::Identifier,
    NodeType::EventDefinition,
    NodeType::ModifierDefinition,
    NodeType::InvalidNode,
];

impl CodeParser {
    pub fn parse_solidity(&self, text: &str) -> Result<AstNodeRef, CodeParserError> {
        Ok(solsense_parser::parse_solidity_with_options(text, self.parser_options)?.ast)
    }

    /// Fast parse the active file, `text` standing in for its content when
    /// given. A text that can not be parsed keeps the AST last produced for
    /// the same file.
    pub fn get_current_file_ast(&self, text: Option<&str>) -> Option<AstNodeRef> {
        let file = match self.collaborators.files.current_file() {
            Ok(Some(file)) => file,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("failed to get the current file: {:#}", err);
                return None;
            }
        };
        self.state.write().current_file = Some(file.clone());

        let parsed = match text {
            Some(text) => self.parse_solidity(text),
            None => self
                .collaborators
                .files
                .read_file(&file)
                .map_err(CodeParserError::from)
                .and_then(|content| self.parse_solidity(&content)),
        };
        let mut state = self.state.write();
        match parsed {
            Ok(ast) => {
                state.retained_ast = Some(RetainedAst {
                    path: file,
                    ast: ast.clone(),
                });
                Some(ast)
            }
            Err(err) => {
                log::warn!("failed to parse {}: {}", file, err);
                state
                    .retained_ast
                    .as_ref()
                    .filter(|retained| retained.path == file)
                    .map(|retained| retained.ast.clone())
            }
        }
    }

    /// The innermost source unit, contract or function spanning the line of
    /// `position`.
    pub fn get_block_at_position(&self, position: Position, text: Option<&str>) -> Option<AstNodeRef> {
        let ast = self.get_current_file_ast(text)?;
        block_at_line(&ast, position.line_number)
    }

    /// Fast-parse nodes of the active file that can take part in a fallback
    /// definition lookup.
    pub fn list_ast_nodes(&self) -> Vec<AstNodeRef> {
        let Some(ast) = self.get_current_file_ast(None) else {
            return vec![];
        };
        flatten(&ast)
            .into_iter()
            .filter(|node| LISTED_NODE_TYPES.contains(&node.node_type))
            .collect()
    }
}

fn is_block(node_type: &NodeType) -> bool {
    matches!(
        node_type,
        NodeType::SourceUnit | NodeType::ContractDefinition | NodeType::FunctionDefinition
    )
}

pub(crate) fn block_at_line(node: &AstNodeRef, line: usize) -> Option<AstNodeRef> {
    let loc = node.loc?;
    if !is_block(&node.node_type) || !loc.contains_line(line) {
        return None;
    }
    node.children
        .iter()
        .find_map(|child| block_at_line(child, line))
        .or_else(|| Some(node.clone()))
}
