//! AST node definitions.
//!
//! ```text
//!                 ┌──────────────┐
//!  JSON ─────────►│              │
//!  (compiler)     │   AstNode    │──► walker / symbol index / queries
//!  fast parser ──►│              │
//!                 └──────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use solsense_span::{LineColRange, SourceLocation};

use crate::node_type::NodeType;

pub type AstNodeRef = Arc<AstNode>;

/// Node id. Compiler ids are unique inside one compilation, fast-parse ids
/// are unique inside one parse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptions {
    pub type_string: Option<String>,
    pub type_identifier: Option<String>,
}

/// Payload shared by functions, modifiers, events and errors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Callable {
    /// `function`, `constructor`, `fallback`, `receive` or `freeFunction`.
    pub kind: Option<String>,
    pub visibility: Option<String>,
    pub parameters: Option<AstNodeRef>,
    pub return_parameters: Option<AstNodeRef>,
    pub body: Option<AstNodeRef>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableDeclaration {
    pub type_name: Option<AstNodeRef>,
    pub visibility: Option<String>,
    pub state_variable: bool,
    pub value: Option<AstNodeRef>,
}

/// Kind specific payload. Every node held here is also one of the owning
/// node's `children`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeKind {
    SourceUnit {
        absolute_path: Option<String>,
    },
    ImportDirective {
        file: String,
        absolute_path: Option<String>,
        source_unit: Option<NodeId>,
    },
    ContractDefinition {
        contract_kind: String,
    },
    /// FunctionDefinition, ModifierDefinition, EventDefinition, ErrorDefinition.
    Callable(Callable),
    StructDefinition {
        members: Vec<AstNodeRef>,
    },
    ParameterList {
        parameters: Vec<AstNodeRef>,
    },
    VariableDeclaration(VariableDeclaration),
    UserDefinedTypeName {
        name_path: Option<String>,
    },
    MemberAccess {
        member_name: String,
        expression: Option<AstNodeRef>,
    },
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub id: NodeId,
    pub node_type: NodeType,
    /// Byte range in the source text.
    pub src: SourceLocation,
    /// 1-based line range, only set on fast-parse nodes.
    pub loc: Option<LineColRange>,
    pub name: Option<String>,
    pub referenced_declaration: Option<NodeId>,
    pub scope: Option<NodeId>,
    pub documentation: Option<Documentation>,
    pub type_descriptions: Option<TypeDescriptions>,
    pub kind: NodeKind,
    /// Direct children in document order.
    pub children: Vec<AstNodeRef>,
}

impl AstNode {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType, src: SourceLocation) -> Self {
        Self {
            id: id.into(),
            node_type,
            src,
            loc: None,
            name: None,
            referenced_declaration: None,
            scope: None,
            documentation: None,
            type_descriptions: None,
            kind: NodeKind::Other,
            children: vec![],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_loc(mut self, loc: LineColRange) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_children(mut self, children: Vec<AstNodeRef>) -> Self {
        self.children = children;
        self
    }

    pub fn with_referenced_declaration(mut self, id: impl Into<NodeId>) -> Self {
        self.referenced_declaration = Some(id.into());
        self
    }

    pub fn with_scope(mut self, id: impl Into<NodeId>) -> Self {
        self.scope = Some(id.into());
        self
    }

    pub fn with_documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(Documentation { text: text.into() });
        self
    }

    pub fn with_type_string(mut self, type_string: impl Into<String>) -> Self {
        let descriptions = self.type_descriptions.get_or_insert_with(Default::default);
        descriptions.type_string = Some(type_string.into());
        self
    }

    #[inline]
    pub fn into_ref(self) -> AstNodeRef {
        Arc::new(self)
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn is(&self, node_type: &NodeType) -> bool {
        &self.node_type == node_type
    }

    #[inline]
    pub fn is_definition(&self) -> bool {
        self.node_type.is_definition()
    }

    pub fn visibility(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Callable(callable) => callable.visibility.as_deref(),
            NodeKind::VariableDeclaration(var) => var.visibility.as_deref(),
            _ => None,
        }
    }

    pub fn type_string(&self) -> Option<&str> {
        self.type_descriptions
            .as_ref()
            .and_then(|descriptions| descriptions.type_string.as_deref())
    }

    /// The declared type of a variable declaration.
    pub fn type_name(&self) -> Option<&AstNodeRef> {
        match &self.kind {
            NodeKind::VariableDeclaration(var) => var.type_name.as_ref(),
            _ => None,
        }
    }

    /// `namePath` of a user defined type name.
    pub fn name_path(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::UserDefinedTypeName { name_path } => name_path.as_deref(),
            _ => None,
        }
    }

    /// Parameters of a callable, or the entries of a parameter list.
    pub fn parameters(&self) -> Option<&[AstNodeRef]> {
        match &self.kind {
            NodeKind::Callable(callable) => callable
                .parameters
                .as_ref()
                .and_then(|list| list.parameters()),
            NodeKind::ParameterList { parameters } => Some(parameters),
            _ => None,
        }
    }

    pub fn return_parameters(&self) -> Option<&[AstNodeRef]> {
        match &self.kind {
            NodeKind::Callable(callable) => callable
                .return_parameters
                .as_ref()
                .and_then(|list| list.parameters()),
            _ => None,
        }
    }

    /// The object expression of a member access, `a` in `a.b`.
    pub fn expression(&self) -> Option<&AstNodeRef> {
        match &self.kind {
            NodeKind::MemberAccess { expression, .. } => expression.as_ref(),
            _ => None,
        }
    }

    /// Id of the source unit an import directive resolves to.
    pub fn source_unit(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::ImportDirective { source_unit, .. } => *source_unit,
            _ => None,
        }
    }
}
