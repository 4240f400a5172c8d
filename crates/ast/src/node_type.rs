use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! register_node_types {
    ($($name:ident,)*) => (
        /// Discriminant of an AST node, the `nodeType` field of the compiler
        /// output. Kinds unknown to the analysis are kept verbatim in
        /// [`NodeType::Other`].
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum NodeType {
            $($name,)*
            Other(String),
        }

        impl NodeType {
            pub fn as_str(&self) -> &str {
                match self {
                    $(NodeType::$name => stringify!($name),)*
                    NodeType::Other(name) => name,
                }
            }
        }

        impl From<&str> for NodeType {
            fn from(name: &str) -> Self {
                match name {
                    $(stringify!($name) => NodeType::$name,)*
                    other => NodeType::Other(other.to_string()),
                }
            }
        }
    )
}

register_node_types! {
    // Source units and directives
    SourceUnit,
    PragmaDirective,
    ImportDirective,
    UsingForDirective,
    // Declarations
    ContractDefinition,
    InheritanceSpecifier,
    StructDefinition,
    EnumDefinition,
    EnumValue,
    UserDefinedValueTypeDefinition,
    ParameterList,
    OverrideSpecifier,
    FunctionDefinition,
    VariableDeclaration,
    ModifierDefinition,
    ModifierInvocation,
    EventDefinition,
    ErrorDefinition,
    StructuredDocumentation,
    // Type names
    ElementaryTypeName,
    UserDefinedTypeName,
    IdentifierPath,
    FunctionTypeName,
    Mapping,
    ArrayTypeName,
    // Statements
    Block,
    UncheckedBlock,
    PlaceholderStatement,
    IfStatement,
    TryStatement,
    TryCatchClause,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    Continue,
    Break,
    Return,
    Throw,
    EmitStatement,
    RevertStatement,
    VariableDeclarationStatement,
    ExpressionStatement,
    InlineAssembly,
    // Expressions
    Conditional,
    Assignment,
    TupleExpression,
    UnaryOperation,
    BinaryOperation,
    FunctionCall,
    FunctionCallOptions,
    NewExpression,
    MemberAccess,
    IndexAccess,
    IndexRangeAccess,
    Identifier,
    ElementaryTypeNameExpression,
    Literal,
    // Produced by the tolerant parser where it had to skip input.
    InvalidNode,
}

impl NodeType {
    /// Node kinds that declare a symbol and are therefore their own
    /// definition.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            NodeType::ContractDefinition
                | NodeType::FunctionDefinition
                | NodeType::ModifierDefinition
                | NodeType::VariableDeclaration
                | NodeType::StructDefinition
                | NodeType::EventDefinition
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(NodeType::from(name.as_str()))
    }
}
