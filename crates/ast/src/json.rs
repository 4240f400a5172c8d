//! Adapter from the compiler's JSON AST to [`AstNode`].
//!
//! Children are discovered generically: every field holding a node object,
//! or an array of node objects, becomes a child. A JSON object is a node when
//! it carries a `nodeType` and an integer `id`. Each node object is converted
//! exactly once, so the payload of a node and its `children` share the same
//! [`AstNodeRef`]s.

use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};
use solsense_span::{SourceLocation, SpanError};

use crate::ast::*;
use crate::node_type::NodeType;

#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("expected an AST node object, found: {0}")]
    NotANode(String),
    #[error("{node_type} node is missing the '{field}' field")]
    MissingField {
        node_type: String,
        field: &'static str,
    },
    #[error("invalid src of {node_type} node {id}: {source}")]
    InvalidSrc {
        node_type: String,
        id: i64,
        #[source]
        source: SpanError,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn is_node(value: &Value) -> bool {
    value.get("nodeType").is_some_and(Value::is_string)
        && value.get("id").is_some_and(|id| id.as_i64().is_some())
}

enum Field {
    One(AstNodeRef),
    Many(Vec<AstNodeRef>),
}

/// Converted node valued fields of one JSON object, in field order.
struct Fields<'a> {
    obj: &'a Map<String, Value>,
    nodes: Vec<(&'a str, Field)>,
}

impl<'a> Fields<'a> {
    fn collect(obj: &'a Map<String, Value>) -> Result<Self, AstError> {
        let mut nodes = vec![];
        for (key, value) in obj {
            match value {
                Value::Object(_) if is_node(value) => {
                    nodes.push((key.as_str(), Field::One(convert(value)?.into_ref())));
                }
                Value::Array(items) => {
                    let items = items
                        .iter()
                        .filter(|item| is_node(item))
                        .map(|item| convert(item).map(AstNode::into_ref))
                        .collect::<Result<Vec<_>, _>>()?;
                    if !items.is_empty() {
                        nodes.push((key.as_str(), Field::Many(items)));
                    }
                }
                _ => {}
            }
        }
        Ok(Self { obj, nodes })
    }

    fn one(&self, key: &str) -> Option<AstNodeRef> {
        self.nodes.iter().find_map(|(k, field)| match field {
            Field::One(node) if *k == key => Some(node.clone()),
            _ => None,
        })
    }

    fn many(&self, key: &str) -> Vec<AstNodeRef> {
        self.nodes
            .iter()
            .find_map(|(k, field)| match field {
                Field::Many(nodes) if *k == key => Some(nodes.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn str(&self, key: &str) -> Option<String> {
        self.obj.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.obj.get(key).and_then(Value::as_i64)
    }

    fn bool(&self, key: &str) -> bool {
        self.obj.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// All children, sorted by their start offset. The sort is stable so
    /// nodes sharing a start offset keep their field order.
    fn into_children(self) -> Vec<AstNodeRef> {
        let mut children: Vec<AstNodeRef> = self
            .nodes
            .into_iter()
            .flat_map(|(_, field)| match field {
                Field::One(node) => vec![node],
                Field::Many(nodes) => nodes,
            })
            .collect();
        children.sort_by_key(|child| child.src.start);
        children
    }
}

fn callable(fields: &Fields) -> Callable {
    Callable {
        kind: fields.str("kind"),
        visibility: fields.str("visibility"),
        parameters: fields.one("parameters"),
        return_parameters: fields.one("returnParameters"),
        body: fields.one("body"),
    }
}

fn kind(node_type: &NodeType, fields: &Fields) -> NodeKind {
    match node_type {
        NodeType::SourceUnit => NodeKind::SourceUnit {
            absolute_path: fields.str("absolutePath"),
        },
        NodeType::ImportDirective => NodeKind::ImportDirective {
            file: fields.str("file").unwrap_or_default(),
            absolute_path: fields.str("absolutePath"),
            source_unit: fields.int("sourceUnit").map(NodeId),
        },
        NodeType::ContractDefinition => NodeKind::ContractDefinition {
            contract_kind: fields
                .str("contractKind")
                .unwrap_or_else(|| "contract".to_string()),
        },
        NodeType::FunctionDefinition
        | NodeType::ModifierDefinition
        | NodeType::EventDefinition
        | NodeType::ErrorDefinition => NodeKind::Callable(callable(fields)),
        NodeType::StructDefinition => NodeKind::StructDefinition {
            members: fields.many("members"),
        },
        NodeType::ParameterList => NodeKind::ParameterList {
            parameters: fields.many("parameters"),
        },
        NodeType::VariableDeclaration => NodeKind::VariableDeclaration(VariableDeclaration {
            type_name: fields.one("typeName"),
            visibility: fields.str("visibility"),
            state_variable: fields.bool("stateVariable"),
            value: fields.one("value"),
        }),
        NodeType::UserDefinedTypeName => NodeKind::UserDefinedTypeName {
            // Older compilers emit `name`, newer ones an `IdentifierPath` node.
            name_path: fields
                .str("namePath")
                .or_else(|| {
                    fields
                        .one("pathNode")
                        .and_then(|path| path.name.clone())
                })
                .or_else(|| fields.str("name")),
        },
        NodeType::MemberAccess => NodeKind::MemberAccess {
            member_name: fields.str("memberName").unwrap_or_default(),
            expression: fields.one("expression"),
        },
        _ => NodeKind::Other,
    }
}

fn documentation(value: Option<&Value>) -> Option<Documentation> {
    match value? {
        Value::String(text) => Some(Documentation { text: text.clone() }),
        Value::Object(obj) => obj
            .get("text")
            .and_then(Value::as_str)
            .map(|text| Documentation {
                text: text.to_string(),
            }),
        _ => None,
    }
}

fn type_descriptions(value: Option<&Value>) -> Option<TypeDescriptions> {
    let obj = value?.as_object()?;
    Some(TypeDescriptions {
        type_string: obj
            .get("typeString")
            .and_then(Value::as_str)
            .map(str::to_string),
        type_identifier: obj
            .get("typeIdentifier")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn convert(value: &Value) -> Result<AstNode, AstError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AstError::NotANode(value.to_string()))?;
    let node_type = obj
        .get("nodeType")
        .and_then(Value::as_str)
        .map(NodeType::from)
        .ok_or_else(|| AstError::NotANode(value.to_string()))?;
    let missing = |field| AstError::MissingField {
        node_type: node_type.to_string(),
        field,
    };
    let id = obj.get("id").and_then(Value::as_i64).ok_or_else(|| missing("id"))?;
    let src = obj
        .get("src")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("src"))?
        .parse::<SourceLocation>()
        .map_err(|source| AstError::InvalidSrc {
            node_type: node_type.to_string(),
            id,
            source,
        })?;

    let fields = Fields::collect(obj)?;
    let mut node = AstNode::new(id, node_type, src);
    node.name = fields.str("name");
    node.referenced_declaration = fields.int("referencedDeclaration").map(NodeId);
    node.scope = fields.int("scope").map(NodeId);
    node.documentation = documentation(obj.get("documentation"));
    node.type_descriptions = type_descriptions(obj.get("typeDescriptions"));
    node.kind = kind(&node.node_type, &fields);
    node.children = fields.into_children();
    Ok(node)
}

impl AstNode {
    /// Convert a compiler JSON AST (usually a `SourceUnit`).
    pub fn from_json(value: &Value) -> Result<AstNodeRef, AstError> {
        Ok(convert(value)?.into_ref())
    }

    pub fn from_json_str(text: &str) -> Result<AstNodeRef, AstError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }
}

impl<'de> Deserialize<'de> for AstNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        convert(&value).map_err(de::Error::custom)
    }
}
