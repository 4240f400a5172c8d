//! Plain text descriptions of declarations, shown on hover.

use solsense_ast::{AstNode, AstNodeRef};

/// `<type> <visibility> <name>`, leaving out the parts `node` lacks.
///
/// The type is the compiler's type string, or for fast-parse nodes the name
/// or name path of the declared type.
pub fn variable_declaration(node: &AstNode) -> String {
    let type_name = node.type_string().or_else(|| {
        node.type_name()
            .and_then(|type_name| type_name.name().or_else(|| type_name.name_path()))
    });
    [type_name, node.visibility(), node.name().filter(|name| !name.is_empty())]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_parameters(parameters: &[AstNodeRef]) -> String {
    let parameters: Vec<String> = parameters
        .iter()
        .map(|parameter| variable_declaration(parameter))
        .collect();
    format!("({})", parameters.join(", "))
}

/// Parameters of a function like node or a parameter list, as `(a, b)`.
pub fn function_parameters(node: &AstNode) -> Option<String> {
    node.parameters().map(format_parameters)
}

pub fn function_return_parameters(node: &AstNode) -> Option<String> {
    node.return_parameters().map(format_parameters)
}

/// NatSpec of `node`, every line trimmed and newline terminated.
pub fn node_documentation(node: &AstNode) -> Option<String> {
    let documentation = node.documentation.as_ref()?;
    Some(
        documentation
            .text
            .split('\n')
            .map(|line| format!("{}\n", line.trim()))
            .collect(),
    )
}
