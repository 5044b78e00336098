//! Tree helpers shared by rule implementations.

use typesmith_core::{Confidence, Edit, Fix, FixOutcome, Node};

/// Parents in which a function or union type must be parenthesized.
pub const TIGHT_TYPE_PARENTS: &[&str] = &[
    "union_type",
    "intersection_type",
    "array_type",
    "readonly_type",
    "lookup_type",
];

/// The type inside a `type_annotation` (`: T` yields `T`).
#[must_use]
pub fn annotated_type(annotation: Node<'_>) -> Option<Node<'_>> {
    if annotation.kind() == "type_annotation" {
        annotation.significant_children().next()
    } else {
        None
    }
}

/// Returns true if the declaration holding `node` is exported.
///
/// Walks up to the nearest statement boundary, so `export const f = () => {}`
/// counts for the arrow function.
#[must_use]
pub fn is_exported_declaration(node: Node<'_>) -> bool {
    std::iter::once(node)
        .chain(node.ancestors())
        .take_while(|n| !matches!(n.kind(), "statement_block" | "program" | "class_body"))
        .any(|n| n.kind() == "export_statement")
}

/// Flattens a left-nested `union_type` into its members.
#[must_use]
pub fn union_members(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if n.kind() == "union_type" {
            let mut children: Vec<_> = n.significant_children().collect();
            children.reverse();
            stack.extend(children);
        } else {
            out.push(n);
        }
    }
    out
}

/// Widened primitive of a literal expression (`"a"` is `string`).
#[must_use]
pub fn literal_primitive(expr: Node<'_>) -> Option<&'static str> {
    match expr.kind() {
        "string" => Some("string"),
        "template_string" => (!expr
            .named_children()
            .any(|c| c.kind() == "template_substitution"))
        .then_some("string"),
        "number" => Some("number"),
        "true" | "false" => Some("boolean"),
        "unary_expression" if expr.has_token("-") => expr
            .child_by_field("argument")
            .filter(|a| a.kind() == "number")
            .map(|_| "number"),
        _ => None,
    }
}

/// Returns true for `string`, `number` and `true`/`false` literals.
#[must_use]
pub fn is_literal(expr: Node<'_>) -> bool {
    matches!(expr.kind(), "string" | "number" | "true" | "false")
}

/// Leading whitespace of the line containing `offset`.
#[must_use]
pub fn indent_at(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Builds a high-confidence fix, declining if the edits overlap.
#[must_use]
pub fn propose(description: impl Into<String>, edits: Vec<Edit>) -> FixOutcome {
    Fix::new(description, Confidence::High, edits).into()
}

/// Operand and target type of an `as_expression`.
///
/// `as const` has no target type.
#[must_use]
pub fn as_parts(node: Node<'_>) -> Option<(Node<'_>, Option<Node<'_>>)> {
    if node.kind() != "as_expression" {
        return None;
    }
    let mut named = node.significant_children();
    let operand = named.next()?;
    Some((operand, named.next()))
}

/// Returns true if `node` is a type reference (not a declared name)
/// spelled exactly `name`.
#[must_use]
pub fn is_type_reference(node: Node<'_>, name: &str) -> bool {
    node.kind() == "type_identifier"
        && node.text() == name
        && node.field_name() != Some("name")
        && node
            .parent()
            .is_some_and(|p| p.kind() != "nested_type_identifier")
}

/// The anonymous token child of kind `token`.
#[must_use]
pub fn token_child<'t>(node: Node<'t>, token: &str) -> Option<Node<'t>> {
    node.children().find(|c| !c.is_named() && c.kind() == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_of_nested_line() {
        let src = "namespace A {\n    enum B {}\n}";
        let offset = src.find("enum").expect("enum");
        assert_eq!(indent_at(src, offset), "    ");
        assert_eq!(indent_at(src, 0), "");
    }
}
