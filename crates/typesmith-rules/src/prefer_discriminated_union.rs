//! Rule to suggest a discriminated union for "bag of optionals" types.
//!
//! A shape like `{ kind: "circle" | "square"; radius?: number; side?: number }`
//! cannot tell the compiler that `radius` exists exactly when `kind` is
//! `"circle"`. One member type per tag value can.

use crate::util::{annotated_type, union_members};
use typesmith_core::{Captures, FileContext, Node, Rule, Severity};

/// Rule code for prefer-discriminated-union.
pub const CODE: &str = "TY014";

/// Rule name for prefer-discriminated-union.
pub const NAME: &str = "prefer-discriminated-union";

const MIN_OPTIONAL: usize = 2;

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Suggests a discriminated union for a literal tag with optional fields")
        .matches_with(find)
        .message("`{name}` pairs tag `{tag}` with {optional} optional fields")
        .help("split it into one object type per `{tag}` value and union them")
}

fn body(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "interface_declaration" => node.child_by_field("body"),
        "type_alias_declaration" => node
            .child_by_field("value")
            .filter(|v| v.kind() == "object_type"),
        _ => None,
    }
}

fn is_literal_union(ty: Node<'_>) -> bool {
    ty.kind() == "union_type" && union_members(ty).iter().all(|m| m.kind() == "literal_type")
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let body = body(node)?;
    let props: Vec<Node<'_>> = body
        .named_children()
        .filter(|m| m.kind() == "property_signature")
        .collect();
    let optional = props.iter().filter(|p| p.has_token("?")).count();
    if optional < MIN_OPTIONAL {
        return None;
    }
    let tag = props.iter().find(|p| {
        !p.has_token("?")
            && p.child_by_field("type")
                .and_then(annotated_type)
                .is_some_and(is_literal_union)
    })?;
    let name = node.child_by_field("name")?;
    Some(
        Captures::new()
            .with_node("name", name)
            .with_node("span", name)
            .with_node("tag", tag.child_by_field("name")?)
            .with_text("optional", optional.to_string()),
    )
}
