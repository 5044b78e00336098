//! Rule to prefer `satisfies` over a wide annotation on literal objects.
//!
//! # Rationale
//!
//! `const routes: Record<string, Route> = { home: ... }` checks the literal
//! but then forgets its keys: `routes.hoem` type-checks. With
//! `satisfies Record<string, Route>` the literal is still checked and the
//! constant keeps its precise inferred type.
//!
//! Only `const` declarations whose annotation is a `Record` or an
//! index-signature type and whose value is an object literal with literal
//! keys are flagged.

use crate::util::annotated_type;
use typesmith_core::pattern::{any, kind, predicate};
use typesmith_core::{Confidence, EditTemplate, Fixer, Node, Quantifier, Rule, Severity};

/// Rule code for prefer-satisfies.
pub const CODE: &str = "TY008";

/// Rule name for prefer-satisfies.
pub const NAME: &str = "prefer-satisfies";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Prefers `satisfies` to annotating a literal with an index type")
        .matches(
            kind("variable_declarator")
                .field("name", any().capture("name"))
                .parent(kind("lexical_declaration").with_token("const"))
                .field(
                    "type",
                    kind("type_annotation")
                        .children(
                            Quantifier::Exactly(1),
                            predicate(is_index_type).capture("type"),
                        )
                        .capture("annotation"),
                )
                .field("value", kind("object").filter(has_literal_keys).capture("value")),
        )
        .message("annotation `{type}` widens the keys of `{name}`")
        .help("check the literal with `satisfies {type}` and keep its inferred keys")
        .fixer(Fixer::Template {
            description: "Move `{type}` into a `satisfies` clause",
            edits: vec![
                EditTemplate::Delete {
                    target: "annotation",
                },
                EditTemplate::InsertAfter {
                    target: "value",
                    text: " satisfies {type}",
                },
            ],
            confidence: Confidence::High,
        })
}

/// `Record<K, V>` with a string-like key, or `{ [k: K]: V }`.
fn is_index_type(ty: Node<'_>) -> bool {
    match ty.kind() {
        "generic_type" => {
            let is_record = ty.child_by_field("name").is_some_and(|n| n.text() == "Record");
            let key = ty
                .child_by_field("type_arguments")
                .and_then(|args| args.first_named_child());
            is_record
                && key.is_some_and(|k| {
                    matches!(k.text(), "string" | "number" | "PropertyKey")
                })
        }
        "object_type" => {
            let mut members = ty.significant_children();
            members.next().is_some_and(|m| m.kind() == "index_signature")
                && members.next().is_none()
        }
        _ => false,
    }
}

fn has_literal_keys(object: Node<'_>) -> bool {
    let mut pairs = object.significant_children().peekable();
    pairs.peek().is_some()
        && pairs.all(|p| {
            p.kind() == "pair"
                && p.child_by_field("key").is_some_and(|k| {
                    matches!(k.kind(), "property_identifier" | "string" | "number")
                })
        })
}

/// The annotated type of a declarator, if any.
#[must_use]
pub fn declared_type(declarator: Node<'_>) -> Option<Node<'_>> {
    declarator.child_by_field("type").and_then(annotated_type)
}
