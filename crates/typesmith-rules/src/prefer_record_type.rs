//! Rule to prefer `Record<K, V>` over a lone index signature.

use typesmith_core::pattern::{any, kind};
use typesmith_core::{Fixer, Node, Quantifier, Rule, Severity};

/// Rule code for prefer-record-type.
pub const CODE: &str = "TY023";

/// Rule name for prefer-record-type.
pub const NAME: &str = "prefer-record-type";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Prefers `Record<K, V>` to an object type with one index signature")
        .matches(
            kind("object_type").filter(is_single_member).children(
                Quantifier::Exactly(1),
                kind("index_signature")
                    .without_token("readonly")
                    .field(
                        "index_type",
                        kind("predefined_type")
                            .filter(|k| matches!(k.text(), "string" | "number"))
                            .capture("key"),
                    )
                    .field(
                        "type",
                        kind("type_annotation")
                            .children(Quantifier::Exactly(1), any().capture("value")),
                    ),
            ),
        )
        .message("index signature can be written as `Record<{key}, {value}>`")
        .help("use the `Record` utility type")
        .fixer(Fixer::replace(
            "Replace with `Record<{key}, {value}>`",
            "node",
            "Record<{key}, {value}>",
        ))
}

fn is_single_member(object: Node<'_>) -> bool {
    object.parent().map(Node::kind) != Some("interface_declaration")
        && object.significant_children().count() == 1
}
