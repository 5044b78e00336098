//! Rule to suggest branding primitive type aliases.
//!
//! `type UserId = string` is only a comment: any string is accepted. An
//! intersection with a brand makes ids from different domains incompatible.

use typesmith_core::pattern::{any, kind, predicate};
use typesmith_core::{Fixer, Node, Rule, Severity};

/// Rule code for prefer-branded-primitive.
pub const CODE: &str = "TY015";

/// Rule name for prefer-branded-primitive.
pub const NAME: &str = "prefer-branded-primitive";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Suggests branding type aliases of bare primitives")
        .matches(
            kind("type_alias_declaration")
                .field("name", any().capture("name"))
                .field("value", predicate(is_brandable).capture("primitive"))
                .filter(|n| n.child_by_field("type_parameters").is_none()),
        )
        .message("`{name}` is interchangeable with any `{primitive}`")
        .help("brand it so only values of this domain are accepted")
        .fixer(Fixer::replace(
            "Brand `{name}`",
            "primitive",
            "{primitive} & {{ readonly __brand: \"{name}\" }}",
        ))
}

fn is_brandable(node: Node<'_>) -> bool {
    node.kind() == "predefined_type" && matches!(node.text(), "string" | "number" | "bigint")
}
