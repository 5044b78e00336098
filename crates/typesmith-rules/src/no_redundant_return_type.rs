//! Rule to drop return type annotations that repeat the inferred type.
//!
//! Local helpers do not need an annotation the compiler infers anyway.
//! Exported functions are skipped: their annotation is part of the module's
//! contract (see [`require_exported_return_type`](crate::require_exported_return_type)).
//!
//! Needs type information. Without an oracle, or when the oracle cannot
//! infer the type, matches stay unconfirmed.

use crate::util::{annotated_type, is_exported_declaration};
use typesmith_core::{
    Captures, Confidence, EditTemplate, FileContext, Fixer, Match, Node, Rule, Severity, Verdict,
};

/// Rule code for no-redundant-return-type.
pub const CODE: &str = "TY009";

/// Rule name for no-redundant-return-type.
pub const NAME: &str = "no-redundant-return-type";

const FUNCTIONS: &[&str] = &["function_declaration", "function_expression", "arrow_function"];

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Flags return type annotations equal to the inferred type")
        .matches_with(find)
        .requires_type_info()
        .confirm(confirm)
        .message("return type `{type}` is what the compiler infers")
        .help("remove the annotation")
        .fixer(Fixer::Template {
            description: "Remove the return type annotation",
            edits: vec![EditTemplate::Delete { target: "span" }],
            confidence: Confidence::Medium,
        })
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    if !FUNCTIONS.contains(&node.kind()) || is_exported_declaration(node) {
        return None;
    }
    node.child_by_field("body")?;
    let annotation = node.child_by_field("return_type")?;
    let ty = annotated_type(annotation)?;
    Some(
        Captures::new()
            .with_node("span", annotation)
            .with_node("type", ty),
    )
}

fn confirm(m: &Match, ctx: &FileContext<'_>) -> Verdict {
    let (Some(node), Some(annotated)) = (m.node(ctx), m.capture(ctx, "type")) else {
        return Verdict::unconfirmed("function not found");
    };
    match ctx.type_of(node) {
        None => Verdict::unconfirmed("return type could not be inferred"),
        Some(inferred) if inferred.matches(annotated.text()) => Verdict::Confirmed,
        Some(inferred) => {
            Verdict::suppressed(format!("annotation differs from inferred `{inferred}`"))
        }
    }
}
