//! Rule to flag type assertions that narrow without a check.
//!
//! `value as T` and `<T>value` tell the compiler to trust the author. For
//! object and array literals `satisfies T` checks the same shape without
//! widening or narrowing the inferred type, so those are rewritten. Other
//! operands need a type guard, which cannot be synthesized.
//!
//! Not flagged: `as const`, widening to `unknown`, double assertions
//! (see [`no_double_assertion`](crate::no_double_assertion)) and literal
//! self-assertions (see [`prefer_as_const`](crate::prefer_as_const)).

use crate::prefer_as_const::is_self_literal_assertion;
use crate::util::{as_parts, propose, token_child};
use typesmith_core::{Captures, Edit, FileContext, FixOutcome, Match, Node, Rule, Severity};

/// Rule code for no-casual-type-assertion.
pub const CODE: &str = "TY004";

/// Rule name for no-casual-type-assertion.
pub const NAME: &str = "no-casual-type-assertion";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Flags unchecked type assertions")
        .matches_with(find)
        .message("assertion to `{type}` is not checked by the compiler")
        .help("use `satisfies` for literals or narrow with a type guard")
        .fix_with(fix)
}

/// Returns true for `unknown` and `any`, the targets of the first half of a
/// double assertion.
pub(crate) fn is_escape_type(ty: Node<'_>) -> bool {
    ty.kind() == "predefined_type" && matches!(ty.text(), "unknown" | "any")
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let (operand, ty) = match node.kind() {
        "as_expression" => {
            let (operand, ty) = as_parts(node)?;
            (operand, ty?)
        }
        "type_assertion" => {
            let mut named = node.significant_children();
            let ty = named.next()?.first_named_child()?;
            (named.next()?, ty)
        }
        _ => return None,
    };
    if ty.kind() == "predefined_type" && ty.text() == "unknown" {
        return None;
    }
    let double = as_parts(operand).is_some_and(|(_, inner)| inner.is_some_and(is_escape_type));
    if double || is_self_literal_assertion(operand, ty) {
        return None;
    }
    Some(
        Captures::new()
            .with_node("operand", operand)
            .with_node("type", ty),
    )
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let (Some(node), Some(operand), Some(ty)) = (
        m.node(ctx),
        m.capture(ctx, "operand"),
        m.capture(ctx, "type"),
    ) else {
        return FixOutcome::manual("assertion not found");
    };
    if !matches!(operand.kind(), "object" | "array") {
        return FixOutcome::manual("narrowing needs a type guard");
    }
    let source = ctx.source();
    let edit = if node.kind() == "as_expression" {
        let Some(keyword) = token_child(node, "as") else {
            return FixOutcome::manual("assertion keyword not found");
        };
        Edit::replace(source, keyword.span(), "satisfies")
    } else {
        let rewritten = format!("{} satisfies {}", operand.text(), ty.text());
        let text = if stands_alone(node) {
            rewritten
        } else {
            format!("({rewritten})")
        };
        Edit::replace(source, node.span(), text)
    };
    propose(format!("Check the literal with `satisfies {}`", ty.text()), vec![edit])
}

/// Positions where `x satisfies T` needs no parentheses.
///
/// `satisfies` binds looser than a prefix assertion, and a statement that
/// starts with `{` would parse as a block.
fn stands_alone(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| match p.kind() {
        "variable_declarator" => node.field_name() == Some("value"),
        "arguments" | "return_statement" | "parenthesized_expression" => true,
        _ => false,
    })
}
