//! Rule to prefer `@ts-expect-error` over `@ts-ignore`.
//!
//! `@ts-ignore` keeps silencing the next line after the error is gone;
//! `@ts-expect-error` fails once there is nothing left to suppress.

use crate::util::propose;
use typesmith_core::{
    Captures, Edit, FileContext, FixOutcome, Match, Node, Rule, Severity, Span,
};

/// Rule code for prefer-ts-expect-error.
pub const CODE: &str = "TY020";

/// Rule name for prefer-ts-expect-error.
pub const NAME: &str = "prefer-ts-expect-error";

const IGNORE: &str = "@ts-ignore";
const EXPECT: &str = "@ts-expect-error";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Prefers `@ts-expect-error` to `@ts-ignore`")
        .matches_with(find)
        .message("`@ts-ignore` stays silent after the error is fixed")
        .help("use `@ts-expect-error`")
        .fix_with(fix)
}

/// Byte offset of the directive within the comment text.
fn directive_offset(comment: &str) -> Option<usize> {
    let body = comment
        .strip_prefix("//")
        .or_else(|| comment.strip_prefix("/*"))?;
    let body = body.trim_start_matches(['*', '/']);
    let trimmed = body.trim_start();
    if !trimmed.starts_with(IGNORE) {
        return None;
    }
    let rest = &trimmed[IGNORE.len()..];
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    Some(comment.len() - trimmed.len())
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    if node.kind() != "comment" {
        return None;
    }
    directive_offset(node.text())?;
    Some(Captures::new())
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let Some(node) = m.node(ctx) else {
        return FixOutcome::manual("comment not found");
    };
    let Some(offset) = directive_offset(node.text()) else {
        return FixOutcome::manual("directive not found");
    };
    let start = node.span().start + offset;
    propose(
        "Replace with `@ts-expect-error`",
        vec![Edit::replace(
            ctx.source(),
            Span::new(start, start + IGNORE.len()),
            EXPECT,
        )],
    )
}
