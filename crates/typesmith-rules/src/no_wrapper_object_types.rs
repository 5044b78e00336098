//! Rule to forbid boxed primitive types such as `String` and `Number`.

use crate::util::{is_type_reference, propose};
use typesmith_core::{Captures, Edit, FileContext, FixOutcome, Match, Node, Rule, Severity};

/// Rule code for no-wrapper-object-types.
pub const CODE: &str = "TY019";

/// Rule name for no-wrapper-object-types.
pub const NAME: &str = "no-wrapper-object-types";

const WRAPPERS: &[&str] = &["String", "Number", "Boolean", "Symbol", "BigInt"];

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows wrapper object types for primitives")
        .matches_with(find)
        .message("`{wrapper}` is the boxed object type, not the primitive")
        .help("use `{primitive}`")
        .fix_with(fix)
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let wrapper = WRAPPERS
        .iter()
        .find(|w| is_type_reference(node, w))?;
    Some(
        Captures::new()
            .with_node("wrapper", node)
            .with_text("primitive", wrapper.to_ascii_lowercase()),
    )
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let (Some(node), Some(primitive)) = (m.node(ctx), m.text(ctx, "primitive")) else {
        return FixOutcome::manual("type reference not found");
    };
    propose(
        format!("Replace `{}` with `{primitive}`", node.text()),
        vec![Edit::replace(ctx.source(), node.span(), primitive)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};

    #[test]
    fn test_lowercases_wrappers() {
        let src = "function f(a: String, b: Number[]): Boolean { return true; }";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].help.as_deref(), Some("use `string`"));
        assert_eq!(
            fix(rule(), src),
            "function f(a: string, b: number[]): boolean { return true; }"
        );
    }

    #[test]
    fn test_constructor_calls_are_not_flagged() {
        assert!(check(rule(), "const s = String(1);\nconst n: number = Number(\"2\");").is_empty());
    }
}
