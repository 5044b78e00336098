//! Rule to prefer a named type over an inline object return type.

use crate::util::annotated_type;
use typesmith_core::scope::FUNCTION_LIKE;
use typesmith_core::{Captures, FileContext, Node, Rule, Severity};

/// Rule code for prefer-named-result-type.
pub const CODE: &str = "TY011";

/// Rule name for prefer-named-result-type.
pub const NAME: &str = "prefer-named-result-type";

/// Members at which an inline result type should get a name.
const MIN_MEMBERS: usize = 2;

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Prefers a named result type over an inline object return type")
        .matches_with(find)
        .message("inline return type with {count} members")
        .help("extract it into a named `type` or `interface` so callers can refer to it")
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    if !FUNCTION_LIKE.contains(&node.kind()) {
        return None;
    }
    let ty = annotated_type(node.child_by_field("return_type")?)?;
    if ty.kind() != "object_type" {
        return None;
    }
    let count = ty.significant_children().count();
    (count >= MIN_MEMBERS).then(|| {
        Captures::new()
            .with_node("span", ty)
            .with_text("count", count.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    #[test]
    fn test_inline_result_with_two_members() {
        let src = "function parse(s: string): { ok: boolean; value: number } {\n  return { ok: true, value: 1 };\n}";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "inline return type with 2 members");
        assert_eq!(diagnostics[0].location.column, 28);
    }

    #[test]
    fn test_small_or_named_results_pass() {
        let src = "function a(): { ok: boolean } { return { ok: true }; }\n\
                   type R = { ok: boolean; value: number };\n\
                   function b(): R { return { ok: true, value: 1 }; }";
        assert!(check(rule(), src).is_empty());
    }

    #[test]
    fn test_method_signatures_count() {
        let src = "interface Api {\n  get(): { status: number; body: string };\n}";
        assert_eq!(check(rule(), src).len(), 1);
    }
}
