//! Rule to prefer `as const` over repeating a literal as its own type.

use crate::util::{as_parts, is_literal};
use typesmith_core::{Captures, FileContext, Fixer, Node, Rule, Severity};

/// Rule code for prefer-as-const.
pub const CODE: &str = "TY018";

/// Rule name for prefer-as-const.
pub const NAME: &str = "prefer-as-const";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Prefers `as const` to asserting a literal to itself")
        .matches_with(find)
        .message("`{operand} as {type}` repeats the literal")
        .help("use `as const`")
        .fixer(Fixer::replace("Replace with `as const`", "type", "const"))
}

/// Returns true for `"a" as "a"`: a literal asserted to the identical
/// literal type.
#[must_use]
pub fn is_self_literal_assertion(operand: Node<'_>, ty: Node<'_>) -> bool {
    ty.kind() == "literal_type" && is_literal(operand) && ty.text() == operand.text()
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let (operand, ty) = as_parts(node)?;
    let ty = ty?;
    is_self_literal_assertion(operand, ty).then(|| {
        Captures::new()
            .with_node("operand", operand)
            .with_node("type", ty)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};

    #[test]
    fn test_rewrites_literal_assertion() {
        let src = "let mode = \"dark\" as \"dark\";\nlet n = 3 as 3;";
        assert_eq!(check(rule(), src).len(), 2);
        assert_eq!(
            fix(rule(), src),
            "let mode = \"dark\" as const;\nlet n = 3 as const;"
        );
    }

    #[test]
    fn test_different_literal_is_not_flagged() {
        assert!(check(rule(), "let a = \"x\" as \"y\";\nlet b = 'x' as \"x\";").is_empty());
    }
}
