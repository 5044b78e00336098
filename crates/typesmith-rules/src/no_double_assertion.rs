//! Rule to forbid double assertions (`value as unknown as T`).

use crate::no_casual_type_assertion::is_escape_type;
use crate::util::as_parts;
use typesmith_core::{Captures, FileContext, Node, Rule, Severity};

/// Rule code for no-double-assertion.
pub const CODE: &str = "TY017";

/// Rule name for no-double-assertion.
pub const NAME: &str = "no-double-assertion";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows asserting through `unknown` or `any`")
        .matches_with(find)
        .message("double assertion through `{escape}` to `{type}` bypasses type checking")
        .help("validate the value at runtime or fix the source type")
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let (operand, ty) = as_parts(node)?;
    let (_, escape) = as_parts(operand)?;
    let escape = escape.filter(|e| is_escape_type(*e))?;
    Some(
        Captures::new()
            .with_node("escape", escape)
            .with_node("type", ty?),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use typesmith_core::DiagnosticState;

    #[test]
    fn test_detects_double_assertion() {
        let src = "declare const raw: string;\nconst n = raw as unknown as number;\nconst m = raw as any as Date;";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].message,
            "double assertion through `unknown` to `number` bypasses type checking"
        );
        assert_eq!(diagnostics[0].state, DiagnosticState::FixUnavailable);
    }

    #[test]
    fn test_single_assertions_pass() {
        let src = "declare const raw: string;\nconst a = raw as unknown;\nconst b = [1] as const;\nconst c = (raw as string) as String;";
        assert!(check(rule(), src).is_empty());
    }
}
