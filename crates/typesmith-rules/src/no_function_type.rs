//! Rule to forbid the `Function` type.
//!
//! `Function` accepts any callable and returns `any` when called. An
//! explicit signature keeps arguments and results checked.

use crate::util::{is_type_reference, propose, TIGHT_TYPE_PARENTS};
use typesmith_core::{Captures, Edit, FileContext, FixOutcome, Match, Node, Rule, Severity};

/// Rule code for no-function-type.
pub const CODE: &str = "TY005";

/// Rule name for no-function-type.
pub const NAME: &str = "no-function-type";

const REPLACEMENT: &str = "(...args: unknown[]) => unknown";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows the `Function` type")
        .matches_with(find)
        .message("`Function` makes every call return `any`")
        .help("spell out the signature, e.g. `(...args: unknown[]) => unknown`")
        .fix_with(fix)
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    is_type_reference(node, "Function").then(Captures::new)
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let Some(node) = m.node(ctx) else {
        return FixOutcome::manual("type reference not found");
    };
    let tight = node
        .parent()
        .is_some_and(|p| TIGHT_TYPE_PARENTS.contains(&p.kind()));
    let text = if tight {
        format!("({REPLACEMENT})")
    } else {
        REPLACEMENT.to_string()
    };
    propose(
        "Replace `Function` with an explicit signature",
        vec![Edit::replace(ctx.source(), node.span(), text)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};

    #[test]
    fn test_replaces_function_type() {
        assert_eq!(
            fix(rule(), "let cb: Function;"),
            "let cb: (...args: unknown[]) => unknown;"
        );
    }

    #[test]
    fn test_parenthesizes_in_unions_and_arrays() {
        assert_eq!(
            fix(rule(), "let a: Function | null;\nlet b: Function[];"),
            "let a: ((...args: unknown[]) => unknown) | null;\n\
             let b: ((...args: unknown[]) => unknown)[];"
        );
    }

    #[test]
    fn test_declaration_names_are_not_flagged() {
        let src = "interface Function {}\nlet f: Ns.Function;\nconst Function = 1;";
        assert!(check(rule(), src).is_empty());
    }
}
