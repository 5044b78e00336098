//! Rule to replace empty interfaces with type aliases.
//!
//! `interface A {}` accepts almost any value, and `interface A extends B {}`
//! is just another name for `B`. Empty interfaces that take part in
//! declaration merging or live in ambient blocks are left alone.
//!
//! Only the `extends` form is rewritten: its alias is exact. A bare empty
//! interface has no type with the same meaning that reads better, so the
//! choice is left to the author.

use crate::util::propose;
use typesmith_core::pattern::{any, kind};
use typesmith_core::scope::in_ambient_context;
use typesmith_core::{
    Edit, FileContext, FixOutcome, Match, Node, Quantifier, Rule, Severity, Verdict,
};

/// Rule code for no-empty-interface.
pub const CODE: &str = "TY016";

/// Rule name for no-empty-interface.
pub const NAME: &str = "no-empty-interface";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Replaces empty interfaces with type aliases")
        .matches(
            kind("interface_declaration")
                .field("name", any().capture("name"))
                .field("body", any().children(Quantifier::None, any())),
        )
        .confirm(confirm)
        .message("interface `{name}` declares no members")
        .help("use a type alias")
        .fix_with(fix)
}

fn confirm(m: &Match, ctx: &FileContext<'_>) -> Verdict {
    let Some(node) = m.node(ctx) else {
        return Verdict::Confirmed;
    };
    if ctx.is_declaration_file || in_ambient_context(node) {
        Verdict::suppressed("ambient declaration")
    } else if ctx.scopes.siblings_of(node.id()).len() > 1 {
        Verdict::suppressed("takes part in declaration merging")
    } else {
        Verdict::Confirmed
    }
}

fn extended_types(node: Node<'_>) -> Vec<&str> {
    node.named_children()
        .filter(|c| c.kind() == "extends_type_clause")
        .flat_map(|c| c.children_by_field("type"))
        .map(Node::text)
        .collect()
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let (Some(node), Some(name), Some(body)) = (
        m.node(ctx),
        m.capture(ctx, "name"),
        m.node(ctx).and_then(|n| n.child_by_field("body")),
    ) else {
        return FixOutcome::manual("interface not found");
    };
    if body.children().any(|c| c.kind() == "comment") {
        return FixOutcome::manual("body holds comments");
    }
    let bases = extended_types(node);
    if bases.is_empty() {
        return FixOutcome::manual("an empty interface accepts any non-nullish value");
    }
    let value = bases.join(" & ");
    let type_params = node
        .child_by_field("type_parameters")
        .map_or("", |t| t.text());
    let text = format!("type {}{type_params} = {value};", name.text());
    propose(
        format!("Replace interface `{}` with a type alias", name.text()),
        vec![Edit::replace(ctx.source(), node.span(), text)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analyze_as, check, fix};
    use typesmith_core::DiagnosticState;

    #[test]
    fn test_empty_interface_variants() {
        let src = "export interface B<T> extends Base<T> {}\ninterface C extends X, Y {}";
        assert_eq!(check(rule(), src).len(), 2);
        assert_eq!(
            fix(rule(), src),
            "export type B<T> = Base<T>;\ntype C = X & Y;"
        );
    }

    #[test]
    fn test_bare_empty_interface_is_manual() {
        let src = "interface A {}\nconst a: A = { x: 1 };";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].state, DiagnosticState::FixUnavailable);
        assert!(diagnostics[0].fixes.is_empty());
        assert_eq!(fix(rule(), src), src);
    }

    #[test]
    fn test_merging_and_ambient_are_suppressed() {
        let src = "interface Env {}\ninterface Env { debug: boolean }\n\
                   declare global { interface Window {} }";
        let report = analyze_as(rule(), "a.ts", src);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.stats.suppressed, 2);
    }

    #[test]
    fn test_interface_with_members_passes() {
        assert!(check(rule(), "interface A extends B { x: 1 }").is_empty());
    }
}
