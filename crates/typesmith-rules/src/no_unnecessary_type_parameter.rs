//! Rule to flag type parameters that relate nothing.
//!
//! # Rationale
//!
//! A type parameter earns its place by linking two positions: a parameter to
//! another parameter, or a parameter to the result. One that appears once in
//! the signature can be replaced by its constraint. One that appears only in
//! the return type is worse: it lets the caller pick the result type, which
//! is an unchecked cast in disguise, so it is still flagged but never
//! rewritten.
//!
//! # Fix
//!
//! `function f<T extends Shape>(s: T): void` becomes
//! `function f(s: Shape): void`. Parameters also used in the body or only
//! in the return type need a manual change.

use crate::util::{propose, TIGHT_TYPE_PARENTS};
use typesmith_core::scope::count_type_refs;
use typesmith_core::{Captures, Edit, FileContext, FixOutcome, Match, Node, Rule, Severity, Span};

/// Rule code for no-unnecessary-type-parameter.
pub const CODE: &str = "TY012";

/// Rule name for no-unnecessary-type-parameter.
pub const NAME: &str = "no-unnecessary-type-parameter";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Flags type parameters referenced at most once in their signature")
        .matches_with(find)
        .message("type parameter `{name}` is used {uses} in the signature")
        .help("replace it with its constraint, or link it to a second position")
        .fix_with(fix)
}

fn find(node: Node<'_>, ctx: &FileContext<'_>) -> Option<Captures> {
    if node.kind() != "type_parameter" {
        return None;
    }
    let usage = ctx.scopes.generic(node.id())?;
    let uses = match usage.signature_refs {
        0 => "nowhere",
        1 => "once",
        _ => return None,
    };
    Some(
        Captures::new()
            .with_node("name", node.child_by_field("name")?)
            .with_text("uses", uses),
    )
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let Some(param) = m.node(ctx) else {
        return FixOutcome::manual("type parameter not found");
    };
    if let Err(reason) = removable(param, ctx) {
        return FixOutcome::manual(reason);
    }
    let Some(list) = param.parent() else {
        return FixOutcome::manual("type parameter list not found");
    };
    let params: Vec<Node<'_>> = list
        .named_children()
        .filter(|n| n.kind() == "type_parameter")
        .collect();
    let group: Vec<Removable<'_>> = params
        .iter()
        .filter_map(|&p| removable(p, ctx).ok())
        .collect();

    // The first removable parameter rewrites the whole list.
    if let Some(lead) = group.first().filter(|r| r.param.id() != param.id()) {
        return FixOutcome::manual(format!("inlined together with `{}`", lead.name));
    }

    let source = ctx.source();
    let removed: Vec<bool> = params
        .iter()
        .map(|p| group.iter().any(|r| r.param.id() == p.id()))
        .collect();
    let mut edits = removals(list, &params, &removed, source);
    for r in &group {
        if let Some(reference) = r.reference {
            edits.push(Edit::replace(
                source,
                reference.span(),
                replacement(r.param, reference),
            ));
        }
    }
    let names = group
        .iter()
        .map(|r| format!("`{}`", r.name))
        .collect::<Vec<_>>()
        .join(", ");
    propose(format!("Inline type parameter {names}"), edits)
}

/// A type parameter the fixer can drop, with its one reference to inline.
struct Removable<'a> {
    param: Node<'a>,
    name: &'a str,
    reference: Option<Node<'a>>,
}

fn removable<'a>(
    param: Node<'a>,
    ctx: &'a FileContext<'_>,
) -> Result<Removable<'a>, &'static str> {
    let usage = ctx
        .scopes
        .generic(param.id())
        .ok_or("type parameter not indexed")?;
    if usage.signature_refs > 1 {
        return Err("type parameter links two positions");
    }
    if usage.body_refs > 0 {
        return Err("type parameter is also used in the body");
    }
    if usage.return_refs > 0 {
        return Err("type parameter only fixes the return type");
    }
    let reference = if usage.signature_refs == 1 {
        let reference = ctx
            .node(usage.owner)
            .and_then(|owner| owner.child_by_field("parameters"))
            .filter(|params| count_type_refs(*params, &usage.name) == 1)
            .and_then(|params| find_reference(params, &usage.name))
            .ok_or("type parameter is referenced by another type parameter")?;
        Some(reference)
    } else {
        None
    };
    Ok(Removable {
        param,
        name: &usage.name,
        reference,
    })
}

/// The constraint, or `unknown`, parenthesized where precedence needs it.
fn replacement(param: Node<'_>, reference: Node<'_>) -> String {
    let Some(constraint) = param
        .child_by_field("constraint")
        .and_then(|c| c.significant_children().next())
    else {
        return "unknown".to_string();
    };
    let loose = matches!(
        constraint.kind(),
        "union_type" | "intersection_type" | "function_type" | "conditional_type"
    );
    let tight = reference
        .parent()
        .is_some_and(|p| TIGHT_TYPE_PARENTS.contains(&p.kind()));
    if loose && tight {
        format!("({})", constraint.text())
    } else {
        constraint.text().to_string()
    }
}

fn find_reference<'t>(root: Node<'t>, name: &str) -> Option<Node<'t>> {
    root.descendants().find(|n| {
        n.kind() == "type_identifier"
            && n.text() == name
            && n.parent().map(Node::kind) != Some("nested_type_identifier")
    })
}

/// Deletion edits for the `removed` entries of `params`.
///
/// Parameters before the last kept one take the comma after them, the rest
/// take the comma before them, so the spans stay disjoint. With nothing kept
/// the whole `<...>` list goes.
fn removals(list: Node<'_>, params: &[Node<'_>], removed: &[bool], source: &str) -> Vec<Edit> {
    let Some(last_kept) = removed.iter().rposition(|&r| !r) else {
        return vec![Edit::delete(source, list.span())];
    };
    params
        .iter()
        .enumerate()
        .filter(|&(i, _)| removed[i])
        .map(|(i, p)| {
            let span = if i < last_kept {
                Span::new(p.span().start, params[i + 1].span().start)
            } else {
                Span::new(params[i - 1].span().end, p.span().end)
            };
            Edit::delete(source, span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};
    use typesmith_core::DiagnosticState;

    #[test]
    fn test_single_use_is_replaced_by_constraint() {
        let src = "function area<S extends Shape>(s: S): number { return 0; }";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "type parameter `S` is used once in the signature"
        );
        assert_eq!(
            fix(rule(), src),
            "function area(s: Shape): number { return 0; }"
        );
    }

    #[test]
    fn test_unconstrained_becomes_unknown() {
        assert_eq!(
            fix(rule(), "function log<T>(value: T): void {}"),
            "function log(value: unknown): void {}"
        );
    }

    #[test]
    fn test_removes_one_of_several() {
        assert_eq!(
            fix(rule(), "function pick<K, T extends A | B>(k: K, xs: T[]): K { return k; }"),
            "function pick<K>(k: K, xs: (A | B)[]): K { return k; }"
        );
    }

    #[test]
    fn test_every_flagged_parameter_goes_in_one_fix() {
        let src = "function f<A, B>(a: A, b: B): void {}";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].state, DiagnosticState::FixProposed);
        assert_eq!(diagnostics[1].state, DiagnosticState::FixUnavailable);
        assert_eq!(
            diagnostics[1].note.as_deref(),
            Some("manual: inlined together with `A`")
        );
        let fixed = fix(rule(), src);
        assert_eq!(fixed, "function f(a: unknown, b: unknown): void {}");
        assert!(check(rule(), &fixed).is_empty());
    }

    #[test]
    fn test_flagged_parameters_around_a_kept_one() {
        let src = "function g<A, K, B extends C>(a: A, k: K, b: B): K { return k; }";
        assert_eq!(
            fix(rule(), src),
            "function g<K>(a: unknown, k: K, b: C): K { return k; }"
        );
    }

    #[test]
    fn test_return_only_is_flagged_but_manual() {
        let diagnostics = check(rule(), "declare function parse<T>(json: string): T;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].state, DiagnosticState::FixUnavailable);
    }

    #[test]
    fn test_linking_parameters_pass() {
        let src = "function id<T>(x: T): T { return x; }\n\
                   function first<T>(xs: T[], fallback: T) { return xs[0] ?? fallback; }";
        assert!(check(rule(), src).is_empty());
    }
}
