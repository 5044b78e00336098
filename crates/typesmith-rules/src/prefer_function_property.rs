//! Rule to prefer function-typed properties over method shorthand in types.
//!
//! # Rationale
//!
//! Parameters of methods declared with shorthand (`handle(e: Event): void`)
//! are checked bivariantly even under `strictFunctionTypes`, so a handler
//! for a narrower event type is accepted where a wider one is required.
//! Property syntax (`handle: (e: Event) => void`) is checked
//! contravariantly.
//!
//! # Suppression
//!
//! Class members are left alone: class methods are bivariant in any case
//! and rewriting them would change `this` binding and the prototype.
//!
//! Overloaded methods and accessors are flagged but need a manual change.

use crate::util::{annotated_type, propose};
use typesmith_core::pattern::{any, kind};
use typesmith_core::{Edit, FileContext, FixOutcome, Match, Rule, Severity, Verdict};

/// Rule code for prefer-function-property.
pub const CODE: &str = "TY013";

/// Rule name for prefer-function-property.
pub const NAME: &str = "prefer-function-property";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Prefers function properties to method shorthand in object types")
        .matches(kind("method_signature").field("name", any().capture("name")))
        .confirm(confirm)
        .message("method shorthand `{name}` is checked bivariantly")
        .help("declare it as a property with a function type")
        .fix_with(fix)
}

fn confirm(m: &Match, ctx: &FileContext<'_>) -> Verdict {
    let in_class = m
        .node(ctx)
        .and_then(|n| n.parent())
        .is_some_and(|p| p.kind() == "class_body");
    if in_class {
        Verdict::suppressed("class member")
    } else {
        Verdict::Confirmed
    }
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let (Some(node), Some(name)) = (m.node(ctx), m.capture(ctx, "name")) else {
        return FixOutcome::manual("method not found");
    };
    if ["get", "set", "*", "async"].iter().any(|t| node.has_token(t)) {
        return FixOutcome::manual("accessor or modified method");
    }
    let overloaded = node.parent().is_some_and(|body| {
        body.named_children()
            .filter(|s| s.kind() == "method_signature" && s.id() != node.id())
            .any(|s| s.child_by_field("name").map(|n| n.text()) == Some(name.text()))
    });
    if overloaded {
        return FixOutcome::manual("overloaded method");
    }
    let Some(ret) = node.child_by_field("return_type").and_then(annotated_type) else {
        return FixOutcome::manual("method has no return type");
    };
    let Some(params) = node.child_by_field("parameters") else {
        return FixOutcome::manual("method has no parameter list");
    };
    let optional = if node.has_token("?") { "?" } else { "" };
    let type_params = node
        .child_by_field("type_parameters")
        .map_or("", |t| t.text());
    let text = format!(
        "{}{optional}: {type_params}{} => {}",
        name.text(),
        params.text(),
        ret.text()
    );
    propose(
        format!("Declare `{}` as a function property", name.text()),
        vec![Edit::replace(ctx.source(), node.span(), text)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{analyze_as, check, fix};
    use typesmith_core::DiagnosticState;

    #[test]
    fn test_interface_method_becomes_property() {
        let src = "interface Handler {\n  handle(e: Event): void;\n  map?<T>(x: T): T[];\n}";
        assert_eq!(
            fix(rule(), src),
            "interface Handler {\n  handle: (e: Event) => void;\n  map?: <T>(x: T) => T[];\n}"
        );
    }

    #[test]
    fn test_type_literal_member() {
        let src = "type Api = { fetch(id: string): Promise<User> };";
        assert_eq!(
            fix(rule(), src),
            "type Api = { fetch: (id: string) => Promise<User> };"
        );
    }

    #[test]
    fn test_class_members_are_suppressed() {
        let src = "class Base {\n  run(x: number): void;\n  run(x: number): void {}\n}";
        let report = analyze_as(rule(), "a.ts", src);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_overloads_are_manual() {
        let src = "interface P {\n  on(e: \"a\"): void;\n  on(e: \"b\"): void;\n}";
        let diagnostics = check(rule(), src);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.state == DiagnosticState::FixUnavailable));
    }

    #[test]
    fn test_property_syntax_passes() {
        assert!(check(rule(), "interface H { handle: (e: Event) => void }").is_empty());
    }
}
