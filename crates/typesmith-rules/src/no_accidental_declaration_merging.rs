//! Rule to flag repeated interface and type alias names in one scope.
//!
//! # Rationale
//!
//! Two interfaces with the same name silently merge into one type, so a
//! copy-pasted or forgotten declaration changes the shape of an unrelated
//! one. Repeated type aliases do not compile at all.
//!
//! # Suppression
//!
//! Merging is the point of module augmentation. When every declaration of
//! the name sits directly in `declare module "x" {}`, `declare global {}` or
//! `declare namespace X {}`, or the file is a `.d.ts` declaration file, the
//! match is suppressed.
//!
//! The warning is reported at the second and later declarations; there is
//! no automatic fix.

use typesmith_core::scope::DeclarationSite;
use typesmith_core::{Captures, FileContext, Match, Node, Rule, Severity, Verdict};

/// Rule code for no-accidental-declaration-merging.
pub const CODE: &str = "TY007";

/// Rule name for no-accidental-declaration-merging.
pub const NAME: &str = "no-accidental-declaration-merging";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Flags interfaces and type aliases that redeclare a name in the same scope")
        .matches_with(find)
        .confirm(confirm)
        .message("`{name}` is already declared in this scope and will merge with it")
        .help("rename one of the declarations or combine them into one")
}

fn type_siblings<'c>(node: Node<'_>, ctx: &'c FileContext<'_>) -> Vec<&'c DeclarationSite> {
    ctx.scopes
        .siblings_of(node.id())
        .into_iter()
        .filter(|s| s.kind.is_type_declaration())
        .collect()
}

fn find(node: Node<'_>, ctx: &FileContext<'_>) -> Option<Captures> {
    let site = ctx.scopes.site(node.id())?;
    if !site.kind.is_type_declaration() {
        return None;
    }
    let siblings = type_siblings(node, ctx);
    let first = siblings.first()?;
    if siblings.len() < 2 || first.node == node.id() {
        return None;
    }
    let name = node.child_by_field("name")?;
    Some(
        Captures::new()
            .with_node("name", name)
            .with_node("span", name),
    )
}

fn confirm(m: &Match, ctx: &FileContext<'_>) -> Verdict {
    if ctx.is_declaration_file {
        return Verdict::suppressed("declaration file");
    }
    let Some(node) = m.node(ctx) else {
        return Verdict::Confirmed;
    };
    if type_siblings(node, ctx).iter().all(|s| s.ambient) {
        Verdict::suppressed("intentional augmentation in an ambient block")
    } else {
        Verdict::Confirmed
    }
}
