//! Rule to replace `enum` declarations with a const object and a union type.
//!
//! # Rationale
//!
//! Enums emit runtime code, numeric enums accept any number, and string enums
//! are nominal, so a plain string literal is rejected where the enum type is
//! expected. An `as const` object with a derived union keeps the named
//! constants without those pitfalls.
//!
//! # Fix
//!
//! ```text
//! enum Status { Active = "active", Inactive = "inactive" }
//! ```
//!
//! becomes
//!
//! ```text
//! const Status = { Active: "active", Inactive: "inactive" } as const;
//! type Status = (typeof Status)[keyof typeof Status];
//! ```
//!
//! Ambient enums, computed members and enums mixing string and numeric
//! values are left for a manual change.

use crate::util::{indent_at, literal_primitive, propose};
use typesmith_core::pattern::{any, kind};
use typesmith_core::scope::in_ambient_context;
use typesmith_core::{Edit, FileContext, FixOutcome, Match, Node, Rule, Severity};

/// Rule code for prefer-union-over-enum.
pub const CODE: &str = "TY001";

/// Rule name for prefer-union-over-enum.
pub const NAME: &str = "prefer-union-over-enum";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Prefers an `as const` object and a literal union over `enum`")
        .matches(kind("enum_declaration").field("name", any().capture("name")))
        .message("enum `{name}` has runtime and nominal-typing pitfalls")
        .help("use a const object with `as const` and derive the union type from it")
        .fix_with(fix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Str,
    Num,
}

fn fix(m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    let Some(node) = m.node(ctx) else {
        return FixOutcome::manual("enum not found");
    };
    if ctx.is_declaration_file || in_ambient_context(node) {
        return FixOutcome::manual("ambient enum has no runtime object to rewrite");
    }
    let (Some(name), Some(body)) = (node.child_by_field("name"), node.child_by_field("body"))
    else {
        return FixOutcome::manual("incomplete enum declaration");
    };
    let members = match members(body) {
        Ok(members) if members.is_empty() => return FixOutcome::manual("empty enum"),
        Ok(members) => members,
        Err(reason) => return FixOutcome::manual(reason),
    };

    let source = ctx.source();
    let target = node
        .parent()
        .filter(|p| p.kind() == "export_statement")
        .unwrap_or(node);
    let export = if target.id() == node.id() { "" } else { "export " };
    let indent = indent_at(source, target.span().start);
    let name = name.text();
    let object = members
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    let text = format!(
        "{export}const {name} = {{ {object} }} as const;\n\
         {indent}{export}type {name} = (typeof {name})[keyof typeof {name}];"
    );
    propose(
        format!("Replace enum `{name}` with a const object and union type"),
        vec![Edit::replace(source, target.span(), text)],
    )
}

/// Member keys and literal values, with implicit numeric values filled in.
fn members(body: Node<'_>) -> Result<Vec<(String, String)>, &'static str> {
    let mut out = Vec::new();
    let mut next: Option<i64> = Some(0);
    let mut seen: Option<ValueKind> = None;

    for member in body.significant_children() {
        let (key, value, kind) = if member.kind() == "enum_assignment" {
            let key = member.child_by_field("name").ok_or("malformed member")?;
            let value = member.child_by_field("value").ok_or("malformed member")?;
            match literal_primitive(value) {
                Some("string") if value.kind() == "string" => {
                    next = None;
                    (key, value.text().to_string(), ValueKind::Str)
                }
                Some("number") => {
                    next = value
                        .text()
                        .parse::<i64>()
                        .ok()
                        .and_then(|n| n.checked_add(1));
                    (key, value.text().to_string(), ValueKind::Num)
                }
                _ => return Err("computed enum member"),
            }
        } else {
            let n = next.ok_or("implicit member value cannot be computed")?;
            next = n.checked_add(1);
            (member, n.to_string(), ValueKind::Num)
        };

        if !matches!(key.kind(), "property_identifier" | "string" | "number") {
            return Err("computed enum member name");
        }
        if seen.is_some_and(|k| k != kind) {
            return Err("enum mixes string and numeric members");
        }
        seen = Some(kind);
        out.push((key.text().to_string(), value));
    }
    Ok(out)
}
