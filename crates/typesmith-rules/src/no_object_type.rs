//! Rule to forbid the `object` and `Object` types.

use crate::util::is_type_reference;
use typesmith_core::pattern::{any_of, kind, predicate};
use typesmith_core::{Fixer, Rule, Severity};

/// Rule code for no-object-type.
pub const CODE: &str = "TY006";

/// Rule name for no-object-type.
pub const NAME: &str = "no-object-type";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows the `object` and `Object` types")
        .matches(any_of(vec![
            kind("predefined_type").with_text("object").capture("type"),
            predicate(|n| is_type_reference(n, "Object")).capture("type"),
        ]))
        .message("`{type}` says nothing about the value's keys")
        .help("use `Record<string, unknown>` or a specific object type")
        .fixer(Fixer::replace(
            "Replace `{type}` with `Record<string, unknown>`",
            "node",
            "Record<string, unknown>",
        ))
}
