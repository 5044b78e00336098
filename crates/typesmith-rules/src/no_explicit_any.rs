//! Rule to forbid the `any` type.
//!
//! `any` switches off checking for every value it touches. `unknown` keeps
//! the value opaque until it is narrowed.

use typesmith_core::pattern::kind;
use typesmith_core::{Fixer, Rule, Severity};

/// Rule code for no-explicit-any.
pub const CODE: &str = "TY002";

/// Rule name for no-explicit-any.
pub const NAME: &str = "no-explicit-any";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows the `any` type")
        .matches(kind("predefined_type").with_text("any"))
        .message("`any` disables type checking")
        .help("use `unknown` and narrow the value before use")
        .fixer(Fixer::replace("Replace `any` with `unknown`", "node", "unknown"))
}
