//! Rule to forbid non-null assertions (`value!`).

use typesmith_core::pattern::kind;
use typesmith_core::{Rule, Severity};

/// Rule code for no-non-null-assertion.
pub const CODE: &str = "TY003";

/// Rule name for no-non-null-assertion.
pub const NAME: &str = "no-non-null-assertion";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows the non-null assertion operator")
        .matches(kind("non_null_expression"))
        .message("non-null assertion hides a possible `null` or `undefined`")
        .help("narrow with a check, optional chaining or a default value")
}
