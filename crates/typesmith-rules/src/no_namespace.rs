//! Rule to forbid `namespace` blocks in modules.
//!
//! ES modules already give every file its own scope. Namespaces inside
//! `declare` blocks and declaration files describe existing globals and are
//! left alone.

use typesmith_core::pattern::{any, kind};
use typesmith_core::scope::in_ambient_context;
use typesmith_core::{FileContext, Match, Rule, Severity, Verdict};

/// Rule code for no-namespace.
pub const CODE: &str = "TY021";

/// Rule name for no-namespace.
pub const NAME: &str = "no-namespace";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Warning)
        .description("Disallows runtime namespaces")
        .matches(
            kind("internal_module")
                .field("name", any().capture("name").capture("span")),
        )
        .confirm(confirm)
        .message("namespace `{name}` emits a runtime object")
        .help("split the members into a module and use ES imports")
}

fn confirm(m: &Match, ctx: &FileContext<'_>) -> Verdict {
    if ctx.is_declaration_file || m.node(ctx).is_some_and(in_ambient_context) {
        Verdict::suppressed("ambient namespace")
    } else {
        Verdict::Confirmed
    }
}
