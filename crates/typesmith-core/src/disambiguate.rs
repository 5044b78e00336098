//! Semantic disambiguator.
//!
//! Structural matches that cannot be judged from syntax alone are confirmed
//! or suppressed here, using the scope index, allow directives and, for
//! rules that need it, the type oracle.

use crate::context::FileContext;
use crate::engine::{Deadline, DeadlineExceeded};
use crate::error::{EngineError, Phase};
use crate::matcher::{panic_message, Match};
use crate::rule::RuleSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Decision of a confirm function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The match is a real finding.
    Confirmed,
    /// The match is intentional code; drop it.
    Suppressed(String),
    /// Not enough information to decide; drop it and count it.
    Unconfirmed(String),
}

impl Verdict {
    /// Builds a suppression verdict.
    #[must_use]
    pub fn suppressed(reason: impl Into<String>) -> Self {
        Self::Suppressed(reason.into())
    }

    /// Builds an unconfirmed verdict.
    #[must_use]
    pub fn unconfirmed(reason: impl Into<String>) -> Self {
        Self::Unconfirmed(reason.into())
    }
}

/// Confirmed matches and counters for the rest.
#[derive(Debug, Default)]
pub struct Disambiguated {
    /// Matches that become diagnostics, in input order.
    pub confirmed: Vec<Match>,
    /// Matches dropped as intentional.
    pub suppressed: usize,
    /// Matches dropped for lack of type information.
    pub unconfirmed: usize,
    /// Confirm functions that failed.
    pub errors: Vec<EngineError>,
}

/// Runs allow directives and confirm functions over raw matches.
///
/// A rule whose confirm function panics is dropped for the rest of the file.
///
/// # Errors
///
/// Returns [`DeadlineExceeded`] if the deadline passes.
pub fn disambiguate(
    matches: Vec<Match>,
    rules: &RuleSet,
    ctx: &FileContext<'_>,
    deadline: &Deadline,
) -> Result<Disambiguated, DeadlineExceeded> {
    let mut out = Disambiguated::default();
    let mut failed = vec![false; rules.len()];

    for m in matches {
        deadline.check()?;
        let Some(rule) = rules.get(m.rule) else {
            continue;
        };
        if failed[m.rule] {
            continue;
        }

        let allow = ctx.allowed(m.span.start, rule.name, rules);
        if allow.is_allowed() {
            debug!(
                rule = rule.name,
                reason = allow.reason().unwrap_or("-"),
                "suppressed by allow directive"
            );
            out.suppressed += 1;
            continue;
        }

        if rule.requires_type_info && !ctx.has_type_info() {
            out.unconfirmed += 1;
            continue;
        }

        let verdict = match rule.confirm {
            None => Verdict::Confirmed,
            Some(confirm) => match catch_unwind(AssertUnwindSafe(|| confirm(&m, ctx))) {
                Ok(verdict) => verdict,
                Err(payload) => {
                    let error = EngineError {
                        rule: rule.name.to_string(),
                        file: ctx.path.to_path_buf(),
                        phase: Phase::Confirm,
                        message: panic_message(payload.as_ref()),
                    };
                    warn!("{error}; rule skipped for the rest of the file");
                    failed[m.rule] = true;
                    out.errors.push(error);
                    continue;
                }
            },
        };

        match verdict {
            Verdict::Confirmed => out.confirmed.push(m),
            Verdict::Suppressed(reason) => {
                debug!(rule = rule.name, %reason, "match suppressed");
                out.suppressed += 1;
            }
            Verdict::Unconfirmed(reason) => {
                debug!(rule = rule.name, %reason, "match unconfirmed");
                out.unconfirmed += 1;
            }
        }
    }

    // Matches of a failed rule confirmed before the failure stay.
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_matches;
    use crate::pattern::kind;
    use crate::rule::Rule;
    use crate::span::Span;
    use crate::tree::{SyntaxTree, TreeBuilder};
    use crate::types::Severity;
    use std::path::Path;

    // x!;
    // // typesmith: allow(no-bang)
    // y!;
    fn tree() -> SyntaxTree {
        let src = "x!;\n// typesmith: allow(no-bang)\ny!;";
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        b.named(Some(root), "non_null_expression", None, Span::new(0, 2));
        b.named(Some(root), "comment", None, Span::new(4, 32));
        b.named(Some(root), "non_null_expression", None, Span::new(33, 35));
        b.finish().expect("valid tree")
    }

    fn never(_: &Match, _: &FileContext<'_>) -> Verdict {
        Verdict::suppressed("intentional")
    }

    #[test]
    fn allow_directive_suppresses_next_line() {
        let tree = tree();
        let ctx = FileContext::new(Path::new("a.ts"), &tree);
        let rules = RuleSet::new(vec![
            Rule::new("no-bang", "TY003", Severity::Warning).matches(kind("non_null_expression"))
        ])
        .expect("valid");
        let raw = find_matches(&rules, &ctx, &Deadline::none()).expect("matches");
        assert_eq!(raw.matches.len(), 2);
        let out = disambiguate(raw.matches, &rules, &ctx, &Deadline::none()).expect("ok");
        assert_eq!(out.confirmed.len(), 1);
        assert_eq!(out.confirmed[0].span, Span::new(0, 2));
        assert_eq!(out.suppressed, 1);
    }

    #[test]
    fn allow_directive_accepts_codes() {
        let src = "x!; // typesmith: allow(TY003)";
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        b.named(Some(root), "non_null_expression", None, Span::new(0, 2));
        b.named(Some(root), "comment", None, Span::new(4, src.len()));
        let tree = b.finish().expect("valid tree");
        let ctx = FileContext::new(Path::new("a.ts"), &tree);
        let rules = RuleSet::new(vec![
            Rule::new("no-bang", "TY003", Severity::Warning).matches(kind("non_null_expression"))
        ])
        .expect("valid");
        let raw = find_matches(&rules, &ctx, &Deadline::none()).expect("matches");
        let out = disambiguate(raw.matches, &rules, &ctx, &Deadline::none()).expect("ok");
        assert!(out.confirmed.is_empty());
    }

    #[test]
    fn confirm_and_type_info_gates() {
        let tree = tree();
        let ctx = FileContext::new(Path::new("a.ts"), &tree);
        let rules = RuleSet::new(vec![
            Rule::new("typed", "TY901", Severity::Suggestion)
                .matches(kind("non_null_expression"))
                .requires_type_info(),
            Rule::new("never", "TY902", Severity::Warning)
                .matches(kind("non_null_expression"))
                .confirm(never),
        ])
        .expect("valid");
        let raw = find_matches(&rules, &ctx, &Deadline::none()).expect("matches");
        let out = disambiguate(raw.matches, &rules, &ctx, &Deadline::none()).expect("ok");
        assert!(out.confirmed.is_empty());
        assert_eq!(out.unconfirmed, 2);
        assert_eq!(out.suppressed, 2);
    }
}
