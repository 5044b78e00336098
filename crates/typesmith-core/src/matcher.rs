//! Syntax matcher: evaluates every rule against every node.
//!
//! Traversal is pre-order; for each node, rules run in registration order,
//! so the raw match list is deterministic. A rule whose matcher panics is
//! reported once and skipped for the rest of the file; matches it produced
//! earlier are kept.

use crate::context::FileContext;
use crate::engine::{Deadline, DeadlineExceeded};
use crate::error::{EngineError, Phase};
use crate::pattern::Captures;
use crate::rule::{Matcher, Rule, RuleSet};
use crate::span::Span;
use crate::tree::{Node, NodeId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Capture name that narrows the reported span.
pub const SPAN_CAPTURE: &str = "span";

/// A structural hit of one rule on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Registration index in the active rule set.
    pub rule: usize,
    /// Rule name.
    pub rule_name: &'static str,
    /// Matched node.
    pub node: NodeId,
    /// Reported span: the node, or the `span` capture when bound.
    pub span: Span,
    /// Named captures.
    pub captures: Captures,
}

impl Match {
    /// The matched node.
    #[must_use]
    pub fn node<'a>(&self, ctx: &FileContext<'a>) -> Option<Node<'a>> {
        ctx.node(self.node)
    }

    /// Node bound under a capture name.
    #[must_use]
    pub fn capture<'a>(&self, ctx: &FileContext<'a>, name: &str) -> Option<Node<'a>> {
        self.captures.node(name).and_then(|id| ctx.node(id))
    }

    /// Text bound under a capture name.
    #[must_use]
    pub fn text<'a>(&'a self, ctx: &FileContext<'a>, name: &str) -> Option<&'a str> {
        self.captures.text(name, ctx.source())
    }
}

/// Matches plus the rule failures isolated along the way.
#[derive(Debug, Default)]
pub struct MatchOutput {
    /// Raw matches in traversal order.
    pub matches: Vec<Match>,
    /// One error per failed rule.
    pub errors: Vec<EngineError>,
}

/// Runs all rules over the tree in `ctx`.
///
/// # Errors
///
/// Returns [`DeadlineExceeded`] if the deadline passes mid-traversal.
pub fn find_matches(
    rules: &RuleSet,
    ctx: &FileContext<'_>,
    deadline: &Deadline,
) -> Result<MatchOutput, DeadlineExceeded> {
    let mut out = MatchOutput::default();
    let mut skipped = vec![false; rules.len()];

    for node in ctx.tree.preorder() {
        deadline.check()?;
        for (i, rule) in rules.iter().enumerate() {
            if skipped[i] {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| evaluate(rule, node, ctx))) {
                Ok(Some(captures)) => {
                    let span = captures.span(SPAN_CAPTURE).unwrap_or_else(|| node.span());
                    out.matches.push(Match {
                        rule: i,
                        rule_name: rule.name,
                        node: node.id(),
                        span,
                        captures,
                    });
                }
                Ok(None) => {}
                Err(payload) => {
                    let error = EngineError {
                        rule: rule.name.to_string(),
                        file: ctx.path.to_path_buf(),
                        phase: Phase::Match,
                        message: panic_message(payload.as_ref()),
                    };
                    warn!("{error}; rule skipped for the rest of the file");
                    skipped[i] = true;
                    out.errors.push(error);
                }
            }
        }
    }

    debug!(
        file = %ctx.path.display(),
        matches = out.matches.len(),
        "matching complete"
    );
    Ok(out)
}

fn evaluate(rule: &Rule, node: Node<'_>, ctx: &FileContext<'_>) -> Option<Captures> {
    match &rule.matcher {
        Matcher::Pattern(pattern) => {
            let mut captures = Captures::new();
            pattern.matches(node, &mut captures).then_some(captures)
        }
        Matcher::Custom(f) => f(node, ctx),
    }
}

/// Extracts a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
