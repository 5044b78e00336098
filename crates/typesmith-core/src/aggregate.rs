//! Diagnostic aggregator: confirmed matches to ordered diagnostics.

use crate::context::FileContext;
use crate::matcher::Match;
use crate::pattern::render;
use crate::rule::RuleSet;
use crate::types::{Diagnostic, DiagnosticState, Location, Severity};
use std::collections::HashSet;

/// A diagnostic together with the match it came from.
#[derive(Debug, Clone)]
pub struct Finding {
    /// The reported diagnostic.
    pub diagnostic: Diagnostic,
    /// Source match, kept for fix synthesis.
    pub matched: Match,
}

/// Converts confirmed matches into diagnostics.
///
/// Duplicate `(rule, span)` pairs collapse to the first one seen. Overlaps
/// between different rules are kept. Output is ordered by start offset,
/// then rule name. Rules below `min_severity` are dropped.
#[must_use]
pub fn aggregate(
    matches: Vec<Match>,
    rules: &RuleSet,
    ctx: &FileContext<'_>,
    min_severity: Severity,
) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut findings: Vec<Finding> = matches
        .into_iter()
        .filter(|m| seen.insert((m.rule, m.span)))
        .filter_map(|m| {
            let rule = rules.get(m.rule)?;
            if rule.severity < min_severity {
                return None;
            }
            let source = ctx.source();
            let (line, column) = ctx.position(m.span.start);
            let location = Location::new(ctx.path.to_path_buf(), line, column)
                .with_span(m.span.start, m.span.len());
            let mut diagnostic = Diagnostic::new(
                rule.code,
                rule.name,
                rule.severity,
                location,
                m.span,
                render(rule.message, &m.captures, source),
            );
            if let Some(help) = rule.help {
                diagnostic = diagnostic.with_help(render(help, &m.captures, source));
            }
            diagnostic.transition(DiagnosticState::Diagnosed).ok()?;
            Some(Finding {
                diagnostic,
                matched: m,
            })
        })
        .collect();

    findings.sort_by(|a, b| {
        a.matched
            .span
            .start
            .cmp(&b.matched.span.start)
            .then_with(|| a.matched.rule_name.cmp(b.matched.rule_name))
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Captures;
    use crate::rule::Rule;
    use crate::span::Span;
    use crate::tree::{NodeId, SyntaxTree, TreeBuilder};
    use std::path::Path;

    fn tree() -> SyntaxTree {
        let src = "let a: any;\nlet b: Object;";
        let mut b = TreeBuilder::new(src);
        b.named(None, "program", None, Span::new(0, src.len()));
        b.finish().expect("valid tree")
    }

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new("zeta-rule", "TY901", Severity::Warning).message("zeta {name}"),
            Rule::new("alpha-rule", "TY902", Severity::Suggestion)
                .message("alpha")
                .help("try {name}"),
        ])
        .expect("valid")
    }

    fn hit(rule: usize, start: usize, end: usize) -> Match {
        Match {
            rule,
            rule_name: if rule == 0 { "zeta-rule" } else { "alpha-rule" },
            node: NodeId::ROOT,
            span: Span::new(start, end),
            captures: Captures::new().with_text("name", "x"),
        }
    }

    #[test]
    fn dedupes_and_orders() {
        let tree = tree();
        let ctx = FileContext::new(Path::new("a.ts"), &tree);
        let matches = vec![
            hit(0, 19, 25),
            hit(0, 7, 10),
            hit(1, 7, 10),
            hit(0, 7, 10),
        ];
        let out = aggregate(matches, &rules(), &ctx, Severity::Suggestion);
        let order: Vec<_> = out
            .iter()
            .map(|f| (f.diagnostic.rule.as_str(), f.diagnostic.span.start))
            .collect();
        assert_eq!(order, [("alpha-rule", 7), ("zeta-rule", 7), ("zeta-rule", 19)]);
        assert_eq!(out[1].diagnostic.message, "zeta x");
        assert_eq!(out[0].diagnostic.help.as_deref(), Some("try x"));
        assert_eq!(out[2].diagnostic.location.line, 2);
        assert_eq!(out[2].diagnostic.location.column, 8);
        assert!(out
            .iter()
            .all(|f| f.diagnostic.state == DiagnosticState::Diagnosed));
    }

    #[test]
    fn min_severity_drops_suggestions() {
        let tree = tree();
        let ctx = FileContext::new(Path::new("a.ts"), &tree);
        let out = aggregate(
            vec![hit(0, 7, 10), hit(1, 7, 10)],
            &rules(),
            &ctx,
            Severity::Warning,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].diagnostic.severity, Severity::Warning);
    }
}
