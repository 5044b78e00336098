//! Fix synthesizer and applier.
//!
//! For each diagnostic whose rule has a fixer, a [`Fix`] is built from the
//! match captures. Candidate fixes whose edit ranges overlap are resolved by
//! rule rank: the winner stays proposed, the loser is rejected and left for
//! a manual change. Applying fixes verifies the file is unchanged since
//! analysis and writes all edits or none.

use crate::aggregate::Finding;
use crate::context::FileContext;
use crate::engine::{Deadline, DeadlineExceeded};
use crate::error::{EngineError, FixConflictError, Phase};
use crate::matcher::{panic_message, Match};
use crate::pattern::render;
use crate::rule::{EditTemplate, Fixer, Rule, RuleSet};
use crate::span::Span;
use crate::types::{Diagnostic, DiagnosticState, Edit, Fix};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of running a fixer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// A rewrite.
    Proposed(Fix),
    /// No safe rewrite; the reason is shown to the user.
    Manual(String),
}

impl FixOutcome {
    /// Declines with a reason.
    #[must_use]
    pub fn manual(reason: impl Into<String>) -> Self {
        Self::Manual(reason.into())
    }
}

impl From<Result<Fix, FixConflictError>> for FixOutcome {
    fn from(result: Result<Fix, FixConflictError>) -> Self {
        match result {
            Ok(fix) => Self::Proposed(fix),
            Err(e) => Self::Manual(e.to_string()),
        }
    }
}

/// Which rule wins when fixes overlap and priorities tie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixPolicy {
    /// The rule registered earlier wins.
    #[default]
    FirstRegistered,
    /// The rule registered later wins.
    LastRegistered,
}

impl std::str::FromStr for FixPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-registered" => Ok(Self::FirstRegistered),
            "last-registered" => Ok(Self::LastRegistered),
            other => Err(format!("unknown fix policy `{other}`")),
        }
    }
}

/// Hash identifying the exact content a fix was computed against.
#[must_use]
pub fn content_hash(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// Counters from one synthesis pass.
#[derive(Debug, Default)]
pub struct Synthesis {
    /// Fixes rejected in conflict resolution.
    pub rejected: usize,
    /// Fixers that failed.
    pub errors: Vec<EngineError>,
}

/// Synthesizes fixes for `findings` and resolves conflicts between them.
///
/// # Errors
///
/// Returns [`DeadlineExceeded`] if the deadline passes.
pub fn synthesize(
    findings: &mut [Finding],
    rules: &RuleSet,
    ctx: &FileContext<'_>,
    policy: FixPolicy,
    deadline: &Deadline,
) -> Result<Synthesis, DeadlineExceeded> {
    let mut out = Synthesis::default();
    let mut failed = vec![false; rules.len()];
    let fingerprint = content_hash(ctx.source());

    for finding in findings.iter_mut() {
        deadline.check()?;
        let m = &finding.matched;
        let Some(rule) = rules.get(m.rule) else {
            continue;
        };
        let outcome = match &rule.fixer {
            None => None,
            Some(_) if failed[m.rule] => {
                Some(FixOutcome::manual("fixer unavailable after an error"))
            }
            Some(fixer) => match catch_unwind(AssertUnwindSafe(|| run_fixer(fixer, m, ctx))) {
                Ok(outcome) => Some(outcome),
                Err(payload) => {
                    let error = EngineError {
                        rule: rule.name.to_string(),
                        file: ctx.path.to_path_buf(),
                        phase: Phase::Fix,
                        message: panic_message(payload.as_ref()),
                    };
                    warn!("{error}; fixer skipped for the rest of the file");
                    failed[m.rule] = true;
                    out.errors.push(error);
                    Some(FixOutcome::manual("fixer failed"))
                }
            },
        };
        record_outcome(&mut finding.diagnostic, outcome, ctx.source(), fingerprint);
    }

    out.rejected = resolve_conflicts(findings, rules, policy);
    Ok(out)
}

fn run_fixer(fixer: &Fixer, m: &Match, ctx: &FileContext<'_>) -> FixOutcome {
    match fixer {
        Fixer::Custom(f) => f(m, ctx),
        Fixer::Template {
            description,
            edits,
            confidence,
        } => {
            let source = ctx.source();
            let mut rendered = Vec::with_capacity(edits.len());
            for template in edits {
                let (target, edit) = match template {
                    EditTemplate::Replace { target, with } => (*target, Some(*with)),
                    EditTemplate::InsertBefore { target, text }
                    | EditTemplate::InsertAfter { target, text } => (*target, Some(*text)),
                    EditTemplate::Delete { target } => (*target, None),
                };
                let span = if target == "node" {
                    ctx.node(m.node).map(|n| n.span())
                } else {
                    m.captures.span(target)
                };
                let Some(span) = span else {
                    return FixOutcome::manual(format!("capture `{target}` is not bound"));
                };
                let text = edit.map(|t| render(t, &m.captures, source)).unwrap_or_default();
                rendered.push(match template {
                    EditTemplate::Replace { .. } => Edit::replace(source, span, text),
                    EditTemplate::InsertBefore { .. } => Edit::insert(span.start, text),
                    EditTemplate::InsertAfter { .. } => Edit::insert(span.end, text),
                    EditTemplate::Delete { .. } => Edit::delete(source, span),
                });
            }
            Fix::new(render(description, &m.captures, source), *confidence, rendered).into()
        }
    }
}

fn record_outcome(
    diagnostic: &mut Diagnostic,
    outcome: Option<FixOutcome>,
    source: &str,
    fingerprint: u64,
) {
    let next = match outcome {
        Some(FixOutcome::Proposed(fix)) if !fix.edits.is_empty() => match fix.apply(source) {
            Ok(_) => {
                diagnostic.fixes = vec![fix.with_fingerprint(fingerprint)];
                DiagnosticState::FixProposed
            }
            Err(e) => {
                debug!(rule = %diagnostic.rule, "discarding invalid fix: {e}");
                diagnostic.note = Some("manual: generated fix does not apply".to_string());
                DiagnosticState::FixUnavailable
            }
        },
        Some(FixOutcome::Proposed(_)) => DiagnosticState::FixUnavailable,
        Some(FixOutcome::Manual(reason)) => {
            diagnostic.note = Some(format!("manual: {reason}"));
            DiagnosticState::FixUnavailable
        }
        None => DiagnosticState::FixUnavailable,
    };
    if diagnostic.transition(next).is_err() {
        debug!(rule = %diagnostic.rule, state = %diagnostic.state, "fix outcome ignored");
    }
}

/// Pairs `(i, j)`, `i < j`, of spans that overlap.
///
/// Sort-and-sweep over start offsets; insertions count per
/// [`Span::overlaps`].
#[must_use]
pub fn overlapping_pairs(spans: &[Span]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| (spans[i].start, spans[i].end));
    let mut pairs = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            if spans[j].start > spans[i].end {
                break;
            }
            if spans[i].overlaps(spans[j]) {
                pairs.push((i.min(j), i.max(j)));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

fn rank(rule_index: usize, rule: &Rule, policy: FixPolicy) -> (Reverse<i32>, isize) {
    let order = isize::try_from(rule_index).unwrap_or(isize::MAX);
    let order = match policy {
        FixPolicy::FirstRegistered => order,
        FixPolicy::LastRegistered => -order,
    };
    (Reverse(rule.priority.unwrap_or(0)), order)
}

/// Rejects proposed fixes that overlap a higher-ranked one. Returns the
/// number rejected.
fn resolve_conflicts(findings: &mut [Finding], rules: &RuleSet, policy: FixPolicy) -> usize {
    let candidates: Vec<(usize, Span)> = findings
        .iter()
        .enumerate()
        .filter_map(|(i, f)| Some((i, f.diagnostic.proposed_fix()?.span()?)))
        .collect();
    let spans: Vec<Span> = candidates.iter().map(|(_, s)| *s).collect();
    let pairs = overlapping_pairs(&spans);
    if pairs.is_empty() {
        return 0;
    }

    let mut conflicts = vec![Vec::new(); candidates.len()];
    for (a, b) in pairs {
        conflicts[a].push(b);
        conflicts[b].push(a);
    }

    let mut by_rank: Vec<usize> = (0..candidates.len()).collect();
    by_rank.sort_by_key(|&c| {
        let m = &findings[candidates[c].0].matched;
        let key = rules
            .get(m.rule)
            .map_or((Reverse(i32::MIN), isize::MAX), |r| rank(m.rule, r, policy));
        (key, m.span.start)
    });

    let mut accepted = vec![false; candidates.len()];
    let mut rejected = 0;
    for c in by_rank {
        let winner = conflicts[c].iter().copied().find(|&o| accepted[o]);
        match winner {
            None => accepted[c] = true,
            Some(w) => {
                let winner_rule = findings[candidates[w].0].diagnostic.rule.clone();
                let diagnostic = &mut findings[candidates[c].0].diagnostic;
                if diagnostic.transition(DiagnosticState::Rejected).is_ok() {
                    info!(
                        rule = %diagnostic.rule,
                        winner = %winner_rule,
                        "fix rejected: overlaps a higher-ranked fix"
                    );
                    diagnostic.fixes.clear();
                    diagnostic.note =
                        Some(format!("manual: conflicts with fix from `{winner_rule}`"));
                    rejected += 1;
                }
            }
        }
    }
    rejected
}

/// Applies edits to `source` in one pass.
///
/// # Errors
///
/// Fails on overlapping or out-of-bounds edits, or when the text under an
/// edit differs from the text it was synthesized against.
pub fn apply_edits<'e>(
    source: &str,
    edits: impl IntoIterator<Item = &'e Edit>,
) -> Result<String, FixConflictError> {
    let mut edits: Vec<&Edit> = edits.into_iter().collect();
    edits.sort_by_key(|e| (e.span.start, e.span.end));

    for w in edits.windows(2) {
        if w[0].span.overlaps(w[1].span) {
            return Err(FixConflictError::Overlap {
                first: w[0].span,
                second: w[1].span,
            });
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        let span = edit.span;
        let Some(found) = source.get(span.start..span.end) else {
            return Err(FixConflictError::OutOfBounds {
                span,
                len: source.len(),
            });
        };
        if found != edit.original {
            return Err(FixConflictError::SourceDrift {
                span,
                expected: edit.original.clone(),
                found: found.to_string(),
            });
        }
        out.push_str(&source[cursor..span.start]);
        out.push_str(&edit.replacement);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// Applies every proposed fix in `diagnostics` to `source`.
///
/// # Errors
///
/// Returns [`FixConflictError::SourceDrift`] when `source` is not the
/// content the fixes were computed against, and any error of
/// [`apply_edits`].
pub fn apply_fixes_to_source(
    source: &str,
    diagnostics: &[Diagnostic],
) -> Result<String, FixConflictError> {
    let fixes: Vec<&Fix> = diagnostics
        .iter()
        .filter_map(Diagnostic::proposed_fix)
        .collect();
    let current = content_hash(source);
    if let Some(stale) = fixes
        .iter()
        .find(|f| f.fingerprint != 0 && f.fingerprint != current)
    {
        return Err(FixConflictError::SourceDrift {
            span: stale.span().unwrap_or(Span::empty(0)),
            expected: format!("content hash {:016x}", stale.fingerprint),
            found: format!("content hash {current:016x}"),
        });
    }
    apply_edits(source, fixes.iter().flat_map(|f| f.edits.iter()))
}

/// Applies proposed fixes to the file at `path`, all or nothing.
///
/// On success the file is replaced and every applied diagnostic moves to
/// `Applied`. On failure the file is untouched; when the file changed since
/// analysis, proposed fixes move to `Rejected`.
///
/// # Errors
///
/// Returns a [`FixConflictError`] on drift, overlap or I/O failure.
pub fn apply_fixes(
    path: &Path,
    diagnostics: &mut [Diagnostic],
) -> Result<String, FixConflictError> {
    let io = |source| FixConflictError::Io {
        path: path.to_path_buf(),
        source,
    };
    let source = std::fs::read_to_string(path).map_err(io)?;

    let fixed = match apply_fixes_to_source(&source, diagnostics) {
        Ok(fixed) => fixed,
        Err(e) => {
            if matches!(e, FixConflictError::SourceDrift { .. }) {
                for d in diagnostics.iter_mut() {
                    if d.transition(DiagnosticState::Rejected).is_ok() {
                        d.note = Some("manual: source changed since analysis".to_string());
                    }
                }
            }
            warn!(file = %path.display(), "fixes not applied: {e}");
            return Err(e);
        }
    };

    if fixed != source {
        write_replacing(path, &fixed).map_err(io)?;
    }
    let mut applied = 0;
    for d in diagnostics.iter_mut() {
        if d.transition(DiagnosticState::Applied).is_ok() {
            applied += 1;
        }
    }
    debug!(file = %path.display(), applied, "fixes applied");
    Ok(fixed)
}

/// Writes `content` to a fresh temp file beside `path`, then renames it over
/// `path`. The original permissions carry over.
fn write_replacing(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
