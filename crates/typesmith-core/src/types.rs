//! Core types for diagnostics, fixes and batch results.

use crate::error::{EngineError, FixConflictError, ParseError};
use crate::span::Span;
use miette::{LabeledSpan, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity tier of a rule.
///
/// Warnings flag anti-patterns with runtime or type-safety pitfalls;
/// suggestions flag stylistic or inference preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic or inference preference.
    Suggestion,
    /// Anti-pattern with a real pitfall.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suggestion => write!(f, "suggestion"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "suggestion" => Ok(Self::Suggestion),
            "warning" => Ok(Self::Warning),
            other => Err(format!(
                "unknown severity `{other}` (expected `warning` or `suggestion`)"
            )),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path as given to the engine.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// Byte offset in file.
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// How sure a fixer is that its rewrite preserves meaning.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Plausible, review before applying.
    Low,
    /// Usually correct.
    Medium,
    /// Mechanical rewrite.
    #[default]
    High,
}

/// One text replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Byte range to replace; empty for insertions.
    pub span: Span,
    /// Replacement text.
    pub replacement: String,
    /// Text under `span` when the edit was synthesized.
    pub original: String,
}

impl Edit {
    /// Replaces `span` of `source` with `replacement`.
    #[must_use]
    pub fn replace(source: &str, span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            original: source.get(span.start..span.end).unwrap_or("").to_string(),
        }
    }

    /// Inserts `text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::empty(offset),
            replacement: text.into(),
            original: String::new(),
        }
    }

    /// Deletes `span` of `source`.
    #[must_use]
    pub fn delete(source: &str, span: Span) -> Self {
        Self::replace(source, span, "")
    }
}

/// A candidate rewrite: non-overlapping edits applied together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// What the fix does.
    pub description: String,
    /// Confidence of the fixer.
    pub confidence: Confidence,
    /// Edits sorted by span.
    pub edits: Vec<Edit>,
    /// Hash of the source the edits were computed against.
    #[serde(default)]
    pub fingerprint: u64,
}

impl Fix {
    /// Creates a fix, sorting its edits.
    ///
    /// # Errors
    ///
    /// Returns [`FixConflictError::Overlap`] if two edits overlap.
    pub fn new(
        description: impl Into<String>,
        confidence: Confidence,
        mut edits: Vec<Edit>,
    ) -> Result<Self, FixConflictError> {
        edits.sort_by_key(|e| (e.span.start, e.span.end));
        if let Some(w) = edits.windows(2).find(|w| w[0].span.overlaps(w[1].span)) {
            return Err(FixConflictError::Overlap {
                first: w[0].span,
                second: w[1].span,
            });
        }
        Ok(Self {
            description: description.into(),
            confidence,
            edits,
            fingerprint: 0,
        })
    }

    /// Records the hash of the analyzed source.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Smallest span covering every edit, `None` for an empty fix.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        let first = self.edits.first()?.span;
        Some(self.edits.iter().fold(first, |acc, e| acc.cover(e.span)))
    }

    /// Applies the edits to `source` without side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if an edit is out of bounds or its original text no
    /// longer matches.
    pub fn apply(&self, source: &str) -> Result<String, FixConflictError> {
        crate::fix::apply_edits(source, self.edits.iter())
    }
}

/// Lifecycle state of a diagnostic.
///
/// ```text
/// Matched -> Suppressed
/// Matched -> Diagnosed -> FixProposed -> Applied | Rejected
///                      -> FixUnavailable
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticState {
    /// Raw match, not yet disambiguated.
    Matched,
    /// Dropped by disambiguation or an allow directive. Terminal.
    Suppressed,
    /// Confirmed and reported.
    Diagnosed,
    /// A fix is available.
    FixProposed,
    /// No automatic fix; manual change needed. Terminal.
    FixUnavailable,
    /// The fix was written to disk. Terminal.
    Applied,
    /// The fix lost a conflict or the source drifted. Terminal.
    Rejected,
}

impl DiagnosticState {
    /// Returns true if `next` is a legal successor.
    #[must_use]
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Matched, Self::Suppressed | Self::Diagnosed)
                | (Self::Diagnosed, Self::FixProposed | Self::FixUnavailable)
                | (Self::FixProposed, Self::Applied | Self::Rejected)
        )
    }

    /// Returns true for states with no successor.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Suppressed | Self::FixUnavailable | Self::Applied | Self::Rejected
        )
    }
}

impl fmt::Display for DiagnosticState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Matched => "matched",
            Self::Suppressed => "suppressed",
            Self::Diagnosed => "diagnosed",
            Self::FixProposed => "fix-proposed",
            Self::FixUnavailable => "fix-unavailable",
            Self::Applied => "applied",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A refused state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal diagnostic transition {from} -> {to}")]
pub struct TransitionError {
    /// Current state.
    pub from: DiagnosticState,
    /// Requested state.
    pub to: DiagnosticState,
}

/// A reported finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule code (e.g. "TY001").
    pub code: String,
    /// Rule name (e.g. "prefer-union-over-enum").
    pub rule: String,
    /// Severity tier.
    pub severity: Severity,
    /// Human-readable location.
    pub location: Location,
    /// Byte span of the offending node.
    pub span: Span,
    /// Rendered message.
    pub message: String,
    /// Optional rendered help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Candidate fixes, highest confidence first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<Fix>,
    /// Lifecycle state.
    pub state: DiagnosticState,
    /// Why no fix is offered, or why it was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic in the `Matched` state.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            span,
            message: message.into(),
            help: None,
            fixes: Vec::new(),
            state: DiagnosticState::Matched,
            note: None,
        }
    }

    /// Adds help text.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Refuses transitions not allowed by the lifecycle.
    pub fn transition(&mut self, next: DiagnosticState) -> Result<(), TransitionError> {
        if self.state.can_transition(next) {
            self.state = next;
            Ok(())
        } else {
            Err(TransitionError {
                from: self.state,
                to: next,
            })
        }
    }

    /// The preferred fix, if one is proposed.
    #[must_use]
    pub fn proposed_fix(&self) -> Option<&Fix> {
        if self.state == DiagnosticState::FixProposed {
            self.fixes.first()
        } else {
            None
        }
    }

    /// Formats the diagnostic as a single `file:line:col` line.
    #[must_use]
    pub fn format_compact(&self) -> String {
        format!(
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_compact())?;
        if let Some(help) = &self.help {
            write!(f, " (help: {help})")?;
        }
        Ok(())
    }
}

/// A diagnostic bundled with its source for rich terminal rendering.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DiagnosticReport {
    code: String,
    message: String,
    help: Option<String>,
    severity: Severity,
    label: String,
    span: SourceSpan,
    src: NamedSource<String>,
}

impl DiagnosticReport {
    /// Builds a report from a diagnostic and the file content it refers to.
    #[must_use]
    pub fn new(diagnostic: &Diagnostic, source: &str) -> Self {
        let label = match &diagnostic.note {
            Some(note) => format!("{} ({note})", diagnostic.rule),
            None => diagnostic.rule.clone(),
        };
        Self {
            code: diagnostic.code.clone(),
            message: diagnostic.message.clone(),
            help: diagnostic.help.clone(),
            severity: diagnostic.severity,
            label,
            span: SourceSpan::from((diagnostic.span.start, diagnostic.span.len())),
            src: NamedSource::new(
                diagnostic.location.file.display().to_string(),
                source.to_string(),
            ),
        }
    }
}

impl miette::Diagnostic for DiagnosticReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Warning => miette::Severity::Warning,
            Severity::Suggestion => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

/// How far the pipeline got for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileOutcome {
    /// The file was analyzed; see the report's diagnostics.
    Analyzed,
    /// The parser rejected the file.
    ParseFailed {
        /// Parser error.
        error: ParseError,
    },
    /// The per-file deadline expired.
    TimedOut {
        /// Configured limit in milliseconds.
        limit_ms: u64,
    },
    /// The batch was cancelled before this file started.
    Cancelled,
    /// The file could not be read.
    Io {
        /// Error text.
        message: String,
    },
}

impl FileOutcome {
    /// Returns true for outcomes that count as failures.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed { .. } | Self::TimedOut { .. } | Self::Io { .. }
        )
    }
}

/// Per-file counters that do not surface as diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Matches dropped by disambiguation or allow directives.
    pub suppressed: usize,
    /// Matches needing type information that could not be confirmed.
    pub unconfirmed: usize,
    /// Fixes dropped in conflict resolution.
    pub rejected_fixes: usize,
    /// Rules skipped after an engine error.
    pub skipped_rules: usize,
}

/// Result for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Input path.
    pub path: PathBuf,
    /// Pipeline outcome.
    #[serde(flatten)]
    pub outcome: FileOutcome,
    /// Ordered diagnostics.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Rule failures isolated during analysis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub engine_errors: Vec<EngineError>,
    /// Non-diagnostic counters.
    #[serde(default)]
    pub stats: FileStats,
}

impl FileReport {
    /// Creates a report with no diagnostics.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, outcome: FileOutcome) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            outcome,
            diagnostics: Vec::new(),
            engine_errors: Vec::new(),
            stats: FileStats::default(),
        }
    }

    /// Returns true if any diagnostic is a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }
}

/// Batch-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Input files.
    pub files: usize,
    /// Files analyzed to completion.
    pub analyzed: usize,
    /// Files the parser rejected.
    pub parse_errors: usize,
    /// Files that could not be read.
    pub io_errors: usize,
    /// Files that hit the deadline.
    pub timed_out: usize,
    /// Files not started because of cancellation.
    pub cancelled: usize,
    /// Warning diagnostics.
    pub warnings: usize,
    /// Suggestion diagnostics.
    pub suggestions: usize,
    /// Diagnostics with a proposed fix.
    pub fixable: usize,
    /// Suppressed matches.
    pub suppressed: usize,
    /// Unconfirmed matches.
    pub unconfirmed: usize,
    /// Fixes rejected in conflict resolution.
    pub rejected_fixes: usize,
    /// Rule skips after engine errors.
    pub skipped_rules: usize,
}

impl BatchSummary {
    /// Folds one file's results into the summary.
    pub fn record(&mut self, report: &FileReport) {
        self.files += 1;
        match &report.outcome {
            FileOutcome::Analyzed => self.analyzed += 1,
            FileOutcome::ParseFailed { .. } => self.parse_errors += 1,
            FileOutcome::TimedOut { .. } => self.timed_out += 1,
            FileOutcome::Cancelled => self.cancelled += 1,
            FileOutcome::Io { .. } => self.io_errors += 1,
        }
        for d in &report.diagnostics {
            match d.severity {
                Severity::Warning => self.warnings += 1,
                Severity::Suggestion => self.suggestions += 1,
            }
            if d.state == DiagnosticState::FixProposed {
                self.fixable += 1;
            }
        }
        self.suppressed += report.stats.suppressed;
        self.unconfirmed += report.stats.unconfirmed;
        self.rejected_fixes += report.stats.rejected_fixes;
        self.skipped_rules += report.stats.skipped_rules;
    }
}

/// Result of [`crate::Engine::analyze`]: per-file reports in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per input path, in input order.
    pub files: Vec<FileReport>,
    /// Aggregate counters.
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Builds a report and its summary.
    #[must_use]
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let mut summary = BatchSummary::default();
        for f in &files {
            summary.record(f);
        }
        Self { files, summary }
    }

    /// All diagnostics in file order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| f.diagnostics.iter())
    }

    /// Returns true if a warning remains unresolved.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.diagnostics().any(|d| {
            d.severity == Severity::Warning && d.state != DiagnosticState::Applied
        })
    }

    /// Returns true if any file failed or any rule crashed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.outcome.is_failure() || !f.engine_errors.is_empty())
    }
}
