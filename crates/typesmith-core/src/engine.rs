//! Engine: runs the per-file pipeline over a batch on a worker pool.
//!
//! Each worker takes one file end to end: read, parse, scope pass, match,
//! disambiguate, aggregate, synthesize fixes. Workers share only the
//! read-only rule set, the parsers, the oracle and the cancellation token.
//! Results come back in input order regardless of scheduling.

use crate::aggregate::aggregate;
use crate::context::FileContext;
use crate::disambiguate::disambiguate;
use crate::error::{AnalyzerError, ParseError};
use crate::fix::{synthesize, FixPolicy};
use crate::matcher::{find_matches, panic_message};
use crate::parser::{SourceParser, TypeOracle};
use crate::rule::{RuleFilter, RuleSet};
use crate::types::{BatchReport, FileOutcome, FileReport, Severity};
use rayon::prelude::*;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-file time limit, checked between rules and pipeline phases.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
    limit_ms: u64,
}

impl Deadline {
    /// No limit.
    #[must_use]
    pub fn none() -> Self {
        Self {
            at: None,
            limit_ms: 0,
        }
    }

    /// Expires `limit` from now.
    #[must_use]
    pub fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(limit),
            limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Starts a deadline from an optional limit.
    #[must_use]
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or_else(Self::none, Self::after)
    }

    /// Fails once the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineExceeded`] when expired.
    pub fn check(&self) -> Result<(), DeadlineExceeded> {
        match self.at {
            Some(at) if Instant::now() >= at => Err(DeadlineExceeded {
                limit_ms: self.limit_ms,
            }),
            _ => Ok(()),
        }
    }
}

/// The per-file deadline expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("analysis exceeded {limit_ms} ms")]
pub struct DeadlineExceeded {
    /// Configured limit.
    pub limit_ms: u64,
}

/// Cooperative cancellation shared with a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Files already started finish normally.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Allow/deny selection of rules.
    pub rule_filter: RuleFilter,
    /// Diagnostics below this severity are dropped.
    pub min_severity: Severity,
    /// Whether to consult the type oracle.
    pub type_info: bool,
    /// Worker threads; `0` means one per CPU.
    pub jobs: usize,
    /// Per-file time limit.
    pub timeout: Option<Duration>,
    /// Winner selection for overlapping fixes.
    pub fix_policy: FixPolicy,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            rule_filter: RuleFilter::default(),
            min_severity: Severity::Suggestion,
            type_info: true,
            jobs: 0,
            timeout: None,
            fix_policy: FixPolicy::default(),
        }
    }
}

impl AnalyzeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule filter.
    #[must_use]
    pub fn rule_filter(mut self, filter: RuleFilter) -> Self {
        self.rule_filter = filter;
        self
    }

    /// Sets the minimum severity.
    #[must_use]
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Enables or disables type information.
    #[must_use]
    pub fn type_info(mut self, enabled: bool) -> Self {
        self.type_info = enabled;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the per-file timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the fix conflict policy.
    #[must_use]
    pub fn fix_policy(mut self, policy: FixPolicy) -> Self {
        self.fix_policy = policy;
        self
    }
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Option<Arc<RuleSet>>,
    parsers: Vec<Arc<dyn SourceParser>>,
    oracle: Option<Arc<dyn TypeOracle>>,
    cancel: CancellationToken,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule set.
    #[must_use]
    pub fn rules(mut self, rules: Arc<RuleSet>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Registers a parser.
    #[must_use]
    pub fn parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Registers several parsers.
    #[must_use]
    pub fn parsers<I>(mut self, parsers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SourceParser>>,
    {
        self.parsers.extend(parsers);
        self
    }

    /// Sets the type oracle.
    #[must_use]
    pub fn oracle(mut self, oracle: Arc<dyn TypeOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Shares a cancellation token with the caller.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NoParser`] if no parser was registered.
    pub fn build(self) -> Result<Engine, AnalyzerError> {
        if self.parsers.is_empty() {
            return Err(AnalyzerError::NoParser);
        }
        let rules = match self.rules {
            Some(rules) => rules,
            None => Arc::new(RuleSet::new(Vec::new())?),
        };
        Ok(Engine {
            rules,
            parsers: self.parsers,
            oracle: self.oracle,
            cancel: self.cancel,
        })
    }
}

/// The analysis engine.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    rules: Arc<RuleSet>,
    parsers: Vec<Arc<dyn SourceParser>>,
    oracle: Option<Arc<dyn TypeOracle>>,
    cancel: CancellationToken,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The full rule set.
    #[must_use]
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Token that cancels running and future batches.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Parser for `path`, preferring the longest matching extension.
    #[must_use]
    pub fn parser_for(&self, path: &Path) -> Option<&dyn SourceParser> {
        self.parsers
            .iter()
            .filter(|p| p.handles(path))
            .max_by_key(|p| {
                p.extensions()
                    .iter()
                    .filter(|ext| {
                        path.to_string_lossy()
                            .ends_with(&format!(".{ext}"))
                    })
                    .map(|ext| ext.len())
                    .max()
            })
            .map(|p| &**p)
    }

    /// Returns true if some parser accepts `path`.
    #[must_use]
    pub fn handles(&self, path: &Path) -> bool {
        self.parsers.iter().any(|p| p.handles(path))
    }

    fn active_rules(&self, filter: &RuleFilter) -> Result<Arc<RuleSet>, AnalyzerError> {
        if filter.is_empty() {
            Ok(Arc::clone(&self.rules))
        } else {
            Ok(Arc::new(self.rules.filter(filter)?))
        }
    }

    /// Analyzes a batch of files.
    ///
    /// Per-file failures are reported in the batch, never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the rule filter names unknown rules.
    pub fn analyze(
        &self,
        paths: &[PathBuf],
        options: &AnalyzeOptions,
    ) -> Result<BatchReport, AnalyzerError> {
        let rules = self.active_rules(&options.rule_filter)?;
        let started = Instant::now();
        info!(
            "Analyzing {} file(s) with {} rule(s)",
            paths.len(),
            rules.len()
        );

        let run = |path: &PathBuf| self.analyze_path(path, &rules, options);
        let files: Vec<FileReport> = match rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| paths.par_iter().with_max_len(1).map(run).collect()),
            Err(e) => {
                warn!("worker pool unavailable ({e}); analyzing sequentially");
                paths.iter().map(run).collect()
            }
        };

        let report = BatchReport::from_files(files);
        info!(
            "Analysis complete: {} warning(s), {} suggestion(s) in {} file(s) ({} ms)",
            report.summary.warnings,
            report.summary.suggestions,
            report.summary.files,
            started.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Analyzes one in-memory source.
    ///
    /// # Errors
    ///
    /// Returns an error only if the rule filter names unknown rules.
    pub fn analyze_source(
        &self,
        path: &Path,
        source: &str,
        options: &AnalyzeOptions,
    ) -> Result<FileReport, AnalyzerError> {
        let rules = self.active_rules(&options.rule_filter)?;
        let deadline = Deadline::from_timeout(options.timeout);
        Ok(self.run_pipeline(path, source, &rules, options, &deadline))
    }

    fn analyze_path(&self, path: &Path, rules: &RuleSet, options: &AnalyzeOptions) -> FileReport {
        if self.cancel.is_cancelled() {
            return FileReport::new(path, FileOutcome::Cancelled);
        }
        let deadline = Deadline::from_timeout(options.timeout);
        debug!("Analyzing: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(source) => self.run_pipeline(path, &source, rules, options, &deadline),
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                FileReport::new(
                    path,
                    FileOutcome::Io {
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    fn parse(&self, path: &Path, source: &str) -> Result<crate::tree::SyntaxTree, ParseError> {
        let parser = self.parser_for(path).ok_or_else(|| {
            ParseError::new(format!("no parser registered for {}", path.display()))
        })?;
        catch_unwind(AssertUnwindSafe(|| parser.parse(path, source))).unwrap_or_else(|payload| {
            Err(ParseError::new(format!(
                "parser panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }

    fn run_pipeline(
        &self,
        path: &Path,
        source: &str,
        rules: &RuleSet,
        options: &AnalyzeOptions,
        deadline: &Deadline,
    ) -> FileReport {
        let tree = match self.parse(path, source) {
            Ok(tree) => tree,
            Err(error) => {
                warn!("Failed to parse {}: {error}", path.display());
                return FileReport::new(path, FileOutcome::ParseFailed { error });
            }
        };

        let oracle = if options.type_info {
            self.oracle.as_deref()
        } else {
            None
        };
        let ctx = FileContext::new(path, &tree).with_oracle(oracle);
        let mut report = FileReport::new(path, FileOutcome::Analyzed);

        let result = (|| -> Result<(), DeadlineExceeded> {
            let raw = find_matches(rules, &ctx, deadline)?;
            report.engine_errors.extend(raw.errors);

            let confirmed = disambiguate(raw.matches, rules, &ctx, deadline)?;
            report.engine_errors.extend(confirmed.errors);
            report.stats.suppressed = confirmed.suppressed;
            report.stats.unconfirmed = confirmed.unconfirmed;

            deadline.check()?;
            let mut findings = aggregate(confirmed.confirmed, rules, &ctx, options.min_severity);

            let synthesis = synthesize(&mut findings, rules, &ctx, options.fix_policy, deadline)?;
            report.engine_errors.extend(synthesis.errors);
            report.stats.rejected_fixes = synthesis.rejected;

            report.diagnostics = findings.into_iter().map(|f| f.diagnostic).collect();
            Ok(())
        })();

        let failed_rules: HashSet<&str> =
            report.engine_errors.iter().map(|e| e.rule.as_str()).collect();
        report.stats.skipped_rules = failed_rules.len();

        if let Err(exceeded) = result {
            warn!("Timed out analyzing {}: {exceeded}", path.display());
            report.outcome = FileOutcome::TimedOut {
                limit_ms: exceeded.limit_ms,
            };
            report.diagnostics.clear();
        }
        debug!(
            file = %path.display(),
            diagnostics = report.diagnostics.len(),
            "file complete"
        );
        report
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.rules.len())
            .field(
                "parsers",
                &self.parsers.iter().map(|p| p.language_id()).collect::<Vec<_>>(),
            )
            .field("type_oracle", &self.oracle.is_some())
            .finish_non_exhaustive()
    }
}
