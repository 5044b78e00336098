//! # typesmith-core
//!
//! Rule engine for type-system anti-patterns in TypeScript sources.
//!
//! The pipeline for one file is:
//!
//! - a [`SourceParser`] builds a [`SyntaxTree`];
//! - a scope pass builds the [`ScopeIndex`];
//! - the [matcher](matcher) evaluates every [`Rule`] against every node;
//! - the [disambiguator](disambiguate) confirms or suppresses matches;
//! - the [aggregator](aggregate) orders and deduplicates diagnostics;
//! - the [fix synthesizer](fix) proposes non-overlapping rewrites.
//!
//! [`Engine`] runs this pipeline over a batch of files on a worker pool.
//!
//! ## Example
//!
//! ```ignore
//! use typesmith_core::{AnalyzeOptions, Engine};
//!
//! let engine = Engine::builder()
//!     .rules(rules)
//!     .parser(parser)
//!     .build()?;
//!
//! let report = engine.analyze(&paths, &AnalyzeOptions::new())?;
//! for diagnostic in report.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
mod config;
mod context;
pub mod disambiguate;
mod engine;
mod error;
pub mod fix;
pub mod matcher;
mod parser;
pub mod pattern;
mod rule;
pub mod scope;
pub mod span;
pub mod tree;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use config::{AnalyzerConfig, Config, ConfigError, RulesConfig};
pub use context::FileContext;
pub use disambiguate::Verdict;
pub use engine::{
    AnalyzeOptions, CancellationToken, Deadline, DeadlineExceeded, Engine, EngineBuilder,
};
pub use error::{AnalyzerError, EngineError, FixConflictError, ParseError, Phase, RuleSetError};
pub use fix::{apply_fixes, apply_fixes_to_source, FixOutcome, FixPolicy};
pub use matcher::Match;
pub use parser::{SourceParser, TypeInfo, TypeOracle};
pub use pattern::{Captures, Pattern, Quantifier};
pub use rule::{
    ConfirmFn, EditTemplate, FixFn, Fixer, MatchFn, Matcher, Rule, RuleFilter, RuleSet,
};
pub use scope::ScopeIndex;
pub use span::{LineIndex, Span};
pub use tree::{Node, NodeId, SyntaxTree, TreeBuilder, TreeError};
pub use types::{
    BatchReport, BatchSummary, Confidence, Diagnostic, DiagnosticReport, DiagnosticState, Edit,
    FileOutcome, FileReport, FileStats, Fix, Location, Severity, TransitionError,
};
pub use utils::allowance::{AllowCheck, AllowIndex};
