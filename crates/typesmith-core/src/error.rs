//! Error taxonomy.
//!
//! - [`ParseError`]: one file failed to parse; isolated to that file.
//! - [`EngineError`]: a rule's matcher, confirm or fixer function failed;
//!   the rule is skipped for the rest of that file.
//! - [`FixConflictError`]: a file's combined edit set is inconsistent; the
//!   whole file's fix application is aborted and the file left untouched.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The parser could not produce a usable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Line of the first error (1-indexed, 0 if unknown).
    pub line: usize,
    /// Column of the first error (1-indexed, 0 if unknown).
    pub column: usize,
}

impl ParseError {
    /// Creates a parse error without a position.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Attaches a position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl From<crate::tree::TreeError> for ParseError {
    fn from(e: crate::tree::TreeError) -> Self {
        Self::new(format!("malformed syntax tree: {e}"))
    }
}

/// Pipeline phase in which a rule function failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Matcher predicate.
    Match,
    /// Disambiguation (confirm) function.
    Confirm,
    /// Fixer function.
    Fix,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Confirm => write!(f, "confirm"),
            Self::Fix => write!(f, "fix"),
        }
    }
}

/// A rule function failed internally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("rule `{rule}` failed during {phase} in {}: {message}", file.display())]
pub struct EngineError {
    /// Rule name.
    pub rule: String,
    /// File being analyzed.
    pub file: PathBuf,
    /// Phase that failed.
    pub phase: Phase,
    /// Panic payload or error text.
    pub message: String,
}

/// The edit set for a file cannot be applied.
#[derive(Debug, thiserror::Error)]
pub enum FixConflictError {
    /// Two edits overlap.
    #[error("overlapping edits at {first} and {second}")]
    Overlap {
        /// First edit span.
        first: Span,
        /// Second edit span.
        second: Span,
    },

    /// The text under an edit no longer matches what was analyzed.
    #[error("source changed since analysis at {span}: expected {expected:?}, found {found:?}")]
    SourceDrift {
        /// Edit span.
        span: Span,
        /// Text seen at match time.
        expected: String,
        /// Text found now.
        found: String,
    },

    /// An edit lies outside the file.
    #[error("edit {span} is outside the source ({len} bytes)")]
    OutOfBounds {
        /// Edit span.
        span: Span,
        /// Source length.
        len: usize,
    },

    /// Reading or writing the file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Errors building a [`crate::RuleSet`] or filtering it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    /// Two rules share a name or code.
    #[error("duplicate rule identifier `{0}`")]
    Duplicate(String),

    /// A name is not kebab-case.
    #[error("invalid rule name `{0}`: expected kebab-case")]
    InvalidName(String),

    /// A code is not of the form `TY123`.
    #[error("invalid rule code `{0}`: expected two uppercase letters and three digits")]
    InvalidCode(String),

    /// A filter or migration names a rule that does not exist.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),
}

/// Errors constructing an [`crate::Engine`].
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// No parser was registered.
    #[error("no source parser registered")]
    NoParser,

    /// Rule filtering failed.
    #[error(transparent)]
    RuleSet(#[from] RuleSetError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_names_rule_and_file() {
        let e = EngineError {
            rule: "no-explicit-any".into(),
            file: PathBuf::from("src/a.ts"),
            phase: Phase::Fix,
            message: "boom".into(),
        };
        assert_eq!(
            e.to_string(),
            "rule `no-explicit-any` failed during fix in src/a.ts: boom"
        );
    }

    #[test]
    fn parse_error_display() {
        let e = ParseError::new("unexpected token").at(3, 7);
        assert_eq!(e.to_string(), "3:7: unexpected token");
    }
}
