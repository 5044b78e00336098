//! Configuration types for typesmith.

use crate::engine::AnalyzeOptions;
use crate::fix::FixPolicy;
use crate::rule::RuleFilter;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration, usually read from `typesmith.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Preset to start from ("recommended" or "minimal").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Rule selection.
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Rule filter from the `[rules]` table.
    #[must_use]
    pub fn rule_filter(&self) -> RuleFilter {
        RuleFilter {
            allow: self.rules.allow.clone(),
            deny: self.rules.deny.clone(),
        }
    }

    /// Engine options from the `[analyzer]` and `[rules]` tables.
    #[must_use]
    pub fn analyze_options(&self) -> AnalyzeOptions {
        let a = &self.analyzer;
        let mut options = AnalyzeOptions::new()
            .rule_filter(self.rule_filter())
            .min_severity(a.min_severity)
            .type_info(a.type_info)
            .jobs(a.jobs)
            .fix_policy(a.fix_policy);
        if let Some(ms) = a.timeout_ms.filter(|&ms| ms > 0) {
            options = options.timeout(Duration::from_millis(ms));
        }
        options
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files during discovery.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Worker threads; 0 means one per CPU.
    #[serde(default)]
    pub jobs: usize,

    /// Per-file time limit in milliseconds; absent or 0 disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,

    /// Whether rules needing type information run.
    #[serde(default = "default_true")]
    pub type_info: bool,

    /// Lowest severity reported.
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,

    /// Winner selection for overlapping fixes.
    #[serde(default)]
    pub fix_policy: FixPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            respect_gitignore: true,
            jobs: 0,
            timeout_ms: default_timeout_ms(),
            type_info: true,
            min_severity: default_min_severity(),
            fix_policy: FixPolicy::default(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

#[allow(clippy::unnecessary_wraps)]
fn default_timeout_ms() -> Option<u64> {
    Some(5000)
}

fn default_min_severity() -> Severity {
    Severity::Suggestion
}

fn default_true() -> bool {
    true
}

/// Rule selection by name or code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rules to run; empty runs all.
    #[serde(default)]
    pub allow: Vec<String>,

    /// Rules never to run.
    #[serde(default)]
    pub deny: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.analyzer.type_info);
        assert_eq!(config.analyzer.timeout_ms, Some(5000));
        assert!(config.rule_filter().is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
exclude = ["**/generated/**"]
jobs = 4
timeout_ms = 250
type_info = false
min_severity = "warning"
fix_policy = "last-registered"

[rules]
deny = ["prefer-branded-primitive", "TY014"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.exclude, ["**/generated/**"]);
        let options = config.analyze_options();
        assert_eq!(options.jobs, 4);
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
        assert!(!options.type_info);
        assert_eq!(options.min_severity, Severity::Warning);
        assert_eq!(options.fix_policy, FixPolicy::LastRegistered);
        assert_eq!(options.rule_filter.deny.len(), 2);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = Config::parse("[analyzer]\ntimeout_ms = 0\n").expect("parse");
        assert_eq!(config.analyze_options().timeout, None);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::parse("[analyzer]\nmin_severity = \"error\"\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config::default();
        let text = config.to_toml().expect("serialize");
        assert_eq!(Config::parse(&text).expect("parse"), config);
    }
}
