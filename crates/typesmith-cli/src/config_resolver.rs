//! Configuration file resolution with global fallback.
//!
//! Resolution order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/typesmith.toml` or `.typesmith.toml`
//! 3. `~/.typesmith/config.toml` (global fallback)
//! 4. No config found → defaults

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use typesmith_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration, or returns defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["typesmith.toml", ".typesmith.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.is_file() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Global config directory: `$TYPESMITH_CONFIG_DIR`, else `~/.typesmith/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("TYPESMITH_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".typesmith"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn explicit_takes_priority_over_project() {
        let dir = tmp();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "").expect("write");
        fs::write(dir.path().join("typesmith.toml"), "").expect("write");

        let result = resolve_inner(dir.path(), Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn explicit_missing_file_fails_to_load() {
        let source = resolve_inner(Path::new("."), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(source.path(), Some(Path::new("/nonexistent.toml")));
        assert!(source.load().is_err());
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let dir = tmp();
        fs::write(dir.path().join("typesmith.toml"), "").expect("write");
        fs::write(dir.path().join(".typesmith.toml"), "").expect("write");

        let result = resolve_inner(dir.path(), None, None);
        assert_eq!(result, ConfigSource::Project(dir.path().join("typesmith.toml")));
    }

    #[test]
    fn dot_prefixed_project_config_found() {
        let dir = tmp();
        fs::write(dir.path().join(".typesmith.toml"), "").expect("write");

        let result = resolve_inner(dir.path(), None, None);
        assert_eq!(result, ConfigSource::Project(dir.path().join(".typesmith.toml")));
    }

    #[test]
    fn global_fallback_when_no_project_config() {
        let project = tmp();
        let global = tmp();
        fs::write(
            global.path().join("config.toml"),
            "[analyzer]\nmin_severity = \"warning\"\n",
        )
        .expect("write");

        let source = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(source, ConfigSource::Global(global.path().join("config.toml")));
        let config = source.load().expect("load");
        assert_eq!(
            config.analyzer.min_severity,
            typesmith_core::Severity::Warning
        );
    }

    #[test]
    fn global_skipped_when_project_config_exists() {
        let project = tmp();
        fs::write(project.path().join("typesmith.toml"), "").expect("write");
        let global = tmp();
        fs::write(global.path().join("config.toml"), "").expect("write");

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = tmp();
        let global = tmp();
        let source = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(source, ConfigSource::Default);
        assert_eq!(source.load().expect("defaults"), Config::default());
    }

    #[test]
    fn invalid_project_config_is_an_error() {
        let dir = tmp();
        fs::write(dir.path().join("typesmith.toml"), "[analyzer\n").expect("write");
        let source = resolve_inner(dir.path(), None, None);
        let err = source.load().expect_err("invalid toml");
        assert!(err.to_string().contains("typesmith.toml"));
    }
}
