//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# typesmith configuration

# Starting rule set: "recommended" (all rules) or "minimal" (warnings only)
preset = "recommended"

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (0 = one per CPU)
jobs = 0

# Per-file time limit in milliseconds (0 disables it)
timeout_ms = 5000

# Run rules that need type information
type_info = true

# Lowest severity reported: "suggestion" or "warning"
min_severity = "suggestion"

# Which fix wins when two overlap: "first-registered" or "last-registered"
fix_policy = "first-registered"

[rules]
# Rules to run by name or code (empty = all rules in the preset)
allow = []

# Rules never to run
deny = []
"#;

/// Runs the init command in the current directory.
///
/// # Errors
///
/// Fails if the file exists and `force` is not set, or cannot be written.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit typesmith.toml to select rules");
    println!("  2. Run: typesmith check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join("typesmith.toml");
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typesmith_core::Config;

    #[test]
    fn default_config_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).expect("valid config");
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.analyzer, Config::default().analyzer);
        assert_eq!(config.rules, Config::default().rules);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(dir.path(), false).expect("first write");
        std::fs::write(&path, "# custom\n").expect("edit");

        assert!(write_config(dir.path(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# custom\n");

        write_config(dir.path(), true).expect("forced write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), DEFAULT_CONFIG);
    }
}
