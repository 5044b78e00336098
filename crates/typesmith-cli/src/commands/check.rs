//! Check command implementation.

use crate::commands::output;
use crate::config_resolver;
use crate::{OutputFormat, Status};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use typesmith_core::{apply_fixes, BatchReport, Config, DiagnosticState, Engine, Severity};
use typesmith_rules::Preset;
use typesmith_ts::{default_parsers, LocalTypeOracle};

/// Arguments of `typesmith check`.
#[derive(Debug, Default, clap::Args)]
pub struct CheckArgs {
    /// Files, directories or glob patterns to analyze
    #[arg(default_value = ".")]
    pub paths: Vec<String>,

    /// Write proposed fixes back to the files
    #[arg(long)]
    pub fix: bool,

    /// Lowest severity to report (warning or suggestion)
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only run these rules (names or codes, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Never run these rules (names or codes, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-file time limit in milliseconds (0 disables it)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Skip rules that need type information
    #[arg(long)]
    pub no_type_info: bool,

    /// Additional exclude globs (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

impl CheckArgs {
    /// Layers command-line flags over the file configuration.
    fn apply_to(&self, config: &mut Config) {
        let analyzer = &mut config.analyzer;
        analyzer.exclude.extend(self.exclude.iter().cloned());
        if let Some(severity) = self.severity {
            analyzer.min_severity = severity;
        }
        if let Some(jobs) = self.jobs {
            analyzer.jobs = jobs;
        }
        if let Some(ms) = self.timeout_ms {
            analyzer.timeout_ms = Some(ms);
        }
        if self.no_type_info {
            analyzer.type_info = false;
        }
        if !self.rules.is_empty() {
            config.rules.allow.clone_from(&self.rules);
        }
        config.rules.deny.extend(self.deny.iter().cloned());
    }
}

/// Runs the check command.
///
/// # Errors
///
/// Fails on configuration errors, unknown rule names or bad paths. Per-file
/// failures are reported, not returned.
pub fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<Status> {
    let project_dir = project_dir(&args.paths);
    let mut config = config_resolver::resolve(&project_dir, config_path).load()?;
    args.apply_to(&mut config);

    let preset = config
        .preset
        .as_deref()
        .map(str::parse::<Preset>)
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let rules = preset.rule_set().context("Failed to build rule set")?;
    let engine = Engine::builder()
        .rules(Arc::new(rules))
        .parsers(default_parsers())
        .oracle(Arc::new(LocalTypeOracle::new()))
        .build()
        .context("Failed to build engine")?;

    let files = discover(&args.paths, &config, &engine)?;
    if files.is_empty() {
        tracing::warn!("No TypeScript files found");
    }
    tracing::debug!("Using preset {preset} on {} file(s)", files.len());

    let mut report = engine
        .analyze(&files, &config.analyze_options())
        .context("Analysis failed")?;
    if args.fix {
        apply_all(&mut report);
    }

    output::print(&report, args.format)?;
    Ok(status(&report))
}

fn project_dir(paths: &[String]) -> PathBuf {
    paths
        .iter()
        .map(Path::new)
        .find(|p| p.is_dir())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expands inputs into the sorted list of files a parser handles.
fn discover(inputs: &[String], config: &Config, engine: &Engine) -> Result<Vec<PathBuf>> {
    let excludes = config
        .analyzer
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern `{p}`")))
        .collect::<Result<Vec<_>>>()?;
    let wanted = |path: &Path| {
        path.is_file() && engine.handles(path) && !excludes.iter().any(|p| p.matches_path(path))
    };

    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            if engine.handles(path) {
                files.push(path.to_path_buf());
            } else {
                tracing::warn!("Skipping {input}: not a TypeScript file");
            }
        } else if path.is_dir() {
            let mut builder = ignore::WalkBuilder::new(path);
            builder
                .hidden(false)
                .git_ignore(config.analyzer.respect_gitignore);
            for entry in builder.build() {
                let entry = entry.with_context(|| format!("Failed to walk {input}"))?;
                if wanted(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if is_glob(input) {
            for entry in glob::glob(input).with_context(|| format!("Invalid glob `{input}`"))? {
                let path = entry.context("Failed to read glob match")?;
                if wanted(&path) {
                    files.push(path);
                }
            }
        } else {
            bail!("No such file or directory: {input}");
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Writes every proposed fix; returns the number applied.
fn apply_all(report: &mut BatchReport) -> usize {
    let mut applied = 0;
    for file in &mut report.files {
        if !file
            .diagnostics
            .iter()
            .any(|d| d.state == DiagnosticState::FixProposed)
        {
            continue;
        }
        match apply_fixes(&file.path, &mut file.diagnostics) {
            Ok(_) => {
                applied += file
                    .diagnostics
                    .iter()
                    .filter(|d| d.state == DiagnosticState::Applied)
                    .count();
            }
            Err(e) => tracing::warn!("Fixes not applied to {}: {e}", file.path.display()),
        }
    }
    if applied > 0 {
        tracing::info!("Applied {applied} fix(es)");
    }
    applied
}

fn status(report: &BatchReport) -> Status {
    if report.has_failures() {
        Status::Failure
    } else if report.has_warnings() {
        Status::Warnings
    } else {
        Status::Clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("typesmith.toml"), "").expect("write config");
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(path, content).expect("write source");
        }
        dir
    }

    fn args(dir: &TempDir) -> CheckArgs {
        CheckArgs {
            paths: vec![dir.path().display().to_string()],
            format: OutputFormat::Compact,
            jobs: Some(2),
            ..CheckArgs::default()
        }
    }

    fn engine() -> Engine {
        Engine::builder()
            .rules(Arc::new(Preset::Recommended.rule_set().expect("rules")))
            .parsers(default_parsers())
            .build()
            .expect("engine")
    }

    #[test]
    fn discovery_skips_excluded_and_foreign_files() {
        let dir = project(&[
            ("src/a.ts", ""),
            ("src/b.tsx", ""),
            ("src/types.d.ts", ""),
            ("src/readme.md", ""),
            ("node_modules/lib/index.ts", ""),
            ("dist/a.ts", ""),
        ]);
        let files = discover(&args(&dir).paths, &Config::default(), &engine()).expect("discover");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).expect("inside").to_path_buf())
            .collect();
        assert_eq!(
            names,
            [
                PathBuf::from("src/a.ts"),
                PathBuf::from("src/b.tsx"),
                PathBuf::from("src/types.d.ts"),
            ]
        );
    }

    #[test]
    fn discovery_expands_globs() {
        let dir = project(&[("a.ts", ""), ("sub/b.ts", ""), ("sub/c.js", "")]);
        let pattern = format!("{}/**/*.ts", dir.path().display());
        let files = discover(&[pattern], &Config::default(), &engine()).expect("discover");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = project(&[]);
        let missing = dir.path().join("nope.ts").display().to_string();
        assert!(discover(&[missing], &Config::default(), &engine()).is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::parse("[rules]\ndeny = [\"TY014\"]\n").expect("config");
        let cli = CheckArgs {
            severity: Some(Severity::Warning),
            rules: vec!["TY002".to_string()],
            deny: vec!["TY003".to_string()],
            timeout_ms: Some(0),
            no_type_info: true,
            ..CheckArgs::default()
        };
        cli.apply_to(&mut config);
        let options = config.analyze_options();
        assert_eq!(options.min_severity, Severity::Warning);
        assert_eq!(options.rule_filter.allow, ["TY002"]);
        assert_eq!(options.rule_filter.deny, ["TY014", "TY003"]);
        assert_eq!(options.timeout, None);
        assert!(!options.type_info);
    }

    #[test]
    fn warnings_set_the_status() {
        let dir = project(&[("a.ts", "let a: any;\n")]);
        assert_eq!(run(&args(&dir), None).expect("run"), Status::Warnings);
    }

    #[test]
    fn fix_resolves_warnings() {
        let dir = project(&[("a.ts", "let a: any;\nlet s: String;\n")]);
        let cli = CheckArgs {
            fix: true,
            ..args(&dir)
        };
        assert_eq!(run(&cli, None).expect("run"), Status::Clean);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.ts")).expect("read"),
            "let a: unknown;\nlet s: string;\n"
        );
    }

    #[test]
    fn parse_errors_take_precedence() {
        let dir = project(&[("a.ts", "let a: any;\n"), ("b.ts", "let = ;\n")]);
        assert_eq!(run(&args(&dir), None).expect("run"), Status::Failure);
    }

    #[test]
    fn unknown_rule_is_an_error() {
        let dir = project(&[("a.ts", "")]);
        let cli = CheckArgs {
            rules: vec!["no-such-rule".to_string()],
            ..args(&dir)
        };
        assert!(run(&cli, None).is_err());
    }

    #[test]
    fn preset_comes_from_config() {
        let dir = project(&[("a.ts", "type Id = string;\n")]);
        fs::write(dir.path().join("typesmith.toml"), "preset = \"minimal\"\n").expect("write");
        assert_eq!(run(&args(&dir), None).expect("run"), Status::Clean);

        fs::write(dir.path().join("typesmith.toml"), "preset = \"strict\"\n").expect("write");
        assert!(run(&args(&dir), None).is_err());
    }
}
