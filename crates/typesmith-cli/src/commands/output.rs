//! Output formatting for check results.

use anyhow::Result;
use miette::GraphicalReportHandler;
use typesmith_core::{BatchReport, DiagnosticReport, DiagnosticState, FileOutcome, FileReport};

use crate::OutputFormat;

/// Prints the batch report in the requested format.
pub fn print(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Why a file produced no diagnostics, if it failed.
fn failure(file: &FileReport) -> Option<String> {
    match &file.outcome {
        FileOutcome::Analyzed => None,
        FileOutcome::ParseFailed { error } => Some(format!("syntax error at {error}")),
        FileOutcome::TimedOut { limit_ms } => Some(format!("timed out after {limit_ms} ms")),
        FileOutcome::Cancelled => Some("cancelled".to_string()),
        FileOutcome::Io { message } => Some(format!("cannot read file: {message}")),
    }
}

fn print_failures(file: &FileReport) {
    if let Some(reason) = failure(file) {
        eprintln!("{}: error: {reason}", file.path.display());
    }
    for error in &file.engine_errors {
        eprintln!("error: {error}");
    }
}

fn print_text(report: &BatchReport) {
    let handler = GraphicalReportHandler::new();

    for file in &report.files {
        print_failures(file);
        let pending: Vec<_> = file
            .diagnostics
            .iter()
            .filter(|d| d.state != DiagnosticState::Applied)
            .collect();
        if pending.is_empty() {
            continue;
        }
        // Spans refer to the analyzed content; once fixes landed they may not.
        let rewritten = pending.len() < file.diagnostics.len();
        let source = if rewritten {
            None
        } else {
            std::fs::read_to_string(&file.path).ok()
        };

        for diagnostic in pending {
            let mut rendered = String::new();
            let ok = source.as_deref().is_some_and(|src| {
                handler
                    .render_report(&mut rendered, &DiagnosticReport::new(diagnostic, src))
                    .is_ok()
            });
            if ok {
                println!("{rendered}");
            } else {
                println!("{diagnostic}");
            }
        }
    }

    let color = if report.has_failures() {
        "\x1b[31m"
    } else if report.has_warnings() {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!("{color}{}\x1b[0m", summary_line(report));
}

fn print_json(report: &BatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &BatchReport) {
    for file in &report.files {
        print_failures(file);
        for diagnostic in &file.diagnostics {
            if diagnostic.state != DiagnosticState::Applied {
                println!("{}", diagnostic.format_compact());
            }
        }
    }
}

/// One-line batch summary.
fn summary_line(report: &BatchReport) -> String {
    let s = &report.summary;
    let applied = report
        .diagnostics()
        .filter(|d| d.state == DiagnosticState::Applied)
        .count();
    let mut line = format!(
        "Found {} warning(s), {} suggestion(s) in {} file(s)",
        s.warnings, s.suggestions, s.files
    );
    if applied > 0 {
        line.push_str(&format!(", fixed {applied}"));
    } else if s.fixable > 0 {
        line.push_str(&format!(", {} fixable with --fix", s.fixable));
    }
    let failed = s.parse_errors + s.io_errors + s.timed_out;
    if failed > 0 {
        line.push_str(&format!("; {failed} file(s) could not be analyzed"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use typesmith_core::ParseError;

    fn report(source: &str) -> BatchReport {
        let engine = typesmith_core::Engine::builder()
            .rules(std::sync::Arc::new(
                typesmith_rules::default_rule_set().expect("rules"),
            ))
            .parsers(typesmith_ts::default_parsers())
            .build()
            .expect("engine");
        let file = engine
            .analyze_source(Path::new("a.ts"), source, &typesmith_core::AnalyzeOptions::new())
            .expect("analyze");
        BatchReport::from_files(vec![file])
    }

    #[test]
    fn summary_counts_fixable() {
        let report = report("let a: any;\nconst n = m!;\n");
        assert_eq!(
            summary_line(&report),
            "Found 2 warning(s), 0 suggestion(s) in 1 file(s), 1 fixable with --fix"
        );
    }

    #[test]
    fn summary_mentions_failed_files() {
        let failed = FileReport::new(
            "b.ts",
            FileOutcome::ParseFailed {
                error: ParseError::new("unexpected `=`").at(1, 5),
            },
        );
        let report = BatchReport::from_files(vec![failed]);
        assert_eq!(
            failure(&report.files[0]).as_deref(),
            Some("syntax error at 1:5: unexpected `=`")
        );
        assert!(summary_line(&report).ends_with("; 1 file(s) could not be analyzed"));
    }
}
