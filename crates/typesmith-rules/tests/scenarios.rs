//! End-to-end scenarios against the full rule catalog.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use typesmith_core::{
    apply_fixes, apply_fixes_to_source, AnalyzeOptions, Captures, Diagnostic, DiagnosticState,
    Engine, FileContext, FileOutcome, FileReport, Node, Rule, RuleSet, Severity,
};
use typesmith_rules::{all_rules, default_rule_set};
use typesmith_ts::{default_parsers, LocalTypeOracle};

fn engine_with(rules: RuleSet) -> Engine {
    Engine::builder()
        .rules(Arc::new(rules))
        .parsers(default_parsers())
        .oracle(Arc::new(LocalTypeOracle::new()))
        .build()
        .expect("engine")
}

fn engine() -> Engine {
    engine_with(default_rule_set().expect("catalog"))
}

fn analyze(src: &str) -> FileReport {
    engine()
        .analyze_source(Path::new("scenario.ts"), src, &AnalyzeOptions::new().jobs(1))
        .expect("analyze")
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

#[test]
fn enum_is_rewritten_to_const_object() {
    let src = r#"enum Status { Active = "active", Inactive = "inactive" }"#;
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY001"]);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    insta::assert_snapshot!(
        apply_fixes_to_source(src, &report.diagnostics).expect("fix applies"),
        @r#"
    const Status = { Active: "active", Inactive: "inactive" } as const;
    type Status = (typeof Status)[keyof typeof Status];
    "#
    );
}

#[test]
fn record_annotation_moves_into_satisfies() {
    let src = r#"const routes: Record<string, {}> = {"/": {}}"#;
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY008"]);
    assert_eq!(report.diagnostics[0].severity, Severity::Suggestion);
    assert_eq!(
        apply_fixes_to_source(src, &report.diagnostics).expect("fix applies"),
        r#"const routes = {"/": {}} satisfies Record<string, {}>"#
    );
}

#[test]
fn redundant_return_type_only_on_private_functions() {
    let src = "function two(): number {\n  return 2;\n}";
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY009"]);
    assert_eq!(report.diagnostics[0].state, DiagnosticState::FixProposed);
    assert_eq!(
        apply_fixes_to_source(src, &report.diagnostics).expect("fix applies"),
        "function two() {\n  return 2;\n}"
    );

    let exported = analyze("export function two(): number {\n  return 2;\n}");
    assert!(exported.diagnostics.is_empty(), "{:?}", exported.diagnostics);
}

#[test]
fn accidental_merge_flags_second_declaration() {
    let src = "interface Props { id: string }\n\ninterface Props { name: string }\n";
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY007"]);
    let d = &report.diagnostics[0];
    assert_eq!(d.location.line, 3);
    assert_eq!(d.location.column, 11);
    assert_eq!(d.state, DiagnosticState::FixUnavailable);
}

#[test]
fn ambient_blocks_never_report_merging() {
    let src = "declare module \"express\" {\n  interface Request { user: string }\n  interface Request { session: string }\n}\n\
               declare global {\n  interface Window { app: string }\n  interface Window { env: string }\n}";
    let report = analyze(src);
    assert!(!codes(&report.diagnostics).contains(&"TY007"));
    assert_eq!(report.stats.suppressed, 2);
}

#[test]
fn allow_directive_after_url_string() {
    let src = "const u: any = \"http://x\"; // typesmith: allow(no-explicit-any) reason=\"untyped\"\n";
    let report = analyze(src);
    assert!(!codes(&report.diagnostics).contains(&"TY002"));
    assert_eq!(report.stats.suppressed, 1);

    let src = "let s = \"// typesmith: allow(all)\";\nlet a: any = 1;\n";
    let report = analyze(src);
    assert!(codes(&report.diagnostics).contains(&"TY002"));
}

#[test]
fn overlapping_rules_both_surface() {
    let src = "declare const v: string;\nconst f = v as unknown as Function;";
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY017", "TY005"]);
    assert_eq!(report.diagnostics[1].state, DiagnosticState::FixProposed);
}

fn interface_name_twice(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    let name = match node.kind() {
        "interface_declaration" => node.child_by_field("name")?,
        "type_identifier" if node.parent()?.kind() == "interface_declaration" => node,
        _ => return None,
    };
    Some(Captures::new().with_node("span", name))
}

#[test]
fn duplicate_rule_span_collapses() {
    let rule = Rule::new("interface-name", "XT001", Severity::Warning)
        .message("interface")
        .matches_with(interface_name_twice);
    let engine = engine_with(RuleSet::new(vec![rule]).expect("rule set"));
    let report = engine
        .analyze_source(
            Path::new("a.ts"),
            "interface A { x: 1 }",
            &AnalyzeOptions::new(),
        )
        .expect("analyze");
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].span.len(), 1);
}

#[test]
fn earlier_rule_wins_overlapping_fixes() {
    let src = "const sizes: { [k: string]: number } = { sm: 1, lg: 2 };";
    let report = analyze(src);
    assert_eq!(codes(&report.diagnostics), ["TY008", "TY023"]);
    let record = &report.diagnostics[1];
    assert_eq!(record.state, DiagnosticState::Rejected);
    assert_eq!(
        record.note.as_deref(),
        Some("manual: conflicts with fix from `prefer-satisfies`")
    );
    assert_eq!(report.stats.rejected_fixes, 1);
    assert_eq!(
        apply_fixes_to_source(src, &report.diagnostics).expect("fix applies"),
        "const sizes = { sm: 1, lg: 2 } satisfies { [k: string]: number };"
    );
}

fn write_project(dir: &Path) -> Vec<PathBuf> {
    let files = [
        ("a.ts", "enum E { A = 1 }\nlet x: any = 1;\n"),
        ("b.ts", "interface I {}\ninterface I {}\nconst n = m!;\n"),
        ("c.tsx", "const el = <div>{(v as unknown as string)}</div>;\n"),
        ("d2.ts", "type Id = string;\nfunction f<T>(x: T): void {}\n"),
        ("e.ts", "// @ts-ignore\nlet s: String = \"\";\n"),
    ];
    files
        .iter()
        .map(|(name, src)| {
            let path = dir.join(name);
            fs::write(&path, src).expect("write source");
            path
        })
        .collect()
}

#[test]
fn results_are_identical_across_worker_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = write_project(dir.path());
    let engine = engine();

    let sequential = engine
        .analyze(&paths, &AnalyzeOptions::new().jobs(1))
        .expect("analyze");
    for _ in 0..3 {
        let parallel = engine
            .analyze(&paths, &AnalyzeOptions::new().jobs(4))
            .expect("analyze");
        let order: Vec<_> = parallel.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(order, paths);
        let left: Vec<_> = sequential.diagnostics().collect();
        let right: Vec<_> = parallel.diagnostics().collect();
        assert_eq!(left, right);
        assert_eq!(sequential.summary, parallel.summary);
    }
    assert!(sequential.summary.warnings > 0);
    assert_eq!(sequential.summary.analyzed, paths.len());
}

#[test]
fn syntax_error_is_isolated_to_its_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = dir.path().join("broken.ts");
    let good = dir.path().join("good.ts");
    fs::write(&broken, "let = ;\n").expect("write");
    fs::write(&good, "let a: any;\n").expect("write");

    let report = engine()
        .analyze(&[broken, good, dir.path().join("missing.ts")], &AnalyzeOptions::new())
        .expect("analyze");
    assert!(matches!(report.files[0].outcome, FileOutcome::ParseFailed { .. }));
    assert!(report.files[0].diagnostics.is_empty());
    assert_eq!(codes(&report.files[1].diagnostics), ["TY002"]);
    assert!(matches!(report.files[2].outcome, FileOutcome::Io { .. }));
    assert_eq!(report.summary.parse_errors, 1);
    assert_eq!(report.summary.io_errors, 1);
    assert!(report.has_failures());
}

#[test]
fn fixes_are_written_to_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a.ts");
    fs::write(&path, "let a: any;\nlet s: String;\n").expect("write");

    let mut report = engine()
        .analyze(&[path.clone()], &AnalyzeOptions::new())
        .expect("analyze");
    let fixed = apply_fixes(&path, &mut report.files[0].diagnostics).expect("applies");
    assert_eq!(fixed, "let a: unknown;\nlet s: string;\n");
    assert_eq!(fs::read_to_string(&path).expect("read"), fixed);
    assert!(report.files[0]
        .diagnostics
        .iter()
        .all(|d| d.state == DiagnosticState::Applied));
    assert!(!report.has_warnings());
}

#[test]
fn catalog_filter_by_code_and_former_name() {
    let options = AnalyzeOptions::new().rule_filter(typesmith_core::RuleFilter {
        allow: vec!["ty002".to_string(), "ban-ts-ignore".to_string()],
        deny: Vec::new(),
    });
    let report = engine()
        .analyze_source(
            Path::new("a.ts"),
            "// @ts-ignore\nlet a: any = m!;\n",
            &options,
        )
        .expect("analyze");
    assert_eq!(codes(&report.diagnostics), ["TY020", "TY002"]);
    assert_eq!(all_rules().len(), 23);
}
