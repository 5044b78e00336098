//! # typesmith-rules
//!
//! Built-in rule catalog for typesmith.
//!
//! Each rule pairs a TypeScript type-system anti-pattern with the preferred
//! form. Rules are plain [`Rule`] records; [`default_rule_set`] assembles
//! them into the versioned catalog in registration order, which is also the
//! default fix priority.
//!
//! ## Available Rules
//!
//! | Code | Name | Severity | Fix |
//! |------|------|----------|-----|
//! | TY001 | `prefer-union-over-enum` | warning | yes |
//! | TY002 | `no-explicit-any` | warning | yes |
//! | TY003 | `no-non-null-assertion` | warning | no |
//! | TY004 | `no-casual-type-assertion` | warning | partial |
//! | TY005 | `no-function-type` | warning | yes |
//! | TY006 | `no-object-type` | warning | yes |
//! | TY007 | `no-accidental-declaration-merging` | warning | no |
//! | TY008 | `prefer-satisfies` | suggestion | yes |
//! | TY009 | `no-redundant-return-type` | suggestion | yes |
//! | TY010 | `require-exported-return-type` | suggestion | no |
//! | TY011 | `prefer-named-result-type` | suggestion | no |
//! | TY012 | `no-unnecessary-type-parameter` | suggestion | partial |
//! | TY013 | `prefer-function-property` | warning | partial |
//! | TY014 | `prefer-discriminated-union` | suggestion | no |
//! | TY015 | `prefer-branded-primitive` | suggestion | yes |
//! | TY016 | `no-empty-interface` | suggestion | partial |
//! | TY017 | `no-double-assertion` | warning | no |
//! | TY018 | `prefer-as-const` | suggestion | yes |
//! | TY019 | `no-wrapper-object-types` | warning | yes |
//! | TY020 | `prefer-ts-expect-error` | warning | yes |
//! | TY021 | `no-namespace` | warning | no |
//! | TY022 | `no-inferrable-type-annotation` | suggestion | yes |
//! | TY023 | `prefer-record-type` | suggestion | yes |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use typesmith_core::Engine;
//! use typesmith_rules::default_rule_set;
//!
//! let engine = Engine::builder()
//!     .rules(Arc::new(default_rule_set()?))
//!     .parsers(typesmith_ts::default_parsers())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
pub mod util;

pub mod no_accidental_declaration_merging;
pub mod no_casual_type_assertion;
pub mod no_double_assertion;
pub mod no_empty_interface;
pub mod no_explicit_any;
pub mod no_function_type;
pub mod no_inferrable_type_annotation;
pub mod no_namespace;
pub mod no_non_null_assertion;
pub mod no_object_type;
pub mod no_redundant_return_type;
pub mod no_unnecessary_type_parameter;
pub mod no_wrapper_object_types;
pub mod prefer_as_const;
pub mod prefer_branded_primitive;
pub mod prefer_discriminated_union;
pub mod prefer_function_property;
pub mod prefer_named_result_type;
pub mod prefer_record_type;
pub mod prefer_satisfies;
pub mod prefer_ts_expect_error;
pub mod prefer_union_over_enum;
pub mod require_exported_return_type;

pub use catalog::{all_rules, default_rule_set, minimal_rules, Preset, CATALOG_VERSION};

/// Re-export core types for convenience.
pub use typesmith_core::{Rule, RuleSet, Severity};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::Arc;
    use typesmith_core::{
        apply_fixes_to_source, AnalyzeOptions, Diagnostic, Engine, FileReport, Rule, RuleSet,
    };
    use typesmith_ts::{default_parsers, LocalTypeOracle};

    pub fn analyze_as(rule: Rule, path: &str, src: &str) -> FileReport {
        analyze_with(rule, path, src, &AnalyzeOptions::new().jobs(1))
    }

    pub fn analyze_with(rule: Rule, path: &str, src: &str, options: &AnalyzeOptions) -> FileReport {
        let rules = RuleSet::new(vec![rule]).expect("valid rule");
        let engine = Engine::builder()
            .rules(Arc::new(rules))
            .parsers(default_parsers())
            .oracle(Arc::new(LocalTypeOracle))
            .build()
            .expect("engine");
        engine
            .analyze_source(Path::new(path), src, options)
            .expect("analyze")
    }

    pub fn check(rule: Rule, src: &str) -> Vec<Diagnostic> {
        let report = analyze_as(rule, "test.ts", src);
        assert!(
            !report.outcome.is_failure(),
            "analysis failed: {:?}",
            report.outcome
        );
        assert!(report.engine_errors.is_empty(), "{:?}", report.engine_errors);
        report.diagnostics
    }

    pub fn fix(rule: Rule, src: &str) -> String {
        let diagnostics = check(rule, src);
        apply_fixes_to_source(src, &diagnostics).expect("fixes apply")
    }
}
