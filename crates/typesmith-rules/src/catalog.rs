//! The versioned rule catalog and presets.

use crate::{
    no_accidental_declaration_merging, no_casual_type_assertion, no_double_assertion,
    no_empty_interface, no_explicit_any, no_function_type, no_inferrable_type_annotation,
    no_namespace, no_non_null_assertion, no_object_type, no_redundant_return_type,
    no_unnecessary_type_parameter, no_wrapper_object_types, prefer_as_const,
    prefer_branded_primitive, prefer_discriminated_union, prefer_function_property,
    prefer_named_result_type, prefer_record_type, prefer_satisfies, prefer_ts_expect_error,
    prefer_union_over_enum, require_exported_return_type,
};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use typesmith_core::{Rule, RuleSet, RuleSetError, Severity};

/// Version of the built-in catalog. Bumped whenever a rule is added,
/// renamed or changes meaning.
pub const CATALOG_VERSION: &str = "1.0.0";

/// Former rule names and their replacements.
const MIGRATIONS: &[(&str, &str)] = &[
    ("no-any", no_explicit_any::NAME),
    ("no-enum", prefer_union_over_enum::NAME),
    ("ban-ts-ignore", prefer_ts_expect_error::NAME),
    ("no-empty-type", no_empty_interface::NAME),
];

/// Returns every built-in rule in code order.
///
/// The order is the registration order of [`default_rule_set`], which
/// decides which fix wins when two overlap.
#[must_use]
pub fn all_rules() -> Vec<Rule> {
    vec![
        prefer_union_over_enum::rule(),
        no_explicit_any::rule(),
        no_non_null_assertion::rule(),
        no_casual_type_assertion::rule(),
        no_function_type::rule(),
        no_object_type::rule(),
        no_accidental_declaration_merging::rule(),
        prefer_satisfies::rule(),
        no_redundant_return_type::rule(),
        require_exported_return_type::rule(),
        prefer_named_result_type::rule(),
        no_unnecessary_type_parameter::rule(),
        prefer_function_property::rule(),
        prefer_discriminated_union::rule(),
        prefer_branded_primitive::rule(),
        no_empty_interface::rule(),
        no_double_assertion::rule(),
        prefer_as_const::rule(),
        no_wrapper_object_types::rule(),
        prefer_ts_expect_error::rule(),
        no_namespace::rule(),
        no_inferrable_type_annotation::rule(),
        prefer_record_type::rule(),
    ]
}

/// Returns the warning-severity rules only.
#[must_use]
pub fn minimal_rules() -> Vec<Rule> {
    all_rules()
        .into_iter()
        .filter(|r| r.severity == Severity::Warning)
        .collect()
}

fn versioned(rules: Vec<Rule>) -> Result<RuleSet, RuleSetError> {
    let mut set = RuleSet::new(rules)?.with_version(CATALOG_VERSION);
    for &(old, new) in MIGRATIONS {
        if set.resolve(new).is_some() {
            set = set.with_migration(old, new)?;
        } else {
            tracing::debug!("Skipping migration {} -> {}: rule not in set", old, new);
        }
    }
    Ok(set)
}

/// Builds the full catalog with its version and rename history.
///
/// # Errors
///
/// Fails only if a built-in rule is malformed.
pub fn default_rule_set() -> Result<RuleSet, RuleSetError> {
    versioned(all_rules())
}

/// Named starting points for configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Every rule.
    #[default]
    Recommended,
    /// Warning-severity rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Every preset, for listings.
    pub const ALL: [Preset; 2] = [Preset::Recommended, Preset::Minimal];

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<Rule> {
        match self {
            Self::Recommended => all_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Builds the versioned rule set for this preset.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in rule is malformed.
    pub fn rule_set(self) -> Result<RuleSet, RuleSetError> {
        versioned(self.rules())
    }

    /// Configuration name of the preset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset `{s}` (expected recommended or minimal)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_valid_and_ordered() {
        let set = default_rule_set().expect("valid catalog");
        assert_eq!(set.len(), 23);
        assert_eq!(set.version(), CATALOG_VERSION);
        let codes: Vec<_> = set.iter().map(|r| r.code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
        assert_eq!(codes.first(), Some(&"TY001"));
        assert_eq!(codes.last(), Some(&"TY023"));
    }

    #[test]
    fn test_migrations_resolve() {
        let set = default_rule_set().expect("valid catalog");
        assert_eq!(set.canonical_name("no-any"), Some("no-explicit-any"));
        assert_eq!(
            set.canonical_name("ban-ts-ignore"),
            Some("prefer-ts-expect-error")
        );
        assert_eq!(set.canonical_name("ty019"), Some("no-wrapper-object-types"));
    }

    #[test]
    fn test_minimal_preset_is_warnings_only() {
        let set = Preset::Minimal.rule_set().expect("valid preset");
        assert!(!set.is_empty());
        assert!(set.iter().all(|r| r.severity == Severity::Warning));
        assert!(set.len() < all_rules().len());
        assert!(set.resolve("no-empty-type").is_none());
    }

    #[test]
    fn test_preset_names() {
        assert_eq!("Minimal".parse::<Preset>(), Ok(Preset::Minimal));
        assert_eq!(Preset::Recommended.to_string(), "recommended");
        assert!("strict".parse::<Preset>().is_err());
    }

    #[test]
    fn test_every_rule_documents_itself() {
        for rule in all_rules() {
            assert!(!rule.description.is_empty(), "{} lacks a description", rule.name);
            assert!(!rule.message.is_empty(), "{} lacks a message", rule.name);
        }
    }
}
