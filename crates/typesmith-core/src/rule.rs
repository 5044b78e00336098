//! Rule records and the versioned, immutable rule set.
//!
//! A rule is plain data: metadata plus function pointers for matching,
//! confirming and fixing. Rules never hold state, so a [`RuleSet`] can be
//! shared read-only across worker threads behind an `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use typesmith_core::{pattern::kind, Fixer, Rule, Severity};
//!
//! let rule = Rule::new("no-explicit-any", "TY002", Severity::Warning)
//!     .description("Disallows the `any` type")
//!     .matches(kind("predefined_type").with_text("any"))
//!     .message("`any` disables type checking")
//!     .fixer(Fixer::replace("Replace with `unknown`", "node", "unknown"));
//! ```

use crate::context::FileContext;
use crate::disambiguate::Verdict;
use crate::error::RuleSetError;
use crate::fix::FixOutcome;
use crate::matcher::Match;
use crate::pattern::{Captures, Pattern};
use crate::tree::Node;
use crate::types::{Confidence, Severity};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hand-written matcher: returns captures when the node matches.
pub type MatchFn = fn(Node<'_>, &FileContext<'_>) -> Option<Captures>;

/// Disambiguation function consulted after a structural match.
pub type ConfirmFn = fn(&Match, &FileContext<'_>) -> Verdict;

/// Hand-written fixer.
pub type FixFn = fn(&Match, &FileContext<'_>) -> FixOutcome;

/// How a rule finds candidate nodes.
#[derive(Clone)]
pub enum Matcher {
    /// Declarative tree pattern.
    Pattern(Pattern),
    /// Pattern combined with tree navigation in code.
    Custom(MatchFn),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One edit of a template fix.
///
/// `target` names a capture; `"node"` refers to the matched node itself.
/// Replacement text is rendered with [`crate::pattern::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTemplate {
    /// Replace the target with rendered text.
    Replace {
        /// Capture name.
        target: &'static str,
        /// Replacement template.
        with: &'static str,
    },
    /// Insert rendered text before the target.
    InsertBefore {
        /// Capture name.
        target: &'static str,
        /// Text template.
        text: &'static str,
    },
    /// Insert rendered text after the target.
    InsertAfter {
        /// Capture name.
        target: &'static str,
        /// Text template.
        text: &'static str,
    },
    /// Delete the target.
    Delete {
        /// Capture name.
        target: &'static str,
    },
}

/// How a rule rewrites a match.
#[derive(Clone)]
pub enum Fixer {
    /// Edits rendered from capture templates.
    Template {
        /// Fix description template.
        description: &'static str,
        /// Edit templates.
        edits: Vec<EditTemplate>,
        /// Confidence of the rewrite.
        confidence: Confidence,
    },
    /// Code that builds the fix, or declines with a reason.
    Custom(FixFn),
}

impl Fixer {
    /// Single-edit template replacing `target` with `with`.
    #[must_use]
    pub fn replace(description: &'static str, target: &'static str, with: &'static str) -> Self {
        Self::Template {
            description,
            edits: vec![EditTemplate::Replace { target, with }],
            confidence: Confidence::High,
        }
    }
}

impl fmt::Debug for Fixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template {
                description,
                edits,
                confidence,
            } => f
                .debug_struct("Template")
                .field("description", description)
                .field("edits", edits)
                .field("confidence", confidence)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A rule definition.
#[derive(Clone)]
pub struct Rule {
    /// Stable kebab-case identifier (e.g. "no-explicit-any").
    pub name: &'static str,
    /// Stable code (e.g. "TY002").
    pub code: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Default severity.
    pub severity: Severity,
    /// Message template rendered from captures.
    pub message: &'static str,
    /// Help template rendered from captures.
    pub help: Option<&'static str>,
    /// Structural matcher.
    pub matcher: Matcher,
    /// Disambiguation step, if any.
    pub confirm: Option<ConfirmFn>,
    /// Rewriter, if any.
    pub fixer: Option<Fixer>,
    /// Matches are unconfirmed unless type information is available.
    pub requires_type_info: bool,
    /// Explicit fix priority; higher wins. Defaults to registration order.
    pub priority: Option<i32>,
}

impl Rule {
    /// Creates a rule that matches nothing until a matcher is set.
    #[must_use]
    pub fn new(name: &'static str, code: &'static str, severity: Severity) -> Self {
        Self {
            name,
            code,
            description: "",
            severity,
            message: "",
            help: None,
            matcher: Matcher::Pattern(crate::pattern::not(crate::pattern::any())),
            confirm: None,
            fixer: None,
            requires_type_info: false,
            priority: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the message template.
    #[must_use]
    pub fn message(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }

    /// Sets the help template.
    #[must_use]
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Uses a declarative pattern.
    #[must_use]
    pub fn matches(mut self, pattern: Pattern) -> Self {
        self.matcher = Matcher::Pattern(pattern);
        self
    }

    /// Uses a hand-written matcher.
    #[must_use]
    pub fn matches_with(mut self, f: MatchFn) -> Self {
        self.matcher = Matcher::Custom(f);
        self
    }

    /// Sets the confirm function.
    #[must_use]
    pub fn confirm(mut self, f: ConfirmFn) -> Self {
        self.confirm = Some(f);
        self
    }

    /// Sets the fixer.
    #[must_use]
    pub fn fixer(mut self, fixer: Fixer) -> Self {
        self.fixer = Some(fixer);
        self
    }

    /// Sets a hand-written fixer.
    #[must_use]
    pub fn fix_with(self, f: FixFn) -> Self {
        self.fixer(Fixer::Custom(f))
    }

    /// Marks the rule as needing type information.
    #[must_use]
    pub fn requires_type_info(mut self) -> Self {
        self.requires_type_info = true;
        self
    }

    /// Sets an explicit fix priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns true if the rule offers automatic fixes.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fixer.is_some()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("severity", &self.severity)
            .field("matcher", &self.matcher)
            .field("fixer", &self.fixer)
            .field("requires_type_info", &self.requires_type_info)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Allow/deny selection of rules by name or code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    /// Rules to keep; empty keeps all.
    pub allow: Vec<String>,
    /// Rules to drop, applied after `allow`.
    pub deny: Vec<String>,
}

impl RuleFilter {
    /// Returns true if the filter keeps every rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

/// An immutable, versioned collection of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    version: String,
    rules: Vec<Arc<Rule>>,
    renamed: HashMap<&'static str, &'static str>,
}

impl RuleSet {
    /// Builds a rule set in registration order.
    ///
    /// # Errors
    ///
    /// Rejects malformed or duplicate names and codes.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleSetError> {
        let rules: Vec<Arc<Rule>> = rules.into_iter().map(Arc::new).collect();
        Self::validate(&rules)?;
        Ok(Self {
            version: "0".to_string(),
            rules,
            renamed: HashMap::new(),
        })
    }

    fn validate(rules: &[Arc<Rule>]) -> Result<(), RuleSetError> {
        let mut seen = std::collections::HashSet::new();
        for rule in rules {
            if !is_kebab_case(rule.name) {
                return Err(RuleSetError::InvalidName(rule.name.to_string()));
            }
            if !is_rule_code(rule.code) {
                return Err(RuleSetError::InvalidCode(rule.code.to_string()));
            }
            for id in [rule.name, rule.code] {
                if !seen.insert(id) {
                    return Err(RuleSetError::Duplicate(id.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Sets the catalog version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Records that `old` was renamed to `new`.
    ///
    /// # Errors
    ///
    /// Fails if `new` is unknown or `old` is still a live identifier.
    pub fn with_migration(
        mut self,
        old: &'static str,
        new: &'static str,
    ) -> Result<Self, RuleSetError> {
        if self.find(new).is_none() {
            return Err(RuleSetError::UnknownRule(new.to_string()));
        }
        if self.find(old).is_some() {
            return Err(RuleSetError::Duplicate(old.to_string()));
        }
        self.renamed.insert(old, new);
        Ok(self)
    }

    /// Catalog version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule at registration index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Rule>> {
        self.rules.get(index)
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|r| r.name == id || r.code.eq_ignore_ascii_case(id))
    }

    /// Registration index of a rule by name, code or former name.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.find(id)
            .or_else(|| self.renamed.get(id).and_then(|new| self.find(new)))
    }

    /// Looks up a rule by name, code or former name.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&Arc<Rule>> {
        self.index_of(id).map(|i| &self.rules[i])
    }

    /// Current name for an identifier, following renames.
    #[must_use]
    pub fn canonical_name(&self, id: &str) -> Option<&'static str> {
        self.resolve(id).map(|r| r.name)
    }

    /// Produces a new rule set holding the selected rules in their original
    /// order. Renames carry over.
    ///
    /// # Errors
    ///
    /// Returns [`RuleSetError::UnknownRule`] for identifiers that name no
    /// rule.
    pub fn filter(&self, filter: &RuleFilter) -> Result<RuleSet, RuleSetError> {
        let lookup = |ids: &[String]| -> Result<Vec<usize>, RuleSetError> {
            ids.iter()
                .map(|id| {
                    self.index_of(id)
                        .ok_or_else(|| RuleSetError::UnknownRule(id.clone()))
                })
                .collect()
        };
        let allow = lookup(&filter.allow)?;
        let deny = lookup(&filter.deny)?;
        let rules = self
            .rules
            .iter()
            .enumerate()
            .filter(|(i, _)| allow.is_empty() || allow.contains(i))
            .filter(|(i, _)| !deny.contains(i))
            .map(|(_, r)| Arc::clone(r))
            .collect();
        Ok(RuleSet {
            version: self.version.clone(),
            rules,
            renamed: self.renamed.clone(),
        })
    }
}

fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_rule_code(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5
        && b[..2].iter().all(u8::is_ascii_uppercase)
        && b[2..].iter().all(u8::is_ascii_digit)
}
