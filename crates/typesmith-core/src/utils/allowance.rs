//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // typesmith: allow(no-explicit-any) reason="third-party callback"
//! /* typesmith: allow(TY003, no-double-assertion) */
//! ```
//!
//! Directives are read from the tree's `comment` nodes, so text inside
//! string literals never counts. A directive applies to the line its comment
//! ends on and to the line below it. Rules may be named by name, code,
//! former name, or `all`.

use crate::span::LineIndex;
use crate::tree::SyntaxTree;
use std::collections::{BTreeMap, HashSet};

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule identifiers that are allowed, as written.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers a rule, given a predicate that
    /// recognizes that rule's identifiers.
    pub fn covers(&self, is_rule: impl Fn(&str) -> bool) -> bool {
        self.rules.iter().any(|r| r == "all" || is_rule(r))
    }
}

/// Directives of one file, indexed by 1-indexed line.
#[derive(Debug, Clone, Default)]
pub struct AllowIndex {
    directives: BTreeMap<usize, AllowDirective>,
}

impl AllowIndex {
    /// Collects directives from the `comment` nodes of `tree`.
    #[must_use]
    pub fn new(tree: &SyntaxTree, lines: &LineIndex) -> Self {
        let source = tree.source();
        Self::from_comments(
            tree.preorder()
                .filter(|n| n.kind() == "comment")
                .map(|n| {
                    let end = n.span().end.saturating_sub(1).max(n.span().start);
                    (lines.position(source, end).0, n.text())
                }),
        )
    }

    /// Builds the index from `(line, comment text)` pairs.
    #[must_use]
    pub fn from_comments<'c>(comments: impl IntoIterator<Item = (usize, &'c str)>) -> Self {
        let directives = comments
            .into_iter()
            .filter_map(|(line, text)| parse_allow_directive(text).map(|d| (line, d)))
            .collect();
        Self { directives }
    }

    /// Returns true if the file has no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Checks the given line and the line before it.
    pub fn check(&self, line: usize, is_rule: impl Fn(&str) -> bool) -> AllowCheck {
        for check_line in [line.saturating_sub(1), line] {
            if let Some(directive) = self.directives.get(&check_line) {
                if directive.covers(&is_rule) {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }
}

/// Parses an allowance directive from the text of one comment.
#[must_use]
pub fn parse_allow_directive(comment: &str) -> Option<AllowDirective> {
    let body = comment
        .strip_prefix("//")
        .or_else(|| comment.strip_prefix("/*"))?;
    let comment_content = body.trim_start_matches(['/', '*']).trim();
    let comment_content = comment_content.trim_end_matches("*/").trim();

    let directive = comment_content.strip_prefix("typesmith:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::tree::TreeBuilder;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("// typesmith: allow(no-explicit-any)").unwrap();
        assert!(directive.rules.contains("no-explicit-any"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("// typesmith: allow(no-namespace) reason=\"legacy globals\"")
                .unwrap();
        assert!(directive.rules.contains("no-namespace"));
        assert_eq!(directive.reason.as_deref(), Some("legacy globals"));
    }

    #[test]
    fn test_parse_block_comment_and_multiple_rules() {
        let directive = parse_allow_directive("/* typesmith: allow(TY003, no-double-assertion) */")
            .unwrap();
        assert!(directive.rules.contains("TY003"));
        assert!(directive.rules.contains("no-double-assertion"));
    }

    #[test]
    fn test_not_a_directive() {
        assert!(parse_allow_directive("// eslint-disable-next-line").is_none());
        assert!(parse_allow_directive("// typesmith: allow()").is_none());
        assert!(parse_allow_directive("\"typesmith: allow(x)\"").is_none());
    }

    // const u = "http://x"; // typesmith: allow(no-explicit-any)
    // let a: any;
    fn tree_with_url() -> SyntaxTree {
        let src = "const u = \"http://x\"; // typesmith: allow(no-explicit-any)\nlet a: any;";
        let comment_start = src.find("; //").expect("comment") + 2;
        let comment_end = src.find('\n').expect("newline");
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        b.named(Some(root), "string", None, Span::new(10, 20));
        b.named(Some(root), "comment", None, Span::new(comment_start, comment_end));
        b.finish().expect("valid tree")
    }

    #[test]
    fn test_directive_after_url_string() {
        let tree = tree_with_url();
        let index = AllowIndex::new(&tree, &LineIndex::new(tree.source()));
        assert!(index.check(1, |id| id == "no-explicit-any").is_allowed());
        assert!(index.check(2, |id| id == "no-explicit-any").is_allowed());
        assert!(!index.check(2, |id| id == "other-rule").is_allowed());
    }

    #[test]
    fn test_check_allow_line_and_next() {
        let index = AllowIndex::from_comments([(
            2,
            "// typesmith: allow(no-non-null-assertion) reason=\"checked above\"",
        )]);
        let result = index.check(3, |id| id == "no-non-null-assertion");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("checked above"));
        assert!(!index.check(3, |id| id == "other-rule").is_allowed());
        assert!(!index.check(4, |id| id == "no-non-null-assertion").is_allowed());
    }

    #[test]
    fn test_directive_text_outside_comments_is_ignored() {
        let src = "const s = \"// typesmith: allow(all)\";\nlet a: any;";
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        b.named(Some(root), "string", None, Span::new(10, 36));
        let tree = b.finish().expect("valid tree");
        let index = AllowIndex::new(&tree, &LineIndex::new(src));
        assert!(index.is_empty());
    }

    #[test]
    fn test_allow_all() {
        let index = AllowIndex::from_comments([(1, "// typesmith: allow(all)")]);
        assert!(index.check(2, |id| id == "anything").is_allowed());
    }
}
