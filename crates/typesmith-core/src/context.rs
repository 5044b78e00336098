//! Per-file context handed to matchers, confirm functions and fixers.

use crate::parser::{TypeInfo, TypeOracle};
use crate::rule::RuleSet;
use crate::scope::ScopeIndex;
use crate::span::{LineIndex, Span};
use crate::tree::{Node, NodeId, SyntaxTree};
use crate::utils::allowance::{AllowCheck, AllowIndex};
use std::path::Path;

/// Everything a rule may consult about the file under analysis.
///
/// Built once per file after parsing; borrowed by every rule evaluation.
pub struct FileContext<'a> {
    /// File path as given to the engine.
    pub path: &'a Path,
    /// Parsed tree (owns the source text).
    pub tree: &'a SyntaxTree,
    /// Scope index from the prerequisite pass.
    pub scopes: ScopeIndex,
    /// Line/column lookup.
    pub lines: LineIndex,
    /// Allow directives found in comments.
    pub allows: AllowIndex,
    /// True for `.d.ts` declaration files.
    pub is_declaration_file: bool,
    oracle: Option<&'a dyn TypeOracle>,
}

impl<'a> FileContext<'a> {
    /// Builds the context, running the scope pass.
    #[must_use]
    pub fn new(path: &'a Path, tree: &'a SyntaxTree) -> Self {
        let lines = LineIndex::new(tree.source());
        Self {
            path,
            tree,
            scopes: ScopeIndex::build(tree),
            allows: AllowIndex::new(tree, &lines),
            lines,
            is_declaration_file: Self::detect_declaration_file(path),
            oracle: None,
        }
    }

    /// Attaches a type oracle. Without one, type queries return `None`.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Option<&'a dyn TypeOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    fn detect_declaration_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| {
                [".d.ts", ".d.mts", ".d.cts"]
                    .iter()
                    .any(|ext| n.ends_with(ext))
            })
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    /// Node handle for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'a>> {
        self.tree.get(id)
    }

    /// Source slice for `span`.
    #[must_use]
    pub fn text(&self, span: Span) -> &'a str {
        self.source().get(span.start..span.end).unwrap_or("")
    }

    /// 1-indexed `(line, column)` of a byte offset.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        self.lines.position(self.source(), offset)
    }

    /// Returns true if type information is available.
    #[must_use]
    pub fn has_type_info(&self) -> bool {
        self.oracle.is_some()
    }

    /// Asks the oracle for the type of `node`.
    #[must_use]
    pub fn type_of(&self, node: Node<'_>) -> Option<TypeInfo> {
        self.oracle?.type_of(self.tree, node)
    }

    /// Checks allow directives covering `offset` for a rule.
    ///
    /// Directive identifiers resolve through `rules`, so codes and former
    /// names work as well as current names.
    #[must_use]
    pub fn allowed(&self, offset: usize, rule_name: &str, rules: &RuleSet) -> AllowCheck {
        if self.allows.is_empty() {
            return AllowCheck::Denied;
        }
        let (line, _) = self.position(offset);
        self.allows.check(line, |id| {
            id == rule_name || rules.canonical_name(id) == Some(rule_name)
        })
    }
}

impl std::fmt::Debug for FileContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContext")
            .field("path", &self.path)
            .field("is_declaration_file", &self.is_declaration_file)
            .field("has_type_info", &self.has_type_info())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn tree(src: &str) -> SyntaxTree {
        let mut b = TreeBuilder::new(src);
        b.named(None, "program", None, Span::new(0, src.len()));
        b.finish().expect("valid tree")
    }

    #[test]
    fn detects_declaration_files() {
        let t = tree("");
        assert!(FileContext::new(Path::new("types/global.d.ts"), &t).is_declaration_file);
        assert!(!FileContext::new(Path::new("src/index.ts"), &t).is_declaration_file);
    }

    #[test]
    fn positions_and_text() {
        let t = tree("let a = 1;\nlet b = 2;");
        let ctx = FileContext::new(Path::new("a.ts"), &t);
        assert_eq!(ctx.position(15), (2, 5));
        assert_eq!(ctx.text(Span::new(11, 14)), "let");
        assert!(!ctx.has_type_info());
    }
}
