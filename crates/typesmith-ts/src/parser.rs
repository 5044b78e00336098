//! TypeScript source parser backed by tree-sitter.

use std::path::Path;
use std::sync::Arc;
use tree_sitter::{Language, Parser, Tree};
use typesmith_core::{ParseError, SourceParser, Span, SyntaxTree, TreeBuilder};

/// Grammar variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `.ts`, `.mts`, `.cts` and `.d.ts` files.
    TypeScript,
    /// `.tsx` files.
    Tsx,
}

impl Dialect {
    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parses TypeScript into a [`SyntaxTree`].
///
/// A fresh tree-sitter parser is created per call, so one instance can be
/// shared by every worker thread.
pub struct TypeScriptParser {
    dialect: Dialect,
    language: Language,
}

impl TypeScriptParser {
    /// Creates a parser for plain TypeScript.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dialect(Dialect::TypeScript)
    }

    /// Creates a parser for TSX.
    #[must_use]
    pub fn tsx() -> Self {
        Self::with_dialect(Dialect::Tsx)
    }

    /// Creates a parser for `dialect`.
    #[must_use]
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            language: dialect.language(),
        }
    }

    /// The grammar variant in use.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse_raw(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::new(format!("failed to load TypeScript grammar: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new("parser produced no tree"))
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeScriptParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeScriptParser")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl SourceParser for TypeScriptParser {
    fn language_id(&self) -> &'static str {
        match self.dialect {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }

    fn extensions(&self) -> &[&'static str] {
        match self.dialect {
            Dialect::TypeScript => &["ts", "mts", "cts", "d.ts"],
            Dialect::Tsx => &["tsx"],
        }
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, ParseError> {
        let tree = self.parse_raw(source)?;
        if tree.root_node().has_error() {
            let err = first_error(&tree, source);
            tracing::debug!("Syntax error in {}: {}", path.display(), err);
            return Err(err);
        }
        Ok(convert(&tree, source)?)
    }
}

/// Parsers for every supported dialect.
#[must_use]
pub fn default_parsers() -> Vec<Arc<dyn SourceParser>> {
    vec![
        Arc::new(TypeScriptParser::new()),
        Arc::new(TypeScriptParser::tsx()),
    ]
}

/// Copies the tree-sitter tree into the arena, parents before children.
fn convert(tree: &Tree, source: &str) -> Result<SyntaxTree, typesmith_core::TreeError> {
    let mut builder = TreeBuilder::new(source);
    let mut cursor = tree.walk();
    let mut parents = Vec::new();

    loop {
        let node = cursor.node();
        let id = builder.push(
            parents.last().copied(),
            node.kind(),
            cursor.field_name(),
            node.is_named(),
            Span::new(node.start_byte(), node.end_byte()),
        );
        if cursor.goto_first_child() {
            parents.push(id);
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return builder.finish();
            }
            parents.pop();
        }
    }
}

/// Locates the first `ERROR` or `MISSING` node in document order.
fn first_error(tree: &Tree, source: &str) -> ParseError {
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                let text = source
                    .get(node.start_byte()..node.end_byte())
                    .and_then(|t| t.split_whitespace().next())
                    .unwrap_or("");
                if text.is_empty() {
                    "unexpected end of input".to_string()
                } else {
                    format!("unexpected `{text}`")
                }
            };
            return ParseError::new(message).at(pos.row + 1, pos.column + 1);
        }
        // Only descend into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return ParseError::new("syntax error");
            }
        }
    }
}
