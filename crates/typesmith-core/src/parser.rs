//! Collaborator interfaces: source parsers and type oracles.

use crate::error::ParseError;
use crate::tree::{Node, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Turns source text into a [`SyntaxTree`].
///
/// Implementations must be shareable across worker threads.
pub trait SourceParser: Send + Sync {
    /// Short language identifier (e.g. "typescript").
    fn language_id(&self) -> &'static str;

    /// File extensions handled, without the dot. Longest match wins, so
    /// `"d.ts"` may be listed alongside `"ts"`.
    fn extensions(&self) -> &[&'static str];

    /// Parses one file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when no usable tree can be produced.
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Returns true if this parser accepts `path`.
    fn handles(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions()
            .iter()
            .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
    }
}

/// A type as reported by an oracle, in source syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Printed type (e.g. `Promise<string>`).
    pub text: String,
}

impl TypeInfo {
    /// Wraps printed type text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Compares with an annotation's text, ignoring whitespace and a trailing
    /// semicolon.
    #[must_use]
    pub fn matches(&self, annotation: &str) -> bool {
        normalize(&self.text) == normalize(annotation)
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(';')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Answers type questions about nodes.
pub trait TypeOracle: Send + Sync {
    /// The type of `node`. For function-like nodes this is the inferred
    /// return type. `None` means the oracle cannot answer.
    fn type_of(&self, tree: &SyntaxTree, node: Node<'_>) -> Option<TypeInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::tree::TreeBuilder;

    struct Flat;

    impl SourceParser for Flat {
        fn language_id(&self) -> &'static str {
            "flat"
        }

        fn extensions(&self) -> &[&'static str] {
            &["ts", "d.ts"]
        }

        fn parse(&self, _path: &Path, source: &str) -> Result<SyntaxTree, ParseError> {
            let mut b = TreeBuilder::new(source);
            b.named(None, "program", None, Span::new(0, source.len()));
            Ok(b.finish()?)
        }
    }

    #[test]
    fn handles_by_extension() {
        assert!(Flat.handles(Path::new("src/a.ts")));
        assert!(Flat.handles(Path::new("types/a.d.ts")));
        assert!(!Flat.handles(Path::new("src/a.tsx")));
        assert!(!Flat.handles(Path::new(".ts")));
    }

    #[test]
    fn type_info_ignores_whitespace() {
        let t = TypeInfo::new("Promise<string | number>");
        assert!(t.matches("Promise< string|number >"));
        assert!(!t.matches("Promise<string>"));
    }
}
