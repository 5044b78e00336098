//! # typesmith-ts
//!
//! Tree-sitter powered collaborators for `typesmith-core`:
//!
//! - [`TypeScriptParser`] converts tree-sitter TypeScript and TSX trees into
//!   the engine's [`SyntaxTree`](typesmith_core::SyntaxTree) arena
//! - [`LocalTypeOracle`] answers narrow type questions (inferred return types
//!   of literal-returning functions) without a type checker

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod oracle;
mod parser;

pub use oracle::LocalTypeOracle;
pub use parser::{default_parsers, Dialect, TypeScriptParser};
