//! Best-effort local type oracle.
//!
//! Answers only what can be read off the syntax of a single function: the
//! widened type of literal return values. Anything else is `None`, which the
//! engine treats as "cannot confirm".

use typesmith_core::scope::FUNCTION_LIKE;
use typesmith_core::{Node, SyntaxTree, TypeInfo, TypeOracle};

/// Infers return types of functions whose returns are all literals of one
/// primitive type, and widened types of literal initializers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTypeOracle;

impl LocalTypeOracle {
    /// Creates the oracle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TypeOracle for LocalTypeOracle {
    fn type_of(&self, _tree: &SyntaxTree, node: Node<'_>) -> Option<TypeInfo> {
        let text = if FUNCTION_LIKE.contains(&node.kind()) {
            return_type(node)?
        } else if node.kind() == "variable_declarator" {
            widened(node.child_by_field("value")?)?.to_string()
        } else {
            widened(node)?.to_string()
        };
        tracing::trace!("Inferred {} for {}", text, node.kind());
        Some(TypeInfo::new(text))
    }
}

fn return_type(func: Node<'_>) -> Option<String> {
    if func.kind() == "generator_function_declaration" || func.has_token("*") {
        return None;
    }
    let body = func.child_by_field("body")?;
    let inner = if body.kind() == "statement_block" {
        block_return_type(body)?
    } else {
        widened(body)?.to_string()
    };
    if func.has_token("async") {
        Some(format!("Promise<{inner}>"))
    } else {
        Some(inner)
    }
}

fn block_return_type(body: Node<'_>) -> Option<String> {
    let mut found: Option<&'static str> = None;
    let mut bare = false;
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        if node.id() != body.id() && is_nested_scope(node) {
            continue;
        }
        if node.kind() == "return_statement" {
            match node.significant_children().next() {
                None => bare = true,
                Some(value) => {
                    let ty = widened(value)?;
                    if found.is_some_and(|f| f != ty) {
                        return None;
                    }
                    found = Some(ty);
                }
            }
            continue;
        }
        stack.extend(node.named_children());
    }
    match (found, bare) {
        (None, _) => Some("void".to_string()),
        (Some(ty), false) => Some(ty.to_string()),
        (Some(_), true) => None,
    }
}

fn is_nested_scope(node: Node<'_>) -> bool {
    FUNCTION_LIKE.contains(&node.kind())
        || matches!(node.kind(), "class_declaration" | "class" | "abstract_class_declaration")
}

/// Widened primitive type of a literal expression.
fn widened(expr: Node<'_>) -> Option<&'static str> {
    match expr.kind() {
        "string" => Some("string"),
        "template_string" => {
            let interpolated = expr
                .named_children()
                .any(|c| c.kind() == "template_substitution");
            (!interpolated).then_some("string")
        }
        "number" => Some("number"),
        "true" | "false" => Some("boolean"),
        "null" => Some("null"),
        "undefined" => Some("undefined"),
        "parenthesized_expression" => widened(expr.first_named_child()?),
        "unary_expression" => {
            let operand = expr.child_by_field("argument")?;
            if expr.has_token("!") {
                Some("boolean")
            } else if expr.has_token("-") || expr.has_token("+") {
                (widened(operand)? == "number").then_some("number")
            } else {
                None
            }
        }
        _ => None,
    }
}
