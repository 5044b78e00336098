//! Rule to require return type annotations on exported functions.
//!
//! An exported signature is an API. Inferring its return type lets an edit
//! deep in the body change the contract seen by every importer.

use crate::util::is_exported_declaration;
use typesmith_core::{Captures, FileContext, Node, Rule, Severity};

/// Rule code for require-exported-return-type.
pub const CODE: &str = "TY010";

/// Rule name for require-exported-return-type.
pub const NAME: &str = "require-exported-return-type";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Requires an explicit return type on exported functions")
        .matches_with(find)
        .message("exported function `{name}` has no return type annotation")
        .help("annotate the return type so the public contract is explicit")
}

fn find(node: Node<'_>, _ctx: &FileContext<'_>) -> Option<Captures> {
    if node.child_by_field("return_type").is_some() || node.child_by_field("body").is_none() {
        return None;
    }
    let name = match node.kind() {
        "function_declaration" if is_exported_declaration(node) => node.child_by_field("name")?,
        "arrow_function" | "function_expression" => {
            let declarator = node
                .parent()
                .filter(|p| p.kind() == "variable_declarator")?;
            if declarator.child_by_field("value").map(Node::id) != Some(node.id())
                || !is_exported_declaration(declarator)
            {
                return None;
            }
            declarator.child_by_field("name")?
        }
        _ => return None,
    };
    Some(
        Captures::new()
            .with_node("name", name)
            .with_node("span", name),
    )
}
