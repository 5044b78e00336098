//! Rule to drop annotations the compiler infers from a literal initializer.
//!
//! Covers `let`/`const` declarators and parameters with a default value,
//! where the annotation is `string`, `number` or `boolean` and the
//! initializer is a literal of that type.

use crate::prefer_satisfies::declared_type;
use crate::util::literal_primitive;
use typesmith_core::pattern::{kind, kinds};
use typesmith_core::{Confidence, EditTemplate, Fixer, Node, Quantifier, Rule, Severity};

/// Rule code for no-inferrable-type-annotation.
pub const CODE: &str = "TY022";

/// Rule name for no-inferrable-type-annotation.
pub const NAME: &str = "no-inferrable-type-annotation";

/// Builds the rule.
#[must_use]
pub fn rule() -> Rule {
    Rule::new(NAME, CODE, Severity::Suggestion)
        .description("Removes annotations inferred from literal initializers")
        .matches(
            kinds(&["variable_declarator", "required_parameter"])
                .field(
                    "type",
                    kind("type_annotation")
                        .children(
                            Quantifier::Exactly(1),
                            kind("predefined_type").capture("type"),
                        )
                        .capture("annotation")
                        .capture("span"),
                )
                .filter(is_inferrable),
        )
        .message("type `{type}` is inferred from the initializer")
        .help("remove the annotation")
        .fixer(Fixer::Template {
            description: "Remove the `{type}` annotation",
            edits: vec![EditTemplate::Delete {
                target: "annotation",
            }],
            confidence: Confidence::High,
        })
}

fn is_inferrable(node: Node<'_>) -> bool {
    if node.kind() == "variable_declarator"
        && node.parent().map(Node::kind) != Some("lexical_declaration")
    {
        return false;
    }
    let (Some(ty), Some(value)) = (declared_type(node), node.child_by_field("value")) else {
        return false;
    };
    literal_primitive(value) == Some(ty.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};

    #[test]
    fn test_removes_inferrable_annotations() {
        let src = "const a: string = \"x\";\nlet n: number = -1;\nfunction f(flag: boolean = false) {}";
        assert_eq!(check(rule(), src).len(), 3);
        assert_eq!(
            fix(rule(), src),
            "const a = \"x\";\nlet n = -1;\nfunction f(flag = false) {}"
        );
    }

    #[test]
    fn test_keeps_meaningful_annotations() {
        let src = "let a: number = Number(x);\n\
                   const b: string | null = null;\n\
                   let c: number;\n\
                   const d: string = 1 as never;\n\
                   const e: boolean = !x;\n\
                   var f: number = 1;";
        assert!(check(rule(), src).is_empty());
    }
}
