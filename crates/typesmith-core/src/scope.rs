//! Per-file scope index built before matching.
//!
//! Maps each lexical scope to the declarations it holds, records whether a
//! declaration sits in an ambient block, and counts how often each type
//! parameter of a function-like owner is referenced.

use crate::span::Span;
use crate::tree::{Node, NodeId, SyntaxTree};
use std::collections::HashMap;

/// Kind of a named declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `interface X {}`
    Interface,
    /// `type X = ...`
    TypeAlias,
    /// `class X {}`
    Class,
    /// `enum X {}`
    Enum,
    /// `function x() {}` or an overload signature.
    Function,
    /// `namespace X {}`
    Namespace,
}

impl DeclKind {
    fn from_kind(kind: &str) -> Option<Self> {
        Some(match kind {
            "interface_declaration" => Self::Interface,
            "type_alias_declaration" => Self::TypeAlias,
            "class_declaration" | "abstract_class_declaration" => Self::Class,
            "enum_declaration" => Self::Enum,
            "function_declaration" | "function_signature" => Self::Function,
            "internal_module" => Self::Namespace,
            _ => return None,
        })
    }

    /// Interfaces and type aliases: the kinds whose repetition is checked.
    #[must_use]
    pub fn is_type_declaration(self) -> bool {
        matches!(self, Self::Interface | Self::TypeAlias)
    }
}

/// One named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSite {
    /// Declared name.
    pub name: String,
    /// Declaration kind.
    pub kind: DeclKind,
    /// Declaration node.
    pub node: NodeId,
    /// Span of the name.
    pub name_span: Span,
    /// Enclosing scope block (`program` or `statement_block`).
    pub scope: NodeId,
    /// Declared directly inside `declare module`, `declare global` or
    /// `declare namespace`.
    pub ambient: bool,
    /// Wrapped in an `export` statement.
    pub exported: bool,
}

/// Reference counts for one type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericUsage {
    /// The function-like node declaring the parameter.
    pub owner: NodeId,
    /// The `type_parameter` node.
    pub param: NodeId,
    /// Parameter name.
    pub name: String,
    /// References in the parameter list, return type and sibling constraints.
    pub signature_refs: usize,
    /// References in the return type alone.
    pub return_refs: usize,
    /// References in the body.
    pub body_refs: usize,
}

/// Node kinds that own a parameter list and may declare type parameters.
pub const FUNCTION_LIKE: &[&str] = &[
    "function_declaration",
    "function_signature",
    "function_expression",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
    "method_signature",
    "abstract_method_signature",
    "call_signature",
    "construct_signature",
    "function_type",
];

/// Scope index for one file.
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    sites: Vec<DeclarationSite>,
    by_scope: HashMap<(NodeId, String), Vec<usize>>,
    by_node: HashMap<NodeId, usize>,
    generics: HashMap<NodeId, GenericUsage>,
}

impl ScopeIndex {
    /// Builds the index in one pre-order pass.
    #[must_use]
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut index = Self::default();
        for node in tree.preorder() {
            if let Some(kind) = DeclKind::from_kind(node.kind()) {
                index.add_site(node, kind);
            }
            if FUNCTION_LIKE.contains(&node.kind()) {
                index.add_generics(node);
            }
        }
        index
    }

    fn add_site(&mut self, node: Node<'_>, kind: DeclKind) {
        let Some(name) = node.child_by_field("name") else {
            return;
        };
        let Some(scope) = enclosing_scope(node) else {
            return;
        };
        let site = DeclarationSite {
            name: name.text().to_string(),
            kind,
            node: node.id(),
            name_span: name.span(),
            scope: scope.id(),
            ambient: is_ambient_block(scope),
            exported: is_exported(node),
        };
        let i = self.sites.len();
        self.by_scope
            .entry((site.scope, site.name.clone()))
            .or_default()
            .push(i);
        self.by_node.insert(site.node, i);
        self.sites.push(site);
    }

    fn add_generics(&mut self, owner: Node<'_>) {
        let Some(params) = owner.child_by_field("type_parameters") else {
            return;
        };
        let type_params: Vec<Node<'_>> = params
            .named_children()
            .filter(|n| n.kind() == "type_parameter")
            .collect();
        for &param in &type_params {
            let Some(name) = param.child_by_field("name") else {
                continue;
            };
            let name = name.text();
            let count = |field: &str| {
                owner
                    .child_by_field(field)
                    .map_or(0, |n| count_type_refs(n, name))
            };
            let sibling_refs: usize = type_params
                .iter()
                .filter(|p| p.id() != param.id())
                .flat_map(|p| [p.child_by_field("constraint"), p.child_by_field("value")])
                .flatten()
                .map(|n| count_type_refs(n, name))
                .sum();
            let return_refs = count("return_type");
            let signature_refs = count("parameters") + return_refs + sibling_refs;
            self.generics.insert(
                param.id(),
                GenericUsage {
                    owner: owner.id(),
                    param: param.id(),
                    name: name.to_string(),
                    signature_refs,
                    return_refs,
                    body_refs: count("body"),
                },
            );
        }
    }

    /// Every indexed declaration in document order.
    #[must_use]
    pub fn sites(&self) -> &[DeclarationSite] {
        &self.sites
    }

    /// The site declared by `node`.
    #[must_use]
    pub fn site(&self, node: NodeId) -> Option<&DeclarationSite> {
        self.by_node.get(&node).map(|&i| &self.sites[i])
    }

    /// Declarations of `name` in `scope`, in document order.
    pub fn declarations<'a>(
        &'a self,
        scope: NodeId,
        name: &str,
    ) -> impl Iterator<Item = &'a DeclarationSite> + 'a {
        self.by_scope
            .get(&(scope, name.to_string()))
            .into_iter()
            .flatten()
            .map(|&i| &self.sites[i])
    }

    /// Declarations sharing the name and scope of `node`, itself included.
    pub fn siblings_of(&self, node: NodeId) -> Vec<&DeclarationSite> {
        match self.site(node) {
            Some(site) => self.declarations(site.scope, &site.name).collect(),
            None => Vec::new(),
        }
    }

    /// Usage counts for a `type_parameter` node.
    #[must_use]
    pub fn generic(&self, param: NodeId) -> Option<&GenericUsage> {
        self.generics.get(&param)
    }
}

/// Nearest `program` or `statement_block` above `node`.
#[must_use]
pub fn enclosing_scope(node: Node<'_>) -> Option<Node<'_>> {
    node.ancestors()
        .find(|a| matches!(a.kind(), "program" | "statement_block"))
}

/// Returns true if `block` is the body of an ambient declaration.
#[must_use]
pub fn is_ambient_block(block: Node<'_>) -> bool {
    block.kind() == "statement_block"
        && block
            .ancestors()
            .take_while(|a| a.kind() != "statement_block" || is_namespace_body(*a))
            .any(|a| matches!(a.kind(), "ambient_declaration" | "module"))
}

fn is_namespace_body(block: Node<'_>) -> bool {
    block
        .parent()
        .is_some_and(|p| matches!(p.kind(), "internal_module" | "module"))
}

/// Returns true if any ancestor is an ambient declaration.
#[must_use]
pub fn in_ambient_context(node: Node<'_>) -> bool {
    node.ancestors()
        .any(|a| matches!(a.kind(), "ambient_declaration" | "module"))
}

/// Returns true if `node` is wrapped in an `export` statement.
#[must_use]
pub fn is_exported(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| p.kind() == "export_statement")
}

/// Counts `type_identifier` references to `name` below `root`.
///
/// Qualified names (`Ns.T`) do not count, and subtrees that redeclare
/// `name` as their own type parameter are skipped.
#[must_use]
pub fn count_type_refs(root: Node<'_>, name: &str) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.id() != root.id() && shadows(node, name) {
            continue;
        }
        if node.kind() == "type_identifier"
            && node.text() == name
            && node.parent().map(Node::kind) != Some("nested_type_identifier")
        {
            count += 1;
        }
        stack.extend(node.named_children());
    }
    count
}

fn shadows(node: Node<'_>, name: &str) -> bool {
    FUNCTION_LIKE.contains(&node.kind())
        && node.child_by_field("type_parameters").is_some_and(|tp| {
            tp.named_children().any(|p| {
                p.kind() == "type_parameter"
                    && p.child_by_field("name").map(Node::text) == Some(name)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    // declare global { interface W {} }
    // interface A {}
    // interface A {}
    fn merging_tree() -> SyntaxTree {
        let src = "declare global { interface W {} }\ninterface A {}\ninterface A {}";
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        let amb = b.named(Some(root), "ambient_declaration", None, Span::new(0, 33));
        b.token(amb, "declare", Span::new(0, 7));
        b.token(amb, "global", Span::new(8, 14));
        let block = b.named(Some(amb), "statement_block", None, Span::new(15, 33));
        let w = b.named(Some(block), "interface_declaration", None, Span::new(17, 31));
        b.named(Some(w), "type_identifier", Some("name"), Span::new(27, 28));
        for start in [34, 49] {
            let a = b.named(
                Some(root),
                "interface_declaration",
                None,
                Span::new(start, start + 14),
            );
            b.named(
                Some(a),
                "type_identifier",
                Some("name"),
                Span::new(start + 10, start + 11),
            );
        }
        b.finish().expect("valid tree")
    }

    #[test]
    fn groups_declarations_by_scope() {
        let tree = merging_tree();
        let index = ScopeIndex::build(&tree);
        assert_eq!(index.sites().len(), 3);
        let w = &index.sites()[0];
        assert_eq!(w.name, "W");
        assert!(w.ambient);
        let a: Vec<_> = index.declarations(NodeId::ROOT, "A").collect();
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|s| !s.ambient && s.kind == DeclKind::Interface));
        assert_eq!(index.siblings_of(a[1].node).len(), 2);
    }

    // function f<T>(x: T): T {}
    #[test]
    fn counts_type_parameter_references() {
        let src = "function f<T>(x: T): T {}";
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, 25));
        let f = b.named(Some(root), "function_declaration", None, Span::new(0, 25));
        b.named(Some(f), "identifier", Some("name"), Span::new(9, 10));
        let tps = b.named(Some(f), "type_parameters", Some("type_parameters"), Span::new(10, 13));
        let tp = b.named(Some(tps), "type_parameter", None, Span::new(11, 12));
        b.named(Some(tp), "type_identifier", Some("name"), Span::new(11, 12));
        let params = b.named(Some(f), "formal_parameters", Some("parameters"), Span::new(13, 19));
        let p = b.named(Some(params), "required_parameter", None, Span::new(14, 18));
        b.named(Some(p), "identifier", Some("pattern"), Span::new(14, 15));
        let ann = b.named(Some(p), "type_annotation", Some("type"), Span::new(15, 18));
        b.named(Some(ann), "type_identifier", None, Span::new(17, 18));
        let ret = b.named(Some(f), "type_annotation", Some("return_type"), Span::new(19, 22));
        b.named(Some(ret), "type_identifier", None, Span::new(21, 22));
        b.named(Some(f), "statement_block", Some("body"), Span::new(23, 25));
        let tree = b.finish().expect("valid tree");

        let index = ScopeIndex::build(&tree);
        let usage = index.generic(tp).expect("indexed");
        assert_eq!(usage.name, "T");
        assert_eq!(usage.signature_refs, 2);
        assert_eq!(usage.return_refs, 1);
        assert_eq!(usage.body_refs, 0);
    }
}
