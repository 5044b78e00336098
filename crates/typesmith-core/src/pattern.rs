//! Structural tree-pattern queries.
//!
//! A [`Pattern`] is evaluated against a single node and may bind named
//! captures along the way. Patterns compose: kind and token tests, wildcards,
//! field navigation, boolean combinators and bounded quantifiers over a
//! node's significant children.
//!
//! ```ignore
//! // `enum X { ... }` with the name and body bound
//! let p = kind("enum_declaration")
//!     .field("name", any().capture("name"))
//!     .field("body", kind("enum_body").capture("body"));
//! ```

use crate::span::Span;
use crate::tree::{Node, NodeId};

/// A value bound by a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A node of the syntax tree.
    Node {
        /// Node id.
        id: NodeId,
        /// Node span.
        span: Span,
    },
    /// A computed text value.
    Text(String),
}

/// Named bindings produced by a matcher, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    entries: Vec<(&'static str, Binding)>,
}

impl Captures {
    /// Creates an empty capture set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a node. A later binding under the same name wins.
    pub fn bind_node(&mut self, name: &'static str, node: Node<'_>) {
        self.bind(
            name,
            Binding::Node {
                id: node.id(),
                span: node.span(),
            },
        );
    }

    /// Binds a computed text value.
    pub fn bind_text(&mut self, name: &'static str, text: impl Into<String>) {
        self.bind(name, Binding::Text(text.into()));
    }

    /// Builder form of [`Captures::bind_node`].
    #[must_use]
    pub fn with_node(mut self, name: &'static str, node: Node<'_>) -> Self {
        self.bind_node(name, node);
        self
    }

    /// Builder form of [`Captures::bind_text`].
    #[must_use]
    pub fn with_text(mut self, name: &'static str, text: impl Into<String>) -> Self {
        self.bind_text(name, text);
        self
    }

    fn bind(&mut self, name: &'static str, binding: Binding) {
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, binding));
    }

    /// Looks up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| b)
    }

    /// Node id bound under `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeId> {
        match self.get(name)? {
            Binding::Node { id, .. } => Some(*id),
            Binding::Text(_) => None,
        }
    }

    /// Span bound under `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<Span> {
        match self.get(name)? {
            Binding::Node { span, .. } => Some(*span),
            Binding::Text(_) => None,
        }
    }

    /// Text of the binding: the node's source slice or the computed value.
    #[must_use]
    pub fn text<'a>(&'a self, name: &str, source: &'a str) -> Option<&'a str> {
        match self.get(name)? {
            Binding::Node { span, .. } => source.get(span.start..span.end),
            Binding::Text(t) => Some(t),
        }
    }

    /// Binding names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

/// Renders `{name}` placeholders from captures.
///
/// Unknown placeholders are left verbatim; `{{` and `}}` escape braces.
#[must_use]
pub fn render(template: &str, captures: &Captures, source: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match tail.find('}') {
                Some(end) => {
                    let name = &tail[1..end];
                    match captures.text(name, source) {
                        Some(text) => out.push_str(text),
                        None => out.push_str(&tail[..=end]),
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// How many children must satisfy a quantified sub-pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Every child (vacuously true for no children).
    All,
    /// At least one child.
    Some,
    /// No child.
    None,
    /// At least `n` children.
    AtLeast(usize),
    /// At most `n` children.
    AtMost(usize),
    /// Exactly `n` children.
    Exactly(usize),
}

impl Quantifier {
    fn accepts(self, hits: usize, total: usize) -> bool {
        match self {
            Self::All => hits == total,
            Self::Some => hits > 0,
            Self::None => hits == 0,
            Self::AtLeast(n) => hits >= n,
            Self::AtMost(n) => hits <= n,
            Self::Exactly(n) => hits == n,
        }
    }
}

/// A plain function used as a pattern leaf.
#[derive(Clone, Copy)]
pub struct NodePredicate(pub fn(Node<'_>) -> bool);

impl std::fmt::Debug for NodePredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NodePredicate(..)")
    }
}

/// A structural predicate over one node.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Wildcard: any node.
    Any,
    /// Node of this kind.
    Kind(&'static str),
    /// Node whose source text equals this string.
    Text(&'static str),
    /// Node holding an anonymous token child of this kind (e.g. `"const"`).
    Token(&'static str),
    /// The child under `field` exists and matches.
    Field(&'static str, Box<Pattern>),
    /// The node has a parent and it matches.
    Parent(Box<Pattern>),
    /// Quantified test over significant (named, non-comment) children.
    Children(Quantifier, Box<Pattern>),
    /// Every sub-pattern matches.
    All(Vec<Pattern>),
    /// At least one sub-pattern matches (first match wins for captures).
    AnyOf(Vec<Pattern>),
    /// The sub-pattern does not match.
    Not(Box<Pattern>),
    /// Arbitrary node predicate.
    Predicate(NodePredicate),
    /// Binds the node under a name when the inner pattern matches.
    Capture(&'static str, Box<Pattern>),
}

/// Wildcard pattern.
#[must_use]
pub fn any() -> Pattern {
    Pattern::Any
}

/// Any node of kind `k`.
#[must_use]
pub fn kind(k: &'static str) -> Pattern {
    Pattern::Kind(k)
}

/// Any node whose kind is one of `kinds`.
#[must_use]
pub fn kinds(kinds: &[&'static str]) -> Pattern {
    Pattern::AnyOf(kinds.iter().map(|k| Pattern::Kind(*k)).collect())
}

/// Node whose text equals `t`.
#[must_use]
pub fn text(t: &'static str) -> Pattern {
    Pattern::Text(t)
}

/// Node with an anonymous `t` token child.
#[must_use]
pub fn token(t: &'static str) -> Pattern {
    Pattern::Token(t)
}

/// Node satisfying `f`.
#[must_use]
pub fn predicate(f: fn(Node<'_>) -> bool) -> Pattern {
    Pattern::Predicate(NodePredicate(f))
}

/// First matching alternative.
#[must_use]
pub fn any_of(patterns: Vec<Pattern>) -> Pattern {
    Pattern::AnyOf(patterns)
}

/// Negation.
#[must_use]
pub fn not(p: Pattern) -> Pattern {
    Pattern::Not(Box::new(p))
}

impl Pattern {
    /// Adds a conjunct.
    #[must_use]
    pub fn and(self, other: Pattern) -> Pattern {
        match self {
            Pattern::All(mut ps) => {
                ps.push(other);
                Pattern::All(ps)
            }
            p => Pattern::All(vec![p, other]),
        }
    }

    /// Requires the `name` field child to match `p`.
    #[must_use]
    pub fn field(self, name: &'static str, p: Pattern) -> Pattern {
        self.and(Pattern::Field(name, Box::new(p)))
    }

    /// Requires the parent to match `p`.
    #[must_use]
    pub fn parent(self, p: Pattern) -> Pattern {
        self.and(Pattern::Parent(Box::new(p)))
    }

    /// Requires `q` of the significant children to match `p`.
    #[must_use]
    pub fn children(self, q: Quantifier, p: Pattern) -> Pattern {
        self.and(Pattern::Children(q, Box::new(p)))
    }

    /// Requires the node text to equal `t`.
    #[must_use]
    pub fn with_text(self, t: &'static str) -> Pattern {
        self.and(Pattern::Text(t))
    }

    /// Requires an anonymous `t` token child.
    #[must_use]
    pub fn with_token(self, t: &'static str) -> Pattern {
        self.and(Pattern::Token(t))
    }

    /// Forbids an anonymous `t` token child.
    #[must_use]
    pub fn without_token(self, t: &'static str) -> Pattern {
        self.and(not(Pattern::Token(t)))
    }

    /// Requires `f` to hold.
    #[must_use]
    pub fn filter(self, f: fn(Node<'_>) -> bool) -> Pattern {
        self.and(Pattern::Predicate(NodePredicate(f)))
    }

    /// Binds the matched node under `name`.
    #[must_use]
    pub fn capture(self, name: &'static str) -> Pattern {
        Pattern::Capture(name, Box::new(self))
    }

    /// Evaluates the pattern, discarding captures.
    #[must_use]
    pub fn is_match(&self, node: Node<'_>) -> bool {
        self.matches(node, &mut Captures::new())
    }

    /// Evaluates the pattern, appending captures on success.
    ///
    /// On failure the capture set is left as it was before the call.
    pub fn matches(&self, node: Node<'_>, captures: &mut Captures) -> bool {
        let mark = captures.len();
        let ok = self.eval(node, captures);
        if !ok {
            captures.truncate(mark);
        }
        ok
    }

    fn eval(&self, node: Node<'_>, caps: &mut Captures) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Kind(k) => node.kind() == *k,
            Pattern::Text(t) => node.text() == *t,
            Pattern::Token(t) => node.has_token(t),
            Pattern::Field(name, p) => node
                .child_by_field(name)
                .is_some_and(|child| p.matches(child, caps)),
            Pattern::Parent(p) => node.parent().is_some_and(|parent| p.matches(parent, caps)),
            Pattern::Children(q, p) => {
                let mut total = 0;
                let mut hits = 0;
                for child in node.significant_children() {
                    total += 1;
                    if p.matches(child, caps) {
                        hits += 1;
                    }
                }
                q.accepts(hits, total)
            }
            Pattern::All(ps) => ps.iter().all(|p| p.matches(node, caps)),
            Pattern::AnyOf(ps) => ps.iter().any(|p| p.matches(node, caps)),
            Pattern::Not(p) => !p.is_match(node),
            Pattern::Predicate(NodePredicate(f)) => f(node),
            Pattern::Capture(name, p) => {
                if p.matches(node, caps) {
                    caps.bind_node(name, node);
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::tree::{SyntaxTree, TreeBuilder};

    // {a: "x", b: "y", c: 1}
    fn object_literal() -> SyntaxTree {
        let src = r#"{a: "x", b: "y", c: 1}"#;
        let mut b = TreeBuilder::new(src);
        let root = b.named(None, "program", None, Span::new(0, src.len()));
        let obj = b.named(Some(root), "object", None, Span::new(0, src.len()));
        let pairs = [
            ((1, 2), (4, 7), "string"),
            ((9, 10), (12, 15), "string"),
            ((17, 18), (20, 21), "number"),
        ];
        for (key, value, kind) in pairs {
            let pair = b.named(Some(obj), "pair", None, Span::new(key.0, value.1));
            b.named(Some(pair), "property_identifier", Some("key"), Span::new(key.0, key.1));
            b.named(Some(pair), kind, Some("value"), Span::new(value.0, value.1));
        }
        b.finish().expect("valid tree")
    }

    fn object(tree: &SyntaxTree) -> Node<'_> {
        tree.root().first_named_child().expect("object")
    }

    #[test]
    fn quantifiers_over_children() {
        let tree = object_literal();
        let string_valued = kind("pair").field("value", kind("string"));

        assert!(!kind("object")
            .children(Quantifier::All, string_valued.clone())
            .is_match(object(&tree)));
        assert!(kind("object")
            .children(Quantifier::AtLeast(2), string_valued.clone())
            .is_match(object(&tree)));
        assert!(kind("object")
            .children(Quantifier::Exactly(1), kind("pair").field("value", kind("number")))
            .is_match(object(&tree)));
        assert!(kind("object")
            .children(Quantifier::None, kind("spread_element"))
            .is_match(object(&tree)));
        assert!(!kind("object")
            .children(Quantifier::AtMost(1), string_valued)
            .is_match(object(&tree)));
    }

    #[test]
    fn captures_are_bound_and_rendered() {
        let tree = object_literal();
        let pair = object(&tree).first_named_child().expect("pair");
        let p = kind("pair")
            .field("key", any().capture("key"))
            .field("value", kind("string").capture("value"));
        let mut caps = Captures::new();
        assert!(p.matches(pair, &mut caps));
        assert_eq!(
            render("{key} => {value} {missing} {{x}}", &caps, tree.source()),
            r#"a => "x" {missing} {x}"#
        );
    }

    #[test]
    fn failed_match_rolls_back_captures() {
        let tree = object_literal();
        let pair = object(&tree).first_named_child().expect("pair");
        let p = kind("pair")
            .field("key", any().capture("key"))
            .field("value", kind("number"));
        let mut caps = Captures::new();
        assert!(!p.matches(pair, &mut caps));
        assert!(caps.is_empty());
    }

    #[test]
    fn negation_and_alternatives() {
        let tree = object_literal();
        let obj = object(&tree);
        assert!(kinds(&["array", "object"]).is_match(obj));
        assert!(not(kind("array")).is_match(obj));
        assert!(any().filter(|n| n.text().starts_with('{')).is_match(obj));
        assert!(kind("object").parent(kind("program")).is_match(obj));
    }

    #[test]
    fn text_bindings_render() {
        let caps = Captures::new().with_text("line", "12");
        assert_eq!(
            render("first declared on line {line}", &caps, ""),
            "first declared on line 12"
        );
    }
}
