//! Arena-backed syntax tree handed to the engine by a parser adapter.
//!
//! The tree owns its source text and a flat vector of nodes. Parent links
//! are plain indices, so nodes never own their parents; they exist for
//! context lookups (enclosing scope, export wrapper, ...) only.

use crate::span::Span;
use std::fmt;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.node(NodeId::ROOT)
    }

    /// Handle for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.index() < self.nodes.len(), "node id out of range");
        Node { tree: self, id }
    }

    /// Handle for `id`, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds only an empty root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pre-order (document order) traversal from the root.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        self.root().descendants()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// A borrowed handle to one node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.tree, other.tree)
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}

impl<'t> Node<'t> {
    /// Arena id.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The tree this node lives in.
    #[must_use]
    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    /// Grammar kind (e.g. `"interface_declaration"`, or `"as"` for tokens).
    #[must_use]
    pub fn kind(self) -> &'static str {
        self.tree.data(self.id).kind
    }

    /// Field name under which the parent holds this node.
    #[must_use]
    pub fn field_name(self) -> Option<&'static str> {
        self.tree.data(self.id).field
    }

    /// Named nodes are grammar rules; anonymous nodes are literal tokens.
    #[must_use]
    pub fn is_named(self) -> bool {
        self.tree.data(self.id).named
    }

    /// Source span.
    #[must_use]
    pub fn span(self) -> Span {
        self.tree.data(self.id).span
    }

    /// Source text covered by this node.
    #[must_use]
    pub fn text(self) -> &'t str {
        let span = self.span();
        self.tree.source.get(span.start..span.end).unwrap_or("")
    }

    /// Parent node, if any.
    #[must_use]
    pub fn parent(self) -> Option<Node<'t>> {
        self.tree
            .data(self.id)
            .parent
            .map(|id| Node { tree: self.tree, id })
    }

    /// All children in order, tokens included.
    pub fn children(self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Named children in order.
    pub fn named_children(self) -> impl Iterator<Item = Node<'t>> + 't {
        self.children().filter(|c| c.is_named())
    }

    /// Named children minus comments; what quantifiers count.
    pub fn significant_children(self) -> impl Iterator<Item = Node<'t>> + 't {
        self.named_children().filter(|c| c.kind() != "comment")
    }

    /// First child stored under `field`.
    #[must_use]
    pub fn child_by_field(self, field: &str) -> Option<Node<'t>> {
        self.children().find(|c| c.field_name() == Some(field))
    }

    /// All children stored under `field`.
    pub fn children_by_field(self, field: &'t str) -> impl Iterator<Item = Node<'t>> + 't {
        self.children()
            .filter(move |c| c.field_name() == Some(field))
    }

    /// First named child.
    #[must_use]
    pub fn first_named_child(self) -> Option<Node<'t>> {
        self.named_children().next()
    }

    /// Returns true if an anonymous token child has exactly this text.
    #[must_use]
    pub fn has_token(self, token: &str) -> bool {
        self.children().any(|c| !c.is_named() && c.kind() == token)
    }

    /// Following sibling, tokens included.
    #[must_use]
    pub fn next_sibling(self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut iter = parent.children().skip_while(|c| c.id != self.id);
        iter.next();
        iter.next()
    }

    /// Preceding sibling, tokens included.
    #[must_use]
    pub fn prev_sibling(self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        parent.children().take_while(|c| c.id != self.id).last()
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = Node<'t>> + 't {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// This node followed by all of its descendants, in pre-order.
    #[must_use]
    pub fn descendants(self) -> Preorder<'t> {
        Preorder {
            tree: self.tree,
            stack: vec![self.id],
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.data(id).children.iter().rev().copied());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}

/// Errors detected while assembling a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No root node was pushed.
    #[error("tree has no root node")]
    Empty,

    /// A second parentless node was pushed.
    #[error("tree has more than one root")]
    MultipleRoots,

    /// A node's span leaves the source text.
    #[error("span {span} of `{kind}` exceeds source length {len}")]
    OutOfBounds {
        /// Node kind.
        kind: &'static str,
        /// Offending span.
        span: Span,
        /// Source length in bytes.
        len: usize,
    },

    /// A child's span leaves its parent's span.
    #[error("span {span} of `{kind}` escapes its parent")]
    EscapesParent {
        /// Node kind.
        kind: &'static str,
        /// Offending span.
        span: Span,
    },

    /// A span does not fall on character boundaries.
    #[error("span {span} of `{kind}` splits a character")]
    NotCharBoundary {
        /// Node kind.
        kind: &'static str,
        /// Offending span.
        span: Span,
    },
}

/// Incrementally assembles a [`SyntaxTree`].
///
/// Parser adapters push nodes parent-first; children keep the order in which
/// they were pushed.
#[derive(Debug)]
pub struct TreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
    error: Option<TreeError>,
}

impl TreeBuilder {
    /// Starts a tree over `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            error: None,
        }
    }

    /// Pushes a named node.
    pub fn named(
        &mut self,
        parent: Option<NodeId>,
        kind: &'static str,
        field: Option<&'static str>,
        span: Span,
    ) -> NodeId {
        self.push(parent, kind, field, true, span)
    }

    /// Pushes an anonymous token node.
    pub fn token(&mut self, parent: NodeId, kind: &'static str, span: Span) -> NodeId {
        self.push(Some(parent), kind, None, false, span)
    }

    /// Pushes a node. Validation errors are reported by [`TreeBuilder::finish`].
    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: &'static str,
        field: Option<&'static str>,
        named: bool,
        span: Span,
    ) -> NodeId {
        #[allow(clippy::cast_possible_truncation)]
        let id = NodeId(self.nodes.len() as u32);
        self.validate(parent, kind, span);
        self.nodes.push(NodeData {
            kind,
            field,
            named,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            if let Some(data) = self.nodes.get_mut(parent.index()) {
                data.children.push(id);
            }
        }
        id
    }

    fn validate(&mut self, parent: Option<NodeId>, kind: &'static str, span: Span) {
        if self.error.is_some() {
            return;
        }
        let len = self.source.len();
        self.error = if span.end > len {
            Some(TreeError::OutOfBounds { kind, span, len })
        } else if !self.source.is_char_boundary(span.start)
            || !self.source.is_char_boundary(span.end)
        {
            Some(TreeError::NotCharBoundary { kind, span })
        } else {
            match parent {
                None if !self.nodes.is_empty() => Some(TreeError::MultipleRoots),
                Some(p) => match self.nodes.get(p.index()) {
                    Some(data) if data.span.contains(span) => None,
                    _ => Some(TreeError::EscapesParent { kind, span }),
                },
                None => None,
            }
        };
    }

    /// Finishes the tree.
    ///
    /// # Errors
    ///
    /// Returns the first structural error encountered while pushing.
    pub fn finish(self) -> Result<SyntaxTree, TreeError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.nodes.is_empty() {
            return Err(TreeError::Empty);
        }
        Ok(SyntaxTree {
            source: self.source,
            nodes: self.nodes,
        })
    }
}
