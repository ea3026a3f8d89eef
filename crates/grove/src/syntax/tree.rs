use crate::error::LexerError;
use crate::grammar::Grammar;
use crate::parser::ParseMetrics;
use crate::source::SourceBuffer;
use crate::syntax::{GreenElementRef, GreenNode, Node, Preorder, TextSize, TreeCursor};
use std::sync::Arc;

/// Immutable concrete syntax tree
///
/// A tree owns its green root, the source it was parsed from and the
/// grammar that parsed it. Cloning is cheap and trees can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    inner: Arc<TreeData>,
}

#[derive(Debug)]
struct TreeData {
    root: Arc<GreenNode>,
    source: SourceBuffer,
    grammar: Arc<Grammar>,
    lexer_errors: Vec<LexerError>,
    metrics: ParseMetrics,
}

impl SyntaxTree {
    pub(crate) fn new(
        root: Arc<GreenNode>,
        source: SourceBuffer,
        grammar: Arc<Grammar>,
        lexer_errors: Vec<LexerError>,
        metrics: ParseMetrics,
    ) -> Self {
        debug_assert_eq!(root.text_len(), source.len());
        Self {
            inner: Arc::new(TreeData {
                root,
                source,
                grammar,
                lexer_errors,
                metrics,
            }),
        }
    }

    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::new(
            self,
            GreenElementRef::Node(&self.inner.root),
            TextSize::zero(),
            None,
        )
    }

    #[must_use]
    pub fn cursor(&self) -> TreeCursor<'_> {
        TreeCursor::new(self)
    }

    /// Depth-first walk over every visible node
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self.cursor())
    }

    #[must_use]
    pub fn green(&self) -> &Arc<GreenNode> {
        &self.inner.root
    }

    #[must_use]
    pub fn source(&self) -> &SourceBuffer {
        &self.inner.source
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.inner.source.text()
    }

    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.inner.grammar
    }

    #[must_use]
    pub fn metrics(&self) -> &ParseMetrics {
        &self.inner.metrics
    }

    /// Whether the tree contains any `ERROR` node or token
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.inner.root.has_error()
    }

    /// `ERROR` nodes, in document order
    pub fn errors(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.preorder()
            .map(|visit| visit.node)
            .filter(Node::is_error)
    }

    #[must_use]
    pub fn lexer_errors(&self) -> &[LexerError] {
        &self.inner.lexer_errors
    }

    pub(crate) fn same_tree(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
