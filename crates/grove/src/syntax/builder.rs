use crate::syntax::{FieldId, GreenElement, GreenNode, GreenToken, Symbol};
use compact_str::CompactString;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

/// Error that can occur when building a syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Builder must have exactly one root node, but found {stack_size} nodes on stack")]
    InvalidStackSize { stack_size: usize },

    #[error("finish_node() called without a matching start_node()")]
    UnmatchedFinishNode,

    #[error("token() called without a parent node. Call start_node() before adding tokens")]
    TokenWithoutParent,
}

/// A child waiting in an open node, with its field label if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub element: GreenElement,
    pub field: Option<FieldId>,
}

/// Position in the innermost open node, used to undo or regroup children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    depth: usize,
    len: usize,
}

impl Checkpoint {
    /// Index in the open node of the first child appended after this checkpoint
    #[must_use]
    pub const fn index(self) -> usize {
        self.len
    }
}

/// Builder for constructing green syntax trees
///
/// Besides plain `start_node`/`token`/`finish_node`, the builder supports
/// checkpoints so a backtracking parser can discard children it appended
/// (`rollback`), regroup them under a new node (`wrap_since`), or label them
/// with a field (`label_since`).
#[derive(Debug, Default)]
pub struct GreenNodeBuilder {
    stack: SmallVec<[NodeBuilder; 8]>,
    nodes_created: usize,
}

#[derive(Debug)]
struct NodeBuilder {
    kind: Symbol,
    children: Vec<Child>,
}

impl NodeBuilder {
    fn into_green(self) -> Arc<GreenNode> {
        let fields = self
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| Some((u32::try_from(i).ok()?, child.field?)))
            .collect();
        GreenNode::with_fields(
            self.kind,
            self.children.into_iter().map(|child| child.element),
            fields,
        )
    }
}

impl GreenNodeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: Symbol) {
        self.stack.push(NodeBuilder {
            kind,
            children: Vec::new(),
        });
    }

    /// Finish the current node and add it to its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if there's no node on the stack to finish.
    pub fn finish_node(&mut self) -> Result<(), BuilderError> {
        if self.stack.len() < 2 {
            return Err(BuilderError::UnmatchedFinishNode);
        }
        let node = self.stack.pop().ok_or(BuilderError::UnmatchedFinishNode)?;
        let green = node.into_green();
        self.nodes_created += 1;
        self.push(Child {
            element: GreenElement::Node(green),
            field: None,
        })
    }

    /// Drop the current node and everything appended to it.
    ///
    /// # Errors
    ///
    /// Returns an error if there's no node on the stack.
    pub fn abandon_node(&mut self) -> Result<(), BuilderError> {
        self.stack
            .pop()
            .map(drop)
            .ok_or(BuilderError::UnmatchedFinishNode)
    }

    /// Add a token to the current node.
    ///
    /// # Errors
    ///
    /// Returns an error if there's no parent node on the stack.
    pub fn token(&mut self, kind: Symbol, text: impl Into<CompactString>) -> Result<(), BuilderError> {
        self.push(Child {
            element: GreenElement::Token(GreenToken::new(kind, text)),
            field: None,
        })
    }

    /// Add a pre-built child to the current node.
    ///
    /// # Errors
    ///
    /// Returns an error if there's no parent node on the stack.
    pub fn push(&mut self, child: Child) -> Result<(), BuilderError> {
        self.stack
            .last_mut()
            .map(|parent| parent.children.push(child))
            .ok_or(BuilderError::TokenWithoutParent)
    }

    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            depth: self.stack.len(),
            len: self.stack.last().map_or(0, |node| node.children.len()),
        }
    }

    /// Discard children appended to the current node since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        debug_assert_eq!(checkpoint.depth, self.stack.len());
        if let Some(node) = self.stack.last_mut() {
            node.children.truncate(checkpoint.len);
        }
    }

    /// Children appended to the current node since `checkpoint`
    #[must_use]
    pub fn children_since(&self, checkpoint: Checkpoint) -> &[Child] {
        self.stack
            .last()
            .and_then(|node| node.children.get(checkpoint.len..))
            .unwrap_or(&[])
    }

    /// Label every child since `checkpoint` accepted by `filter` with `field`.
    /// Children that already carry a label keep it.
    pub fn label_since(
        &mut self,
        checkpoint: Checkpoint,
        field: FieldId,
        filter: impl Fn(&GreenElement) -> bool,
    ) {
        self.label_range(checkpoint.len, usize::MAX, field, filter);
    }

    /// Label children in `[from, to)` of the current node.
    pub fn label_range(
        &mut self,
        from: usize,
        to: usize,
        field: FieldId,
        filter: impl Fn(&GreenElement) -> bool,
    ) {
        if let Some(node) = self.stack.last_mut() {
            let to = to.min(node.children.len());
            for child in node.children.get_mut(from..to).unwrap_or_default() {
                if child.field.is_none() && filter(&child.element) {
                    child.field = Some(field);
                }
            }
        }
    }

    /// Change the kind of every child since `checkpoint` accepted by `filter`.
    pub fn relabel_since(
        &mut self,
        checkpoint: Checkpoint,
        kind: Symbol,
        filter: impl Fn(&GreenElement) -> bool,
    ) {
        if let Some(node) = self.stack.last_mut() {
            for child in node.children.get_mut(checkpoint.len..).unwrap_or_default() {
                if filter(&child.element) {
                    child.element = child.element.with_kind(kind);
                }
            }
        }
    }

    /// Move every child since `checkpoint` into a new finished node of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if there's no node on the stack.
    pub fn wrap_since(&mut self, checkpoint: Checkpoint, kind: Symbol) -> Result<(), BuilderError> {
        let parent = self.stack.last_mut().ok_or(BuilderError::TokenWithoutParent)?;
        let start = checkpoint.len.min(parent.children.len());
        let children = parent.children.split_off(start);
        let green = NodeBuilder { kind, children }.into_green();
        self.nodes_created += 1;
        self.push(Child {
            element: GreenElement::Node(green),
            field: None,
        })
    }

    /// Finish building the syntax tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder doesn't have exactly one root node on the stack.
    /// This typically means there are unmatched `start_node()`/`finish_node()` calls.
    pub fn finish(mut self) -> Result<Arc<GreenNode>, BuilderError> {
        if self.stack.len() != 1 {
            return Err(BuilderError::InvalidStackSize {
                stack_size: self.stack.len(),
            });
        }
        let root = self.stack.pop().ok_or(BuilderError::InvalidStackSize { stack_size: 0 })?;
        Ok(root.into_green())
    }

    /// Number of nodes finished or wrapped so far, including discarded ones
    #[must_use]
    pub const fn nodes_created(&self) -> usize {
        self.nodes_created
    }

    /// Number of children in the innermost open node
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.stack.last().map_or(0, |node| node.children.len())
    }

    /// Number of open nodes
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
