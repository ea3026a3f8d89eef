//! # Cursor API for Tree Navigation
//!
//! A [`TreeCursor`] walks a [`SyntaxTree`] by mutating its own state instead
//! of handing out new objects per step.
//!
//! - parent, child and sibling moves are amortised O(1)
//! - offsets are updated incrementally while moving between siblings
//! - the path from the root lives in an inline stack; no heap allocation
//!   happens until a walk gets deeper than the inline capacity
//!
//! Only visible elements are visited: hidden tokens such as whitespace and
//! layout markers are stepped over.
//!
//! ```rust
//! use grove::{GrammarRegistry, Parser};
//!
//! let grammar = GrammarRegistry::global().load("python")?;
//! let tree = Parser::new().parse(&grammar, "x = 1")?;
//!
//! let mut cursor = tree.cursor();
//! assert_eq!(cursor.current_node().kind(), "module");
//! assert!(cursor.goto_first_child());
//! assert_eq!(cursor.current_node().kind(), "expression_statement");
//! assert!(cursor.goto_parent());
//! assert!(!cursor.goto_parent());
//! # Ok::<(), grove::error::Error>(())
//! ```

use crate::syntax::{FieldId, GreenElementRef, Node, SyntaxTree, TextSize};
use crate::syntax::node::is_visible;
use smallvec::{SmallVec, smallvec};

/// One level of the cursor's path
#[derive(Debug, Clone, Copy)]
struct CursorFrame<'tree> {
    element: GreenElementRef<'tree>,
    offset: TextSize,
    /// Index among all children of the parent, hidden ones included
    raw_index: usize,
    /// Index among the visible children of the parent
    visible_index: usize,
    field: Option<FieldId>,
}

/// Stateful traversal handle over a [`SyntaxTree`]
///
/// Failed moves return `false` and leave the cursor where it was.
#[derive(Debug, Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree SyntaxTree,
    /// Navigation stack (root at index 0)
    stack: SmallVec<[CursorFrame<'tree>; 16]>,
}

/// Visible child indices from the root to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath(pub SmallVec<[usize; 16]>);

impl TreePath {
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl<'tree> TreeCursor<'tree> {
    /// Create a cursor at the root of `tree`
    #[must_use]
    pub fn new(tree: &'tree SyntaxTree) -> Self {
        Self {
            tree,
            stack: smallvec![CursorFrame {
                element: GreenElementRef::Node(tree.green()),
                offset: TextSize::zero(),
                raw_index: 0,
                visible_index: 0,
                field: None,
            }],
        }
    }

    fn current_frame(&self) -> &CursorFrame<'tree> {
        // The root frame is never popped
        &self.stack[self.stack.len() - 1]
    }

    fn parent_frame(&self) -> Option<&CursorFrame<'tree>> {
        self.stack.len().checked_sub(2).map(|i| &self.stack[i])
    }

    #[must_use]
    pub fn current_node(&self) -> Node<'tree> {
        let frame = self.current_frame();
        Node::new(self.tree, frame.element, frame.offset, frame.field)
    }

    #[must_use]
    pub fn current_field_name(&self) -> Option<&'tree str> {
        self.current_frame()
            .field
            .and_then(|field| self.tree.grammar().field_name(field))
    }

    /// Depth below the root (0 = root)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    #[must_use]
    pub fn is_at_root(&self) -> bool {
        self.stack.len() == 1
    }

    /// Move back to the root.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }

    /// Navigate to the first visible child.
    ///
    /// Returns `false` on leaves.
    pub fn goto_first_child(&mut self) -> bool {
        let frame = *self.current_frame();
        let mut offset = frame.offset;
        for (raw_index, child) in frame.element.children().iter().enumerate() {
            if is_visible(self.tree, child) {
                self.stack.push(CursorFrame {
                    element: child.as_ref(),
                    offset,
                    raw_index,
                    visible_index: 0,
                    field: frame.element.field_at(raw_index),
                });
                return true;
            }
            offset += child.text_len();
        }
        false
    }

    /// Navigate to the last visible child.
    pub fn goto_last_child(&mut self) -> bool {
        let frame = *self.current_frame();
        let mut offset = frame.offset;
        let mut last = None;
        let mut visible = 0;
        for (raw_index, child) in frame.element.children().iter().enumerate() {
            if is_visible(self.tree, child) {
                last = Some(CursorFrame {
                    element: child.as_ref(),
                    offset,
                    raw_index,
                    visible_index: visible,
                    field: frame.element.field_at(raw_index),
                });
                visible += 1;
            }
            offset += child.text_len();
        }
        match last {
            Some(child) => {
                self.stack.push(child);
                true
            }
            None => false,
        }
    }

    /// Navigate to the visible child at `index`.
    pub fn goto_child(&mut self, index: usize) -> bool {
        if !self.goto_first_child() {
            return false;
        }
        for _ in 0..index {
            if !self.goto_next_sibling() {
                self.stack.pop();
                return false;
            }
        }
        true
    }

    /// Navigate to the first visible child that extends past `byte`.
    ///
    /// Returns the child's index.
    pub fn goto_first_child_for_byte(&mut self, byte: TextSize) -> Option<usize> {
        if !self.goto_first_child() {
            return None;
        }
        loop {
            let frame = self.current_frame();
            if frame.offset + frame.element.text_len() > byte {
                return Some(frame.visible_index);
            }
            if !self.goto_next_sibling() {
                self.stack.pop();
                return None;
            }
        }
    }

    /// Navigate to the next visible sibling.
    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(parent) = self.parent_frame().copied() else {
            return false;
        };
        let frame = *self.current_frame();
        let siblings = parent.element.children();
        let mut offset = frame.offset + frame.element.text_len();
        for (raw_index, sibling) in siblings.iter().enumerate().skip(frame.raw_index + 1) {
            if is_visible(self.tree, sibling) {
                *self.top_mut() = CursorFrame {
                    element: sibling.as_ref(),
                    offset,
                    raw_index,
                    visible_index: frame.visible_index + 1,
                    field: parent.element.field_at(raw_index),
                };
                return true;
            }
            offset += sibling.text_len();
        }
        false
    }

    /// Navigate to the previous visible sibling.
    pub fn goto_prev_sibling(&mut self) -> bool {
        let Some(parent) = self.parent_frame().copied() else {
            return false;
        };
        let frame = *self.current_frame();
        let siblings = parent.element.children();
        let mut offset = frame.offset;
        for raw_index in (0..frame.raw_index).rev() {
            let sibling = &siblings[raw_index];
            offset -= sibling.text_len();
            if is_visible(self.tree, sibling) {
                *self.top_mut() = CursorFrame {
                    element: sibling.as_ref(),
                    offset,
                    raw_index,
                    visible_index: frame.visible_index.saturating_sub(1),
                    field: parent.element.field_at(raw_index),
                };
                return true;
            }
        }
        false
    }

    /// Navigate to the parent. Returns `false` at the root.
    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn path(&self) -> TreePath {
        TreePath(self.stack[1..].iter().map(|frame| frame.visible_index).collect())
    }

    /// Navigate to `path` from the root. On failure the cursor stays put.
    pub fn goto_path(&mut self, path: &TreePath) -> bool {
        let saved = self.stack.clone();
        self.reset();
        for &index in path.indices() {
            if !self.goto_child(index) {
                self.stack = saved;
                return false;
            }
        }
        true
    }

    fn top_mut(&mut self) -> &mut CursorFrame<'tree> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}

/// A node reached by [`Preorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'tree> {
    pub node: Node<'tree>,
    /// Depth relative to where the walk started
    pub depth: usize,
    pub field: Option<&'tree str>,
}

/// Depth-first pre-order walk built on a [`TreeCursor`]
///
/// The walk covers the subtree of the cursor's position when created.
#[derive(Debug, Clone)]
pub struct Preorder<'tree> {
    cursor: TreeCursor<'tree>,
    base: usize,
    done: bool,
}

impl<'tree> Preorder<'tree> {
    #[must_use]
    pub fn new(cursor: TreeCursor<'tree>) -> Self {
        let base = cursor.depth();
        Self {
            cursor,
            base,
            done: false,
        }
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            return;
        }
        while self.cursor.depth() > self.base {
            if self.cursor.goto_next_sibling() {
                return;
            }
            self.cursor.goto_parent();
        }
        self.done = true;
    }
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = Visit<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let visit = Visit {
            node: self.cursor.current_node(),
            depth: self.cursor.depth() - self.base,
            field: self.cursor.current_field_name(),
        };
        self.advance();
        Some(visit)
    }
}
