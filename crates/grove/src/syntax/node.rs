use crate::source::Point;
use crate::syntax::{FieldId, GreenElement, GreenElementRef, Symbol, SyntaxTree, TextRange, TextSize};
use std::fmt;

/// A positioned view of one element in a [`SyntaxTree`]
///
/// Nodes are cheap copies: a borrowed green element plus its absolute
/// offset and field label. Two nodes are equal when they are the same
/// element at the same position of the same tree.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree SyntaxTree,
    element: GreenElementRef<'tree>,
    offset: TextSize,
    field: Option<FieldId>,
}

impl<'tree> Node<'tree> {
    pub(crate) const fn new(
        tree: &'tree SyntaxTree,
        element: GreenElementRef<'tree>,
        offset: TextSize,
        field: Option<FieldId>,
    ) -> Self {
        Self {
            tree,
            element,
            offset,
            field,
        }
    }

    /// Type name, e.g. `function_definition`, `identifier` or `(`
    #[must_use]
    pub fn kind(&self) -> &'tree str {
        self.tree.grammar().symbol_name(self.symbol())
    }

    #[must_use]
    pub const fn symbol(&self) -> Symbol {
        self.element.kind()
    }

    #[must_use]
    pub const fn green(&self) -> GreenElementRef<'tree> {
        self.element
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.element.text_len())
    }

    #[must_use]
    pub const fn start_byte(&self) -> TextSize {
        self.offset
    }

    #[must_use]
    pub fn end_byte(&self) -> TextSize {
        self.range().end()
    }

    #[must_use]
    pub fn start_point(&self) -> Point {
        self.tree.source().point(self.offset)
    }

    #[must_use]
    pub fn end_point(&self) -> Point {
        self.tree.source().point(self.end_byte())
    }

    /// Source text covered by this node
    #[must_use]
    pub fn text(&self) -> &'tree str {
        let range: std::ops::Range<usize> = self.range().into();
        self.tree.text().get(range).unwrap_or_default()
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        self.tree.grammar().is_named(self.symbol())
    }

    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.tree.grammar().is_extra(self.symbol())
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.symbol().is_error()
    }

    /// Whether this node is or contains an `ERROR`
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.element.has_error()
    }

    /// Field name this node carries inside its parent
    #[must_use]
    pub fn field_name(&self) -> Option<&'tree str> {
        self.field
            .and_then(|field| self.tree.grammar().field_name(field))
    }

    #[must_use]
    pub const fn field(&self) -> Option<FieldId> {
        self.field
    }

    /// Visible children in order
    #[must_use]
    pub fn children(&self) -> Children<'tree> {
        Children {
            tree: self.tree,
            parent: self.element,
            index: 0,
            offset: self.offset,
        }
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<Self> {
        self.children().nth(index)
    }

    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.children().filter(Self::is_named).count()
    }

    /// Field name of the visible child at `index`
    #[must_use]
    pub fn field_name_of(&self, index: usize) -> Option<&'tree str> {
        self.child(index).and_then(|child| child.field_name())
    }

    /// First visible child labelled `name`
    #[must_use]
    pub fn child_by_field_name(&self, name: &str) -> Option<Self> {
        let field = self.tree.grammar().field_id(name)?;
        self.children().find(|child| child.field == Some(field))
    }

    /// All visible children labelled `name`
    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Self> + use<'tree> {
        let field = self.tree.grammar().field_id(name);
        self.children()
            .filter(move |child| field.is_some() && child.field == field)
    }

    #[must_use]
    pub const fn tree(&self) -> &'tree SyntaxTree {
        self.tree
    }

    /// S-expression of the named nodes under this one, with field labels:
    /// `(call function: (identifier) arguments: (argument_list (string)))`
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind());
        for child in self.children().filter(Self::is_named) {
            out.push(' ');
            if let Some(field) = child.field_name() {
                out.push_str(field);
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.element.ptr_eq(other.element)
            && self.tree.same_tree(other.tree)
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.range())
    }
}

/// Iterator over the visible children of a node
#[derive(Clone)]
pub struct Children<'tree> {
    tree: &'tree SyntaxTree,
    parent: GreenElementRef<'tree>,
    /// Raw index of the next child to look at
    index: usize,
    offset: TextSize,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let children = self.parent.children();
        while let Some(element) = children.get(self.index) {
            let raw = self.index;
            let offset = self.offset;
            self.index += 1;
            self.offset += element.text_len();
            if is_visible(self.tree, element) {
                return Some(Node::new(
                    self.tree,
                    element.as_ref(),
                    offset,
                    self.parent.field_at(raw),
                ));
            }
        }
        None
    }
}

impl fmt::Debug for Children<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Hidden tokens (whitespace, layout) are stored but never shown
#[inline]
pub(crate) fn is_visible(tree: &SyntaxTree, element: &GreenElement) -> bool {
    tree.grammar().is_visible(element.kind())
}
