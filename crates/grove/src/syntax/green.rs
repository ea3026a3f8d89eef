use crate::syntax::{FieldId, Symbol, TextSize};
use compact_str::CompactString;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Immutable, shareable green tree node
///
/// Green nodes know their kind, their total text length and their children,
/// but not their position; offsets are computed while navigating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GreenNode {
    kind: Symbol,
    text_len: TextSize,
    has_error: bool,
    children: GreenChildren,
    /// Sparse field labels: (raw child index, field), sorted by index
    fields: SmallVec<[(u32, FieldId); 2]>,
}

/// Children storage optimized for different sizes
///
/// - Empty: No allocation needed
/// - One: Single child stored inline
/// - Inline: Small number of children stored inline (no heap allocation)
/// - Many: Large number of children stored in Arc for sharing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
enum GreenChildren {
    Empty,
    One(GreenElement),
    Inline(SmallVec<[GreenElement; 8]>),
    Many(Arc<[GreenElement]>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GreenElement {
    Node(Arc<GreenNode>),
    Token(GreenToken),
}

/// Borrowed view of either a node or a token
#[derive(Debug, Clone, Copy)]
pub enum GreenElementRef<'a> {
    Node(&'a GreenNode),
    Token(&'a GreenToken),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GreenToken {
    kind: Symbol,
    text: CompactString,
}

/// Threshold for switching from inline to Arc storage
const INLINE_CHILDREN_THRESHOLD: usize = 8;

impl GreenNode {
    /// Create a new green node; the text length is summed from the children.
    #[must_use]
    pub fn new<I>(kind: Symbol, children: I) -> Arc<Self>
    where
        I: IntoIterator<Item = GreenElement>,
    {
        Self::with_fields(kind, children, SmallVec::new())
    }

    /// Create a node whose children carry field labels.
    ///
    /// `fields` holds `(raw child index, field)` pairs; it is sorted here.
    #[must_use]
    pub fn with_fields<I>(
        kind: Symbol,
        children: I,
        mut fields: SmallVec<[(u32, FieldId); 2]>,
    ) -> Arc<Self>
    where
        I: IntoIterator<Item = GreenElement>,
    {
        let children: SmallVec<[GreenElement; 8]> = children.into_iter().collect();
        let text_len = children
            .iter()
            .fold(TextSize::zero(), |acc, child| acc + child.text_len());
        let has_error = kind.is_error() || children.iter().any(GreenElement::has_error);
        fields.sort_unstable_by_key(|(index, _)| *index);

        let children = match children.len() {
            0 => GreenChildren::Empty,
            1 => children
                .into_iter()
                .next()
                .map_or(GreenChildren::Empty, GreenChildren::One),
            2..=INLINE_CHILDREN_THRESHOLD => GreenChildren::Inline(children),
            _ => GreenChildren::Many(Arc::from(children.into_vec())),
        };

        Arc::new(Self {
            kind,
            text_len,
            has_error,
            children,
            fields,
        })
    }

    /// Copy of this node with a different kind; children are shared.
    #[must_use]
    pub fn with_kind(&self, kind: Symbol) -> Arc<Self> {
        Self::with_fields(kind, self.children().iter().cloned(), self.fields.clone())
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Symbol {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn text_len(&self) -> TextSize {
        self.text_len
    }

    /// Whether this node is an `ERROR` node or contains one
    #[inline]
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.has_error
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[GreenElement] {
        match &self.children {
            GreenChildren::Empty => &[],
            GreenChildren::One(child) => std::slice::from_ref(child),
            GreenChildren::Inline(children) => children,
            GreenChildren::Many(children) => children,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.children, GreenChildren::Empty)
    }

    /// Field label of the child at raw index `index`
    #[must_use]
    pub fn field_at(&self, index: usize) -> Option<FieldId> {
        let index = u32::try_from(index).ok()?;
        self.fields
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|pos| self.fields[pos].1)
    }

    /// All field labels as `(raw child index, field)` pairs
    #[must_use]
    pub fn fields(&self) -> &[(u32, FieldId)] {
        &self.fields
    }

    /// Iterate over child kinds without accessing full elements
    pub fn child_kinds(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.children().iter().map(GreenElement::kind)
    }
}

impl GreenToken {
    #[must_use]
    pub fn new(kind: Symbol, text: impl Into<CompactString>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Symbol {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn text_len(&self) -> TextSize {
        TextSize::of(&self.text)
    }
}

impl GreenElement {
    #[must_use]
    pub fn kind(&self) -> Symbol {
        match self {
            Self::Node(n) => n.kind(),
            Self::Token(t) => t.kind(),
        }
    }

    #[must_use]
    pub fn text_len(&self) -> TextSize {
        match self {
            Self::Node(n) => n.text_len(),
            Self::Token(t) => t.text_len(),
        }
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        match self {
            Self::Node(n) => n.has_error(),
            Self::Token(t) => t.kind().is_error(),
        }
    }

    #[must_use]
    pub fn as_ref(&self) -> GreenElementRef<'_> {
        match self {
            Self::Node(n) => GreenElementRef::Node(n),
            Self::Token(t) => GreenElementRef::Token(t),
        }
    }

    /// Same element relabelled with `kind`
    #[must_use]
    pub fn with_kind(&self, kind: Symbol) -> Self {
        match self {
            Self::Node(n) => Self::Node(n.with_kind(kind)),
            Self::Token(t) => Self::Token(GreenToken::new(kind, t.text.clone())),
        }
    }
}

impl<'a> GreenElementRef<'a> {
    #[must_use]
    pub const fn kind(self) -> Symbol {
        match self {
            Self::Node(n) => n.kind(),
            Self::Token(t) => t.kind(),
        }
    }

    #[must_use]
    pub fn text_len(self) -> TextSize {
        match self {
            Self::Node(n) => n.text_len(),
            Self::Token(t) => t.text_len(),
        }
    }

    #[must_use]
    pub fn children(self) -> &'a [GreenElement] {
        match self {
            Self::Node(n) => n.children(),
            Self::Token(_) => &[],
        }
    }

    #[must_use]
    pub fn field_at(self, index: usize) -> Option<FieldId> {
        match self {
            Self::Node(n) => n.field_at(index),
            Self::Token(_) => None,
        }
    }

    #[must_use]
    pub const fn has_error(self) -> bool {
        match self {
            Self::Node(n) => n.has_error(),
            Self::Token(t) => t.kind().is_error(),
        }
    }

    /// Address identity of the underlying element
    #[must_use]
    pub fn ptr_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Node(a), Self::Node(b)) => std::ptr::eq(a, b),
            (Self::Token(a), Self::Token(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}
