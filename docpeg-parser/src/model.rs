//! AST model for the `AsciiDoc` subset.
//!
//! Every node carries a [`Location`], a half-open `[start, end)` span of
//! char offsets into the padded (and possibly remapped) source. The
//! document exclusively owns its tree: nodes are attached to exactly one
//! parent or discarded wholesale when a parse attempt backtracks.

use serde::Serialize;

/// A title depth in a document.
pub type TitleLevel = u8;

/// Errors raised when constructing model values by hand.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("title level {0} is outside the supported range 1..=5")]
    TitleLevelOutOfRange(TitleLevel),
}

/// A `Location` is a half-open char-offset span into the source text.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub struct Location {
    /// Offset of the first char the node's match consumed (inclusive).
    pub start: usize,
    /// Offset one past the last char the node's match consumed (exclusive).
    pub end: usize,
}

impl Location {
    /// Validates that this location satisfies the span invariants.
    ///
    /// Checks `start <= end` and `end <= source_len`.
    ///
    /// # Errors
    ///
    /// Returned as strings for easier debugging.
    pub fn validate(&self, source_len: usize) -> Result<(), String> {
        if self.start > self.end {
            return Err(format!("invalid span: start {} > end {}", self.start, self.end));
        }
        if self.end > source_len {
            return Err(format!(
                "end offset {} exceeds source length {source_len}",
                self.end
            ));
        }
        Ok(())
    }
}

/// The root of a parsed document. Exactly one per parse.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
    pub location: Location,
}

/// A heading. `level` is derived from the matched marker: the length of
/// the leading `=` run for one-line titles, or 1 (`=` underline) / 2
/// (`-` underline) for the two-line form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub level: TitleLevel,
    pub children: Vec<Node>,
    pub location: Location,
}

impl Title {
    /// Create an empty title at the given level.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TitleLevelOutOfRange`] unless `level` is in
    /// `1..=5`.
    pub fn new(level: TitleLevel) -> Result<Self, ModelError> {
        if !(1..=5).contains(&level) {
            return Err(ModelError::TitleLevelOutOfRange(level));
        }
        Ok(Self {
            level,
            children: Vec::new(),
            location: Location::default(),
        })
    }
}

/// One paragraph block.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub children: Vec<Node>,
    pub location: Location,
}

/// A semantically untagged grouping of children (the `SuperNode` role).
///
/// Groups a run of inline matches before a paragraph or title re-wraps
/// them; the serializer passes it through without emitting a tag.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Container {
    pub children: Vec<Node>,
    pub location: Location,
}

/// A literal text leaf. Its buffer is append-only while the enclosing
/// rule is still matching and immutable afterwards.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Text {
    pub content: String,
    pub location: Location,
}

impl Text {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            location: Location::default(),
        }
    }

    /// Fold a following sibling into this leaf: concatenate the buffers
    /// and extend the span to the sibling's end.
    pub(crate) fn append(&mut self, other: &Text) {
        self.content.push_str(&other.content);
        self.location.end = other.location.end;
    }
}

/// A childless, textless leaf carrying one symbolic kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simple {
    pub kind: SimpleKind,
    pub location: Location,
}

impl Simple {
    #[must_use]
    pub fn new(kind: SimpleKind) -> Self {
        Self {
            kind,
            location: Location::default(),
        }
    }
}

/// The closed set of symbolic leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum SimpleKind {
    Apostrophe,
    Ellipsis,
    Emdash,
    Endash,
    HRule,
    Linebreak,
    Nbsp,
}

/// A node in the document tree.
///
/// Children order is insertion order and renders left-to-right. After a
/// successful parse no container holds two adjacent [`Text`] children;
/// adjacent text leaves are merged during attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub enum Node {
    Document(Document),
    Title(Title),
    Paragraph(Paragraph),
    Container(Container),
    Text(Text),
    Simple(Simple),
}

#[allow(clippy::match_same_arms)]
impl Node {
    /// The span this node's match consumed.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Node::Document(node) => &node.location,
            Node::Title(node) => &node.location,
            Node::Paragraph(node) => &node.location,
            Node::Container(node) => &node.location,
            Node::Text(node) => &node.location,
            Node::Simple(node) => &node.location,
        }
    }

    pub(crate) fn location_mut(&mut self) -> &mut Location {
        match self {
            Node::Document(node) => &mut node.location,
            Node::Title(node) => &mut node.location,
            Node::Paragraph(node) => &mut node.location,
            Node::Container(node) => &mut node.location,
            Node::Text(node) => &mut node.location,
            Node::Simple(node) => &mut node.location,
        }
    }

    /// The node's children, in render order. Empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(node) => &node.children,
            Node::Title(node) => &node.children,
            Node::Paragraph(node) => &node.children,
            Node::Container(node) => &node.children,
            Node::Text(_) | Node::Simple(_) => &[],
        }
    }

    /// Mutable access to the children of container-capable nodes.
    /// `None` for leaves.
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document(node) => Some(&mut node.children),
            Node::Title(node) => Some(&mut node.children),
            Node::Paragraph(node) => Some(&mut node.children),
            Node::Container(node) => Some(&mut node.children),
            Node::Text(_) | Node::Simple(_) => None,
        }
    }
}
