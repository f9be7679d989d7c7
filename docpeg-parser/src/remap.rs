//! Offset translation for parsing extracted sub-regions of text.
//!
//! When a sub-region (quoted content, a list item body) is parsed on
//! its own, node spans come out in sub-region units. An [`OffsetMap`]
//! built while extracting the sub-region translates those spans back
//! into original-source units after the parse. Translation rewrites
//! offsets only; node identity and children order are untouched.

use crate::model::{Document, Node};

/// A table mapping sub-region char offsets to original-source offsets.
///
/// Covers `0..=len` of the sub-region so that exclusive end offsets
/// translate too. Offsets past the table (the parser's two padding
/// newlines can produce them) pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMap {
    table: Vec<usize>,
}

impl OffsetMap {
    #[must_use]
    pub fn from_table(table: Vec<usize>) -> Self {
        Self { table }
    }

    /// The no-op map for a sub-region of `len` chars.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self {
            table: (0..=len).collect(),
        }
    }

    #[must_use]
    pub fn translate(&self, offset: usize) -> usize {
        self.table.get(offset).copied().unwrap_or(offset)
    }
}

/// Rewrite every span in `document` through `map`.
pub fn translate_document(document: &mut Document, map: &OffsetMap) {
    document.location.start = map.translate(document.location.start);
    document.location.end = map.translate(document.location.end);
    for child in &mut document.children {
        translate_node(child, map);
    }
}

fn translate_node(node: &mut Node, map: &OffsetMap) {
    let location = node.location_mut();
    location.start = map.translate(location.start);
    location.end = map.translate(location.end);
    if let Some(children) = node.children_mut() {
        for child in children {
            translate_node(child, map);
        }
    }
}
