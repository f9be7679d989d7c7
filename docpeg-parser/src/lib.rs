//! A backtracking PEG parser for a subset of `AsciiDoc`.
//!
//! [`parse`] interprets the grammar directly over the source chars,
//! building the AST on a shared value stack as matching proceeds, and
//! returns the [`Document`] root. Rendering lives in the companion HTML
//! converter crate.
//!
//! The source is padded with two trailing newlines before parsing so
//! the newline-anchored rules always see a terminated final block. Node
//! spans are char offsets into that padded text; [`remap`] translates
//! them when a sub-region of a larger source was parsed.
//!
//! A parse is single-threaded and synchronous. Run one parse at a time
//! per call; for concurrent parsing, make concurrent `parse` calls,
//! each call owns its own machine.

use tracing::instrument;

mod engine;
mod error;
mod grammar;
mod model;
mod options;
pub mod remap;

#[cfg(test)]
mod proptests;

use engine::{Halt, Machine, Value};

pub use error::Error;
pub use model::{
    Container, Document, Location, ModelError, Node, Paragraph, Simple, SimpleKind, Text, Title,
    TitleLevel,
};
pub use options::{DEFAULT_MAX_PARSE_TIME, Options};

use remap::OffsetMap;

/// Parse `text` into a document tree.
///
/// # Errors
///
/// [`Error::TimedOut`] when the parse exceeds `options.max_parse_time`;
/// [`Error::Internal`] when the grammar fails to consume the input or
/// corrupts its own stack (a bug, not a property of the input).
#[instrument(skip(text), fields(len = text.len()))]
pub fn parse(text: &str, options: &Options) -> Result<Document, Error> {
    let mut padded: Vec<char> = text.chars().collect();
    padded.extend(['\n', '\n']);
    tracing::debug!(padded_len = padded.len(), "starting parse");

    let mut machine = Machine::new(&padded, options.max_parse_time);
    let matched = match grammar::document(&mut machine) {
        Ok(matched) => matched,
        Err(Halt::Timeout) => return Err(Error::TimedOut),
        Err(Halt::Corrupted(context)) => {
            return Err(Error::internal(machine.pos(), context));
        }
    };
    if !matched || !machine.at_end() {
        return Err(Error::internal(
            machine.pos(),
            format!("unconsumed input near {:?}", machine.context_snippet(24)),
        ));
    }

    let offset = machine.pos();
    if machine.stack_len() != 1 {
        return Err(Error::internal(
            offset,
            format!(
                "expected one root value after parsing, found {}",
                machine.stack_len()
            ),
        ));
    }
    let mut stack = machine.into_stack();
    if let Some(Value::Node(Node::Document(document))) = stack.pop() {
        tracing::trace!(children = document.children.len(), "parse finished");
        Ok(document)
    } else {
        Err(Error::internal(offset, "root value is not a document"))
    }
}

/// Parse an extracted sub-region and translate the resulting spans back
/// to original-source offsets through `map`.
///
/// # Errors
///
/// Same conditions as [`parse`].
pub fn parse_remapped(text: &str, map: &OffsetMap, options: &Options) -> Result<Document, Error> {
    let mut document = parse(text, options)?;
    remap::translate_document(&mut document, map);
    Ok(document)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_returns_the_document_root() {
        let document = parse("== My Title", &Options::default()).unwrap();
        assert_eq!(document.children.len(), 1);
        assert!(matches!(document.children.first(), Some(Node::Title(_))));
    }

    #[test]
    fn empty_input_parses_to_an_empty_document() {
        let document = parse("", &Options::default()).unwrap();
        assert!(document.children.is_empty());
    }

    #[test]
    fn zero_budget_times_out_instead_of_crashing() {
        let input = "lots of text\n".repeat(200);
        let outcome = parse(&input, &Options::new(Duration::ZERO));
        assert_eq!(outcome, Err(Error::TimedOut));
    }

    #[test]
    fn remapped_parse_translates_spans() {
        let map = remap::OffsetMap::from_table((20..=28).collect());
        let document = parse_remapped("My Title", &map, &Options::default()).unwrap();
        let Some(Node::Paragraph(paragraph)) = document.children.first() else {
            panic!("expected a paragraph");
        };
        assert_eq!(paragraph.location.start, 20);
    }
}
