//! HTML converter for the docpeg `AsciiDoc` subset.
//!
//! Rendering is a pure function of the tree: the same [`Document`]
//! always yields the same HTML. [`to_html`] bundles parse and render,
//! turning a parse timeout into `None` rather than an error.

use std::io::Write;

use docpeg_parser::{Document, Options};
use tracing::instrument;

mod escape;
mod visitor;

pub use escape::escape_html;

use visitor::Render;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] docpeg_parser::Error),

    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// A node variant or symbolic kind this converter does not handle.
    /// Signals a construction bug upstream, not malformed input.
    #[error("unexpected node in document tree: {0}")]
    UnexpectedNode(String),
}

/// Render a parsed document to an HTML string.
///
/// # Errors
///
/// Fails only on writer errors or an unrecognized node variant.
pub fn render(document: &Document) -> Result<String, Error> {
    let mut output = Vec::new();
    render_to_writer(document, &mut output)?;
    Ok(String::from_utf8(output)?)
}

/// Render a parsed document into any writer.
///
/// # Errors
///
/// Fails only on writer errors or an unrecognized node variant.
pub fn render_to_writer<W: Write>(document: &Document, w: &mut W) -> Result<(), Error> {
    document.render(w)
}

/// Parse `text` and render it to HTML in one step.
///
/// Returns `Ok(None)` when parsing exceeds the configured time budget.
///
/// # Errors
///
/// Propagates internal parser errors and rendering failures; never
/// fails on account of the markup itself.
#[instrument(skip(text), fields(len = text.len()))]
pub fn to_html(text: &str, options: &Options) -> Result<Option<String>, Error> {
    match docpeg_parser::parse(text, options) {
        Ok(document) => Ok(Some(render(&document)?)),
        Err(docpeg_parser::Error::TimedOut) => {
            tracing::debug!("parse timed out; returning no result");
            Ok(None)
        }
        #[allow(clippy::wildcard_enum_match_arm)]
        Err(err) => Err(Error::Parse(err)),
    }
}
