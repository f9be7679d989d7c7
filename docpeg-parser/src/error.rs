#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The parse exceeded its wall-clock budget. Not a syntax problem;
    /// retry with a larger budget or smaller input.
    #[error("parsing exceeded the configured time budget")]
    TimedOut,

    /// The grammar failed to consume the input or left the value stack
    /// in an impossible shape. Indicates a grammar bug, not bad input.
    #[error("internal parser error at offset {offset}: {context}")]
    Internal { offset: usize, context: String },
}

impl Error {
    pub(crate) fn internal(offset: usize, context: impl Into<String>) -> Self {
        Error::Internal {
            offset,
            context: context.into(),
        }
    }
}
