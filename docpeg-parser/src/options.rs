use std::time::Duration;

/// Matches the historical 2000ms ceiling for a single parse.
pub const DEFAULT_MAX_PARSE_TIME: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Options {
    /// Wall-clock budget for one parse. Checked before every atomic
    /// inline match; exceeding it aborts the parse with
    /// [`Error::TimedOut`](crate::Error::TimedOut).
    pub max_parse_time: Duration,
}

impl Options {
    #[must_use]
    pub fn new(max_parse_time: Duration) -> Self {
        Self { max_parse_time }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_parse_time: DEFAULT_MAX_PARSE_TIME,
        }
    }
}
