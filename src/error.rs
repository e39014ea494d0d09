use thiserror::Error;

/// An error produced while running a parser over a stream.
///
/// The `message` is a human readable description prefixed by the name of the
/// combinator that failed, e.g. `"take_eq: expecting exactly 4 elements,
/// input terminated on 3"`. The `position` is the number of elements the
/// driver had consumed from the stream when the failure was observed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at element {position})")]
pub struct ParseError {
    /// The failure description, prefixed by the failing combinator's name.
    pub message: String,
    /// Absolute element offset of the driver's cursor at the failure.
    pub position: u64,
}

impl ParseError {
    /// Creates a parse error from a message and the position it occurred at.
    #[cold]
    #[inline(never)]
    pub fn new(message: impl Into<String>, position: u64) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}
