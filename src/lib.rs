//! Stromab is a library for building fused streaming pipelines.
//!
//! It provides three layered abstractions, each a small state machine with a
//! uniform step protocol, designed so that composed pipelines monomorphize
//! into a single tight loop without allocation between stages:
//!
//! * _Streams_: a pull-based producer represented as a step function and a
//!   seed state. Every transformer wraps the step function of its input, so a
//!   chain of transformers compiles to one loop. See the [`stream`] module.
//!
//! * _Folds_: incremental left-to-right reducers with early termination. A
//!   fold can be driven one element at a time, composed with other folds, and
//!   used as the collecting sink of a repeated parser. See the [`fold`]
//!   module.
//!
//! * _Parsers_: incremental, failable consumers with bounded backtracking.
//!   Parser steps report an out-of-band backtrack count which tells the
//!   driver how many of the most recently consumed elements to feed again.
//!   See the [`parser`] module.
//!
//! A [`ParseDriver`] connects a stream to a parser, maintaining a rewind
//! buffer of uncommitted input so that parsers can look ahead and fall back.
//! The driver can run several parsers in sequence over one stream, or, via
//! [`Stream::parse_many`], split a stream into a stream of parse results.
//!
//! The element and state types of every pipeline stage are threaded through
//! generics rather than trait objects. There is no virtual dispatch inside
//! the step loop; the cost per element of a composed pipeline is a handful of
//! moves and branches.

#![warn(missing_docs)]
mod driver;
mod error;
pub mod fold;
pub mod parser;
pub mod stream;

#[cfg(test)]
mod tests;

pub use driver::{Config, ParseDriver, RewindBuffer};
pub use error::ParseError;
pub use stream::Stream;

/// A value that is one of two alternatives.
///
/// Used for stream stages that route elements between two sides, such as
/// [`parser::group_by_rolling_either`] and the sink of
/// [`parser::deintercalate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    /// The left alternative.
    Left(L),
    /// The right alternative.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` for a [`Left`][Either::Left] value.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// Returns `true` for a [`Right`][Either::Right] value.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }
}
