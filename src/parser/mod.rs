//! Incremental, failable consumers with bounded backtracking.
//!
//! A [`Parser`] has the same shape as a [`Fold`][crate::fold::Fold], an
//! `initial`/`step`/`extract` triple threading an owned state, extended with
//! failure and backtracking. Every step result carries a _backtrack count_
//! `n`: the number of most recently consumed elements the driver must feed
//! again before pulling new input.
//!
//! The four step results are interpreted by the driver as follows:
//!
//! * [`Partial(n, s)`][Step::Partial]: move the cursor back by `n` and
//!   _commit_ everything before it: buffered input older than the new cursor
//!   position is discarded and can never be seen again.
//! * [`Continue(n, s)`][Step::Continue]: move the cursor back by `n`
//!   without committing; all uncommitted input stays buffered.
//! * [`Done(n, v)`][Step::Done]: finish with value `v`, leaving the last
//!   `n` consumed elements unconsumed for whoever parses next.
//! * [`Error(msg)`][Step::Error]: fail; the driver reports the failure
//!   position.
//!
//! `n` is zero in the common case. Non-zero counts are produced by
//! combinators that look past what they consume, e.g. [`peek`] and
//! [`take_while`], and by [`or`][Parser::or] when its first alternative
//! fails before committing.
//!
//! `extract` is called once the input is exhausted while the parser is still
//! running, and must resolve to `Done`, `Continue` or `Error`; a `Partial`
//! from `extract` is a bug in the combinator and panics. The backtrack count
//! of `extract`'s result rewinds buffered input exactly like a step result,
//! which is what lets a wrapping combinator such as [`or`][Parser::or] offer
//! its second alternative the input the first one gave back at end of input.

use crate::fold::Fold;

mod combine;
mod element;
mod take;

pub use combine::*;
pub use element::*;
pub use take::*;

/// Result of starting a parser.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Init<S, B> {
    /// The parser accepts input, starting in the given state.
    Partial(S),
    /// The parser finished without consuming any input.
    Done(B),
    /// The parser failed without consuming any input.
    Error(String),
}

/// Result of feeding one element to a parser, or of finalizing it.
///
/// See the [module documentation][self] for how the driver interprets each
/// variant and the backtrack count it carries.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<S, B> {
    /// Rewind `n` elements, keep the new state, and commit everything
    /// before the rewound cursor.
    Partial(usize, S),
    /// Rewind `n` elements and keep the new state without committing.
    Continue(usize, S),
    /// Rewind `n` elements and finish with a value.
    Done(usize, B),
    /// Fail with a message naming the failing combinator.
    Error(String),
}

/// An incremental backtracking consumer of elements of type `A`.
///
/// The state is moved into and out of every call; between calls only the
/// driver holds it. In any step result, the backtrack count must not exceed
/// the number of elements fed since the last commit; violating this is a
/// bug and makes the driver panic.
pub trait Parser<A> {
    /// State threaded between steps.
    type State;
    /// Result type of the parser.
    type Output;

    /// Starts a fresh run of the parser.
    fn initial(&mut self) -> Init<Self::State, Self::Output>;

    /// Consumes one element.
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output>;

    /// Finalizes a run when the input is exhausted.
    ///
    /// Must not return [`Step::Partial`].
    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output>;

    /// Maps the result of this parser with `f`.
    fn map<C, G>(self, f: G) -> Map<G, Self>
    where
        Self: Sized,
        G: FnMut(Self::Output) -> C,
    {
        Map { f, inner: self }
    }

    /// Maps incoming elements with `f` before feeding them to this parser.
    fn map_input<C, G>(self, f: G) -> MapInput<G, Self>
    where
        Self: Sized,
        G: FnMut(C) -> A,
    {
        MapInput { f, inner: self }
    }

    /// Drops incoming elements that do not satisfy `pred`.
    ///
    /// Dropped elements are consumed (and committed) without reaching this
    /// parser.
    fn filter<G>(self, pred: G) -> Filter<G, Self>
    where
        Self: Sized,
        G: FnMut(&A) -> bool,
    {
        Filter { pred, inner: self }
    }

    /// Tries `other` if this parser fails before committing any input.
    ///
    /// This is committed choice: once this parser returns
    /// [`Partial`][Step::Partial] the alternative is no longer tried and a
    /// later failure is final.
    fn or<P2>(self, other: P2) -> Or<Self, P2>
    where
        Self: Sized,
        P2: Parser<A, Output = Self::Output>,
    {
        Or::new(self, other)
    }
}

#[cold]
#[inline(never)]
pub(crate) fn partial_from_extract() -> ! {
    panic!("parser returned Partial from extract");
}

/// Forces a parser that just produced `result` to finish by running its
/// `extract`, accumulating backtrack counts.
pub(crate) fn finish<A, P>(parser: &mut P, result: Step<P::State, P::Output>) -> Step<P::State, P::Output>
where
    P: Parser<A> + ?Sized,
{
    match result {
        Step::Partial(n, s) | Step::Continue(n, s) => match parser.extract(s) {
            Step::Done(m, b) => Step::Done(m + n, b),
            Step::Continue(m, s) => Step::Continue(m + n, s),
            Step::Error(msg) => Step::Error(msg),
            Step::Partial(..) => partial_from_extract(),
        },
        finished => finished,
    }
}

/// See [`Parser::map`].
pub struct Map<G, P> {
    f: G,
    inner: P,
}

impl<A, C, G, P> Parser<A> for Map<G, P>
where
    P: Parser<A>,
    G: FnMut(P::Output) -> C,
{
    type State = P::State;
    type Output = C;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Partial(s) => Init::Partial(s),
            Init::Done(b) => Init::Done((self.f)(b)),
            Init::Error(msg) => Init::Error(msg),
        }
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match self.inner.step(state, input) {
            Step::Partial(n, s) => Step::Partial(n, s),
            Step::Continue(n, s) => Step::Continue(n, s),
            Step::Done(n, b) => Step::Done(n, (self.f)(b)),
            Step::Error(msg) => Step::Error(msg),
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        match self.inner.extract(state) {
            Step::Partial(n, s) => Step::Partial(n, s),
            Step::Continue(n, s) => Step::Continue(n, s),
            Step::Done(n, b) => Step::Done(n, (self.f)(b)),
            Step::Error(msg) => Step::Error(msg),
        }
    }
}

/// See [`Parser::map_input`].
pub struct MapInput<G, P> {
    f: G,
    inner: P,
}

impl<A, C, G, P> Parser<C> for MapInput<G, P>
where
    P: Parser<A>,
    G: FnMut(C) -> A,
{
    type State = P::State;
    type Output = P::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: C) -> Step<Self::State, Self::Output> {
        self.inner.step(state, (self.f)(input))
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        self.inner.extract(state)
    }
}

/// See [`Parser::filter`].
pub struct Filter<G, P> {
    pred: G,
    inner: P,
}

impl<A, G, P> Parser<A> for Filter<G, P>
where
    P: Parser<A>,
    G: FnMut(&A) -> bool,
{
    type State = P::State;
    type Output = P::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.pred)(&input) {
            self.inner.step(state, input)
        } else {
            Step::Partial(0, state)
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        self.inner.extract(state)
    }
}

/// Wraps a [`Fold`] as a parser that never fails and never backtracks.
pub struct FromFold<FL> {
    fold: FL,
}

/// Creates a parser from a fold. See [`FromFold`].
pub fn from_fold<FL>(fold: FL) -> FromFold<FL> {
    FromFold { fold }
}

impl<A, FL> Parser<A> for FromFold<FL>
where
    FL: Fold<A>,
{
    type State = FL::State;
    type Output = FL::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            crate::fold::Init::Partial(s) => Init::Partial(s),
            crate::fold::Init::Done(b) => Init::Done(b),
        }
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match self.fold.step(state, input) {
            crate::fold::Step::Partial(s) => Step::Partial(0, s),
            crate::fold::Step::Done(b) => Step::Done(0, b),
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        Step::Done(0, self.fold.extract(state))
    }
}
