//! Higher-order parser combinators: alternation, sequencing, repetition and
//! interleaving.

use super::{finish, from_fold, partial_from_extract, take_while, Init, Parser, Step};
use crate::fold::{self, Fold};
use crate::Either;

/// See [`look_ahead`].
pub struct LookAhead<P> {
    inner: P,
}

/// Creates a parser that runs `inner` and then gives back everything it
/// consumed, so only the result remains.
///
/// Fails when the input ends before `inner` finishes, whatever the inner
/// parser's end-of-input behavior.
pub fn look_ahead<P>(inner: P) -> LookAhead<P> {
    LookAhead { inner }
}

impl<A, P> Parser<A> for LookAhead<P>
where
    P: Parser<A>,
{
    type State = (usize, P::State);
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Partial(s) => Init::Partial((0, s)),
            Init::Done(b) => Init::Done(b),
            Init::Error(msg) => Init::Error(msg),
        }
    }

    fn step(&mut self, (count, state): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let count = count + 1;
        match self.inner.step(state, input) {
            // Suppress commits so the whole consumed range stays buffered.
            Step::Partial(n, s) | Step::Continue(n, s) => Step::Continue(n, (count - n, s)),
            Step::Done(n, b) => Step::Done(count - n, b),
            Step::Error(msg) => Step::Error(msg),
        }
    }

    fn extract(&mut self, _state: Self::State) -> Step<Self::State, Self::Output> {
        Step::Error("look_ahead: unexpected end of input".into())
    }
}

/// Progress of an [`alt`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrState<S1, S2> {
    /// Running the first alternative; nothing committed yet.
    First(S1, usize),
    /// The first alternative committed input; the second one is off the
    /// table.
    FirstCommitted(S1),
    /// Running the second alternative.
    Second(S2),
}

/// See [`alt`] and [`Parser::or`].
pub struct Or<P1, P2> {
    first: P1,
    second: P2,
}

impl<P1, P2> Or<P1, P2> {
    pub(crate) fn new(first: P1, second: P2) -> Self {
        Or { first, second }
    }
}

/// Creates a parser trying `first`, falling back to `second` if `first`
/// fails before committing any input. Equivalent to
/// [`first.or(second)`][Parser::or].
pub fn alt<A, P1, P2>(first: P1, second: P2) -> Or<P1, P2>
where
    P1: Parser<A>,
    P2: Parser<A, Output = P1::Output>,
{
    Or::new(first, second)
}

impl<A, P1, P2> Parser<A> for Or<P1, P2>
where
    P1: Parser<A>,
    P2: Parser<A, Output = P1::Output>,
{
    type State = OrState<P1::State, P2::State>;
    type Output = P1::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.first.initial() {
            Init::Partial(s) => Init::Partial(OrState::First(s, 0)),
            Init::Done(b) => Init::Done(b),
            Init::Error(_) => match self.second.initial() {
                Init::Partial(s) => Init::Partial(OrState::Second(s)),
                Init::Done(b) => Init::Done(b),
                Init::Error(msg) => Init::Error(msg),
            },
        }
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            OrState::First(s, count) => {
                let count = count + 1;
                match self.first.step(s, input) {
                    Step::Partial(n, s) => Step::Partial(n, OrState::FirstCommitted(s)),
                    Step::Continue(n, s) => Step::Continue(n, OrState::First(s, count - n)),
                    Step::Done(n, b) => Step::Done(n, b),
                    Step::Error(_) => match self.second.initial() {
                        Init::Partial(s) => Step::Continue(count, OrState::Second(s)),
                        Init::Done(b) => Step::Done(count, b),
                        Init::Error(msg) => Step::Error(msg),
                    },
                }
            }
            OrState::FirstCommitted(s) => match self.first.step(s, input) {
                Step::Partial(n, s) => Step::Partial(n, OrState::FirstCommitted(s)),
                Step::Continue(n, s) => Step::Continue(n, OrState::FirstCommitted(s)),
                Step::Done(n, b) => Step::Done(n, b),
                Step::Error(msg) => Step::Error(msg),
            },
            OrState::Second(s) => match self.second.step(s, input) {
                Step::Partial(n, s) => Step::Partial(n, OrState::Second(s)),
                Step::Continue(n, s) => Step::Continue(n, OrState::Second(s)),
                Step::Done(n, b) => Step::Done(n, b),
                Step::Error(msg) => Step::Error(msg),
            },
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        match state {
            OrState::First(s, count) => match self.first.extract(s) {
                Step::Done(n, b) => Step::Done(n, b),
                Step::Continue(n, s) => Step::Continue(n, OrState::First(s, count - n)),
                Step::Error(_) => match self.second.initial() {
                    Init::Partial(s) => {
                        if count > 0 {
                            // Hand the first alternative's input to the
                            // second; the driver replays it.
                            Step::Continue(count, OrState::Second(s))
                        } else {
                            match self.second.extract(s) {
                                Step::Done(n, b) => Step::Done(n, b),
                                Step::Continue(n, s) => Step::Continue(n, OrState::Second(s)),
                                Step::Error(msg) => Step::Error(msg),
                                Step::Partial(..) => partial_from_extract(),
                            }
                        }
                    }
                    Init::Done(b) => Step::Done(count, b),
                    Init::Error(msg) => Step::Error(msg),
                },
                Step::Partial(..) => partial_from_extract(),
            },
            OrState::FirstCommitted(s) => match self.first.extract(s) {
                Step::Done(n, b) => Step::Done(n, b),
                Step::Continue(n, s) => Step::Continue(n, OrState::FirstCommitted(s)),
                Step::Error(msg) => Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            },
            OrState::Second(s) => match self.second.extract(s) {
                Step::Done(n, b) => Step::Done(n, b),
                Step::Continue(n, s) => Step::Continue(n, OrState::Second(s)),
                Step::Error(msg) => Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            },
        }
    }
}

/// Progress of a [`split_with`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitState<S1, B1, S2> {
    /// Running the first parser.
    First(S1),
    /// Holding the first result while running the second parser.
    Second(B1, S2),
}

/// See [`split_with`].
pub struct SplitWith<G, P1, P2> {
    f: G,
    first: P1,
    second: P2,
}

/// Creates a parser that runs `first`, then `second` on the remaining
/// input, and combines their results with `f`.
pub fn split_with<A, C, G, P1, P2>(f: G, first: P1, second: P2) -> SplitWith<G, P1, P2>
where
    G: FnMut(P1::Output, P2::Output) -> C,
    P1: Parser<A>,
    P2: Parser<A>,
{
    SplitWith { f, first, second }
}

impl<A, C, G, P1, P2> Parser<A> for SplitWith<G, P1, P2>
where
    G: FnMut(P1::Output, P2::Output) -> C,
    P1: Parser<A>,
    P2: Parser<A>,
{
    type State = SplitState<P1::State, P1::Output, P2::State>;
    type Output = C;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.first.initial() {
            Init::Partial(s1) => Init::Partial(SplitState::First(s1)),
            Init::Done(b1) => match self.second.initial() {
                Init::Partial(s2) => Init::Partial(SplitState::Second(b1, s2)),
                Init::Done(b2) => Init::Done((self.f)(b1, b2)),
                Init::Error(msg) => Init::Error(msg),
            },
            Init::Error(msg) => Init::Error(msg),
        }
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            SplitState::First(s1) => match self.first.step(s1, input) {
                Step::Partial(n, s1) => Step::Partial(n, SplitState::First(s1)),
                Step::Continue(n, s1) => Step::Continue(n, SplitState::First(s1)),
                Step::Done(n, b1) => match self.second.initial() {
                    Init::Partial(s2) => Step::Continue(n, SplitState::Second(b1, s2)),
                    Init::Done(b2) => Step::Done(n, (self.f)(b1, b2)),
                    Init::Error(msg) => Step::Error(msg),
                },
                Step::Error(msg) => Step::Error(msg),
            },
            SplitState::Second(b1, s2) => match self.second.step(s2, input) {
                Step::Partial(n, s2) => Step::Partial(n, SplitState::Second(b1, s2)),
                Step::Continue(n, s2) => Step::Continue(n, SplitState::Second(b1, s2)),
                Step::Done(n, b2) => Step::Done(n, (self.f)(b1, b2)),
                Step::Error(msg) => Step::Error(msg),
            },
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        match state {
            SplitState::First(s1) => match self.first.extract(s1) {
                Step::Done(n, b1) => {
                    if n > 0 {
                        // Let the driver replay the rewound input into the
                        // second parser.
                        match self.second.initial() {
                            Init::Partial(s2) => Step::Continue(n, SplitState::Second(b1, s2)),
                            Init::Done(b2) => Step::Done(n, (self.f)(b1, b2)),
                            Init::Error(msg) => Step::Error(msg),
                        }
                    } else {
                        match self.second.initial() {
                            Init::Partial(s2) => match self.second.extract(s2) {
                                Step::Done(m, b2) => Step::Done(m, (self.f)(b1, b2)),
                                Step::Continue(m, s2) => {
                                    Step::Continue(m, SplitState::Second(b1, s2))
                                }
                                Step::Error(msg) => Step::Error(msg),
                                Step::Partial(..) => partial_from_extract(),
                            },
                            Init::Done(b2) => Step::Done(0, (self.f)(b1, b2)),
                            Init::Error(msg) => Step::Error(msg),
                        }
                    }
                }
                Step::Continue(n, s1) => Step::Continue(n, SplitState::First(s1)),
                Step::Error(msg) => Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            },
            SplitState::Second(b1, s2) => match self.second.extract(s2) {
                Step::Done(n, b2) => Step::Done(n, (self.f)(b1, b2)),
                Step::Continue(n, s2) => Step::Continue(n, SplitState::Second(b1, s2)),
                Step::Error(msg) => Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            },
        }
    }
}

/// Creates a parser that feeds the leading run of elements satisfying
/// `pred` to `first` and the rest of the input to `second`, producing both
/// results.
pub fn span<A, G, F1, F2>(
    pred: G,
    first: F1,
    second: F2,
) -> impl Parser<A, Output = (F1::Output, F2::Output)>
where
    G: FnMut(&A) -> bool,
    F1: Fold<A>,
    F2: Fold<A>,
{
    split_with(|b1, b2| (b1, b2), take_while(pred, first), from_fold(second))
}

/// See [`many`] and [`some`].
pub struct Many<P, FL> {
    parser: P,
    sink: FL,
    require_first: bool,
    name: &'static str,
}

/// Creates a parser that runs `parser` repeatedly, feeding each result to
/// `sink`, until the parser fails without having committed.
///
/// The failed attempt's input is given back to the driver. Zero repetitions
/// succeed with the sink's identity.
///
/// # Panics
///
/// Panics when a repetition succeeds without consuming input; such a parser
/// would repeat forever.
pub fn many<A, P, FL>(parser: P, sink: FL) -> Many<P, FL>
where
    P: Parser<A>,
    FL: Fold<P::Output>,
{
    Many {
        parser,
        sink,
        require_first: false,
        name: "many",
    }
}

/// Like [`many`] but fails unless at least one repetition succeeds.
pub fn some<A, P, FL>(parser: P, sink: FL) -> Many<P, FL>
where
    P: Parser<A>,
    FL: Fold<P::Output>,
{
    Many {
        parser,
        sink,
        require_first: true,
        name: "some",
    }
}

impl<A, P, FL> Parser<A> for Many<P, FL>
where
    P: Parser<A>,
    FL: Fold<P::Output>,
{
    // (parser state, sink state, uncommitted count this round, finished
    // rounds)
    type State = (P::State, FL::State, usize, usize);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let fs = match self.sink.initial() {
            fold::Init::Partial(fs) => fs,
            fold::Init::Done(c) => return Init::Done(c),
        };
        match self.parser.initial() {
            Init::Partial(ps) => Init::Partial((ps, fs, 0, 0)),
            Init::Done(_) => panic!("{}: parser accepted an empty input", self.name),
            Init::Error(msg) => {
                if self.require_first {
                    Init::Error(msg)
                } else {
                    Init::Done(self.sink.extract(fs))
                }
            }
        }
    }

    fn step(&mut self, (ps, fs, count, rounds): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let count = count + 1;
        match self.parser.step(ps, input) {
            // Suppress the repetition's commits: a failing round must be
            // able to give all of its input back.
            Step::Partial(n, ps) | Step::Continue(n, ps) => {
                Step::Continue(n, (ps, fs, count - n, rounds))
            }
            Step::Done(n, b) => {
                if count - n == 0 {
                    panic!("{}: parser consumed no input", self.name);
                }
                match self.sink.step(fs, b) {
                    fold::Step::Done(c) => Step::Done(n, c),
                    fold::Step::Partial(fs) => match self.parser.initial() {
                        Init::Partial(ps) => Step::Partial(n, (ps, fs, 0, rounds + 1)),
                        Init::Done(_) => panic!("{}: parser accepted an empty input", self.name),
                        Init::Error(_) => Step::Done(n, self.sink.extract(fs)),
                    },
                }
            }
            Step::Error(msg) => {
                if self.require_first && rounds == 0 {
                    Step::Error(msg)
                } else {
                    Step::Done(count, self.sink.extract(fs))
                }
            }
        }
    }

    fn extract(&mut self, (ps, fs, count, rounds): Self::State) -> Step<Self::State, Self::Output> {
        match self.parser.extract(ps) {
            Step::Done(n, b) => {
                if count - n == 0 {
                    // An empty tail is not a repetition.
                    return Step::Done(n, self.sink.extract(fs));
                }
                match self.sink.step(fs, b) {
                    fold::Step::Done(c) => Step::Done(n, c),
                    fold::Step::Partial(fs) => Step::Done(n, self.sink.extract(fs)),
                }
            }
            Step::Continue(n, ps) => Step::Continue(n, (ps, fs, count - n, rounds)),
            Step::Error(msg) => {
                if self.require_first && rounds == 0 {
                    Step::Error(msg)
                } else {
                    Step::Done(count, self.sink.extract(fs))
                }
            }
            Step::Partial(..) => partial_from_extract(),
        }
    }
}

/// Progress of a [`many_till`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManyTillState<SP, SQ> {
    /// Trying the stop parser.
    Stopping(SQ, usize),
    /// Running the collecting parser.
    Collecting(SP, usize),
}

/// See [`many_till`].
pub struct ManyTill<P, Q, FL> {
    parser: P,
    stop: Q,
    sink: FL,
}

/// Creates a parser that runs `parser` repeatedly, feeding each result to
/// `sink`, until `stop` succeeds. The stop parser is tried first at every
/// round boundary and its result is discarded.
///
/// # Panics
///
/// Panics when a repetition succeeds without consuming input.
pub fn many_till<A, P, Q, FL>(parser: P, stop: Q, sink: FL) -> ManyTill<P, Q, FL>
where
    P: Parser<A>,
    Q: Parser<A>,
    FL: Fold<P::Output>,
{
    ManyTill { parser, stop, sink }
}

impl<A, P, Q, FL> Parser<A> for ManyTill<P, Q, FL>
where
    P: Parser<A>,
    Q: Parser<A>,
    FL: Fold<P::Output>,
{
    type State = (ManyTillState<P::State, Q::State>, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let fs = match self.sink.initial() {
            fold::Init::Partial(fs) => fs,
            fold::Init::Done(c) => return Init::Done(c),
        };
        match self.stop.initial() {
            Init::Partial(qs) => Init::Partial((ManyTillState::Stopping(qs, 0), fs)),
            Init::Done(_) => Init::Done(self.sink.extract(fs)),
            Init::Error(_) => match self.parser.initial() {
                Init::Partial(ps) => Init::Partial((ManyTillState::Collecting(ps, 0), fs)),
                Init::Done(_) => panic!("many_till: parser accepted an empty input"),
                Init::Error(msg) => Init::Error(msg),
            },
        }
    }

    fn step(&mut self, (state, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            ManyTillState::Stopping(qs, count) => {
                let count = count + 1;
                match self.stop.step(qs, input) {
                    // The stop attempt must stay rewindable.
                    Step::Partial(n, qs) | Step::Continue(n, qs) => {
                        Step::Continue(n, (ManyTillState::Stopping(qs, count - n), fs))
                    }
                    Step::Done(n, _) => Step::Done(n, self.sink.extract(fs)),
                    Step::Error(_) => match self.parser.initial() {
                        Init::Partial(ps) => {
                            Step::Continue(count, (ManyTillState::Collecting(ps, 0), fs))
                        }
                        Init::Done(_) => panic!("many_till: parser accepted an empty input"),
                        Init::Error(msg) => Step::Error(msg),
                    },
                }
            }
            ManyTillState::Collecting(ps, count) => {
                let count = count + 1;
                match self.parser.step(ps, input) {
                    Step::Partial(n, ps) => {
                        Step::Partial(n, (ManyTillState::Collecting(ps, 0), fs))
                    }
                    Step::Continue(n, ps) => {
                        Step::Continue(n, (ManyTillState::Collecting(ps, count - n), fs))
                    }
                    Step::Done(n, b) => {
                        if count - n == 0 {
                            panic!("many_till: parser consumed no input");
                        }
                        match self.sink.step(fs, b) {
                            fold::Step::Done(c) => Step::Done(n, c),
                            fold::Step::Partial(fs) => match self.stop.initial() {
                                Init::Partial(qs) => {
                                    Step::Continue(n, (ManyTillState::Stopping(qs, 0), fs))
                                }
                                Init::Done(_) => Step::Done(n, self.sink.extract(fs)),
                                Init::Error(msg) => Step::Error(msg),
                            },
                        }
                    }
                    Step::Error(msg) => Step::Error(msg),
                }
            }
        }
    }

    fn extract(&mut self, (state, fs): Self::State) -> Step<Self::State, Self::Output> {
        match state {
            ManyTillState::Stopping(qs, count) => match self.stop.extract(qs) {
                Step::Done(n, _) => Step::Done(n, self.sink.extract(fs)),
                Step::Continue(n, qs) => {
                    Step::Continue(n, (ManyTillState::Stopping(qs, count - n), fs))
                }
                Step::Error(_) => {
                    if count > 0 {
                        match self.parser.initial() {
                            Init::Partial(ps) => {
                                Step::Continue(count, (ManyTillState::Collecting(ps, 0), fs))
                            }
                            Init::Done(_) => panic!("many_till: parser accepted an empty input"),
                            Init::Error(msg) => Step::Error(msg),
                        }
                    } else {
                        Step::Error("many_till: unexpected end of input".into())
                    }
                }
                Step::Partial(..) => partial_from_extract(),
            },
            ManyTillState::Collecting(ps, count) => match self.parser.extract(ps) {
                Step::Done(n, b) => {
                    if count - n == 0 {
                        return Step::Error("many_till: unexpected end of input".into());
                    }
                    let fs = match self.sink.step(fs, b) {
                        fold::Step::Done(c) => return Step::Done(n, c),
                        fold::Step::Partial(fs) => fs,
                    };
                    match self.stop.initial() {
                        Init::Partial(qs) => {
                            if n > 0 {
                                Step::Continue(n, (ManyTillState::Stopping(qs, 0), fs))
                            } else {
                                match self.stop.extract(qs) {
                                    Step::Done(m, _) => Step::Done(m, self.sink.extract(fs)),
                                    Step::Continue(m, qs) => {
                                        Step::Continue(m, (ManyTillState::Stopping(qs, 0), fs))
                                    }
                                    Step::Error(_) => {
                                        Step::Error("many_till: unexpected end of input".into())
                                    }
                                    Step::Partial(..) => partial_from_extract(),
                                }
                            }
                        }
                        Init::Done(_) => Step::Done(n, self.sink.extract(fs)),
                        Init::Error(msg) => Step::Error(msg),
                    }
                }
                Step::Continue(n, ps) => {
                    Step::Continue(n, (ManyTillState::Collecting(ps, count - n), fs))
                }
                Step::Error(msg) => Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            },
        }
    }
}

/// Progress of a [`deintercalate`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeintercalateState<SL, SR, BR> {
    /// Running the content parser.
    ParseLeft {
        /// Content parser state.
        state: SL,
        /// Uncommitted elements behind the cursor, including a pending
        /// separator's input.
        uncommitted: usize,
        /// Net elements consumed by the current content attempt.
        consumed: usize,
        /// Whether the current content attempt committed input.
        committed: bool,
        /// A separator value waiting for the following content to succeed.
        pending: Option<BR>,
        /// Finished content rounds.
        rounds: usize,
    },
    /// Running the separator parser.
    ParseRight {
        /// Separator parser state.
        state: SR,
        /// Uncommitted elements behind the cursor.
        uncommitted: usize,
        /// Net elements consumed by the current separator attempt.
        consumed: usize,
        /// Finished content rounds.
        rounds: usize,
    },
}

/// See [`deintercalate`].
pub struct Deintercalate<PL, PR, FL> {
    left: PL,
    right: PR,
    sink: FL,
    require_first: bool,
    name: &'static str,
}

/// Creates a parser alternating a content parser and a separator parser,
/// feeding results tagged [`Left`][Either::Left] and
/// [`Right`][Either::Right] into `sink`.
///
/// The parse ends when the content parser fails on uncommitted input; the
/// failed attempt and a preceding separator are given back to the driver,
/// so a trailing separator is never part of the parse. Empty input produces
/// the sink's identity.
///
/// # Panics
///
/// Panics when the content or separator parser succeeds without consuming
/// input; such a cycle would repeat forever.
pub fn deintercalate<A, PL, PR, FL>(left: PL, right: PR, sink: FL) -> Deintercalate<PL, PR, FL>
where
    PL: Parser<A>,
    PR: Parser<A>,
    FL: Fold<Either<PL::Output, PR::Output>>,
{
    Deintercalate {
        left,
        right,
        sink,
        require_first: false,
        name: "deintercalate",
    }
}

/// Creates a parser for `content` separated by `sep`, feeding the content
/// values to `sink` and discarding the separators. Zero occurrences succeed
/// with the sink's identity.
pub fn sep_by<A, PL, PR, FL>(
    content: PL,
    sep: PR,
    sink: FL,
) -> Deintercalate<PL, PR, fold::Lefts<FL>>
where
    PL: Parser<A>,
    PR: Parser<A>,
    FL: Fold<PL::Output>,
{
    Deintercalate {
        left: content,
        right: sep,
        sink: fold::lefts(sink),
        require_first: false,
        name: "sep_by",
    }
}

/// Like [`sep_by`] but fails unless at least one content value is parsed.
pub fn sep_by1<A, PL, PR, FL>(
    content: PL,
    sep: PR,
    sink: FL,
) -> Deintercalate<PL, PR, fold::Lefts<FL>>
where
    PL: Parser<A>,
    PR: Parser<A>,
    FL: Fold<PL::Output>,
{
    Deintercalate {
        left: content,
        right: sep,
        sink: fold::lefts(sink),
        require_first: true,
        name: "sep_by1",
    }
}

/// Feeds one value to a collecting fold, returning the finished result as
/// `Err`.
fn feed_sink<T, FL>(sink: &mut FL, fs: FL::State, value: T) -> Result<FL::State, FL::Output>
where
    FL: Fold<T>,
{
    match sink.step(fs, value) {
        fold::Step::Partial(fs) => Ok(fs),
        fold::Step::Done(c) => Err(c),
    }
}

/// Feeds a held separator value, if any. See [`deintercalate`].
fn feed_pending<L, R, FL>(
    sink: &mut FL,
    fs: FL::State,
    pending: Option<R>,
) -> Result<FL::State, FL::Output>
where
    FL: Fold<Either<L, R>>,
{
    match pending {
        None => Ok(fs),
        Some(br) => feed_sink(sink, fs, Either::Right(br)),
    }
}

impl<A, PL, PR, FL> Parser<A> for Deintercalate<PL, PR, FL>
where
    PL: Parser<A>,
    PR: Parser<A>,
    FL: Fold<Either<PL::Output, PR::Output>>,
{
    type State = (DeintercalateState<PL::State, PR::State, PR::Output>, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let fs = match self.sink.initial() {
            fold::Init::Partial(fs) => fs,
            fold::Init::Done(c) => return Init::Done(c),
        };
        match self.left.initial() {
            Init::Partial(sl) => Init::Partial((
                DeintercalateState::ParseLeft {
                    state: sl,
                    uncommitted: 0,
                    consumed: 0,
                    committed: false,
                    pending: None,
                    rounds: 0,
                },
                fs,
            )),
            Init::Done(_) => panic!("{}: parser accepted an empty input", self.name),
            Init::Error(msg) => {
                if self.require_first {
                    Init::Error(msg)
                } else {
                    Init::Done(self.sink.extract(fs))
                }
            }
        }
    }

    fn step(&mut self, (state, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            DeintercalateState::ParseLeft {
                state: sl,
                uncommitted,
                consumed,
                committed,
                pending,
                rounds,
            } => {
                let uncommitted = uncommitted + 1;
                let consumed = consumed + 1;
                match self.left.step(sl, input) {
                    Step::Partial(n, sl) => {
                        // Content made progress: the pending separator is
                        // final and the committed input is gone for good.
                        let fs = match feed_pending(&mut self.sink, fs, pending) {
                            Ok(fs) => fs,
                            Err(c) => return Step::Done(n, c),
                        };
                        Step::Partial(
                            n,
                            (
                                DeintercalateState::ParseLeft {
                                    state: sl,
                                    uncommitted: 0,
                                    consumed: consumed - n,
                                    committed: true,
                                    pending: None,
                                    rounds,
                                },
                                fs,
                            ),
                        )
                    }
                    Step::Continue(n, sl) => Step::Continue(
                        n,
                        (
                            DeintercalateState::ParseLeft {
                                state: sl,
                                uncommitted: uncommitted - n,
                                consumed: consumed - n,
                                committed,
                                pending,
                                rounds,
                            },
                            fs,
                        ),
                    ),
                    Step::Done(n, bl) => {
                        if consumed - n == 0 {
                            panic!("{}: parser consumed no input", self.name);
                        }
                        let fs = match feed_pending(&mut self.sink, fs, pending) {
                            Ok(fs) => fs,
                            Err(c) => return Step::Done(n, c),
                        };
                        let fs = match feed_sink(&mut self.sink, fs, Either::Left(bl)) {
                            Ok(fs) => fs,
                            Err(c) => return Step::Done(n, c),
                        };
                        match self.right.initial() {
                            Init::Partial(sr) => Step::Partial(
                                n,
                                (
                                    DeintercalateState::ParseRight {
                                        state: sr,
                                        uncommitted: 0,
                                        consumed: 0,
                                        rounds: rounds + 1,
                                    },
                                    fs,
                                ),
                            ),
                            Init::Done(_) => {
                                panic!("{}: separator accepted an empty input", self.name)
                            }
                            Init::Error(_) => Step::Done(n, self.sink.extract(fs)),
                        }
                    }
                    Step::Error(msg) => {
                        if committed {
                            Step::Error(msg)
                        } else if self.require_first && rounds == 0 {
                            Step::Error(msg)
                        } else {
                            Step::Done(uncommitted, self.sink.extract(fs))
                        }
                    }
                }
            }
            DeintercalateState::ParseRight {
                state: sr,
                uncommitted,
                consumed,
                rounds,
            } => {
                let uncommitted = uncommitted + 1;
                let consumed = consumed + 1;
                match self.right.step(sr, input) {
                    // The separator must stay rewindable until the next
                    // content succeeds.
                    Step::Partial(n, sr) | Step::Continue(n, sr) => Step::Continue(
                        n,
                        (
                            DeintercalateState::ParseRight {
                                state: sr,
                                uncommitted: uncommitted - n,
                                consumed: consumed - n,
                                rounds,
                            },
                            fs,
                        ),
                    ),
                    Step::Done(n, br) => {
                        if consumed - n == 0 {
                            panic!("{}: separator consumed no input", self.name);
                        }
                        match self.left.initial() {
                            Init::Partial(sl) => Step::Continue(
                                n,
                                (
                                    DeintercalateState::ParseLeft {
                                        state: sl,
                                        uncommitted: uncommitted - n,
                                        consumed: 0,
                                        committed: false,
                                        pending: Some(br),
                                        rounds,
                                    },
                                    fs,
                                ),
                            ),
                            Init::Done(_) => {
                                panic!("{}: parser accepted an empty input", self.name)
                            }
                            Init::Error(_) => Step::Done(uncommitted, self.sink.extract(fs)),
                        }
                    }
                    Step::Error(_) => Step::Done(uncommitted, self.sink.extract(fs)),
                }
            }
        }
    }

    fn extract(&mut self, (state, fs): Self::State) -> Step<Self::State, Self::Output> {
        match state {
            DeintercalateState::ParseLeft {
                state: sl,
                uncommitted,
                consumed,
                committed,
                pending,
                rounds,
            } => match self.left.extract(sl) {
                Step::Done(n, bl) => {
                    if consumed - n == 0 {
                        // No trailing content: give back the pending
                        // separator's input as well.
                        return Step::Done(uncommitted, self.sink.extract(fs));
                    }
                    let fs = match feed_pending(&mut self.sink, fs, pending) {
                        Ok(fs) => fs,
                        Err(c) => return Step::Done(n, c),
                    };
                    match feed_sink(&mut self.sink, fs, Either::Left(bl)) {
                        Ok(fs) => Step::Done(n, self.sink.extract(fs)),
                        Err(c) => Step::Done(n, c),
                    }
                }
                Step::Continue(n, sl) => Step::Continue(
                    n,
                    (
                        DeintercalateState::ParseLeft {
                            state: sl,
                            uncommitted: uncommitted - n,
                            consumed: consumed - n,
                            committed,
                            pending,
                            rounds,
                        },
                        fs,
                    ),
                ),
                Step::Error(msg) => {
                    if committed {
                        Step::Error(msg)
                    } else if self.require_first && rounds == 0 {
                        Step::Error(msg)
                    } else {
                        Step::Done(uncommitted, self.sink.extract(fs))
                    }
                }
                Step::Partial(..) => partial_from_extract(),
            },
            DeintercalateState::ParseRight { uncommitted, .. } => {
                // A trailing separator is rewound and excluded.
                Step::Done(uncommitted, self.sink.extract(fs))
            }
        }
    }
}

/// See [`sequence`].
pub struct Sequence<P, FL> {
    parsers: Vec<P>,
    sink: FL,
}

/// Creates a parser that runs each parser of `parsers` in order over the
/// input, feeding every result to `sink`.
pub fn sequence<A, P, FL>(parsers: Vec<P>, sink: FL) -> Sequence<P, FL>
where
    P: Parser<A>,
    FL: Fold<P::Output>,
{
    Sequence { parsers, sink }
}

impl<A, P, FL> Parser<A> for Sequence<P, FL>
where
    P: Parser<A>,
    FL: Fold<P::Output>,
{
    type State = (usize, P::State, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let mut fs = match self.sink.initial() {
            fold::Init::Partial(fs) => fs,
            fold::Init::Done(c) => return Init::Done(c),
        };
        let mut index = 0;
        loop {
            if index >= self.parsers.len() {
                return Init::Done(self.sink.extract(fs));
            }
            match self.parsers[index].initial() {
                Init::Partial(ps) => return Init::Partial((index, ps, fs)),
                Init::Done(b) => match self.sink.step(fs, b) {
                    fold::Step::Partial(next) => {
                        fs = next;
                        index += 1;
                    }
                    fold::Step::Done(c) => return Init::Done(c),
                },
                Init::Error(msg) => return Init::Error(msg),
            }
        }
    }

    fn step(&mut self, (index, ps, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        match self.parsers[index].step(ps, input) {
            Step::Partial(n, ps) => Step::Partial(n, (index, ps, fs)),
            Step::Continue(n, ps) => Step::Continue(n, (index, ps, fs)),
            Step::Done(n, b) => {
                let mut fs = match self.sink.step(fs, b) {
                    fold::Step::Partial(fs) => fs,
                    fold::Step::Done(c) => return Step::Done(n, c),
                };
                let mut index = index + 1;
                loop {
                    if index >= self.parsers.len() {
                        return Step::Done(n, self.sink.extract(fs));
                    }
                    match self.parsers[index].initial() {
                        Init::Partial(ps) => return Step::Continue(n, (index, ps, fs)),
                        Init::Done(b) => match self.sink.step(fs, b) {
                            fold::Step::Partial(next) => {
                                fs = next;
                                index += 1;
                            }
                            fold::Step::Done(c) => return Step::Done(n, c),
                        },
                        Init::Error(msg) => return Step::Error(msg),
                    }
                }
            }
            Step::Error(msg) => Step::Error(msg),
        }
    }

    fn extract(&mut self, (index, ps, fs): Self::State) -> Step<Self::State, Self::Output> {
        let mut index = index;
        let mut fs = fs;
        let mut result = self.parsers[index].extract(ps);
        loop {
            match result {
                Step::Done(n, b) => {
                    fs = match self.sink.step(fs, b) {
                        fold::Step::Partial(fs) => fs,
                        fold::Step::Done(c) => return Step::Done(n, c),
                    };
                    index += 1;
                    loop {
                        if index >= self.parsers.len() {
                            return Step::Done(n, self.sink.extract(fs));
                        }
                        match self.parsers[index].initial() {
                            Init::Partial(ps) => {
                                if n > 0 {
                                    // The driver replays the rewound input
                                    // into the next parser.
                                    return Step::Continue(n, (index, ps, fs));
                                }
                                result = self.parsers[index].extract(ps);
                                break;
                            }
                            Init::Done(b) => match self.sink.step(fs, b) {
                                fold::Step::Partial(next) => {
                                    fs = next;
                                    index += 1;
                                }
                                fold::Step::Done(c) => return Step::Done(n, c),
                            },
                            Init::Error(msg) => return Step::Error(msg),
                        }
                    }
                }
                Step::Continue(n, ps) => return Step::Continue(n, (index, ps, fs)),
                Step::Error(msg) => return Step::Error(msg),
                Step::Partial(..) => partial_from_extract(),
            }
        }
    }
}

/// See [`take_p`].
pub struct TakeP<P> {
    limit: usize,
    inner: P,
}

/// Creates a parser that runs `inner` on at most `limit` elements, forcing
/// it to finish when the cap is reached.
pub fn take_p<A, P>(limit: usize, inner: P) -> TakeP<P>
where
    P: Parser<A>,
{
    TakeP { limit, inner }
}

/// Forces a capped parser to finish. `gross` counts the fed elements before
/// the rewind carried by `result`. See [`take_p`].
fn cap_inner<A, P>(
    inner: &mut P,
    gross: usize,
    result: Step<P::State, P::Output>,
) -> Step<(usize, P::State), P::Output>
where
    P: Parser<A>,
{
    match finish::<A, _>(inner, result) {
        Step::Done(m, b) => Step::Done(m, b),
        Step::Continue(m, s) => Step::Continue(m, (gross - m, s)),
        Step::Error(msg) => Step::Error(msg),
        Step::Partial(..) => partial_from_extract(),
    }
}

impl<A, P> Parser<A> for TakeP<P>
where
    P: Parser<A>,
{
    type State = (usize, P::State);
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Done(b) => Init::Done(b),
            Init::Error(msg) => Init::Error(msg),
            Init::Partial(s) => {
                if self.limit == 0 {
                    match self.inner.extract(s) {
                        Step::Done(_, b) => Init::Done(b),
                        Step::Error(msg) => Init::Error(msg),
                        Step::Continue(..) => {
                            Init::Error("take_p: parser needs input".into())
                        }
                        Step::Partial(..) => partial_from_extract(),
                    }
                } else {
                    Init::Partial((0, s))
                }
            }
        }
    }

    fn step(&mut self, (consumed, s): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let gross = consumed + 1;
        match self.inner.step(s, input) {
            Step::Partial(n, s) => {
                if gross - n >= self.limit {
                    cap_inner::<A, _>(&mut self.inner, gross, Step::Partial(n, s))
                } else {
                    Step::Partial(n, (gross - n, s))
                }
            }
            Step::Continue(n, s) => {
                if gross - n >= self.limit {
                    cap_inner::<A, _>(&mut self.inner, gross, Step::Continue(n, s))
                } else {
                    Step::Continue(n, (gross - n, s))
                }
            }
            Step::Done(n, b) => Step::Done(n, b),
            Step::Error(msg) => Step::Error(msg),
        }
    }

    fn extract(&mut self, (consumed, s): Self::State) -> Step<Self::State, Self::Output> {
        match self.inner.extract(s) {
            Step::Done(n, b) => Step::Done(n, b),
            Step::Continue(n, s) => Step::Continue(n, (consumed - n, s)),
            Step::Error(msg) => Step::Error(msg),
            Step::Partial(..) => partial_from_extract(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::parser::{self, Parser as _};
    use crate::stream::from_list;
    use crate::{fold, Either, ParseDriver};

    #[test]
    fn or_takes_the_first_match() {
        let p = || parser::one_eq(1).or(parser::one_eq(2));
        assert_eq!(from_list(vec![1]).parse(p()), Ok(1));
        assert_eq!(from_list(vec![2]).parse(p()), Ok(2));
        assert_matches!(from_list(vec![3]).parse(p()), Err(..));
    }

    #[test]
    fn or_rewinds_an_uncommitted_alternative() {
        // list_eq never commits, so the fallback sees all input again.
        let p = parser::list_eq(vec![1, 2, 9]).or(parser::list_eq(vec![1, 2, 3]));
        assert_eq!(from_list(vec![1, 2, 3]).parse(p), Ok(vec![1, 2, 3]));
        // Fallback from a parser that fails only at end of input.
        let p = parser::list_eq(vec![1, 2, 3, 4]).or(parser::list_eq(vec![1, 2, 3]));
        assert_eq!(from_list(vec![1, 2, 3]).parse(p), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn or_is_committed_choice() {
        // take_eq commits as it consumes, so its failure is final.
        let committed = parser::split_with::<i32, _, _, _, _>(
            |_, x| x,
            parser::take_eq(2, fold::drain()),
            parser::fail::<i32>("x"),
        );
        assert_matches!(
            from_list(vec![1, 2, 3]).parse(parser::Parser::<i32>::or(committed, parser::from_pure(0))),
            Err(..)
        );
        // An uncommitted failure falls through.
        assert_eq!(
            from_list(vec![1]).parse(parser::one_eq(9).or(parser::from_pure(0))),
            Ok(0)
        );
    }

    #[test]
    fn split_with_sequences_two_parsers() {
        let p = parser::split_with(
            |a, b: Vec<i32>| (a, b),
            parser::one(),
            parser::from_fold(fold::to_list()),
        );
        assert_eq!(from_list(vec![1, 2, 3]).parse(p), Ok((1, vec![2, 3])));
    }

    #[test]
    fn span_splits_at_the_predicate_boundary() {
        let p = parser::span(|&x: &i32| x < 3, fold::to_list(), fold::to_list());
        assert_eq!(
            from_list(vec![1, 2, 5, 1]).parse(p),
            Ok((vec![1, 2], vec![5, 1]))
        );
    }

    #[test]
    fn many_collects_until_failure() {
        assert_eq!(
            from_list(vec![1, 2, 3]).parse(parser::many::<i32, _, _>(parser::one(), fold::to_list())),
            Ok(vec![1, 2, 3])
        );
        assert_eq!(
            from_list(Vec::<i32>::new()).parse(parser::many::<i32, _, _>(parser::one(), fold::to_list())),
            Ok(vec![])
        );
        assert_matches!(
            from_list(Vec::<i32>::new()).parse(parser::some::<i32, _, _>(parser::one(), fold::to_list())),
            Err(..)
        );
        assert_eq!(
            from_list(vec![7]).parse(parser::some(parser::one(), fold::to_list())),
            Ok(vec![7])
        );
    }

    #[test]
    fn many_gives_back_a_failed_round() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 1, 2, 1]));
        assert_eq!(
            driver.parse(&mut parser::many(parser::list_eq(vec![1, 2]), fold::to_list())),
            Ok(vec![vec![1, 2], vec![1, 2]])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(1));
    }

    #[test]
    fn many_gives_back_an_incomplete_tail_round() {
        let mut pairs = parser::many::<i32, _, _>(parser::take_eq(2, fold::to_list()), fold::to_list());
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3, 4, 5]));
        assert_eq!(driver.parse(&mut pairs), Ok(vec![vec![1, 2], vec![3, 4]]));
        assert_eq!(driver.parse(&mut parser::one()), Ok(5));
    }

    #[test]
    fn many_till_stops_on_the_stop_parser() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 0, 9]));
        assert_eq!(
            driver.parse(&mut parser::many_till(
                parser::one(),
                parser::one_eq(0),
                fold::to_list()
            )),
            Ok(vec![1, 2])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(9));
        // eof works as the stop condition.
        assert_eq!(
            from_list(vec![1, 2]).parse(parser::many_till::<i32, _, _, _>(
                parser::one(),
                parser::eof(),
                fold::to_list()
            )),
            Ok(vec![1, 2])
        );
        // A stop parser that never succeeds is an error at end of input.
        assert_matches!(
            from_list(vec![1, 2]).parse(parser::many_till(
                parser::one(),
                parser::one_eq(0),
                fold::to_list()
            )),
            Err(..)
        );
    }

    #[test]
    fn sep_by_splits_on_separators() {
        let digits = || parser::take_while1(|c: &char| c.is_ascii_digit(), fold::to_list());
        let p = || parser::sep_by(digits(), parser::one_eq(','), fold::to_list());
        assert_eq!(
            from_list("1,2,30".chars().collect::<Vec<_>>()).parse(p()),
            Ok(vec![vec!['1'], vec!['2'], vec!['3', '0']])
        );
        assert_eq!(from_list(Vec::<char>::new()).parse(p()), Ok(vec![]));
    }

    #[test]
    fn sep_by_gives_back_a_trailing_separator() {
        let digits = || parser::take_while1(|c: &char| c.is_ascii_digit(), fold::to_list());
        let mut p = parser::sep_by(digits(), parser::one_eq(','), fold::to_list());
        let mut driver = ParseDriver::new(from_list("1,2,".chars().collect::<Vec<_>>()));
        assert_eq!(driver.parse(&mut p), Ok(vec![vec!['1'], vec!['2']]));
        assert_eq!(driver.parse(&mut parser::one()), Ok(','));
    }

    #[test]
    fn sep_by1_requires_content() {
        let digits = || parser::take_while1(|c: &char| c.is_ascii_digit(), fold::to_list());
        assert_matches!(
            from_list(Vec::<char>::new()).parse(parser::sep_by1(
                digits(),
                parser::one_eq(','),
                fold::to_list()
            )),
            Err(..)
        );
        assert_eq!(
            from_list("7".chars().collect::<Vec<_>>()).parse(parser::sep_by1(
                digits(),
                parser::one_eq(','),
                fold::to_list()
            )),
            Ok(vec![vec!['7']])
        );
    }

    #[test]
    fn deintercalate_alternates_left_and_right() {
        let digits = || parser::take_while1(|c: &char| c.is_ascii_digit(), fold::to_list());
        let p = parser::deintercalate(digits(), parser::one_eq(';'), fold::to_list());
        assert_eq!(
            from_list("1;2;3".chars().collect::<Vec<_>>()).parse(p),
            Ok(vec![
                Either::Left(vec!['1']),
                Either::Right(';'),
                Either::Left(vec!['2']),
                Either::Right(';'),
                Either::Left(vec!['3']),
            ])
        );
    }

    #[test]
    fn sequence_runs_parsers_in_order() {
        let mut p = parser::sequence::<i32, _, _>(
            vec![
                parser::take_eq(1, fold::to_list()),
                parser::take_eq(2, fold::to_list()),
            ],
            fold::to_list(),
        );
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3, 4]));
        assert_eq!(driver.parse(&mut p), Ok(vec![vec![1], vec![2, 3]]));
        assert_eq!(driver.parse(&mut parser::one()), Ok(4));
        // An empty sequence produces the sink identity.
        assert_eq!(
            from_list(vec![1]).parse(parser::sequence::<i32, _, _>(Vec::<parser::One>::new(), fold::to_list())),
            Ok(vec![])
        );
    }

    #[test]
    fn take_p_caps_the_inner_parser() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3]));
        assert_eq!(
            driver.parse(&mut parser::take_p::<i32, _>(2, parser::from_fold(fold::to_list()))),
            Ok(vec![1, 2])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(3));
        // An inner parser finishing under the cap is unaffected.
        assert_eq!(
            from_list(vec![1, 2, 3]).parse(parser::take_p(9, parser::take_eq(2, fold::to_list()))),
            Ok(vec![1, 2])
        );
        // The cap can cut the inner parser short.
        assert_matches!(
            from_list(vec![1, 2, 3]).parse(parser::take_p(1, parser::take_eq(2, fold::to_list()))),
            Err(..)
        );
    }

    #[test]
    fn look_ahead_rewinds_everything() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3]));
        assert_eq!(
            driver.parse(&mut parser::look_ahead(parser::take_eq(2, fold::to_list()))),
            Ok(vec![1, 2])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(1));
        assert_matches!(
            from_list(Vec::<i32>::new()).parse(parser::look_ahead(parser::one())),
            Err(..)
        );
    }
}
