//! Tokenizing parsers: length-bounded, predicate-bounded, delimiter-framed
//! and grouping consumers that collect into a [`Fold`].

use super::{finish, Init, Parser, Step};
use crate::fold::{self, Fold};
use crate::Either;

/// See [`take_between`].
pub struct TakeBetween<FL> {
    lo: usize,
    hi: usize,
    fold: FL,
}

/// Creates a parser that feeds between `lo` and `hi` elements to `fold`.
///
/// Stops as soon as `hi` elements were consumed or the fold finishes, and
/// fails if the input or the fold ends before `lo` elements.
pub fn take_between<FL>(lo: usize, hi: usize, fold: FL) -> TakeBetween<FL> {
    TakeBetween { lo, hi, fold }
}

impl<A, FL> Parser<A> for TakeBetween<FL>
where
    FL: Fold<A>,
{
    type State = (usize, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        if self.lo > self.hi {
            return Init::Error(format!(
                "take_between: lower bound {} exceeds upper bound {}",
                self.lo, self.hi
            ));
        }
        match self.fold.initial() {
            fold::Init::Done(b) => {
                if self.lo == 0 {
                    Init::Done(b)
                } else {
                    Init::Error(format!(
                        "take_between: fold terminated without input, expecting at least {} elements",
                        self.lo
                    ))
                }
            }
            fold::Init::Partial(fs) => {
                if self.hi == 0 {
                    Init::Done(self.fold.extract(fs))
                } else {
                    Init::Partial((0, fs))
                }
            }
        }
    }

    fn step(&mut self, (count, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let count = count + 1;
        match self.fold.step(fs, input) {
            fold::Step::Done(b) => {
                if count >= self.lo {
                    Step::Done(0, b)
                } else {
                    Step::Error(format!(
                        "take_between: fold terminated on {} elements, expecting at least {}",
                        count, self.lo
                    ))
                }
            }
            fold::Step::Partial(fs) => {
                if count >= self.hi {
                    Step::Done(0, self.fold.extract(fs))
                } else {
                    Step::Partial(0, (count, fs))
                }
            }
        }
    }

    fn extract(&mut self, (count, fs): Self::State) -> Step<Self::State, Self::Output> {
        if count >= self.lo {
            Step::Done(0, self.fold.extract(fs))
        } else {
            Step::Error(format!(
                "take_between: expecting at least {} elements, input terminated on {}",
                self.lo, count
            ))
        }
    }
}

/// See [`take_eq`].
pub struct TakeEq<FL> {
    count: usize,
    fold: FL,
}

/// Creates a parser that feeds exactly `count` elements to `fold`.
pub fn take_eq<FL>(count: usize, fold: FL) -> TakeEq<FL> {
    TakeEq { count, fold }
}

impl<A, FL> Parser<A> for TakeEq<FL>
where
    FL: Fold<A>,
{
    type State = (usize, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Done(b) => {
                if self.count == 0 {
                    Init::Done(b)
                } else {
                    Init::Error(format!(
                        "take_eq: fold terminated without input, expecting exactly {} elements",
                        self.count
                    ))
                }
            }
            fold::Init::Partial(fs) => {
                if self.count == 0 {
                    Init::Done(self.fold.extract(fs))
                } else {
                    Init::Partial((0, fs))
                }
            }
        }
    }

    fn step(&mut self, (seen, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let seen = seen + 1;
        match self.fold.step(fs, input) {
            fold::Step::Done(b) => {
                if seen == self.count {
                    Step::Done(0, b)
                } else {
                    Step::Error(format!(
                        "take_eq: fold terminated on {} elements, expecting exactly {}",
                        seen, self.count
                    ))
                }
            }
            fold::Step::Partial(fs) => {
                if seen == self.count {
                    Step::Done(0, self.fold.extract(fs))
                } else {
                    Step::Partial(0, (seen, fs))
                }
            }
        }
    }

    fn extract(&mut self, (seen, _): Self::State) -> Step<Self::State, Self::Output> {
        Step::Error(format!(
            "take_eq: expecting exactly {} elements, input terminated on {}",
            self.count, seen
        ))
    }
}

/// See [`take_ge`].
pub struct TakeGe<FL> {
    count: usize,
    fold: FL,
}

/// Creates a parser that feeds at least `count` elements to `fold` and keeps
/// feeding until the fold finishes or the input ends.
pub fn take_ge<FL>(count: usize, fold: FL) -> TakeGe<FL> {
    TakeGe { count, fold }
}

impl<A, FL> Parser<A> for TakeGe<FL>
where
    FL: Fold<A>,
{
    type State = (usize, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Done(b) => {
                if self.count == 0 {
                    Init::Done(b)
                } else {
                    Init::Error(format!(
                        "take_ge: fold terminated without input, expecting at least {} elements",
                        self.count
                    ))
                }
            }
            fold::Init::Partial(fs) => Init::Partial((0, fs)),
        }
    }

    fn step(&mut self, (seen, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let seen = seen + 1;
        match self.fold.step(fs, input) {
            fold::Step::Done(b) => {
                if seen >= self.count {
                    Step::Done(0, b)
                } else {
                    Step::Error(format!(
                        "take_ge: fold terminated on {} elements, expecting at least {}",
                        seen, self.count
                    ))
                }
            }
            fold::Step::Partial(fs) => Step::Partial(0, (seen, fs)),
        }
    }

    fn extract(&mut self, (seen, fs): Self::State) -> Step<Self::State, Self::Output> {
        if seen >= self.count {
            Step::Done(0, self.fold.extract(fs))
        } else {
            Step::Error(format!(
                "take_ge: expecting at least {} elements, input terminated on {}",
                self.count, seen
            ))
        }
    }
}

/// See [`take_while`].
pub struct TakeWhile<G, FL> {
    pred: G,
    fold: FL,
}

/// Creates a parser that feeds elements to `fold` while `pred` holds.
///
/// The first element violating `pred` is given back to the driver (backtrack
/// count 1), so a following parser sees it. Never fails.
pub fn take_while<A, G, FL>(pred: G, fold: FL) -> TakeWhile<G, FL>
where
    G: FnMut(&A) -> bool,
{
    TakeWhile { pred, fold }
}

/// Creates a parser that discards elements while `pred` holds.
pub fn drop_while<A, G>(pred: G) -> TakeWhile<G, fold::Drain>
where
    G: FnMut(&A) -> bool,
{
    take_while(pred, fold::drain())
}

impl<A, G, FL> Parser<A> for TakeWhile<G, FL>
where
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = FL::State;
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial(fs),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, fs: Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.pred)(&input) {
            match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, fs),
                fold::Step::Done(b) => Step::Done(0, b),
            }
        } else {
            Step::Done(1, self.fold.extract(fs))
        }
    }

    fn extract(&mut self, fs: Self::State) -> Step<Self::State, Self::Output> {
        Step::Done(0, self.fold.extract(fs))
    }
}

/// See [`take_while1`].
pub struct TakeWhile1<G, FL> {
    pred: G,
    fold: FL,
}

/// Like [`take_while`] but fails unless at least one element satisfies
/// `pred`.
pub fn take_while1<A, G, FL>(pred: G, fold: FL) -> TakeWhile1<G, FL>
where
    G: FnMut(&A) -> bool,
{
    TakeWhile1 { pred, fold }
}

impl<A, G, FL> Parser<A> for TakeWhile1<G, FL>
where
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = (bool, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial((false, fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, (matched, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.pred)(&input) {
            match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (true, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            }
        } else if matched {
            Step::Done(1, self.fold.extract(fs))
        } else {
            Step::Error("take_while1: predicate failed on first element".into())
        }
    }

    fn extract(&mut self, (matched, fs): Self::State) -> Step<Self::State, Self::Output> {
        if matched {
            Step::Done(0, self.fold.extract(fs))
        } else {
            Step::Error("take_while1: unexpected end of input".into())
        }
    }
}

/// See [`take_while_p`].
pub struct TakeWhileP<G, P> {
    pred: G,
    inner: P,
}

/// Creates a parser that feeds elements to `inner` while `pred` holds, then
/// forces `inner` to finish.
pub fn take_while_p<A, G, P>(pred: G, inner: P) -> TakeWhileP<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    TakeWhileP { pred, inner }
}

impl<A, G, P> Parser<A> for TakeWhileP<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    type State = P::State;
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.pred)(&input) {
            self.inner.step(state, input)
        } else {
            // The offending element is not fed; rewind it along with
            // whatever the inner parser gives back.
            finish::<A, _>(&mut self.inner, Step::Continue(1, state))
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        self.inner.extract(state)
    }
}

/// See [`take_end_by`].
pub struct TakeEndBy<G, P> {
    cond: G,
    inner: P,
}

/// Creates a parser that runs `inner` until an element satisfies `cond`.
///
/// The terminating element is fed to `inner` before it is forced to finish.
pub fn take_end_by<A, G, P>(cond: G, inner: P) -> TakeEndBy<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    TakeEndBy { cond, inner }
}

impl<A, G, P> Parser<A> for TakeEndBy<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    type State = P::State;
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        let at_end = (self.cond)(&input);
        let result = self.inner.step(state, input);
        if at_end {
            finish::<A, _>(&mut self.inner, result)
        } else {
            result
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        self.inner.extract(state)
    }
}

/// See [`take_end_by_drop`].
pub struct TakeEndByDrop<G, P> {
    cond: G,
    inner: P,
}

/// Like [`take_end_by`] but the terminating element is consumed without
/// being fed to `inner`.
pub fn take_end_by_drop<A, G, P>(cond: G, inner: P) -> TakeEndByDrop<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    TakeEndByDrop { cond, inner }
}

impl<A, G, P> Parser<A> for TakeEndByDrop<G, P>
where
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    type State = P::State;
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.cond)(&input) {
            finish::<A, _>(&mut self.inner, Step::Continue(0, state))
        } else {
            self.inner.step(state, input)
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        self.inner.extract(state)
    }
}

/// See [`take_end_by_esc`].
pub struct TakeEndByEsc<E, G, P> {
    is_esc: E,
    is_sep: G,
    inner: P,
}

/// Like [`take_end_by`] but an element satisfying `is_esc` keeps the next
/// element from being recognized as the terminator. Escape elements are fed
/// to `inner` unchanged.
pub fn take_end_by_esc<A, E, G, P>(is_esc: E, is_sep: G, inner: P) -> TakeEndByEsc<E, G, P>
where
    E: FnMut(&A) -> bool,
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    TakeEndByEsc {
        is_esc,
        is_sep,
        inner,
    }
}

impl<A, E, G, P> Parser<A> for TakeEndByEsc<E, G, P>
where
    E: FnMut(&A) -> bool,
    G: FnMut(&A) -> bool,
    P: Parser<A>,
{
    type State = (bool, P::State);
    type Output = P::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Partial(s) => Init::Partial((false, s)),
            Init::Done(b) => Init::Done(b),
            Init::Error(msg) => Init::Error(msg),
        }
    }

    fn step(&mut self, (escaped, state): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let next_escaped = !escaped && (self.is_esc)(&input);
        let at_end = !escaped && !next_escaped && (self.is_sep)(&input);
        let result = self.inner.step(state, input);
        let result = if at_end {
            finish::<A, _>(&mut self.inner, result)
        } else {
            result
        };
        match result {
            Step::Partial(n, s) => Step::Partial(n, (next_escaped, s)),
            Step::Continue(n, s) => Step::Continue(n, (next_escaped, s)),
            Step::Done(n, b) => Step::Done(n, b),
            Step::Error(msg) => Step::Error(msg),
        }
    }

    fn extract(&mut self, (_, state): Self::State) -> Step<Self::State, Self::Output> {
        match self.inner.extract(state) {
            Step::Partial(n, s) => Step::Partial(n, (false, s)),
            Step::Continue(n, s) => Step::Continue(n, (false, s)),
            Step::Done(n, b) => Step::Done(n, b),
            Step::Error(msg) => Step::Error(msg),
        }
    }
}

/// See [`take_start_by`].
pub struct TakeStartBy<G, FL> {
    cond: G,
    fold: FL,
    keep_first: bool,
    name: &'static str,
}

/// Creates a parser for a frame opened by an element satisfying `cond` and
/// ended right before the next such element.
///
/// The opening element is fed to `fold`; the element opening the next frame
/// is given back to the driver.
pub fn take_start_by<A, G, FL>(cond: G, fold: FL) -> TakeStartBy<G, FL>
where
    G: FnMut(&A) -> bool,
{
    TakeStartBy {
        cond,
        fold,
        keep_first: true,
        name: "take_start_by",
    }
}

/// Like [`take_start_by`] but the opening element is consumed without being
/// fed to `fold`.
pub fn take_start_by_drop<A, G, FL>(cond: G, fold: FL) -> TakeStartBy<G, FL>
where
    G: FnMut(&A) -> bool,
{
    TakeStartBy {
        cond,
        fold,
        keep_first: false,
        name: "take_start_by_drop",
    }
}

impl<A, G, FL> Parser<A> for TakeStartBy<G, FL>
where
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = (bool, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial((false, fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, (in_frame, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        if !in_frame {
            if !(self.cond)(&input) {
                return Step::Error(format!("{}: missing frame start", self.name));
            }
            if !self.keep_first {
                return Step::Partial(0, (true, fs));
            }
            return match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (true, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            };
        }
        if (self.cond)(&input) {
            Step::Done(1, self.fold.extract(fs))
        } else {
            match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (true, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            }
        }
    }

    fn extract(&mut self, (_, fs): Self::State) -> Step<Self::State, Self::Output> {
        Step::Done(0, self.fold.extract(fs))
    }
}

/// See [`take_framed_by_generic`].
pub struct TakeFramedByGeneric<E, B, D, FL> {
    esc: Option<E>,
    begin: Option<B>,
    end: Option<D>,
    fold: FL,
    name: &'static str,
}

/// Creates a parser for content between a frame-start and the matching
/// frame-end element, with balanced nesting.
///
/// The outermost frame delimiters are dropped; nested delimiters are part of
/// the content.
pub fn take_framed_by<A, B, D, FL>(
    is_begin: B,
    is_end: D,
    fold: FL,
) -> TakeFramedByGeneric<fn(&A) -> bool, B, D, FL>
where
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
{
    TakeFramedByGeneric {
        esc: None,
        begin: Some(is_begin),
        end: Some(is_end),
        fold,
        name: "take_framed_by",
    }
}

/// Like [`take_framed_by`] but an element satisfying `is_esc` strips the
/// next element of any framing role. Escape elements are dropped from the
/// content.
pub fn take_framed_by_esc<A, E, B, D, FL>(
    is_esc: E,
    is_begin: B,
    is_end: D,
    fold: FL,
) -> TakeFramedByGeneric<E, B, D, FL>
where
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
{
    TakeFramedByGeneric {
        esc: Some(is_esc),
        begin: Some(is_begin),
        end: Some(is_end),
        fold,
        name: "take_framed_by_esc",
    }
}

/// The fully general framed parser: escaping and the frame-start are
/// optional. Without a frame-start predicate the content starts immediately
/// and ends at the first unescaped frame-end element.
///
/// # Panics
///
/// Panics when `end` is `None`; a frame-end predicate is required.
pub fn take_framed_by_generic<A, E, B, D, FL>(
    esc: Option<E>,
    begin: Option<B>,
    end: Option<D>,
    fold: FL,
) -> TakeFramedByGeneric<E, B, D, FL>
where
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
{
    if end.is_none() {
        panic!("take_framed_by_generic: a frame end predicate is required");
    }
    TakeFramedByGeneric {
        esc,
        begin,
        end,
        fold,
        name: "take_framed_by_generic",
    }
}

impl<A, E, B, D, FL> Parser<A> for TakeFramedByGeneric<E, B, D, FL>
where
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = (usize, bool, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let depth = if self.begin.is_some() { 0 } else { 1 };
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial((depth, false, fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, (depth, escaped, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        if depth == 0 {
            // Only reachable with a frame-start predicate present.
            return if self.begin.as_mut().map_or(false, |begin| begin(&input)) {
                Step::Partial(0, (1, false, fs))
            } else {
                Step::Error(format!("{}: missing frame start", self.name))
            };
        }
        if escaped {
            return match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (depth, false, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            };
        }
        if let Some(esc) = &mut self.esc {
            if esc(&input) {
                return Step::Partial(0, (depth, true, fs));
            }
        }
        if self.end.as_mut().map_or(false, |end| end(&input)) {
            if depth == 1 {
                return Step::Done(0, self.fold.extract(fs));
            }
            return match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (depth - 1, false, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            };
        }
        if self.begin.as_mut().map_or(false, |begin| begin(&input)) {
            return match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, (depth + 1, false, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            };
        }
        match self.fold.step(fs, input) {
            fold::Step::Partial(fs) => Step::Partial(0, (depth, false, fs)),
            fold::Step::Done(b) => Step::Done(0, b),
        }
    }

    fn extract(&mut self, (depth, _, _): Self::State) -> Step<Self::State, Self::Output> {
        if depth == 0 {
            Step::Error(format!("{}: unexpected end of input", self.name))
        } else {
            Step::Error(format!("{}: missing frame end", self.name))
        }
    }
}

/// Progress of a [`word_by`] parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordByState<S, B> {
    /// Dropping separators in front of the word.
    SkipPre(S),
    /// Collecting word elements.
    InWord(S),
    /// Word finished; dropping trailing separators.
    SkipPost(B),
}

/// See [`word_by`].
pub struct WordBy<G, FL> {
    is_sep: G,
    fold: FL,
}

/// Creates a parser for one separator-delimited word.
///
/// Leading separators are dropped, word elements are fed to `fold`, and the
/// run of separators after the word is consumed as well. Never fails: at end
/// of input the (possibly empty) word is produced.
pub fn word_by<A, G, FL>(is_sep: G, fold: FL) -> WordBy<G, FL>
where
    G: FnMut(&A) -> bool,
{
    WordBy { is_sep, fold }
}

impl<A, G, FL> Parser<A> for WordBy<G, FL>
where
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = WordByState<FL::State, FL::Output>;
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial(WordByState::SkipPre(fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            WordByState::SkipPre(fs) => {
                if (self.is_sep)(&input) {
                    Step::Partial(0, WordByState::SkipPre(fs))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, WordByState::InWord(fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            WordByState::InWord(fs) => {
                if (self.is_sep)(&input) {
                    let b = self.fold.extract(fs);
                    Step::Partial(0, WordByState::SkipPost(b))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, WordByState::InWord(fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            WordByState::SkipPost(b) => {
                if (self.is_sep)(&input) {
                    Step::Partial(0, WordByState::SkipPost(b))
                } else {
                    Step::Done(1, b)
                }
            }
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        match state {
            WordByState::SkipPre(fs) | WordByState::InWord(fs) => {
                Step::Done(0, self.fold.extract(fs))
            }
            WordByState::SkipPost(b) => Step::Done(0, b),
        }
    }
}

/// Progress of a [`word_framed_by`] parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFramedState<S, B> {
    /// Dropping separators in front of the word.
    SkipPre(S),
    /// Collecting word elements at the given frame depth.
    InWord(usize, S),
    /// The previous element was an escape; the next is taken literally.
    Escaped(usize, S),
    /// Word finished; dropping trailing separators.
    SkipPost(B),
}

/// See [`word_framed_by`].
pub struct WordFramedBy<E, B, D, G, FL> {
    is_esc: E,
    is_begin: B,
    is_end: D,
    is_sep: G,
    fold: FL,
}

/// Creates a parser for one separator-delimited word in which frames protect
/// separators: between a frame-start and the balancing frame-end element,
/// separators are ordinary content.
///
/// Frame delimiters and escape elements are dropped from the content; an
/// escaped element is taken literally.
pub fn word_framed_by<A, E, B, D, G, FL>(
    is_esc: E,
    is_begin: B,
    is_end: D,
    is_sep: G,
    fold: FL,
) -> WordFramedBy<E, B, D, G, FL>
where
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
    G: FnMut(&A) -> bool,
{
    WordFramedBy {
        is_esc,
        is_begin,
        is_end,
        is_sep,
        fold,
    }
}

impl<A, E, B, D, G, FL> Parser<A> for WordFramedBy<E, B, D, G, FL>
where
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = WordFramedState<FL::State, FL::Output>;
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial(WordFramedState::SkipPre(fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match state {
            WordFramedState::SkipPre(fs) => {
                if (self.is_esc)(&input) {
                    Step::Partial(0, WordFramedState::Escaped(0, fs))
                } else if (self.is_begin)(&input) {
                    Step::Partial(0, WordFramedState::InWord(1, fs))
                } else if (self.is_end)(&input) {
                    Step::Error("word_framed_by: missing frame start".into())
                } else if (self.is_sep)(&input) {
                    Step::Partial(0, WordFramedState::SkipPre(fs))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, WordFramedState::InWord(0, fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            WordFramedState::InWord(depth, fs) => {
                if (self.is_esc)(&input) {
                    Step::Partial(0, WordFramedState::Escaped(depth, fs))
                } else if depth == 0 {
                    if (self.is_begin)(&input) {
                        Step::Partial(0, WordFramedState::InWord(1, fs))
                    } else if (self.is_end)(&input) {
                        Step::Error("word_framed_by: missing frame start".into())
                    } else if (self.is_sep)(&input) {
                        let b = self.fold.extract(fs);
                        Step::Partial(0, WordFramedState::SkipPost(b))
                    } else {
                        match self.fold.step(fs, input) {
                            fold::Step::Partial(fs) => {
                                Step::Partial(0, WordFramedState::InWord(0, fs))
                            }
                            fold::Step::Done(b) => Step::Done(0, b),
                        }
                    }
                } else if (self.is_end)(&input) {
                    Step::Partial(0, WordFramedState::InWord(depth - 1, fs))
                } else if (self.is_begin)(&input) {
                    Step::Partial(0, WordFramedState::InWord(depth + 1, fs))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => {
                            Step::Partial(0, WordFramedState::InWord(depth, fs))
                        }
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            WordFramedState::Escaped(depth, fs) => match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, WordFramedState::InWord(depth, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            },
            WordFramedState::SkipPost(b) => {
                if (self.is_sep)(&input) {
                    Step::Partial(0, WordFramedState::SkipPost(b))
                } else {
                    Step::Done(1, b)
                }
            }
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        match state {
            WordFramedState::SkipPre(fs) | WordFramedState::InWord(0, fs) => {
                Step::Done(0, self.fold.extract(fs))
            }
            WordFramedState::InWord(..) => Step::Error("word_framed_by: missing frame end".into()),
            WordFramedState::Escaped(..) => Step::Error("word_framed_by: trailing escape".into()),
            WordFramedState::SkipPost(b) => Step::Done(0, b),
        }
    }
}

/// Progress of a [`word_quoted_by`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordQuotedState<A, S, B> {
    /// Dropping separators in front of the word.
    SkipPre(S),
    /// Collecting word elements outside any quote.
    Unquoted(S),
    /// Escape seen outside a quote; the next element is taken literally.
    UnquotedEsc(S),
    /// Inside a quote: the opening element, its matching closer, and the
    /// nesting depth.
    Quoted(A, A, usize, S),
    /// Escape seen inside a quote.
    QuotedEsc(A, A, usize, S),
    /// Word finished; dropping trailing separators.
    SkipPost(B),
}

/// See [`word_quoted_by`].
pub struct WordQuotedBy<E, B, D, T, G, FL> {
    keep_quotes: bool,
    is_esc: E,
    is_begin: B,
    is_end: D,
    to_right: T,
    is_sep: G,
    fold: FL,
}

/// Creates a parser for one separator-delimited word with pairing quotes.
///
/// When a quote-start element is seen, its matching closer is computed with
/// `to_right`; until that closer appears, separators and other quote
/// elements are ordinary content. The same quote element nests. With
/// `keep_quotes` set, quote elements are kept in the content, otherwise they
/// are dropped. Escape elements are always dropped and make the following
/// element literal.
pub fn word_quoted_by<A, E, B, D, T, G, FL>(
    keep_quotes: bool,
    is_esc: E,
    is_begin: B,
    is_end: D,
    to_right: T,
    is_sep: G,
    fold: FL,
) -> WordQuotedBy<E, B, D, T, G, FL>
where
    A: Clone + PartialEq,
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
    T: FnMut(&A) -> A,
    G: FnMut(&A) -> bool,
{
    WordQuotedBy {
        keep_quotes,
        is_esc,
        is_begin,
        is_end,
        to_right,
        is_sep,
        fold,
    }
}

/// Feeds a quote element to the fold when quotes are kept, or drops it.
fn quote_element<A, FL>(keep: bool, fold: &mut FL, fs: FL::State, input: A) -> Result<FL::State, FL::Output>
where
    FL: Fold<A>,
{
    if keep {
        match fold.step(fs, input) {
            fold::Step::Partial(fs) => Ok(fs),
            fold::Step::Done(b) => Err(b),
        }
    } else {
        Ok(fs)
    }
}

impl<A, E, B, D, T, G, FL> Parser<A> for WordQuotedBy<E, B, D, T, G, FL>
where
    A: Clone + PartialEq,
    E: FnMut(&A) -> bool,
    B: FnMut(&A) -> bool,
    D: FnMut(&A) -> bool,
    T: FnMut(&A) -> A,
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = WordQuotedState<A, FL::State, FL::Output>;
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial(WordQuotedState::SkipPre(fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        use WordQuotedState::*;
        match state {
            SkipPre(fs) => {
                if (self.is_esc)(&input) {
                    Step::Partial(0, UnquotedEsc(fs))
                } else if (self.is_begin)(&input) {
                    let closer = (self.to_right)(&input);
                    let opener = input.clone();
                    match quote_element(self.keep_quotes, &mut self.fold, fs, input) {
                        Ok(fs) => Step::Partial(0, Quoted(opener, closer, 1, fs)),
                        Err(b) => Step::Done(0, b),
                    }
                } else if (self.is_end)(&input) {
                    Step::Error("word_quoted_by: missing frame start".into())
                } else if (self.is_sep)(&input) {
                    Step::Partial(0, SkipPre(fs))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, Unquoted(fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            Unquoted(fs) => {
                if (self.is_esc)(&input) {
                    Step::Partial(0, UnquotedEsc(fs))
                } else if (self.is_begin)(&input) {
                    let closer = (self.to_right)(&input);
                    let opener = input.clone();
                    match quote_element(self.keep_quotes, &mut self.fold, fs, input) {
                        Ok(fs) => Step::Partial(0, Quoted(opener, closer, 1, fs)),
                        Err(b) => Step::Done(0, b),
                    }
                } else if (self.is_end)(&input) {
                    Step::Error("word_quoted_by: missing frame start".into())
                } else if (self.is_sep)(&input) {
                    let b = self.fold.extract(fs);
                    Step::Partial(0, SkipPost(b))
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, Unquoted(fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            UnquotedEsc(fs) => match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, Unquoted(fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            },
            Quoted(opener, closer, depth, fs) => {
                if (self.is_esc)(&input) {
                    Step::Partial(0, QuotedEsc(opener, closer, depth, fs))
                } else if input == closer {
                    if depth == 1 {
                        match quote_element(self.keep_quotes, &mut self.fold, fs, input) {
                            Ok(fs) => Step::Partial(0, Unquoted(fs)),
                            Err(b) => Step::Done(0, b),
                        }
                    } else {
                        match quote_element(self.keep_quotes, &mut self.fold, fs, input) {
                            Ok(fs) => Step::Partial(0, Quoted(opener, closer, depth - 1, fs)),
                            Err(b) => Step::Done(0, b),
                        }
                    }
                } else if input == opener {
                    match quote_element(self.keep_quotes, &mut self.fold, fs, input) {
                        Ok(fs) => Step::Partial(0, Quoted(opener, closer, depth + 1, fs)),
                        Err(b) => Step::Done(0, b),
                    }
                } else {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => {
                            Step::Partial(0, Quoted(opener, closer, depth, fs))
                        }
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                }
            }
            QuotedEsc(opener, closer, depth, fs) => match self.fold.step(fs, input) {
                fold::Step::Partial(fs) => Step::Partial(0, Quoted(opener, closer, depth, fs)),
                fold::Step::Done(b) => Step::Done(0, b),
            },
            SkipPost(b) => {
                if (self.is_sep)(&input) {
                    Step::Partial(0, SkipPost(b))
                } else {
                    Step::Done(1, b)
                }
            }
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        use WordQuotedState::*;
        match state {
            SkipPre(fs) | Unquoted(fs) => Step::Done(0, self.fold.extract(fs)),
            UnquotedEsc(..) | QuotedEsc(..) => {
                Step::Error("word_quoted_by: trailing escape".into())
            }
            Quoted(..) => Step::Error("word_quoted_by: missing frame end".into()),
            SkipPost(b) => Step::Done(0, b),
        }
    }
}

/// See [`group_by`].
pub struct GroupBy<G, FL> {
    eq: G,
    fold: FL,
}

/// Creates a parser that collects a group of elements all related to the
/// group's first element by `eq`.
///
/// The first element violating `eq` with the group anchor is given back to
/// the driver. Never fails.
pub fn group_by<A, G, FL>(eq: G, fold: FL) -> GroupBy<G, FL>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
{
    GroupBy { eq, fold }
}

impl<A, G, FL> Parser<A> for GroupBy<G, FL>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
    FL: Fold<A>,
{
    type State = (Option<A>, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial((None, fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, (anchor, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        match anchor {
            None => {
                let anchor = input.clone();
                match self.fold.step(fs, input) {
                    fold::Step::Partial(fs) => Step::Partial(0, (Some(anchor), fs)),
                    fold::Step::Done(b) => Step::Done(0, b),
                }
            }
            Some(anchor) => {
                if (self.eq)(&anchor, &input) {
                    match self.fold.step(fs, input) {
                        fold::Step::Partial(fs) => Step::Partial(0, (Some(anchor), fs)),
                        fold::Step::Done(b) => Step::Done(0, b),
                    }
                } else {
                    Step::Done(1, self.fold.extract(fs))
                }
            }
        }
    }

    fn extract(&mut self, (_, fs): Self::State) -> Step<Self::State, Self::Output> {
        Step::Done(0, self.fold.extract(fs))
    }
}

/// See [`group_by_rolling`].
pub struct GroupByRolling<G, FL> {
    eq: G,
    fold: FL,
}

/// Like [`group_by`] but `eq` compares each element with its immediate
/// predecessor instead of the group's first element.
pub fn group_by_rolling<A, G, FL>(eq: G, fold: FL) -> GroupByRolling<G, FL>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
{
    GroupByRolling { eq, fold }
}

impl<A, G, FL> Parser<A> for GroupByRolling<G, FL>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
    FL: Fold<A>,
{
    type State = (Option<A>, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.fold.initial() {
            fold::Init::Partial(fs) => Init::Partial((None, fs)),
            fold::Init::Done(b) => Init::Done(b),
        }
    }

    fn step(&mut self, (prev, fs): Self::State, input: A) -> Step<Self::State, Self::Output> {
        if let Some(prev) = prev {
            if !(self.eq)(&prev, &input) {
                return Step::Done(1, self.fold.extract(fs));
            }
        }
        let prev = input.clone();
        match self.fold.step(fs, input) {
            fold::Step::Partial(fs) => Step::Partial(0, (Some(prev), fs)),
            fold::Step::Done(b) => Step::Done(0, b),
        }
    }

    fn extract(&mut self, (_, fs): Self::State) -> Step<Self::State, Self::Output> {
        Step::Done(0, self.fold.extract(fs))
    }
}

/// Progress of a [`group_by_rolling_either`] parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollingEitherState<A, SL, SR> {
    /// Nothing consumed yet.
    Fresh(SL, SR),
    /// One element seen; the branch is decided by the next one.
    Undecided(A, SL, SR),
    /// Collecting a run of elements related by the comparison.
    GoLeft(A, SL),
    /// Collecting a run of elements unrelated by the comparison.
    GoRight(A, SR),
}

/// See [`group_by_rolling_either`].
pub struct GroupByRollingEither<G, FL, FR> {
    eq: G,
    left: FL,
    right: FR,
}

/// Like [`group_by_rolling`] but with two collecting folds: a group whose
/// rolling comparisons hold goes into `left`, a group whose comparisons fail
/// goes into `right`. The first two elements decide the branch; a single
/// element group goes left.
pub fn group_by_rolling_either<A, G, FL, FR>(
    eq: G,
    left: FL,
    right: FR,
) -> GroupByRollingEither<G, FL, FR>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
{
    GroupByRollingEither { eq, left, right }
}

impl<A, G, FL, FR> Parser<A> for GroupByRollingEither<G, FL, FR>
where
    A: Clone,
    G: FnMut(&A, &A) -> bool,
    FL: Fold<A>,
    FR: Fold<A>,
{
    type State = RollingEitherState<A, FL::State, FR::State>;
    type Output = Either<FL::Output, FR::Output>;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let sl = match self.left.initial() {
            fold::Init::Partial(sl) => sl,
            fold::Init::Done(b) => return Init::Done(Either::Left(b)),
        };
        let sr = match self.right.initial() {
            fold::Init::Partial(sr) => sr,
            fold::Init::Done(c) => return Init::Done(Either::Right(c)),
        };
        Init::Partial(RollingEitherState::Fresh(sl, sr))
    }

    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        use RollingEitherState::*;
        match state {
            Fresh(sl, sr) => Step::Partial(0, Undecided(input, sl, sr)),
            Undecided(prev, sl, sr) => {
                if (self.eq)(&prev, &input) {
                    let sl = match self.left.step(sl, prev) {
                        fold::Step::Partial(sl) => sl,
                        fold::Step::Done(b) => return Step::Done(1, Either::Left(b)),
                    };
                    match self.left.step(sl, input.clone()) {
                        fold::Step::Partial(sl) => Step::Partial(0, GoLeft(input, sl)),
                        fold::Step::Done(b) => Step::Done(0, Either::Left(b)),
                    }
                } else {
                    let sr = match self.right.step(sr, prev) {
                        fold::Step::Partial(sr) => sr,
                        fold::Step::Done(c) => return Step::Done(1, Either::Right(c)),
                    };
                    match self.right.step(sr, input.clone()) {
                        fold::Step::Partial(sr) => Step::Partial(0, GoRight(input, sr)),
                        fold::Step::Done(c) => Step::Done(0, Either::Right(c)),
                    }
                }
            }
            GoLeft(prev, sl) => {
                if (self.eq)(&prev, &input) {
                    match self.left.step(sl, input.clone()) {
                        fold::Step::Partial(sl) => Step::Partial(0, GoLeft(input, sl)),
                        fold::Step::Done(b) => Step::Done(0, Either::Left(b)),
                    }
                } else {
                    Step::Done(1, Either::Left(self.left.extract(sl)))
                }
            }
            GoRight(prev, sr) => {
                if !(self.eq)(&prev, &input) {
                    match self.right.step(sr, input.clone()) {
                        fold::Step::Partial(sr) => Step::Partial(0, GoRight(input, sr)),
                        fold::Step::Done(c) => Step::Done(0, Either::Right(c)),
                    }
                } else {
                    Step::Done(1, Either::Right(self.right.extract(sr)))
                }
            }
        }
    }

    fn extract(&mut self, state: Self::State) -> Step<Self::State, Self::Output> {
        use RollingEitherState::*;
        match state {
            Fresh(sl, _) => Step::Done(0, Either::Left(self.left.extract(sl))),
            Undecided(prev, sl, _) => match self.left.step(sl, prev) {
                fold::Step::Partial(sl) => Step::Done(0, Either::Left(self.left.extract(sl))),
                fold::Step::Done(b) => Step::Done(0, Either::Left(b)),
            },
            GoLeft(_, sl) => Step::Done(0, Either::Left(self.left.extract(sl))),
            GoRight(_, sr) => Step::Done(0, Either::Right(self.right.extract(sr))),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::fold::{self, Fold as _};
    use crate::parser;
    use crate::stream::from_list;
    use crate::{Either, ParseDriver};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn string(v: Vec<char>) -> String {
        v.into_iter().collect()
    }

    #[test]
    fn take_while_gives_back_the_boundary() {
        assert_eq!(
            from_list(vec![0, 0, 1, 0, 1]).parse(parser::take_while(|&x| x == 0, fold::to_list())),
            Ok(vec![0, 0])
        );
        let mut driver = ParseDriver::new(from_list(vec![1, 1, 2, 3]));
        assert_eq!(
            driver.parse(&mut parser::take_while(|&x| x == 1, fold::to_list())),
            Ok(vec![1, 1])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(2));
    }

    #[test]
    fn take_while_accepts_everything_to_eof() {
        assert_eq!(
            from_list(vec![0, 0]).parse(parser::take_while(|&x| x == 0, fold::to_list())),
            Ok(vec![0, 0])
        );
        assert_eq!(
            from_list(Vec::<i32>::new()).parse(parser::take_while(|&x| x == 0, fold::to_list())),
            Ok(vec![])
        );
    }

    #[test]
    fn take_while1_needs_one_match() {
        assert_eq!(
            from_list(vec![2, 4, 5]).parse(parser::take_while1(|&x| x % 2 == 0, fold::to_list())),
            Ok(vec![2, 4])
        );
        assert_matches!(
            from_list(vec![5]).parse(parser::take_while1(|&x| x % 2 == 0, fold::to_list())),
            Err(..)
        );
        assert_matches!(
            from_list(Vec::<i32>::new())
                .parse(parser::take_while1(|&x| x % 2 == 0, fold::to_list())),
            Err(..)
        );
    }

    #[test]
    fn take_while_p_limits_an_inner_parser() {
        let inner = parser::take_eq(2, fold::to_list());
        assert_eq!(
            from_list(vec![2, 4, 5]).parse(parser::take_while_p(|&x| x % 2 == 0, inner)),
            Ok(vec![2, 4])
        );
        // The inner parser fails if the predicate cuts it short.
        let inner = parser::take_eq(3, fold::to_list());
        assert_matches!(
            from_list(vec![2, 4, 5]).parse(parser::take_while_p(|&x| x % 2 == 0, inner)),
            Err(..)
        );
    }

    #[test]
    fn drop_while_discards_a_prefix() {
        let mut driver = ParseDriver::new(from_list(vec![0, 0, 7, 8]));
        assert_eq!(driver.parse(&mut parser::drop_while(|&x| x == 0)), Ok(()));
        assert_eq!(driver.parse(&mut parser::one()), Ok(7));
    }

    #[test]
    fn take_eq_counts_exactly() {
        assert_eq!(
            from_list(vec![1, 2, 3]).parse(parser::take_eq(2, fold::to_list())),
            Ok(vec![1, 2])
        );
        let err = from_list(vec![1, 2, 3])
            .parse(parser::take_eq(4, fold::to_list()))
            .unwrap_err();
        assert_eq!(
            err.message,
            "take_eq: expecting exactly 4 elements, input terminated on 3"
        );
        assert_eq!(
            from_list(vec![1, 2]).parse(parser::take_eq(0, fold::to_list())),
            Ok(vec![])
        );
    }

    #[test]
    fn take_ge_consumes_the_rest() {
        assert_eq!(
            from_list(vec![1, 2, 3]).parse(parser::take_ge(2, fold::to_list())),
            Ok(vec![1, 2, 3])
        );
        assert_matches!(
            from_list(vec![1]).parse(parser::take_ge(2, fold::to_list())),
            Err(..)
        );
        // A terminating fold stops it early.
        assert_eq!(
            from_list(vec![1, 2, 3, 4]).parse(parser::take_ge(2, fold::Fold::<i32>::take(fold::to_list(), 3))),
            Ok(vec![1, 2, 3])
        );
    }

    #[test]
    fn take_between_bounds() {
        assert_eq!(
            from_list(vec![1, 2, 3, 4]).parse(parser::take_between(1, 3, fold::to_list())),
            Ok(vec![1, 2, 3])
        );
        assert_eq!(
            from_list(vec![1, 2]).parse(parser::take_between(1, 3, fold::to_list())),
            Ok(vec![1, 2])
        );
        assert_matches!(
            from_list(Vec::<i32>::new()).parse(parser::take_between(1, 3, fold::to_list())),
            Err(..)
        );
        assert_matches!(
            from_list(vec![1]).parse(parser::take_between(3, 2, fold::to_list())),
            Err(..)
        );
    }

    #[test]
    fn take_end_by_keeps_or_drops_the_terminator() {
        let input = || from_list(chars("ab\ncd"));
        assert_eq!(
            input()
                .parse(parser::take_end_by(|&c| c == '\n', parser::from_fold(fold::to_list())))
                .map(string),
            Ok("ab\n".to_string())
        );
        assert_eq!(
            input()
                .parse(parser::take_end_by_drop(
                    |&c| c == '\n',
                    parser::from_fold(fold::to_list())
                ))
                .map(string),
            Ok("ab".to_string())
        );
        // The terminator is consumed either way.
        let mut driver = ParseDriver::new(from_list(chars("ab\ncd")));
        assert_eq!(
            driver
                .parse(&mut parser::take_end_by_drop(
                    |&c| c == '\n',
                    parser::from_fold(fold::to_list())
                ))
                .map(string),
            Ok("ab".to_string())
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok('c'));
    }

    #[test]
    fn take_end_by_esc_protects_the_terminator() {
        let p = parser::take_end_by_esc(
            |&c| c == '\\',
            |&c| c == ';',
            parser::from_fold(fold::to_list()),
        );
        assert_eq!(
            from_list(chars("a\\;b;x")).parse(p).map(string),
            Ok("a\\;b;".to_string())
        );
    }

    #[test]
    fn take_start_by_frames() {
        let mut driver = ParseDriver::new(from_list(chars(">ab>cd")));
        assert_eq!(
            driver
                .parse(&mut parser::take_start_by(|&c| c == '>', fold::to_list()))
                .map(string),
            Ok(">ab".to_string())
        );
        assert_eq!(
            driver
                .parse(&mut parser::take_start_by_drop(|&c| c == '>', fold::to_list()))
                .map(string),
            Ok("cd".to_string())
        );
        assert_matches!(
            from_list(chars("ab")).parse(parser::take_start_by(|&c| c == '>', fold::to_list())),
            Err(..)
        );
    }

    #[test]
    fn framed_content_balances_nesting() {
        let braces = || {
            parser::take_framed_by_esc(
                |&c| c == '\\',
                |&c| c == '{',
                |&c| c == '}',
                fold::to_list(),
            )
        };
        assert_eq!(
            from_list(chars("{hello {world}}")).parse(braces()).map(string),
            Ok("hello {world}".to_string())
        );
        assert_eq!(
            from_list(chars("{a\\}b}")).parse(braces()).map(string),
            Ok("a}b".to_string())
        );
        assert_matches!(from_list(chars("{abc")).parse(braces()), Err(..));
        assert_matches!(from_list(chars("abc}")).parse(braces()), Err(..));

        let parens = parser::take_framed_by(|&c| c == '(', |&c| c == ')', fold::to_list());
        assert_eq!(
            from_list(chars("(a(b)c)d")).parse(parens).map(string),
            Ok("a(b)c".to_string())
        );
    }

    #[test]
    fn framed_generic_without_a_frame_start() {
        let until_semi = parser::take_framed_by_generic(
            None::<fn(&char) -> bool>,
            None::<fn(&char) -> bool>,
            Some(|c: &char| *c == ';'),
            fold::to_list(),
        );
        assert_eq!(
            from_list(chars("ab;c")).parse(until_semi).map(string),
            Ok("ab".to_string())
        );
    }

    #[test]
    #[should_panic]
    fn framed_generic_requires_an_end() {
        let _ = parser::take_framed_by_generic(
            None::<fn(&char) -> bool>,
            Some(|c: &char| *c == '('),
            None::<fn(&char) -> bool>,
            fold::to_list(),
        );
    }

    #[test]
    fn word_by_splits_words() {
        let word = || parser::word_by(|&c| c == ' ', fold::to_list());
        let mut driver = ParseDriver::new(from_list(chars("  foo  bar")));
        assert_eq!(driver.parse(&mut word()).map(string), Ok("foo".to_string()));
        assert_eq!(driver.parse(&mut word()).map(string), Ok("bar".to_string()));
        assert_eq!(from_list(chars("abc")).parse(word()).map(string), Ok("abc".to_string()));
    }

    #[test]
    fn word_framed_by_protects_separators() {
        let word = || {
            parser::word_framed_by(
                |&c| c == '\\',
                |&c| c == '\'',
                |&c| c == '\'',
                |&c| c == ' ',
                fold::to_list(),
            )
        };
        let mut driver = ParseDriver::new(from_list(chars("'a b' c")));
        assert_eq!(driver.parse(&mut word()).map(string), Ok("a b".to_string()));
        assert_eq!(driver.parse(&mut word()).map(string), Ok("c".to_string()));
        assert_matches!(from_list(chars("'ab")).parse(word()), Err(..));
    }

    #[test]
    fn word_quoted_by_can_keep_quotes() {
        let quoted = |keep| {
            parser::word_quoted_by(
                keep,
                |&c| c == '\\',
                |&c| c == '\'',
                |&c| c == '\'',
                |c: &char| *c,
                |&c| c == ' ',
                fold::to_list(),
            )
        };
        assert_eq!(
            from_list(chars("'a b'c d")).parse(quoted(false)).map(string),
            Ok("a bc".to_string())
        );
        assert_eq!(
            from_list(chars("'a b'c d")).parse(quoted(true)).map(string),
            Ok("'a b'c".to_string())
        );
    }

    #[test]
    fn group_by_anchors_on_the_first_element() {
        let mut driver = ParseDriver::new(from_list(vec![3, 5, 4, 1]));
        assert_eq!(
            driver.parse(&mut parser::group_by(|a, b| a < b, fold::to_list())),
            Ok(vec![3, 5, 4])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(1));
    }

    #[test]
    fn group_by_rolling_compares_neighbours() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3, 2, 1]));
        assert_eq!(
            driver.parse(&mut parser::group_by_rolling(|a, b| a < b, fold::to_list())),
            Ok(vec![1, 2, 3])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(2));
    }

    #[test]
    fn group_by_rolling_either_routes_runs() {
        let rising = || parser::group_by_rolling_either(|a, b| a < b, fold::to_list(), fold::to_list());
        assert_eq!(
            from_list(vec![1, 2, 3, 3]).parse(rising()),
            Ok(Either::Left(vec![1, 2, 3]))
        );
        assert_eq!(
            from_list(vec![3, 2, 1, 5]).parse(rising()),
            Ok(Either::Right(vec![3, 2, 1]))
        );
        assert_eq!(from_list(vec![5]).parse(rising()), Ok(Either::Left(vec![5])));
    }
}
