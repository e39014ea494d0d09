//! Pull-based streams with a fusable step protocol.
//!
//! A [`Stream`] is a step function paired with a seed state. Driving the
//! stream means calling the step function with the current state; each call
//! either yields an element with a new state, skips to a new state without
//! producing anything, or stops. [`Skip`][Step::Skip] is what lets
//! transformers like [`filter`][Stream::filter] and
//! [`flat_map`][Stream::flat_map] advance their internal state without
//! producing an element, keeping every step call non-recursive.
//!
//! Transformers wrap the step function of their input, so a chain of
//! transformers monomorphizes into one loop over a compound state. Nothing is
//! boxed and nothing is allocated between stages.

use crate::driver::ParseDriver;
use crate::parser::Parser;
use crate::{fold, fold::Fold, Either, ParseError};

use num_traits::{CheckedAdd, One};

/// Result of one step of a stream.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S, A> {
    /// An element was produced; continue from the new state.
    Yield(A, S),
    /// No element this step; continue from the new state.
    Skip(S),
    /// The stream is exhausted.
    Stop,
}

/// A pull stream: a step function and the seed state it starts from.
///
/// The state type changes as transformers are applied, which is how composed
/// pipelines fuse: the state of `s.map(f).take(3)` is the state of `s` plus a
/// counter, and its step function is the composition of the wrapped step
/// functions.
pub struct Stream<S, F> {
    step: F,
    seed: S,
}

impl<S, F> Stream<S, F> {
    /// Creates a stream from a seed state and a step function.
    ///
    /// This is the primitive constructor; every generator in this module is a
    /// use of it.
    pub fn new<A>(seed: S, step: F) -> Self
    where
        F: FnMut(S) -> Step<S, A>,
    {
        Stream { step, seed }
    }

    pub(crate) fn into_parts(self) -> (S, F) {
        (self.seed, self.step)
    }
}

/// Creates a stream over the elements of a vector.
pub fn from_list<A>(items: Vec<A>) -> Stream<std::vec::IntoIter<A>, impl FnMut(std::vec::IntoIter<A>) -> Step<std::vec::IntoIter<A>, A>> {
    from_iter(items)
}

/// Creates a stream over the elements of any iterable.
pub fn from_iter<I: IntoIterator>(
    items: I,
) -> Stream<I::IntoIter, impl FnMut(I::IntoIter) -> Step<I::IntoIter, I::Item>> {
    Stream::new(items.into_iter(), |mut it| match it.next() {
        Some(a) => Step::Yield(a, it),
        None => Step::Stop,
    })
}

/// Creates a stream by repeatedly applying `f` to a state, stopping on
/// `None`.
pub fn unfold<S, A, G>(seed: S, mut f: G) -> Stream<S, impl FnMut(S) -> Step<S, A>>
where
    G: FnMut(S) -> Option<(A, S)>,
{
    Stream::new(seed, move |s| match f(s) {
        Some((a, s)) => Step::Yield(a, s),
        None => Step::Stop,
    })
}

/// Creates a stream counting from `lo` to `hi` inclusive.
pub fn enumerate_from_to<T>(lo: T, hi: T) -> Stream<Option<T>, impl FnMut(Option<T>) -> Step<Option<T>, T>>
where
    T: Copy + PartialOrd + CheckedAdd + One,
{
    Stream::new(Some(lo), move |cur| match cur {
        Some(v) if v <= hi => Step::Yield(v, v.checked_add(&T::one())),
        _ => Step::Stop,
    })
}

/// Creates a stream of `count` clones of `value`.
pub fn replicate<A: Clone>(count: usize, value: A) -> Stream<usize, impl FnMut(usize) -> Step<usize, A>> {
    Stream::new(0, move |produced| {
        if produced < count {
            Step::Yield(value.clone(), produced + 1)
        } else {
            Step::Stop
        }
    })
}

/// Creates an infinite stream that runs `action` for every element.
pub fn repeat_with<A, G>(mut action: G) -> Stream<(), impl FnMut(()) -> Step<(), A>>
where
    G: FnMut() -> A,
{
    Stream::new((), move |()| Step::Yield(action(), ()))
}

impl<A, S, F> Stream<S, F>
where
    F: FnMut(S) -> Step<S, A>,
{
    /// Maps every element with `f`.
    pub fn map<B, G>(self, mut f: G) -> Stream<S, impl FnMut(S) -> Step<S, B>>
    where
        G: FnMut(A) -> B,
    {
        let mut step = self.step;
        Stream::new(self.seed, move |s| match step(s) {
            Step::Yield(a, s) => Step::Yield(f(a), s),
            Step::Skip(s) => Step::Skip(s),
            Step::Stop => Step::Stop,
        })
    }

    /// Keeps only elements satisfying `pred`.
    pub fn filter<G>(self, mut pred: G) -> Stream<S, impl FnMut(S) -> Step<S, A>>
    where
        G: FnMut(&A) -> bool,
    {
        let mut step = self.step;
        Stream::new(self.seed, move |s| match step(s) {
            Step::Yield(a, s) => {
                if pred(&a) {
                    Step::Yield(a, s)
                } else {
                    Step::Skip(s)
                }
            }
            Step::Skip(s) => Step::Skip(s),
            Step::Stop => Step::Stop,
        })
    }

    /// Maps every element with `f`, dropping elements mapped to `None`.
    pub fn filter_map<B, G>(self, mut f: G) -> Stream<S, impl FnMut(S) -> Step<S, B>>
    where
        G: FnMut(A) -> Option<B>,
    {
        let mut step = self.step;
        Stream::new(self.seed, move |s| match step(s) {
            Step::Yield(a, s) => match f(a) {
                Some(b) => Step::Yield(b, s),
                None => Step::Skip(s),
            },
            Step::Skip(s) => Step::Skip(s),
            Step::Stop => Step::Stop,
        })
    }

    /// Produces at most the first `count` elements.
    pub fn take(self, count: usize) -> Stream<(S, usize), impl FnMut((S, usize)) -> Step<(S, usize), A>> {
        let mut step = self.step;
        Stream::new((self.seed, 0), move |(s, taken)| {
            if taken >= count {
                return Step::Stop;
            }
            match step(s) {
                Step::Yield(a, s) => Step::Yield(a, (s, taken + 1)),
                Step::Skip(s) => Step::Skip((s, taken)),
                Step::Stop => Step::Stop,
            }
        })
    }

    /// Produces elements while `pred` holds and stops at the first that does
    /// not.
    pub fn take_while<G>(self, mut pred: G) -> Stream<S, impl FnMut(S) -> Step<S, A>>
    where
        G: FnMut(&A) -> bool,
    {
        let mut step = self.step;
        Stream::new(self.seed, move |s| match step(s) {
            Step::Yield(a, s) => {
                if pred(&a) {
                    Step::Yield(a, s)
                } else {
                    Step::Stop
                }
            }
            Step::Skip(s) => Step::Skip(s),
            Step::Stop => Step::Stop,
        })
    }

    /// Discards the first `count` elements.
    pub fn skip(self, count: usize) -> Stream<(S, usize), impl FnMut((S, usize)) -> Step<(S, usize), A>> {
        let mut step = self.step;
        Stream::new((self.seed, count), move |(s, remaining)| match step(s) {
            Step::Yield(a, s) => {
                if remaining > 0 {
                    Step::Skip((s, remaining - 1))
                } else {
                    Step::Yield(a, (s, 0))
                }
            }
            Step::Skip(s) => Step::Skip((s, remaining)),
            Step::Stop => Step::Stop,
        })
    }

    /// Discards leading elements while `pred` holds.
    pub fn skip_while<G>(self, mut pred: G) -> Stream<(S, bool), impl FnMut((S, bool)) -> Step<(S, bool), A>>
    where
        G: FnMut(&A) -> bool,
    {
        let mut step = self.step;
        Stream::new((self.seed, true), move |(s, skipping)| match step(s) {
            Step::Yield(a, s) => {
                if skipping && pred(&a) {
                    Step::Skip((s, true))
                } else {
                    Step::Yield(a, (s, false))
                }
            }
            Step::Skip(s) => Step::Skip((s, skipping)),
            Step::Stop => Step::Stop,
        })
    }

    /// Runs `fold` over the stream, producing its accumulator before any
    /// input and after every consumed element.
    ///
    /// The stream ends when the input ends or the fold finishes early.
    pub fn scan<FL>(
        self,
        mut fold: FL,
    ) -> Stream<(S, Option<FL::State>, Option<FL::Output>), impl FnMut((S, Option<FL::State>, Option<FL::Output>)) -> Step<(S, Option<FL::State>, Option<FL::Output>), FL::Output>>
    where
        FL: Fold<A>,
        FL::State: Clone,
    {
        let mut step = self.step;
        let seed = match fold.initial() {
            fold::Init::Partial(fs) => {
                let first = fold.extract(fs.clone());
                (self.seed, Some(fs), Some(first))
            }
            fold::Init::Done(b) => (self.seed, None, Some(b)),
        };
        Stream::new(seed, move |(s, acc, pending)| {
            if let Some(b) = pending {
                return Step::Yield(b, (s, acc, None));
            }
            let fs = match acc {
                Some(fs) => fs,
                None => return Step::Stop,
            };
            match step(s) {
                Step::Yield(a, s) => match fold.step(fs, a) {
                    fold::Step::Partial(fs) => {
                        let out = fold.extract(fs.clone());
                        Step::Yield(out, (s, Some(fs), None))
                    }
                    fold::Step::Done(b) => Step::Yield(b, (s, None, None)),
                },
                Step::Skip(s) => Step::Skip((s, Some(fs), None)),
                Step::Stop => Step::Stop,
            }
        })
    }

    /// Like [`scan`][Stream::scan] but without the leading accumulator: one
    /// output per consumed element.
    pub fn postscan<FL>(
        self,
        mut fold: FL,
    ) -> Stream<(S, Option<FL::State>), impl FnMut((S, Option<FL::State>)) -> Step<(S, Option<FL::State>), FL::Output>>
    where
        FL: Fold<A>,
        FL::State: Clone,
    {
        let mut step = self.step;
        let seed = match fold.initial() {
            fold::Init::Partial(fs) => (self.seed, Some(fs)),
            fold::Init::Done(_) => (self.seed, None),
        };
        Stream::new(seed, move |(s, acc)| {
            let fs = match acc {
                Some(fs) => fs,
                None => return Step::Stop,
            };
            match step(s) {
                Step::Yield(a, s) => match fold.step(fs, a) {
                    fold::Step::Partial(fs) => {
                        let out = fold.extract(fs.clone());
                        Step::Yield(out, (s, Some(fs)))
                    }
                    fold::Step::Done(b) => Step::Yield(b, (s, None)),
                },
                Step::Skip(s) => Step::Skip((s, Some(fs))),
                Step::Stop => Step::Stop,
            }
        })
    }

    /// Maps every element together with its predecessor. The first element is
    /// mapped with `None` as its predecessor.
    pub fn rolling_map<B, G>(
        self,
        mut f: G,
    ) -> Stream<(S, Option<A>), impl FnMut((S, Option<A>)) -> Step<(S, Option<A>), B>>
    where
        A: Clone,
        G: FnMut(Option<&A>, &A) -> B,
    {
        let mut step = self.step;
        Stream::new((self.seed, None), move |(s, prev)| match step(s) {
            Step::Yield(a, s) => {
                let b = f(prev.as_ref(), &a);
                Step::Yield(b, (s, Some(a)))
            }
            Step::Skip(s) => Step::Skip((s, prev)),
            Step::Stop => Step::Stop,
        })
    }

    /// Pairs every element with its position, starting at `0`.
    pub fn enumerate(self) -> Stream<(S, usize), impl FnMut((S, usize)) -> Step<(S, usize), (usize, A)>> {
        let mut step = self.step;
        Stream::new((self.seed, 0), move |(s, index)| match step(s) {
            Step::Yield(a, s) => Step::Yield((index, a), (s, index + 1)),
            Step::Skip(s) => Step::Skip((s, index)),
            Step::Stop => Step::Stop,
        })
    }

    /// Inserts `separator` between consecutive elements.
    pub fn intersperse(
        self,
        separator: A,
    ) -> Stream<(S, bool, Option<A>), impl FnMut((S, bool, Option<A>)) -> Step<(S, bool, Option<A>), A>>
    where
        A: Clone,
    {
        self.intersperse_with(move || separator.clone())
    }

    /// Inserts the result of `separator` between consecutive elements.
    pub fn intersperse_with<G>(
        self,
        mut separator: G,
    ) -> Stream<(S, bool, Option<A>), impl FnMut((S, bool, Option<A>)) -> Step<(S, bool, Option<A>), A>>
    where
        G: FnMut() -> A,
    {
        let mut step = self.step;
        Stream::new((self.seed, false, None), move |(s, started, pending)| {
            if let Some(a) = pending {
                return Step::Yield(a, (s, started, None));
            }
            match step(s) {
                Step::Yield(a, s) => {
                    if started {
                        Step::Yield(separator(), (s, true, Some(a)))
                    } else {
                        Step::Yield(a, (s, true, None))
                    }
                }
                Step::Skip(s) => Step::Skip((s, started, None)),
                Step::Stop => Step::Stop,
            }
        })
    }

    /// Inserts `separator` after every element.
    pub fn intersperse_suffix(
        self,
        separator: A,
    ) -> Stream<(S, bool), impl FnMut((S, bool)) -> Step<(S, bool), A>>
    where
        A: Clone,
    {
        self.intersperse_suffix_with(move || separator.clone())
    }

    /// Inserts the result of `separator` after every element.
    pub fn intersperse_suffix_with<G>(
        self,
        mut separator: G,
    ) -> Stream<(S, bool), impl FnMut((S, bool)) -> Step<(S, bool), A>>
    where
        G: FnMut() -> A,
    {
        let mut step = self.step;
        Stream::new((self.seed, false), move |(s, separator_due)| {
            if separator_due {
                return Step::Yield(separator(), (s, false));
            }
            match step(s) {
                Step::Yield(a, s) => Step::Yield(a, (s, true)),
                Step::Skip(s) => Step::Skip((s, false)),
                Step::Stop => Step::Stop,
            }
        })
    }

    /// Drops elements equal to their immediate predecessor, as decided by
    /// `eq`.
    pub fn dedup_by<G>(
        self,
        mut eq: G,
    ) -> Stream<(S, Option<A>), impl FnMut((S, Option<A>)) -> Step<(S, Option<A>), A>>
    where
        A: Clone,
        G: FnMut(&A, &A) -> bool,
    {
        let mut step = self.step;
        Stream::new((self.seed, None), move |(s, prev)| match step(s) {
            Step::Yield(a, s) => {
                if let Some(p) = &prev {
                    if eq(p, &a) {
                        return Step::Skip((s, prev));
                    }
                }
                let remembered = a.clone();
                Step::Yield(a, (s, Some(remembered)))
            }
            Step::Skip(s) => Step::Skip((s, prev)),
            Step::Stop => Step::Stop,
        })
    }

    /// Produces all elements of `self`, then all elements of `other`.
    pub fn chain<S2, F2>(
        self,
        other: Stream<S2, F2>,
    ) -> Stream<Either<S, S2>, impl FnMut(Either<S, S2>) -> Step<Either<S, S2>, A>>
    where
        F2: FnMut(S2) -> Step<S2, A>,
    {
        let mut first = self.step;
        let mut second = other.step;
        let mut second_seed = Some(other.seed);
        Stream::new(Either::Left(self.seed), move |state| match state {
            Either::Left(s) => match first(s) {
                Step::Yield(a, s) => Step::Yield(a, Either::Left(s)),
                Step::Skip(s) => Step::Skip(Either::Left(s)),
                Step::Stop => {
                    let s = second_seed.take().expect("stream stepped after it stopped");
                    Step::Skip(Either::Right(s))
                }
            },
            Either::Right(s) => match second(s) {
                Step::Yield(a, s) => Step::Yield(a, Either::Right(s)),
                Step::Skip(s) => Step::Skip(Either::Right(s)),
                Step::Stop => Step::Stop,
            },
        })
    }

    /// Maps every element to a stream and produces the inner streams'
    /// elements in order.
    pub fn flat_map<B, S2, F2, G>(
        self,
        mut f: G,
    ) -> Stream<(S, Option<(F2, S2)>), impl FnMut((S, Option<(F2, S2)>)) -> Step<(S, Option<(F2, S2)>), B>>
    where
        G: FnMut(A) -> Stream<S2, F2>,
        F2: FnMut(S2) -> Step<S2, B>,
    {
        let mut step = self.step;
        Stream::new((self.seed, None), move |(s, inner)| match inner {
            Some((mut inner_step, inner_state)) => match inner_step(inner_state) {
                Step::Yield(b, is) => Step::Yield(b, (s, Some((inner_step, is)))),
                Step::Skip(is) => Step::Skip((s, Some((inner_step, is)))),
                Step::Stop => Step::Skip((s, None)),
            },
            None => match step(s) {
                Step::Yield(a, s) => {
                    let (inner_seed, inner_step) = f(a).into_parts();
                    Step::Skip((s, Some((inner_step, inner_seed))))
                }
                Step::Skip(s) => Step::Skip((s, None)),
                Step::Stop => Step::Stop,
            },
        })
    }

    /// Advances both streams in lockstep, combining their elements with `f`.
    /// The zip ends when either input ends.
    pub fn zip_with<B, C, S2, F2, G>(
        self,
        other: Stream<S2, F2>,
        mut f: G,
    ) -> Stream<(S, S2, Option<A>), impl FnMut((S, S2, Option<A>)) -> Step<(S, S2, Option<A>), C>>
    where
        F2: FnMut(S2) -> Step<S2, B>,
        G: FnMut(A, B) -> C,
    {
        let mut first = self.step;
        let mut second = other.step;
        Stream::new(
            (self.seed, other.seed, None),
            move |(s1, s2, pending)| match pending {
                None => match first(s1) {
                    Step::Yield(a, s1) => Step::Skip((s1, s2, Some(a))),
                    Step::Skip(s1) => Step::Skip((s1, s2, None)),
                    Step::Stop => Step::Stop,
                },
                Some(a) => match second(s2) {
                    Step::Yield(b, s2) => Step::Yield(f(a, b), (s1, s2, None)),
                    Step::Skip(s2) => Step::Skip((s1, s2, Some(a))),
                    Step::Stop => Step::Stop,
                },
            },
        )
    }

    /// Drives the stream to its end, discarding all elements.
    pub fn drain(self) {
        let Stream { mut step, seed } = self;
        let mut state = seed;
        loop {
            match step(state) {
                Step::Yield(_, s) | Step::Skip(s) => state = s,
                Step::Stop => return,
            }
        }
    }

    /// Reduces the stream with a closure and an initial accumulator.
    pub fn fold_with<B, G>(self, init: B, mut f: G) -> B
    where
        G: FnMut(B, A) -> B,
    {
        let Stream { mut step, seed } = self;
        let mut state = seed;
        let mut acc = init;
        loop {
            match step(state) {
                Step::Yield(a, s) => {
                    state = s;
                    acc = f(acc, a);
                }
                Step::Skip(s) => state = s,
                Step::Stop => return acc,
            }
        }
    }

    /// Collects all elements into a `Vec`.
    pub fn to_list(self) -> Vec<A> {
        self.fold_with(vec![], |mut items, a| {
            items.push(a);
            items
        })
    }

    /// Runs a [`Fold`] over the stream.
    pub fn fold<FL>(self, mut fold: FL) -> FL::Output
    where
        FL: Fold<A>,
    {
        let Stream { mut step, seed } = self;
        let mut fs = match fold.initial() {
            fold::Init::Partial(fs) => fs,
            fold::Init::Done(b) => return b,
        };
        let mut state = seed;
        loop {
            match step(state) {
                Step::Yield(a, s) => {
                    state = s;
                    match fold.step(fs, a) {
                        fold::Step::Partial(next) => fs = next,
                        fold::Step::Done(b) => return b,
                    }
                }
                Step::Skip(s) => state = s,
                Step::Stop => return fold.extract(fs),
            }
        }
    }

    /// Runs a [`Parser`] over the stream.
    ///
    /// Input beyond what the parser consumes is discarded; use
    /// [`ParseDriver`] directly to run several parsers in sequence over one
    /// stream.
    pub fn parse<P>(self, mut parser: P) -> Result<P::Output, ParseError>
    where
        A: Clone,
        P: Parser<A>,
    {
        ParseDriver::new(self).parse(&mut parser)
    }

    /// Splits the stream into a stream of parse results by running `parser`
    /// repeatedly.
    ///
    /// Each round starts on the input the previous round left unconsumed. A
    /// failed round yields its error and ends the stream; the error's
    /// position tells the caller where parsing stopped. A round that
    /// succeeds without consuming input is a bug in the parser and panics.
    pub fn parse_many<P>(
        self,
        parser: P,
    ) -> Stream<ParseDriver<A, S, F>, impl FnMut(ParseDriver<A, S, F>) -> Step<ParseDriver<A, S, F>, Result<P::Output, ParseError>>>
    where
        A: Clone,
        P: Parser<A>,
    {
        let mut parser = parser;
        Stream::new(ParseDriver::new(self), move |mut driver| {
            if !driver.has_pending_input() {
                return Step::Stop;
            }
            let start = driver.position();
            match driver.parse(&mut parser) {
                Ok(value) => {
                    if driver.position() == start {
                        panic!("parse_many: parser consumed no input");
                    }
                    Step::Yield(Ok(value), driver)
                }
                Err(err) => {
                    driver.halt();
                    Step::Yield(Err(err), driver)
                }
            }
        })
    }
}

impl<B, S, F> Stream<S, F>
where
    F: FnMut(S) -> Step<S, Option<B>>,
{
    /// Unwraps `Some` elements and drops `None` ones.
    pub fn flatten_options(self) -> Stream<S, impl FnMut(S) -> Step<S, B>> {
        self.filter_map(|opt| opt)
    }
}

/// Iterator over the elements of a [`Stream`].
pub struct IntoIter<S, F> {
    step: F,
    state: Option<S>,
}

impl<A, S, F> Iterator for IntoIter<S, F>
where
    F: FnMut(S) -> Step<S, A>,
{
    type Item = A;

    fn next(&mut self) -> Option<A> {
        let mut state = self.state.take()?;
        loop {
            match (self.step)(state) {
                Step::Yield(a, s) => {
                    self.state = Some(s);
                    return Some(a);
                }
                Step::Skip(s) => state = s,
                Step::Stop => return None,
            }
        }
    }
}

impl<A, S, F> IntoIterator for Stream<S, F>
where
    F: FnMut(S) -> Step<S, A>,
{
    type Item = A;
    type IntoIter = IntoIter<S, F>;

    fn into_iter(self) -> IntoIter<S, F> {
        IntoIter {
            step: self.step,
            state: Some(self.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_identity() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(from_list(items.clone()).to_list(), items);
        assert_eq!(from_list(Vec::<i32>::new()).to_list(), vec![]);
    }

    #[test]
    fn map_filter_fuse() {
        let out = from_list(vec![1, 2, 3, 4, 5, 6])
            .map(|x| x * 10)
            .filter(|x| x % 20 == 0)
            .to_list();
        assert_eq!(out, vec![20, 40, 60]);
    }

    #[test]
    fn take_and_skip() {
        let items = || from_list((1..=10).collect::<Vec<i32>>());
        assert_eq!(items().take(3).to_list(), vec![1, 2, 3]);
        assert_eq!(items().take(0).to_list(), vec![]);
        assert_eq!(items().skip(7).to_list(), vec![8, 9, 10]);
        assert_eq!(items().skip(20).to_list(), vec![]);
        assert_eq!(items().take_while(|&x| x < 4).to_list(), vec![1, 2, 3]);
        assert_eq!(items().skip_while(|&x| x < 9).to_list(), vec![9, 10]);
        // skip_while only drops the leading run
        assert_eq!(
            from_list(vec![1, 5, 1, 6]).skip_while(|&x| x < 3).to_list(),
            vec![5, 1, 6]
        );
    }

    #[test]
    fn generators() {
        assert_eq!(enumerate_from_to(3, 7).to_list(), vec![3, 4, 5, 6, 7]);
        assert_eq!(enumerate_from_to(3, 2).to_list(), Vec::<i32>::new());
        assert_eq!(enumerate_from_to(u8::MAX - 1, u8::MAX).to_list(), vec![254, 255]);
        assert_eq!(replicate(3, 'x').to_list(), vec!['x', 'x', 'x']);
        let mut counter = 0;
        assert_eq!(
            repeat_with(|| {
                counter += 1;
                counter
            })
            .take(4)
            .to_list(),
            vec![1, 2, 3, 4]
        );
        let fibs = unfold((0u64, 1u64), |(a, b)| Some((a, (b, a + b))));
        assert_eq!(fibs.take(7).to_list(), vec![0, 1, 1, 2, 3, 5, 8]);
    }

    #[test]
    fn scan_emits_initial_accumulator() {
        let out = from_list(vec![1, 2, 3]).scan(crate::fold::sum()).to_list();
        assert_eq!(out, vec![0, 1, 3, 6]);
        let out = from_list(Vec::<i32>::new()).scan(crate::fold::sum()).to_list();
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn postscan_emits_per_element() {
        let out = from_list(vec![1, 2, 3]).postscan(crate::fold::sum()).to_list();
        assert_eq!(out, vec![1, 3, 6]);
        let out = from_list(Vec::<i32>::new())
            .postscan(crate::fold::sum())
            .to_list();
        assert_eq!(out, Vec::<i32>::new());
    }

    #[test]
    fn rolling_map_sees_predecessor() {
        let out = from_list(vec![3, 5, 9])
            .rolling_map(|prev, cur| cur - prev.copied().unwrap_or(0))
            .to_list();
        assert_eq!(out, vec![3, 2, 4]);
    }

    #[test]
    fn enumerate_indexes_from_zero() {
        let out = from_list(vec!['a', 'b']).enumerate().to_list();
        assert_eq!(out, vec![(0, 'a'), (1, 'b')]);
    }

    #[test]
    fn intersperse_variants() {
        assert_eq!(
            from_list(vec![1, 2, 3]).intersperse(0).to_list(),
            vec![1, 0, 2, 0, 3]
        );
        assert_eq!(from_list(vec![1]).intersperse(0).to_list(), vec![1]);
        assert_eq!(
            from_list(vec![1, 2]).intersperse_suffix(0).to_list(),
            vec![1, 0, 2, 0]
        );
        assert_eq!(
            from_list(Vec::<i32>::new()).intersperse(0).to_list(),
            vec![]
        );
    }

    #[test]
    fn dedup_by_drops_adjacent_runs() {
        let out = from_list(vec![1, 1, 2, 2, 2, 1, 3])
            .dedup_by(|a, b| a == b)
            .to_list();
        assert_eq!(out, vec![1, 2, 1, 3]);
    }

    #[test]
    fn option_streams() {
        let out = from_list(vec![Some(1), None, Some(3)]).flatten_options().to_list();
        assert_eq!(out, vec![1, 3]);
        let out = from_list(vec![1, 2, 3, 4])
            .filter_map(|x| (x % 2 == 0).then(|| x * x))
            .to_list();
        assert_eq!(out, vec![4, 16]);
    }

    #[test]
    fn chain_concatenates() {
        let out = from_list(vec![1, 2]).chain(from_list(vec![3, 4])).to_list();
        assert_eq!(out, vec![1, 2, 3, 4]);
        let out = from_list(Vec::<i32>::new())
            .chain(from_list(vec![9]))
            .to_list();
        assert_eq!(out, vec![9]);
    }

    #[test]
    fn flat_map_flattens_in_order() {
        let out = from_list(vec![1, 3])
            .flat_map(|x| enumerate_from_to(x, x + 1))
            .to_list();
        assert_eq!(out, vec![1, 2, 3, 4]);
        let out = from_list(vec![1, 2, 3])
            .flat_map(|_| from_list(Vec::<i32>::new()))
            .to_list();
        assert_eq!(out, Vec::<i32>::new());
    }

    #[test]
    fn zip_ends_on_shorter() {
        let out = from_list(vec![1, 2, 3]).zip_with(from_list(vec![10, 20]), |a, b| a + b);
        assert_eq!(out.to_list(), vec![11, 22]);
    }

    #[test]
    fn fold_sinks() {
        assert_eq!(from_list(vec![1, 2, 3]).fold(crate::fold::sum()), 6);
        assert_eq!(from_list(vec![1, 2, 3]).fold_with(0, |acc, x| acc + x), 6);
        assert_eq!(
            from_list(vec![1, 2, 3]).fold(crate::fold::one()),
            Some(1)
        );
    }

    #[test]
    fn iterator_interop() {
        let mut total = 0;
        for x in from_list(vec![1, 2, 3]).map(|x| x * 2) {
            total += x;
        }
        assert_eq!(total, 12);
        let collected: Vec<i32> = from_iter(1..=3).into_iter().collect();
        assert_eq!(collected, vec![1, 2, 3]);
    }
}
