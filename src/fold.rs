//! Incremental left-to-right reducers with early termination.
//!
//! A [`Fold`] consumes one element per [`step`][Fold::step] call and either
//! keeps going with an updated state or finishes early with a result. Folds
//! are the universal consumers of this crate: streams run them to completion
//! ([`Stream::fold`][crate::Stream::fold]), parsers use them as collecting
//! sinks, and they can be driven by hand one element at a time via
//! [`reduce`].
//!
//! Combinators never box: composing folds nests their state types, so a
//! composed fold is stepped without indirection.

use std::marker::PhantomData;

use num_traits::Zero;

use crate::Either;

/// Result of starting a fold.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init<S, B> {
    /// The fold accepts input, starting in the given state.
    Partial(S),
    /// The fold finished without consuming any input.
    Done(B),
}

/// Result of feeding one element to a fold.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S, B> {
    /// The fold consumed the element and accepts more input.
    Partial(S),
    /// The fold consumed the element and finished.
    Done(B),
}

/// An incremental reducer over elements of type `A`.
///
/// A fold is a triple of operations threading an owned state: `initial`
/// produces the starting state (or an immediate result), `step` consumes one
/// element, and `extract` finalizes a state into a result when the input runs
/// out. Once `step` returns [`Done`][Step::Done] neither `step` nor `extract`
/// is called again for that run.
///
/// The state is moved into and out of every call; drivers hold only the
/// latest state.
pub trait Fold<A> {
    /// State threaded between steps.
    type State;
    /// Result type of the fold.
    type Output;

    /// Starts a fresh run of the fold.
    fn initial(&mut self) -> Init<Self::State, Self::Output>;

    /// Consumes one element.
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output>;

    /// Finalizes a run when the input is exhausted.
    fn extract(&mut self, state: Self::State) -> Self::Output;

    /// Maps incoming elements with `f` before feeding them to this fold.
    fn map_input<C, G>(self, f: G) -> MapInput<G, Self>
    where
        Self: Sized,
        G: FnMut(C) -> A,
    {
        MapInput { f, inner: self }
    }

    /// Drops incoming elements that do not satisfy `pred`.
    fn filter<G>(self, pred: G) -> Filter<G, Self>
    where
        Self: Sized,
        G: FnMut(&A) -> bool,
    {
        Filter { pred, inner: self }
    }

    /// Maps the result of this fold with `f`.
    fn map<C, G>(self, f: G) -> Map<G, Self>
    where
        Self: Sized,
        G: FnMut(Self::Output) -> C,
    {
        Map { f, inner: self }
    }

    /// Feeds the running accumulator of this fold into `next`, one value per
    /// consumed element.
    fn postscan<FL>(self, next: FL) -> Postscan<Self, FL>
    where
        Self: Sized,
        Self::State: Clone,
        FL: Fold<Self::Output>,
    {
        Postscan { first: self, next }
    }

    /// Finishes this fold after at most `limit` elements.
    fn take(self, limit: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take { limit, inner: self }
    }
}

/// See [`Fold::map_input`].
pub struct MapInput<G, FL> {
    f: G,
    inner: FL,
}

impl<A, C, G, FL> Fold<C> for MapInput<G, FL>
where
    G: FnMut(C) -> A,
    FL: Fold<A>,
{
    type State = FL::State;
    type Output = FL::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: C) -> Step<Self::State, Self::Output> {
        self.inner.step(state, (self.f)(input))
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Self::Output {
        self.inner.extract(state)
    }
}

/// See [`Fold::filter`].
pub struct Filter<G, FL> {
    pred: G,
    inner: FL,
}

impl<A, G, FL> Fold<A> for Filter<G, FL>
where
    G: FnMut(&A) -> bool,
    FL: Fold<A>,
{
    type State = FL::State;
    type Output = FL::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        if (self.pred)(&input) {
            self.inner.step(state, input)
        } else {
            Step::Partial(state)
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Self::Output {
        self.inner.extract(state)
    }
}

/// See [`Fold::map`].
pub struct Map<G, FL> {
    f: G,
    inner: FL,
}

impl<A, C, G, FL> Fold<A> for Map<G, FL>
where
    FL: Fold<A>,
    G: FnMut(FL::Output) -> C,
{
    type State = FL::State;
    type Output = C;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Partial(s) => Init::Partial(s),
            Init::Done(b) => Init::Done((self.f)(b)),
        }
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: A) -> Step<Self::State, Self::Output> {
        match self.inner.step(state, input) {
            Step::Partial(s) => Step::Partial(s),
            Step::Done(b) => Step::Done((self.f)(b)),
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Self::Output {
        let b = self.inner.extract(state);
        (self.f)(b)
    }
}

/// See [`Fold::postscan`].
pub struct Postscan<F1, F2> {
    first: F1,
    next: F2,
}

impl<A, F1, F2> Fold<A> for Postscan<F1, F2>
where
    F1: Fold<A>,
    F1::State: Clone,
    F2: Fold<F1::Output>,
{
    type State = (F1::State, F2::State);
    type Output = F2::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let s2 = match self.next.initial() {
            Init::Partial(s2) => s2,
            Init::Done(c) => return Init::Done(c),
        };
        match self.first.initial() {
            Init::Partial(s1) => Init::Partial((s1, s2)),
            // The scanned fold accepts no input, so no accumulator values
            // will ever reach `next`.
            Init::Done(_) => Init::Done(self.next.extract(s2)),
        }
    }

    fn step(&mut self, (s1, s2): (F1::State, F2::State), input: A) -> Step<Self::State, Self::Output> {
        match self.first.step(s1, input) {
            Step::Partial(s1) => {
                let b = self.first.extract(s1.clone());
                match self.next.step(s2, b) {
                    Step::Partial(s2) => Step::Partial((s1, s2)),
                    Step::Done(c) => Step::Done(c),
                }
            }
            Step::Done(b) => match self.next.step(s2, b) {
                Step::Partial(s2) => Step::Done(self.next.extract(s2)),
                Step::Done(c) => Step::Done(c),
            },
        }
    }

    fn extract(&mut self, (_, s2): (F1::State, F2::State)) -> Self::Output {
        self.next.extract(s2)
    }
}

/// See [`Fold::take`].
pub struct Take<FL> {
    limit: usize,
    inner: FL,
}

impl<A, FL> Fold<A> for Take<FL>
where
    FL: Fold<A>,
{
    type State = (usize, FL::State);
    type Output = FL::Output;

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        match self.inner.initial() {
            Init::Done(b) => Init::Done(b),
            Init::Partial(s) => {
                if self.limit == 0 {
                    Init::Done(self.inner.extract(s))
                } else {
                    Init::Partial((0, s))
                }
            }
        }
    }

    fn step(&mut self, (seen, s): (usize, FL::State), input: A) -> Step<Self::State, Self::Output> {
        match self.inner.step(s, input) {
            Step::Done(b) => Step::Done(b),
            Step::Partial(s) => {
                let seen = seen + 1;
                if seen >= self.limit {
                    Step::Done(self.inner.extract(s))
                } else {
                    Step::Partial((seen, s))
                }
            }
        }
    }

    fn extract(&mut self, (_, s): (usize, FL::State)) -> Self::Output {
        self.inner.extract(s)
    }
}

/// A fold built from three closures. See [`from_fn`].
pub struct FromFn<I, F, E> {
    initial: I,
    step: F,
    extract: E,
}

/// Creates a fold from an `initial`, `step` and `extract` closure.
///
/// This is the primitive constructor; all other folds in this module could be
/// expressed with it.
pub fn from_fn<S, B, A, I, F, E>(initial: I, step: F, extract: E) -> FromFn<I, F, E>
where
    I: FnMut() -> Init<S, B>,
    F: FnMut(S, A) -> Step<S, B>,
    E: FnMut(S) -> B,
{
    FromFn {
        initial,
        step,
        extract,
    }
}

impl<S, B, A, I, F, E> Fold<A> for FromFn<I, F, E>
where
    I: FnMut() -> Init<S, B>,
    F: FnMut(S, A) -> Step<S, B>,
    E: FnMut(S) -> B,
{
    type State = S;
    type Output = B;

    #[inline]
    fn initial(&mut self) -> Init<S, B> {
        (self.initial)()
    }

    #[inline]
    fn step(&mut self, state: S, input: A) -> Step<S, B> {
        (self.step)(state, input)
    }

    #[inline]
    fn extract(&mut self, state: S) -> B {
        (self.extract)(state)
    }
}

/// See [`drain`].
pub struct Drain;

/// Creates a fold that discards all input.
pub fn drain() -> Drain {
    Drain
}

impl<A> Fold<A> for Drain {
    type State = ();
    type Output = ();

    #[inline]
    fn initial(&mut self) -> Init<(), ()> {
        Init::Partial(())
    }

    #[inline]
    fn step(&mut self, _state: (), _input: A) -> Step<(), ()> {
        Step::Partial(())
    }

    #[inline]
    fn extract(&mut self, _state: ()) {}
}

/// See [`to_list`].
pub struct ToList;

/// Creates a fold that collects all input into a `Vec`.
pub fn to_list() -> ToList {
    ToList
}

impl<A> Fold<A> for ToList {
    type State = Vec<A>;
    type Output = Vec<A>;

    #[inline]
    fn initial(&mut self) -> Init<Vec<A>, Vec<A>> {
        Init::Partial(vec![])
    }

    #[inline]
    fn step(&mut self, mut state: Vec<A>, input: A) -> Step<Vec<A>, Vec<A>> {
        state.push(input);
        Step::Partial(state)
    }

    #[inline]
    fn extract(&mut self, state: Vec<A>) -> Vec<A> {
        state
    }
}

/// See [`length`].
pub struct Length;

/// Creates a fold that counts its input elements.
pub fn length() -> Length {
    Length
}

impl<A> Fold<A> for Length {
    type State = usize;
    type Output = usize;

    #[inline]
    fn initial(&mut self) -> Init<usize, usize> {
        Init::Partial(0)
    }

    #[inline]
    fn step(&mut self, state: usize, _input: A) -> Step<usize, usize> {
        Step::Partial(state + 1)
    }

    #[inline]
    fn extract(&mut self, state: usize) -> usize {
        state
    }
}

/// See [`sum`].
pub struct Sum;

/// Creates a fold that adds up its input elements.
pub fn sum() -> Sum {
    Sum
}

impl<A: Zero> Fold<A> for Sum {
    type State = A;
    type Output = A;

    #[inline]
    fn initial(&mut self) -> Init<A, A> {
        Init::Partial(A::zero())
    }

    #[inline]
    fn step(&mut self, state: A, input: A) -> Step<A, A> {
        Step::Partial(state + input)
    }

    #[inline]
    fn extract(&mut self, state: A) -> A {
        state
    }
}

/// See [`last`].
pub struct Last;

/// Creates a fold that keeps only the most recent element.
pub fn last() -> Last {
    Last
}

impl<A> Fold<A> for Last {
    type State = Option<A>;
    type Output = Option<A>;

    #[inline]
    fn initial(&mut self) -> Init<Option<A>, Option<A>> {
        Init::Partial(None)
    }

    #[inline]
    fn step(&mut self, _state: Option<A>, input: A) -> Step<Option<A>, Option<A>> {
        Step::Partial(Some(input))
    }

    #[inline]
    fn extract(&mut self, state: Option<A>) -> Option<A> {
        state
    }
}

/// See [`one`].
pub struct One;

/// Creates a fold that finishes on the first element, or produces `None` on
/// empty input.
pub fn one() -> One {
    One
}

impl<A> Fold<A> for One {
    type State = ();
    type Output = Option<A>;

    #[inline]
    fn initial(&mut self) -> Init<(), Option<A>> {
        Init::Partial(())
    }

    #[inline]
    fn step(&mut self, _state: (), input: A) -> Step<(), Option<A>> {
        Step::Done(Some(input))
    }

    #[inline]
    fn extract(&mut self, _state: ()) -> Option<A> {
        None
    }
}

/// See [`any`].
pub struct Any<G> {
    pred: G,
}

/// Creates a fold that finishes with `true` on the first element satisfying
/// `pred`, and produces `false` if none does.
pub fn any<A, G>(pred: G) -> Any<G>
where
    G: FnMut(&A) -> bool,
{
    Any { pred }
}

impl<A, G> Fold<A> for Any<G>
where
    G: FnMut(&A) -> bool,
{
    type State = ();
    type Output = bool;

    #[inline]
    fn initial(&mut self) -> Init<(), bool> {
        Init::Partial(())
    }

    #[inline]
    fn step(&mut self, _state: (), input: A) -> Step<(), bool> {
        if (self.pred)(&input) {
            Step::Done(true)
        } else {
            Step::Partial(())
        }
    }

    #[inline]
    fn extract(&mut self, _state: ()) -> bool {
        false
    }
}

/// See [`all`].
pub struct All<G> {
    pred: G,
}

/// Creates a fold that finishes with `false` on the first element violating
/// `pred`, and produces `true` if none does.
pub fn all<A, G>(pred: G) -> All<G>
where
    G: FnMut(&A) -> bool,
{
    All { pred }
}

impl<A, G> Fold<A> for All<G>
where
    G: FnMut(&A) -> bool,
{
    type State = ();
    type Output = bool;

    #[inline]
    fn initial(&mut self) -> Init<(), bool> {
        Init::Partial(())
    }

    #[inline]
    fn step(&mut self, _state: (), input: A) -> Step<(), bool> {
        if (self.pred)(&input) {
            Step::Partial(())
        } else {
            Step::Done(false)
        }
    }

    #[inline]
    fn extract(&mut self, _state: ()) -> bool {
        true
    }
}

/// One side of a [`tee`], either still consuming or already finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeeSide<S, B> {
    /// The side still accepts input.
    Running(S),
    /// The side finished early with a result.
    Finished(B),
}

/// See [`tee`].
pub struct Tee<F1, F2> {
    left: F1,
    right: F2,
}

/// Creates a fold that feeds every element to both `left` and `right` and
/// produces the pair of their results.
///
/// The tee finishes early only when both sides have finished; a side that
/// finishes first keeps its result while the other side continues to consume.
pub fn tee<F1, F2>(left: F1, right: F2) -> Tee<F1, F2> {
    Tee { left, right }
}

impl<A, F1, F2> Fold<A> for Tee<F1, F2>
where
    A: Clone,
    F1: Fold<A>,
    F2: Fold<A>,
{
    type State = (
        TeeSide<F1::State, F1::Output>,
        TeeSide<F2::State, F2::Output>,
    );
    type Output = (F1::Output, F2::Output);

    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        let l = match self.left.initial() {
            Init::Partial(s) => TeeSide::Running(s),
            Init::Done(b) => TeeSide::Finished(b),
        };
        let r = match self.right.initial() {
            Init::Partial(s) => TeeSide::Running(s),
            Init::Done(b) => TeeSide::Finished(b),
        };
        match (l, r) {
            (TeeSide::Finished(b1), TeeSide::Finished(b2)) => Init::Done((b1, b2)),
            (l, r) => Init::Partial((l, r)),
        }
    }

    fn step(&mut self, (l, r): Self::State, input: A) -> Step<Self::State, Self::Output> {
        let l = match l {
            TeeSide::Running(s) => match self.left.step(s, input.clone()) {
                Step::Partial(s) => TeeSide::Running(s),
                Step::Done(b) => TeeSide::Finished(b),
            },
            finished => finished,
        };
        let r = match r {
            TeeSide::Running(s) => match self.right.step(s, input) {
                Step::Partial(s) => TeeSide::Running(s),
                Step::Done(b) => TeeSide::Finished(b),
            },
            finished => finished,
        };
        match (l, r) {
            (TeeSide::Finished(b1), TeeSide::Finished(b2)) => Step::Done((b1, b2)),
            (l, r) => Step::Partial((l, r)),
        }
    }

    fn extract(&mut self, (l, r): Self::State) -> Self::Output {
        let b1 = match l {
            TeeSide::Running(s) => self.left.extract(s),
            TeeSide::Finished(b) => b,
        };
        let b2 = match r {
            TeeSide::Running(s) => self.right.extract(s),
            TeeSide::Finished(b) => b,
        };
        (b1, b2)
    }
}

/// See [`lefts`].
pub struct Lefts<FL> {
    inner: FL,
}

/// Adapts a fold over `L` into a fold over [`Either<L, R>`] that forwards
/// [`Left`][Either::Left] values and discards [`Right`][Either::Right] ones.
pub fn lefts<FL>(inner: FL) -> Lefts<FL> {
    Lefts { inner }
}

impl<L, R, FL> Fold<Either<L, R>> for Lefts<FL>
where
    FL: Fold<L>,
{
    type State = FL::State;
    type Output = FL::Output;

    #[inline]
    fn initial(&mut self) -> Init<Self::State, Self::Output> {
        self.inner.initial()
    }

    #[inline]
    fn step(&mut self, state: Self::State, input: Either<L, R>) -> Step<Self::State, Self::Output> {
        match input {
            Either::Left(l) => self.inner.step(state, l),
            Either::Right(_) => Step::Partial(state),
        }
    }

    #[inline]
    fn extract(&mut self, state: Self::State) -> Self::Output {
        self.inner.extract(state)
    }
}

/// A fold being driven one element at a time. See [`reduce`].
pub struct Reduced<FL, A>
where
    FL: Fold<A>,
{
    fold: FL,
    state: Option<FL::State>,
    result: Option<FL::Output>,
    _input: PhantomData<fn(A)>,
}

/// Starts a run of `fold` and returns a handle for driving it incrementally.
pub fn reduce<A, FL>(mut fold: FL) -> Reduced<FL, A>
where
    FL: Fold<A>,
{
    let (state, result) = match fold.initial() {
        Init::Partial(s) => (Some(s), None),
        Init::Done(b) => (None, Some(b)),
    };
    Reduced {
        fold,
        state,
        result,
        _input: PhantomData,
    }
}

impl<A, FL> Reduced<FL, A>
where
    FL: Fold<A>,
{
    /// Feeds one element. Elements fed after the fold has finished are
    /// discarded.
    pub fn snoc(&mut self, input: A) {
        if let Some(s) = self.state.take() {
            match self.fold.step(s, input) {
                Step::Partial(s) => self.state = Some(s),
                Step::Done(b) => self.result = Some(b),
            }
        }
    }

    /// Returns whether the fold has finished early.
    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    /// Finalizes the run and returns the result.
    pub fn finish(mut self) -> FL::Output {
        match (self.result.take(), self.state.take()) {
            (Some(b), _) => b,
            (None, Some(s)) => self.fold.extract(s),
            (None, None) => unreachable!("fold driven without state or result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<A, FL: Fold<A>>(fold: FL, input: Vec<A>) -> FL::Output {
        let mut driven = reduce(fold);
        for a in input {
            driven.snoc(a);
        }
        driven.finish()
    }

    #[test]
    fn leaves() {
        assert_eq!(run(sum(), vec![1, 2, 3, 4]), 10);
        assert_eq!(run(length(), vec!["a", "b", "c"]), 3);
        assert_eq!(run(to_list(), vec![1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(run(last(), vec![1, 2, 3]), Some(3));
        assert_eq!(run(last(), Vec::<i32>::new()), None);
        assert_eq!(run(one(), vec![7, 8]), Some(7));
        assert_eq!(run(one(), Vec::<i32>::new()), None);
        assert_eq!(run(drain(), vec![1, 2, 3]), ());
    }

    #[test]
    fn early_termination() {
        assert_eq!(run(any(|&x: &i32| x > 2), vec![1, 2, 3]), true);
        assert_eq!(run(any(|&x: &i32| x > 9), vec![1, 2, 3]), false);
        assert_eq!(run(all(|&x: &i32| x > 0), vec![1, 2, 3]), true);
        assert_eq!(run(all(|&x: &i32| x != 2), vec![1, 2, 3]), false);
    }

    #[test]
    fn one_stops_consuming() {
        let mut driven = reduce(one());
        assert!(!driven.is_done());
        driven.snoc(1);
        assert!(driven.is_done());
        driven.snoc(2);
        assert_eq!(driven.finish(), Some(1));
    }

    #[test]
    fn input_adaptors() {
        let doubled = to_list().map_input(|x: i32| x * 2);
        assert_eq!(run(doubled, vec![1, 2, 3]), vec![2, 4, 6]);

        let evens = sum().filter(|x: &i32| x % 2 == 0);
        assert_eq!(run(evens, vec![1, 2, 3, 4]), 6);

        let count_as_string = Fold::<i32>::map(length(), |n| n.to_string());
        assert_eq!(run(count_as_string, vec![1, 2, 3]), "3");
    }

    #[test]
    fn take_limits_input() {
        assert_eq!(run(Fold::<i32>::take(to_list(), 2), vec![1, 2, 3, 4]), vec![1, 2]);
        assert_eq!(run(Fold::<i32>::take(to_list(), 0), vec![1, 2]), Vec::<i32>::new());
        assert_eq!(run(Fold::<i32>::take(to_list(), 9), vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn postscan_feeds_accumulators() {
        // Running sums 1, 3, 6 collected downstream.
        let running = Fold::<i32>::postscan(sum(), to_list());
        assert_eq!(run(running, vec![1, 2, 3]), vec![1, 3, 6]);
    }

    #[test]
    fn tee_pairs_results() {
        assert_eq!(run(tee(sum(), length()), vec![1, 2, 3]), (6, 3));
        // One side finishing early keeps its result while the other runs on.
        assert_eq!(run(tee(one(), sum()), vec![1, 2, 3]), (Some(1), 6));
    }

    #[test]
    fn lefts_discards_rights() {
        let input = vec![
            Either::Left(1),
            Either::Right("x"),
            Either::Left(2),
            Either::Right("y"),
        ];
        assert_eq!(run(lefts(to_list()), input), vec![1, 2]);
    }

    #[test]
    fn from_fn_builds_folds() {
        let mean_parts = from_fn(
            || Init::Partial((0i64, 0i64)),
            |(total, count), x: i64| Step::Partial((total + x, count + 1)),
            |(total, count)| (total, count),
        );
        assert_eq!(run(mean_parts, vec![3, 5, 7]), (15, 3));
    }
}
