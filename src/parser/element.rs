//! Parsers over single elements and fixed sequences.

use std::convert::Infallible;

use super::{Init, Parser, Step};
use crate::stream::{self, Stream};

/// See [`from_pure`].
pub struct FromPure<B> {
    value: B,
}

/// Creates a parser that produces `value` without consuming any input.
pub fn from_pure<B: Clone>(value: B) -> FromPure<B> {
    FromPure { value }
}

impl<A, B: Clone> Parser<A> for FromPure<B> {
    type State = Infallible;
    type Output = B;

    fn initial(&mut self) -> Init<Infallible, B> {
        Init::Done(self.value.clone())
    }

    fn step(&mut self, state: Infallible, _input: A) -> Step<Infallible, B> {
        match state {}
    }

    fn extract(&mut self, state: Infallible) -> Step<Infallible, B> {
        match state {}
    }
}

/// See [`from_effect`].
pub struct FromEffect<G> {
    action: G,
}

/// Creates a parser that runs `action` when started and produces its result
/// without consuming any input.
pub fn from_effect<B, G>(action: G) -> FromEffect<G>
where
    G: FnMut() -> B,
{
    FromEffect { action }
}

impl<A, B, G> Parser<A> for FromEffect<G>
where
    G: FnMut() -> B,
{
    type State = Infallible;
    type Output = B;

    fn initial(&mut self) -> Init<Infallible, B> {
        Init::Done((self.action)())
    }

    fn step(&mut self, state: Infallible, _input: A) -> Step<Infallible, B> {
        match state {}
    }

    fn extract(&mut self, state: Infallible) -> Step<Infallible, B> {
        match state {}
    }
}

/// See [`fail`].
pub struct Fail<B> {
    message: String,
    _output: std::marker::PhantomData<fn() -> B>,
}

/// Creates a parser that fails with `message` without consuming any input.
pub fn fail<B>(message: impl Into<String>) -> Fail<B> {
    Fail {
        message: message.into(),
        _output: std::marker::PhantomData,
    }
}

impl<A, B> Parser<A> for Fail<B> {
    type State = Infallible;
    type Output = B;

    fn initial(&mut self) -> Init<Infallible, B> {
        Init::Error(self.message.clone())
    }

    fn step(&mut self, state: Infallible, _input: A) -> Step<Infallible, B> {
        match state {}
    }

    fn extract(&mut self, state: Infallible) -> Step<Infallible, B> {
        match state {}
    }
}

/// See [`fail_with`].
pub struct FailWith<B, G> {
    action: G,
    _output: std::marker::PhantomData<fn() -> B>,
}

/// Creates a parser that fails with the message produced by `action`.
pub fn fail_with<B, G>(action: G) -> FailWith<B, G>
where
    G: FnMut() -> String,
{
    FailWith {
        action,
        _output: std::marker::PhantomData,
    }
}

impl<A, B, G> Parser<A> for FailWith<B, G>
where
    G: FnMut() -> String,
{
    type State = Infallible;
    type Output = B;

    fn initial(&mut self) -> Init<Infallible, B> {
        Init::Error((self.action)())
    }

    fn step(&mut self, state: Infallible, _input: A) -> Step<Infallible, B> {
        match state {}
    }

    fn extract(&mut self, state: Infallible) -> Step<Infallible, B> {
        match state {}
    }
}

/// See [`peek`].
pub struct Peek;

/// Creates a parser that produces the next element without consuming it.
/// Fails on end of input.
pub fn peek() -> Peek {
    Peek
}

impl<A> Parser<A> for Peek {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        Step::Done(1, input)
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("peek: unexpected end of input".into())
    }
}

/// See [`eof`].
pub struct Eof;

/// Creates a parser that succeeds exactly at the end of the input.
pub fn eof() -> Eof {
    Eof
}

impl<A> Parser<A> for Eof {
    type State = ();
    type Output = ();

    fn initial(&mut self) -> Init<(), ()> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), _input: A) -> Step<(), ()> {
        Step::Error("eof: expected end of input".into())
    }

    fn extract(&mut self, _state: ()) -> Step<(), ()> {
        Step::Done(0, ())
    }
}

/// See [`one`].
pub struct One;

/// Creates a parser that consumes and produces the next element. Fails on
/// end of input.
pub fn one() -> One {
    One
}

impl<A> Parser<A> for One {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        Step::Done(0, input)
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("one: unexpected end of input".into())
    }
}

/// See [`satisfy`].
pub struct Satisfy<G> {
    pred: G,
}

/// Creates a parser that consumes one element satisfying `pred`.
pub fn satisfy<A, G>(pred: G) -> Satisfy<G>
where
    G: FnMut(&A) -> bool,
{
    Satisfy { pred }
}

impl<A, G> Parser<A> for Satisfy<G>
where
    G: FnMut(&A) -> bool,
{
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        if (self.pred)(&input) {
            Step::Done(0, input)
        } else {
            Step::Error("satisfy: predicate failed".into())
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("satisfy: unexpected end of input".into())
    }
}

/// See [`one_eq`].
pub struct OneEq<A> {
    expected: A,
}

/// Creates a parser that consumes one element equal to `expected`.
pub fn one_eq<A: PartialEq>(expected: A) -> OneEq<A> {
    OneEq { expected }
}

impl<A: PartialEq> Parser<A> for OneEq<A> {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        if input == self.expected {
            Step::Done(0, input)
        } else {
            Step::Error("one_eq: unexpected element".into())
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("one_eq: unexpected end of input".into())
    }
}

/// See [`one_not_eq`].
pub struct OneNotEq<A> {
    rejected: A,
}

/// Creates a parser that consumes one element different from `rejected`.
pub fn one_not_eq<A: PartialEq>(rejected: A) -> OneNotEq<A> {
    OneNotEq { rejected }
}

impl<A: PartialEq> Parser<A> for OneNotEq<A> {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        if input != self.rejected {
            Step::Done(0, input)
        } else {
            Step::Error("one_not_eq: rejected element".into())
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("one_not_eq: unexpected end of input".into())
    }
}

/// See [`one_of`].
pub struct OneOf<A> {
    set: Vec<A>,
}

/// Creates a parser that consumes one element contained in `set`.
pub fn one_of<A: PartialEq, I: IntoIterator<Item = A>>(set: I) -> OneOf<A> {
    OneOf {
        set: set.into_iter().collect(),
    }
}

impl<A: PartialEq> Parser<A> for OneOf<A> {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        if self.set.contains(&input) {
            Step::Done(0, input)
        } else {
            Step::Error("one_of: element not in set".into())
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("one_of: unexpected end of input".into())
    }
}

/// See [`none_of`].
pub struct NoneOf<A> {
    set: Vec<A>,
}

/// Creates a parser that consumes one element not contained in `set`.
pub fn none_of<A: PartialEq, I: IntoIterator<Item = A>>(set: I) -> NoneOf<A> {
    NoneOf {
        set: set.into_iter().collect(),
    }
}

impl<A: PartialEq> Parser<A> for NoneOf<A> {
    type State = ();
    type Output = A;

    fn initial(&mut self) -> Init<(), A> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), A> {
        if self.set.contains(&input) {
            Step::Error("none_of: element in rejected set".into())
        } else {
            Step::Done(0, input)
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), A> {
        Step::Error("none_of: unexpected end of input".into())
    }
}

/// See [`maybe`].
pub struct Maybe<G> {
    f: G,
}

/// Creates a parser that consumes one element and produces `f`'s result for
/// it, failing when `f` returns `None`.
pub fn maybe<A, B, G>(f: G) -> Maybe<G>
where
    G: FnMut(A) -> Option<B>,
{
    Maybe { f }
}

impl<A, B, G> Parser<A> for Maybe<G>
where
    G: FnMut(A) -> Option<B>,
{
    type State = ();
    type Output = B;

    fn initial(&mut self) -> Init<(), B> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), B> {
        match (self.f)(input) {
            Some(b) => Step::Done(0, b),
            None => Step::Error("maybe: element rejected".into()),
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), B> {
        Step::Error("maybe: unexpected end of input".into())
    }
}

/// See [`either`].
pub struct EitherOf<G> {
    f: G,
}

/// Creates a parser that consumes one element and produces `f`'s result for
/// it, failing with the returned message when `f` returns `Err`.
pub fn either<A, B, G>(f: G) -> EitherOf<G>
where
    G: FnMut(A) -> Result<B, String>,
{
    EitherOf { f }
}

impl<A, B, G> Parser<A> for EitherOf<G>
where
    G: FnMut(A) -> Result<B, String>,
{
    type State = ();
    type Output = B;

    fn initial(&mut self) -> Init<(), B> {
        Init::Partial(())
    }

    fn step(&mut self, _state: (), input: A) -> Step<(), B> {
        match (self.f)(input) {
            Ok(b) => Step::Done(0, b),
            Err(msg) => Step::Error(format!("either: {msg}")),
        }
    }

    fn extract(&mut self, _state: ()) -> Step<(), B> {
        Step::Error("either: unexpected end of input".into())
    }
}

/// Mismatch failure shared by [`list_eq_by`] and [`stream_eq_by`]: matching
/// a fixed list is the same comparison as matching its stream.
const MISMATCH: &str = "stream_eq_by: mismatch occurred";

/// See [`list_eq_by`].
pub struct ListEqBy<A, C> {
    expected: Vec<A>,
    cmp: C,
}

/// Creates a parser that matches the elements of `expected` in order,
/// comparing with `cmp`, and produces the matched list.
///
/// The parser never commits, so it composes with [`Parser::or`]. A mismatch
/// fails the same way as [`stream_eq_by`].
pub fn list_eq_by<A, C>(cmp: C, expected: Vec<A>) -> ListEqBy<A, C>
where
    A: Clone,
    C: FnMut(&A, &A) -> bool,
{
    ListEqBy { expected, cmp }
}

/// Creates a parser that matches the elements of `expected` in order using
/// `==`.
pub fn list_eq<A>(expected: Vec<A>) -> ListEqBy<A, impl FnMut(&A, &A) -> bool>
where
    A: Clone + PartialEq,
{
    list_eq_by(|x, y| x == y, expected)
}

impl<A, C> Parser<A> for ListEqBy<A, C>
where
    A: Clone,
    C: FnMut(&A, &A) -> bool,
{
    type State = usize;
    type Output = Vec<A>;

    fn initial(&mut self) -> Init<usize, Vec<A>> {
        if self.expected.is_empty() {
            Init::Done(vec![])
        } else {
            Init::Partial(0)
        }
    }

    fn step(&mut self, matched: usize, input: A) -> Step<usize, Vec<A>> {
        if (self.cmp)(&self.expected[matched], &input) {
            if matched + 1 == self.expected.len() {
                Step::Done(0, self.expected.clone())
            } else {
                Step::Continue(0, matched + 1)
            }
        } else {
            Step::Error(MISMATCH.into())
        }
    }

    fn extract(&mut self, matched: usize) -> Step<usize, Vec<A>> {
        Step::Error(format!(
            "list_eq_by: unexpected end of input, {} elements remaining",
            self.expected.len() - matched
        ))
    }
}

/// See [`stream_eq_by`].
pub struct StreamEqBy<C, S2, F2> {
    cmp: C,
    expected_step: F2,
    expected_seed: S2,
}

/// Creates a parser that matches the input against the elements of
/// `expected`, comparing with `cmp`.
///
/// Succeeds once `expected` is exhausted, leaving any further input
/// unconsumed.
pub fn stream_eq_by<A, C, S2, F2>(cmp: C, expected: Stream<S2, F2>) -> StreamEqBy<C, S2, F2>
where
    C: FnMut(&A, &A) -> bool,
    S2: Clone,
    F2: FnMut(S2) -> stream::Step<S2, A>,
{
    let (expected_seed, expected_step) = expected.into_parts();
    StreamEqBy {
        cmp,
        expected_step,
        expected_seed,
    }
}

impl<A, C, S2, F2> Parser<A> for StreamEqBy<C, S2, F2>
where
    C: FnMut(&A, &A) -> bool,
    S2: Clone,
    F2: FnMut(S2) -> stream::Step<S2, A>,
{
    type State = S2;
    type Output = ();

    fn initial(&mut self) -> Init<S2, ()> {
        Init::Partial(self.expected_seed.clone())
    }

    fn step(&mut self, state: S2, input: A) -> Step<S2, ()> {
        let mut state = state;
        loop {
            match (self.expected_step)(state) {
                stream::Step::Skip(s) => state = s,
                stream::Step::Stop => return Step::Done(1, ()),
                stream::Step::Yield(expected, s) => {
                    return if (self.cmp)(&expected, &input) {
                        Step::Continue(0, s)
                    } else {
                        Step::Error(MISMATCH.into())
                    };
                }
            }
        }
    }

    fn extract(&mut self, state: S2) -> Step<S2, ()> {
        let mut state = state;
        loop {
            match (self.expected_step)(state) {
                stream::Step::Skip(s) => state = s,
                stream::Step::Stop => return Step::Done(0, ()),
                stream::Step::Yield(..) => {
                    return Step::Error("stream_eq_by: unexpected end of input".into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::parser::{self, Parser as _};
    use crate::stream::from_list;

    #[test]
    fn pure_and_fail() {
        assert_eq!(from_list(vec![1, 2]).parse(parser::from_pure(7)), Ok(7));
        let err = from_list(vec![1]).parse(parser::fail::<i32>("nope")).unwrap_err();
        assert_eq!(err.message, "nope");
        let mut runs = 0;
        assert_eq!(
            from_list(vec![1]).parse(parser::from_effect(|| {
                runs += 1;
                runs
            })),
            Ok(1)
        );
    }

    #[test]
    fn single_element_parsers() {
        assert_eq!(from_list(vec![5, 6]).parse(parser::one()), Ok(5));
        assert_matches!(from_list(Vec::<i32>::new()).parse(parser::one()), Err(..));

        assert_eq!(from_list(vec![5]).parse(parser::one_eq(5)), Ok(5));
        assert_matches!(from_list(vec![4]).parse(parser::one_eq(5)), Err(..));

        assert_eq!(from_list(vec![4]).parse(parser::one_not_eq(5)), Ok(4));
        assert_matches!(from_list(vec![5]).parse(parser::one_not_eq(5)), Err(..));

        assert_eq!(from_list(vec!['b']).parse(parser::one_of("abc".chars())), Ok('b'));
        assert_matches!(
            from_list(vec!['z']).parse(parser::one_of("abc".chars())),
            Err(..)
        );
        assert_eq!(from_list(vec!['z']).parse(parser::none_of("abc".chars())), Ok('z'));

        assert_eq!(
            from_list(vec![2]).parse(parser::satisfy(|&x: &i32| x % 2 == 0)),
            Ok(2)
        );
        assert_matches!(
            from_list(vec![3]).parse(parser::satisfy(|&x: &i32| x % 2 == 0)),
            Err(..)
        );
    }

    #[test]
    fn eof_only_matches_empty_input() {
        assert_eq!(from_list(Vec::<i32>::new()).parse(parser::eof()), Ok(()));
        assert_matches!(from_list(vec![1]).parse(parser::eof()), Err(..));
    }

    #[test]
    fn mapping_element_parsers() {
        assert_eq!(
            from_list(vec!["12"]).parse(parser::maybe(|s: &str| s.parse::<i32>().ok())),
            Ok(12)
        );
        assert_matches!(
            from_list(vec!["x"]).parse(parser::maybe(|s: &str| s.parse::<i32>().ok())),
            Err(..)
        );
        let digit = |c: char| c.to_digit(10).ok_or_else(|| format!("not a digit: {c}"));
        assert_eq!(from_list(vec!['7']).parse(parser::either(digit)), Ok(7));
        let err = from_list(vec!['x']).parse(parser::either(digit)).unwrap_err();
        assert_eq!(err.message, "either: not a digit: x");
    }

    #[test]
    fn list_eq_matches_prefix() {
        let input: Vec<char> = "string".chars().collect();
        assert_eq!(
            from_list(input.clone()).parse(parser::list_eq(input.clone())),
            Ok(input.clone())
        );
        // A matching prefix leaves the rest unconsumed.
        let longer: Vec<char> = "strings".chars().collect();
        assert_eq!(
            from_list(longer).parse(parser::list_eq("string".chars().collect())),
            Ok(input)
        );
        let err = from_list("mismatch".chars().collect::<Vec<_>>())
            .parse(parser::list_eq("string".chars().collect()))
            .unwrap_err();
        assert_eq!(err.message, "stream_eq_by: mismatch occurred");
        assert_matches!(
            from_list("str".chars().collect::<Vec<_>>())
                .parse(parser::list_eq("string".chars().collect())),
            Err(..)
        );
    }

    #[test]
    fn stream_eq_by_consumes_the_expected_prefix() {
        let expected = || from_list(vec![1, 2, 3]);
        assert_eq!(
            from_list(vec![1, 2, 3, 4]).parse(parser::stream_eq_by(|a, b| a == b, expected())),
            Ok(())
        );
        let err = from_list(vec![1, 9])
            .parse(parser::stream_eq_by(|a, b| a == b, expected()))
            .unwrap_err();
        assert_eq!(err.message, "stream_eq_by: mismatch occurred");
        assert_matches!(
            from_list(vec![1, 2]).parse(parser::stream_eq_by(|a, b| a == b, expected())),
            Err(..)
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut driver = crate::ParseDriver::new(from_list(vec![7, 8]));
        assert_eq!(driver.parse(&mut parser::peek()), Ok(7));
        assert_eq!(driver.parse(&mut parser::one()), Ok(7));
        assert_eq!(driver.parse(&mut parser::one()), Ok(8));
        assert_matches!(driver.parse(&mut parser::peek()), Err(..));
    }

    #[test]
    fn filter_drops_input_elements() {
        let evens_only = parser::take_eq(2, crate::fold::to_list()).filter(|&x: &i32| x % 2 == 0);
        assert_eq!(from_list(vec![1, 2, 3, 4]).parse(evens_only), Ok(vec![2, 4]));
    }

    #[test]
    fn map_input_translates_elements() {
        let p = parser::take_eq(3, crate::fold::sum()).map_input(|c: char| c as u32);
        assert_eq!(from_list(vec!['a', 'b', 'c']).parse(p), Ok(97 + 98 + 99));
    }
}
