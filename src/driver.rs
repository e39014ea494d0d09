//! Running parsers over streams with a rewind buffer.

use crate::parser::{self, Parser};
use crate::stream::{self, Stream};
use crate::ParseError;

/// Configuration for a [`ParseDriver`].
#[derive(Clone, Default, Debug)]
#[non_exhaustive]
pub struct Config {
    /// Upper bound on the number of uncommitted elements the driver will
    /// buffer for backtracking; `0` means unbounded. A parse that needs
    /// more history than this fails with a parse error. (Default: `0`)
    pub max_rewind: usize,
}

impl Config {
    /// Sets the [`max_rewind`][Self#structfield.max_rewind] field.
    #[inline]
    pub fn max_rewind(mut self, value: usize) -> Self {
        self.max_rewind = value;
        self
    }
}

/// FIFO of recently consumed elements, retained for backtracking.
///
/// Elements enter when the driver pulls them from the stream and leave when
/// the parser commits. A replay cursor walks over retained elements that a
/// rewind has scheduled to be fed again. Capacity is allocated on demand and
/// reused across parses.
pub struct RewindBuffer<A> {
    items: Vec<A>,
    cursor: usize,
    base: u64,
}

impl<A: Clone> RewindBuffer<A> {
    fn new() -> Self {
        RewindBuffer {
            items: vec![],
            cursor: 0,
            base: 0,
        }
    }

    /// Absolute element offset of the cursor from the start of the stream.
    #[inline]
    pub fn position(&self) -> u64 {
        self.base + self.cursor as u64
    }

    /// Number of retained elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether no elements are retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the next element scheduled for replay, advancing the cursor.
    #[inline]
    fn replay(&mut self) -> Option<A> {
        if self.cursor < self.items.len() {
            let item = self.items[self.cursor].clone();
            self.cursor += 1;
            Some(item)
        } else {
            None
        }
    }

    #[inline]
    fn has_replay(&self) -> bool {
        self.cursor < self.items.len()
    }

    /// Retains a freshly pulled element, placing the cursor behind it.
    #[inline]
    fn push(&mut self, item: A) {
        debug_assert!(self.cursor == self.items.len());
        self.items.push(item);
        self.cursor += 1;
    }

    /// Commits everything before `cursor - n` and schedules the newest `n`
    /// consumed elements for replay.
    #[inline]
    fn commit(&mut self, n: usize) {
        assert!(n <= self.cursor, "parser committed past the rewind buffer");
        let keep_from = self.cursor - n;
        self.base += keep_from as u64;
        self.items.drain(..keep_from);
        self.cursor = 0;
    }

    /// Moves the cursor back by `n`, scheduling those elements for replay.
    #[inline]
    fn rewind(&mut self, n: usize) {
        assert!(n <= self.cursor, "parser rewound past the rewind buffer");
        self.cursor -= n;
    }

    fn clear(&mut self) {
        self.base += self.cursor as u64;
        self.items.clear();
        self.cursor = 0;
    }
}

/// Runs parsers over a stream, maintaining a [`RewindBuffer`] of
/// uncommitted input.
///
/// Input a parser gives back stays buffered, so several parsers can be run
/// in sequence over one stream and each picks up exactly where the previous
/// one stopped.
pub struct ParseDriver<A, S, F> {
    stream_step: F,
    stream_state: Option<S>,
    buffer: RewindBuffer<A>,
    max_rewind: usize,
}

impl<A, S, F> ParseDriver<A, S, F>
where
    A: Clone,
    F: FnMut(S) -> stream::Step<S, A>,
{
    /// Creates a driver over `stream` with the default configuration.
    pub fn new(stream: Stream<S, F>) -> Self {
        Self::with_config(stream, Config::default())
    }

    /// Creates a driver over `stream`.
    pub fn with_config(stream: Stream<S, F>, config: Config) -> Self {
        let (seed, step) = stream.into_parts();
        ParseDriver {
            stream_step: step,
            stream_state: Some(seed),
            buffer: RewindBuffer::new(),
            max_rewind: config.max_rewind,
        }
    }

    /// Absolute element offset of the next element to be consumed.
    pub fn position(&self) -> u64 {
        self.buffer.position()
    }

    /// Pulls the next element, replaying buffered input first.
    fn pull(&mut self) -> Option<A> {
        if let Some(item) = self.buffer.replay() {
            return Some(item);
        }
        let mut state = self.stream_state.take()?;
        loop {
            match (self.stream_step)(state) {
                stream::Step::Yield(item, next) => {
                    self.stream_state = Some(next);
                    self.buffer.push(item.clone());
                    return Some(item);
                }
                stream::Step::Skip(next) => state = next,
                stream::Step::Stop => return None,
            }
        }
    }

    /// Returns whether any input remains, without consuming it.
    pub(crate) fn has_pending_input(&mut self) -> bool {
        if self.buffer.has_replay() {
            return true;
        }
        match self.pull() {
            Some(_) => {
                self.buffer.rewind(1);
                true
            }
            None => false,
        }
    }

    /// Drops all remaining input; used after a fatal parse error.
    pub(crate) fn halt(&mut self) {
        self.stream_state = None;
        self.buffer.clear();
    }

    #[cold]
    #[inline(never)]
    fn error(&self, message: String) -> ParseError {
        ParseError::new(message, self.buffer.position())
    }

    /// Runs one parser to completion over the driver's input.
    ///
    /// Input beyond what the parser consumes stays buffered for the next
    /// parse.
    ///
    /// # Panics
    ///
    /// Panics when the parser violates the step protocol: returning
    /// `Partial` from `extract`, or a backtrack count exceeding the
    /// uncommitted input.
    pub fn parse<P>(&mut self, parser: &mut P) -> Result<P::Output, ParseError>
    where
        P: Parser<A>,
    {
        let mut state = match parser.initial() {
            parser::Init::Partial(s) => s,
            parser::Init::Done(value) => return Ok(value),
            parser::Init::Error(message) => return Err(self.error(message)),
        };
        while let Some(item) = self.pull() {
            match parser.step(state, item) {
                parser::Step::Partial(n, s) => {
                    self.buffer.commit(n);
                    state = s;
                }
                parser::Step::Continue(n, s) => {
                    self.buffer.rewind(n);
                    state = s;
                }
                parser::Step::Done(n, value) => {
                    self.buffer.commit(n);
                    return Ok(value);
                }
                parser::Step::Error(message) => return Err(self.error(message)),
            }
            if self.max_rewind != 0 && self.buffer.len() > self.max_rewind {
                return Err(self.error(format!(
                    "rewind buffer exceeded the configured bound of {} elements",
                    self.max_rewind
                )));
            }
        }

        // End of input. Finalize the parser, replaying any input it gives
        // back; an extract that asks for the same replay twice in a row is
        // stuck.
        let mut previous: Option<(u64, usize)> = None;
        loop {
            let at = self.buffer.position();
            match parser.extract(state) {
                parser::Step::Done(n, value) => {
                    self.buffer.commit(n);
                    return Ok(value);
                }
                parser::Step::Error(message) => return Err(self.error(message)),
                parser::Step::Continue(n, s) => {
                    if n == 0 || previous == Some((at, n)) {
                        return Err(self.error("unexpected end of input".into()));
                    }
                    previous = Some((at, n));
                    self.buffer.rewind(n);
                    state = s;
                    while let Some(item) = self.buffer.replay() {
                        match parser.step(state, item) {
                            parser::Step::Partial(n, s) => {
                                self.buffer.commit(n);
                                state = s;
                            }
                            parser::Step::Continue(n, s) => {
                                self.buffer.rewind(n);
                                state = s;
                            }
                            parser::Step::Done(n, value) => {
                                self.buffer.commit(n);
                                return Ok(value);
                            }
                            parser::Step::Error(message) => return Err(self.error(message)),
                        }
                    }
                }
                parser::Step::Partial(..) => parser::partial_from_extract(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::stream::from_list;
    use crate::{fold, parser};

    #[test]
    fn sequential_parses_share_the_buffer() {
        let mut driver = ParseDriver::new(from_list(vec![0, 0, 7, 8]));
        assert_eq!(
            driver.parse(&mut parser::take_while(|&x| x == 0, fold::to_list())),
            Ok(vec![0, 0])
        );
        assert_eq!(driver.parse(&mut parser::one()), Ok(7));
        assert_eq!(driver.position(), 3);
    }

    #[test]
    fn position_tracks_consumed_elements() {
        let mut driver = ParseDriver::new(from_list(vec![1, 2, 3]));
        assert_eq!(driver.position(), 0);
        assert_eq!(driver.parse(&mut parser::one()), Ok(1));
        assert_eq!(driver.position(), 1);
        let err = driver.parse(&mut parser::one_eq(9)).unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn max_rewind_bounds_the_buffer() {
        let stream = from_list(vec![1, 2, 3, 4, 5]);
        let mut driver = ParseDriver::with_config(stream, Config::default().max_rewind(2));
        let err = driver
            .parse(&mut parser::look_ahead(parser::from_fold(fold::to_list())))
            .unwrap_err();
        assert!(err.message.contains("rewind buffer"));
    }

    #[test]
    fn parse_many_splits_a_stream() {
        let results = from_list(vec![3, 5, 4, 1, 2, 0])
            .parse_many(parser::group_by(|a, b| a < b, fold::to_list()))
            .to_list();
        assert_eq!(
            results,
            vec![Ok(vec![3, 5, 4]), Ok(vec![1, 2]), Ok(vec![0])]
        );
    }

    #[test]
    fn parse_many_reports_an_error_and_ends() {
        let results = from_list(vec![1, 1, 2]).parse_many(parser::one_eq(1)).to_list();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(1));
        assert_eq!(results[1], Ok(1));
        assert_matches!(results[2], Err(..));
    }

    #[test]
    fn parse_many_on_empty_input_is_empty() {
        let results = from_list(Vec::<i32>::new())
            .parse_many(parser::one())
            .to_list();
        assert_eq!(results, vec![]);
    }

    #[test]
    fn parse_many_rounds_start_on_leftover_input() {
        // Each round's give-back is the next round's first element.
        let words = from_list("ab cd e".chars().collect::<Vec<_>>())
            .parse_many(parser::word_by(|&c| c == ' ', fold::to_list()))
            .to_list();
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.unwrap().into_iter().collect())
            .collect();
        assert_eq!(words, vec!["ab", "cd", "e"]);
    }
}
