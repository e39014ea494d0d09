//! End-to-end checks combining streams, folds, parsers and the driver.

use assert_matches::assert_matches;

use crate::parser::{self, Parser as _};
use crate::stream::{self, from_list};
use crate::{fold, ParseDriver};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn string(v: Vec<char>) -> String {
    v.into_iter().collect()
}

#[test]
fn take_while_over_a_stream() {
    assert_eq!(
        from_list(vec![0, 0, 1, 0, 1]).parse(parser::take_while(|&x| x == 0, fold::to_list())),
        Ok(vec![0, 0])
    );
}

#[test]
fn take_eq_reports_short_input() {
    let err = from_list(vec![1, 2, 3])
        .parse(parser::take_eq(4, fold::to_list()))
        .unwrap_err();
    assert_eq!(
        err.message,
        "take_eq: expecting exactly 4 elements, input terminated on 3"
    );
    assert_eq!(err.position, 3);
}

#[test]
fn framed_content_with_escapes() {
    let result = from_list(chars("{hello {world}}")).parse(parser::take_framed_by_esc(
        |&c| c == '\\',
        |&c| c == '{',
        |&c| c == '}',
        fold::to_list(),
    ));
    assert_eq!(result.map(string), Ok("hello {world}".to_string()));
}

#[test]
fn quoted_word_with_mixed_quotes() {
    let result = from_list(chars("a\"b'c\";'d\"e'f ghi")).parse(parser::word_quoted_by(
        false,
        |&c| c == '\\',
        |&c| c == '"' || c == '\'',
        |&c| c == '"' || c == '\'',
        |c: &char| *c,
        |&c| c == ' ',
        fold::to_list(),
    ));
    assert_eq!(result.map(string), Ok("ab'c;d\"ef".to_string()));
}

#[test]
fn group_by_splits_a_whole_stream() {
    let results = from_list(vec![3, 5, 4, 1, 2, 0])
        .parse_many(parser::group_by(|a, b| a < b, fold::to_list()))
        .to_list();
    assert_eq!(
        results,
        vec![Ok(vec![3, 5, 4]), Ok(vec![1, 2]), Ok(vec![0])]
    );
}

#[test]
fn matching_a_fixed_sequence() {
    let input = chars("string");
    assert_eq!(
        from_list(input.clone()).parse(parser::list_eq_by(|a, b| a == b, input.clone())),
        Ok(input.clone())
    );
    let err = from_list(chars("mismatch"))
        .parse(parser::list_eq_by(|a, b| a == b, input))
        .unwrap_err();
    assert_eq!(err.message, "stream_eq_by: mismatch occurred");
}

#[test]
fn parsing_a_fold_consumes_everything() {
    let items = vec![1, 2, 3, 4];
    assert_eq!(
        from_list(items.clone()).parse(parser::from_fold(fold::to_list())),
        Ok(items)
    );
}

#[test]
fn fold_agrees_with_a_plain_reduction() {
    let items = vec![3, 1, 4, 1, 5, 9, 2, 6];
    let by_fold = from_list(items.clone()).fold(fold::sum());
    let by_hand = items.iter().sum::<i32>();
    assert_eq!(by_fold, by_hand);
}

#[test]
fn peek_then_one_observe_the_same_element() {
    let mut driver = ParseDriver::new(from_list(vec![42, 43]));
    assert_eq!(driver.parse(&mut parser::peek()), Ok(42));
    assert_eq!(driver.parse(&mut parser::one()), Ok(42));
}

#[test]
fn keyword_alternatives_backtrack() {
    let keyword = || parser::list_eq(chars("foo")).or(parser::list_eq(chars("bar")));
    assert_eq!(from_list(chars("fool")).parse(keyword()).map(string), Ok("foo".to_string()));
    assert_eq!(from_list(chars("bars")).parse(keyword()).map(string), Ok("bar".to_string()));
    assert_matches!(from_list(chars("baz")).parse(keyword()), Err(..));
}

#[test]
fn transformed_streams_feed_parsers() {
    // Transformers run fused in front of the driver.
    let result = stream::enumerate_from_to(1, 100)
        .filter(|x| x % 2 == 0)
        .map(|x| x / 2)
        .take(5)
        .parse(parser::from_fold(fold::to_list()));
    assert_eq!(result, Ok(vec![1, 2, 3, 4, 5]));
}

#[test]
fn words_from_a_character_stream() {
    let words: Vec<String> = from_list(chars("  to be  or not  "))
        .parse_many(parser::word_by(|&c| c == ' ', fold::to_list()))
        .to_list()
        .into_iter()
        .map(|w| string(w.unwrap()))
        .collect();
    assert_eq!(words, vec!["to", "be", "or", "not"]);
}

#[test]
fn csv_like_records() {
    let field = || {
        parser::take_while(|c: &char| *c != ',' && *c != '\n', fold::to_list())
    };
    let record = parser::sep_by1(field(), parser::one_eq(','), fold::to_list());
    let mut line = parser::take_end_by_drop(|&c| c == '\n', record);
    let mut driver = ParseDriver::new(from_list(chars("a,bb,ccc\nrest")));
    let fields: Vec<String> = driver
        .parse(&mut line)
        .unwrap()
        .into_iter()
        .map(string)
        .collect();
    assert_eq!(fields, vec!["a", "bb", "ccc"]);
    assert_eq!(driver.parse(&mut parser::one()), Ok('r'));
}

#[test]
fn scanning_then_parsing() {
    // Running sums until the first one over 10, all in one pipeline.
    let result = from_list(vec![1, 2, 3, 4, 5])
        .postscan(fold::sum())
        .parse(parser::take_while(|&total| total <= 10, fold::to_list()));
    assert_eq!(result, Ok(vec![1, 3, 6, 10]));
}
