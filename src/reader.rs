//! Tokenizes source text and builds `Value` ASTs, per SPEC_FULL.md §4.1.

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of, satisfy},
    combinator::{not, opt, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;

thread_local! {
    /// Doc comments (`;;;`) collected immediately before a top-level form,
    /// picked up by the evaluator to attach to the next `def!`/`defmacro!`.
    static PENDING_DOCS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

pub fn take_pending_docs() -> Vec<String> {
    PENDING_DOCS.with(|d| std::mem::take(&mut *d.borrow_mut()))
}

fn parse_doc_comment(input: &str) -> IResult<&str, String> {
    let (input, _) = tag(";;;")(input)?;
    let (input, text) = take_while(|c| c != '\n')(input)?;
    Ok((input, text.trim().to_string()))
}

fn parse_regular_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = not(peek(char(';'))).parse(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn parse_double_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = tag(";;")(input)?;
    let (input, _) = not(peek(char(';'))).parse(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((
        value((), multispace1),
        value((), char(',')),
        parse_double_comment,
        parse_regular_comment,
        value((), parse_doc_comment.map(|_| ())),
    )))
    .map(|_| ())
    .parse(input)
}

/// Skips whitespace/commas/non-doc comments, collecting `;;;` doc comments
/// along the way.
fn ws_and_collect_docs(input: &str) -> (&str, Vec<String>) {
    let mut docs = Vec::new();
    let mut input = input;

    loop {
        let start = input;
        if let Ok((rest, _)) = multispace1::<_, nom::error::Error<_>>(input) {
            input = rest;
            continue;
        }
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(',')(input) {
            input = rest;
            continue;
        }
        if let Ok((rest, doc)) = parse_doc_comment(input) {
            docs.push(doc);
            input = rest;
            continue;
        }
        if let Ok((rest, _)) = parse_double_comment(input) {
            input = rest;
            continue;
        }
        if let Ok((rest, _)) = parse_regular_comment(input) {
            input = rest;
            continue;
        }
        if start == input {
            break;
        }
    }
    (input, docs)
}

fn parse_int(input: &str) -> IResult<&str, Value> {
    recognize((opt(char('-')), digit1))
        .map(|num_str: &str| Value::Int(num_str.parse().expect("digit1 guarantees valid i64")))
        .parse(input)
}

/// Matches `true`/`false`/`nil` as whole words only, so that a symbol like
/// `nil?` or `true?` is read as a single symbol rather than the literal
/// followed by a truncated `?` symbol (the literal must not be immediately
/// followed by another symbol-continuation character).
fn parse_literal_word(input: &str) -> IResult<&str, Value> {
    let (rest, word) = alt((tag("true"), tag("false"), tag("nil"))).parse(input)?;
    let (rest, _) = not(peek(satisfy(symbol_cont))).parse(rest)?;
    let value = match word {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "nil" => Value::Nil,
        _ => unreachable!(),
    };
    Ok((rest, value))
}

const SYMBOL_START: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?&_.";
fn symbol_cont(c: char) -> bool {
    c.is_alphanumeric() || "-_?!<>=+*/%&.".contains(c)
}

fn parse_keyword(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(':')(input)?;
    let (input, name) = take_while1(symbol_cont)(input)?;
    Ok((input, Value::kw(name)))
}

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) = one_of(SYMBOL_START)(input)?;
    let (input, rest) =
        take_while::<_, _, nom::error::Error<_>>(symbol_cont)(input).unwrap_or((input, ""));
    let mut symbol = String::with_capacity(rest.len() + 1);
    symbol.push(first);
    symbol.push_str(rest);
    Ok((input, Value::sym(symbol)))
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::str("")));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\n"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    Ok((input, Value::str(result)))
}

fn wrap(head: &str, form: Value) -> Value {
    Value::list(vec![Value::sym(head), form])
}

fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quote", expr)))
}

fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quasiquote", expr)))
}

fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('~')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        return Ok((input, wrap("splice-unquote", expr)));
    }
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("unquote", expr)))
}

/// `^META OBJ` reader macro → `(with-meta OBJ META)`.
fn parse_meta(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('^')(input)?;
    let (input, meta) = parse_expr(input)?;
    let (input, _) = ws_and_comments(input)?;
    let (input, obj) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::sym("with-meta"), obj, meta])))
}

/// `@ATOM` reader macro → `(deref ATOM)`.
fn parse_deref(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('@')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::sym("deref"), expr])))
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws_and_comments(input)?;
    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            return Ok((rest, Value::list(items)));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_vector(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('[')(input)?;
    let (input, _) = ws_and_comments(input)?;
    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(']')(remaining) {
            return Ok((rest, Value::vector(items)));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_hashmap(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('{')(input)?;
    let (input, _) = ws_and_comments(input)?;
    let mut map = std::collections::BTreeMap::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>('}')(remaining) {
            return Ok((rest, Value::map(map)));
        }
        let (rest, key) = parse_expr(remaining)?;
        let (rest, _) = ws_and_comments(rest)?;
        let (rest, val) = parse_expr(rest)?;
        let key = crate::value::HashKey::from_value(&key)
            .map_err(|_| nom::Err::Failure(nom::error::Error::new(remaining, nom::error::ErrorKind::Fail)))?;
        map.insert(key, val);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_meta,
        parse_deref,
        parse_list,
        parse_vector,
        parse_hashmap,
        parse_literal_word,
        parse_int,
        parse_string,
        parse_keyword,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses exactly one form from `input`; `None` if the input is empty or
/// whitespace/comment-only. Extra content after the first form is an error.
pub fn read(input: &str) -> Result<Option<Value>, EvalError> {
    let (after_docs, docs) = ws_and_collect_docs(input);
    if !docs.is_empty() {
        PENDING_DOCS.with(|d| *d.borrow_mut() = docs);
    }
    if after_docs.is_empty() {
        return Ok(None);
    }
    match parse_expr(after_docs) {
        Ok((rest, value)) => {
            let (rest, _) = ws_and_comments(rest).unwrap_or((rest, ()));
            if !rest.is_empty() {
                let tok = rest.split_whitespace().next().unwrap_or(rest);
                Err(EvalError::ParseError(format!(
                    "Extraneous input: '{tok}'"
                )))
            } else {
                Ok(Some(value))
            }
        }
        Err(_) => Err(EvalError::ParseError("Parse error".to_string())),
    }
}

/// Parses one form and returns the unconsumed remainder, for looping over a
/// script file's sequence of top-level forms.
pub fn read_one(input: &str) -> Result<Option<(Value, &str)>, EvalError> {
    let (after_docs, docs) = ws_and_collect_docs(input);
    if !docs.is_empty() {
        PENDING_DOCS.with(|d| *d.borrow_mut() = docs);
    }
    if after_docs.is_empty() {
        return Ok(None);
    }
    match parse_expr(after_docs) {
        Ok((rest, value)) => Ok(Some((value, rest))),
        Err(_) => Err(EvalError::ParseError("Parse error".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_unwrap(s: &str) -> Value {
        read(s).unwrap().unwrap()
    }

    #[test]
    fn parses_int() {
        assert_eq!(read_unwrap("42"), Value::Int(42));
        assert_eq!(read_unwrap("-7"), Value::Int(-7));
    }

    #[test]
    fn parses_literals() {
        assert_eq!(read_unwrap("true"), Value::Bool(true));
        assert_eq!(read_unwrap("false"), Value::Bool(false));
        assert_eq!(read_unwrap("nil"), Value::Nil);
    }

    #[test]
    fn parses_symbol_and_keyword() {
        assert_eq!(read_unwrap("foo-bar?"), Value::sym("foo-bar?"));
        assert_eq!(read_unwrap(":kw"), Value::kw("kw"));
    }

    #[test]
    fn literal_prefixed_symbols_are_not_truncated() {
        assert_eq!(read_unwrap("nil?"), Value::sym("nil?"));
        assert_eq!(read_unwrap("true?"), Value::sym("true?"));
        assert_eq!(read_unwrap("false?"), Value::sym("false?"));
        let form = read_unwrap("(nil? x)");
        assert_eq!(
            form,
            Value::list(vec![Value::sym("nil?"), Value::sym("x")])
        );
    }

    #[test]
    fn parses_string_with_escapes() {
        assert_eq!(read_unwrap(r#""a\"b\\c\nd""#), Value::str("a\"b\\c\nd"));
        assert_eq!(read_unwrap(r#""""#), Value::str(""));
    }

    #[test]
    fn empty_list_is_distinct_from_nil() {
        assert_eq!(read_unwrap("()"), crate::value::empty_list());
        assert_ne!(read_unwrap("()"), Value::Nil);
    }

    #[test]
    fn parses_nested_list_vector_and_map() {
        let v = read_unwrap("(1 [2 3] {:a 4})");
        match v {
            Value::List(items, _) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], Value::Int(1));
                assert_eq!(items[1], Value::vector(vec![Value::Int(2), Value::Int(3)]));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn parses_quote_family() {
        assert_eq!(
            read_unwrap("'x"),
            Value::list(vec![Value::sym("quote"), Value::sym("x")])
        );
        assert_eq!(
            read_unwrap("`x"),
            Value::list(vec![Value::sym("quasiquote"), Value::sym("x")])
        );
        assert_eq!(
            read_unwrap("~x"),
            Value::list(vec![Value::sym("unquote"), Value::sym("x")])
        );
        assert_eq!(
            read_unwrap("~@x"),
            Value::list(vec![Value::sym("splice-unquote"), Value::sym("x")])
        );
    }

    #[test]
    fn parses_meta_and_deref_sugar() {
        assert_eq!(
            read_unwrap("^{:a 1} x"),
            Value::list(vec![
                Value::sym("with-meta"),
                Value::sym("x"),
                read_unwrap("{:a 1}")
            ])
        );
        assert_eq!(
            read_unwrap("@a"),
            Value::list(vec![Value::sym("deref"), Value::sym("a")])
        );
    }

    #[test]
    fn empty_input_reads_as_none() {
        assert_eq!(read("").unwrap(), None);
        assert_eq!(read("   ;; just a comment\n").unwrap(), None);
    }

    #[test]
    fn extraneous_input_errors() {
        assert!(read("1 2").is_err());
    }

    #[test]
    fn unterminated_list_errors() {
        assert!(read("(1 2").is_err());
    }

    #[test]
    fn read_one_exposes_remainder_for_scripts() {
        let (first, rest) = read_one("(+ 1 2) (+ 3 4)").unwrap().unwrap();
        assert_eq!(first, Value::list(vec![Value::sym("+"), Value::Int(1), Value::Int(2)]));
        assert_eq!(read_one(rest).unwrap().unwrap().0, Value::list(vec![Value::sym("+"), Value::Int(3), Value::Int(4)]));
    }

    #[test]
    fn doc_comments_are_captured() {
        let _ = take_pending_docs();
        read(";;; adds two numbers\n(def! f 1)").unwrap();
        assert_eq!(take_pending_docs(), vec!["adds two numbers".to_string()]);
    }
}
