//! Operations over Lists and Vectors, treated interchangeably except where
//! noted (`cons`/`conj` promote/orient differently per SPEC_FULL.md §4.5).

use crate::error::EvalError;
use crate::value::{empty_list, Value};
use lisp_macros::builtin;

fn seq<'a>(function: &str, v: &'a Value, position: usize) -> Result<&'a [Value], EvalError> {
    v.as_sequence()
        .ok_or_else(|| EvalError::type_error(function, "List or Vector", v, position))
}

#[builtin(name = "count", category = "Sequences", related(empty_q))]
pub fn count(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Nil] => Ok(Value::Int(0)),
        [v] => Ok(Value::Int(seq("count", v, 0)?.len() as i64)),
        _ => Err(EvalError::arity_error("count", "1", args.len())),
    }
}

/// Out-of-range access raises, rather than returning nil (see `get` for the
/// hash-map/out-of-range nil-returning counterpart).
#[builtin(name = "nth", category = "Sequences", related(first, rest))]
pub fn nth(args: &[Value]) -> Result<Value, EvalError> {
    let [v, idx] = args else {
        return Err(EvalError::arity_error("nth", "2", args.len()));
    };
    let items = seq("nth", v, 0)?;
    let Value::Int(i) = idx else {
        return Err(EvalError::type_error("nth", "Int", idx, 1));
    };
    items
        .get(*i as usize)
        .cloned()
        .ok_or_else(|| EvalError::runtime_error("nth", format!("index {i} out of range")))
}

#[builtin(name = "first", category = "Sequences", related(rest, nth))]
pub fn first(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Nil] => Ok(Value::Nil),
        [v] => Ok(seq("first", v, 0)?.first().cloned().unwrap_or(Value::Nil)),
        _ => Err(EvalError::arity_error("first", "1", args.len())),
    }
}

#[builtin(name = "rest", category = "Sequences", related(first, cons))]
pub fn rest(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Nil] => Ok(empty_list()),
        [v] => {
            let items = seq("rest", v, 0)?;
            Ok(Value::list(items.iter().skip(1).cloned().collect()))
        }
        _ => Err(EvalError::arity_error("rest", "1", args.len())),
    }
}

/// Prepends an element, always producing a List (promoting a Vector tail).
#[builtin(name = "cons", category = "Sequences", related(concat, conj))]
pub fn cons(args: &[Value]) -> Result<Value, EvalError> {
    let [head, tail] = args else {
        return Err(EvalError::arity_error("cons", "2", args.len()));
    };
    let items = seq("cons", tail, 1)?;
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(head.clone());
    out.extend_from_slice(items);
    Ok(Value::list(out))
}

#[builtin(name = "concat", category = "Sequences", related(cons))]
pub fn concat(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = Vec::new();
    for (i, a) in args.iter().enumerate() {
        out.extend_from_slice(seq("concat", a, i)?);
    }
    Ok(Value::list(out))
}

/// Adds an element the way each collection naturally grows: a List gets a
/// new head, a Vector gets a new tail.
#[builtin(name = "conj", category = "Sequences", related(cons))]
pub fn conj(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("conj", "at least 1", 0));
    }
    match &args[0] {
        Value::List(items, _) => {
            let mut out: Vec<Value> = args[1..].iter().rev().cloned().collect();
            out.extend(items.iter().cloned());
            Ok(Value::list(out))
        }
        Value::Vector(items, _) => {
            let mut out = items.as_ref().clone();
            out.extend(args[1..].iter().cloned());
            Ok(Value::vector(out))
        }
        other => Err(EvalError::type_error("conj", "List or Vector", other, 0)),
    }
}

/// Normalizes a List, Vector, Str, or nil into a List (nil and empty
/// collections become the empty-list sentinel).
#[builtin(name = "seq", category = "Sequences")]
pub fn seq_of(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Nil] => Ok(Value::Nil),
        [Value::List(items, _)] if items.is_empty() => Ok(Value::Nil),
        [Value::Vector(items, _)] if items.is_empty() => Ok(Value::Nil),
        [v @ Value::List(..)] => Ok(v.clone()),
        [Value::Vector(items, _)] => Ok(Value::list(items.as_ref().clone())),
        [Value::Str(s)] if s.is_empty() => Ok(Value::Nil),
        [Value::Str(s)] => Ok(Value::list(s.chars().map(|c| Value::str(c.to_string())).collect())),
        [other] => Err(EvalError::type_error("seq", "List, Vector, String, or nil", other, 0)),
        _ => Err(EvalError::arity_error("seq", "1", args.len())),
    }
}

/// Applies `f` to each element of a sequence, returning a List of results.
#[builtin(name = "map", category = "Sequences", related(apply))]
pub fn map(args: &[Value]) -> Result<Value, EvalError> {
    let [f, v] = args else {
        return Err(EvalError::arity_error("map", "2", args.len()));
    };
    let items = seq("map", v, 1)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(crate::eval::call(f, vec![item.clone()])?);
    }
    Ok(Value::list(out))
}

/// `(apply f a b (c d))` calls `f` with `a b c d` — the last argument is
/// spread, the rest are passed through as-is.
#[builtin(name = "apply", category = "Sequences", related(map))]
pub fn apply(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("apply", "at least 2", args.len()));
    }
    let f = &args[0];
    let last = args.len() - 1;
    let mut call_args: Vec<Value> = args[1..last].to_vec();
    call_args.extend_from_slice(seq("apply", &args[last], last)?);
    crate::eval::call(f, call_args)
}
