//! Persistent hash-map operations. `get`/`contains?` treat `nil` as an empty
//! map rather than raising, matching the reference interpreter this design
//! is grounded on.

use crate::error::EvalError;
use crate::value::{HashKey, Value};
use lisp_macros::builtin;

fn as_map<'a>(function: &str, v: &'a Value, position: usize) -> Result<&'a std::collections::BTreeMap<HashKey, Value>, EvalError> {
    match v {
        Value::HashMap(m, _) => Ok(m),
        other => Err(EvalError::type_error(function, "HashMap", other, position)),
    }
}

/// Returns a new map with the given key/value pairs added or overwritten.
#[builtin(name = "assoc", category = "Hash Maps", related(dissoc, get))]
pub fn assoc(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || (args.len() - 1) % 2 != 0 {
        return Err(EvalError::runtime_error(
            "assoc",
            "expects a map followed by an even number of key/value forms",
        ));
    }
    let mut map = as_map("assoc", &args[0], 0)?.clone();
    for pair in args[1..].chunks(2) {
        map.insert(HashKey::from_value(&pair[0])?, pair[1].clone());
    }
    Ok(Value::map(map))
}

/// Returns a new map with the given keys removed.
#[builtin(name = "dissoc", category = "Hash Maps", related(assoc))]
pub fn dissoc(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("dissoc", "at least 1", 0));
    }
    let mut map = as_map("dissoc", &args[0], 0)?.clone();
    for key in &args[1..] {
        map.remove(&HashKey::from_value(key)?);
    }
    Ok(Value::map(map))
}

/// Returns nil for a missing key or a nil map, rather than raising.
#[builtin(name = "get", category = "Hash Maps", related(contains_q, assoc))]
pub fn get(args: &[Value]) -> Result<Value, EvalError> {
    let [m, k] = args else {
        return Err(EvalError::arity_error("get", "2", args.len()));
    };
    if matches!(m, Value::Nil) {
        return Ok(Value::Nil);
    }
    let map = as_map("get", m, 0)?;
    let key = HashKey::from_value(k)?;
    Ok(map.get(&key).cloned().unwrap_or(Value::Nil))
}

#[builtin(name = "contains?", category = "Hash Maps", related(get))]
pub fn contains_q(args: &[Value]) -> Result<Value, EvalError> {
    let [m, k] = args else {
        return Err(EvalError::arity_error("contains?", "2", args.len()));
    };
    if matches!(m, Value::Nil) {
        return Ok(Value::Bool(false));
    }
    let map = as_map("contains?", m, 0)?;
    let key = HashKey::from_value(k)?;
    Ok(Value::Bool(map.contains_key(&key)))
}

#[builtin(name = "keys", category = "Hash Maps", related(vals))]
pub fn keys(args: &[Value]) -> Result<Value, EvalError> {
    let [m] = args else {
        return Err(EvalError::arity_error("keys", "1", args.len()));
    };
    let map = as_map("keys", m, 0)?;
    Ok(Value::list(map.keys().cloned().map(HashKey::into_value).collect()))
}

#[builtin(name = "vals", category = "Hash Maps", related(keys))]
pub fn vals(args: &[Value]) -> Result<Value, EvalError> {
    let [m] = args else {
        return Err(EvalError::arity_error("vals", "1", args.len()));
    };
    let map = as_map("vals", m, 0)?;
    Ok(Value::list(map.values().cloned().collect()))
}
