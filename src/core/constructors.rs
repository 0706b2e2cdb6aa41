//! Builders for compound values: sequences, maps, symbols, keywords, atoms.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::EvalError;
use crate::value::{HashKey, Value};
use lisp_macros::builtin;

#[builtin(name = "list", category = "Constructors", related(vector, list_q))]
pub fn list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

#[builtin(name = "vector", category = "Constructors", related(list, vector_q))]
pub fn vector(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::vector(args.to_vec()))
}

/// Used internally by quasiquote's vector-handling rule to wrap a
/// constructed list back into a Vector.
#[builtin(name = "vec", category = "Constructors", related(vector, list))]
pub fn vec_of(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("vec", "1", args.len()));
    }
    let items = args[0]
        .as_sequence()
        .ok_or_else(|| EvalError::type_error("vec", "List or Vector", &args[0], 0))?;
    Ok(Value::vector(items.to_vec()))
}

/// Builds a hash-map from alternating key/value arguments.
///
/// # Examples
/// ```lisp
/// (hash-map :a 1 :b 2) => {:a 1 :b 2}
/// ```
#[builtin(name = "hash-map", category = "Constructors", related(assoc, map_q))]
pub fn hash_map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() % 2 != 0 {
        return Err(EvalError::runtime_error(
            "hash-map",
            "requires an even number of arguments",
        ));
    }
    let mut map = BTreeMap::new();
    for pair in args.chunks(2) {
        map.insert(HashKey::from_value(&pair[0])?, pair[1].clone());
    }
    Ok(Value::map(map))
}

#[builtin(name = "symbol", category = "Constructors", related(symbol_q, keyword))]
pub fn symbol(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Str(s)] => Ok(Value::sym(s.as_ref())),
        [other] => Err(EvalError::type_error("symbol", "String", other, 0)),
        _ => Err(EvalError::arity_error("symbol", "1", args.len())),
    }
}

#[builtin(name = "keyword", category = "Constructors", related(keyword_q, symbol))]
pub fn keyword(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Str(s)] => Ok(Value::kw(s.as_ref())),
        [k @ Value::Kw(_)] => Ok(k.clone()),
        [other] => Err(EvalError::type_error("keyword", "String", other, 0)),
        _ => Err(EvalError::arity_error("keyword", "1", args.len())),
    }
}

#[builtin(name = "atom", category = "Constructors", related(deref, reset_bang))]
pub fn atom(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [v] => Ok(Value::Atom(Rc::new(RefCell::new(v.clone())))),
        _ => Err(EvalError::arity_error("atom", "1", args.len())),
    }
}

/// Returns a symbol guaranteed unique for this process, used by hygiene-
/// sensitive macros to avoid capturing a caller's bindings.
#[builtin(name = "gensym", category = "Constructors")]
pub fn gensym(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("gensym", "0", args.len()));
    }
    Ok(crate::value::gensym())
}
