//! Single-argument type predicates.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

fn one<'a>(function: &str, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    args.first()
        .ok_or_else(|| EvalError::arity_error(function, "1", 0))
}

#[builtin(name = "nil?", category = "Predicates", related(true_q, false_q))]
pub fn nil_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("nil?", args)?, Value::Nil)))
}

#[builtin(name = "true?", category = "Predicates", related(false_q, nil_q))]
pub fn true_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("true?", args)?, Value::Bool(true))))
}

#[builtin(name = "false?", category = "Predicates", related(true_q, nil_q))]
pub fn false_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("false?", args)?, Value::Bool(false))))
}

#[builtin(name = "symbol?", category = "Predicates", related(keyword_q))]
pub fn symbol_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("symbol?", args)?, Value::Sym(_))))
}

#[builtin(name = "keyword?", category = "Predicates", related(symbol_q))]
pub fn keyword_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("keyword?", args)?, Value::Kw(_))))
}

#[builtin(name = "list?", category = "Predicates", related(vector_q, sequential_q))]
pub fn list_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("list?", args)?, Value::List(..))))
}

#[builtin(name = "vector?", category = "Predicates", related(list_q, sequential_q))]
pub fn vector_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("vector?", args)?, Value::Vector(..))))
}

#[builtin(name = "map?", category = "Predicates", related(list_q, vector_q))]
pub fn map_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("map?", args)?, Value::HashMap(..))))
}

/// True for Lists and Vectors; false for every other type, including maps.
#[builtin(name = "sequential?", category = "Predicates", related(list_q, vector_q))]
pub fn sequential_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(one("sequential?", args)?.as_sequence().is_some()))
}

/// True for an empty List, Vector, or HashMap, and for `nil` (treated as an
/// empty sequence per §3: `(count nil)` is 0, so `(empty? nil)` is true).
#[builtin(name = "empty?", category = "Predicates", related(count))]
pub fn empty_q(args: &[Value]) -> Result<Value, EvalError> {
    let v = one("empty?", args)?;
    let empty = match v {
        Value::Nil => true,
        Value::List(items, _) | Value::Vector(items, _) => items.is_empty(),
        Value::HashMap(map, _) => map.is_empty(),
        other => return Err(EvalError::type_error("empty?", "List, Vector, or HashMap", other, 0)),
    };
    Ok(Value::Bool(empty))
}

#[builtin(name = "fn?", category = "Predicates", related(macro_q))]
pub fn fn_q(args: &[Value]) -> Result<Value, EvalError> {
    let is_fn = match one("fn?", args)? {
        Value::BuiltIn(..) => true,
        Value::Lambda(l) => !l.is_macro,
        _ => false,
    };
    Ok(Value::Bool(is_fn))
}

#[builtin(name = "macro?", category = "Predicates", related(fn_q))]
pub fn macro_q(args: &[Value]) -> Result<Value, EvalError> {
    let is_macro = matches!(one("macro?", args)?, Value::Lambda(l) if l.is_macro);
    Ok(Value::Bool(is_macro))
}

#[builtin(name = "atom?", category = "Predicates", related(deref))]
pub fn atom_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("atom?", args)?, Value::Atom(_))))
}

#[builtin(name = "number?", category = "Predicates")]
pub fn number_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("number?", args)?, Value::Int(_))))
}

#[builtin(name = "string?", category = "Predicates")]
pub fn string_q(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(one("string?", args)?, Value::Str(_))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_q_true_for_nil_false_otherwise() {
        assert_eq!(nil_q(&[Value::Nil]).unwrap(), Value::Bool(true));
        assert_eq!(nil_q(&[Value::Int(0)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn true_q_and_false_q_only_match_their_own_bool() {
        assert_eq!(true_q(&[Value::Bool(true)]).unwrap(), Value::Bool(true));
        assert_eq!(true_q(&[Value::Bool(false)]).unwrap(), Value::Bool(false));
        assert_eq!(false_q(&[Value::Bool(false)]).unwrap(), Value::Bool(true));
        assert_eq!(false_q(&[Value::Bool(true)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn empty_q_treats_nil_as_an_empty_sequence() {
        assert_eq!(empty_q(&[Value::Nil]).unwrap(), Value::Bool(true));
        assert_eq!(empty_q(&[crate::value::empty_list()]).unwrap(), Value::Bool(true));
        assert_eq!(
            empty_q(&[Value::list(vec![Value::Int(1)])]).unwrap(),
            Value::Bool(false)
        );
    }
}
