//! Thin wrappers over `Value::meta`/`Value::with_meta`.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

#[builtin(name = "meta", category = "Metadata", related(with_meta))]
pub fn meta(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = args else {
        return Err(EvalError::arity_error("meta", "1", args.len()));
    };
    Ok(v.meta())
}

#[builtin(name = "with-meta", category = "Metadata", related(meta))]
pub fn with_meta(args: &[Value]) -> Result<Value, EvalError> {
    let [v, m] = args else {
        return Err(EvalError::arity_error("with-meta", "2", args.len()));
    };
    v.with_meta(m.clone())
}
