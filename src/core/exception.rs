//! `throw` raises a Lisp-level exception, unwound by the nearest `try*`.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

#[builtin(name = "throw", category = "Exceptions")]
pub fn throw(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = args else {
        return Err(EvalError::arity_error("throw", "1", args.len()));
    };
    Err(EvalError::Thrown(v.clone()))
}
