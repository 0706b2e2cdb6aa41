//! Binary comparison builtins. `=` is structural/identity equality over any
//! two values (SPEC_FULL.md §3); the ordering operators require Int operands.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

fn as_int(function: &str, v: &Value, position: usize) -> Result<i64, EvalError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(EvalError::type_error(function, "Int", other, position)),
    }
}

fn binary(function: &str, args: &[Value]) -> Result<(Value, Value), EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error(function, "2", args.len()));
    }
    Ok((args[0].clone(), args[1].clone()))
}

/// Structural equality. `(= (list 1 2) [1 2])` is true.
#[builtin(name = "=", category = "Comparison", related(lt, gt))]
pub fn eq(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = binary("=", args)?;
    Ok(Value::Bool(a == b))
}

#[builtin(name = "<", category = "Comparison", related(eq, gt, le, ge))]
pub fn lt(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = binary("<", args)?;
    Ok(Value::Bool(as_int("<", &a, 0)? < as_int("<", &b, 1)?))
}

#[builtin(name = "<=", category = "Comparison", related(lt, gt, ge))]
pub fn le(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = binary("<=", args)?;
    Ok(Value::Bool(as_int("<=", &a, 0)? <= as_int("<=", &b, 1)?))
}

#[builtin(name = ">", category = "Comparison", related(lt, le, ge))]
pub fn gt(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = binary(">", args)?;
    Ok(Value::Bool(as_int(">", &a, 0)? > as_int(">", &b, 1)?))
}

#[builtin(name = ">=", category = "Comparison", related(lt, le, gt))]
pub fn ge(args: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = binary(">=", args)?;
    Ok(Value::Bool(as_int(">=", &a, 0)? >= as_int(">=", &b, 1)?))
}
