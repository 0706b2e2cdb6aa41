//! Integer arithmetic over `Value::Int`.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

fn as_int(function: &str, v: &Value, position: usize) -> Result<i64, EvalError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(EvalError::type_error(function, "Int", other, position)),
    }
}

/// Sums all arguments.
///
/// # Examples
/// ```lisp
/// (+ 1 2 3) => 6
/// (+) => 0
/// ```
#[builtin(name = "+", category = "Arithmetic", related(sub, mul, div))]
pub fn add(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = 0i64;
    for (i, a) in args.iter().enumerate() {
        total += as_int("+", a, i)?;
    }
    Ok(Value::Int(total))
}

/// Subtracts the rest from the first argument. With one argument, negates it.
///
/// # Examples
/// ```lisp
/// (- 10 3 2) => 5
/// (- 5) => -5
/// ```
#[builtin(name = "-", category = "Arithmetic", related(add, mul, div))]
pub fn sub(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("-", "at least 1", 0));
    }
    if args.len() == 1 {
        return Ok(Value::Int(-as_int("-", &args[0], 0)?));
    }
    let mut total = as_int("-", &args[0], 0)?;
    for (i, a) in args[1..].iter().enumerate() {
        total -= as_int("-", a, i + 1)?;
    }
    Ok(Value::Int(total))
}

/// Multiplies all arguments.
#[builtin(name = "*", category = "Arithmetic", related(add, sub, div))]
pub fn mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = 1i64;
    for (i, a) in args.iter().enumerate() {
        total *= as_int("*", a, i)?;
    }
    Ok(Value::Int(total))
}

/// Divides the first argument by the rest, left to right.
///
/// # Examples
/// ```lisp
/// (/ 20 2 5) => 2
/// ```
#[builtin(name = "/", category = "Arithmetic", related(add, sub, mul))]
pub fn div(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("/", "at least 2", args.len()));
    }
    let mut total = as_int("/", &args[0], 0)?;
    for (i, a) in args[1..].iter().enumerate() {
        let divisor = as_int("/", a, i + 1)?;
        if divisor == 0 {
            return Err(EvalError::runtime_error("/", "division by zero"));
        }
        total /= divisor;
    }
    Ok(Value::Int(total))
}
