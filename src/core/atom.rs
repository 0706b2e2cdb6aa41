//! Mutable reference cells. An Atom is the only mutable value in the model;
//! everything else (List, Vector, HashMap) is structurally persistent.

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

fn as_atom<'a>(function: &str, v: &'a Value, position: usize) -> Result<&'a std::rc::Rc<std::cell::RefCell<Value>>, EvalError> {
    match v {
        Value::Atom(cell) => Ok(cell),
        other => Err(EvalError::type_error(function, "Atom", other, position)),
    }
}

#[builtin(name = "deref", category = "Atoms", related(reset_bang, swap_bang))]
pub fn deref(args: &[Value]) -> Result<Value, EvalError> {
    let [v] = args else {
        return Err(EvalError::arity_error("deref", "1", args.len()));
    };
    Ok(as_atom("deref", v, 0)?.borrow().clone())
}

#[builtin(name = "reset!", category = "Atoms", related(deref, swap_bang))]
pub fn reset_bang(args: &[Value]) -> Result<Value, EvalError> {
    let [a, v] = args else {
        return Err(EvalError::arity_error("reset!", "2", args.len()));
    };
    *as_atom("reset!", a, 0)?.borrow_mut() = v.clone();
    Ok(v.clone())
}

/// `(swap! atom f a b ...)` replaces the atom's value with
/// `(f @atom a b ...)`, returning the new value.
#[builtin(name = "swap!", category = "Atoms", related(deref, reset_bang))]
pub fn swap_bang(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("swap!", "at least 2", args.len()));
    }
    let cell = as_atom("swap!", &args[0], 0)?;
    let old = cell.borrow().clone();
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(old);
    call_args.extend_from_slice(&args[2..]);
    let new = crate::eval::call(&args[1], call_args)?;
    *cell.borrow_mut() = new.clone();
    Ok(new)
}
