//! Lexical environments: a name→value mapping with a parent chain, plus the
//! variadic parameter-binding rule used when applying a Lambda.

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Builds a child frame by binding `params` (fixed names, then an
    /// optional variadic tail name) to `args`, per SPEC_FULL.md §4.3: a
    /// literal `&` in the parameter list marks the next symbol as the
    /// variadic tail, bound to the remaining arguments as a List.
    pub fn bind_params(
        parent: Rc<Environment>,
        fixed_params: &[Rc<str>],
        variadic: Option<&Rc<str>>,
        args: &[Value],
    ) -> Result<Rc<Self>, EvalError> {
        let min_required = fixed_params.len();
        if variadic.is_some() {
            if args.len() < min_required {
                return Err(EvalError::ArityError {
                    function: "lambda".to_string(),
                    expected: format!("{min_required} or more"),
                    actual: args.len(),
                });
            }
        } else if args.len() != min_required {
            return Err(EvalError::ArityError {
                function: "lambda".to_string(),
                expected: min_required.to_string(),
                actual: args.len(),
            });
        }

        let env = Environment::with_parent(parent);
        for (name, value) in fixed_params.iter().zip(args.iter()) {
            env.define(name.to_string(), value.clone());
        }
        if let Some(rest_name) = variadic {
            let rest: Vec<Value> = args[min_required..].to_vec();
            env.define(rest_name.to_string(), Value::list(rest));
        }
        Ok(env)
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain).
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Returns the nearest frame (self or ancestor) containing `name`.
    pub fn find(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.find(name))
    }

    /// Looks up a symbol, raising `UndefinedSymbol` if absent in the whole chain.
    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        self.find(name)
            .ok_or_else(|| EvalError::UndefinedSymbol(name.to_string()))
    }

    /// Updates an existing binding by walking up the parent chain to the
    /// frame that owns it. Used by `def!`'s "current frame" semantics only
    /// indirectly; most callers should use `define` which always targets the
    /// current frame. `set` exists for completeness of the §4.3 operation list.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }
        Err(EvalError::UndefinedSymbol(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Int(42));
        assert_eq!(env.get("x").unwrap(), Value::Int(42));
    }

    #[test]
    fn undefined_symbol_errors() {
        let env = Environment::new();
        assert!(env.get("undefined").is_err());
    }

    #[test]
    fn shadowing() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Int(42));
        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Int(100));
        assert_eq!(child.get("x").unwrap(), Value::Int(100));
    }

    #[test]
    fn parent_lookup() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Int(42));
        let child = Environment::with_parent(parent);
        assert_eq!(child.get("x").unwrap(), Value::Int(42));
    }

    #[test]
    fn multiple_levels() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Int(1));
        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Int(2));
        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Int(3));

        assert_eq!(child.get("a").unwrap(), Value::Int(1));
        assert_eq!(child.get("b").unwrap(), Value::Int(2));
        assert_eq!(child.get("c").unwrap(), Value::Int(3));
    }

    #[test]
    fn bind_params_exact_arity() {
        let root = Environment::new();
        let params: Vec<Rc<str>> = vec![Rc::from("a"), Rc::from("b")];
        let env =
            Environment::bind_params(root, &params, None, &[Value::Int(1), Value::Int(2)])
                .unwrap();
        assert_eq!(env.get("a").unwrap(), Value::Int(1));
        assert_eq!(env.get("b").unwrap(), Value::Int(2));
    }

    #[test]
    fn bind_params_arity_mismatch_errors() {
        let root = Environment::new();
        let params: Vec<Rc<str>> = vec![Rc::from("a"), Rc::from("b")];
        assert!(Environment::bind_params(root, &params, None, &[Value::Int(1)]).is_err());
    }

    #[test]
    fn bind_params_variadic_tail() {
        let root = Environment::new();
        let params: Vec<Rc<str>> = vec![Rc::from("a")];
        let rest: Rc<str> = Rc::from("xs");
        let env = Environment::bind_params(
            root,
            &params,
            Some(&rest),
            &[Value::Int(1), Value::Int(2), Value::Int(3)],
        )
        .unwrap();
        assert_eq!(env.get("a").unwrap(), Value::Int(1));
        assert_eq!(
            env.get("xs").unwrap(),
            Value::list(vec![Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn bind_params_variadic_accepts_empty_tail() {
        let root = Environment::new();
        let params: Vec<Rc<str>> = vec![Rc::from("a")];
        let rest: Rc<str> = Rc::from("xs");
        let env = Environment::bind_params(root, &params, Some(&rest), &[Value::Int(1)]).unwrap();
        assert_eq!(env.get("xs").unwrap(), crate::value::empty_list());
    }
}
