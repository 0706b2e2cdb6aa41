//! The trampoline evaluator: special forms, macro expansion, and function
//! application, per SPEC_FULL.md §4.4.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{empty_list, LambdaData, Value};

/// Evaluates `ast` in `env`. Tail positions are handled by looping rather
/// than recursing, so `(f (g x))`-shaped deep recursion in tail position
/// runs in constant Rust stack.
pub fn eval(mut ast: Value, mut env: Rc<Environment>) -> Result<Value, EvalError> {
    loop {
        ast = macroexpand(ast, &env)?;

        let items = match &ast {
            Value::List(items, _) if !items.is_empty() => items.clone(),
            _ => return eval_ast(&ast, &env),
        };

        if let Value::Sym(head) = &items[0] {
            match head.as_ref() {
                "def!" => {
                    let (name, form) = def_args(&items)?;
                    let value = eval(form, env.clone())?;
                    env.define(name.to_string(), value.clone());
                    return Ok(value);
                }
                "defmacro!" => {
                    let (name, form) = def_args(&items)?;
                    let value = eval(form, env.clone())?;
                    let lambda = match value {
                        Value::Lambda(l) => Value::Lambda(Rc::new(LambdaData {
                            fixed_params: l.fixed_params.clone(),
                            variadic: l.variadic.clone(),
                            body: l.body.clone(),
                            env: l.env.clone(),
                            is_macro: true,
                            meta: l.meta.clone(),
                        })),
                        other => {
                            return Err(EvalError::syntax_error(
                                "defmacro!",
                                format!("expected a fn* form, got {}", other.type_name()),
                            ))
                        }
                    };
                    env.define(name.to_string(), lambda.clone());
                    return Ok(lambda);
                }
                "macroexpand" => {
                    expect_arity("macroexpand", &items, 2)?;
                    return macroexpand(items[1].clone(), &env);
                }
                "let*" => {
                    expect_arity("let*", &items, 3)?;
                    let bindings = items[1]
                        .as_sequence()
                        .ok_or_else(|| EvalError::syntax_error("let*", "bindings must be a list or vector"))?;
                    if bindings.len() % 2 != 0 {
                        return Err(EvalError::syntax_error(
                            "let*",
                            "bindings must have an even number of forms",
                        ));
                    }
                    let child = Environment::with_parent(env.clone());
                    for pair in bindings.chunks(2) {
                        let name = match &pair[0] {
                            Value::Sym(s) => s.clone(),
                            other => {
                                return Err(EvalError::type_error("let*", "Symbol", other, 0))
                            }
                        };
                        let value = eval(pair[1].clone(), child.clone())?;
                        child.define(name.to_string(), value);
                    }
                    env = child;
                    ast = items[2].clone();
                    continue;
                }
                "do" => {
                    if items.len() < 2 {
                        return Ok(Value::Nil);
                    }
                    for form in &items[1..items.len() - 1] {
                        eval(form.clone(), env.clone())?;
                    }
                    ast = items[items.len() - 1].clone();
                    continue;
                }
                "if" => {
                    if items.len() != 3 && items.len() != 4 {
                        return Err(EvalError::syntax_error(
                            "if",
                            "expected (if cond then) or (if cond then else)",
                        ));
                    }
                    let cond = eval(items[1].clone(), env.clone())?;
                    if cond.is_truthy() {
                        ast = items[2].clone();
                    } else if items.len() == 4 {
                        ast = items[3].clone();
                    } else {
                        return Ok(Value::Nil);
                    }
                    continue;
                }
                "fn*" => {
                    expect_arity("fn*", &items, 3)?;
                    let (fixed_params, variadic) = parse_param_list(&items[1])?;
                    return Ok(Value::Lambda(Rc::new(LambdaData {
                        fixed_params,
                        variadic,
                        body: items[2].clone(),
                        env: env.clone(),
                        is_macro: false,
                        meta: Value::Nil,
                    })));
                }
                "quote" => {
                    expect_arity("quote", &items, 2)?;
                    return Ok(items[1].clone());
                }
                "quasiquote" => {
                    expect_arity("quasiquote", &items, 2)?;
                    ast = quasiquote(&items[1]);
                    continue;
                }
                "quasiquoteexpand" => {
                    expect_arity("quasiquoteexpand", &items, 2)?;
                    return Ok(quasiquote(&items[1]));
                }
                "try*" => {
                    return eval_try(&items, &env);
                }
                _ => {}
            }
        }

        // Ordinary application: evaluate head and args, then dispatch.
        let head = eval(items[0].clone(), env.clone())?;
        let mut args = Vec::with_capacity(items.len() - 1);
        for form in &items[1..] {
            args.push(eval(form.clone(), env.clone())?);
        }

        match head {
            Value::BuiltIn(f, _) => return f(&args),
            Value::Lambda(l) if !l.is_macro => {
                env = Environment::bind_params(
                    l.env.clone(),
                    &l.fixed_params,
                    l.variadic.as_ref(),
                    &args,
                )?;
                ast = l.body.clone();
                continue;
            }
            other => {
                return Err(EvalError::NotCallable(crate::printer::print(&other, true)))
            }
        }
    }
}

/// Evaluates non-call forms: symbol lookup, and element-wise evaluation of
/// vectors/hash-maps. Everything else (Int, Str, Kw, Bool, Nil, the empty
/// list, BuiltIn, Lambda, Atom) self-evaluates.
fn eval_ast(ast: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match ast {
        Value::Sym(name) => env.get(name),
        Value::Vector(items, _) => {
            let evaluated: Result<Vec<Value>, EvalError> =
                items.iter().map(|item| eval(item.clone(), env.clone())).collect();
            Ok(Value::vector(evaluated?))
        }
        Value::HashMap(map, _) => {
            let mut out = BTreeMap::new();
            for (k, v) in map.iter() {
                out.insert(k.clone(), eval(v.clone(), env.clone())?);
            }
            Ok(Value::map(out))
        }
        other => Ok(other.clone()),
    }
}

fn def_args(items: &[Value]) -> Result<(Rc<str>, Value), EvalError> {
    expect_arity(if_head_name(items), items, 3)?;
    match &items[1] {
        Value::Sym(name) => Ok((name.clone(), items[2].clone())),
        other => Err(EvalError::type_error("def!", "Symbol", other, 0)),
    }
}

fn if_head_name(items: &[Value]) -> &'static str {
    match &items[0] {
        Value::Sym(s) if s.as_ref() == "defmacro!" => "defmacro!",
        _ => "def!",
    }
}

fn expect_arity(form: &str, items: &[Value], expected: usize) -> Result<(), EvalError> {
    if items.len() != expected {
        Err(EvalError::ArityError {
            function: form.to_string(),
            expected: (expected - 1).to_string(),
            actual: items.len() - 1,
        })
    } else {
        Ok(())
    }
}

/// Splits a `fn*` parameter list into fixed names and an optional `&`-tail
/// variadic name.
fn parse_param_list(params: &Value) -> Result<(Vec<Rc<str>>, Option<Rc<str>>), EvalError> {
    let items = params
        .as_sequence()
        .ok_or_else(|| EvalError::syntax_error("fn*", "parameter list must be a list or vector"))?;

    let mut fixed = Vec::new();
    let mut variadic = None;
    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        let name = match item {
            Value::Sym(s) => s.clone(),
            other => return Err(EvalError::type_error("fn*", "Symbol", other, 0)),
        };
        if name.as_ref() == "&" {
            let rest_name = iter
                .next()
                .ok_or_else(|| EvalError::syntax_error("fn*", "'&' must be followed by a name"))?;
            match rest_name {
                Value::Sym(s) => variadic = Some(s.clone()),
                other => return Err(EvalError::type_error("fn*", "Symbol", other, 0)),
            }
            break;
        }
        fixed.push(name);
    }
    Ok((fixed, variadic))
}

/// `(try* A (catch* e B))`. Any `EvalError` raised evaluating `A` — whether
/// a Lisp-level `(throw x)` or an interpreter error — is converted to a
/// value and bound to `e` while `B` runs.
fn eval_try(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::syntax_error(
            "try*",
            "expected (try* A (catch* e B))",
        ));
    }
    let catch_form = items[2]
        .as_sequence()
        .ok_or_else(|| EvalError::syntax_error("try*", "expected a (catch* e B) clause"))?;
    if catch_form.len() != 3
        || !matches!(&catch_form[0], Value::Sym(s) if s.as_ref() == "catch*")
    {
        return Err(EvalError::syntax_error(
            "try*",
            "expected a (catch* e B) clause",
        ));
    }
    let binding = match &catch_form[1] {
        Value::Sym(s) => s.clone(),
        other => return Err(EvalError::type_error("catch*", "Symbol", other, 0)),
    };

    match eval(items[1].clone(), env.clone()) {
        Ok(value) => Ok(value),
        Err(err) => {
            let caught = Environment::with_parent(env.clone());
            caught.define(binding.to_string(), err.into_caught_value());
            eval(catch_form[2].clone(), caught)
        }
    }
}

/// Expands `ast` while it is a call to a symbol bound to a macro Lambda.
pub fn macroexpand(mut ast: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    loop {
        let macro_lambda = match &ast {
            Value::List(items, _) if !items.is_empty() => match &items[0] {
                Value::Sym(s) => match env.find(s) {
                    Some(Value::Lambda(l)) if l.is_macro => Some(l),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };
        let Some(lambda) = macro_lambda else {
            return Ok(ast);
        };
        let items = match &ast {
            Value::List(items, _) => items.clone(),
            _ => unreachable!(),
        };
        let macro_env = Environment::bind_params(
            lambda.env.clone(),
            &lambda.fixed_params,
            lambda.variadic.as_ref(),
            &items[1..],
        )?;
        ast = eval(lambda.body.clone(), macro_env)?;
    }
}

/// Builds the cons/concat expression-tree described in SPEC_FULL.md §4.4.1;
/// the result is itself evaluated by the trampoline, not executed here.
fn quasiquote(ast: &Value) -> Value {
    match ast {
        Value::List(items, _) if !items.is_empty() => {
            if let Value::Sym(s) = &items[0] {
                if s.as_ref() == "unquote" && items.len() == 2 {
                    return items[1].clone();
                }
            }
            quasiquote_sequence(items)
        }
        Value::List(..) => empty_list(),
        Value::Vector(items, _) => {
            Value::list(vec![Value::sym("vec"), quasiquote_sequence(items)])
        }
        Value::Sym(_) | Value::HashMap(..) => Value::list(vec![Value::sym("quote"), ast.clone()]),
        other => other.clone(),
    }
}

fn quasiquote_sequence(items: &[Value]) -> Value {
    let mut acc = empty_list();
    for elt in items.iter().rev() {
        let is_splice = matches!(
            elt,
            Value::List(inner, _) if inner.len() == 2 && matches!(&inner[0], Value::Sym(s) if s.as_ref() == "splice-unquote")
        );
        acc = if is_splice {
            let Value::List(inner, _) = elt else { unreachable!() };
            Value::list(vec![Value::sym("concat"), inner[1].clone(), acc])
        } else {
            Value::list(vec![Value::sym("cons"), quasiquote(elt), acc])
        };
    }
    acc
}

/// Applies a function-like value (`BuiltIn` or `Lambda`) to already-evaluated
/// arguments. Used by builtins like `map` and `apply` that need to call back
/// into a value passed as data; unlike the main trampoline this is a
/// plain (non-tail) Rust call.
pub fn call(f: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match f {
        Value::BuiltIn(func, _) => func(&args),
        Value::Lambda(l) => {
            let env =
                Environment::bind_params(l.env.clone(), &l.fixed_params, l.variadic.as_ref(), &args)?;
            eval(l.body.clone(), env)
        }
        other => Err(EvalError::NotCallable(crate::printer::print(other, true))),
    }
}

/// Builds the global environment with Rust builtins bound — bootstrap forms
/// (`not`, `load-file`, `cond`, `or`) are layered in by the embedding
/// (`main.rs`), matching SPEC_FULL.md §6's split between native core and
/// bootstrap-language sugar.
pub fn make_core_env() -> Rc<Environment> {
    let env = Environment::new();
    crate::core::register_all(env.clone());
    env
}

thread_local! {
    /// The environment `eval` (as a bound Lisp-callable value) evaluates
    /// against. `BuiltinFn` is a bare function pointer with no closure
    /// capture, so this threads the root frame through in the same way the
    /// reader threads pending doc-comments through `PENDING_DOCS`.
    static ROOT_ENV: RefCell<Option<Rc<Environment>>> = const { RefCell::new(None) };
}

fn eval_builtin(args: &[Value]) -> Result<Value, EvalError> {
    let [form] = args else {
        return Err(EvalError::arity_error("eval", "1", args.len()));
    };
    let root = ROOT_ENV
        .with(|cell| cell.borrow().clone())
        .expect("bind_eval_builtin must run before eval is called");
    eval(form.clone(), root)
}

/// Binds `eval` itself as a callable in `env`, closing over `env` as the
/// root frame it evaluates against (SPEC_FULL.md §6: "the REPL binds `eval`
/// itself as a callable... bound to the top-level env", which is what
/// `load-file` relies on).
pub fn bind_eval_builtin(env: &Rc<Environment>) {
    ROOT_ENV.with(|cell| *cell.borrow_mut() = Some(env.clone()));
    env.define("eval".to_string(), Value::builtin(eval_builtin));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn eval_str(input: &str, env: &Rc<Environment>) -> Value {
        let form = read(input).unwrap().unwrap();
        eval(form, env.clone()).unwrap()
    }

    #[test]
    fn self_evaluating_forms() {
        let env = make_core_env();
        assert_eq!(eval_str("42", &env), Value::Int(42));
        assert_eq!(eval_str(":kw", &env), Value::kw("kw"));
        assert_eq!(eval_str("nil", &env), Value::Nil);
    }

    #[test]
    fn arithmetic_and_apply() {
        let env = make_core_env();
        assert_eq!(eval_str("(+ 1 2 3)", &env), Value::Int(6));
    }

    #[test]
    fn def_and_lookup() {
        let env = make_core_env();
        eval_str("(def! x 10)", &env);
        assert_eq!(eval_str("x", &env), Value::Int(10));
    }

    #[test]
    fn let_star_sequential_bindings() {
        let env = make_core_env();
        assert_eq!(
            eval_str("(let* (x 3 y (+ x 1)) (* x y))", &env),
            Value::Int(12)
        );
    }

    #[test]
    fn if_true_and_false_branches() {
        let env = make_core_env();
        assert_eq!(eval_str("(if (> 2 1) :yes :no)", &env), Value::kw("yes"));
        assert_eq!(eval_str("(if false :yes :no)", &env), Value::kw("no"));
        assert_eq!(eval_str("(if false :yes)", &env), Value::Nil);
    }

    #[test]
    fn closures_capture_defining_environment() {
        let env = make_core_env();
        eval_str("(def! make-adder (fn* (n) (fn* (x) (+ x n))))", &env);
        eval_str("(def! add5 (make-adder 5))", &env);
        assert_eq!(eval_str("(add5 10)", &env), Value::Int(15));
    }

    #[test]
    fn variadic_lambda_collects_rest_as_list() {
        let env = make_core_env();
        eval_str("(def! f (fn* (a & rest) rest))", &env);
        assert_eq!(
            eval_str("(f 1 2 3)", &env),
            Value::list(vec![Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn deep_tail_recursion_does_not_overflow_the_rust_stack() {
        let env = make_core_env();
        eval_str(
            "(def! count-to (fn* (n acc) (if (= n acc) acc (count-to n (+ acc 1)))))",
            &env,
        );
        assert_eq!(eval_str("(count-to 100000 0)", &env), Value::Int(100000));
    }

    #[test]
    fn quote_suppresses_evaluation() {
        let env = make_core_env();
        assert_eq!(
            eval_str("(quote (+ 1 2))", &env),
            Value::list(vec![Value::sym("+"), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn quasiquote_unquote_and_splice() {
        let env = make_core_env();
        eval_str("(def! lst (list 2 3))", &env);
        assert_eq!(
            eval_str("`(1 ~(+ 1 1) 3)", &env),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            eval_str("`(0 ~@lst)", &env),
            Value::list(vec![Value::Int(0), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn quasiquote_vector_roundtrips_as_vector() {
        let env = make_core_env();
        assert_eq!(
            eval_str("`[1 ~(+ 1 1) 3]", &env),
            Value::vector(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn defmacro_and_macroexpand() {
        let env = make_core_env();
        eval_str(
            "(defmacro! unless (fn* (pred a b) `(if ~pred ~b ~a)))",
            &env,
        );
        assert_eq!(eval_str("(unless false 7 8)", &env), Value::Int(7));
        let expanded = eval_str("(macroexpand (unless false 7 8))", &env);
        assert_eq!(
            expanded,
            Value::list(vec![
                Value::sym("if"),
                Value::Bool(false),
                Value::Int(8),
                Value::Int(7)
            ])
        );
    }

    #[test]
    fn try_catch_binds_thrown_value() {
        let env = make_core_env();
        assert_eq!(
            eval_str(r#"(try* (throw "oops") (catch* e e))"#, &env),
            Value::str("oops")
        );
    }

    #[test]
    fn try_catch_also_catches_interpreter_errors() {
        let env = make_core_env();
        let result = eval_str("(try* (undefined-symbol) (catch* e (nil? e)))", &env);
        assert_eq!(result, Value::Bool(false));
    }

    #[test]
    fn calling_a_non_function_errors() {
        let env = make_core_env();
        let form = read("(1 2 3)").unwrap().unwrap();
        assert!(eval(form, env).is_err());
    }
}
