// ABOUTME: Black-box tests that read, eval, and print whole programs end to end

use mal_rs::{bootstrap, env::Environment, eval, printer, reader, value::Value};
use std::rc::Rc;

/// A full environment, including the bootstrap-language forms (`not`,
/// `load-file`, `cond`, `or`) a real REPL/CLI session would load.
fn setup() -> Rc<Environment> {
    let env = eval::make_core_env();
    eval::bind_eval_builtin(&env);
    bootstrap::load(&env);
    env
}

/// Evaluates every top-level form in `src` in sequence, returning the
/// printed (readable) result of the last one.
fn run(src: &str, env: &Rc<Environment>) -> String {
    let mut remaining = src;
    let mut last = Value::Nil;
    while let Some((form, rest)) = reader::read_one(remaining).expect("program must parse") {
        last = eval::eval(form, env.clone()).expect("program must evaluate");
        remaining = rest;
    }
    printer::print(&last, true)
}

#[test]
fn arithmetic() {
    let env = setup();
    assert_eq!(run("(+ 1 2)", &env), "3");
}

#[test]
fn let_star_sequential_bindings() {
    let env = setup();
    assert_eq!(run("(let* (x 3 y (+ x 1)) (* x y))", &env), "12");
}

#[test]
fn if_branches() {
    let env = setup();
    assert_eq!(run("(if (> 2 1) :yes :no)", &env), ":yes");
}

#[test]
fn lambda_application() {
    let env = setup();
    assert_eq!(run("((fn* (a b) (+ a b)) 10 32)", &env), "42");
}

#[test]
fn try_catch_formats_caught_value() {
    let env = setup();
    assert_eq!(
        run(r#"(try* (throw "oops") (catch* e (str "caught:" e)))"#, &env),
        "\"caught:oops\""
    );
}

#[test]
fn recursive_factorial() {
    let env = setup();
    let program = "(do \
        (def! fact (fn* (n) (if (<= n 1) 1 (* n (fact (- n 1)))))) \
        (fact 5))";
    assert_eq!(run(program, &env), "120");
}

#[test]
fn not_is_bootstrapped() {
    let env = setup();
    assert_eq!(run("(not false)", &env), "true");
    assert_eq!(run("(not 0)", &env), "false");
}

#[test]
fn cond_bootstrapped_macro() {
    let env = setup();
    let program = "(cond false 1 (> 2 1) 2 true 3)";
    assert_eq!(run(program, &env), "2");
    assert_eq!(run("(cond false 1)", &env), "nil");
}

#[test]
fn or_bootstrapped_macro_short_circuits() {
    let env = setup();
    assert_eq!(run("(or false nil 3 (throw \"unreached\"))", &env), "3");
    assert_eq!(run("(or false nil)", &env), "nil");
}

#[test]
fn load_file_reads_and_evaluates_a_script() {
    let env = setup();
    let path = std::env::temp_dir().join(format!("mal-rs-load-file-test-{}.mal", std::process::id()));
    std::fs::write(&path, "(def! loaded-value (+ 40 2))").unwrap();

    let form = Value::list(vec![
        Value::sym("load-file"),
        Value::str(path.to_string_lossy().into_owned()),
    ]);
    eval::eval(form, env.clone()).expect("load-file must succeed");
    assert_eq!(run("loaded-value", &env), "42");

    std::fs::remove_file(&path).ok();
}

#[test]
fn round_trip_readable_print() {
    let env = setup();
    for src in [
        "42", "-7", "\"hi\\nthere\"", ":kw", "(1 2 3)", "[1 2 3]", "{:a 1 :b 2}", "nil", "true",
    ] {
        let form = reader::read(src).unwrap().unwrap();
        let printed = printer::print(&form, true);
        let reparsed = reader::read(&printed).unwrap().unwrap();
        assert_eq!(form, reparsed, "round-trip failed for {src}");
    }
    let _ = env;
}

#[test]
fn tail_call_optimized_recursion_does_not_overflow() {
    let env = setup();
    let program = "(do \
        (def! f (fn* (n) (if (= n 0) :done (f (- n 1))))) \
        (f 200000))";
    assert_eq!(run(program, &env), ":done");
}

#[test]
fn lexical_closures_nest() {
    let env = setup();
    assert_eq!(run("(((fn* (a) (fn* (b) (+ a b))) 3) 4)", &env), "7");
}

#[test]
fn variadic_capture() {
    let env = setup();
    assert_eq!(run("((fn* (& xs) xs) 1 2 3)", &env), "(1 2 3)");
    assert_eq!(run("((fn* (a & xs) xs) 1)", &env), "()");
}

#[test]
fn quasiquote_identities() {
    let env = setup();
    assert_eq!(run("(def! x 5) `~x", &env), "5");
    assert_eq!(run("(def! b 2) `(a ~b c)", &env), "(a 2 c)");
    assert_eq!(run("(def! xs (list 1 2)) `(a ~@xs b)", &env), "(a 1 2 b)");
}

#[test]
fn hash_maps_are_persistent() {
    let env = setup();
    let program = "(do (def! h (hash-map :a 1)) (assoc h :b 2) h)";
    assert_eq!(run(program, &env), "{:a 1}");
}

#[test]
fn list_and_vector_cross_equality() {
    let env = setup();
    assert_eq!(run("(= (list 1 2) [1 2])", &env), "true");
    assert_eq!(run("(= (list) [])", &env), "true");
}

#[test]
fn atom_semantics() {
    let env = setup();
    let program = "(do (def! a (atom 1)) (swap! a + 2))";
    assert_eq!(run(program, &env), "3");
    assert_eq!(run("@a", &env), "3");
}

#[test]
fn metadata_round_trips_through_with_meta_and_meta() {
    let env = setup();
    let program = "(meta (with-meta (list 1 2) {:doc \"x\"}))";
    assert_eq!(run(program, &env), "{:doc \"x\"}");
    assert_eq!(run("(meta (list 1 2))", &env), "nil");
}

#[test]
fn nil_true_false_predicates_parse_as_whole_symbols() {
    let env = setup();
    assert_eq!(run("(nil? nil)", &env), "true");
    assert_eq!(run("(nil? 0)", &env), "false");
    assert_eq!(run("(true? true)", &env), "true");
    assert_eq!(run("(false? false)", &env), "true");
}

#[test]
fn empty_q_is_true_for_nil() {
    let env = setup();
    assert_eq!(run("(empty? nil)", &env), "true");
    assert_eq!(run("(empty? (list))", &env), "true");
    assert_eq!(run("(empty? (list 1))", &env), "false");
}

#[test]
fn uncaught_undefined_symbol_is_an_error() {
    let env = setup();
    let form = reader::read("(totally-undefined)").unwrap().unwrap();
    let err = eval::eval(form, env).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
