//! The small set of forms layered onto the native core in the source
//! language itself, per SPEC_FULL.md §6: `not`, `load-file`, `cond`, `or`.
//! Kept separate from the native `core` module so both the REPL/CLI binary
//! and the test suite can load the same bootstrap text.

use std::rc::Rc;

use crate::env::Environment;
use crate::eval;
use crate::reader;

pub const SOURCE: &str = r#"
(def! not (fn* (a) (if a false true)))
(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) " nil)")))))
(defmacro! cond (fn* (& xs)
  (if (empty? xs)
      nil
      (list 'if (first xs)
            (if (> (count xs) 1)
                (nth xs 1)
                (throw "odd number of forms to cond"))
            (cons 'cond (rest (rest xs)))))))
(defmacro! or (fn* (& xs)
  (if (empty? xs)
      nil
      (if (= (count xs) 1)
          (first xs)
          (let* (condvar (gensym))
            `(let* (~condvar ~(first xs))
               (if ~condvar ~condvar (or ~@(rest xs)))))))))
"#;

/// Evaluates every top-level form in `SOURCE` against `env`. A bootstrap
/// form that fails to parse or evaluate is a programming error in this
/// module, not something callers need to recover from, so this panics
/// rather than returning a `Result` callers would have no meaningful way
/// to act on.
pub fn load(env: &Rc<Environment>) {
    let mut remaining = SOURCE;
    loop {
        match reader::read_one(remaining).expect("bootstrap forms must parse") {
            Some((form, rest)) => {
                eval::eval(form, env.clone()).expect("bootstrap forms must evaluate");
                remaining = rest;
            }
            None => break,
        }
    }
}
