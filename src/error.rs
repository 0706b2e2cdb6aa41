//! Internal error plumbing for the evaluator.
//!
//! This is distinct from the Lisp-level `throw`/`try*` exception described in
//! SPEC_FULL.md §5: that mechanism is *implemented* as the `Thrown` variant
//! here, so a single `Result`-based propagation path carries both "the
//! interpreter hit a problem" and "user code called `throw`".

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Type mismatch error with function name, expected type, actual type, and position.
    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    /// Arity error with function name, expected count/range, and actual count.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Runtime error with function context.
    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("'{0}' not found")]
    UndefinedSymbol(String),

    #[error("Expected Function, found '{0}'")]
    NotCallable(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// A malformed special form, e.g. `try*` without a `catch*` clause.
    #[error("Incorrect {form} syntax: {message}")]
    SyntaxError { form: String, message: String },

    /// The payload of a Lisp-level `(throw x)`, propagated through the same
    /// `Result` chain as every other `EvalError` until a `try*` catches it.
    #[error("{}", crate::printer::print(.0, true))]
    Thrown(Value),
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        EvalError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn syntax_error(form: &str, message: impl Into<String>) -> Self {
        EvalError::SyntaxError {
            form: form.to_string(),
            message: message.into(),
        }
    }

    /// The value a `catch*` clause should bind: the thrown value itself for
    /// `Thrown`, or the error message as a Str for every other interpreter-raised case.
    pub fn into_caught_value(self) -> Value {
        match self {
            EvalError::Thrown(v) => v,
            other => Value::str(other.to_string()),
        }
    }
}
