//! Printing, string conversion, and the small amount of host I/O the
//! language exposes: reading a line from stdin, slurping a file, and a
//! monotonic clock for benchmarking Lisp code.

use std::io::Write;

use crate::error::EvalError;
use crate::value::Value;
use lisp_macros::builtin;

/// Renders each argument readably (as `read` would reparse it) and joins
/// them with a single space.
///
/// # Examples
/// ```lisp
/// (pr-str 1 "two" :three) => "1 \"two\" :three"
/// ```
#[builtin(name = "pr-str", category = "I/O", related(str_of, prn))]
pub fn pr_str(args: &[Value]) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| crate::printer::print(v, true))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::str(joined))
}

/// Renders each argument as a human-facing string (strings unquoted) and
/// concatenates them with no separator.
///
/// # Examples
/// ```lisp
/// (str "a" 1 "b") => "a1b"
/// ```
#[builtin(name = "str", category = "I/O", related(pr_str))]
pub fn str_of(args: &[Value]) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| crate::printer::print(v, false))
        .collect::<String>();
    Ok(Value::str(joined))
}

/// Like `pr-str`, but writes the result to stdout followed by a newline.
#[builtin(name = "prn", category = "I/O", related(pr_str, println_fn))]
pub fn prn(args: &[Value]) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| crate::printer::print(v, true))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{joined}");
    Ok(Value::Nil)
}

/// Like `str`, but the arguments are space-separated and the result is
/// written to stdout followed by a newline.
#[builtin(name = "println", category = "I/O", related(prn, str_of))]
pub fn println_fn(args: &[Value]) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| crate::printer::print(v, false))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{joined}");
    Ok(Value::Nil)
}

/// Parses the first form out of a string, per the normal reader grammar.
/// Returns nil if the string contains no form.
#[builtin(name = "read-string", category = "I/O")]
pub fn read_string(args: &[Value]) -> Result<Value, EvalError> {
    let [Value::Str(s)] = args else {
        return Err(EvalError::arity_error("read-string", "1", args.len()));
    };
    Ok(crate::reader::read(s)?.unwrap_or(Value::Nil))
}

/// Reads an entire file's contents into a string.
#[builtin(name = "slurp", category = "I/O", related(read_string))]
pub fn slurp(args: &[Value]) -> Result<Value, EvalError> {
    let [Value::Str(path)] = args else {
        return Err(EvalError::arity_error("slurp", "1", args.len()));
    };
    std::fs::read_to_string(path.as_ref())
        .map(Value::str)
        .map_err(|e| EvalError::runtime_error("slurp", format!("{path}: {e}")))
}

/// Writes a prompt to stdout and reads a single line from stdin, stripping
/// the trailing newline. Returns nil at end of input.
#[builtin(name = "readline", category = "I/O")]
pub fn readline(args: &[Value]) -> Result<Value, EvalError> {
    let [Value::Str(prompt)] = args else {
        return Err(EvalError::arity_error("readline", "1", args.len()));
    };
    print!("{prompt}");
    std::io::stdout()
        .flush()
        .map_err(|e| EvalError::runtime_error("readline", e.to_string()))?;

    let mut line = String::new();
    let n = std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| EvalError::runtime_error("readline", e.to_string()))?;
    if n == 0 {
        return Ok(Value::Nil);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::str(line))
}

/// Milliseconds since the Unix epoch, for timing Lisp code.
#[builtin(name = "time-ms", category = "I/O")]
pub fn time_ms(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity_error("time-ms", "0", args.len()));
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| EvalError::runtime_error("time-ms", e.to_string()))?;
    Ok(Value::Int(now.as_millis() as i64))
}

/// `(help)` prints the quick reference; `(help 'name)` prints one entry.
#[builtin(name = "help", category = "I/O")]
pub fn help(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [] => {
            println!("{}", crate::help::format_quick_reference());
            Ok(Value::Nil)
        }
        [Value::Sym(name)] | [Value::Str(name)] => {
            match crate::help::get_help(name) {
                Some(entry) => println!("{}", crate::help::format_help_entry(&entry)),
                None => println!("No help found for '{name}'"),
            }
            Ok(Value::Nil)
        }
        [other] => Err(EvalError::type_error("help", "Symbol or String", other, 0)),
        _ => Err(EvalError::arity_error("help", "0 or 1", args.len())),
    }
}
