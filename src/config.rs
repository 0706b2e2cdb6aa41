// ABOUTME: Configuration and constants for the Lisp interpreter
// This module contains version info, welcome/banner text, and REPL constants

#[allow(dead_code)]
pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Mal-rs Interpreter v1.0";
pub const WELCOME_SUBTITLE: &str = "A Mal-family Lisp interpreter in Rust";

/// History file used by the REPL's line editor, stored alongside the
/// process's working directory rather than the user's home so a sandboxed
/// run never touches anything outside its own tree.
pub const HISTORY_FILE: &str = ".mal-history";

pub const HELP_TEXT: &str = r#"
Available REPL commands:
  (quit) or (exit)     - Exit the REPL
  (help)               - Show a quick reference of all functions
  (help 'name)         - Show detailed help for a function or special form

Type any Lisp expression to evaluate it. Use Ctrl-D to exit.
"#;
