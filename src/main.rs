// ABOUTME: CLI entry point and REPL for the Lisp interpreter

use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

use mal_rs::bootstrap;
use mal_rs::config;
use mal_rs::env::Environment;
use mal_rs::eval;
use mal_rs::highlighter::LispHelper;
use mal_rs::printer;
use mal_rs::reader;
use mal_rs::value::Value;

/// A Mal-family Lisp interpreter with TCO, macros, and persistent data structures.
#[derive(Parser, Debug)]
#[command(name = "mal-rs", version = config::VERSION)]
struct CliArgs {
    /// Script to run; omitted for an interactive REPL.
    script: Option<PathBuf>,

    /// Arguments passed to the script, bound to `*ARGV*`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Skip loading the bootstrap forms (`not`, `load-file`, `cond`, `or`).
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn run_script(path: &PathBuf, env: &Rc<Environment>) -> ! {
    let form = Value::list(vec![
        Value::sym("load-file"),
        Value::str(path.to_string_lossy().into_owned()),
    ]);
    match eval::eval(form, env.clone()) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run_repl(env: &Rc<Environment>) {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);
    println!("{}", config::HELP_TEXT);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(rl_config).expect("failed to initialize line editor");
    rl.set_helper(Some(LispHelper::new()));
    if rl.load_history(config::HISTORY_FILE).is_err() {
        tracing::debug!("no existing history at {}", config::HISTORY_FILE);
    }

    loop {
        match rl.readline("user> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(quit)" || trimmed == "(exit)" {
                    break;
                }

                match reader::read(&line) {
                    Ok(Some(form)) => match eval::eval(form, env.clone()) {
                        Ok(value) => println!("{}", printer::print(&value, true)),
                        Err(e) => println!("{e}"),
                    },
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("readline error: {e}");
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(config::HISTORY_FILE) {
        tracing::warn!("failed to save history: {e}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();

    let env = eval::make_core_env();
    eval::bind_eval_builtin(&env);

    if !args.no_stdlib {
        bootstrap::load(&env);
    }

    let argv = Value::list(args.args.iter().cloned().map(Value::str).collect());
    env.define("*ARGV*".to_string(), argv);
    env.define("*host-language*".to_string(), Value::str("rust"));

    match args.script {
        Some(path) => run_script(&path, &env),
        None => run_repl(&env),
    }
}
