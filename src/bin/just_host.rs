//! CLI wrapper for the just script engine bridge.
//!
//! Usage:
//!   just-host <file.js>                     # Execute a script file
//!   just-host -e "code"                     # Evaluate code
//!   just-host -e "code" --set x=1           # Bind host values first
//!   just-host <file.js> --call main 1 2     # Call main(1, 2) after evaluating
//!   just-host                               # Start REPL (interactive mode)

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Once;

use clap::Parser;
use just_host::{EngineConfig, JsNumberType, JsValue, ScopeLevel, ScriptEngine};

static TRACING_INIT: Once = Once::new();

/// Installs a tracing subscriber, but only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[derive(Debug, Parser)]
#[command(name = "just-host", about = "Evaluates just scripts through the host bridge.", version)]
struct Args {
    /// Script file to execute.
    file: Option<PathBuf>,

    /// Evaluate the given code instead of a file.
    #[arg(short = 'e', long = "eval", conflicts_with = "file")]
    eval: Option<String>,

    /// Bind a host value before evaluating, as name=value. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// After evaluating, call a top-level function: the function name followed by its
    /// arguments.
    #[arg(long = "call", num_args = 1.., value_name = "FUNCTION [ARG]")]
    call: Vec<String>,

    /// Engine configuration file (TOML).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Print the engine bindings after evaluating.
    #[arg(long = "dump-bindings")]
    dump_bindings: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    let engine = ScriptEngine::with_config(config);

    for binding in &args.set {
        match binding.split_once('=') {
            Some((name, value)) => engine.put(name.trim(), parse_host_value(value)),
            None => {
                eprintln!("Error: --set expects NAME=VALUE, got '{}'", binding);
                process::exit(1);
            }
        }
    }

    let source = match (&args.eval, &args.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        (None, None) => {
            run_repl(&engine);
            return;
        }
    };

    let result = match engine.evaluate(&source) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match args.call.split_first() {
        Some((name, rest)) => {
            let call_args = rest.iter().map(|a| parse_host_value(a)).collect();
            match engine.invoke_function(name, call_args) {
                Ok(value) => print_value(&value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
        None if args.eval.is_some() => print_value(&result),
        None => {}
    }

    if args.dump_bindings {
        if let Some(bindings) = engine.bindings(ScopeLevel::Engine) {
            for (name, value) in bindings.entries() {
                println!("{} = {}", name, value);
            }
        }
    }
}

/// Numbers, booleans, `null` and `undefined` are recognised; anything else is a string.
fn parse_host_value(text: &str) -> JsValue {
    match text {
        "true" => JsValue::Boolean(true),
        "false" => JsValue::Boolean(false),
        "null" => JsValue::Null,
        "undefined" => JsValue::Undefined,
        "" => JsValue::from(""),
        _ => match JsNumberType::parse(text) {
            JsNumberType::NaN => JsValue::from(text),
            n => JsValue::Number(n),
        },
    }
}

fn print_value(value: &JsValue) {
    if !matches!(value, JsValue::Undefined) {
        println!("{}", value);
    }
}

fn run_repl(engine: &ScriptEngine) {
    println!("just-host v{} - just script engine", env!("CARGO_PKG_VERSION"));
    println!("Type code and press Enter. Type .exit to quit, .vars to list bindings.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let input = match lines.next() {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let input = input.trim();

        match input {
            "" => continue,
            ".exit" | ".quit" => break,
            ".vars" => {
                if let Some(bindings) = engine.bindings(ScopeLevel::Engine) {
                    for (name, value) in bindings.entries() {
                        println!("{} = {}", name, value);
                    }
                }
                continue;
            }
            _ => {}
        }

        // Each line is its own program; top-level variables carry over through the
        // engine bindings.
        match engine.evaluate(input) {
            Ok(value) => print_value(&value),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
