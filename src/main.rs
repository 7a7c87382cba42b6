use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use noktoy::{Interpreter, Options, interpreter::evaluator::core::MAX_CALL_DEPTH};
use tracing_subscriber::{EnvFilter, fmt};

/// noktoy is a small scripting language with structural run-time types,
/// pointers, structs and tags.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Stop any program that runs more than this many loop iterations.
    #[arg(long)]
    iteration_limit: Option<u64>,

    /// How deeply function calls may nest.
    #[arg(long, default_value_t = MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// The script to run. Without one, noktoy reads programs line by line
    /// from standard input.
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    // RUST_LOG controls the log level, warnings by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter)
         .with_writer(io::stderr)
         .with_target(false)
         .init();

    let options = Options { iteration_limit: args.iteration_limit,
                            max_call_depth: args.max_call_depth,
                            ..Options::default() };

    match args.file {
        Some(path) => run_file(&path, options),
        None => repl(options),
    }
}

fn run_file(path: &Path, options: Options) {
    let script = fs::read_to_string(path).unwrap_or_else(|_| {
                                             eprintln!("Failed to read the input file '{}'. Perhaps this file does not \
                                                        exist?",
                                                       path.display());
                                             process::exit(1);
                                         });

    let mut interpreter = Interpreter::with_options(options).with_file(&path.to_string_lossy());
    if let Err(e) = interpreter.eval_source(&script) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn repl(options: Options) {
    let mut interpreter = Interpreter::with_options(options);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => {
                eprintln!("Failed to read from standard input: {e}");
                process::exit(1);
            },
        }

        match interpreter.eval_source(&line) {
            Ok(value) => println!("Exited with {}", interpreter.render(&value)),
            Err(e) => println!("{e}"),
        }
    }
}
