//! # noktoy
//!
//! noktoy is a small dynamically typed scripting language written in Rust.
//! Programs are checked against structural type annotations at run time and
//! can use closures, pointers into a per-program arena, structs with methods,
//! tagged unions, namespaces and file inclusion.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed code.
///
/// This module declares the `Expr`, `Statement` and declaration types that
/// represent the syntactic structure of source code as a tree. The AST is
/// built by the parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression, statement and type annotation nodes for all language
///   constructs.
/// - Attaches source lines to statements for error reporting.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing, or
/// evaluating code. It separates host failures, which always end the program,
/// from values raised by scripts with `err`, which `cat` can handle.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and included file names for context.
/// - Renders the `EXCEPTION:` and `RUNTIME EXCEPTION:` reports.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, scopes and runtime types to provide a complete runtime
/// for noktoy programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// # Responsibilities
/// - Safely convert between numbers and indices without silent data loss.
/// - Render numbers and apply the arithmetic shared by folding and evaluation.
pub mod util;

pub use crate::{
    error::Error,
    interpreter::{
        evaluator::core::{Interpreter, Options},
        loader::{FsLoader, MemoryLoader, SourceLoader},
        value::Value,
    },
};

/// Runs a whole program in a fresh interpreter and returns the value of its
/// last statement.
///
/// Files included with `ext` are read from disk, relative to the working
/// directory.
///
/// # Errors
/// Returns an error if parsing fails, if a host error occurs during
/// evaluation, or if a value raised with `err` is never caught.
///
/// # Examples
/// ```
/// use noktoy::{Value, run_source};
///
/// let value = run_source("let result = 2 + 2\nresult").unwrap();
/// assert_eq!(value, Value::from(4.0));
///
/// // 'x' is not defined
/// let res = run_source("let y = x + 1");
/// assert!(res.is_err());
/// ```
pub fn run_source(source: &str) -> Result<Value, Error> {
    Interpreter::new().eval_source(source)
}
