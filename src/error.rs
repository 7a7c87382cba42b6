/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code: unknown characters, unterminated strings, unexpected tokens and
/// premature end of input.
pub mod parse_error;
/// Runtime errors.
///
/// Contains the host failures raised during evaluation (type check failures,
/// unknown names, invalid operands, include failures) and the `EvalError`
/// wrapper that also carries script-level exceptions raised with `err`.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::{EvalError, RuntimeError};
use thiserror::Error;

/// Everything that can go wrong while running a program from source.
///
/// Script exceptions are rendered with the interpreter that raised them, so
/// pointers inside the raised value show their pointee.
#[derive(Debug, Error)]
pub enum Error {
    /// The program failed to lex or parse.
    #[error("EXCEPTION: {0}")]
    Parse(#[from] ParseError),
    /// A host error escaped the program.
    #[error("EXCEPTION: {0}")]
    Runtime(#[from] RuntimeError),
    /// A value raised with `err` was never caught.
    #[error("RUNTIME EXCEPTION: {0}")]
    Exception(String),
}
