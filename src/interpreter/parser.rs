/// Core parsing entry points.
///
/// Contains the token stream with its mode flags, the program and expression
/// entry points, and the `if` and `mat` expressions.
pub mod core;

/// Prefix operators, calls, member access and primary expressions.
pub mod unary;

/// Binary operator precedence levels, from `cat` and assignment down to `^`.
pub mod binary;

/// Brace-delimited statement blocks.
pub mod block;

/// Statements and declarations: variables, functions, structs, tags, `use`
/// and loops.
pub mod statement;

/// The type annotation grammar.
pub mod types;

/// Constant folding of arithmetic on number literals.
pub mod fold;

/// Small helpers shared by the parsing functions.
pub mod utils;
