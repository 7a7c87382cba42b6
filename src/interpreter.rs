/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST against a chain of scopes, evaluates
/// expressions and statements, manages closures, the pointer arena and the
/// control-flow flags, and checks values against their declared types.
///
/// # Responsibilities
/// - Evaluates AST nodes, performing all supported operations.
/// - Handles variables, functions, structs, tags and control flow.
/// - Reports host errors and propagates raised exception values.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer (tokenizer) reads the raw source text and produces a stream of
/// tokens, each corresponding to meaningful language elements such as numbers,
/// strings, identifiers, operators, delimiters, and keywords. This is the first
/// stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with their source line.
/// - Handles numeric and string literals, identifiers, and operators.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// Sources of files included with `ext`.
pub mod loader;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// an AST that represents the syntactic structure of expressions and
/// statements. This enables later phases to analyze and execute user code.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions, statements).
/// - Parses type annotations with their own grammar.
/// - Folds constant arithmetic outside call arguments.
/// - Validates correct grammar and syntax, reporting errors with location info.
pub mod parser;
/// Lexical scopes and variable bindings.
pub mod scope;
/// Runtime type descriptors.
pub mod types;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares every value a program can produce: numbers, strings,
/// booleans, arrays and objects with their type stamps, closures and natives,
/// pointers, and the declarations and instances of structs and tags.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Defines the structural key used for equality and the literal cache.
/// - Renders values for printing and error messages.
pub mod value;
