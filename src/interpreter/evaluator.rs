/// Assignment to variables, pointers and members.
///
/// Checks every write against the binding's declared type or the
/// container's stamp.
pub mod assign;
/// Binary operator evaluation logic.
///
/// Handles short-circuiting logic, structural equality, string
/// concatenation, pointer arithmetic and numeric operators.
pub mod binary;
/// Conditionals, `whl` loops, `cat` handlers and `mat` expressions.
pub mod control;
/// Core evaluation logic and interpreter state.
///
/// Contains the `Interpreter`, its options, statement execution with the
/// control-flow flags, and the expression dispatch.
pub mod core;
/// Struct and tag declarations.
pub mod declaration;
/// Evaluation of `for` loops over arrays and objects.
///
/// Binds the index or key and the element in a fresh scope per iteration and
/// honours assignments to the index.
pub mod for_loop;
/// Function evaluation.
///
/// Handles closures, methods, natives and macros, and the native prelude.
pub mod function;
/// Field, index and namespace access, and record and struct literals.
pub mod member;
/// `use` statements and `ext` inclusion of other files.
pub mod module;
/// The structural type check.
///
/// Decides whether a value satisfies a type and stamps containers with the
/// first type they pass.
pub mod satisfies;
/// Unary operator evaluation logic.
///
/// Implements negation, logical not, dereference and address-of, including
/// the pointer arena and its literal cache.
pub mod unary;
