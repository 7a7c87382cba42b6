/// The `Std::Array` natives.
///
/// Length, push and pop on arrays. Pushing honours an array's type stamp.
pub mod array;
/// Function calls.
///
/// Evaluates call expressions, method calls and tag variant construction,
/// binds and checks parameters and return values, and registers host natives.
pub mod core;
/// The `Std::Io` natives.
pub mod io;
/// The `Std::Meta` natives and macros.
///
/// Introspection of values and of unevaluated argument syntax.
pub mod meta;
/// The native prelude.
///
/// Declares the table of natives every interpreter starts with and installs
/// them as the `Std` namespace.
pub mod prelude;
/// The `Std::String` natives.
///
/// Conversions between values and strings.
pub mod string;
