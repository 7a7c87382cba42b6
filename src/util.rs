/// Numeric helpers.
///
/// This module converts between numbers and indices without silent data
/// loss, renders numbers the way programs print them, and implements the
/// arithmetic shared by the evaluator and constant folding.
pub mod num;
/// Stack growth for deep recursion.
///
/// The parser, the evaluator and structural keys recurse along the nesting
/// of programs and values; this module keeps that recursion off the end of
/// the thread's stack.
pub mod stack;
