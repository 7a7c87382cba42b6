use std::io::Write;

use crate::interpreter::{
    evaluator::core::{EvalResult, Interpreter},
    scope::Scope,
    value::Value,
};

fn joined(arguments: &[Value], interpreter: &Interpreter) -> String {
    arguments.iter().map(|argument| interpreter.render(argument)).collect()
}

/// Writes the rendered arguments to standard output without separators or
/// a trailing newline.
pub fn print(arguments: &[Value], _: &Scope, interpreter: &mut Interpreter) -> EvalResult<Value> {
    let mut stdout = std::io::stdout().lock();
    // A closed stdout is not a script error.
    let _ = write!(stdout, "{}", joined(arguments, interpreter));
    let _ = stdout.flush();
    Ok(Value::None)
}

/// Like [`print`], followed by a newline.
pub fn println(arguments: &[Value], _: &Scope, interpreter: &mut Interpreter) -> EvalResult<Value> {
    println!("{}", joined(arguments, interpreter));
    Ok(Value::None)
}
