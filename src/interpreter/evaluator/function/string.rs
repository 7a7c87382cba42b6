use crate::{
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            function::prelude::argument_error,
        },
        scope::Scope,
        value::Value,
    },
    util::num::index_to_f64,
};

/// Renders any value to a string.
pub fn tostring(arguments: &[Value], _: &Scope, interpreter: &mut Interpreter) -> EvalResult<Value> {
    Ok(Value::String(interpreter.render(&arguments[0])))
}

/// Parses a string as a number. Strings that are not numbers give `none`;
/// numbers are returned unchanged.
pub fn tonumber(arguments: &[Value], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    match &arguments[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(text) => Ok(text.trim().parse::<f64>().map_or(Value::None, Value::Number)),
        other => Err(argument_error("Std::String::tonumber",
                                    format!("expected a string, got {}", other.kind_name()))),
    }
}

/// The number of characters of a string.
pub fn len(arguments: &[Value], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    match &arguments[0] {
        Value::String(text) => Ok(Value::Number(index_to_f64(text.chars().count()))),
        other => Err(argument_error("Std::String::len", format!("expected a string, got {}", other.kind_name()))),
    }
}
