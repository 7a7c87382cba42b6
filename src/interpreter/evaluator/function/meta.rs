use crate::{
    ast::Expr,
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            function::prelude::argument_error,
        },
        scope::Scope,
        value::Value,
    },
};

/// The kind of a value, such as `"Number"` or `"Struct"`.
pub fn type_of(arguments: &[Value], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    Ok(Value::from(arguments[0].kind_name()))
}

/// The syntactic kind of the unevaluated argument, such as `"Binary"` for
/// `kind(1 + 2)`. Call arguments are never folded, so the result reflects
/// the source as written.
pub fn kind(arguments: &[Expr], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    match arguments {
        [expr] => Ok(Value::from(expr.kind_name())),
        _ => Err(argument_error("Std::Meta::kind",
                                format!("expected exactly 1 argument, got {}", arguments.len()))),
    }
}
