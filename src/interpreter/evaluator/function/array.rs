use std::{cell::RefCell, rc::Rc};

use crate::{
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            function::prelude::argument_error,
        },
        scope::Scope,
        types::Type,
        value::{Value, core::ArrayValue},
    },
    util::num::index_to_f64,
};

fn expect_array<'a>(name: &str, value: &'a Value) -> EvalResult<&'a Rc<RefCell<ArrayValue>>> {
    match value {
        Value::Array(array) => Ok(array),
        other => Err(argument_error(name, format!("expected an array, got {}", other.kind_name()))),
    }
}

/// The number of elements of an array.
pub fn len(arguments: &[Value], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    let array = expect_array("Std::Array::len", &arguments[0])?;
    Ok(Value::Number(index_to_f64(array.borrow().items.len())))
}

/// Appends a value and returns the new length.
///
/// An array stamped `T[]` only accepts values satisfying `T`; a tuple keeps
/// its length.
pub fn push(arguments: &[Value], scope: &Scope, interpreter: &mut Interpreter) -> EvalResult<Value> {
    const NAME: &str = "Std::Array::push";
    let array = expect_array(NAME, &arguments[0])?;
    let value = &arguments[1];
    let stamp = array.borrow().stamp.clone();
    match &stamp {
        Some(Type::Array(element)) if !interpreter.satisfies(value, element, scope) => {
            return Err(argument_error(NAME,
                                      format!("{} does not satisfy the array type {}",
                                              interpreter.render(value),
                                              Type::Array(element.clone()))));
        },
        Some(ty @ Type::Tuple(_)) => {
            return Err(argument_error(NAME, format!("cannot grow a tuple {ty}")));
        },
        _ => {},
    }
    let mut array = array.borrow_mut();
    array.items.push(value.clone());
    Ok(Value::Number(index_to_f64(array.items.len())))
}

/// Removes and returns the last element, or `none` for an empty array.
pub fn pop(arguments: &[Value], _: &Scope, _: &mut Interpreter) -> EvalResult<Value> {
    const NAME: &str = "Std::Array::pop";
    let array = expect_array(NAME, &arguments[0])?;
    if let Some(ty @ Type::Tuple(_)) = &array.borrow().stamp {
        return Err(argument_error(NAME, format!("cannot shrink a tuple {ty}")));
    }
    Ok(array.borrow_mut().items.pop().unwrap_or(Value::None))
}
