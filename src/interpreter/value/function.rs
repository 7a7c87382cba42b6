use std::{fmt, rc::Rc};

use crate::{
    ast::{Expr, FunctionDef},
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::core::Value,
    },
};

/// A closure: a function definition with the scope it was created in and the
/// file it belongs to.
pub struct Function {
    pub def:   Rc<FunctionDef>,
    pub scope: Scope,
    pub file:  Rc<str>,
}

impl Function {
    pub fn name(&self) -> &str {
        self.def.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
         .field("name", &self.name())
         .field("signature", &self.def.signature.to_string())
         .field("file", &self.file)
         .finish_non_exhaustive()
    }
}

/// The host implementation of a native function. It receives the evaluated
/// arguments and the calling scope, and validates the arguments itself.
pub type NativeFn = Rc<dyn Fn(&[Value], &Scope, &mut Interpreter) -> EvalResult<Value>>;

/// The host implementation of a native macro. It receives the argument
/// expressions unevaluated.
pub type NativeMacroFn = Rc<dyn Fn(&[Expr], &Scope, &mut Interpreter) -> EvalResult<Value>>;

pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

pub struct NativeMacro {
    pub name: String,
    pub func: NativeMacroFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl fmt::Debug for NativeMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeMacro({})", self.name)
    }
}
