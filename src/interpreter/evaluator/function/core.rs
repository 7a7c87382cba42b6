use std::rc::Rc;

use crate::{
    ast::{Expr, Member},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::{Scope, Variable},
        value::{
            Value,
            entity::{StaticTag, TagInstance},
            function::{Function, NativeFunction, NativeMacro},
        },
    },
};

impl Interpreter {
    /// Evaluates a call expression.
    ///
    /// Three callee shapes get special treatment before the callee is
    /// evaluated as an ordinary value:
    /// - `receiver:method(args)` looks the method up on the receiver and
    ///   passes the receiver as the first argument.
    /// - `Tag::Variant(value)` constructs a payload variant.
    /// - A native macro receives the argument expressions unevaluated.
    pub(crate) fn eval_call(&mut self, callee: &Expr, arguments: &[Expr], scope: &Scope) -> EvalResult<Value> {
        match callee {
            Expr::Member { object,
                           member: Member::CallSelf(name),
                           .. } => {
                let receiver = self.eval(object, scope)?;
                let method = match &receiver {
                    Value::Struct(instance) => instance.borrow().parent.method(name),
                    Value::StaticStruct(strukt) => strukt.static_methods.get(name).cloned(),
                    _ => None,
                };
                let Some(method) = method else {
                    return Err(RuntimeError::UnknownMethod { receiver: self.render(&receiver),
                                                             name:     name.clone(), }.into());
                };
                let mut values = vec![receiver];
                values.extend(self.eval_arguments(arguments, scope)?);
                self.call_value(&method, &values, scope)
            },
            Expr::Member { object,
                           member: Member::Namespace(name),
                           .. } => {
                let object = self.eval(object, scope)?;
                if let Value::StaticTag(tag) = &object {
                    return self.construct_variant(tag, name, arguments, scope);
                }
                let callee = self.namespace_member(&object, name)?;
                self.call_with(&callee, arguments, scope)
            },
            _ => {
                let callee = self.eval(callee, scope)?;
                self.call_with(&callee, arguments, scope)
            },
        }
    }

    fn eval_arguments(&mut self, arguments: &[Expr], scope: &Scope) -> EvalResult<Vec<Value>> {
        arguments.iter().map(|argument| self.eval(argument, scope)).collect()
    }

    fn call_with(&mut self, callee: &Value, arguments: &[Expr], scope: &Scope) -> EvalResult<Value> {
        if let Value::NativeMacro(native) = callee {
            return (native.func)(arguments, scope, self);
        }
        let values = self.eval_arguments(arguments, scope)?;
        self.call_value(callee, &values, scope)
    }

    /// Calls a function or native with evaluated arguments.
    ///
    /// `scope` is the caller's scope, handed to natives.
    pub fn call_value(&mut self, callee: &Value, arguments: &[Value], scope: &Scope) -> EvalResult<Value> {
        match callee {
            Value::Fun(fun) => self.run_fun(fun, arguments),
            Value::Native(native) => (native.func)(arguments, scope, self),
            other => Err(RuntimeError::NotCallable { value: self.render(other) }.into()),
        }
    }

    /// Invokes a closure.
    ///
    /// Parameters are bound in a child of the captured scope after checking
    /// their types, and the body runs in a block below them. The returned
    /// value must satisfy the declared return type.
    pub(crate) fn run_fun(&mut self, fun: &Rc<Function>, arguments: &[Value]) -> EvalResult<Value> {
        tracing::trace!(function = fun.name(), arguments = arguments.len(), "calling function");
        let parameters = fun.scope.child();
        self.bind_parameters(fun, arguments, &parameters)?;

        let (value, last_line) = self.run_body(fun, &parameters.child())?;
        self.check_return(fun, value, last_line)
    }

    /// Invokes a closure with its parameters bound directly in `scope`, which
    /// also holds the locals of the body.
    ///
    /// Hosts use this to run a function against a scope they prepared and
    /// inspect afterwards.
    pub fn call_raw(&mut self, fun: &Value, arguments: &[Value], scope: &Scope) -> EvalResult<Value> {
        let Value::Fun(fun) = fun else {
            return Err(RuntimeError::NotCallable { value: self.render(fun) }.into());
        };
        self.bind_parameters(fun, arguments, scope)?;
        let (value, last_line) = self.run_body(fun, scope)?;
        self.check_return(fun, value, last_line)
    }

    /// Runs a function body as its own frame: `brk` and `cnt` cannot reach
    /// loops outside it, and `ret` stops here.
    ///
    /// # Errors
    /// `RuntimeError::StackOverflow` when `Options::max_call_depth` functions
    /// are already running.
    fn run_body(&mut self, fun: &Function, scope: &Scope) -> EvalResult<(Value, usize)> {
        let limit = self.options.max_call_depth;
        if self.call_depth >= limit {
            return Err(RuntimeError::StackOverflow { depth: limit }.into());
        }
        self.call_depth += 1;
        let caller_file = std::mem::replace(&mut self.current_file, Rc::clone(&fun.file));
        self.loop_markers.push(false);
        let result = self.run_statements(&fun.def.body, scope);
        self.loop_markers.pop();
        self.current_file = caller_file;
        self.call_depth -= 1;
        self.exit = false;
        result
    }

    fn bind_parameters(&self, fun: &Function, arguments: &[Value], scope: &Scope) -> EvalResult<()> {
        let signature = &fun.def.signature;
        let accepted = arguments.len() == signature.params.len()
                       && signature.params
                                   .iter()
                                   .zip(arguments)
                                   .all(|(param, argument)| self.satisfies(argument, &param.ty, scope));
        if !accepted {
            let rendered = arguments.iter().map(|argument| self.render(argument)).collect::<Vec<_>>();
            return Err(RuntimeError::SignatureMismatch { signature: signature.to_string(),
                                                         arguments: rendered.join(", "), }.into());
        }
        for (param, argument) in signature.params.iter().zip(arguments) {
            scope.define(param.name.as_str(),
                         Variable { mutable: param.mutable,
                                    ty:      param.ty.clone(),
                                    value:   argument.clone(), });
        }
        Ok(())
    }

    fn check_return(&self, fun: &Function, value: Value, line: usize) -> EvalResult<Value> {
        let expected = &fun.def.signature.ret;
        if self.satisfies(&value, expected, &fun.scope) {
            Ok(value)
        } else {
            Err(RuntimeError::ReturnTypeMismatch { value: self.render(&value),
                                                   expected: expected.to_string(),
                                                   line }.into())
        }
    }

    /// Builds `Tag::Variant(payload)`.
    fn construct_variant(&mut self,
                         tag: &Rc<StaticTag>,
                         variant: &str,
                         arguments: &[Expr],
                         scope: &Scope)
                         -> EvalResult<Value> {
        let Some(ty) = tag.payload.get(variant) else {
            return Err(RuntimeError::UnknownPayloadVariant { tag:     tag.name.clone(),
                                                             variant: variant.to_string(), }.into());
        };
        let [argument] = arguments else {
            return Err(RuntimeError::PayloadArity { variant: variant.to_string(),
                                                    found:   arguments.len(), }.into());
        };
        let payload = self.eval(argument, scope)?;
        if !self.satisfies(&payload, ty, scope) {
            return Err(RuntimeError::PayloadTypeMismatch { variant:  variant.to_string(),
                                                           expected: ty.to_string(),
                                                           value:    self.render(&payload), }.into());
        }
        Ok(Value::Tag(Rc::new(TagInstance { parent:  Rc::clone(tag),
                                            variant: variant.to_string(),
                                            payload: Some(payload), })))
    }

    /// Registers a native function as a global.
    ///
    /// The native validates its own arguments.
    ///
    /// # Example
    /// ```
    /// use noktoy::interpreter::{evaluator::core::Interpreter, value::Value};
    ///
    /// let mut interpreter = Interpreter::new();
    /// interpreter.define_native("double", |args, _, _| match args {
    ///                [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
    ///                _ => Ok(Value::None),
    ///            });
    /// assert_eq!(interpreter.eval_source("double(21)").unwrap(), Value::from(42.0));
    /// ```
    pub fn define_native<F>(&self, name: &str, func: F)
        where F: Fn(&[Value], &Scope, &mut Self) -> EvalResult<Value> + 'static
    {
        let native = NativeFunction { name: name.to_string(),
                                      func: Rc::new(func), };
        self.globals.define(name, Variable::constant(Value::Native(Rc::new(native))));
    }

    /// Registers a native macro as a global. Macros receive their argument
    /// expressions unevaluated.
    pub fn define_macro<F>(&self, name: &str, func: F)
        where F: Fn(&[Expr], &Scope, &mut Self) -> EvalResult<Value> + 'static
    {
        let native = NativeMacro { name: name.to_string(),
                                   func: Rc::new(func), };
        self.globals.define(name, Variable::constant(Value::NativeMacro(Rc::new(native))));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::EvalError,
        interpreter::{evaluator::core::Options, parser::core::parse_source},
    };

    fn run(interpreter: &mut Interpreter, source: &str) -> EvalResult<Value> {
        let program = parse_source(source).expect("parse failed");
        interpreter.run_program(&program)
    }

    #[test]
    fn raw_calls_bind_into_the_given_scope() {
        let mut interpreter = Interpreter::new();
        let fun = run(&mut interpreter, "fun shift(x: Number) Number {\n  let doubled = x * 2\n  ret doubled + 1\n}\nshift")
            .expect("definition failed");
        let scope = interpreter.globals().child();

        let value = interpreter.call_raw(&fun, &[Value::from(4.0)], &scope).expect("raw call failed");
        assert_eq!(value, Value::from(9.0));

        let read = |name: &str| scope.get_own(name).map(|binding| binding.borrow().value.clone());
        assert_eq!(read("x"), Some(Value::from(4.0)));
        assert_eq!(read("doubled"), Some(Value::from(8.0)));
    }

    #[test]
    fn raw_calls_check_signature_and_return_type() {
        let mut interpreter = Interpreter::new();
        let fun = run(&mut interpreter, "fun label(x) String { ret x }\nlabel").expect("definition failed");

        let scope = interpreter.globals().child();

        let err = interpreter.call_raw(&fun, &[Value::from(1.0)], &scope)
                             .expect_err("return type was not checked");
        assert!(matches!(err, EvalError::Host(RuntimeError::ReturnTypeMismatch { .. })), "{err}");

        let err = interpreter.call_raw(&fun, &[], &scope).expect_err("arity was not checked");
        assert!(matches!(err, EvalError::Host(RuntimeError::SignatureMismatch { .. })), "{err}");

        let err = interpreter.call_raw(&Value::from(1.0), &[], &scope).expect_err("called a number");
        assert!(matches!(err, EvalError::Host(RuntimeError::NotCallable { .. })), "{err}");
    }

    #[test]
    fn call_depth_is_bounded() {
        let options = Options { max_call_depth: 20,
                                ..Options::default() };
        let mut interpreter = Interpreter::with_options(options);
        let down = "fun down(n) {\n  if n == 0 { ret 0 }\n  ret down(n - 1)\n}\n";

        let value = run(&mut interpreter, &format!("{down}down(19)")).expect("twenty nested calls failed");
        assert_eq!(value, Value::from(0.0));

        let mut interpreter = Interpreter::with_options(Options { max_call_depth: 20,
                                                                  ..Options::default() });
        let err = run(&mut interpreter, &format!("{down}down(20)")).expect_err("call depth was not bounded");
        let EvalError::Host(host) = err else { panic!("expected a host error") };
        assert!(matches!(host.root(), RuntimeError::StackOverflow { depth: 20 }));
        assert_eq!(interpreter.call_depth, 0);
    }
}
