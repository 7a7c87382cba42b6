use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::{Scope, Variable},
        types::Type,
        value::{
            Value,
            core::{ArrayValue, ObjectValue},
        },
    },
    util::num::{f64_to_index, index_to_f64},
};

impl Interpreter {
    /// Evaluates `for first, second of iterable { body }`.
    ///
    /// Over an array, `first` is the index and `second` the element. The body
    /// may assign to the index: the next iteration then starts from the
    /// assigned index instead of the following one. The array length is read
    /// again before every iteration.
    ///
    /// Over an object, `first` is the key and `second` the value. The entries
    /// are snapshotted before the first iteration.
    ///
    /// Every iteration runs in a fresh child scope of `scope` holding both
    /// bindings. Returns the value of the last iteration's body.
    pub(crate) fn eval_for(&mut self,
                           first: &str,
                           second: &str,
                           iterable: &Expr,
                           body: &[Statement],
                           scope: &Scope)
                           -> EvalResult<Value> {
        let iterable = self.eval(iterable, scope)?;
        self.loop_markers.push(true);
        let result = match &iterable {
            Value::Array(array) => self.iterate_array(array, first, second, body, scope),
            Value::Object(object) => self.iterate_object(object, first, second, body, scope),
            other => Err(RuntimeError::NotIterable { value: self.render(other) }.into()),
        };
        self.loop_markers.pop();
        self.brk = false;
        self.cnt = false;
        result
    }

    fn iterate_array(&mut self,
                     array: &Rc<RefCell<ArrayValue>>,
                     first: &str,
                     second: &str,
                     body: &[Statement],
                     scope: &Scope)
                     -> EvalResult<Value> {
        let element_type = match &array.borrow().stamp {
            Some(Type::Array(element)) => (**element).clone(),
            _ => Type::Any,
        };

        let mut last = Value::None;
        let mut index = 0;
        loop {
            let Some(item) = array.borrow().items.get(index).cloned() else { break };
            self.tick()?;

            let iteration = scope.child();
            let start = index_to_f64(index);
            iteration.define(first,
                             Variable { mutable: true,
                                        ty:      Type::Number(None),
                                        value:   Value::Number(start), });
            iteration.define(second,
                             Variable { mutable: true,
                                        ty:      element_type.clone(),
                                        value:   item, });

            last = self.run_statements(body, &iteration)?.0;
            if self.brk || self.exit {
                break;
            }
            self.cnt = false;

            let assigned = iteration.get_own(first).map(|binding| binding.borrow().value.clone());
            index = match assigned {
                Some(Value::Number(n)) if n != start => match f64_to_index(n) {
                    Some(next) => next,
                    None => break,
                },
                _ => index + 1,
            };
        }
        Ok(last)
    }

    fn iterate_object(&mut self,
                      object: &Rc<RefCell<ObjectValue>>,
                      first: &str,
                      second: &str,
                      body: &[Statement],
                      scope: &Scope)
                      -> EvalResult<Value> {
        let (entries, key_type, value_type) = {
            let object = object.borrow();
            let (key_type, value_type) = match &object.stamp {
                Some(Type::LooseRecord(key, value)) => ((**key).clone(), (**value).clone()),
                _ => (Type::Any, Type::Any),
            };
            (object.entries.values().cloned().collect::<Vec<_>>(), key_type, value_type)
        };

        let mut last = Value::None;
        for (key, value) in entries {
            self.tick()?;
            let iteration = scope.child();
            iteration.define(first,
                             Variable { mutable: true,
                                        ty:      key_type.clone(),
                                        value:   key, });
            iteration.define(second,
                             Variable { mutable: true,
                                        ty: value_type.clone(),
                                        value });

            last = self.run_statements(body, &iteration)?.0;
            if self.brk || self.exit {
                break;
            }
            self.cnt = false;
        }
        Ok(last)
    }
}
