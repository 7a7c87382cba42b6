use std::rc::Rc;

use crate::{
    ast::{Expr, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::{Value, core::Pointer},
    },
    util::num::{f64_to_index, index_to_f64},
};

impl Interpreter {
    /// Evaluates a unary operation.
    ///
    /// - `Negate`: numeric negation.
    /// - `Not`: `true` for falsey operands, `false` otherwise.
    /// - `Deref`: reads through a pointer, a raw arena index or a tag payload.
    /// - `AddressOf`: stores the operand in the arena and returns a pointer to
    ///   it. See [`Interpreter::address_of`].
    pub(crate) fn eval_unary(&mut self, op: UnaryOperator, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        match op {
            UnaryOperator::AddressOf => self.address_of(expr, scope),
            UnaryOperator::Negate => match self.eval(expr, scope)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(RuntimeError::type_error(format!("cannot negate {}", other.kind_name())).into()),
            },
            UnaryOperator::Not => Ok(Value::Bool(self.eval(expr, scope)?.is_falsey())),
            UnaryOperator::Deref => {
                let value = self.eval(expr, scope)?;
                self.deref(&value)
            },
        }
    }

    /// Stores the value of `expr` in the arena.
    ///
    /// Literals (numbers, strings, booleans, `none`, array and record
    /// literals) are deduplicated: structurally equal literals share one slot.
    /// Any other expression gets a fresh slot every time.
    pub fn address_of(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        let literal = matches!(expr,
                               Expr::Literal { .. }
                               | Expr::ArrayLiteral { .. }
                               | Expr::RecordLiteral { name: None, .. });
        let value = self.eval(expr, scope)?;
        if !literal {
            return Ok(self.allocate(value));
        }

        let key = value.key();
        if let Some(&index) = self.literal_cache.get(&key) {
            tracing::trace!(index, "reusing arena slot of literal");
            return Ok(Value::Pointer(Rc::new(Pointer::new(index))));
        }
        let pointer = self.allocate(value);
        if let Value::Pointer(p) = &pointer {
            self.literal_cache.insert(key, p.index);
        }
        Ok(pointer)
    }

    fn allocate(&mut self, value: Value) -> Value {
        let index = self.arena.len();
        self.arena.push(value);
        tracing::trace!(index, "allocated arena slot");
        Value::Pointer(Rc::new(Pointer::new(index)))
    }

    /// Reads the value a pointer refers to. Reads past the end of the arena
    /// yield `none`.
    pub(crate) fn deref(&self, value: &Value) -> EvalResult<Value> {
        let index = match value {
            Value::Pointer(pointer) => Some(pointer.index),
            Value::Number(n) => f64_to_index(*n),
            Value::Tag(tag) => {
                return tag.payload.clone().ok_or_else(|| {
                                              RuntimeError::type_error(format!("cannot dereference {}, it has no payload",
                                                                               self.render(value))).into()
                                          });
            },
            other => {
                return Err(RuntimeError::type_error(format!("cannot dereference {}", other.kind_name())).into());
            },
        };
        Ok(index.and_then(|index| self.arena.get(index)).cloned().unwrap_or(Value::None))
    }

    /// Writes `value` through a pointer or raw arena index.
    ///
    /// A stamped pointer only accepts values satisfying its stamp.
    pub(crate) fn store_through(&mut self, target: &Value, value: Value, scope: &Scope) -> EvalResult<()> {
        let index = match target {
            Value::Pointer(pointer) => {
                let stamp = pointer.stamp.borrow().clone();
                if let Some(stamp) = stamp
                   && !self.satisfies(&value, &stamp, scope)
                {
                    return Err(RuntimeError::PointerTypeMismatch { expected: stamp.to_string(),
                                                                   value:    self.render(&value), }.into());
                }
                pointer.index
            },
            Value::Number(n) => f64_to_index(*n).ok_or(RuntimeError::PointerOutOfRange { index: *n })?,
            other => {
                return Err(RuntimeError::type_error(format!("cannot write through {}", other.kind_name())).into());
            },
        };
        self.write_slot(index, value)
    }

    /// Overwrites an arena slot, or appends when `index` is the arena length.
    ///
    /// A literal cache entry for the old contents of the slot is dropped; a
    /// cache entry for the new contents is moved to this slot.
    fn write_slot(&mut self, index: usize, value: Value) -> EvalResult<()> {
        if index == self.arena.len() {
            self.arena.push(value);
            return Ok(());
        }
        let Some(slot) = self.arena.get_mut(index) else {
            return Err(RuntimeError::PointerOutOfRange { index: index_to_f64(index) }.into());
        };
        let old_key = slot.key();
        *slot = value;
        let new_key = slot.key();

        if self.literal_cache.get(&old_key) == Some(&index) {
            self.literal_cache.remove(&old_key);
        }
        if let Some(cached) = self.literal_cache.get_mut(&new_key) {
            *cached = index;
        }
        Ok(())
    }
}
