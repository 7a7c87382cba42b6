use std::{cmp::Ordering, rc::Rc};

use crate::{
    ast::{BinaryOperator, Expr},
    error::{EvalError, RuntimeError},
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::{Value, core::Pointer},
    },
    util::num::{arithmetic, compare, f64_to_index, index_to_f64},
};

impl Interpreter {
    /// Evaluates a binary expression.
    ///
    /// `&&`, `||` and `??` evaluate their right operand only when needed;
    /// every other operator evaluates both sides, left first, and goes
    /// through [`Interpreter::apply_binary`].
    pub(crate) fn eval_binary(&mut self,
                              left: &Expr,
                              op: BinaryOperator,
                              right: &Expr,
                              scope: &Scope)
                              -> EvalResult<Value> {
        match op {
            BinaryOperator::And => {
                if self.eval(left, scope)?.is_falsey() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(!self.eval(right, scope)?.is_falsey()))
            },
            BinaryOperator::Or => {
                if !self.eval(left, scope)?.is_falsey() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(!self.eval(right, scope)?.is_falsey()))
            },
            BinaryOperator::Nullish => match self.eval(left, scope)? {
                Value::None => self.eval(right, scope),
                value => Ok(value),
            },
            _ => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                self.apply_binary(op, &left, &right)
            },
        }
    }

    /// Applies a strict binary operator to two values.
    ///
    /// - `==` and `!=` compare structurally.
    /// - `..` concatenates the rendered operands.
    /// - `+` also concatenates two strings; the relational operators also
    ///   order strings.
    /// - A pointer plus or minus a number moves the pointer; pointers compare
    ///   by address.
    /// - Everything else needs two numbers.
    ///
    /// # Example
    /// ```
    /// use noktoy::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Interpreter, value::Value},
    /// };
    ///
    /// let interpreter = Interpreter::new();
    /// let sum = interpreter.apply_binary(BinaryOperator::Add, &Value::from(2.0), &Value::from(3.0));
    /// assert_eq!(sum.unwrap(), Value::from(5.0));
    ///
    /// let text = interpreter.apply_binary(BinaryOperator::Concat, &Value::from("n = "), &Value::from(1.0));
    /// assert_eq!(text.unwrap(), Value::from("n = 1"));
    /// ```
    pub fn apply_binary(&self, op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
        use BinaryOperator::{Add, Concat, Equal, NotEqual, Sub};

        match (op, left, right) {
            (Equal, ..) => Ok(Value::Bool(left == right)),
            (NotEqual, ..) => Ok(Value::Bool(left != right)),
            (Concat, ..) => Ok(Value::String(self.render(left) + &self.render(right))),
            (_, Value::Number(a), Value::Number(b)) => {
                if let Some(result) = arithmetic(op, *a, *b) {
                    return Ok(Value::Number(result));
                }
                compare(op, *a, *b).map(Value::Bool)
                                   .ok_or_else(|| Self::unsupported(op, left, right))
            },
            (Add, Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            (_, Value::String(a), Value::String(b)) => {
                compare_ordering(op, a.cmp(b)).map(Value::Bool)
                                              .ok_or_else(|| Self::unsupported(op, left, right))
            },
            (Add | Sub, Value::Pointer(pointer), Value::Number(offset)) => {
                let base = index_to_f64(pointer.index);
                let moved = if op == Add { base + offset } else { base - offset };
                let index = f64_to_index(moved).ok_or(RuntimeError::PointerOutOfRange { index: moved })?;
                Ok(Value::Pointer(Rc::new(Pointer::new(index))))
            },
            (_, Value::Pointer(a), Value::Pointer(b)) => {
                compare_ordering(op, a.index.cmp(&b.index)).map(Value::Bool)
                                                           .ok_or_else(|| Self::unsupported(op, left, right))
            },
            _ => Err(Self::unsupported(op, left, right)),
        }
    }

    fn unsupported(op: BinaryOperator, left: &Value, right: &Value) -> EvalError {
        RuntimeError::type_error(format!("cannot apply '{op}' to {} and {}", left.kind_name(), right.kind_name())).into()
    }
}

fn compare_ordering(op: BinaryOperator, ordering: Ordering) -> Option<bool> {
    let result = match op {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEqual => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEqual => ordering.is_ge(),
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pointer_arithmetic_moves_the_address() {
        let interpreter = Interpreter::new();
        let pointer = Value::Pointer(Rc::new(Pointer::new(2)));
        let moved = interpreter.apply_binary(BinaryOperator::Add, &pointer, &Value::from(3.0))
                               .expect("pointer add failed");
        assert_eq!(moved, Value::Pointer(Rc::new(Pointer::new(5))));
        assert!(interpreter.apply_binary(BinaryOperator::Sub, &pointer, &Value::from(3.0))
                           .is_err());
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let interpreter = Interpreter::new();
        let err = interpreter.apply_binary(BinaryOperator::Mul, &Value::from("a"), &Value::from(2.0))
                             .expect_err("string times number should fail");
        assert_eq!(err.to_string(), "cannot apply '*' to String and Number");
    }

    #[test]
    fn strings_order_lexicographically() {
        let interpreter = Interpreter::new();
        let less = interpreter.apply_binary(BinaryOperator::Less, &Value::from("abc"), &Value::from("abd"));
        assert_eq!(less.expect("comparison failed"), Value::Bool(true));
    }
}
