use crate::{
    ast::{Expr, Member, UnaryOperator},
    error::{EvalError, RuntimeError},
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        types::Type,
        value::Value,
    },
};

impl Interpreter {
    /// Evaluates `target = value` and returns the assigned value.
    ///
    /// Targets are variables, dereferences, and member accesses on arrays,
    /// objects, struct instances and struct statics. `a::b` is never a target.
    /// Every target checks the new value against the type it was declared
    /// or stamped with.
    pub(crate) fn eval_assign(&mut self, target: &Expr, value: &Expr, scope: &Scope) -> EvalResult<Value> {
        match target {
            Expr::Variable { name, .. } => {
                let value = self.eval(value, scope)?;
                let binding = scope.lookup(name)
                                   .ok_or_else(|| RuntimeError::UnknownVariable { name: name.clone() })?;
                let (mutable, ty) = {
                    let variable = binding.borrow();
                    (variable.mutable, variable.ty.clone())
                };
                if !mutable {
                    return Err(RuntimeError::ImmutableAssignment { name: name.clone() }.into());
                }
                if !self.satisfies(&value, &ty, scope) {
                    return Err(RuntimeError::AssignmentTypeMismatch { name:     name.clone(),
                                                                      value:    self.render(&value),
                                                                      expected: ty.to_string(), }.into());
                }
                binding.borrow_mut().value = value.clone();
                Ok(value)
            },
            Expr::UnaryOp { op: UnaryOperator::Deref,
                            expr,
                            .. } => {
                let pointer = self.eval(expr, scope)?;
                let value = self.eval(value, scope)?;
                self.store_through(&pointer, value.clone(), scope)?;
                Ok(value)
            },
            Expr::Member { object, member, .. } => {
                let object = self.eval(object, scope)?;
                let key = match member {
                    Member::Field(name) => Value::from(name.as_str()),
                    Member::Computed(key) => self.eval(key, scope)?,
                    Member::Namespace(_) => return Err(RuntimeError::NamespaceAssignment.into()),
                    Member::CallSelf(_) => return Err(RuntimeError::InvalidAssignmentTarget.into()),
                };
                let value = self.eval(value, scope)?;
                self.assign_member(&object, key, value.clone(), scope)?;
                Ok(value)
            },
            _ => Err(RuntimeError::InvalidAssignmentTarget.into()),
        }
    }

    fn assign_member(&mut self, object: &Value, key: Value, value: Value, scope: &Scope) -> EvalResult<()> {
        match object {
            Value::Array(array) => {
                let index = self.number_index(&key)?
                                .ok_or_else(|| RuntimeError::type_error(format!("invalid array index {key}")))?;
                let stamp = array.borrow().stamp.clone();
                let expected = match &stamp {
                    Some(Type::Array(element)) => Some(element.as_ref()),
                    Some(Type::Tuple(members)) => {
                        Some(members.get(index).ok_or_else(|| {
                                                   RuntimeError::type_error(format!("index {index} is outside the \
                                                                                     tuple {}",
                                                                                    Type::Tuple(members.clone())))
                                               })?)
                    },
                    _ => None,
                };
                if let Some(expected) = expected
                   && !self.satisfies(&value, expected, scope)
                {
                    return Err(self.element_mismatch(expected, &value));
                }
                let mut array = array.borrow_mut();
                let len = array.items.len();
                match array.items.get_mut(index) {
                    Some(slot) => *slot = value,
                    None if index == len => array.items.push(value),
                    None => {
                        return Err(RuntimeError::IndexOutOfRange { index: key.to_string(),
                                                                   len }.into());
                    },
                }
                Ok(())
            },
            Value::Object(object) => {
                let stamp = object.borrow().stamp.clone();
                if let Some(Type::LooseRecord(key_type, value_type)) = &stamp {
                    if !self.satisfies(&key, key_type, scope) {
                        return Err(self.element_mismatch(key_type, &key));
                    }
                    if !self.satisfies(&value, value_type, scope) {
                        return Err(self.element_mismatch(value_type, &value));
                    }
                }
                object.borrow_mut().insert(key, value);
                Ok(())
            },
            Value::Struct(instance) => {
                let owner = instance.borrow().parent.name.clone();
                let field = field_key(&key, &owner)?;
                let Some(ty) = instance.borrow().parent.fields.get(&field).cloned() else {
                    return Err(RuntimeError::UnknownField { owner, field }.into());
                };
                if !self.satisfies(&value, &ty, scope) {
                    return Err(RuntimeError::FieldTypeMismatch { field,
                                                                 expected: ty.to_string(),
                                                                 value: self.render(&value) }.into());
                }
                instance.borrow_mut().fields.insert(field, value);
                Ok(())
            },
            Value::StaticStruct(strukt) => {
                let field = field_key(&key, &strukt.name)?;
                let Some(ty) = strukt.static_fields.borrow().get(&field).map(|(ty, _)| ty.clone()) else {
                    return Err(RuntimeError::UnknownField { owner: strukt.name.clone(),
                                                            field }.into());
                };
                if !self.satisfies(&value, &ty, scope) {
                    return Err(RuntimeError::FieldTypeMismatch { field,
                                                                 expected: ty.to_string(),
                                                                 value: self.render(&value) }.into());
                }
                strukt.static_fields.borrow_mut().insert(field, (ty, value));
                Ok(())
            },
            other => Err(RuntimeError::type_error(format!("cannot assign into {}", other.kind_name())).into()),
        }
    }

    fn element_mismatch(&self, expected: &Type, value: &Value) -> EvalError {
        RuntimeError::type_error(format!("{} does not satisfy the stamped type {expected}", self.render(value))).into()
    }
}

fn field_key(key: &Value, owner: &str) -> EvalResult<String> {
    match key {
        Value::String(name) => Ok(name.clone()),
        other => Err(RuntimeError::UnknownField { owner: owner.to_string(),
                                                  field: other.to_string(), }.into()),
    }
}
