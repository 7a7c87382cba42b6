use crate::interpreter::{
    evaluator::core::Interpreter,
    scope::Scope,
    types::{Entity, Type},
    value::Value,
};

impl Interpreter {
    /// Decides whether `value` is structurally compatible with `ty`.
    ///
    /// Arrays, tuples, records and pointers remember the first type they were
    /// validated against. Later checks against an equal type succeed without
    /// looking at the contents again, even when the contents have changed
    /// since.
    ///
    /// `Entity` names are resolved in `scope`.
    pub fn satisfies(&self, value: &Value, ty: &Type, scope: &Scope) -> bool {
        match ty {
            Type::Any => true,
            Type::Number(pin) => match value {
                Value::Number(n) => pin.is_none_or(|pin| pin == *n),
                _ => false,
            },
            Type::String(pin) => match value {
                Value::String(s) => pin.as_ref().is_none_or(|pin| pin == s),
                _ => false,
            },
            Type::Bool(pin) => match value {
                Value::Bool(b) => pin.is_none_or(|pin| pin == *b),
                _ => false,
            },
            Type::None => matches!(value, Value::None),
            Type::Or(left, right) => self.satisfies(value, left, scope) || self.satisfies(value, right, scope),
            Type::Array(element) => {
                let Value::Array(array) = value else { return false };
                if array.borrow().stamp.as_ref() == Some(ty) {
                    return true;
                }
                let items = array.borrow().items.clone();
                if !items.iter().all(|item| self.satisfies(item, element, scope)) {
                    return false;
                }
                array.borrow_mut().stamp.get_or_insert_with(|| ty.clone());
                true
            },
            Type::Tuple(members) => {
                let Value::Array(array) = value else { return false };
                if array.borrow().stamp.as_ref() == Some(ty) {
                    return true;
                }
                let items = array.borrow().items.clone();
                if items.len() != members.len()
                   || !items.iter()
                            .zip(members)
                            .all(|(item, member)| self.satisfies(item, member, scope))
                {
                    return false;
                }
                array.borrow_mut().stamp.get_or_insert_with(|| ty.clone());
                true
            },
            Type::LooseRecord(key_type, value_type) => {
                let Value::Object(object) = value else { return false };
                if object.borrow().stamp.as_ref() == Some(ty) {
                    return true;
                }
                let entries: Vec<(Value, Value)> = object.borrow().entries.values().cloned().collect();
                if !entries.iter().all(|(key, value)| {
                                      self.satisfies(key, key_type, scope) && self.satisfies(value, value_type, scope)
                                  })
                {
                    return false;
                }
                object.borrow_mut().stamp = Some(ty.clone());
                true
            },
            Type::Pointer(inner) => {
                let Value::Pointer(pointer) = value else { return false };
                let Some(pointee) = self.arena.get(pointer.index) else { return false };
                let stamp = pointer.stamp.borrow().clone();
                match stamp {
                    Some(stamp) => stamp == **inner,
                    None => {
                        if !self.satisfies(pointee, inner, scope) {
                            return false;
                        }
                        *pointer.stamp.borrow_mut() = Some((**inner).clone());
                        true
                    },
                }
            },
            Type::Fun(expected) => match value {
                Value::Fun(fun) => {
                    fun.def.signature.ret == expected.ret && fun.def.signature.params.len() == expected.params.len()
                },
                _ => false,
            },
            Type::Entity(name) => {
                let Some(binding) = scope.lookup(name) else { return false };
                let entity = match &binding.borrow().value {
                    Value::StaticStruct(strukt) => Entity::Struct(strukt.clone()),
                    Value::StaticTag(tag) => Entity::Tag(tag.clone()),
                    _ => return false,
                };
                self.satisfies_entity(value, &entity, scope)
            },
            Type::EntityRaw(entity) => self.satisfies_entity(value, entity, scope),
        }
    }

    fn satisfies_entity(&self, value: &Value, entity: &Entity, scope: &Scope) -> bool {
        match (entity, value) {
            (Entity::Struct(expected), Value::Struct(instance)) => instance.borrow().parent.same_shape(expected),
            (Entity::Tag(expected), Value::Tag(tag)) => {
                if !tag.parent.same_shape(expected) {
                    return false;
                }
                match &tag.payload {
                    Some(payload) => expected.payload
                                             .get(&tag.variant)
                                             .is_some_and(|ty| self.satisfies(payload, ty, scope)),
                    None => expected.plain.contains(&tag.variant),
                }
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::interpreter::value::core::Pointer;

    fn numbers() -> Type {
        Type::Array(Box::new(Type::Number(None)))
    }

    #[test]
    fn pinned_scalars() {
        let interpreter = Interpreter::new();
        let scope = Scope::new();
        assert!(interpreter.satisfies(&Value::from(3.0), &Type::Number(Some(3.0)), &scope));
        assert!(!interpreter.satisfies(&Value::from(4.0), &Type::Number(Some(3.0)), &scope));
        assert!(interpreter.satisfies(&Value::from("a"), &Type::String(None), &scope));
        assert!(!interpreter.satisfies(&Value::None, &Type::Bool(None), &scope));
    }

    #[test]
    fn unions_accept_either_side() {
        let interpreter = Interpreter::new();
        let scope = Scope::new();
        let ty = Type::Or(Box::new(Type::Number(None)), Box::new(Type::None));
        assert!(interpreter.satisfies(&Value::None, &ty, &scope));
        assert!(interpreter.satisfies(&Value::from(1.0), &ty, &scope));
        assert!(!interpreter.satisfies(&Value::from("1"), &ty, &scope));
    }

    #[test]
    fn arrays_are_stamped_once() {
        let interpreter = Interpreter::new();
        let scope = Scope::new();
        let value = Value::from(vec![Value::from(1.0), Value::from(2.0)]);
        assert!(interpreter.satisfies(&value, &numbers(), &scope));

        let Value::Array(array) = &value else { unreachable!() };
        array.borrow_mut().items[0] = Value::from("not a number");
        assert!(interpreter.satisfies(&value, &numbers(), &scope));

        let fresh = Value::from(vec![Value::from("not a number")]);
        assert!(!interpreter.satisfies(&fresh, &numbers(), &scope));
    }

    #[test]
    fn tuples_check_length() {
        let interpreter = Interpreter::new();
        let scope = Scope::new();
        let ty = Type::Tuple(vec![Type::Number(None), Type::String(None)]);
        assert!(interpreter.satisfies(&Value::from(vec![Value::from(1.0), Value::from("a")]), &ty, &scope));
        assert!(!interpreter.satisfies(&Value::from(vec![Value::from(1.0)]), &ty, &scope));
    }

    #[test]
    fn records_check_keys_and_values() {
        let interpreter = Interpreter::new();
        let scope = Scope::new();
        let ty = Type::LooseRecord(Box::new(Type::String(None)), Box::new(Type::Number(None)));
        let good = Value::object([(Value::from("a"), Value::from(1.0))]);
        let bad = Value::object([(Value::from(1.0), Value::from(1.0))]);
        assert!(interpreter.satisfies(&good, &ty, &scope));
        assert!(!interpreter.satisfies(&bad, &ty, &scope));
    }

    #[test]
    fn pointers_compare_their_stamp() {
        let mut interpreter = Interpreter::new();
        let scope = Scope::new();
        interpreter.arena.push(Value::from(1.0));
        let pointer = Value::Pointer(Rc::new(Pointer::new(0)));
        let ty = Type::Pointer(Box::new(Type::Number(None)));
        assert!(interpreter.satisfies(&pointer, &ty, &scope));

        interpreter.arena[0] = Value::from("changed");
        assert!(interpreter.satisfies(&pointer, &ty, &scope));
        assert!(!interpreter.satisfies(&pointer, &Type::Pointer(Box::new(Type::Any)), &scope));

        let dangling = Value::Pointer(Rc::new(Pointer::new(9)));
        assert!(!interpreter.satisfies(&dangling, &ty, &scope));
    }
}
