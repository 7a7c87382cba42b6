use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::{interpreter::value::core::Value, util::stack::ensure_sufficient_stack};

/// A hashable, totally ordered mirror of a value's structure.
///
/// Two values are `==` exactly when their keys are equal. Keys also index
/// object entries and the arena's literal cache. Functions, natives,
/// namespaces and declarations compare by identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKey {
    None,
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
    Array(Vec<ValueKey>),
    Object(Vec<(ValueKey, ValueKey)>),
    Pointer(usize),
    Tag {
        tag:     String,
        variant: String,
        payload: Option<Box<ValueKey>>,
    },
    Struct {
        name:   String,
        fields: Vec<(String, ValueKey)>,
    },
    Identity(&'static str, usize),
}

fn address<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc).cast::<()>() as usize
}

impl From<&Value> for ValueKey {
    fn from(value: &Value) -> Self {
        Self::build(value, &mut Vec::new())
    }
}

impl ValueKey {
    /// Builds the key of `value`. `open` holds the containers on the current
    /// path; a container reached again through itself keys as
    /// `Identity("cycle", ..)`.
    fn build(value: &Value, open: &mut Vec<usize>) -> Self {
        match value {
            Value::None => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(OrderedFloat(*n)),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(array) => Self::nested(address(array), open, |open| {
                Self::Array(array.borrow().items.iter().map(|item| Self::build(item, open)).collect())
            }),
            Value::Object(object) => Self::nested(address(object), open, |open| {
                Self::Object(object.borrow()
                                   .entries
                                   .iter()
                                   .map(|(key, (_, value))| (key.clone(), Self::build(value, open)))
                                   .collect())
            }),
            Value::Pointer(pointer) => Self::Pointer(pointer.index),
            Value::Tag(tag) => Self::Tag { tag:     tag.parent.name.clone(),
                                           variant: tag.variant.clone(),
                                           payload: tag.payload
                                                       .as_ref()
                                                       .map(|payload| Box::new(Self::build(payload, open))), },
            Value::Struct(instance) => Self::nested(address(instance), open, |open| {
                let instance = instance.borrow();
                Self::Struct { name:   instance.parent.name.clone(),
                               fields: instance.fields
                                               .iter()
                                               .map(|(name, value)| (name.clone(), Self::build(value, open)))
                                               .collect(), }
            }),
            Value::Fun(fun) => Self::Identity("fun", address(fun)),
            Value::Native(native) => Self::Identity("native", address(native)),
            Value::NativeMacro(native) => Self::Identity("macro", address(native)),
            Value::StaticTag(tag) => Self::Identity("tag", address(tag)),
            Value::StaticStruct(strukt) => Self::Identity("struct", address(strukt)),
            Value::Namespace(scope) => Self::Identity("namespace", scope.address()),
        }
    }

    fn nested(container: usize, open: &mut Vec<usize>, build: impl FnOnce(&mut Vec<usize>) -> Self) -> Self {
        if open.contains(&container) {
            return Self::Identity("cycle", container);
        }
        open.push(container);
        let key = ensure_sufficient_stack(|| build(open));
        open.pop();
        key
    }
}

impl Value {
    /// The structural key of this value.
    pub fn key(&self) -> ValueKey {
        ValueKey::from(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equal_structures_share_a_key() {
        let a = Value::object([(Value::from("x"), Value::from(vec![Value::from(1.0)]))]);
        let b = Value::object([(Value::from("x"), Value::from(vec![Value::from(1.0)]))]);
        assert_eq!(a.key(), b.key());

        let set: HashSet<ValueKey> = [a.key(), b.key(), Value::from(1.0).key()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn numbers_and_strings_do_not_collide() {
        assert_ne!(Value::from(1.0).key(), Value::from("1").key());
    }

    #[test]
    fn self_containing_array_has_a_finite_key() {
        let array = Value::from(vec![Value::from(1.0)]);
        let Value::Array(inner) = &array else { panic!("expected an array") };
        inner.borrow_mut().items[0] = array.clone();

        let ValueKey::Array(items) = array.key() else { panic!("expected an array key") };
        assert!(matches!(items.as_slice(), [ValueKey::Identity("cycle", _)]));
        assert_eq!(array.key(), array.key());
        inner.borrow_mut().items.clear();
    }

    #[test]
    fn shared_children_are_not_cycles() {
        let child = Value::from(vec![Value::from(2.0)]);
        let parent = Value::from(vec![child.clone(), child]);
        let copy = Value::from(vec![Value::from(vec![Value::from(2.0)]), Value::from(vec![Value::from(2.0)])]);
        assert_eq!(parent.key(), copy.key());
    }

    #[test]
    fn zero_signs_are_equal() {
        assert_eq!(Value::from(0.0).key(), Value::from(-0.0).key());
    }
}
