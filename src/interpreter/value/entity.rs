use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use crate::interpreter::{
    types::{FunType, Type},
    value::core::Value,
};

/// A declared tag: its plain variants and its payload variants with their
/// payload types.
#[derive(Debug)]
pub struct StaticTag {
    pub name:    String,
    pub plain:   BTreeSet<String>,
    pub payload: BTreeMap<String, Type>,
}

impl StaticTag {
    /// Shape equality: same variants with equal payload types. The declared
    /// name does not take part.
    pub fn same_shape(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || (self.plain == other.plain && self.payload == other.payload)
    }
}

/// A variant of a tag, with its payload if it has one.
#[derive(Debug)]
pub struct TagInstance {
    pub parent:  Rc<StaticTag>,
    pub variant: String,
    pub payload: Option<Value>,
}

/// A declared struct.
///
/// Static fields are mutable through member assignment, so they sit behind a
/// `RefCell`; everything else is fixed at declaration.
#[derive(Debug)]
pub struct StaticStruct {
    pub name:           String,
    pub fields:         BTreeMap<String, Type>,
    pub static_fields:  RefCell<BTreeMap<String, (Type, Value)>>,
    pub methods:        BTreeMap<String, Value>,
    pub static_methods: BTreeMap<String, Value>,
}

fn signature_of(value: &Value) -> Option<&FunType> {
    match value {
        Value::Fun(fun) => Some(&fun.def.signature),
        _ => None,
    }
}

fn same_methods(a: &BTreeMap<String, Value>, b: &BTreeMap<String, Value>) -> bool {
    a.len() == b.len()
    && a.iter().zip(b.iter()).all(|((name_a, method_a), (name_b, method_b))| {
                                 name_a == name_b && signature_of(method_a) == signature_of(method_b)
                             })
}

impl StaticStruct {
    /// Shape equality: same field types, same static field types and same
    /// method signatures. The declared name does not take part.
    pub fn same_shape(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let static_types = |s: &Self| {
            s.static_fields
             .borrow()
             .iter()
             .map(|(name, (ty, _))| (name.clone(), ty.clone()))
             .collect::<Vec<_>>()
        };
        self.fields == other.fields
        && static_types(self) == static_types(other)
        && same_methods(&self.methods, &other.methods)
        && same_methods(&self.static_methods, &other.static_methods)
    }

    /// Finds an instance method.
    pub fn method(&self, name: &str) -> Option<Value> {
        self.methods.get(name).cloned()
    }

    /// Reads a static field, falling back to static methods.
    pub fn static_member(&self, name: &str) -> Option<Value> {
        if let Some((_, value)) = self.static_fields.borrow().get(name) {
            return Some(value.clone());
        }
        self.static_methods.get(name).cloned()
    }
}

/// An instance of a struct. Field types live on the parent.
#[derive(Debug)]
pub struct StructInstance {
    pub parent: Rc<StaticStruct>,
    pub fields: BTreeMap<String, Value>,
}

impl StructInstance {
    /// Reads a field, falling back to the parent's methods.
    pub fn member(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.get(name) {
            return Some(value.clone());
        }
        self.parent.method(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, plain: &[&str], payload: &[(&str, Type)]) -> StaticTag {
        StaticTag { name:    name.to_string(),
                    plain:   plain.iter().map(ToString::to_string).collect(),
                    payload: payload.iter().map(|(n, t)| ((*n).to_string(), t.clone())).collect(), }
    }

    #[test]
    fn tag_shapes_ignore_names() {
        let a = tag("A", &["X"], &[("Y", Type::Number(None))]);
        let b = tag("B", &["X"], &[("Y", Type::Number(None))]);
        let c = tag("C", &["X"], &[("Y", Type::String(None))]);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn struct_shapes_compare_fields() {
        let make = |field_type: Type| StaticStruct { name:           "P".into(),
                                                     fields:         [("x".to_string(), field_type)].into(),
                                                     static_fields:  RefCell::new(BTreeMap::new()),
                                                     methods:        BTreeMap::new(),
                                                     static_methods: BTreeMap::new(), };
        assert!(make(Type::Number(None)).same_shape(&make(Type::Number(None))));
        assert!(!make(Type::Number(None)).same_shape(&make(Type::Any)));
    }
}
