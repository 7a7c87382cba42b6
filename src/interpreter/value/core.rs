use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use crate::{
    ast::LiteralValue,
    interpreter::{
        scope::Scope,
        types::Type,
        value::{
            entity::{StaticStruct, StaticTag, StructInstance, TagInstance},
            function::{Function, NativeFunction, NativeMacro},
            key::ValueKey,
        },
    },
    util::num::format_number,
};

/// Rendering stops descending past this depth, so self-referencing values
/// print finitely.
const MAX_RENDER_DEPTH: usize = 32;

/// An array with its optional type stamp.
#[derive(Debug, Clone, Default)]
pub struct ArrayValue {
    pub items: Vec<Value>,
    /// Set by the first successful array or tuple type check.
    pub stamp: Option<Type>,
}

/// An object with its optional type stamp.
///
/// Entries are keyed by the structural key of the key value and keep the
/// original key value for iteration and rendering.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    pub entries: BTreeMap<ValueKey, (Value, Value)>,
    pub stamp:   Option<Type>,
}

impl ObjectValue {
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&key.key()).map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(key.key(), (key, value));
    }
}

/// A pointer into the interpreter's arena.
#[derive(Debug)]
pub struct Pointer {
    pub index: usize,
    /// Set by the first successful pointer type check.
    pub stamp: RefCell<Option<Type>>,
}

impl Pointer {
    pub fn new(index: usize) -> Self {
        Self { index,
               stamp: RefCell::new(None) }
    }
}

/// Every runtime value of the language.
///
/// Arrays, objects and struct instances are shared and mutable: copies of a
/// value alias the same storage. Everything else is immutable.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    None,
    Array(Rc<RefCell<ArrayValue>>),
    Object(Rc<RefCell<ObjectValue>>),
    Fun(Rc<Function>),
    Native(Rc<NativeFunction>),
    NativeMacro(Rc<NativeMacro>),
    Pointer(Rc<Pointer>),
    StaticTag(Rc<StaticTag>),
    Tag(Rc<TagInstance>),
    StaticStruct(Rc<StaticStruct>),
    Struct(Rc<RefCell<StructInstance>>),
    Namespace(Scope),
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(ArrayValue { items, stamp: None })))
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(n) => Self::Number(*n),
            LiteralValue::String(s) => Self::String(s.clone()),
            LiteralValue::Bool(b) => Self::Bool(*b),
            LiteralValue::None => Self::None,
        }
    }
}

impl Value {
    /// Builds an unstamped object from key/value pairs.
    pub fn object(entries: impl IntoIterator<Item = (Self, Self)>) -> Self {
        let mut object = ObjectValue::default();
        for (key, value) in entries {
            object.insert(key, value);
        }
        Self::Object(Rc::new(RefCell::new(object)))
    }

    /// `none` and `false` are falsey; every other value is truthy.
    pub const fn is_falsey(&self) -> bool {
        matches!(self, Self::None | Self::Bool(false))
    }

    /// The name of the value's kind, as reported by `Meta::typeof`.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Bool(_) => "Bool",
            Self::None => "None",
            Self::Array(_) => "Array",
            Self::Object(_) => "Object",
            Self::Fun(_) => "Fun",
            Self::Native(_) => "Native",
            Self::NativeMacro(_) => "NativeMacro",
            Self::Pointer(_) => "Pointer",
            Self::StaticTag(_) => "StaticTag",
            Self::Tag(_) => "Tag",
            Self::StaticStruct(_) => "StaticStruct",
            Self::Struct(_) => "Struct",
            Self::Namespace(_) => "Namespace",
        }
    }

    /// Renders the value, following pointers into `arena`.
    pub fn render(&self, arena: &[Self]) -> String {
        Rendered { value: self,
                   arena: Some(arena),
                   depth: 0 }.to_string()
    }
}

/// Structural equality, the same relation used by `==`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Renders without an arena: pointers show only their address.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Rendered { value: self,
                   arena: None,
                   depth: 0 }.fmt(f)
    }
}

struct Rendered<'v> {
    value: &'v Value,
    arena: Option<&'v [Value]>,
    depth: usize,
}

impl Rendered<'_> {
    fn nested<'n>(&'n self, value: &'n Value) -> Rendered<'n> {
        Rendered { value,
                   arena: self.arena,
                   depth: self.depth + 1 }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth > MAX_RENDER_DEPTH {
            return write!(f, "...");
        }
        match self.value {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::None => write!(f, "none"),
            Value::Array(array) => {
                write!(f, "[")?;
                for (i, item) in array.borrow().items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.nested(item))?;
                }
                write!(f, "]")
            },
            Value::Object(object) => {
                write!(f, "{{")?;
                for (i, (key, value)) in object.borrow().entries.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", self.nested(key), self.nested(value))?;
                }
                write!(f, "}}")
            },
            Value::Fun(fun) => write!(f, "{}", fun.def.signature),
            Value::Native(_) => write!(f, "Native"),
            Value::NativeMacro(_) => write!(f, "NativeMacro"),
            Value::Pointer(pointer) => match self.arena {
                Some(arena) => {
                    let pointee = arena.get(pointer.index).unwrap_or(&Value::None);
                    write!(f, "&{}(at {})", self.nested(pointee), pointer.index)
                },
                None => write!(f, "&(at {})", pointer.index),
            },
            Value::StaticTag(tag) => write!(f, "tag {}", tag.name),
            Value::Tag(tag) => match &tag.payload {
                Some(payload) => write!(f, "{}::{}({})", tag.parent.name, tag.variant, self.nested(payload)),
                None => write!(f, "{}::{}", tag.parent.name, tag.variant),
            },
            Value::StaticStruct(strukt) => write!(f, "str {}", strukt.name),
            Value::Struct(instance) => {
                let instance = instance.borrow();
                write!(f, "{}{{", instance.parent.name)?;
                for (i, (name, value)) in instance.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {}", self.nested(value))?;
                }
                write!(f, "}}")
            },
            Value::Namespace(scope) => write!(f, "Namespace {{ {} }}", scope.names().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn renders_collections() {
        let array = Value::from(vec![Value::from(1.0), Value::from("a"), Value::None]);
        assert_eq!(array.to_string(), "[1, a, none]");

        let object = Value::object([(Value::from("b"), Value::from(2.0)), (Value::from("a"), Value::from(true))]);
        assert_eq!(object.to_string(), "{a -> true, b -> 2}");
    }

    #[test]
    fn pointers_render_their_pointee_with_an_arena() {
        let pointer = Value::Pointer(Rc::new(Pointer::new(1)));
        let arena = vec![Value::None, Value::from(3.0)];
        assert_eq!(pointer.render(&arena), "&3(at 1)");
        assert_eq!(pointer.to_string(), "&(at 1)");
    }

    #[test]
    fn self_referencing_pointer_renders_finitely() {
        let pointer = Value::Pointer(Rc::new(Pointer::new(0)));
        let arena = vec![pointer.clone()];
        assert!(pointer.render(&arena).contains("..."));
    }

    #[test]
    fn equality_is_structural() {
        let a = Value::from(vec![Value::from(1.0), Value::from(2.0)]);
        let b = Value::from(vec![Value::from(1.0), Value::from(2.0)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::from(vec![Value::from(2.0), Value::from(1.0)]));
    }

    #[test]
    fn only_none_and_false_are_falsey() {
        assert!(Value::None.is_falsey());
        assert!(Value::Bool(false).is_falsey());
        assert!(!Value::from(0.0).is_falsey());
        assert!(!Value::from("").is_falsey());
    }
}
