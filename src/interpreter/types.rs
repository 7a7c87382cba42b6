use std::{fmt, rc::Rc};

use crate::{
    interpreter::value::entity::{StaticStruct, StaticTag},
    util::num::format_number,
};

/// A declared parameter of a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name:    String,
    pub ty:      Type,
    pub mutable: bool,
}

/// Parameter list and return type of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunType {
    pub params: Vec<Param>,
    pub ret:    Box<Type>,
}

/// A struct or tag descriptor embedded directly in a type.
///
/// Two entities are equal when their shapes are equal; the declared names do
/// not take part.
#[derive(Debug, Clone)]
pub enum Entity {
    Struct(Rc<StaticStruct>),
    Tag(Rc<StaticTag>),
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Struct(a), Self::Struct(b)) => a.same_shape(b),
            (Self::Tag(a), Self::Tag(b)) => a.same_shape(b),
            _ => false,
        }
    }
}

/// Runtime type descriptors.
///
/// Types are checked structurally against values with
/// [`Interpreter::satisfies`](crate::interpreter::evaluator::core::Interpreter::satisfies).
/// `Number`, `String` and `Bool` can be pinned to a single literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Any,
    Number(Option<f64>),
    String(Option<String>),
    Bool(Option<bool>),
    None,
    Or(Box<Type>, Box<Type>),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Pointer(Box<Type>),
    LooseRecord(Box<Type>, Box<Type>),
    /// A struct or tag resolved by name in the checking scope.
    Entity(String),
    EntityRaw(Entity),
    Fun(FunType),
}

impl fmt::Display for FunType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fun(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if param.mutable {
                write!(f, "mut ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
        }
        write!(f, ") {}", self.ret)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Number(Some(n)) => write!(f, "{}", format_number(*n)),
            Self::Number(None) => write!(f, "Number"),
            Self::String(Some(s)) => write!(f, "{s:?}"),
            Self::String(None) => write!(f, "String"),
            Self::Bool(Some(b)) => write!(f, "{b}"),
            Self::Bool(None) => write!(f, "Bool"),
            Self::None => write!(f, "None"),
            Self::Or(a, b) => write!(f, "{a} | {b}"),
            Self::Array(inner) => match **inner {
                Self::Or(..) | Self::Fun(_) => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            Self::Tuple(members) => {
                write!(f, "[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, "]")
            },
            Self::Pointer(inner) => write!(f, "&{inner}"),
            Self::LooseRecord(key, value) => write!(f, "<{key}: {value}>"),
            Self::Entity(name) => write!(f, "{name}"),
            Self::EntityRaw(Entity::Struct(s)) => write!(f, "{}", s.name),
            Self::EntityRaw(Entity::Tag(t)) => write!(f, "{}", t.name),
            Self::Fun(fun) => write!(f, "{fun}"),
        }
    }
}
