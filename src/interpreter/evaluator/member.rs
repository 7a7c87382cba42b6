use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::{
    ast::{Expr, Member},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::Scope,
        value::{
            Value,
            core::ObjectValue,
            entity::{StructInstance, TagInstance},
        },
    },
    util::num::f64_to_index,
};

impl Interpreter {
    /// Evaluates `a.b`, `a[k]` and `a::b`.
    ///
    /// `a:b` is only meaningful as a callee and fails here.
    pub(crate) fn eval_member(&mut self, object: &Expr, member: &Member, scope: &Scope) -> EvalResult<Value> {
        match member {
            Member::CallSelf(name) => Err(RuntimeError::CallSelfOutsideCall { name: name.clone() }.into()),
            Member::Namespace(name) => {
                let object = self.eval(object, scope)?;
                self.namespace_member(&object, name)
            },
            Member::Field(name) => {
                let object = self.eval(object, scope)?;
                self.index(&object, &Value::from(name.as_str()))
            },
            Member::Computed(key) => {
                let object = self.eval(object, scope)?;
                let key = self.eval(key, scope)?;
                self.index(&object, &key)
            },
        }
    }

    /// Resolves `object::name`.
    ///
    /// Namespaces yield their own bindings, or `none` for a name they do not
    /// hold. Tags yield plain variants and structs yield static members.
    pub(crate) fn namespace_member(&self, object: &Value, name: &str) -> EvalResult<Value> {
        match object {
            Value::Namespace(namespace) => Ok(namespace.get_own(name)
                                                       .map_or(Value::None, |binding| binding.borrow().value.clone())),
            Value::StaticTag(tag) => {
                if !tag.plain.contains(name) {
                    return Err(RuntimeError::UnknownPlainVariant { tag:     tag.name.clone(),
                                                                   variant: name.to_string(), }.into());
                }
                Ok(Value::Tag(Rc::new(TagInstance { parent:  Rc::clone(tag),
                                                    variant: name.to_string(),
                                                    payload: None, })))
            },
            Value::StaticStruct(strukt) => strukt.static_member(name).ok_or_else(|| {
                                                                           RuntimeError::UnknownField {
                                                                               owner: strukt.name.clone(),
                                                                               field: name.to_string(),
                                                                           }.into()
                                                                       }),
            other => Err(RuntimeError::NotANamespace { name: self.render(other) }.into()),
        }
    }

    /// Reads `object[key]`. Missing object keys and array or string indices
    /// out of range read as `none`.
    pub(crate) fn index(&self, object: &Value, key: &Value) -> EvalResult<Value> {
        match object {
            Value::Object(entries) => Ok(entries.borrow().get(key).cloned().unwrap_or(Value::None)),
            Value::Array(array) => {
                let index = self.number_index(key)?;
                Ok(index.and_then(|index| array.borrow().items.get(index).cloned())
                        .unwrap_or(Value::None))
            },
            Value::String(text) => {
                let index = self.number_index(key)?;
                Ok(index.and_then(|index| text.chars().nth(index))
                        .map_or(Value::None, |c| Value::String(c.to_string())))
            },
            Value::Struct(instance) => {
                let instance = instance.borrow();
                let name = field_name(key, &instance.parent.name)?;
                instance.member(name).ok_or_else(|| {
                                         RuntimeError::UnknownField { owner: instance.parent.name.clone(),
                                                                      field: name.to_string(), }.into()
                                     })
            },
            Value::StaticStruct(strukt) => {
                let name = field_name(key, &strukt.name)?;
                strukt.static_member(name).ok_or_else(|| {
                                              RuntimeError::UnknownField { owner: strukt.name.clone(),
                                                                           field: name.to_string(), }.into()
                                          })
            },
            Value::Namespace(_) => {
                let name = field_name(key, "namespace")?;
                self.namespace_member(object, name)
            },
            other => Err(RuntimeError::type_error(format!("cannot index {} with {}",
                                                          other.kind_name(),
                                                          self.render(key))).into()),
        }
    }

    /// Interprets `key` as a sequence index. Numbers that are not valid
    /// indices give `None`; other kinds fail.
    pub(crate) fn number_index(&self, key: &Value) -> EvalResult<Option<usize>> {
        match key {
            Value::Number(n) => Ok(f64_to_index(*n)),
            other => Err(RuntimeError::type_error(format!("expected a number index, got {}", self.render(other))).into()),
        }
    }

    /// Builds an object from `{k -> v}` or `{k: v}`. A bare identifier key is
    /// taken as a string.
    pub(crate) fn eval_record(&mut self, entries: &[(Expr, Expr)], scope: &Scope) -> EvalResult<Value> {
        let mut object = ObjectValue::default();
        for (key, value) in entries {
            let key = match key {
                Expr::Variable { name, .. } => Value::from(name.as_str()),
                other => self.eval(other, scope)?,
            };
            let value = self.eval(value, scope)?;
            object.insert(key, value);
        }
        Ok(Value::Object(Rc::new(RefCell::new(object))))
    }

    /// Builds a struct instance from `Name{field: value}`.
    ///
    /// Every declared field must be given exactly once and satisfy its type.
    pub(crate) fn eval_struct_literal(&mut self,
                                      name: &str,
                                      entries: &[(Expr, Expr)],
                                      scope: &Scope)
                                      -> EvalResult<Value> {
        let strukt = match scope.lookup(name).map(|binding| binding.borrow().value.clone()) {
            Some(Value::StaticStruct(strukt)) => strukt,
            _ => return Err(RuntimeError::NotAStruct { name: name.to_string() }.into()),
        };

        let mut fields = BTreeMap::new();
        for (key, value) in entries {
            let Expr::Variable { name: field, .. } = key else {
                return Err(RuntimeError::StructKeyNotIdentifier { name: name.to_string() }.into());
            };
            let Some(ty) = strukt.fields.get(field) else {
                return Err(RuntimeError::UnknownField { owner: name.to_string(),
                                                        field: field.clone(), }.into());
            };
            let value = self.eval(value, scope)?;
            if !self.satisfies(&value, ty, scope) {
                return Err(RuntimeError::FieldTypeMismatch { field:    field.clone(),
                                                             expected: ty.to_string(),
                                                             value:    self.render(&value), }.into());
            }
            fields.insert(field.clone(), value);
        }
        if fields.len() != strukt.fields.len() {
            return Err(RuntimeError::FieldCountMismatch { name:     name.to_string(),
                                                          expected: strukt.fields.len(),
                                                          found:    fields.len(), }.into());
        }

        Ok(Value::Struct(Rc::new(RefCell::new(StructInstance { parent: strukt, fields }))))
    }
}

/// Struct members are named by strings.
fn field_name<'k>(key: &'k Value, owner: &str) -> EvalResult<&'k str> {
    match key {
        Value::String(name) => Ok(name.as_str()),
        other => Err(RuntimeError::UnknownField { owner: owner.to_string(),
                                                  field: other.to_string(), }.into()),
    }
}
