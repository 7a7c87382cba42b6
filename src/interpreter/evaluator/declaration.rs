use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use crate::{
    ast::{FunctionDef, StructDecl, TagDecl},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::{Scope, Variable},
        types::Type,
        value::{
            Value,
            entity::{StaticStruct, StaticTag},
        },
    },
};

impl Interpreter {
    /// Evaluates a `str` declaration into a `StaticStruct` bound to its name.
    ///
    /// Static field initializers run once, in order, in a child of `scope`
    /// where earlier static fields are already visible.
    pub(crate) fn declare_struct(&mut self, decl: &StructDecl, scope: &Scope) -> EvalResult<Value> {
        let methods = self.closures(&decl.methods, scope);
        let static_methods = self.closures(&decl.static_methods, scope);

        let static_scope = scope.child();
        let mut static_fields = BTreeMap::new();
        for field in &decl.static_fields {
            let value = self.eval(&field.init, &static_scope)?;
            if !self.satisfies(&value, &field.ty, &static_scope) {
                return Err(RuntimeError::FieldTypeMismatch { field:    field.name.clone(),
                                                             expected: field.ty.to_string(),
                                                             value:    self.render(&value), }.into());
            }
            static_scope.define(field.name.as_str(), Variable::constant(value.clone()));
            static_fields.insert(field.name.clone(), (field.ty.clone(), value));
        }

        let strukt = StaticStruct { name: decl.name.clone(),
                                    fields: decl.fields.iter().cloned().collect(),
                                    static_fields: RefCell::new(static_fields),
                                    methods,
                                    static_methods };
        let value = Value::StaticStruct(Rc::new(strukt));
        scope.define(decl.name.as_str(),
                     Variable { mutable: false,
                                ty:      Type::Entity(decl.name.clone()),
                                value:   value.clone(), });
        Ok(value)
    }

    fn closures(&self, defs: &[Rc<FunctionDef>], scope: &Scope) -> BTreeMap<String, Value> {
        defs.iter()
            .filter_map(|def| Some((def.name.clone()?, self.make_closure(def, scope))))
            .collect()
    }

    /// Evaluates a `tag` declaration into a `StaticTag` bound to its name.
    pub(crate) fn declare_tag(decl: &TagDecl, scope: &Scope) -> Value {
        let tag = StaticTag { name:    decl.name.clone(),
                              plain:   decl.plain.iter().cloned().collect::<BTreeSet<_>>(),
                              payload: decl.payload.iter().cloned().collect(), };
        let value = Value::StaticTag(Rc::new(tag));
        scope.define(decl.name.as_str(), Variable::constant(value.clone()));
        value
    }
}
