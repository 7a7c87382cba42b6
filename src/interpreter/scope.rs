use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::interpreter::{types::Type, value::Value};

/// A named binding: its mutability, declared type and current value.
#[derive(Debug, Clone)]
pub struct Variable {
    pub mutable: bool,
    pub ty:      Type,
    pub value:   Value,
}

impl Variable {
    /// An immutable binding of type `Any`.
    pub fn constant(value: Value) -> Self {
        Self { mutable: false,
               ty: Type::Any,
               value }
    }
}

/// A shared handle to a binding. `use` shares the handle, so an imported
/// name sees later writes through the original.
pub type Binding = Rc<RefCell<Variable>>;

struct ScopeData {
    parent:  Option<Scope>,
    members: RefCell<HashMap<String, Binding>>,
}

/// A lexical scope: a mapping from names to bindings plus an optional
/// parent.
///
/// Scopes are reference counted. Closures capture their defining scope, so a
/// closure stored in a variable of its own scope forms a cycle that is never
/// freed; scopes live as long as the interpreter in practice.
#[derive(Clone)]
pub struct Scope(Rc<ScopeData>);

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// A root scope without a parent.
    pub fn new() -> Self {
        Self(Rc::new(ScopeData { parent:  None,
                                 members: RefCell::new(HashMap::new()), }))
    }

    /// A new empty scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(ScopeData { parent:  Some(self.clone()),
                                 members: RefCell::new(HashMap::new()), }))
    }

    /// Finds a binding here or in any ancestor.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.0.members.borrow().get(name) {
                return Some(Rc::clone(binding));
            }
            scope = scope.0.parent.as_ref()?;
        }
    }

    /// Finds a binding declared directly in this scope.
    pub fn get_own(&self, name: &str) -> Option<Binding> {
        self.0.members.borrow().get(name).cloned()
    }

    pub fn contains_own(&self, name: &str) -> bool {
        self.0.members.borrow().contains_key(name)
    }

    /// Binds `name` in this scope, replacing any binding of the same name.
    pub fn define(&self, name: impl Into<String>, variable: Variable) {
        self.insert_binding(name, Rc::new(RefCell::new(variable)));
    }

    /// Binds `name` to an existing binding handle.
    pub fn insert_binding(&self, name: impl Into<String>, binding: Binding) {
        self.0.members.borrow_mut().insert(name.into(), binding);
    }

    /// The names declared directly in this scope, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.members.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Identity of the scope, for identity comparisons of namespaces.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
         .field("members", &self.names())
         .field("has_parent", &self.0.parent.is_some())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parents_and_shadows() {
        let root = Scope::new();
        root.define("x", Variable::constant(Value::from(1.0)));
        let child = root.child();
        assert!(child.lookup("x").is_some());
        assert!(!child.contains_own("x"));

        child.define("x", Variable::constant(Value::from(2.0)));
        let inner = child.lookup("x").map(|b| b.borrow().value.clone());
        assert_eq!(inner, Some(Value::from(2.0)));
        let outer = root.lookup("x").map(|b| b.borrow().value.clone());
        assert_eq!(outer, Some(Value::from(1.0)));
    }

    #[test]
    fn shared_bindings_see_writes() {
        let a = Scope::new();
        a.define("v", Variable { mutable: true,
                                 ty:      Type::Any,
                                 value:   Value::None, });
        let b = Scope::new();
        b.insert_binding("alias", a.get_own("v").expect("missing binding"));
        if let Some(binding) = a.get_own("v") {
            binding.borrow_mut().value = Value::from(5.0);
        }
        let seen = b.get_own("alias").map(|binding| binding.borrow().value.clone());
        assert_eq!(seen, Some(Value::from(5.0)));
    }
}
