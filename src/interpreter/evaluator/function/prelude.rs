use std::{collections::BTreeMap, rc::Rc};

use crate::{
    error::{EvalError, RuntimeError},
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            function::{array, io, meta, string},
        },
        scope::{Scope, Variable},
        value::{
            Value,
            function::{NativeFunction, NativeMacro},
        },
    },
};

/// Host implementation of a prelude native: the evaluated arguments, the
/// calling scope and the interpreter.
type PreludeFn = fn(&[Value], &Scope, &mut Interpreter) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a native.
///
/// - `Exact(n)` means the native must receive exactly `n` arguments.
/// - `AtLeast(n)` means the native accepts `n` or more arguments.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::AtLeast(m) => n >= m,
        }
    }

    fn describe(self) -> String {
        match self {
            Self::Exact(1) => "exactly 1 argument".to_string(),
            Self::Exact(m) => format!("exactly {m} arguments"),
            Self::AtLeast(m) => format!("at least {m} arguments"),
        }
    }
}

/// Defines the prelude natives by generating a lookup table.
///
/// Each entry provides:
/// - the `Std` sub-namespace and the native's name within it,
/// - an arity specification,
/// - a function pointer implementing the native.
macro_rules! native_functions {
    (
        $(
            $namespace:literal :: $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct NativeDef {
            namespace: &'static str,
            name:      &'static str,
            arity:     Arity,
            func:      PreludeFn,
        }
        static NATIVE_TABLE: &[NativeDef] = &[
            $(
                NativeDef { namespace: $namespace, name: $name, arity: $arity, func: $func },
            )*
        ];
    };
}

native_functions! {
    "Io"     :: "print"    => { arity: Arity::AtLeast(0), func: io::print },
    "Io"     :: "println"  => { arity: Arity::AtLeast(0), func: io::println },
    "Array"  :: "len"      => { arity: Arity::Exact(1), func: array::len },
    "Array"  :: "push"     => { arity: Arity::Exact(2), func: array::push },
    "Array"  :: "pop"      => { arity: Arity::Exact(1), func: array::pop },
    "String" :: "tostring" => { arity: Arity::Exact(1), func: string::tostring },
    "String" :: "tonumber" => { arity: Arity::Exact(1), func: string::tonumber },
    "String" :: "len"      => { arity: Arity::Exact(1), func: string::len },
    "Meta"   :: "typeof"   => { arity: Arity::Exact(1), func: meta::type_of },
}

/// Builds the error a native reports for bad arguments.
pub(crate) fn argument_error(name: &str, details: impl Into<String>) -> EvalError {
    RuntimeError::NativeArguments { name:    name.to_string(),
                                    details: details.into(), }.into()
}

fn native(def: &'static NativeDef) -> Value {
    let name = format!("Std::{}::{}", def.namespace, def.name);
    let qualified = name.clone();
    let func = move |arguments: &[Value], scope: &Scope, interpreter: &mut Interpreter| {
        if !def.arity.check(arguments.len()) {
            return Err(argument_error(&qualified,
                                      format!("expected {}, got {}", def.arity.describe(), arguments.len())));
        }
        (def.func)(arguments, scope, interpreter)
    };
    Value::Native(Rc::new(NativeFunction { name,
                                           func: Rc::new(func) }))
}

/// Fills `prelude` with the `Std` namespace and the global `assert`.
pub(crate) fn install_prelude(prelude: &Scope) {
    let mut namespaces: BTreeMap<&str, Scope> = BTreeMap::new();
    for def in NATIVE_TABLE {
        namespaces.entry(def.namespace)
                  .or_default()
                  .define(def.name, Variable::constant(native(def)));
    }

    let kind = NativeMacro { name: "Std::Meta::kind".to_string(),
                             func: Rc::new(meta::kind), };
    namespaces.entry("Meta")
              .or_default()
              .define("kind", Variable::constant(Value::NativeMacro(Rc::new(kind))));

    let standard = Scope::new();
    for (name, namespace) in namespaces {
        standard.define(name, Variable::constant(Value::Namespace(namespace)));
    }
    prelude.define("Std", Variable::constant(Value::Namespace(standard)));

    let assert = NativeFunction { name: "assert".to_string(),
                                  func: Rc::new(assert_truthy), };
    prelude.define("assert", Variable::constant(Value::Native(Rc::new(assert))));
}

/// Fails with a host error when the condition is falsey.
fn assert_truthy(arguments: &[Value], _: &Scope, interpreter: &mut Interpreter) -> EvalResult<Value> {
    let [condition] = arguments else {
        return Err(argument_error("assert", format!("expected exactly 1 argument, got {}", arguments.len())));
    };
    if condition.is_falsey() {
        return Err(RuntimeError::AssertionFailed { value: interpreter.render(condition) }.into());
    }
    Ok(Value::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_checks() {
        assert!(Arity::Exact(2).check(2));
        assert!(!Arity::Exact(2).check(1));
        assert!(Arity::AtLeast(0).check(0));
        assert!(!Arity::AtLeast(1).check(0));
    }

    #[test]
    fn prelude_lists_its_namespaces() {
        let prelude = Scope::new();
        install_prelude(&prelude);
        let Some(Value::Namespace(standard)) = prelude.get_own("Std").map(|binding| binding.borrow().value.clone())
        else {
            panic!("Std is not a namespace");
        };
        assert_eq!(standard.names(), ["Array", "Io", "Meta", "String"]);
    }
}
