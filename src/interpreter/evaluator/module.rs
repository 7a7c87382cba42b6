use crate::{
    ast::{Expr, UseTree},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        parser::core::parse_source,
        scope::{Binding, Scope},
        value::Value,
    },
};

impl Interpreter {
    /// Executes a `use` tree: every named binding reached from `lookup` is
    /// shared into `target` under its own name or its alias.
    ///
    /// The binding itself is shared, not copied, so later assignments through
    /// either name are visible through the other.
    pub(crate) fn apply_use(&self, tree: &UseTree, lookup: &Scope, target: &Scope) -> EvalResult<()> {
        match tree {
            UseTree::Name { name, alias } | UseTree::Path { name, alias, .. } => {
                let binding = self.resolve_use(tree, lookup)?;
                target.insert_binding(alias.as_ref().unwrap_or(name).as_str(), binding);
            },
            UseTree::Expand { left, members } => {
                let namespace = self.resolve_namespace(left, lookup)?;
                for member in members {
                    self.apply_use(member, &namespace, target)?;
                }
            },
        }
        Ok(())
    }

    fn resolve_use(&self, tree: &UseTree, lookup: &Scope) -> EvalResult<Binding> {
        let (found, name) = match tree {
            UseTree::Name { name, .. } => (lookup.lookup(name), name),
            UseTree::Path { left, name, .. } => (self.resolve_namespace(left, lookup)?.get_own(name), name),
            UseTree::Expand { .. } => return Err(RuntimeError::type_error("cannot use a group as a value").into()),
        };
        found.ok_or_else(|| RuntimeError::UseNotFound { name: name.clone() }.into())
    }

    fn resolve_namespace(&self, tree: &UseTree, lookup: &Scope) -> EvalResult<Scope> {
        let binding = self.resolve_use(tree, lookup)?;
        let value = binding.borrow().value.clone();
        match value {
            Value::Namespace(namespace) => Ok(namespace),
            _ => Err(RuntimeError::NotANamespace { name: use_name(tree).to_string() }.into()),
        }
    }

    /// Evaluates `ext path`.
    ///
    /// The file runs to completion in a separate interpreter that shares only
    /// the loader and options with this one; its globals come back as a
    /// namespace. Host errors inside the file are annotated with the path
    /// and the line of the `ext`.
    pub(crate) fn eval_ext(&mut self, path: &Expr, line: usize, scope: &Scope) -> EvalResult<Value> {
        let path = match self.eval(path, scope)? {
            Value::String(path) => path,
            other => return Err(RuntimeError::ExpectedIncludePath { value: self.render(&other) }.into()),
        };
        if self.include_chain.contains(&path) {
            return Err(RuntimeError::CyclicInclude { path }.into());
        }
        if self.include_chain.len() >= self.options.max_include_depth {
            return Err(RuntimeError::IncludeDepthExceeded { depth: self.options.max_include_depth }.into());
        }

        tracing::debug!(%path, line, "including file");
        self.include(&path).map_err(|err| err.included(&path, line))
    }

    fn include(&self, path: &str) -> EvalResult<Value> {
        let source = self.loader
                         .read_text(path)
                         .map_err(|err| RuntimeError::Io { path:    path.to_string(),
                                                           message: err.to_string(), })?;
        let program = parse_source(&source).map_err(RuntimeError::Parse)?;
        let mut included = self.for_include(path);
        included.run_program(&program)?;
        Ok(Value::Namespace(included.globals))
    }
}

fn use_name(tree: &UseTree) -> &str {
    match tree {
        UseTree::Name { name, .. } | UseTree::Path { name, .. } => name,
        UseTree::Expand { left, .. } => use_name(left),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::loader::MemoryLoader;

    fn interpreter(files: &[(&str, &str)]) -> Interpreter {
        let loader = files.iter()
                          .fold(MemoryLoader::new(), |loader, (path, source)| loader.with_file(path, source));
        Interpreter::new().with_loader(Rc::new(loader))
    }

    #[test]
    fn included_globals_form_a_namespace() {
        let mut interpreter = interpreter(&[("lib.nk", "let answer = 42\nlet twice = fun(x) { ret x * 2 }")]);
        let value = interpreter.eval_source("let lib = ext \"lib.nk\"\nlib::twice(lib::answer)")
                               .expect("include failed");
        assert_eq!(value, Value::from(84.0));
    }

    #[test]
    fn cyclic_includes_fail() {
        let mut interpreter = interpreter(&[("a.nk", "ext \"b.nk\""), ("b.nk", "ext \"a.nk\"")]);
        let err = interpreter.eval_source("ext \"a.nk\"").expect_err("cycle was not detected");
        assert!(err.to_string().contains("cyclic include of a.nk"));
    }

    #[test]
    fn errors_name_the_included_file() {
        let mut interpreter = interpreter(&[("bad.nk", "\nmissing")]);
        let err = interpreter.eval_source("ext \"bad.nk\"").expect_err("error was swallowed");
        assert_eq!(err.to_string(),
                   "EXCEPTION: unknown variable 'missing' (line 2) (in file bad.nk, externally included at line 1) \
                    (line 1)");
    }

    #[test]
    fn use_shares_bindings() {
        let mut interpreter = interpreter(&[]);
        let source = "use Std::{Array::len as size, Io}\nsize([1, 2, 3])";
        let value = interpreter.eval_source(source).expect("use failed");
        assert_eq!(value, Value::from(3.0));
        assert!(interpreter.globals().contains_own("Io"));
    }

    #[test]
    fn use_through_a_value_fails() {
        let mut interpreter = interpreter(&[]);
        let err = interpreter.eval_source("let x = 1\nuse x::y").expect_err("use through a number");
        assert!(err.to_string().contains("x is not a namespace"));
    }
}
