use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, FunctionDef, Statement},
    error::{Error, EvalError, RuntimeError},
    interpreter::{
        evaluator::function::prelude::install_prelude,
        loader::{FsLoader, SourceLoader},
        parser::core::parse_source,
        scope::{Scope, Variable},
        types::Type,
        value::{Value, function::Function, key::ValueKey},
    },
    util::stack::ensure_sufficient_stack,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or an
/// `EvalError`: a raised script value or a host failure.
pub type EvalResult<T> = Result<T, EvalError>;

/// Default bound on nested `ext` inclusion.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Default bound on nested function calls.
pub const MAX_CALL_DEPTH: usize = 10_000;

/// Interpreter configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Total number of loop iterations one interpreter may run before failing.
    /// `None` means unbounded.
    pub iteration_limit:   Option<u64>,
    /// How deeply `ext` inclusions may nest.
    pub max_include_depth: usize,
    /// How deeply function calls may nest before the program fails.
    pub max_call_depth:    usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { iteration_limit:   None,
               max_include_depth: MAX_INCLUDE_DEPTH,
               max_call_depth:    MAX_CALL_DEPTH, }
    }
}

/// Stores the runtime state of one program.
///
/// Holds the global scope, the pointer arena with its literal cache, the
/// control-flow flags shared by blocks, loops and functions, and the name of
/// the file being run. An `ext` inclusion runs in a separate interpreter that
/// shares the loader and options.
pub struct Interpreter {
    pub(crate) globals:       Scope,
    /// Values reachable through pointers; a pointer is an index into it.
    pub(crate) arena:         Vec<Value>,
    /// Arena slots of literals taken by address, keyed structurally.
    pub(crate) literal_cache: HashMap<ValueKey, usize>,
    /// Set by `ret`; cleared by the function or `do` that consumes it.
    pub(crate) exit:          bool,
    pub(crate) brk:           bool,
    pub(crate) cnt:           bool,
    /// `true` for each loop entered, `false` for each function call, so `brk`
    /// and `cnt` only work when the innermost frame is a loop.
    pub(crate) loop_markers:  Vec<bool>,
    pub(crate) current_file:  Rc<str>,
    pub(crate) loader:        Rc<dyn SourceLoader>,
    pub(crate) options:       Options,
    pub(crate) iterations:    u64,
    /// Functions currently running.
    pub(crate) call_depth:    usize,
    /// Files being included, outermost first.
    pub(crate) include_chain: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter reading included files from disk, with default
    /// options.
    ///
    /// The globals are a child of a scope holding the native prelude, so
    /// programs may shadow prelude names and a namespace made from the
    /// globals only lists what the program declared.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    #[must_use]
    pub fn with_options(options: Options) -> Self {
        let prelude = Scope::new();
        install_prelude(&prelude);
        Self { globals: prelude.child(),
               arena: Vec::new(),
               literal_cache: HashMap::new(),
               exit: false,
               brk: false,
               cnt: false,
               loop_markers: Vec::new(),
               current_file: Rc::from("<main>"),
               loader: Rc::new(FsLoader),
               options,
               iterations: 0,
               call_depth: 0,
               include_chain: Vec::new() }
    }

    /// Replaces the loader used by `ext`.
    #[must_use]
    pub fn with_loader(mut self, loader: Rc<dyn SourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Names the file the program comes from. Functions remember it, and
    /// `ext` refuses to include it again.
    #[must_use]
    pub fn with_file(mut self, file: &str) -> Self {
        self.current_file = Rc::from(file);
        self.include_chain = vec![file.to_string()];
        self
    }

    /// A fresh interpreter for an included file, sharing loader and options.
    pub(crate) fn for_include(&self, path: &str) -> Self {
        let mut child = Self::with_options(self.options.clone());
        child.loader = Rc::clone(&self.loader);
        child.current_file = Rc::from(path);
        child.include_chain = self.include_chain.clone();
        child.include_chain.push(path.to_string());
        child
    }

    pub const fn globals(&self) -> &Scope {
        &self.globals
    }

    pub fn arena(&self) -> &[Value] {
        &self.arena
    }

    /// Renders a value, following pointers into this interpreter's arena.
    pub fn render(&self, value: &Value) -> String {
        value.render(&self.arena)
    }

    /// Parses and runs `source` in this interpreter's global scope.
    ///
    /// Globals persist between calls, which is what the REPL relies on.
    pub fn eval_source(&mut self, source: &str) -> Result<Value, Error> {
        let program = parse_source(source)?;
        let result = self.run_program(&program);
        self.exit = false;
        self.brk = false;
        self.cnt = false;
        self.loop_markers.clear();
        self.call_depth = 0;
        match result {
            Ok(value) => Ok(value),
            Err(EvalError::Host(err)) => Err(Error::Runtime(err)),
            Err(EvalError::Raised(value)) => Err(Error::Exception(self.render(&value))),
        }
    }

    /// Runs top-level statements in the global scope.
    ///
    /// Returns the value of the last statement executed. A top-level `ret`
    /// ends the program early with its value.
    pub fn run_program(&mut self, program: &[Statement]) -> EvalResult<Value> {
        tracing::debug!(file = %self.current_file, statements = program.len(), "running program");
        let globals = self.globals.clone();
        let (value, _) = self.run_statements(program, &globals)?;
        self.exit = false;
        Ok(value)
    }

    /// Runs `body` in a fresh child scope of `scope`.
    pub(crate) fn run_block(&mut self, body: &[Statement], scope: &Scope) -> EvalResult<Value> {
        Ok(self.run_statements(body, &scope.child())?.0)
    }

    /// Runs statements directly in `scope`.
    ///
    /// Stops after the statement that sets the exit, break or continue flag.
    /// Host errors leaving a statement are annotated with its line. Returns
    /// the last value and the line of the last statement executed.
    pub(crate) fn run_statements(&mut self, body: &[Statement], scope: &Scope) -> EvalResult<(Value, usize)> {
        let mut last = Value::None;
        let mut last_line = 0;
        for statement in body {
            last_line = statement.line();
            last = self.exec(statement, scope).map_err(|err| err.at_line(last_line))?;
            if self.exit || self.brk || self.cnt {
                break;
            }
        }
        Ok((last, last_line))
    }

    /// Executes a single statement.
    pub(crate) fn exec(&mut self, statement: &Statement, scope: &Scope) -> EvalResult<Value> {
        match statement {
            Statement::Expression { expr, .. } => self.eval(expr, scope),
            Statement::VariableDeclaration { name,
                                             mutable,
                                             ty,
                                             value,
                                             .. } => self.declare_variable(name, *mutable, ty, value, scope),
            Statement::Function(def) => {
                let fun = self.make_closure(def, scope);
                if let Some(name) = &def.name {
                    scope.define(name.as_str(), Variable::constant(fun.clone()));
                }
                Ok(fun)
            },
            Statement::Struct { decl, .. } => self.declare_struct(decl, scope),
            Statement::Tag { decl, .. } => Ok(Self::declare_tag(decl, scope)),
            Statement::Use { tree, .. } => {
                self.apply_use(tree, scope, scope)?;
                Ok(Value::None)
            },
            Statement::While { condition, body, .. } => self.eval_while(condition, body, scope),
            Statement::For { first,
                             second,
                             iterable,
                             body,
                             .. } => self.eval_for(first, second, iterable, body, scope),
            Statement::Return { value, .. } => {
                let value = self.eval(value, scope)?;
                self.exit = true;
                Ok(value)
            },
            Statement::Raise { value, .. } => Err(EvalError::Raised(self.eval(value, scope)?)),
            Statement::Break { .. } => {
                self.check_in_loop("brk")?;
                self.brk = true;
                Ok(Value::None)
            },
            Statement::Continue { .. } => {
                self.check_in_loop("cnt")?;
                self.cnt = true;
                Ok(Value::None)
            },
        }
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation; it dispatches
    /// on the expression variant to the per-concern `impl` blocks. The stack
    /// grows as needed, so only `Options::max_call_depth` bounds recursion.
    pub fn eval(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr(expr, scope))
    }

    fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            Expr::Variable { name, .. } => match scope.lookup(name) {
                Some(binding) => Ok(binding.borrow().value.clone()),
                None => Err(RuntimeError::UnknownVariable { name: name.clone() }.into()),
            },
            Expr::UnaryOp { op, expr, .. } => self.eval_unary(*op, expr, scope),
            Expr::BinaryOp { left, op, right, .. } => self.eval_binary(left, *op, right, scope),
            Expr::Assign { target, value, .. } => self.eval_assign(target, value, scope),
            Expr::Call { callee, arguments, .. } => self.eval_call(callee, arguments, scope),
            Expr::Member { object, member, .. } => self.eval_member(object, member, scope),
            Expr::ArrayLiteral { elements, .. } => {
                let items = elements.iter()
                                    .map(|element| self.eval(element, scope))
                                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::from(items))
            },
            Expr::RecordLiteral { name: Some(name),
                                  entries,
                                  .. } => self.eval_struct_literal(name, entries, scope),
            Expr::RecordLiteral { name: None, entries, .. } => self.eval_record(entries, scope),
            Expr::Function(def) => Ok(self.make_closure(def, scope)),
            Expr::Do { body, .. } => {
                let value = self.run_block(body, scope)?;
                self.exit = false;
                Ok(value)
            },
            Expr::Catch { expr, name, body, .. } => self.eval_catch(expr, name, body, scope),
            Expr::Ext { path, line } => self.eval_ext(path, *line, scope),
            Expr::If { condition,
                       then_branch,
                       else_branch,
                       .. } => self.eval_if(condition, then_branch, else_branch.as_ref(), scope),
            Expr::Match { subject,
                          arms,
                          default,
                          .. } => self.eval_match(subject, arms, default.as_deref(), scope),
        }
    }

    /// Wraps a definition into a closure over `scope`.
    pub(crate) fn make_closure(&self, def: &Rc<FunctionDef>, scope: &Scope) -> Value {
        Value::Fun(Rc::new(Function { def:   Rc::clone(def),
                                      scope: scope.clone(),
                                      file:  Rc::clone(&self.current_file), }))
    }

    fn check_in_loop(&self, keyword: &'static str) -> EvalResult<()> {
        if self.loop_markers.last() == Some(&true) {
            Ok(())
        } else {
            Err(RuntimeError::IllegalControlFlow { keyword }.into())
        }
    }

    /// Counts one loop iteration against the configured limit.
    pub(crate) fn tick(&mut self) -> EvalResult<()> {
        self.iterations += 1;
        match self.options.iteration_limit {
            Some(limit) if self.iterations > limit => Err(RuntimeError::IterationLimit { limit }.into()),
            _ => Ok(()),
        }
    }

    /// Binds `name` in `scope` after checking `ty` against `value`.
    fn declare_variable(&mut self,
                        name: &str,
                        mutable: bool,
                        ty: &Type,
                        value: &Expr,
                        scope: &Scope)
                        -> EvalResult<Value> {
        let value = self.eval(value, scope)?;
        if scope.contains_own(name) {
            return Err(RuntimeError::Redeclaration { name:  name.to_string(),
                                                     value: self.render(&value), }.into());
        }
        if !self.satisfies(&value, ty, scope) {
            return Err(RuntimeError::BindingTypeMismatch { name:     name.to_string(),
                                                           expected: ty.to_string(),
                                                           value:    self.render(&value), }.into());
        }
        scope.define(name, Variable { mutable,
                                      ty: ty.clone(),
                                      value: value.clone() });
        Ok(value)
    }
}
