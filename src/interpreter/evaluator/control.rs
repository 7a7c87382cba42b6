use crate::{
    ast::{ElseBranch, Expr, MatchArm, Member, Statement},
    error::EvalError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        scope::{Scope, Variable},
        types::Type,
        value::{Value, entity::TagInstance},
    },
};

impl Interpreter {
    /// Evaluates an `if` chain.
    ///
    /// The condition is evaluated in a fresh child scope and the `then` body
    /// runs in that same scope. `els if` continues in `scope`; `els` runs in
    /// its own child scope. Without a matching branch the result is `none`.
    pub(crate) fn eval_if(&mut self,
                          condition: &Expr,
                          then_branch: &[Statement],
                          else_branch: Option<&ElseBranch>,
                          scope: &Scope)
                          -> EvalResult<Value> {
        let branch_scope = scope.child();
        if !self.eval(condition, &branch_scope)?.is_falsey() {
            return Ok(self.run_statements(then_branch, &branch_scope)?.0);
        }
        match else_branch {
            Some(ElseBranch::If(next)) => self.eval(next, scope),
            Some(ElseBranch::Block(body)) => self.run_block(body, scope),
            None => Ok(Value::None),
        }
    }

    /// Evaluates `whl condition { body }`.
    ///
    /// The condition is evaluated in `scope` before every iteration, the body
    /// in a fresh child scope. Returns the value of the last body run.
    pub(crate) fn eval_while(&mut self, condition: &Expr, body: &[Statement], scope: &Scope) -> EvalResult<Value> {
        self.loop_markers.push(true);
        let result = self.run_while(condition, body, scope);
        self.loop_markers.pop();
        self.brk = false;
        self.cnt = false;
        result
    }

    fn run_while(&mut self, condition: &Expr, body: &[Statement], scope: &Scope) -> EvalResult<Value> {
        let mut last = Value::None;
        while !self.eval(condition, scope)?.is_falsey() {
            self.tick()?;
            last = self.run_block(body, scope)?;
            if self.brk || self.exit {
                break;
            }
            self.cnt = false;
        }
        Ok(last)
    }

    /// Evaluates `expr cat name { body }`.
    ///
    /// A value raised with `err` while evaluating `expr` is bound to `name`
    /// in a fresh scope and the handler runs there. Host errors pass through.
    pub(crate) fn eval_catch(&mut self,
                             expr: &Expr,
                             name: &str,
                             body: &[Statement],
                             scope: &Scope)
                             -> EvalResult<Value> {
        match self.eval(expr, scope) {
            Err(EvalError::Raised(raised)) => {
                tracing::trace!(value = %self.render(&raised), "caught exception");
                let handler = scope.child();
                handler.define(name, Variable::constant(raised));
                Ok(self.run_statements(body, &handler)?.0)
            },
            other => other,
        }
    }

    /// Evaluates `mat subject { patterns { body } ... _ { default } }`.
    ///
    /// Arms are tried in source order and the first matching pattern wins.
    /// Patterns compare by structural equality, except that a tag subject
    /// matched against `Tag::Variant` or `Tag::Variant(name)` matches by
    /// variant, the latter binding the payload to `name`.
    pub(crate) fn eval_match(&mut self,
                             subject: &Expr,
                             arms: &[MatchArm],
                             default: Option<&[Statement]>,
                             scope: &Scope)
                             -> EvalResult<Value> {
        let subject = self.eval(subject, scope)?;
        for arm in arms {
            for pattern in &arm.patterns {
                if let Some(arm_scope) = self.match_pattern(&subject, pattern, scope)? {
                    return Ok(self.run_statements(&arm.body, &arm_scope)?.0);
                }
            }
        }
        match default {
            Some(body) => self.run_block(body, scope),
            None => Ok(Value::None),
        }
    }

    /// Returns the scope the arm body runs in when `pattern` matches.
    fn match_pattern(&mut self, subject: &Value, pattern: &Expr, scope: &Scope) -> EvalResult<Option<Scope>> {
        if let Value::Tag(tag) = subject {
            match pattern {
                Expr::Member { object,
                               member: Member::Namespace(variant),
                               .. } => {
                    let parent = self.eval(object, scope)?;
                    let matched = is_parent(&parent, tag) && tag.variant == *variant && tag.payload.is_none();
                    return Ok(matched.then(|| scope.child()));
                },
                Expr::Call { callee, arguments, .. } if arguments.len() == 1 => {
                    if let Expr::Member { object,
                                          member: Member::Namespace(variant),
                                          .. } = callee.as_ref()
                    {
                        let parent = self.eval(object, scope)?;
                        let Some(payload) = &tag.payload else { return Ok(None) };
                        if !is_parent(&parent, tag) || tag.variant != *variant {
                            return Ok(None);
                        }
                        let arm_scope = scope.child();
                        match &arguments[0] {
                            Expr::Variable { name, .. } => {
                                let ty = tag.parent.payload.get(variant).cloned().unwrap_or(Type::Any);
                                arm_scope.define(name.as_str(),
                                                 Variable { mutable: true,
                                                            ty,
                                                            value: payload.clone() });
                            },
                            expected => {
                                if self.eval(expected, scope)? != *payload {
                                    return Ok(None);
                                }
                            },
                        }
                        return Ok(Some(arm_scope));
                    }
                },
                _ => {},
            }
        }
        let value = self.eval(pattern, scope)?;
        Ok((value == *subject).then(|| scope.child()))
    }
}

fn is_parent(parent: &Value, tag: &TagInstance) -> bool {
    matches!(parent, Value::StaticTag(static_tag) if static_tag.same_shape(&tag.parent))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::parser::core::parse_source;

    fn run(source: &str) -> EvalResult<Value> {
        let program = parse_source(source).expect("parse failed");
        Interpreter::new().run_program(&program)
    }

    #[test]
    fn first_matching_arm_wins() {
        let value = run("mat 2 { 1, 2 { \"low\" } 2 { \"two\" } _ { \"other\" } }").expect("match failed");
        assert_eq!(value, Value::from("low"));
    }

    #[test]
    fn default_arm_runs_last() {
        let value = run("mat 9 { 1 { \"one\" } _ { \"other\" } }").expect("match failed");
        assert_eq!(value, Value::from("other"));
        assert_eq!(run("mat 9 { 1 { \"one\" } }").expect("match failed"), Value::None);
    }

    #[test]
    fn matched_payloads_are_mutable_and_typed() {
        let decl = "tag T { A, B(Number) }\n";
        let value = run(&format!("{decl}mat T::B(5) {{\n  T::B(v) {{\n    v = v + 1\n    v\n  }}\n}}"))
            .expect("payload reassignment failed");
        assert_eq!(value, Value::from(6.0));

        let err = run(&format!("{decl}mat T::B(5) {{\n  T::B(v) {{ v = \"six\" }}\n}}"))
            .expect_err("payload type was not checked");
        assert!(err.to_string().contains("does not satisfy its type Number"), "{err}");
    }

    #[test]
    fn break_leaves_the_innermost_loop() {
        let source = "mut n = 0\nwhl true { n += 1\nif n == 3 { brk } }\nn";
        assert_eq!(run(source).expect("loop failed"), Value::from(3.0));
    }

    #[test]
    fn host_errors_are_not_caught() {
        let err = run("do { missing } cat e { 1 }").expect_err("host error was caught");
        assert!(matches!(err, EvalError::Host(_)));
    }

    #[test]
    fn brk_outside_a_loop_fails() {
        let err = run("fun f() { brk }\nwhl true { f() }").expect_err("brk escaped its function");
        assert!(err.to_string().contains("can only use 'brk' inside whl & for loops"));
    }
}
