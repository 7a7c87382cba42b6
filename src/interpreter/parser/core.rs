use std::iter::Peekable;

use crate::{
    ast::{ElseBranch, Expr, MatchArm, Statement},
    error::ParseError,
    interpreter::{
        lexer::{Lexer, Token},
        parser::{
            binary::parse_catch,
            block::parse_block,
            fold::fold,
            statement::parse_statement,
            utils::{consume_if, unexpected},
        },
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Context-dependent limits on what an expression may contain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Restrictions {
    /// `Name {` is not a struct literal. Set for conditions, iterables and
    /// match patterns, where the brace opens the body instead.
    pub no_struct_literal: bool,
    /// `:` ends the expression instead of starting a call-self member. Set
    /// for record keys.
    pub no_call_self:      bool,
}

impl Restrictions {
    pub const CONDITION: Self = Self { no_struct_literal: true,
                                       no_call_self:      false };
    pub const NONE: Self = Self { no_struct_literal: false,
                                  no_call_self:      false };
    pub const RECORD_KEY: Self = Self { no_struct_literal: false,
                                        no_call_self:      true };
}

/// A peekable token stream that also carries the parser's mode flags.
pub struct TokenStream<'a, I>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    tokens:                  Peekable<I>,
    last_line:               usize,
    pub(super) allow_folding: bool,
    pub(super) restrictions: Restrictions,
    /// A `>>` was read where only its first `>` was wanted.
    pub(super) split_greater: bool,
}

impl<'a, I> TokenStream<'a, I> where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    pub fn new(tokens: I) -> Self {
        Self { tokens:        tokens.peekable(),
               last_line:     1,
               allow_folding: true,
               restrictions:  Restrictions::NONE,
               split_greater: false, }
    }

    pub fn peek(&mut self) -> Option<&'a (Token, usize)> {
        self.tokens.peek().copied()
    }

    /// Looks `n` tokens past the next one without consuming anything.
    pub fn peek_nth(&self, n: usize) -> Option<&'a (Token, usize)> {
        self.tokens.clone().nth(n)
    }

    pub fn next(&mut self) -> Option<&'a (Token, usize)> {
        let token = self.tokens.next();
        if let Some((_, line)) = token {
            self.last_line = *line;
        }
        token
    }

    /// The line of the next token, or of the last one when input is exhausted.
    pub fn line(&mut self) -> usize {
        match self.tokens.peek() {
            Some((_, line)) => *line,
            None => self.last_line,
        }
    }

    pub const fn last_line(&self) -> usize {
        self.last_line
    }

    /// Runs `parse` under `restrictions`, restoring the previous ones after.
    pub fn with_restrictions<T>(&mut self,
                                restrictions: Restrictions,
                                parse: impl FnOnce(&mut Self) -> ParseResult<T>)
                                -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.restrictions, restrictions);
        let result = parse(self);
        self.restrictions = saved;
        result
    }

    /// Runs `parse` with constant folding disabled, restoring the flag after.
    pub fn without_folding<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.allow_folding, false);
        let result = parse(self);
        self.allow_folding = saved;
        result
    }
}

/// Lexes and parses a complete program.
pub fn parse_source(source: &str) -> ParseResult<Vec<Statement>> {
    let tokens = Lexer::new(source).tokenize()?;
    parse_program(&tokens)
}

/// Parses a whole token sequence into top-level statements.
pub fn parse_program(tokens: &[(Token, usize)]) -> ParseResult<Vec<Statement>> {
    let mut stream = TokenStream::new(tokens.iter());
    let mut statements = Vec::new();
    while stream.peek().is_some() {
        statements.push(parse_statement(&mut stream)?);
    }
    Ok(statements)
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing. It begins at the lowest
/// precedence level, `cat`, and descends through the precedence hierarchy.
/// A trailing `;` is consumed. Unless folding is disabled (it is while
/// parsing call arguments), arithmetic on number literals is folded into a
/// single literal.
///
/// Grammar: `expression := catch ";"?`
pub fn parse_expression<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let expr = parse_catch(tokens)?;
    consume_if(tokens, &Token::Semicolon);
    Ok(if tokens.allow_folding { fold(expr) } else { expr })
}

/// Parses an `if` expression with optional `els` and chained `els if`.
///
/// Syntax:
/// ```text
///     if <condition> { ... }
///     els if <condition> { ... }
///     els { ... }
/// ```
/// The condition may not contain a bare struct literal, since its `{` opens
/// the body.
pub fn parse_if<'a, I>(tokens: &mut TokenStream<'a, I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let condition = tokens.with_restrictions(Restrictions::CONDITION, parse_expression)?;
    let then_branch = parse_block(tokens)?;

    let else_branch = if consume_if(tokens, &Token::Els) {
        match tokens.peek() {
            Some((Token::If, if_line)) => {
                tokens.next();
                Some(ElseBranch::If(Box::new(parse_if(tokens, *if_line)?)))
            },
            Some((Token::LBrace, _)) => Some(ElseBranch::Block(parse_block(tokens)?)),
            found => return Err(unexpected(found, "'if' or '{' after 'els'", tokens.last_line())),
        }
    } else {
        None
    };

    Ok(Expr::If { condition: Box::new(condition),
                  then_branch,
                  else_branch,
                  line })
}

/// Parses a `mat` expression.
///
/// ```text
///     mat <subject> {
///         <pattern>, <pattern> { ... }
///         _ { ... }
///     }
/// ```
/// Patterns of one arm are separated by optional commas and end at the `{`
/// of the arm body.
pub fn parse_match<'a, I>(tokens: &mut TokenStream<'a, I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let subject = tokens.with_restrictions(Restrictions::CONDITION, parse_expression)?;
    match tokens.next() {
        Some((Token::LBrace, _)) => {},
        found => return Err(unexpected(found, "'{' after match subject", tokens.last_line())),
    }

    let mut arms = Vec::new();
    let mut default = None;
    loop {
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some((Token::Identifier(name), _)) if name == "_" => {
                tokens.next();
                default = Some(parse_block(tokens)?);
            },
            Some(_) => {
                let mut patterns = Vec::new();
                loop {
                    patterns.push(tokens.with_restrictions(Restrictions::CONDITION, parse_expression)?);
                    consume_if(tokens, &Token::Comma);
                    if matches!(tokens.peek(), Some((Token::LBrace, _)) | None) {
                        break;
                    }
                }
                let body = parse_block(tokens)?;
                arms.push(MatchArm { patterns, body });
            },
            None => return Err(unexpected(None, "'}' closing the match", tokens.last_line())),
        }
    }

    Ok(Expr::Match { subject: Box::new(subject),
                     arms,
                     default,
                     line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{BinaryOperator, LiteralValue, Member, UnaryOperator};

    fn expression(source: &str) -> Expr {
        let program = parse_source(source).expect("parse failed");
        match program.into_iter().next() {
            Some(Statement::Expression { expr, .. }) => expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    fn number(value: f64) -> Expr {
        Expr::Literal { value: LiteralValue::Number(value),
                        line:  1 }
    }

    #[test]
    fn arithmetic_on_literals_is_folded() {
        assert_eq!(expression("2 + 3 * 4"), number(14.0));
        assert_eq!(expression("(1 << 4) | 1"), number(17.0));
    }

    #[test]
    fn call_arguments_are_not_folded() {
        let Expr::Call { arguments, .. } = expression("f(2 + 3)") else { panic!("expected a call") };
        assert!(matches!(arguments[0], Expr::BinaryOp { op: BinaryOperator::Add, .. }));
    }

    #[test]
    fn folding_resumes_after_call_arguments() {
        let Expr::BinaryOp { right, .. } = expression("f(1 + 1) + (2 * 2)") else {
            panic!("expected a binary operation")
        };
        assert_eq!(*right, number(4.0));
    }

    #[test]
    fn power_binds_tighter_than_product() {
        assert_eq!(expression("2 * 3 ^ 2"), number(18.0));
    }

    #[test]
    fn address_of_stops_before_star() {
        let program = parse_source("&3 *p = 4").expect("parse failed");
        assert_eq!(program.len(), 2);
        assert!(matches!(&program[0],
                         Statement::Expression { expr: Expr::UnaryOp { op: UnaryOperator::AddressOf, .. }, .. }));
        let Statement::Expression { expr: Expr::Assign { target, .. }, .. } = &program[1] else {
            panic!("expected an assignment")
        };
        assert!(matches!(**target, Expr::UnaryOp { op: UnaryOperator::Deref, .. }));
    }

    #[test]
    fn parenthesized_address_of_multiplies() {
        assert!(matches!(expression("(&x) * 2"), Expr::BinaryOp { op: BinaryOperator::Mul, .. }));
    }

    #[test]
    fn compound_assignment_desugars() {
        let Expr::Assign { target, value, .. } = expression("x += 2") else { panic!("expected an assignment") };
        assert!(matches!(*target, Expr::Variable { ref name, .. } if name == "x"));
        assert!(matches!(*value, Expr::BinaryOp { op: BinaryOperator::Add, .. }));
    }

    #[test]
    fn condition_braces_open_the_body() {
        let Expr::If { condition, then_branch, .. } = expression("if ready { 1 } els { 2 }") else {
            panic!("expected an if")
        };
        assert!(matches!(*condition, Expr::Variable { .. }));
        assert_eq!(then_branch.len(), 1);
    }

    #[test]
    fn struct_literal_with_colons() {
        let Expr::RecordLiteral { name, entries, .. } = expression("P{x: 1, y: 2}") else {
            panic!("expected a struct literal")
        };
        assert_eq!(name.as_deref(), Some("P"));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn member_chains() {
        let Expr::Call { callee, .. } = expression("a::b.c[0]:d()") else { panic!("expected a call") };
        let Expr::Member { member: Member::CallSelf(name), object, .. } = *callee else {
            panic!("expected a call-self member")
        };
        assert_eq!(name, "d");
        assert!(matches!(*object, Expr::Member { member: Member::Computed(_), .. }));
    }

    #[test]
    fn match_arms_collect_patterns() {
        let Expr::Match { arms, default, .. } = expression("mat x { 1, 2 { a } 3 { b } _ { c } }") else {
            panic!("expected a match")
        };
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].patterns.len(), 2);
        assert!(default.is_some());
    }

    #[test]
    fn missing_closing_brace_is_reported() {
        let err = parse_source("if x {\n 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { line: 2, .. }));
    }

    #[test]
    fn stray_token_is_reported_with_line() {
        let err = parse_source("let a = 1\nlet = 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 2, .. }));
    }
}
