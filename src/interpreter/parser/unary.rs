use std::rc::Rc;

use crate::{
    ast::{Expr, LiteralValue, Member, UnaryOperator},
    interpreter::{
        lexer::Token,
        parser::{
            block::parse_block,
            core::{ParseResult, Restrictions, TokenStream, parse_expression, parse_if, parse_match},
            statement::parse_function_rest,
            utils::{consume_if, expect, parse_identifier, parse_separated, unexpected},
        },
    },
    util::stack::ensure_sufficient_stack,
};

/// Parses prefix operators.
///
/// `&&x` is read as `&(&x)`.
///
/// The rule is: `unary := ("!" | "-" | "*" | "&" | "&&") unary | call_member`
pub fn parse_unary<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    ensure_sufficient_stack(|| parse_prefix(tokens))
}

fn parse_prefix<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.peek() else {
        return parse_call_member(tokens);
    };
    let line = *line;
    let op = match token {
        Token::Bang => UnaryOperator::Not,
        Token::Minus => UnaryOperator::Negate,
        Token::Star => UnaryOperator::Deref,
        Token::Ampersand => UnaryOperator::AddressOf,
        Token::DoubleAmpersand => {
            tokens.next();
            let inner = Expr::UnaryOp { op: UnaryOperator::AddressOf,
                                        expr: Box::new(parse_unary(tokens)?),
                                        line };
            return Ok(Expr::UnaryOp { op: UnaryOperator::AddressOf,
                                      expr: Box::new(inner),
                                      line });
        },
        _ => return parse_call_member(tokens),
    };
    tokens.next();
    let expr = parse_unary(tokens)?;
    Ok(Expr::UnaryOp { op,
                       expr: Box::new(expr),
                       line })
}

/// Parses calls and member accesses following a primary expression.
///
/// Call arguments are parsed with constant folding disabled. `a:b` is not
/// recognised inside record keys, where `:` separates key and value.
///
/// The rule is:
/// `call_member := primary ("(" args ")" | "[" expr "]" | "." id | "::" id | ":" id)*`
pub fn parse_call_member<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut expr = parse_primary(tokens)?;
    while let Some((token, line)) = tokens.peek() {
        let line = *line;
        let member = match token {
            Token::LParen => {
                tokens.next();
                let arguments = tokens.without_folding(|tokens| {
                                          tokens.with_restrictions(Restrictions::NONE, |tokens| {
                                                    parse_separated(tokens,
                                                                    parse_expression,
                                                                    &Token::RParen,
                                                                    "')' closing the arguments")
                                                })
                                      })?;
                expr = Expr::Call { callee: Box::new(expr),
                                    arguments,
                                    line };
                continue;
            },
            Token::LBracket => {
                tokens.next();
                let index = tokens.with_restrictions(Restrictions::NONE, parse_expression)?;
                expect(tokens, &Token::RBracket, "']' closing the index")?;
                Member::Computed(Box::new(index))
            },
            Token::Dot => {
                tokens.next();
                Member::Field(parse_identifier(tokens, "a field name after '.'")?.0)
            },
            Token::ColonColon => {
                tokens.next();
                Member::Namespace(parse_identifier(tokens, "a name after '::'")?.0)
            },
            Token::Colon if !tokens.restrictions.no_call_self => {
                tokens.next();
                Member::CallSelf(parse_identifier(tokens, "a method name after ':'")?.0)
            },
            _ => break,
        };
        expr = Expr::Member { object: Box::new(expr),
                              member,
                              line };
    }
    Ok(expr)
}

/// Parses literals, names, grouping and the keyword-introduced expressions.
fn parse_primary<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.next() else {
        return Err(unexpected(None, "an expression", tokens.last_line()));
    };
    let line = *line;
    let literal = |value: LiteralValue| -> ParseResult<Expr> { Ok(Expr::Literal { value, line }) };

    match token {
        Token::Number(n) => literal(LiteralValue::Number(*n)),
        Token::Str(s) => literal(LiteralValue::String(s.clone())),
        Token::True => literal(LiteralValue::Bool(true)),
        Token::False => literal(LiteralValue::Bool(false)),
        Token::NoneLiteral => literal(LiteralValue::None),
        Token::Identifier(name) => {
            if !tokens.restrictions.no_struct_literal && consume_if(tokens, &Token::LBrace) {
                return parse_record_body(tokens, Some(name.clone()), line);
            }
            Ok(Expr::Variable { name: name.clone(),
                                line })
        },
        Token::LParen => {
            let expr = tokens.with_restrictions(Restrictions::NONE, parse_expression)?;
            expect(tokens, &Token::RParen, "')' closing the group")?;
            Ok(expr)
        },
        Token::LBracket => {
            let elements = tokens.with_restrictions(Restrictions::NONE, |tokens| {
                                     parse_separated(tokens, parse_expression, &Token::RBracket, "']' closing the array")
                                 })?;
            Ok(Expr::ArrayLiteral { elements, line })
        },
        Token::LBrace => parse_record_body(tokens, None, line),
        Token::Fun => Ok(Expr::Function(Rc::new(parse_function_rest(tokens, None, line)?))),
        Token::Do => Ok(Expr::Do { body: parse_block(tokens)?,
                                   line }),
        Token::If => parse_if(tokens, line),
        Token::Mat => parse_match(tokens, line),
        Token::Ext => Ok(Expr::Ext { path: Box::new(parse_primary(tokens)?),
                                     line }),
        _ => Err(unexpected(Some(&(token.clone(), line)), "an expression", line)),
    }
}

/// Parses the entries of a record literal after its opening brace.
///
/// Each entry is `key value`, optionally separated by `->` or `:`, and
/// entries are separated by optional commas. A bare identifier key names a
/// field rather than a variable.
fn parse_record_body<'a, I>(tokens: &mut TokenStream<'a, I>,
                            name: Option<String>,
                            line: usize)
                            -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut entries = Vec::new();
    loop {
        match tokens.peek() {
            Some((Token::RBrace, _)) => {
                tokens.next();
                break;
            },
            Some(_) => {
                let key = parse_record_key(tokens)?;
                if !consume_if(tokens, &Token::Arrow) {
                    consume_if(tokens, &Token::Colon);
                }
                let value = tokens.with_restrictions(Restrictions::NONE, parse_expression)?;
                entries.push((key, value));
                consume_if(tokens, &Token::Comma);
            },
            None => return Err(unexpected(None, "'}' closing the record", tokens.last_line())),
        }
    }
    Ok(Expr::RecordLiteral { name,
                             entries,
                             line })
}

fn parse_record_key<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if let Some((Token::Identifier(name), line)) = tokens.peek()
       && matches!(tokens.peek_nth(1), Some((Token::Colon | Token::Arrow, _)))
    {
        tokens.next();
        return Ok(Expr::Variable { name: name.clone(),
                                   line: *line });
    }
    tokens.with_restrictions(Restrictions::RECORD_KEY, parse_expression)
}
