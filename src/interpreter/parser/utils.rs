use crate::{
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, TokenStream},
    },
};

/// Builds the error for a token that is not what the parser expected, or for
/// running out of tokens.
pub(in crate::interpreter::parser) fn unexpected(found: Option<&(Token, usize)>,
                                                 expected: &str,
                                                 last_line: usize)
                                                 -> ParseError {
    match found {
        Some((token, line)) => ParseError::UnexpectedToken { token:    format!("{token:?}"),
                                                             expected: expected.to_string(),
                                                             line:     *line, },
        None => ParseError::UnexpectedEndOfInput { expected: expected.to_string(),
                                                   line:     last_line, },
    }
}

/// Consumes the next token if it equals `token`.
pub(in crate::interpreter::parser) fn consume_if<'a, I>(tokens: &mut TokenStream<'a, I>, token: &Token) -> bool
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if let Some((next, _)) = tokens.peek()
       && next == token
    {
        tokens.next();
        return true;
    }
    false
}

/// Consumes `token` or fails, returning its line.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut TokenStream<'a, I>,
                                                    token: &Token,
                                                    expected: &str)
                                                    -> ParseResult<usize>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((next, line)) if next == token => Ok(*line),
        found => Err(unexpected(found, expected, tokens.last_line())),
    }
}

/// Parses an identifier, returning its name and line.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut TokenStream<'a, I>,
                                                              expected: &str)
                                                              -> ParseResult<(String, usize)>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.next() {
        Some((Token::Identifier(name), line)) => Ok((name.clone(), *line)),
        found => Err(unexpected(found, expected, tokens.last_line())),
    }
}

/// Parses items until `closing`, with optional commas between them.
///
/// This utility is shared by array literals, call arguments, tuple types and
/// `use` expansions. An immediately encountered closing token produces an
/// empty list.
///
/// Grammar (simplified): `list := (item ","?)* closing`
pub(in crate::interpreter::parser) fn parse_separated<'a, I, T>(
    tokens: &mut TokenStream<'a, I>,
    mut parse_item: impl FnMut(&mut TokenStream<'a, I>) -> ParseResult<T>,
    closing: &Token,
    expected: &str)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    loop {
        match tokens.peek() {
            Some((token, _)) if token == closing => {
                tokens.next();
                return Ok(items);
            },
            Some(_) => {
                items.push(parse_item(tokens)?);
                consume_if(tokens, &Token::Comma);
            },
            None => return Err(unexpected(None, expected, tokens.last_line())),
        }
    }
}
