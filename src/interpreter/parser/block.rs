use crate::{
    ast::Statement,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, Restrictions, TokenStream},
            statement::parse_statement,
            utils::{expect, unexpected},
        },
    },
};

/// Parses a block delimited by braces.
///
/// A block consists of zero or more statements. Parsing continues until a
/// closing `}` token is encountered. Restrictions from an enclosing
/// condition do not reach into the block.
///
/// Grammar: `block := "{" statement* "}"`
pub fn parse_block<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Vec<Statement>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LBrace, "'{' opening a block")?;
    tokens.with_restrictions(Restrictions::NONE, |tokens| {
              let mut statements = Vec::new();
              loop {
                  match tokens.peek() {
                      Some((Token::RBrace, _)) => {
                          tokens.next();
                          return Ok(statements);
                      },
                      Some(_) => statements.push(parse_statement(tokens)?),
                      None => return Err(unexpected(None, "'}' closing a block", tokens.last_line())),
                  }
              }
          })
}
