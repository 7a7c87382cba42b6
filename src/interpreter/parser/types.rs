use crate::{
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, TokenStream},
            utils::{consume_if, expect, parse_identifier, parse_separated, unexpected},
        },
        types::{FunType, Param, Type},
    },
};

/// Parses a type annotation.
///
/// The grammar, loosest first:
/// ```text
///     type     := ref_type ("|" type)?
///     ref_type := "&" array_type | "&&" array_type | array_type
///     array_type := literal_type ("[" "]")*
///     literal_type := Number | String | Bool | Boolean | None | none | Any | any
///                   | true | false | <number> | <string>
///                   | fun "(" params ")" type
///                   | "(" type ")" | "<" type ":" type ">" | "[" type* "]"
///                   | <identifier>
/// ```
/// Any other identifier names a struct or tag, resolved when checked.
pub fn parse_type<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let left = parse_ref_type(tokens)?;
    if consume_if(tokens, &Token::Pipe) {
        let right = parse_type(tokens)?;
        return Ok(Type::Or(Box::new(left), Box::new(right)));
    }
    Ok(left)
}

fn parse_ref_type<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if consume_if(tokens, &Token::Ampersand) {
        return Ok(Type::Pointer(Box::new(parse_array_type(tokens)?)));
    }
    if consume_if(tokens, &Token::DoubleAmpersand) {
        let inner = Type::Pointer(Box::new(parse_array_type(tokens)?));
        return Ok(Type::Pointer(Box::new(inner)));
    }
    parse_array_type(tokens)
}

fn parse_array_type<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut ty = parse_literal_type(tokens)?;
    while matches!(tokens.peek(), Some((Token::LBracket, _)))
          && matches!(tokens.peek_nth(1), Some((Token::RBracket, _)))
    {
        tokens.next();
        tokens.next();
        ty = Type::Array(Box::new(ty));
    }
    Ok(ty)
}

fn parse_literal_type<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.next() else {
        return Err(unexpected(None, "a type", tokens.last_line()));
    };
    let ty = match token {
        Token::Identifier(name) => match name.as_str() {
            "Number" => Type::Number(None),
            "String" => Type::String(None),
            "Bool" | "Boolean" => Type::Bool(None),
            "None" => Type::None,
            "Any" | "any" => Type::Any,
            _ => Type::Entity(name.clone()),
        },
        Token::NoneLiteral => Type::None,
        Token::True => Type::Bool(Some(true)),
        Token::False => Type::Bool(Some(false)),
        Token::Number(n) => Type::Number(Some(*n)),
        Token::Str(s) => Type::String(Some(s.clone())),
        Token::Fun => Type::Fun(parse_fun_type(tokens)?),
        Token::LParen => {
            let inner = parse_type(tokens)?;
            expect(tokens, &Token::RParen, "')' closing the type")?;
            inner
        },
        Token::Less => {
            let key = parse_type(tokens)?;
            expect(tokens, &Token::Colon, "':' between record key and value types")?;
            let value = parse_type(tokens)?;
            expect_greater(tokens)?;
            Type::LooseRecord(Box::new(key), Box::new(value))
        },
        Token::LBracket => Type::Tuple(parse_separated(tokens, parse_type, &Token::RBracket, "']' closing the tuple type")?),
        _ => return Err(unexpected(Some(&(token.clone(), *line)), "a type", *line)),
    };
    Ok(ty)
}

/// Consumes a closing `>`. A `>>` closes two nested record types, so its
/// second half is remembered for the next call.
fn expect_greater<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<()>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if tokens.split_greater {
        tokens.split_greater = false;
        return Ok(());
    }
    match tokens.next() {
        Some((Token::Greater, _)) => Ok(()),
        Some((Token::ShiftRight, _)) => {
            tokens.split_greater = true;
            Ok(())
        },
        found => Err(unexpected(found, "'>' closing the record type", tokens.last_line())),
    }
}

/// Parses the rest of `fun(a: T, mut b: U) R` after `fun`.
///
/// Parameter names are optional in types; unnamed ones are called `_`.
fn parse_fun_type<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<FunType>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, "'(' after 'fun' in a type")?;
    let params = parse_separated(tokens,
                                 |tokens| {
                                     let mutable = consume_if(tokens, &Token::Mut);
                                     let named = matches!(tokens.peek(), Some((Token::Identifier(_), _)))
                                                 && matches!(tokens.peek_nth(1), Some((Token::Colon, _)));
                                     let name = if named {
                                         let (name, _) = parse_identifier(tokens, "a parameter name")?;
                                         tokens.next();
                                         name
                                     } else {
                                         "_".to_string()
                                     };
                                     let ty = parse_type(tokens)?;
                                     Ok(Param { name, ty, mutable })
                                 },
                                 &Token::RParen,
                                 "')' closing the parameter types")?;
    let ret = parse_type(tokens)?;
    Ok(FunType { params,
                 ret: Box::new(ret) })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::Lexer;

    fn ty(source: &str) -> Type {
        let tokens = Lexer::new(source).tokenize().expect("lexing failed");
        let mut stream = TokenStream::new(tokens.iter());
        parse_type(&mut stream).expect("type parse failed")
    }

    #[test]
    fn or_binds_loosest() {
        assert_eq!(ty("&Number | String[]"),
                   Type::Or(Box::new(Type::Pointer(Box::new(Type::Number(None)))),
                            Box::new(Type::Array(Box::new(Type::String(None))))));
    }

    #[test]
    fn nested_records_split_shift_right() {
        assert_eq!(ty("<String: <Number: Any>>"),
                   Type::LooseRecord(Box::new(Type::String(None)),
                                     Box::new(Type::LooseRecord(Box::new(Type::Number(None)),
                                                                Box::new(Type::Any)))));
    }

    #[test]
    fn literal_and_tuple_types() {
        assert_eq!(ty("[1, \"a\", true, none]"),
                   Type::Tuple(vec![Type::Number(Some(1.0)),
                                    Type::String(Some("a".into())),
                                    Type::Bool(Some(true)),
                                    Type::None]));
    }

    #[test]
    fn function_types_with_and_without_names() {
        let Type::Fun(fun) = ty("fun(a: Number, mut String) Bool") else { panic!("expected a function type") };
        assert_eq!(fun.params.len(), 2);
        assert_eq!(fun.params[0].name, "a");
        assert!(fun.params[1].mutable);
        assert_eq!(fun.params[1].name, "_");
        assert_eq!(*fun.ret, Type::Bool(None));
    }

    #[test]
    fn other_names_are_entities() {
        assert_eq!(ty("(Point)[]"), Type::Array(Box::new(Type::Entity("Point".into()))));
    }
}
