use std::rc::Rc;

use crate::{
    ast::{Expr, FunctionDef, LiteralValue, StaticField, Statement, StructDecl, TagDecl, UseTree},
    interpreter::{
        lexer::Token,
        parser::{
            block::parse_block,
            core::{ParseResult, Restrictions, TokenStream, parse_expression},
            types::parse_type,
            utils::{consume_if, expect, parse_identifier, parse_separated, unexpected},
        },
        types::{FunType, Param, Type},
    },
};

/// Parses a single statement.
///
/// A statement may be one of:
/// - a variable declaration (`let` or `mut`),
/// - a named function declaration,
/// - a struct or tag declaration,
/// - a `use` statement,
/// - a `whl` or `for` loop,
/// - one of `ret`, `err`, `brk` and `cnt`,
/// - an expression used as a statement.
///
/// A trailing `;` is consumed.
pub fn parse_statement<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let Some((token, line)) = tokens.peek() else {
        return Err(unexpected(None, "a statement", tokens.last_line()));
    };
    let line = *line;

    let statement = match token {
        Token::Let | Token::Mut => parse_variable_declaration(tokens, line)?,
        Token::Fun if matches!(tokens.peek_nth(1), Some((Token::Identifier(_), _))) => {
            tokens.next();
            let (name, _) = parse_identifier(tokens, "a function name")?;
            Statement::Function(Rc::new(parse_function_rest(tokens, Some(name), line)?))
        },
        Token::Struct => {
            tokens.next();
            Statement::Struct { decl: parse_struct(tokens)?,
                                line }
        },
        Token::Tag => {
            tokens.next();
            Statement::Tag { decl: parse_tag(tokens)?,
                             line }
        },
        Token::Use => {
            tokens.next();
            Statement::Use { tree: parse_use_tree(tokens)?,
                             line }
        },
        Token::While => {
            tokens.next();
            let condition = tokens.with_restrictions(Restrictions::CONDITION, parse_expression)?;
            let body = parse_block(tokens)?;
            Statement::While { condition,
                               body,
                               line }
        },
        Token::For => {
            tokens.next();
            parse_for(tokens, line)?
        },
        Token::Ret => {
            tokens.next();
            let value = if matches!(tokens.peek(), Some((Token::RBrace | Token::Semicolon, _)) | None) {
                Expr::Literal { value: LiteralValue::None,
                                line }
            } else {
                parse_expression(tokens)?
            };
            Statement::Return { value, line }
        },
        Token::Raise => {
            tokens.next();
            Statement::Raise { value: parse_expression(tokens)?,
                               line }
        },
        Token::Brk => {
            tokens.next();
            Statement::Break { line }
        },
        Token::Cnt => {
            tokens.next();
            Statement::Continue { line }
        },
        _ => Statement::Expression { expr: parse_expression(tokens)?,
                                     line },
    };

    consume_if(tokens, &Token::Semicolon);
    Ok(statement)
}

/// Parses `let name: Type = value` or `mut name: Type = value`.
///
/// The type annotation is optional and defaults to `Any`.
fn parse_variable_declaration<'a, I>(tokens: &mut TokenStream<'a, I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mutable = matches!(tokens.next(), Some((Token::Mut, _)));
    let (name, _) = parse_identifier(tokens, "a variable name")?;
    let ty = if consume_if(tokens, &Token::Colon) { parse_type(tokens)? } else { Type::Any };
    expect(tokens, &Token::Equals, "'=' in the declaration")?;
    let value = parse_expression(tokens)?;

    Ok(Statement::VariableDeclaration { name,
                                        mutable,
                                        ty,
                                        value,
                                        line })
}

/// Parses the parameter list, return type and body of a function, after
/// `fun` and the optional name.
///
/// Omitted parameter and return types are `Any`.
///
/// Grammar: `"(" ("mut"? id (":" type)? ","?)* ")" type? block`
pub(in crate::interpreter::parser) fn parse_function_rest<'a, I>(tokens: &mut TokenStream<'a, I>,
                                                                 name: Option<String>,
                                                                 line: usize)
                                                                 -> ParseResult<FunctionDef>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, &Token::LParen, "'(' opening the parameters")?;
    let params = parse_separated(tokens,
                                 |tokens| {
                                     let mutable = consume_if(tokens, &Token::Mut);
                                     let (name, _) = parse_identifier(tokens, "a parameter name")?;
                                     let ty = if consume_if(tokens, &Token::Colon) {
                                         parse_type(tokens)?
                                     } else {
                                         Type::Any
                                     };
                                     Ok(Param { name, ty, mutable })
                                 },
                                 &Token::RParen,
                                 "')' closing the parameters")?;
    let ret = if matches!(tokens.peek(), Some((Token::LBrace, _))) { Type::Any } else { parse_type(tokens)? };
    let body = parse_block(tokens)?;

    Ok(FunctionDef { name,
                     signature: FunType { params,
                                          ret: Box::new(ret) },
                     body,
                     line })
}

/// Parses a struct body after `str`.
///
/// ```text
///     str Point {
///         x Number
///         y Number
///         !origin Point = none
///         len() Number { ... }
///         !new(x: Number, y: Number) Point { ... }
///     }
/// ```
/// A leading `!` marks a static member. A name followed by `(` is a method.
fn parse_struct<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<StructDecl>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, _) = parse_identifier(tokens, "a struct name")?;
    expect(tokens, &Token::LBrace, "'{' opening the struct")?;

    let mut decl = StructDecl { name,
                                fields: Vec::new(),
                                static_fields: Vec::new(),
                                methods: Vec::new(),
                                static_methods: Vec::new() };
    loop {
        if consume_if(tokens, &Token::RBrace) {
            break;
        }
        let is_static = consume_if(tokens, &Token::Bang);
        let (member, line) = parse_identifier(tokens, "a struct member")?;

        if matches!(tokens.peek(), Some((Token::LParen, _))) {
            let method = Rc::new(parse_function_rest(tokens, Some(member), line)?);
            if is_static {
                decl.static_methods.push(method);
            } else {
                decl.methods.push(method);
            }
        } else {
            let ty = parse_type(tokens)?;
            if is_static {
                let init = if consume_if(tokens, &Token::Equals) {
                    parse_expression(tokens)?
                } else {
                    Expr::Literal { value: LiteralValue::None,
                                    line }
                };
                decl.static_fields.push(StaticField { name: member, ty, init });
            } else {
                decl.fields.push((member, ty));
            }
        }
        consume_if(tokens, &Token::Comma);
    }
    Ok(decl)
}

/// Parses a tag body after `tag`: `Name { A, B(Type) }`.
fn parse_tag<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<TagDecl>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, _) = parse_identifier(tokens, "a tag name")?;
    expect(tokens, &Token::LBrace, "'{' opening the tag")?;

    let mut decl = TagDecl { name,
                             plain: Vec::new(),
                             payload: Vec::new() };
    loop {
        if consume_if(tokens, &Token::RBrace) {
            break;
        }
        let (variant, _) = parse_identifier(tokens, "a variant name")?;
        if consume_if(tokens, &Token::LParen) {
            let ty = parse_type(tokens)?;
            expect(tokens, &Token::RParen, "')' closing the payload type")?;
            decl.payload.push((variant, ty));
        } else {
            decl.plain.push(variant);
        }
        consume_if(tokens, &Token::Comma);
    }
    Ok(decl)
}

/// Parses `for first, second of iterable { ... }`, with optional parentheses
/// around the header.
fn parse_for<'a, I>(tokens: &mut TokenStream<'a, I>, line: usize) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let parenthesized = consume_if(tokens, &Token::LParen);
    let (first, _) = parse_identifier(tokens, "a loop binding")?;
    consume_if(tokens, &Token::Comma);
    let (second, _) = parse_identifier(tokens, "a second loop binding")?;
    expect(tokens, &Token::Of, "'of' in the loop header")?;
    let iterable = tokens.with_restrictions(Restrictions::CONDITION, parse_expression)?;
    if parenthesized {
        expect(tokens, &Token::RParen, "')' closing the loop header")?;
    }
    let body = parse_block(tokens)?;

    Ok(Statement::For { first,
                        second,
                        iterable,
                        body,
                        line })
}

/// Parses the tree of a `use` statement.
///
/// Grammar: `use_tree := name_use ("::" (name_use | "{" use_tree* "}"))*`
/// where `name_use := id ("as" id)?`. An expansion ends the path.
fn parse_use_tree<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<UseTree>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, _) = parse_identifier(tokens, "a name to use")?;
    let alias = parse_alias(tokens)?;
    let mut tree = UseTree::Name { name, alias };

    while consume_if(tokens, &Token::ColonColon) {
        if consume_if(tokens, &Token::LBrace) {
            let members = parse_separated(tokens, parse_use_tree, &Token::RBrace, "'}' closing the use list")?;
            return Ok(UseTree::Expand { left: Box::new(tree),
                                        members });
        }
        let (name, _) = parse_identifier(tokens, "a name after '::'")?;
        let alias = parse_alias(tokens)?;
        tree = UseTree::Path { left: Box::new(tree),
                               name,
                               alias };
    }
    Ok(tree)
}

fn parse_alias<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Option<String>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    if consume_if(tokens, &Token::As) {
        return Ok(Some(parse_identifier(tokens, "an alias after 'as'")?.0));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::parser::core::parse_source;

    fn single(source: &str) -> Statement {
        let mut program = parse_source(source).expect("parse failed");
        assert_eq!(program.len(), 1, "expected one statement in {source:?}");
        program.remove(0)
    }

    #[test]
    fn declarations_carry_types() {
        let Statement::VariableDeclaration { name, mutable, ty, .. } = single("mut count: Number = 0") else {
            panic!("expected a declaration")
        };
        assert_eq!(name, "count");
        assert!(mutable);
        assert_eq!(ty, Type::Number(None));
    }

    #[test]
    fn named_functions_default_to_any() {
        let Statement::Function(def) = single("fun add(a, b: Number) { ret a + b }") else {
            panic!("expected a function")
        };
        assert_eq!(def.name.as_deref(), Some("add"));
        assert_eq!(def.signature.params[0].ty, Type::Any);
        assert_eq!(def.signature.params[1].ty, Type::Number(None));
        assert_eq!(*def.signature.ret, Type::Any);
    }

    #[test]
    fn struct_members_are_sorted_by_kind() {
        let source = "str P {\n x Number\n y Number\n !count Number = 0\n len() Number { ret 1 }\n !new() P { ret \
                      P{x: 0, y: 0} }\n}";
        let Statement::Struct { decl, .. } = single(source) else { panic!("expected a struct") };
        assert_eq!(decl.fields.len(), 2);
        assert_eq!(decl.static_fields.len(), 1);
        assert_eq!(decl.methods.len(), 1);
        assert_eq!(decl.static_methods.len(), 1);
    }

    #[test]
    fn tags_split_plain_and_payload_variants() {
        let Statement::Tag { decl, .. } = single("tag T { A, B(Number), C }") else { panic!("expected a tag") };
        assert_eq!(decl.plain, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(decl.payload, vec![("B".to_string(), Type::Number(None))]);
    }

    #[test]
    fn use_trees_nest() {
        let Statement::Use { tree, .. } = single("use Std::{Io::println as say, Array}") else {
            panic!("expected a use")
        };
        let UseTree::Expand { members, .. } = tree else { panic!("expected an expansion") };
        assert_eq!(members.len(), 2);
        assert!(matches!(&members[0], UseTree::Path { alias: Some(alias), .. } if alias == "say"));
    }

    #[test]
    fn for_header_accepts_parentheses() {
        assert!(matches!(single("for (i, x of xs) { x }"), Statement::For { .. }));
        assert!(matches!(single("for k v of {a: 1} { k }"), Statement::For { .. }));
    }

    #[test]
    fn bare_return_yields_none() {
        let Statement::Function(def) = single("fun f() { ret }") else { panic!("expected a function") };
        assert!(matches!(def.body[0],
                         Statement::Return { value: Expr::Literal { value: LiteralValue::None, .. }, .. }));
    }
}
