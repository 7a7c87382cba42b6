use crate::{
    ast::{BinaryOperator, Expr, UnaryOperator},
    interpreter::{
        lexer::Token,
        parser::{
            block::parse_block,
            core::{ParseResult, TokenStream},
            unary::parse_unary,
            utils::parse_identifier,
        },
    },
};

/// Maps a token to the binary operator it spells, if any.
pub fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Sub,
        Token::Star => BinaryOperator::Mul,
        Token::Slash => BinaryOperator::Div,
        Token::Percent => BinaryOperator::Mod,
        Token::Caret => BinaryOperator::Pow,
        Token::ShiftLeft => BinaryOperator::ShiftLeft,
        Token::ShiftRight => BinaryOperator::ShiftRight,
        Token::Pipe => BinaryOperator::BitOr,
        Token::Ampersand => BinaryOperator::BitAnd,
        Token::DotDot => BinaryOperator::Concat,
        Token::Less => BinaryOperator::Less,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::Greater,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::EqualEqual => BinaryOperator::Equal,
        Token::BangEqual => BinaryOperator::NotEqual,
        Token::DoubleAmpersand => BinaryOperator::And,
        Token::DoublePipe => BinaryOperator::Or,
        Token::DoubleQuestion => BinaryOperator::Nullish,
        _ => return None,
    };
    Some(op)
}

/// Maps a compound assignment token to the operator it applies.
fn compound_assignment_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::PlusAssign => BinaryOperator::Add,
        Token::MinusAssign => BinaryOperator::Sub,
        Token::StarAssign => BinaryOperator::Mul,
        Token::SlashAssign => BinaryOperator::Div,
        Token::PercentAssign => BinaryOperator::Mod,
        Token::CaretAssign => BinaryOperator::Pow,
        _ => return None,
    };
    Some(op)
}

/// Parses one left-associative precedence level.
///
/// `operand` parses the next tighter level; `accepts` selects the operators
/// that belong to this level.
fn parse_left_associative<'a, I>(tokens: &mut TokenStream<'a, I>,
                                 operand: fn(&mut TokenStream<'a, I>) -> ParseResult<Expr>,
                                 accepts: fn(BinaryOperator) -> bool)
                                 -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = operand(tokens)?;
    while let Some((token, line)) = tokens.peek()
          && let Some(op) = token_to_binary_operator(token)
          && accepts(op)
    {
        tokens.next();
        let right = operand(tokens)?;
        left = Expr::BinaryOp { left: Box::new(left),
                                op,
                                right: Box::new(right),
                                line: *line };
    }
    Ok(left)
}

/// Parses `expr cat name { ... }`.
///
/// The rule is: `catch := assignment ("cat" identifier block)*`
pub fn parse_catch<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut expr = parse_assignment(tokens)?;
    while let Some((Token::Catch, line)) = tokens.peek() {
        tokens.next();
        let (name, _) = parse_identifier(tokens, "a name after 'cat'")?;
        let body = parse_block(tokens)?;
        expr = Expr::Catch { expr: Box::new(expr),
                             name,
                             body,
                             line: *line };
    }
    Ok(expr)
}

/// Parses plain and compound assignments. Assignment is right-associative.
///
/// `a += b` is desugared to `a = a + b`.
///
/// The rule is: `assignment := logical_or (("=" | "+=" | ...) assignment)?`
pub fn parse_assignment<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let target = parse_logical_or(tokens)?;
    let Some((token, line)) = tokens.peek() else {
        return Ok(target);
    };

    if *token == Token::Equals {
        tokens.next();
        let value = parse_assignment(tokens)?;
        return Ok(Expr::Assign { target: Box::new(target),
                                 value: Box::new(value),
                                 line: *line });
    }

    if let Some(op) = compound_assignment_operator(token) {
        tokens.next();
        let value = parse_assignment(tokens)?;
        let combined = Expr::BinaryOp { left: Box::new(target.clone()),
                                        op,
                                        right: Box::new(value),
                                        line: *line };
        return Ok(Expr::Assign { target: Box::new(target),
                                 value: Box::new(combined),
                                 line: *line });
    }

    Ok(target)
}

/// Parses logical OR. The operator is right-associative.
///
/// The rule is: `logical_or := nullish ("||" logical_or)?`
pub fn parse_logical_or<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let left = parse_nullish(tokens)?;
    if let Some((Token::DoublePipe, line)) = tokens.peek() {
        tokens.next();
        let right = parse_logical_or(tokens)?;
        return Ok(Expr::BinaryOp { left: Box::new(left),
                                   op: BinaryOperator::Or,
                                   right: Box::new(right),
                                   line: *line });
    }
    Ok(left)
}

/// The rule is: `nullish := logical_and ("??" logical_and)*`
pub fn parse_nullish<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_logical_and, |op| op == BinaryOperator::Nullish)
}

/// The rule is: `logical_and := equality ("&&" equality)*`
pub fn parse_logical_and<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_equality, |op| op == BinaryOperator::And)
}

/// The rule is: `equality := relational (("==" | "!=") relational)*`
pub fn parse_equality<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_relational, |op| {
        matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual)
    })
}

/// The rule is: `relational := shift ((">" | ">=" | "<" | "<=") shift)*`
pub fn parse_relational<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_shift, |op| {
        matches!(op,
                 BinaryOperator::Greater
                 | BinaryOperator::GreaterEqual
                 | BinaryOperator::Less
                 | BinaryOperator::LessEqual)
    })
}

/// The rule is: `shift := bitwise (("<<" | ">>") bitwise)*`
pub fn parse_shift<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_bitwise, |op| {
        matches!(op, BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight)
    })
}

/// The rule is: `bitwise := concat (("|" | "&") concat)*`
pub fn parse_bitwise<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_concat, |op| {
        matches!(op, BinaryOperator::BitOr | BinaryOperator::BitAnd)
    })
}

/// The rule is: `concat := additive (".." additive)*`
pub fn parse_concat<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_additive, |op| op == BinaryOperator::Concat)
}

/// Parses addition and subtraction expressions.
///
/// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_multiplicative, |op| {
        matches!(op, BinaryOperator::Add | BinaryOperator::Sub)
    })
}

/// Parses multiplication-level expressions.
///
/// An unparenthesized address-of operand directly followed by `*` ends the
/// expression instead, so `&3 *p = 4` reads as two statements.
///
/// The rule is: `multiplicative := power (("*" | "/" | "%") power)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let starts_with_address_of = matches!(tokens.peek(), Some((Token::Ampersand | Token::DoubleAmpersand, _)));
    let mut left = parse_power(tokens)?;
    if starts_with_address_of
       && matches!(left, Expr::UnaryOp { op: UnaryOperator::AddressOf, .. })
       && matches!(tokens.peek(), Some((Token::Star, _)))
    {
        return Ok(left);
    }

    while let Some((token, line)) = tokens.peek()
          && let Some(op) = token_to_binary_operator(token)
          && matches!(op, BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod)
    {
        tokens.next();
        let right = parse_power(tokens)?;
        left = Expr::BinaryOp { left: Box::new(left),
                                op,
                                right: Box::new(right),
                                line: *line };
    }
    Ok(left)
}

/// Parses exponentiation, left-associative like every level below `||`.
///
/// The rule is: `power := unary ("^" unary)*`
pub fn parse_power<'a, I>(tokens: &mut TokenStream<'a, I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    parse_left_associative(tokens, parse_unary, |op| op == BinaryOperator::Pow)
}
