use crate::{
    ast::{Expr, LiteralValue},
    util::{num::arithmetic, stack::ensure_sufficient_stack},
};

/// Folds arithmetic and bitwise operations whose operands are both number
/// literals into a single number literal, bottom-up.
///
/// Only `BinaryOp` nodes are descended into; anything else is returned as is.
pub fn fold(expr: Expr) -> Expr {
    let Expr::BinaryOp { left, op, right, line } = expr else {
        return expr;
    };
    let (left, right) = ensure_sufficient_stack(|| (fold(*left), fold(*right)));

    if op.is_foldable()
       && let Expr::Literal { value: LiteralValue::Number(a), .. } = left
       && let Expr::Literal { value: LiteralValue::Number(b), .. } = right
       && let Some(value) = arithmetic(op, a, b)
    {
        return Expr::Literal { value: LiteralValue::Number(value),
                               line };
    }

    Expr::BinaryOp { left: Box::new(left),
                     op,
                     right: Box::new(right),
                     line }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::BinaryOperator;

    fn number(value: f64) -> Box<Expr> {
        Box::new(Expr::Literal { value: LiteralValue::Number(value),
                                 line:  1 })
    }

    #[test]
    fn folds_nested_operations() {
        let expr = Expr::BinaryOp { left:  number(2.0),
                                    op:    BinaryOperator::Pow,
                                    right: Box::new(Expr::BinaryOp { left:  number(1.0),
                                                                     op:    BinaryOperator::Add,
                                                                     right: number(2.0),
                                                                     line:  1 }),
                                    line:  1 };
        assert_eq!(fold(expr), *number(8.0));
    }

    #[test]
    fn leaves_comparisons_and_variables_alone() {
        let comparison = Expr::BinaryOp { left:  number(1.0),
                                          op:    BinaryOperator::Less,
                                          right: number(2.0),
                                          line:  1 };
        assert_eq!(fold(comparison.clone()), comparison);

        let partial = Expr::BinaryOp { left:  Box::new(Expr::Variable { name: "x".into(),
                                                                        line: 1 }),
                                       op:    BinaryOperator::Mul,
                                       right: number(2.0),
                                       line:  1 };
        assert_eq!(fold(partial.clone()), partial);
    }
}
