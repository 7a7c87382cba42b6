use crate::ast::BinaryOperator;

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Renders a number the way the language prints it.
///
/// Whole numbers print without a fractional part, `-0` prints as `0`, and the
/// non-finite values print as `NaN`, `Infinity` and `-Infinity`.
///
/// # Example
/// ```
/// use noktoy::util::num::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(0.25), "0.25");
/// assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
/// ```
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Converts a number to an array or arena index if it is a non-negative,
/// finite, whole number that `f64` represents exactly.
///
/// # Example
/// ```
/// use noktoy::util::num::f64_to_index;
///
/// assert_eq!(f64_to_index(4.0), Some(4));
/// assert_eq!(f64_to_index(1.5), None);
/// assert_eq!(f64_to_index(-1.0), None);
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
pub fn f64_to_index(value: f64) -> Option<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_SAFE_U64_INT as f64 {
        return None;
    }
    usize::try_from(value as u64).ok()
}

/// Converts an index back to a number.
#[allow(clippy::cast_precision_loss)]
pub fn index_to_f64(index: usize) -> f64 {
    index as f64
}

/// Truncates a number to the 64-bit integer used by the bitwise operators.
/// Non-finite values become `0`; out of range values saturate.
#[allow(clippy::cast_possible_truncation)]
fn to_bits(value: f64) -> i64 {
    if value.is_finite() { value.trunc() as i64 } else { 0 }
}

#[allow(clippy::cast_precision_loss)]
fn from_bits(value: i64) -> f64 {
    value as f64
}

/// Applies an arithmetic or bitwise operator to two numbers.
///
/// Returns `None` for operators that do not produce a number from two
/// numbers. Both the evaluator and constant folding go through this
/// function, so folded and unfolded programs agree.
///
/// # Example
/// ```
/// use noktoy::{ast::BinaryOperator, util::num::arithmetic};
///
/// assert_eq!(arithmetic(BinaryOperator::Pow, 2.0, 10.0), Some(1024.0));
/// assert_eq!(arithmetic(BinaryOperator::BitOr, 5.0, 2.0), Some(7.0));
/// assert_eq!(arithmetic(BinaryOperator::Mod, -7.0, 3.0), Some(-1.0));
/// assert_eq!(arithmetic(BinaryOperator::Less, 1.0, 2.0), None);
/// ```
pub fn arithmetic(op: BinaryOperator, a: f64, b: f64) -> Option<f64> {
    let shift = |b: f64| u32::try_from(to_bits(b).rem_euclid(64)).unwrap_or(0);
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => a / b,
        BinaryOperator::Mod => a % b,
        BinaryOperator::Pow => a.powf(b),
        BinaryOperator::BitOr => from_bits(to_bits(a) | to_bits(b)),
        BinaryOperator::BitAnd => from_bits(to_bits(a) & to_bits(b)),
        BinaryOperator::ShiftLeft => from_bits(to_bits(a).wrapping_shl(shift(b))),
        BinaryOperator::ShiftRight => from_bits(to_bits(a).wrapping_shr(shift(b))),
        _ => return None,
    };
    Some(result)
}

/// Applies a numeric comparison operator.
pub fn compare(op: BinaryOperator, a: f64, b: f64) -> Option<bool> {
    let result = match op {
        BinaryOperator::Less => a < b,
        BinaryOperator::LessEqual => a <= b,
        BinaryOperator::Greater => a > b,
        BinaryOperator::GreaterEqual => a >= b,
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shifts_wrap_their_amount() {
        assert_eq!(arithmetic(BinaryOperator::ShiftLeft, 1.0, 4.0), Some(16.0));
        assert_eq!(arithmetic(BinaryOperator::ShiftLeft, 1.0, 68.0), Some(16.0));
        assert_eq!(arithmetic(BinaryOperator::ShiftRight, -16.0, 2.0), Some(-4.0));
    }

    #[test]
    fn bitwise_truncates_operands() {
        assert_eq!(arithmetic(BinaryOperator::BitAnd, 7.9, 3.2), Some(3.0));
        assert_eq!(arithmetic(BinaryOperator::BitOr, f64::NAN, 2.0), Some(2.0));
    }

    #[test]
    fn division_follows_ieee() {
        assert_eq!(arithmetic(BinaryOperator::Div, 1.0, 0.0), Some(f64::INFINITY));
        assert!(arithmetic(BinaryOperator::Mod, 1.0, 0.0).is_some_and(f64::is_nan));
    }

    #[test]
    fn formats_large_and_fractional_numbers() {
        assert_eq!(format_number(1e21), "1000000000000000000000");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn comparisons_only_cover_ordering() {
        assert_eq!(compare(BinaryOperator::GreaterEqual, 2.0, 2.0), Some(true));
        assert_eq!(compare(BinaryOperator::Add, 2.0, 2.0), None);
    }
}
