//! Checked decimal arithmetic that reports which quantity failed.

use rust_decimal::Decimal;

use crate::error::CalcError;

pub fn mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, CalcError> {
    a.checked_mul(b)
        .ok_or_else(|| CalcError::Overflow(what.to_string()))
}

/// `a / b`; a zero divisor is `DivisionByZero`, anything else that fails is overflow.
pub fn div(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero(what.to_string()));
    }
    a.checked_div(b)
        .ok_or_else(|| CalcError::Overflow(what.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_ops() {
        assert_eq!(mul(dec!(3), dec!(4), "x"), Ok(dec!(12)));
        assert_eq!(div(dec!(1), dec!(4), "x"), Ok(dec!(0.25)));
        assert_eq!(
            div(dec!(1), Decimal::ZERO, "ratio"),
            Err(CalcError::DivisionByZero("ratio".into()))
        );
        assert_eq!(
            mul(Decimal::MAX, dec!(2), "value"),
            Err(CalcError::Overflow("value".into()))
        );
    }
}
