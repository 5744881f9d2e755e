//! Input validation, run before any derivation.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{CalculatorInputs, InputField};

/// Check required fields, then conflicts.
///
/// Every failing required field is reported. Conflicts are only checked once
/// all required fields are valid.
pub fn validate(inputs: &CalculatorInputs) -> Result<(), Vec<ValidationError>> {
    let required = [
        (InputField::AccountSize, inputs.account_size),
        (InputField::Leverage, inputs.leverage),
        (InputField::EntryPrice, inputs.entry_price),
    ];

    let errors: Vec<ValidationError> = required
        .into_iter()
        .filter(|(_, value)| !matches!(value, Some(v) if *v > Decimal::ZERO))
        .map(|(field, _)| ValidationError::MissingOrInvalidField { field })
        .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    let entry_price = inputs.entry_price;
    let errors: Vec<ValidationError> = [
        (InputField::StopLossPrice, inputs.stop_loss_price),
        (InputField::TakeProfitPrice, inputs.take_profit_price),
    ]
    .into_iter()
    .filter(|(_, price)| price.is_some() && *price == entry_price)
    .map(|(field, _)| ValidationError::ConflictingInput { field })
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionType;
    use rust_decimal_macros::dec;

    fn valid() -> CalculatorInputs {
        CalculatorInputs::new(dec!(10000), dec!(10), dec!(50000), PositionType::Long)
    }

    #[test]
    fn test_valid_inputs_pass() {
        assert_eq!(validate(&valid()), Ok(()));
        assert_eq!(
            validate(&valid().with_stop_loss(dec!(49000)).with_take_profit(dec!(52000))),
            Ok(())
        );
    }

    #[test]
    fn test_all_required_errors_reported() {
        let mut inputs = valid();
        inputs.account_size = Some(Decimal::ZERO);
        inputs.leverage = Some(dec!(-1));
        inputs.entry_price = None;

        let errors = validate(&inputs).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingOrInvalidField { field: InputField::AccountSize },
                ValidationError::MissingOrInvalidField { field: InputField::Leverage },
                ValidationError::MissingOrInvalidField { field: InputField::EntryPrice },
            ]
        );

        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0] != messages[1] && messages[1] != messages[2]);
    }

    #[test]
    fn test_conflicts_skipped_when_required_fail() {
        let mut inputs = valid().with_stop_loss(dec!(50000));
        inputs.leverage = None;

        let errors = validate(&inputs).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingOrInvalidField { field: InputField::Leverage }]
        );
    }

    #[test]
    fn test_conflicts_reported_together() {
        let inputs = valid()
            .with_stop_loss(dec!(50000.00))
            .with_take_profit(dec!(50000));

        assert_eq!(
            validate(&inputs),
            Err(vec![
                ValidationError::ConflictingInput { field: InputField::StopLossPrice },
                ValidationError::ConflictingInput { field: InputField::TakeProfitPrice },
            ])
        );
    }

    #[test]
    fn test_single_conflict() {
        let inputs = valid().with_take_profit(dec!(50000));
        assert_eq!(
            validate(&inputs),
            Err(vec![ValidationError::ConflictingInput {
                field: InputField::TakeProfitPrice
            }])
        );
    }
}
