//! Raw text form: turns user-typed strings into a `CalculatorInputs` snapshot.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{validate, IgnoredReason, Warning};
use crate::config::InputDefaults;
use crate::error::ValidationError;

use super::{CalculatorInputs, InputField, PositionType};

/// Unparsed input fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputForm {
    pub account_size: Option<String>,
    pub leverage: Option<String>,
    pub entry_price: Option<String>,
    pub position_type: Option<String>,
    pub stop_loss_price: Option<String>,
    pub risk_usd: Option<String>,
    pub take_profit_price: Option<String>,
    pub target_profit_usd: Option<String>,
    pub position_size: Option<String>,
}

/// Outcome of parsing a form: the snapshot plus anything that was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedForm {
    pub inputs: CalculatorInputs,
    pub warnings: Vec<Warning>,
}

enum Parsed {
    Empty,
    Number(Decimal),
    NotANumber,
}

fn parse_number(raw: Option<&str>) -> Parsed {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Parsed::Empty;
    };
    let text = text.trim_start_matches('$').replace(',', "");

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Parsed::Number)
        .unwrap_or(Parsed::NotANumber)
}

impl InputForm {
    /// Fill the required fields that were left blank with reset defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: &InputDefaults) -> Self {
        fn fill(slot: &mut Option<String>, value: String) {
            if slot.as_deref().map_or(true, |s| s.trim().is_empty()) {
                *slot = Some(value);
            }
        }

        fill(&mut self.account_size, defaults.account_size.to_string());
        fill(&mut self.leverage, defaults.leverage.to_string());
        fill(&mut self.entry_price, defaults.entry_price.to_string());
        fill(&mut self.position_type, defaults.position_type.to_string());
        self
    }

    /// Parse every field.
    ///
    /// A non-numeric required field becomes absent so the validator reports it.
    /// A non-numeric optional field is dropped with a warning. A missing or
    /// unrecognised position type is an error reported together with any
    /// invalid required number.
    pub fn parse(&self) -> Result<ParsedForm, Vec<ValidationError>> {
        let position_type = self
            .position_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .and_then(|t| t.parse::<PositionType>().ok());

        let required = |raw: &Option<String>| match parse_number(raw.as_deref()) {
            Parsed::Number(value) => Some(value),
            Parsed::Empty | Parsed::NotANumber => None,
        };

        let mut warnings = Vec::new();
        let mut optional = |field: InputField, raw: &Option<String>| match parse_number(raw.as_deref()) {
            Parsed::Number(value) => Some(value),
            Parsed::Empty => None,
            Parsed::NotANumber => {
                warnings.push(Warning::IgnoredField {
                    field,
                    reason: IgnoredReason::NotANumber,
                });
                None
            }
        };

        let stop_loss_price = optional(InputField::StopLossPrice, &self.stop_loss_price);
        let risk_usd = optional(InputField::RiskUsd, &self.risk_usd);
        let take_profit_price = optional(InputField::TakeProfitPrice, &self.take_profit_price);
        let target_profit_usd = optional(InputField::TargetProfitUsd, &self.target_profit_usd);
        let position_size = optional(InputField::PositionSize, &self.position_size);

        let inputs = CalculatorInputs {
            account_size: required(&self.account_size),
            leverage: required(&self.leverage),
            entry_price: required(&self.entry_price),
            position_type: position_type.unwrap_or_default(),
            stop_loss_price,
            risk_usd,
            take_profit_price,
            target_profit_usd,
            position_size,
        };

        if position_type.is_none() {
            let mut errors = validate(&inputs).err().unwrap_or_default();
            errors.push(ValidationError::MissingOrInvalidField {
                field: InputField::PositionType,
            });
            return Err(errors);
        }

        Ok(ParsedForm { inputs, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(account: &str, leverage: &str, entry: &str) -> InputForm {
        InputForm {
            account_size: Some(account.to_string()),
            leverage: Some(leverage.to_string()),
            entry_price: Some(entry.to_string()),
            position_type: Some("long".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_numbers() {
        let mut f = form("$10,000", " 10 ", "5e4");
        f.position_type = Some("Short".to_string());
        f.stop_loss_price = Some("51000".to_string());

        let parsed = f.parse().unwrap();
        assert_eq!(parsed.inputs.account_size, Some(dec!(10000)));
        assert_eq!(parsed.inputs.leverage, Some(dec!(10)));
        assert_eq!(parsed.inputs.entry_price, Some(dec!(50000)));
        assert_eq!(parsed.inputs.position_type, PositionType::Short);
        assert_eq!(parsed.inputs.stop_loss_price, Some(dec!(51000)));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_non_numeric_required_becomes_absent() {
        let parsed = form("abc", "10", "").parse().unwrap();
        assert_eq!(parsed.inputs.account_size, None);
        assert_eq!(parsed.inputs.entry_price, None);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_non_numeric_optional_is_warned() {
        let mut f = form("10000", "10", "50000");
        f.risk_usd = Some("lots".to_string());

        let parsed = f.parse().unwrap();
        assert_eq!(parsed.inputs.risk_usd, None);
        assert_eq!(
            parsed.warnings,
            vec![Warning::IgnoredField {
                field: InputField::RiskUsd,
                reason: IgnoredReason::NotANumber,
            }]
        );
    }

    #[test]
    fn test_unknown_position_type() {
        let mut f = form("10000", "10", "50000");
        f.position_type = Some("flat".to_string());

        assert_eq!(
            f.parse(),
            Err(vec![ValidationError::MissingOrInvalidField {
                field: InputField::PositionType
            }])
        );
    }

    #[test]
    fn test_missing_position_type() {
        let mut f = form("10000", "10", "50000");
        f.position_type = Some("  ".to_string());
        assert!(f.parse().is_err());

        f.position_type = None;
        assert!(f.parse().is_err());
    }

    #[test]
    fn test_bad_position_type_reported_with_bad_numbers() {
        let f = InputForm {
            account_size: Some("0".to_string()),
            leverage: Some("-1".to_string()),
            entry_price: None,
            position_type: Some("flat".to_string()),
            ..Default::default()
        };

        let fields: Vec<InputField> = f
            .parse()
            .unwrap_err()
            .iter()
            .map(ValidationError::field)
            .collect();
        assert_eq!(
            fields,
            vec![
                InputField::AccountSize,
                InputField::Leverage,
                InputField::EntryPrice,
                InputField::PositionType,
            ]
        );
    }

    #[test]
    fn test_defaults_fill_blanks_only() {
        let f = InputForm {
            leverage: Some("3".to_string()),
            entry_price: Some("  ".to_string()),
            ..Default::default()
        }
        .with_defaults(&InputDefaults::default());

        assert_eq!(f.account_size.as_deref(), Some("10000"));
        assert_eq!(f.leverage.as_deref(), Some("3"));
        assert_eq!(f.entry_price.as_deref(), Some("50000"));
        assert_eq!(f.position_type.as_deref(), Some("long"));
    }
}
