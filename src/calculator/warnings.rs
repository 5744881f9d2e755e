//! Non-fatal observations about a successful evaluation.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CalculatorInputs, InputField, PositionMetrics, PositionType};

/// Why an optional field was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    NotPositive,
    NotANumber,
}

/// Something worth telling the user that does not stop the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    IgnoredField {
        field: InputField,
        reason: IgnoredReason,
    },
    MarginExceedsAccount {
        required_margin: Decimal,
        account_size: Decimal,
    },
    StopLossWrongSide {
        stop_loss_price: Decimal,
        entry_price: Decimal,
    },
    TakeProfitWrongSide {
        take_profit_price: Decimal,
        entry_price: Decimal,
    },
    StopLossBeyondLiquidation {
        stop_loss_price: Decimal,
        liquidation_price: Decimal,
    },
    NoLiquidation {
        leverage: Decimal,
    },
    RiskExceedsAccount {
        risk_amount: Decimal,
        account_size: Decimal,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IgnoredField { field, reason } => match reason {
                IgnoredReason::NotPositive => {
                    write!(f, "{field} ignored: must be greater than zero")
                }
                IgnoredReason::NotANumber => write!(f, "{field} ignored: not a number"),
            },
            Self::MarginExceedsAccount {
                required_margin,
                account_size,
            } => write!(
                f,
                "Required margin ${required_margin:.2} exceeds account size ${account_size:.2}"
            ),
            Self::StopLossWrongSide {
                stop_loss_price,
                entry_price,
            } => write!(
                f,
                "Stop loss {stop_loss_price:.2} is on the profit side of entry {entry_price:.2}"
            ),
            Self::TakeProfitWrongSide {
                take_profit_price,
                entry_price,
            } => write!(
                f,
                "Take profit {take_profit_price:.2} is on the loss side of entry {entry_price:.2}"
            ),
            Self::StopLossBeyondLiquidation {
                stop_loss_price,
                liquidation_price,
            } => write!(
                f,
                "Stop loss {stop_loss_price:.2} is beyond liquidation price {liquidation_price:.2}; \
                 the position would be liquidated first"
            ),
            Self::NoLiquidation { leverage } => write!(
                f,
                "At {leverage}x leverage a long position cannot be liquidated; liquidation price shown as 0"
            ),
            Self::RiskExceedsAccount {
                risk_amount,
                account_size,
            } => write!(
                f,
                "Risk amount ${risk_amount:.2} exceeds account size ${account_size:.2}"
            ),
        }
    }
}

/// Optional inputs that will be treated as absent.
pub fn input_warnings(inputs: &CalculatorInputs) -> Vec<Warning> {
    inputs
        .ignored_fields()
        .into_iter()
        .map(|field| Warning::IgnoredField {
            field,
            reason: IgnoredReason::NotPositive,
        })
        .collect()
}

/// Sanity checks on derived metrics.
pub fn metric_warnings(metrics: &PositionMetrics, account_size: Decimal) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let m = metrics;
    let is_long = m.position_type == PositionType::Long;

    if m.required_margin > account_size {
        warnings.push(Warning::MarginExceedsAccount {
            required_margin: m.required_margin,
            account_size,
        });
    }

    let stop_wrong_side = if is_long {
        m.stop_loss_price > m.entry_price
    } else {
        m.stop_loss_price < m.entry_price
    };
    if stop_wrong_side {
        warnings.push(Warning::StopLossWrongSide {
            stop_loss_price: m.stop_loss_price,
            entry_price: m.entry_price,
        });
    }

    let target_wrong_side = if is_long {
        m.take_profit_price < m.entry_price
    } else {
        m.take_profit_price > m.entry_price
    };
    if target_wrong_side {
        warnings.push(Warning::TakeProfitWrongSide {
            take_profit_price: m.take_profit_price,
            entry_price: m.entry_price,
        });
    }

    if is_long && m.leverage <= Decimal::ONE {
        warnings.push(Warning::NoLiquidation {
            leverage: m.leverage,
        });
    } else {
        let beyond = if is_long {
            m.stop_loss_price <= m.liquidation_price
        } else {
            m.stop_loss_price >= m.liquidation_price
        };
        if beyond {
            warnings.push(Warning::StopLossBeyondLiquidation {
                stop_loss_price: m.stop_loss_price,
                liquidation_price: m.liquidation_price,
            });
        }
    }

    if m.risk_amount > account_size {
        warnings.push(Warning::RiskExceedsAccount {
            risk_amount: m.risk_amount,
            account_size,
        });
    }

    warnings
}
