//! Calculator input snapshot: required account/price fields plus sparse risk targets.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    /// Profits when price goes up
    #[default]
    Long,
    /// Profits when price goes down
    Short,
}

impl PositionType {
    /// Price `distance` away from `entry` in the losing direction.
    pub fn adverse_price(self, entry: Decimal, distance: Decimal) -> Option<Decimal> {
        match self {
            Self::Long => entry.checked_sub(distance),
            Self::Short => entry.checked_add(distance),
        }
    }

    /// Price `distance` away from `entry` in the winning direction.
    pub fn favorable_price(self, entry: Decimal, distance: Decimal) -> Option<Decimal> {
        match self {
            Self::Long => entry.checked_add(distance),
            Self::Short => entry.checked_sub(distance),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl FromStr for PositionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Self::Long),
            "short" | "sell" => Ok(Self::Short),
            other => Err(format!("unknown position type '{other}' (expected long or short)")),
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named input field, used to label validation errors and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    AccountSize,
    Leverage,
    EntryPrice,
    PositionType,
    StopLossPrice,
    #[serde(rename = "riskUSD")]
    RiskUsd,
    TakeProfitPrice,
    #[serde(rename = "targetProfitUSD")]
    TargetProfitUsd,
    PositionSize,
}

impl InputField {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AccountSize => "Account size",
            Self::Leverage => "Leverage",
            Self::EntryPrice => "Entry price",
            Self::PositionType => "Position type",
            Self::StopLossPrice => "Stop loss price",
            Self::RiskUsd => "Risk amount (USD)",
            Self::TakeProfitPrice => "Take profit price",
            Self::TargetProfitUsd => "Target profit (USD)",
            Self::PositionSize => "Position size",
        }
    }

    /// What a valid value looks like, for error messages.
    pub fn requirement(self) -> &'static str {
        match self {
            Self::PositionType => "long or short",
            _ => "a positive number",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable snapshot of calculator inputs.
///
/// Required fields are `Option` so that a missing value can be reported by the
/// validator instead of failing at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    /// Capital base in USD (required, > 0)
    pub account_size: Option<Decimal>,

    /// Leverage multiplier (required, > 0)
    pub leverage: Option<Decimal>,

    /// Reference entry price (required, > 0)
    pub entry_price: Option<Decimal>,

    /// Long or short
    pub position_type: PositionType,

    /// Stop-loss price; must not equal entry
    #[serde(default)]
    pub stop_loss_price: Option<Decimal>,

    /// Maximum acceptable loss in USD
    #[serde(default, rename = "riskUSD")]
    pub risk_usd: Option<Decimal>,

    /// Take-profit price; must not equal entry
    #[serde(default)]
    pub take_profit_price: Option<Decimal>,

    /// Desired gain in USD
    #[serde(default, rename = "targetProfitUSD")]
    pub target_profit_usd: Option<Decimal>,

    /// Quantity of the traded asset; derived when absent
    #[serde(default)]
    pub position_size: Option<Decimal>,
}

/// Keep an optional value only when it is strictly positive.
fn supplied(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

impl CalculatorInputs {
    /// Create inputs with the required fields and no optional targets.
    pub fn new(
        account_size: Decimal,
        leverage: Decimal,
        entry_price: Decimal,
        position_type: PositionType,
    ) -> Self {
        Self {
            account_size: Some(account_size),
            leverage: Some(leverage),
            entry_price: Some(entry_price),
            position_type,
            stop_loss_price: None,
            risk_usd: None,
            take_profit_price: None,
            target_profit_usd: None,
            position_size: None,
        }
    }

    #[must_use]
    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_risk_usd(mut self, amount: Decimal) -> Self {
        self.risk_usd = Some(amount);
        self
    }

    #[must_use]
    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_target_profit_usd(mut self, amount: Decimal) -> Self {
        self.target_profit_usd = Some(amount);
        self
    }

    #[must_use]
    pub fn with_position_size(mut self, size: Decimal) -> Self {
        self.position_size = Some(size);
        self
    }

    pub fn stop_loss(&self) -> Option<Decimal> {
        supplied(self.stop_loss_price)
    }

    pub fn risk(&self) -> Option<Decimal> {
        supplied(self.risk_usd)
    }

    pub fn take_profit(&self) -> Option<Decimal> {
        supplied(self.take_profit_price)
    }

    pub fn target_profit(&self) -> Option<Decimal> {
        supplied(self.target_profit_usd)
    }

    pub fn size(&self) -> Option<Decimal> {
        supplied(self.position_size)
    }

    /// Optional fields that were given but will be ignored because they are not positive.
    pub fn ignored_fields(&self) -> Vec<InputField> {
        [
            (InputField::StopLossPrice, self.stop_loss_price),
            (InputField::RiskUsd, self.risk_usd),
            (InputField::TakeProfitPrice, self.take_profit_price),
            (InputField::TargetProfitUsd, self.target_profit_usd),
            (InputField::PositionSize, self.position_size),
        ]
        .into_iter()
        .filter(|(_, value)| matches!(value, Some(v) if *v <= Decimal::ZERO))
        .map(|(field, _)| field)
        .collect()
    }
}
