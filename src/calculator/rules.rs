//! Ordered candidate rules for the fields that have more than one derivation path.
//!
//! Each field has a fixed precedence list. The resolver walks it and the first
//! rule that yields a value wins; a rule that does not apply returns `Ok(None)`,
//! and a rule that applies but cannot be computed aborts the whole derivation.

use std::fmt::Debug;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalcError;
use crate::models::{CalculatorInputs, PositionType};

use super::arith;

/// Everything a rule may consult: the validated required fields, the supplied
/// optionals, and the always-computed maximum size.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub position_type: PositionType,
    pub account_size: Decimal,
    pub leverage: Decimal,
    pub entry_price: Decimal,
    pub max_position_size: Decimal,
    pub default_offset_pct: Decimal,

    pub stop_loss_price: Option<Decimal>,
    pub risk_usd: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
    pub target_profit_usd: Option<Decimal>,
    pub position_size: Option<Decimal>,
}

impl RuleContext {
    pub fn new(
        inputs: &CalculatorInputs,
        account_size: Decimal,
        leverage: Decimal,
        entry_price: Decimal,
        max_position_size: Decimal,
        default_offset_pct: Decimal,
    ) -> Self {
        Self {
            position_type: inputs.position_type,
            account_size,
            leverage,
            entry_price,
            max_position_size,
            default_offset_pct,
            stop_loss_price: inputs.stop_loss(),
            risk_usd: inputs.risk(),
            take_profit_price: inputs.take_profit(),
            target_profit_usd: inputs.target_profit(),
            position_size: inputs.size(),
        }
    }
}

/// Ways to arrive at the position size, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSizeRule {
    /// Use the size the user gave
    Supplied,
    /// risk / |entry - stop-loss|
    RiskOverStopDistance,
    /// Largest size the account can carry at this leverage
    MaxAffordable,
}

impl PositionSizeRule {
    pub const ORDER: [Self; 3] = [Self::Supplied, Self::RiskOverStopDistance, Self::MaxAffordable];

    pub fn apply(self, ctx: &RuleContext) -> Result<Option<Decimal>, CalcError> {
        match self {
            Self::Supplied => Ok(ctx.position_size),
            Self::RiskOverStopDistance => {
                let (Some(risk), Some(stop_loss)) = (ctx.risk_usd, ctx.stop_loss_price) else {
                    return Ok(None);
                };
                let distance = (ctx.entry_price - stop_loss).abs();
                if distance.is_zero() {
                    return Err(CalcError::DivisionByZero(
                        "stop-loss distance is zero; cannot size the position from risk".into(),
                    ));
                }
                arith::div(risk, distance, "position size").map(Some)
            }
            Self::MaxAffordable => Ok(Some(ctx.max_position_size)),
        }
    }
}

/// Ways to arrive at the stop-loss price, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopLossRule {
    Supplied,
    /// entry -/+ risk / size
    FromRiskBudget,
    /// Fixed percentage move against the position
    DefaultOffset,
}

impl StopLossRule {
    pub const ORDER: [Self; 3] = [Self::Supplied, Self::FromRiskBudget, Self::DefaultOffset];

    pub fn apply(self, ctx: &RuleContext, position_size: Decimal) -> Result<Option<Decimal>, CalcError> {
        match self {
            Self::Supplied => Ok(ctx.stop_loss_price),
            Self::FromRiskBudget => {
                let Some(risk) = ctx.risk_usd else {
                    return Ok(None);
                };
                let distance = distance_per_unit(risk, position_size, "stop-loss")?;
                let price = ctx
                    .position_type
                    .adverse_price(ctx.entry_price, distance)
                    .ok_or_else(|| CalcError::Overflow("stop-loss price".into()))?;
                ensure_positive_price(price, "stop-loss").map(Some)
            }
            Self::DefaultOffset => {
                let factor = match ctx.position_type {
                    PositionType::Long => Decimal::ONE - ctx.default_offset_pct,
                    PositionType::Short => Decimal::ONE + ctx.default_offset_pct,
                };
                arith::mul(ctx.entry_price, factor, "default stop-loss price").map(Some)
            }
        }
    }
}

/// Ways to arrive at the take-profit price, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeProfitRule {
    Supplied,
    /// entry +/- target profit / size
    FromProfitTarget,
    /// Fixed percentage move in favour of the position
    DefaultOffset,
}

impl TakeProfitRule {
    pub const ORDER: [Self; 3] = [Self::Supplied, Self::FromProfitTarget, Self::DefaultOffset];

    pub fn apply(self, ctx: &RuleContext, position_size: Decimal) -> Result<Option<Decimal>, CalcError> {
        match self {
            Self::Supplied => Ok(ctx.take_profit_price),
            Self::FromProfitTarget => {
                let Some(target) = ctx.target_profit_usd else {
                    return Ok(None);
                };
                let distance = distance_per_unit(target, position_size, "take-profit")?;
                let price = ctx
                    .position_type
                    .favorable_price(ctx.entry_price, distance)
                    .ok_or_else(|| CalcError::Overflow("take-profit price".into()))?;
                ensure_positive_price(price, "take-profit").map(Some)
            }
            Self::DefaultOffset => {
                let factor = match ctx.position_type {
                    PositionType::Long => Decimal::ONE + ctx.default_offset_pct,
                    PositionType::Short => Decimal::ONE - ctx.default_offset_pct,
                };
                arith::mul(ctx.entry_price, factor, "default take-profit price").map(Some)
            }
        }
    }
}

/// Price distance that turns a USD amount into a per-unit move.
fn distance_per_unit(amount: Decimal, position_size: Decimal, what: &str) -> Result<Decimal, CalcError> {
    if position_size.is_zero() {
        return Err(CalcError::InvalidArgument(format!(
            "position size is zero; cannot derive the {what} price"
        )));
    }
    arith::div(amount, position_size, &format!("{what} distance"))
}

fn ensure_positive_price(price: Decimal, what: &str) -> Result<Decimal, CalcError> {
    if price <= Decimal::ZERO {
        return Err(CalcError::InvalidArgument(format!(
            "derived {what} price {price} is not positive"
        )));
    }
    Ok(price)
}

/// The rule that produced each multi-path field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub position_size: PositionSizeRule,
    pub stop_loss: StopLossRule,
    pub take_profit: TakeProfitRule,
}

/// Try `rules` in order and return the first value produced, with the rule that produced it.
pub fn resolve_first<R, F>(field: &str, rules: &[R], mut apply: F) -> Result<(Decimal, R), CalcError>
where
    R: Copy + Debug,
    F: FnMut(R) -> Result<Option<Decimal>, CalcError>,
{
    for &rule in rules {
        if let Some(value) = apply(rule)? {
            debug!(field, ?rule, %value, "Resolved");
            return Ok((value, rule));
        }
        debug!(field, ?rule, "Rule not applicable");
    }

    Err(CalcError::InvalidArgument(format!("no rule could resolve {field}")))
}
