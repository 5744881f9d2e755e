//! Fully-populated position metrics produced by the derivation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::Resolution;

use super::PositionType;

/// Derived sizing, margin, and risk figures for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    pub position_type: PositionType,

    // === Sizing ===
    /// Quantity of the traded asset
    pub position_size: Decimal,

    /// Notional value in USD (entry * size)
    pub position_value: Decimal,

    /// Margin posted in USD (value / leverage)
    pub required_margin: Decimal,

    /// Largest size the account can open at this leverage
    pub max_position_size: Decimal,

    pub leverage: Decimal,

    // === Prices ===
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,

    /// Simplified liquidation level (no maintenance margin, funding, or fees)
    pub liquidation_price: Decimal,

    // === Risk/Reward ===
    /// Loss in USD if the stop-loss is hit
    pub risk_amount: Decimal,

    /// Gain in USD if the take-profit is hit
    pub profit_amount: Decimal,

    /// profit / risk, 0 when there is no risk
    pub risk_reward_ratio: Decimal,

    /// Which rule produced each derived field
    pub resolution: Resolution,
}
