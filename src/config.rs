//! Calculator configuration and reset-to-default inputs.

use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::PositionType;

/// Values the form resets to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDefaults {
    pub account_size: Decimal,
    pub leverage: Decimal,
    pub entry_price: Decimal,
    pub position_type: PositionType,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            account_size: dec!(10000),
            leverage: dec!(10),
            entry_price: dec!(50000),
            position_type: PositionType::Long,
        }
    }
}

/// Configuration for the position calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Price offset used when no stop-loss/take-profit can be derived (0.05 = 5%)
    pub default_offset_pct: Decimal,

    /// Decimal places kept on the risk/reward ratio
    pub ratio_decimal_places: u32,

    /// Reset-to-default form values
    pub defaults: InputDefaults,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_offset_pct: dec!(0.05),
            ratio_decimal_places: 2,
            defaults: InputDefaults::default(),
        }
    }
}

fn override_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid {key}: '{raw}'"))?;
        debug!(key, value = %raw, "Config override");
    }
    Ok(())
}

impl CalculatorConfig {
    /// Load from the process environment, reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults overridden by `LEVCALC_*` keys resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        override_with(&lookup, "LEVCALC_DEFAULT_OFFSET_PCT", &mut config.default_offset_pct)?;
        override_with(&lookup, "LEVCALC_RATIO_DECIMAL_PLACES", &mut config.ratio_decimal_places)?;
        override_with(&lookup, "LEVCALC_ACCOUNT_SIZE", &mut config.defaults.account_size)?;
        override_with(&lookup, "LEVCALC_LEVERAGE", &mut config.defaults.leverage)?;
        override_with(&lookup, "LEVCALC_ENTRY_PRICE", &mut config.defaults.entry_price)?;
        override_with(&lookup, "LEVCALC_POSITION_TYPE", &mut config.defaults.position_type)?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_offset_pct <= Decimal::ZERO || self.default_offset_pct >= Decimal::ONE {
            anyhow::bail!(
                "default_offset_pct must be between 0 and 1 (exclusive), got {}",
                self.default_offset_pct
            );
        }
        if self.ratio_decimal_places > 28 {
            anyhow::bail!(
                "ratio_decimal_places must be at most 28, got {}",
                self.ratio_decimal_places
            );
        }
        let d = &self.defaults;
        if d.account_size <= Decimal::ZERO || d.leverage <= Decimal::ZERO || d.entry_price <= Decimal::ZERO {
            anyhow::bail!("default account size, leverage and entry price must be positive");
        }
        Ok(())
    }
}
