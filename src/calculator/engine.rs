//! Derivation engine: inputs snapshot in, fully-populated `PositionMetrics` out.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::config::CalculatorConfig;
use crate::error::CalcError;
use crate::models::{CalculatorInputs, PositionMetrics, PositionType};

use super::arith::{div, mul};
use super::rules::{
    resolve_first, PositionSizeRule, Resolution, RuleContext, StopLossRule, TakeProfitRule,
};

fn required(value: Option<Decimal>, name: &str) -> Result<Decimal, CalcError> {
    match value {
        Some(v) if v > Decimal::ZERO => Ok(v),
        Some(v) => Err(CalcError::InvalidArgument(format!(
            "{name} must be positive, got {v}"
        ))),
        None => Err(CalcError::InvalidArgument(format!("{name} is required"))),
    }
}

/// Simplified liquidation level: one full margin move against the position.
///
/// Ignores maintenance margin, funding and fees. For a long at leverage <= 1 the
/// raw level is at or below zero and is floored at zero.
pub fn liquidation_price(
    position_type: PositionType,
    entry_price: Decimal,
    leverage: Decimal,
) -> Result<Decimal, CalcError> {
    let distance = div(entry_price, leverage, "liquidation distance")?;
    let price = position_type
        .adverse_price(entry_price, distance)
        .ok_or_else(|| CalcError::Overflow("liquidation price".into()))?;
    Ok(price.max(Decimal::ZERO))
}

/// Derive every metric from a (possibly sparse) input snapshot.
///
/// Steps run in a fixed order and each may use earlier results:
/// max size, position size, stop-loss, take-profit, value, margin,
/// liquidation, risk/profit amounts, then the ratio.
pub fn derive_with(
    inputs: &CalculatorInputs,
    config: &CalculatorConfig,
) -> Result<PositionMetrics, CalcError> {
    let account_size = required(inputs.account_size, "account size")?;
    let leverage = required(inputs.leverage, "leverage")?;
    let entry_price = required(inputs.entry_price, "entry price")?;
    let position_type = inputs.position_type;

    let buying_power = mul(account_size, leverage, "buying power")?;
    let max_position_size = div(buying_power, entry_price, "max position size")?;

    let ctx = RuleContext::new(
        inputs,
        account_size,
        leverage,
        entry_price,
        max_position_size,
        config.default_offset_pct,
    );

    let (position_size, size_rule) =
        resolve_first("position size", &PositionSizeRule::ORDER, |rule| rule.apply(&ctx))?;
    let (stop_loss_price, stop_rule) = resolve_first("stop-loss price", &StopLossRule::ORDER, |rule| {
        rule.apply(&ctx, position_size)
    })?;
    let (take_profit_price, target_rule) =
        resolve_first("take-profit price", &TakeProfitRule::ORDER, |rule| {
            rule.apply(&ctx, position_size)
        })?;

    let position_value = mul(entry_price, position_size, "position value")?;
    let required_margin = div(position_value, leverage, "required margin")?;
    let liquidation_price = liquidation_price(position_type, entry_price, leverage)?;

    let risk_amount = mul((entry_price - stop_loss_price).abs(), position_size, "risk amount")?;
    let profit_amount = mul(
        (take_profit_price - entry_price).abs(),
        position_size,
        "profit amount",
    )?;

    let risk_reward_ratio = if risk_amount > Decimal::ZERO {
        div(profit_amount, risk_amount, "risk/reward ratio")?.round_dp_with_strategy(
            config.ratio_decimal_places,
            RoundingStrategy::MidpointAwayFromZero,
        )
    } else {
        Decimal::ZERO
    };

    debug!(
        %position_size,
        %stop_loss_price,
        %take_profit_price,
        %liquidation_price,
        %risk_reward_ratio,
        "Derived position metrics"
    );

    Ok(PositionMetrics {
        position_type,
        position_size,
        position_value,
        required_margin,
        max_position_size,
        leverage,
        entry_price,
        stop_loss_price,
        take_profit_price,
        liquidation_price,
        risk_amount,
        profit_amount,
        risk_reward_ratio,
        resolution: Resolution {
            position_size: size_rule,
            stop_loss: stop_rule,
            take_profit: target_rule,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    fn derive(inputs: &CalculatorInputs) -> Result<PositionMetrics, CalcError> {
        derive_with(inputs, &CalculatorConfig::default())
    }

    fn btc_long() -> CalculatorInputs {
        CalculatorInputs::new(dec!(10000), dec!(10), dec!(50000), PositionType::Long)
    }

    #[test]
    fn test_defaults_only_long() {
        let m = derive(&btc_long()).unwrap();

        assert_eq!(m.max_position_size, dec!(2));
        assert_eq!(m.position_size, dec!(2));
        assert_eq!(m.stop_loss_price, dec!(47500));
        assert_eq!(m.take_profit_price, dec!(52500));
        assert_eq!(m.liquidation_price, dec!(45000));
        assert_eq!(m.position_value, dec!(100000));
        assert_eq!(m.required_margin, dec!(10000));
        assert_eq!(m.risk_amount, dec!(5000));
        assert_eq!(m.profit_amount, dec!(5000));
        assert_eq!(m.risk_reward_ratio, dec!(1));
        assert_eq!(
            m.resolution,
            Resolution {
                position_size: PositionSizeRule::MaxAffordable,
                stop_loss: StopLossRule::DefaultOffset,
                take_profit: TakeProfitRule::DefaultOffset,
            }
        );
    }

    #[test]
    fn test_defaults_only_short() {
        let mut inputs = btc_long();
        inputs.position_type = PositionType::Short;
        let m = derive(&inputs).unwrap();

        assert_eq!(m.stop_loss_price, dec!(52500));
        assert_eq!(m.take_profit_price, dec!(47500));
        assert_eq!(m.liquidation_price, dec!(55000));
    }

    #[test]
    fn test_size_from_risk_and_stop() {
        let inputs = btc_long()
            .with_risk_usd(dec!(500))
            .with_stop_loss(dec!(49000));
        let m = derive(&inputs).unwrap();

        assert_eq!(m.position_size, dec!(0.5));
        assert_eq!(m.stop_loss_price, dec!(49000));
        assert_eq!(m.risk_amount, dec!(500));
        assert_eq!(m.resolution.position_size, PositionSizeRule::RiskOverStopDistance);
        assert_eq!(m.resolution.stop_loss, StopLossRule::Supplied);
    }

    #[test]
    fn test_stop_from_supplied_size_and_risk() {
        let inputs = btc_long()
            .with_position_size(dec!(0.5))
            .with_risk_usd(dec!(500));
        let m = derive(&inputs).unwrap();

        assert_eq!(m.position_size, dec!(0.5));
        assert_eq!(m.stop_loss_price, dec!(49000));
        assert_eq!(m.resolution.stop_loss, StopLossRule::FromRiskBudget);
    }

    #[test]
    fn test_target_profit_short() {
        let mut inputs = btc_long()
            .with_position_size(dec!(1))
            .with_target_profit_usd(dec!(2000))
            .with_stop_loss(dec!(51000));
        inputs.position_type = PositionType::Short;
        let m = derive(&inputs).unwrap();

        assert_eq!(m.take_profit_price, dec!(48000));
        assert_eq!(m.risk_amount, dec!(1000));
        assert_eq!(m.profit_amount, dec!(2000));
        assert_eq!(m.risk_reward_ratio, dec!(2));
        assert_eq!(m.resolution.take_profit, TakeProfitRule::FromProfitTarget);
    }

    #[test]
    fn test_supplied_size_beats_risk_sizing() {
        let inputs = btc_long()
            .with_position_size(dec!(0.1))
            .with_risk_usd(dec!(500))
            .with_stop_loss(dec!(49000));
        let m = derive(&inputs).unwrap();

        assert_eq!(m.position_size, dec!(0.1));
        assert_eq!(m.resolution.position_size, PositionSizeRule::Supplied);
        // Risk is what the stop actually costs at this size, not the budget
        assert_eq!(m.risk_amount, dec!(100));
    }

    #[test]
    fn test_ratio_rounds_to_two_places() {
        let inputs = btc_long()
            .with_position_size(dec!(1))
            .with_stop_loss(dec!(49700))
            .with_take_profit(dec!(51000));
        let m = derive(&inputs).unwrap();

        // 1000 / 300 = 3.333...
        assert_eq!(m.risk_reward_ratio, dec!(3.33));
    }

    #[test]
    fn test_zero_risk_gives_zero_ratio() {
        // Stop equal to entry only reaches the engine on a direct call
        let inputs = btc_long().with_stop_loss(dec!(50000));
        let m = derive(&inputs).unwrap();

        assert_eq!(m.risk_amount, Decimal::ZERO);
        assert_eq!(m.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_zero_stop_distance_with_risk_fails() {
        let inputs = btc_long()
            .with_stop_loss(dec!(50000))
            .with_risk_usd(dec!(500));

        assert!(matches!(derive(&inputs), Err(CalcError::DivisionByZero(_))));
    }

    #[test]
    fn test_missing_required_is_invalid_argument() {
        let mut inputs = btc_long();
        inputs.entry_price = None;
        assert!(matches!(derive(&inputs), Err(CalcError::InvalidArgument(_))));

        let mut inputs = btc_long();
        inputs.leverage = Some(dec!(-1));
        assert!(matches!(derive(&inputs), Err(CalcError::InvalidArgument(_))));
    }

    #[test]
    fn test_overflow_is_reported() {
        let inputs = CalculatorInputs::new(Decimal::MAX, dec!(10), dec!(1), PositionType::Long);
        assert!(matches!(derive(&inputs), Err(CalcError::Overflow(_))));
    }

    #[test]
    fn test_liquidation_floor_for_unlevered_long() {
        assert_eq!(
            liquidation_price(PositionType::Long, dec!(100), dec!(0.5)),
            Ok(Decimal::ZERO)
        );
        assert_eq!(
            liquidation_price(PositionType::Short, dec!(100), dec!(0.5)),
            Ok(dec!(300))
        );
    }

    #[test]
    fn test_max_position_size_formula() {
        let cases = [
            (dec!(10000), dec!(10), dec!(50000)),
            (dec!(1234.56), dec!(3), dec!(0.0417)),
            (dec!(250), dec!(125), dec!(3021.7)),
            (dec!(1), dec!(1), dec!(7)),
        ];

        for (account, leverage, entry) in cases {
            let inputs = CalculatorInputs::new(account, leverage, entry, PositionType::Long);
            let m = derive(&inputs).unwrap();

            let expected = account.to_f64().unwrap() * leverage.to_f64().unwrap()
                / entry.to_f64().unwrap();
            let actual = m.max_position_size.to_f64().unwrap();
            assert!(((actual - expected) / expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_custom_offset_and_precision() {
        let config = CalculatorConfig {
            default_offset_pct: dec!(0.02),
            ratio_decimal_places: 4,
            ..Default::default()
        };
        let inputs = btc_long().with_take_profit(dec!(51000)).with_position_size(dec!(1));
        let m = derive_with(&inputs, &config).unwrap();

        assert_eq!(m.stop_loss_price, dec!(49000));
        assert_eq!(m.risk_reward_ratio, dec!(1));

        let inputs = btc_long().with_take_profit(dec!(50333)).with_position_size(dec!(1));
        let m = derive_with(&inputs, &config).unwrap();
        // 333 / 1000
        assert_eq!(m.risk_reward_ratio, dec!(0.333));
    }

    #[test]
    fn test_idempotent() {
        let inputs = btc_long()
            .with_risk_usd(dec!(321.5))
            .with_target_profit_usd(dec!(777));

        let first = derive(&inputs).unwrap();
        let second = derive(&inputs).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.position_size.serialize(), second.position_size.serialize());
        assert_eq!(
            first.stop_loss_price.serialize(),
            second.stop_loss_price.serialize()
        );
    }
}
