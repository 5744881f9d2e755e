//! Plain-text rendering of evaluations for the terminal.
//!
//! Currency fields use 2 decimals, asset quantities 4.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculator::Evaluation;
use crate::error::{EvaluationError, ValidationError};

fn fixed(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

fn usd(value: Decimal) -> String {
    format!("${:.2}", fixed(value, 2))
}

fn qty(value: Decimal) -> String {
    format!("{:.4}", fixed(value, 4))
}

/// Result table followed by any warnings.
pub struct EvaluationTable<'a>(pub &'a Evaluation);

impl fmt::Display for EvaluationTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eval = self.0;
        let m = &eval.metrics;

        writeln!(f, "\n=== {} position ===", m.position_type.as_str().to_uppercase())?;

        writeln!(f, "\n--- Sizing ---")?;
        writeln!(f, "Position Size:     {:>16}", qty(m.position_size))?;
        writeln!(f, "Max Position Size: {:>16}", qty(m.max_position_size))?;
        writeln!(f, "Position Value:    {:>16}", usd(m.position_value))?;
        writeln!(f, "Required Margin:   {:>16}", usd(m.required_margin))?;
        writeln!(f, "Leverage:          {:>15}x", m.leverage.normalize())?;

        writeln!(f, "\n--- Prices ---")?;
        writeln!(f, "Entry Price:       {:>16}", usd(m.entry_price))?;
        writeln!(f, "Stop Loss:         {:>16}", usd(m.stop_loss_price))?;
        writeln!(f, "Take Profit:       {:>16}", usd(m.take_profit_price))?;
        writeln!(f, "Liquidation Price: {:>16}", usd(m.liquidation_price))?;

        writeln!(f, "\n--- Risk/Reward ---")?;
        writeln!(f, "Risk Amount:       {:>16}", usd(m.risk_amount))?;
        writeln!(f, "Profit Amount:     {:>16}", usd(m.profit_amount))?;
        writeln!(f, "Risk/Reward:       {:>16}", format!("1:{:.2}", fixed(m.risk_reward_ratio, 2)))?;

        writeln!(
            f,
            "\n(size: {:?}, stop: {:?}, target: {:?})",
            m.resolution.position_size, m.resolution.stop_loss, m.resolution.take_profit
        )?;

        if !eval.warnings.is_empty() {
            writeln!(f, "\n--- Warnings ({}) ---", eval.warnings.len())?;
            for w in &eval.warnings {
                writeln!(f, "  ! {w}")?;
            }
        }

        Ok(())
    }
}

/// Validation errors, one per line.
pub struct ErrorList<'a>(pub &'a [ValidationError]);

impl fmt::Display for ErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n--- Errors ({}) ---", self.0.len())?;
        for e in self.0 {
            writeln!(f, "  x {e}")?;
        }
        Ok(())
    }
}

pub struct FailureReport<'a>(pub &'a EvaluationError);

impl fmt::Display for FailureReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            EvaluationError::Invalid(errors) => write!(f, "{}", ErrorList(errors)),
            EvaluationError::Derivation(e) => write!(f, "\n--- Error ---\n  x {e}\n"),
        }
    }
}
