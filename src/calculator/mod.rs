//! Position calculator: validation, rule-based derivation, and warnings.

mod arith;
mod engine;
mod rules;
mod validator;
mod warnings;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::CalculatorConfig;
use crate::error::{CalcError, EvaluationError, ValidationError};
use crate::models::{CalculatorInputs, InputForm, PositionMetrics};

pub use engine::liquidation_price;
pub use rules::{
    resolve_first, PositionSizeRule, Resolution, RuleContext, StopLossRule, TakeProfitRule,
};
pub use warnings::{IgnoredReason, Warning};

use warnings::{input_warnings, metric_warnings};

/// Successful evaluation: metrics plus any warnings raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub metrics: PositionMetrics,
    pub warnings: Vec<Warning>,
}

/// Stateless calculator. Holds configuration only; every call returns its own
/// errors and warnings, so one instance can serve concurrent evaluations.
#[derive(Debug, Clone, Default)]
pub struct PositionCalculator {
    config: CalculatorConfig,
}

impl PositionCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn validate(&self, inputs: &CalculatorInputs) -> Result<(), Vec<ValidationError>> {
        validator::validate(inputs)
    }

    pub fn derive(&self, inputs: &CalculatorInputs) -> Result<PositionMetrics, CalcError> {
        engine::derive_with(inputs, &self.config)
    }

    /// Validate, derive, then attach warnings.
    ///
    /// Validation errors come back as a batch and derivation is not attempted.
    /// A derivation error aborts the evaluation; no partial metrics are returned.
    pub fn evaluate(&self, inputs: &CalculatorInputs) -> Result<Evaluation, EvaluationError> {
        if let Err(errors) = self.validate(inputs) {
            warn!(count = errors.len(), "Input validation failed");
            return Err(EvaluationError::Invalid(errors));
        }

        let metrics = self.derive(inputs).map_err(|e| {
            warn!(error = %e, "Derivation failed");
            EvaluationError::from(e)
        })?;

        let mut warnings = input_warnings(inputs);
        if let Some(account_size) = inputs.account_size {
            warnings.extend(metric_warnings(&metrics, account_size));
        }
        for w in &warnings {
            warn!(warning = %w, "Position warning");
        }

        info!(
            position_type = %metrics.position_type,
            position_size = %metrics.position_size,
            required_margin = %metrics.required_margin,
            risk_reward = %metrics.risk_reward_ratio,
            warnings = warnings.len(),
            "Evaluated position"
        );

        Ok(Evaluation { metrics, warnings })
    }

    /// Parse a raw text form and evaluate it. Parse warnings come first.
    pub fn evaluate_form(&self, form: &InputForm) -> Result<Evaluation, EvaluationError> {
        let parsed = form.parse().map_err(|errors| {
            warn!(count = errors.len(), "Form parsing failed");
            EvaluationError::Invalid(errors)
        })?;

        let mut eval = self.evaluate(&parsed.inputs)?;
        let mut warnings = parsed.warnings;
        warnings.append(&mut eval.warnings);
        eval.warnings = warnings;
        Ok(eval)
    }
}

/// Validate with the default configuration.
pub fn validate(inputs: &CalculatorInputs) -> Result<(), Vec<ValidationError>> {
    validator::validate(inputs)
}

/// Derive with the default configuration.
pub fn derive(inputs: &CalculatorInputs) -> Result<PositionMetrics, CalcError> {
    engine::derive_with(inputs, &CalculatorConfig::default())
}
