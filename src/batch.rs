//! Batch evaluation of many scenarios, one task per scenario.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::calculator::{Evaluation, PositionCalculator};
use crate::error::EvaluationError;
use crate::models::{InputForm, PositionMetrics};

/// One named set of inputs, kept as raw text so a malformed value is
/// reported against its own scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub name: Option<String>,
    pub form: InputForm,
}

impl Scenario {
    fn from_value(value: &Value) -> Self {
        let field = |key: &str| match value.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            name: field("name"),
            form: InputForm {
                account_size: field("accountSize"),
                leverage: field("leverage"),
                entry_price: field("entryPrice"),
                position_type: field("positionType"),
                stop_loss_price: field("stopLossPrice"),
                risk_usd: field("riskUSD"),
                take_profit_price: field("takeProfitPrice"),
                target_profit_usd: field("targetProfitUSD"),
                position_size: field("positionSize"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Invalid,
    Failed,
}

/// Result of one scenario, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub index: usize,
    pub name: Option<String>,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PositionMetrics>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl BatchOutcome {
    fn new(index: usize, name: Option<String>, result: Result<Evaluation, EvaluationError>) -> Self {
        match result {
            Ok(eval) => Self {
                index,
                name,
                status: OutcomeStatus::Ok,
                metrics: Some(eval.metrics),
                warnings: eval.warnings.iter().map(ToString::to_string).collect(),
                errors: Vec::new(),
            },
            Err(err) => Self {
                index,
                name,
                status: match err {
                    EvaluationError::Invalid(_) => OutcomeStatus::Invalid,
                    EvaluationError::Derivation(_) => OutcomeStatus::Failed,
                },
                metrics: None,
                warnings: Vec::new(),
                errors: err.messages(),
            },
        }
    }
}

/// Parse scenarios from a JSON array.
///
/// Only the outer array has to be well formed. Values inside each scenario are
/// taken as text and checked when that scenario is evaluated.
pub fn parse_scenarios(json: &str) -> Result<Vec<Scenario>> {
    let values: Vec<Value> =
        serde_json::from_str(json).context("Failed to parse scenarios (expected a JSON array)")?;
    Ok(values.iter().map(Scenario::from_value).collect())
}

/// Read and parse a scenario file.
pub async fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<Scenario>> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenarios = parse_scenarios(&json)?;
    debug!(path = %path.display(), count = scenarios.len(), "Loaded scenarios");
    Ok(scenarios)
}

/// Evaluate every scenario on its own task. Outcomes come back in input order.
pub async fn run_batch(
    calculator: &PositionCalculator,
    scenarios: Vec<Scenario>,
) -> Result<Vec<BatchOutcome>> {
    let total = scenarios.len();
    let mut tasks = JoinSet::new();

    for (index, scenario) in scenarios.into_iter().enumerate() {
        let calculator = calculator.clone();
        tasks.spawn(async move {
            let result = calculator.evaluate_form(&scenario.form);
            BatchOutcome::new(index, scenario.name, result)
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("Scenario task failed")?);
    }
    outcomes.sort_by_key(|o| o.index);

    let ok = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Ok)
        .count();
    info!(total, ok, failed = total - ok, "Batch complete");

    Ok(outcomes)
}
