//! Leveraged position calculator.
//!
//! Derives position size, margin, stop-loss/take-profit, liquidation price and
//! risk/reward from a sparse set of inputs, choosing per field the first
//! derivation rule whose inputs are present.

pub mod batch;
pub mod calculator;
pub mod config;
pub mod error;
pub mod models;
pub mod report;

pub use calculator::{derive, validate, Evaluation, PositionCalculator, Warning};
pub use config::{CalculatorConfig, InputDefaults};
pub use error::{CalcError, EvaluationError, ValidationError};
pub use models::{CalculatorInputs, InputField, InputForm, PositionMetrics, PositionType};
