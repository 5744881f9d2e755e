//! Data models for calculator inputs, raw forms, and derived metrics.

mod form;
mod inputs;
mod metrics;

pub use form::{InputForm, ParsedForm};
pub use inputs::{CalculatorInputs, InputField, PositionType};
pub use metrics::PositionMetrics;
