//! Evaluate an expression against a JSON record

use serde_json::Value;

use super::CliError;
use crate::{Evaluation, Evaluator, KeyMap};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    pub expression: String,
    /// JSON record
    pub input: Option<String>,
    pub prefix: String,
    pub suffix: String,
    pub key_map: KeyMap,
}

pub fn execute_eval(options: &EvalOptions) -> Result<Evaluation, CliError> {
    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let record: Value = serde_json::from_str(input)?;

    let evaluator = Evaluator::new().with_key_map(options.key_map.clone());
    Ok(evaluator.evaluate(&options.expression, &record, &options.prefix, &options.suffix)?)
}
