//! Validate expressions without compiling them

use super::CliError;
use crate::{build, group, lexer::tokenize, output::to_expression};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter expression to validate
    pub expression: String,
}

/// Validate an expression and return its normalised form.
///
/// An empty expression is valid and normalises to the empty string.
pub fn execute_check(options: &CheckOptions) -> Result<String, CliError> {
    let grouped = group(tokenize(&options.expression))?;
    let ast = build(&grouped);
    tracing::debug!(
        terms = ast.as_ref().map(|ast| ast.terms().len()).unwrap_or(0),
        "expression is valid"
    );
    Ok(to_expression(&grouped))
}
