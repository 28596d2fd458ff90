//! CLI support for filter-expr
//!
//! The `filterc` binary is a thin clap front end over these functions; they
//! are public so other tools can embed the same commands.

mod check;
mod compile;
mod docs;
mod eval;

pub use check::{CheckOptions, execute_check};
pub use compile::{Backend, CompileOptions, execute_compile};
pub use docs::operators_reference;
pub use eval::{EvalOptions, execute_eval};

use std::{fs, io, path::Path};

use crate::{KeyMap, ParseError};

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Invalid key mapping '{0}', expected FROM=TO")]
    InvalidKeyMapping(String),

    #[error("The json-sql backend needs a JSON column, set one with --column")]
    MissingColumn,
}

/// Parse one `from=to` key mapping.
pub fn parse_key_mapping(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(CliError::InvalidKeyMapping(arg.to_string())),
    }
}

/// Build a key map from an optional JSON object file plus inline mappings.
///
/// Inline mappings override entries from the file.
pub fn load_key_map(
    file: Option<&Path>,
    mappings: &[(String, String)],
) -> Result<KeyMap, CliError> {
    let mut key_map = match file {
        Some(path) => serde_json::from_str::<KeyMap>(&fs::read_to_string(path)?)?,
        None => KeyMap::new(),
    };
    key_map.extend(mappings.iter().cloned());
    Ok(key_map)
}

/// Underline the character at byte `offset` of `expr`.
pub fn caret(expr: &str, offset: usize) -> String {
    let column = expr
        .get(..offset)
        .map(|head| head.chars().count())
        .unwrap_or(offset);
    format!("  {expr}\n  {}^", " ".repeat(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_mapping() {
        assert_eq!(
            parse_key_mapping("name=user_name").unwrap(),
            ("name".to_string(), "user_name".to_string())
        );
        assert!(matches!(
            parse_key_mapping("name"),
            Err(CliError::InvalidKeyMapping(_))
        ));
        assert!(matches!(
            parse_key_mapping("=x"),
            Err(CliError::InvalidKeyMapping(_))
        ));
    }

    #[test]
    fn test_inline_mappings_override() {
        let mappings = [("a".to_string(), "b".to_string()), ("a".to_string(), "c".to_string())];
        let key_map = load_key_map(None, &mappings).unwrap();
        assert_eq!(key_map.get("a").map(String::as_str), Some("c"));
    }

    #[test]
    fn test_caret() {
        assert_eq!(caret("a == )", 5), "  a == )\n       ^");
    }
}
