//! Compile expressions with one of the query backends

use clap::ValueEnum;
use serde_json::{Value, json};

use super::CliError;
use crate::{
    KeyMap,
    executor::{ElasticExecutor, Executor, JsonSqlExecutor, MixedExecutor, SqlExecutor},
};

/// Target of the compile command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Parameterised SQL over plain columns
    #[default]
    Sql,
    /// Parameterised SQL over paths inside one JSON column
    JsonSql,
    /// Plain columns, or `column.path` inside a JSON column
    Mixed,
    /// Elasticsearch Query DSL
    #[value(alias = "elasticsearch")]
    Es,
}

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub expression: String,
    pub backend: Backend,
    pub prefix: String,
    pub suffix: String,
    pub key_map: KeyMap,
    /// JSON column for the json-sql backend
    pub column: String,
}

/// Compile and render the result as JSON.
///
/// SQL backends produce `{"sql", "params", "keys"}`; Elasticsearch produces
/// `{"query", "keys"}` with `match_all` standing in for an empty filter.
/// The json-sql backend fails with [`CliError::MissingColumn`] when no column
/// is set.
pub fn execute_compile(options: &CompileOptions) -> Result<Value, CliError> {
    let expr = options.expression.as_str();
    let (prefix, suffix) = (options.prefix.as_str(), options.suffix.as_str());
    let key_map = options.key_map.clone();

    let sql = match options.backend {
        Backend::Sql => SqlExecutor::new()
            .with_key_map(key_map)
            .compile(expr, prefix, suffix)?,
        Backend::JsonSql => {
            let column = options.column.trim();
            if column.is_empty() {
                return Err(CliError::MissingColumn);
            }
            JsonSqlExecutor::new(column)
                .with_key_map(key_map)
                .compile(expr, prefix, suffix)?
        }
        Backend::Mixed => MixedExecutor::new()
            .with_key_map(key_map)
            .compile(expr, prefix, suffix)?,
        Backend::Es => {
            let compiled = ElasticExecutor::new()
                .with_key_map(key_map)
                .compile(expr, prefix, suffix)?;
            let mut body = compiled.to_search_body();
            body["keys"] = json!(compiled.keys);
            return Ok(body);
        }
    };

    Ok(json!({
        "sql": sql.sql(),
        "params": sql.params(),
        "keys": sql.keys,
    }))
}
