//! Operator reference generated from the default generator tables

use std::fmt::Write;

use crate::{
    Condition, Evaluator, FnMap, LiteralKind,
    executor::{ElasticExecutor, JsonSqlExecutor, SqlExecutor},
};

fn kinds<G>(fns: &FnMap<G>, condition: Condition) -> String {
    let kinds = fns.kinds(condition);
    if kinds.is_empty() {
        return "-".to_string();
    }
    kinds
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the operator table: which literal kinds every backend accepts.
///
/// A `-` means the operator never matches on that backend.
pub fn operators_reference() -> String {
    let sql = SqlExecutor::default_fn_map();
    let json_sql = JsonSqlExecutor::default_fn_map();
    let elastic = ElasticExecutor::default_fn_map();
    let memory = Evaluator::default_fn_map();

    let mut out = String::from("FILTER EXPRESSION OPERATORS\n\n");
    let _ = writeln!(
        out,
        "  {:<14} {:<18} {:<18} {:<18} {:<18}",
        "operator", "sql/mixed", "json-sql", "elasticsearch", "memory"
    );
    for condition in Condition::ALL {
        let _ = writeln!(
            out,
            "  {:<14} {:<18} {:<18} {:<18} {:<18}",
            condition.symbol(),
            kinds(&sql, condition),
            kinds(&json_sql, condition),
            kinds(&elastic, condition),
            kinds(&memory, condition),
        );
    }

    let literal_kinds: Vec<_> = LiteralKind::ALL.iter().map(|kind| kind.name()).collect();
    let _ = write!(
        out,
        "\nLITERALS\n\n  {}: 42, -1.5, true, false, 'text', \"text\"\n\
         \nCONNECTIVES\n\n  && and || bind left to right with equal precedence; \
         use ( ) to group.\n",
        literal_kinds.join(", ")
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_lists_every_operator() {
        let reference = operators_reference();
        for condition in Condition::ALL {
            assert!(reference.contains(condition.symbol()), "{condition}");
        }
    }

    #[test]
    fn test_greater_than_is_numeric_only() {
        let reference = operators_reference();
        let line = reference
            .lines()
            .find(|line| line.trim_start().starts_with("> "))
            .unwrap();
        assert!(line.contains(LiteralKind::Number.name()));
        assert!(!line.contains(LiteralKind::Str.name()));
    }

    #[test]
    fn test_bit_operators_missing_on_elasticsearch() {
        let reference = operators_reference();
        let line = reference
            .lines()
            .find(|line| line.trim_start().starts_with("containsBit"))
            .unwrap();
        assert!(line.contains(" - "));
    }
}
