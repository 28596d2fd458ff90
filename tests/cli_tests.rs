// tests/cli_tests.rs
#![cfg(feature = "cli")]

use filter_expr::KeyMap;
use filter_expr::cli::{
    Backend, CheckOptions, CliError, CompileOptions, EvalOptions, execute_check, execute_compile,
    execute_eval, load_key_map, operators_reference,
};
use serde_json::json;

fn compile_options(expression: &str, backend: Backend) -> CompileOptions {
    CompileOptions {
        expression: expression.to_string(),
        backend,
        ..Default::default()
    }
}

// ============================================================================
// Compile
// ============================================================================

#[test]
fn test_compile_sql() {
    let options = compile_options("age >= 18 && city == 'NY'", Backend::Sql);
    let output = execute_compile(&options).unwrap();
    assert_eq!(
        output,
        json!({
            "sql": "( age >= ? AND city = ? )",
            "params": [18.0, "NY"],
            "keys": ["age", "city"],
        })
    );
}

#[test]
fn test_compile_json_sql_uses_column() {
    let mut options = compile_options("perm containsBit 4", Backend::JsonSql);
    options.column = "attrs".to_string();

    let output = execute_compile(&options).unwrap();
    assert_eq!(
        output["sql"],
        json!(r#"JSON_EXTRACT(attrs, CONCAT('$.', '"', ?, '"', '')) & ? = ?"#)
    );
    assert_eq!(output["params"], json!(["perm", 4, 4]));
}

#[test]
fn test_compile_json_sql_requires_column() {
    let options = compile_options("size >= 3", Backend::JsonSql);
    let err = execute_compile(&options).unwrap_err();
    assert!(matches!(err, CliError::MissingColumn), "{err:?}");

    let mut options = compile_options("", Backend::JsonSql);
    options.column = "  ".to_string();
    assert!(matches!(execute_compile(&options), Err(CliError::MissingColumn)));
}

#[test]
fn test_compile_mixed() {
    let options = compile_options("a == 1 && doc.b == 2", Backend::Mixed);
    let output = execute_compile(&options).unwrap();
    assert_eq!(output["keys"], json!(["a", "doc.b"]));
}

#[test]
fn test_compile_elasticsearch() {
    let mut options = compile_options("age > 30", Backend::Es);
    options.prefix = "person".to_string();

    let output = execute_compile(&options).unwrap();
    assert_eq!(
        output,
        json!({
            "query": { "range": { "person.age": { "gt": 30.0 } } },
            "keys": ["person.age"],
        })
    );
}

#[test]
fn test_compile_empty_expression() {
    let output = execute_compile(&compile_options("", Backend::Sql)).unwrap();
    assert_eq!(output, json!({ "sql": "", "params": [], "keys": [] }));

    let output = execute_compile(&compile_options("", Backend::Es)).unwrap();
    assert_eq!(output["query"], json!({ "match_all": {} }));
}

#[test]
fn test_compile_parse_error() {
    let err = execute_compile(&compile_options("a == ", Backend::Sql)).unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
}

// ============================================================================
// Eval
// ============================================================================

#[test]
fn test_eval() {
    let options = EvalOptions {
        expression: "name == 'alice' && perm containsBit 4".to_string(),
        input: Some(r#"{"name": "Alice", "perm": 6}"#.to_string()),
        ..Default::default()
    };
    let result = execute_eval(&options).unwrap();
    assert!(result.matched);
    assert_eq!(result.keys, vec!["name", "perm"]);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "matched": true, "keys": ["name", "perm"] })
    );
}

#[test]
fn test_eval_with_key_map() {
    let options = EvalOptions {
        expression: "n == 1".to_string(),
        input: Some(r#"{"x": {"num": 1}}"#.to_string()),
        prefix: "x".to_string(),
        key_map: KeyMap::from([("n".to_string(), "num".to_string())]),
        ..Default::default()
    };
    assert!(execute_eval(&options).unwrap().matched);
}

#[test]
fn test_eval_errors() {
    let options = EvalOptions {
        expression: "a == 1".to_string(),
        ..Default::default()
    };
    assert!(matches!(execute_eval(&options), Err(CliError::NoInput)));

    let options = EvalOptions {
        expression: "a == 1".to_string(),
        input: Some("{not json".to_string()),
        ..Default::default()
    };
    assert!(matches!(execute_eval(&options), Err(CliError::Json(_))));
}

// ============================================================================
// Check, Operators and Key Maps
// ============================================================================

#[test]
fn test_check_normalises() {
    let normalised = execute_check(&CheckOptions {
        expression: "a==1||(b contains \"x\")".to_string(),
    })
    .unwrap();
    assert_eq!(normalised, "a == 1 || ( b contains 'x' )");
}

#[test]
fn test_check_reports_offset() {
    let err = execute_check(&CheckOptions {
        expression: "a == 1 )".to_string(),
    })
    .unwrap_err();
    match err {
        CliError::Parse(parse) => assert_eq!(parse.offset(), 7),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_operators_reference() {
    let reference = operators_reference();
    assert!(reference.starts_with("FILTER EXPRESSION OPERATORS"));
    assert!(reference.contains("unContainsBit"));
}

#[test]
fn test_key_map_file() {
    let path = std::env::temp_dir()
        .join(format!("filter-expr-keymap-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"a": "from_file", "b": "also_file"}"#).unwrap();

    let mappings = [("b".to_string(), "inline".to_string())];
    let key_map = load_key_map(Some(path.as_path()), &mappings).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(key_map.get("a").map(String::as_str), Some("from_file"));
    assert_eq!(key_map.get("b").map(String::as_str), Some("inline"));
}

#[test]
fn test_missing_key_map_file() {
    let path = std::env::temp_dir().join("filter-expr-no-such-keymap.json");
    assert!(matches!(load_key_map(Some(path.as_path()), &[]), Err(CliError::Io(_))));
}
