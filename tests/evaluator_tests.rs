// tests/evaluator_tests.rs

use std::sync::Arc;

use filter_expr::{Condition, Evaluator, KeyMap, Literal, LiteralKind, ParseError};
use serde_json::{Value, json};

fn matches(expr: &str, record: Value) -> bool {
    Evaluator::new().evaluate(expr, &record, "", "").unwrap().matched
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_case_insensitive_equality() {
    assert!(matches("name == 'Alice'", json!({"name": "ALICE"})));
    assert!(!matches("name != 'Alice'", json!({"name": "alice"})));
    assert!(matches("name != 'Alice'", json!({"name": "Bob"})));
}

#[test]
fn test_number_and_bool_equality() {
    assert!(matches("age == 30", json!({"age": 30})));
    assert!(matches("age == 30", json!({"age": 30.0})));
    assert!(matches("active == true", json!({"active": true})));
    assert!(!matches("active == true", json!({"active": false})));
}

#[test]
fn test_ordering() {
    let record = json!({"age": 30, "name": "bob"});
    assert!(matches("age >= 30", record.clone()));
    assert!(matches("age <= 30", record.clone()));
    assert!(!matches("age > 30", record.clone()));
    assert!(matches("age < 30.5", record.clone()));
    assert!(matches("name >= 'ALICE'", record.clone()));
    assert!(!matches("name > 'a'", record.clone()));
    assert!(!matches("name < 'Alice'", record));
}

#[test]
fn test_kind_mismatch_is_false() {
    let record = json!({"age": "30", "active": "true"});
    assert!(!matches("age == 30", record.clone()));
    assert!(!matches("age != 30", record.clone()));
    assert!(!matches("age > 1", record.clone()));
    assert!(!matches("active == true", record));
}

#[test]
fn test_missing_key_is_false() {
    let record = json!({});
    for expr in [
        "a == 1",
        "a != 1",
        "a unContains 'x'",
        "a notIn 'x,y'",
        "a containsBit 1",
        "a unContainsBit 1",
    ] {
        assert!(!matches(expr, record.clone()), "Failed for expr: {}", expr);
    }
}

// ============================================================================
// Patterns and Sets
// ============================================================================

#[test]
fn test_contains() {
    assert!(matches("tags contains 'vip'", json!({"tags": "vip-customer"})));
    assert!(!matches("tags contains 'vip'", json!({"tags": "regular"})));
    assert!(matches("tags unContains 'vip'", json!({"tags": "regular"})));
}

#[test]
fn test_prefix_and_suffix_matching() {
    let record = json!({"email": "Ann@Example.com"});
    assert!(matches("email startsWith 'ann'", record.clone()));
    assert!(matches("email endsWith 'EXAMPLE.COM'", record.clone()));
    assert!(!matches("email unStartsWith 'ann'", record.clone()));
    assert!(matches("email unEndsWith '.org'", record));
}

#[test]
fn test_regex() {
    let record = json!({"code": "AB-123"});
    assert!(matches(r"code reg '^ab-\d+$'", record.clone()));
    assert!(!matches(r"code reg '^\d+$'", record.clone()));
    assert!(!matches("code reg '('", record));
}

#[test]
fn test_set_membership() {
    let record = json!({"tier": "Gold"});
    assert!(matches("tier in 'silver,gold'", record.clone()));
    assert!(!matches("tier notIn 'silver,gold'", record.clone()));
    assert!(matches("tier notIn 'bronze'", record.clone()));
    assert!(!matches("tier in 'gol'", record));
}

#[test]
fn test_string_operator_on_number_is_false() {
    assert!(!matches("tags contains 'vip'", json!({"tags": 5})));
    assert!(!matches("tags contains 5", json!({"tags": "5"})));
}

// ============================================================================
// Bits
// ============================================================================

#[test]
fn test_contains_bit() {
    assert!(matches("perm containsBit 4", json!({"perm": 6})));
    assert!(!matches("perm containsBit 4", json!({"perm": 1})));
    assert!(matches("perm unContainsBit 4", json!({"perm": 1})));
}

#[test]
fn test_bits_coerce_without_kind_check() {
    assert!(matches("perm containsBit '2'", json!({"perm": 3})));
    assert!(matches("perm containsBit 2", json!({"perm": "7"})));
    assert!(matches("perm containsBit 0", json!({"perm": "junk"})));
    assert!(!matches("perm containsBit 1", json!({"perm": true})));
}

// ============================================================================
// Connectives
// ============================================================================

#[test]
fn test_short_circuit_keys() {
    let evaluator = Evaluator::new();
    let record = json!({"a": 1, "b": 2, "c": 3});

    let result = evaluator.evaluate("a == 2 && b == 2", &record, "", "").unwrap();
    assert!(!result.matched);
    assert_eq!(result.keys, vec!["a"]);

    let result = evaluator.evaluate("a == 1 || b == 5", &record, "", "").unwrap();
    assert!(result.matched);
    assert_eq!(result.keys, vec!["a"]);

    let result = evaluator
        .evaluate("a == 2 || b == 5 || c == 3", &record, "", "")
        .unwrap();
    assert!(result.matched);
    assert_eq!(result.keys, vec!["a", "b", "c"]);
}

#[test]
fn test_left_to_right_without_precedence() {
    // ((a || b) && c): false because c fails
    assert!(!matches("a == 1 || b == 1 && c == 1", json!({"a": 1, "b": 0, "c": 0})));
}

#[test]
fn test_long_chains() {
    let evaluator = Evaluator::new();
    let record = json!({"a": 1});

    let all = vec!["a == 1"; 5_000].join(" && ");
    let result = evaluator.evaluate(&all, &record, "", "").unwrap();
    assert!(result.matched);
    assert_eq!(result.keys.len(), 5_000);

    let mut any = vec!["a == 2"; 5_000];
    any.push("a == 1");
    let result = evaluator.evaluate(&any.join(" || "), &record, "", "").unwrap();
    assert!(result.matched);
    assert_eq!(result.keys.len(), 5_001);
}

#[test]
fn test_deeply_nested_groups() {
    let expr = format!("{}a == 1{}", "( ".repeat(5_000), " )".repeat(5_000));
    assert!(matches(&expr, json!({"a": 1})));
}

#[test]
fn test_unsupported_term_does_not_collapse_branch() {
    assert!(matches("age > true || name == 'x'", json!({"age": 1, "name": "X"})));
}

#[test]
fn test_empty_expression_matches() {
    let result = Evaluator::new().evaluate("", &json!({}), "", "").unwrap();
    assert!(result.matched);
    assert!(result.keys.is_empty());
}

#[test]
fn test_structural_error() {
    let err = Evaluator::new().evaluate("(a == 1", &json!({}), "", "").unwrap_err();
    assert_eq!(err, ParseError::UnclosedBracket { offset: 0 });
}

// ============================================================================
// Keys and Paths
// ============================================================================

#[test]
fn test_nested_paths_and_indexes() {
    let record = json!({"user": {"roles": ["viewer", "admin"], "age": 40}});
    assert!(matches("user.roles.1 == 'ADMIN'", record.clone()));
    assert!(matches("user.age >= 40", record.clone()));
    assert!(!matches("user.roles.5 == 'admin'", record));
}

#[test]
fn test_prefix_suffix_and_key_map() {
    let record = json!({"data": {"user_name": {"value": "ann"}}});
    let evaluator = Evaluator::new()
        .with_key_map(KeyMap::from([("name".to_string(), "user_name".to_string())]));

    let result = evaluator.evaluate("name == 'Ann'", &record, "data", "value").unwrap();
    assert!(result.matched);
    assert_eq!(result.keys, vec!["data.user_name.value"]);
}

// ============================================================================
// Custom Registries
// ============================================================================

fn exists(record: &Value, key: &str, _value: &Literal) -> bool {
    filter_expr::path::lookup(record, key).is_some()
}

#[test]
fn test_custom_generator() {
    let mut fns = (*Evaluator::default_fn_map()).clone();
    fns.insert(Condition::Equal, LiteralKind::Bool, exists);
    let evaluator = Evaluator::new().with_fn_map(Arc::new(fns));

    let record = json!({"x": null});
    assert!(evaluator.evaluate("x == true", &record, "", "").unwrap().matched);
    assert!(!evaluator.evaluate("y == true", &record, "", "").unwrap().matched);
}
