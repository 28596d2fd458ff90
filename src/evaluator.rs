use std::{
    cmp::Ordering,
    sync::{Arc, LazyLock},
};

use regex::RegexBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::{
    ast::{Ast, Condition, Connective, Term},
    executor::{FnMap, KeyMap, resolve_key},
    parser::{ParseError, parse},
    path::lookup,
    value::{Literal, LiteralKind},
};

/// Decides one term against a record.
///
/// Receives the record, the decorated key and the literal.
pub type EvalGenerator = fn(record: &Value, key: &str, value: &Literal) -> bool;

/// Outcome of evaluating an expression against one record.
///
/// `keys` only lists terms that were actually evaluated; the right side of a
/// short-circuited connective contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub matched: bool,
    pub keys: Vec<String>,
}

fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

fn stored_str<'v>(record: &'v Value, key: &str) -> Option<&'v str> {
    lookup(record, key)?.as_str()
}

/// Stored value and literal must be the same primitive kind.
fn same_kind(record: &Value, key: &str, value: &Literal) -> Option<Ordering> {
    let stored = lookup(record, key)?;
    match value {
        Literal::Number(n) => stored.as_f64()?.partial_cmp(n),
        Literal::Bool(b) => Some(stored.as_bool()?.cmp(b)),
        Literal::Str(s) => Some(fold_case(stored.as_str()?).cmp(&fold_case(s))),
    }
}

fn equal(record: &Value, key: &str, value: &Literal) -> bool {
    same_kind(record, key, value) == Some(Ordering::Equal)
}

fn not_equal(record: &Value, key: &str, value: &Literal) -> bool {
    same_kind(record, key, value).is_some_and(|ord| ord != Ordering::Equal)
}

// Booleans have no ordering in filter expressions.
fn ordered(record: &Value, key: &str, value: &Literal) -> Option<Ordering> {
    match value {
        Literal::Bool(_) => None,
        _ => same_kind(record, key, value),
    }
}

fn greater_equal(record: &Value, key: &str, value: &Literal) -> bool {
    ordered(record, key, value).is_some_and(Ordering::is_ge)
}

fn less_equal(record: &Value, key: &str, value: &Literal) -> bool {
    ordered(record, key, value).is_some_and(Ordering::is_le)
}

fn greater_than(record: &Value, key: &str, value: &Literal) -> bool {
    ordered(record, key, value).is_some_and(Ordering::is_gt)
}

fn less_than(record: &Value, key: &str, value: &Literal) -> bool {
    ordered(record, key, value).is_some_and(Ordering::is_lt)
}

fn text_match(
    record: &Value,
    key: &str,
    value: &Literal,
    test: fn(&str, &str) -> bool,
) -> bool {
    match (stored_str(record, key), value.as_str()) {
        (Some(stored), Some(needle)) => test(&fold_case(stored), &fold_case(needle)),
        _ => false,
    }
}

fn contains(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| s.contains(n))
}

fn un_contains(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| !s.contains(n))
}

fn starts_with(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| s.starts_with(n))
}

fn un_starts_with(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| !s.starts_with(n))
}

fn ends_with(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| s.ends_with(n))
}

fn un_ends_with(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, n| !s.ends_with(n))
}

fn regex(record: &Value, key: &str, value: &Literal) -> bool {
    let (Some(stored), Some(pattern)) = (stored_str(record, key), value.as_str()) else {
        return false;
    };
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(stored),
        Err(e) => {
            tracing::trace!(pattern, error = %e, "invalid pattern, treated as no match");
            false
        }
    }
}

fn in_set(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, set| set.split(',').any(|m| m == s))
}

fn not_in_set(record: &Value, key: &str, value: &Literal) -> bool {
    text_match(record, key, value, |s, set| !set.split(',').any(|m| m == s))
}

/// Stored side of a bit test: no kind check, anything unusable is `0`.
fn stored_bits(stored: &Value) -> i64 {
    match stored {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

fn contains_bit(record: &Value, key: &str, value: &Literal) -> bool {
    let Some(stored) = lookup(record, key) else {
        return false;
    };
    let bits = value.coerce_int();
    stored_bits(stored) & bits == bits
}

fn un_contains_bit(record: &Value, key: &str, value: &Literal) -> bool {
    let Some(stored) = lookup(record, key) else {
        return false;
    };
    let bits = value.coerce_int();
    stored_bits(stored) & bits != bits
}

static DEFAULT_FN_MAP: LazyLock<Arc<FnMap<EvalGenerator>>> = LazyLock::new(|| {
    use LiteralKind::{Bool, Number, Str};

    let mut fns: FnMap<EvalGenerator> = FnMap::new();
    fns.register(Condition::Equal, &[Number, Bool, Str], equal);
    fns.register(Condition::NotEqual, &[Number, Bool, Str], not_equal);
    fns.register(Condition::GreaterEqual, &[Number, Str], greater_equal);
    fns.register(Condition::LessEqual, &[Number, Str], less_equal);
    fns.register(Condition::GreaterThan, &[Number], greater_than);
    fns.register(Condition::LessThan, &[Number, Str], less_than);
    fns.register(Condition::Contains, &[Str], contains);
    fns.register(Condition::UnContains, &[Str], un_contains);
    fns.register(Condition::StartsWith, &[Str], starts_with);
    fns.register(Condition::UnStartsWith, &[Str], un_starts_with);
    fns.register(Condition::EndsWith, &[Str], ends_with);
    fns.register(Condition::UnEndsWith, &[Str], un_ends_with);
    fns.register(Condition::Regex, &[Str], regex);
    fns.register(Condition::In, &[Str], in_set);
    fns.register(Condition::NotIn, &[Str], not_in_set);
    fns.register(Condition::ContainsBit, &[Number, Str], contains_bit);
    fns.register(Condition::UnContainsBit, &[Number, Str], un_contains_bit);
    Arc::new(fns)
});

/// Evaluates filter expressions directly against JSON records.
///
/// Unlike the compile-time backends, `&&` and `||` short-circuit: the right
/// side is not evaluated once the left side decides the result. A term
/// whose literal kind has no generator, or whose stored value has a
/// different kind than the literal, evaluates to `false`.
///
/// # Examples
///
/// ```
/// use filter_expr::Evaluator;
/// use serde_json::json;
///
/// let evaluator = Evaluator::new();
/// let record = json!({"tags": "vip-customer", "perm": 6});
///
/// let result = evaluator
///     .evaluate("tags contains 'VIP' && perm containsBit 4", &record, "", "")
///     .unwrap();
/// assert!(result.matched);
/// assert_eq!(result.keys, vec!["tags", "perm"]);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    fn_map: Arc<FnMap<EvalGenerator>>,
    key_map: KeyMap,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            fn_map: Self::default_fn_map(),
            key_map: KeyMap::new(),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_fn_map() -> Arc<FnMap<EvalGenerator>> {
        Arc::clone(&DEFAULT_FN_MAP)
    }

    pub fn with_fn_map(mut self, fn_map: Arc<FnMap<EvalGenerator>>) -> Self {
        self.fn_map = fn_map;
        self
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    pub fn fn_map(&self) -> &FnMap<EvalGenerator> {
        &self.fn_map
    }

    /// Parses `expr` and evaluates it against `record`.
    ///
    /// An empty expression matches every record.
    pub fn evaluate(
        &self,
        expr: &str,
        record: &Value,
        prefix: &str,
        suffix: &str,
    ) -> Result<Evaluation, ParseError> {
        let ast = parse(expr)?;
        tracing::debug!(backend = "memory", expression = expr, "evaluating filter expression");

        let mut keys = Vec::new();
        let matched = match &ast {
            Some(ast) => self.eval_ast(ast, record, prefix, suffix, &mut keys),
            None => true,
        };
        Ok(Evaluation { matched, keys })
    }

    /// Evaluates an already built tree, appending touched keys to `keys`.
    ///
    /// Walks the tree with an explicit stack, so long `&&`/`||` chains do not
    /// grow the call stack.
    pub fn eval_ast(
        &self,
        ast: &Ast,
        record: &Value,
        prefix: &str,
        suffix: &str,
        keys: &mut Vec<String>,
    ) -> bool {
        let mut steps = vec![Step::Visit(ast)];
        let mut matched = false;

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(Ast::Operator {
                    connective,
                    left,
                    right,
                }) => {
                    steps.push(Step::Then(*connective, right));
                    steps.push(Step::Visit(left));
                }
                Step::Visit(Ast::Term(term)) => {
                    matched = self.eval_term(term, record, prefix, suffix, keys);
                }
                // `matched` holds the left operand here.
                Step::Then(connective, right) => match (connective, matched) {
                    (Connective::And, false) | (Connective::Or, true) => {}
                    _ => steps.push(Step::Visit(right)),
                },
            }
        }
        matched
    }

    fn eval_term(
        &self,
        term: &Term,
        record: &Value,
        prefix: &str,
        suffix: &str,
        keys: &mut Vec<String>,
    ) -> bool {
        let Some(generator) = self.fn_map.get(term.condition, term.value.kind()) else {
            tracing::trace!(
                key = %term.key,
                condition = %term.condition,
                kind = %term.value.kind(),
                "term has no generator, treated as no match"
            );
            return false;
        };
        let key = resolve_key(&self.key_map, &term.key, prefix, suffix);
        let matched = generator(record, &key, &term.value);
        keys.push(key);
        matched
    }
}

enum Step<'a> {
    Visit(&'a Ast),
    /// Right operand, decided once the left one is known
    Then(Connective, &'a Ast),
}
