use std::sync::{Arc, LazyLock};

use serde::Serialize;

use crate::{
    ast::{Condition, Connective, Term},
    executor::{Compiled, Executor, FnMap, KeyMap, resolve_key},
    value::{Literal, LiteralKind},
};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl From<&Literal> for SqlParam {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => SqlParam::Float(*n),
            Literal::Bool(b) => SqlParam::Bool(*b),
            Literal::Str(s) => SqlParam::Text(s.clone()),
        }
    }
}

impl From<f64> for SqlParam {
    fn from(n: f64) -> Self {
        SqlParam::Float(n)
    }
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        SqlParam::Int(n)
    }
}

impl From<bool> for SqlParam {
    fn from(b: bool) -> Self {
        SqlParam::Bool(b)
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

/// SQL text with its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        SqlFragment {
            sql: sql.into(),
            params,
        }
    }

    /// `( left AND right )` / `( left OR right )`, parameters concatenated.
    pub fn join(connective: Connective, left: SqlFragment, right: SqlFragment) -> SqlFragment {
        let op = match connective {
            Connective::And => "AND",
            Connective::Or => "OR",
        };
        let mut params = left.params;
        params.extend(right.params);
        SqlFragment {
            sql: format!("( {} {} {} )", left.sql, op, right.sql),
            params,
        }
    }
}

impl Compiled<SqlFragment> {
    /// SQL text, empty when nothing compiled.
    pub fn sql(&self) -> &str {
        self.output.as_ref().map(|f| f.sql.as_str()).unwrap_or("")
    }

    pub fn params(&self) -> &[SqlParam] {
        self.output.as_ref().map(|f| f.params.as_slice()).unwrap_or(&[])
    }
}

/// Produces the SQL for one term from the decorated column name and literal.
pub type SqlGenerator = fn(key: &str, value: &Literal) -> Option<SqlFragment>;

fn compare(key: &str, op: &str, value: &Literal) -> Option<SqlFragment> {
    Some(SqlFragment::new(
        format!("{key} {op} ?"),
        vec![SqlParam::from(value)],
    ))
}

fn equal(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, "=", value)
}

fn not_equal(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, "!=", value)
}

fn greater_equal(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, ">=", value)
}

fn less_equal(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, "<=", value)
}

fn greater_than(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, ">", value)
}

fn less_than(key: &str, value: &Literal) -> Option<SqlFragment> {
    compare(key, "<", value)
}

fn like(key: &str, negate: bool, pattern: &str, value: &Literal) -> Option<SqlFragment> {
    let text = value.as_str()?;
    let not = if negate { "NOT " } else { "" };
    Some(SqlFragment::new(
        format!("{key} {not}LIKE {pattern}"),
        vec![SqlParam::Text(text.to_string())],
    ))
}

fn contains(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, false, "CONCAT('%', ?, '%')", value)
}

fn un_contains(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, true, "CONCAT('%', ?, '%')", value)
}

fn starts_with(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, false, "CONCAT(?, '%')", value)
}

fn un_starts_with(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, true, "CONCAT(?, '%')", value)
}

fn ends_with(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, false, "CONCAT('%', ?)", value)
}

fn un_ends_with(key: &str, value: &Literal) -> Option<SqlFragment> {
    like(key, true, "CONCAT('%', ?)", value)
}

fn regex(key: &str, value: &Literal) -> Option<SqlFragment> {
    let pattern = value.as_str()?;
    Some(SqlFragment::new(
        format!("{key} REGEXP ?"),
        vec![SqlParam::Text(pattern.to_string())],
    ))
}

fn in_set(key: &str, value: &Literal) -> Option<SqlFragment> {
    let set = value.as_str()?;
    Some(SqlFragment::new(
        format!("FIND_IN_SET(`{key}`, ?)"),
        vec![SqlParam::Text(set.to_string())],
    ))
}

fn not_in_set(key: &str, value: &Literal) -> Option<SqlFragment> {
    let set = value.as_str()?;
    Some(SqlFragment::new(
        format!("NOT FIND_IN_SET(`{key}`, ?)"),
        vec![SqlParam::Text(set.to_string())],
    ))
}

// Bit operators take any literal and coerce it to i64.
fn contains_bit(key: &str, value: &Literal) -> Option<SqlFragment> {
    let bits = value.coerce_int();
    Some(SqlFragment::new(
        format!("{key} & ? = ?"),
        vec![SqlParam::Int(bits), SqlParam::Int(bits)],
    ))
}

fn un_contains_bit(key: &str, value: &Literal) -> Option<SqlFragment> {
    let bits = value.coerce_int();
    Some(SqlFragment::new(
        format!("{key} & ? != ?"),
        vec![SqlParam::Int(bits), SqlParam::Int(bits)],
    ))
}

static DEFAULT_FN_MAP: LazyLock<Arc<FnMap<SqlGenerator>>> = LazyLock::new(|| {
    use LiteralKind::{Bool, Number, Str};

    let mut fns: FnMap<SqlGenerator> = FnMap::new();
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

/// Compiles expressions into a parameterised SQL `WHERE` fragment.
///
/// # Examples
///
/// ```
/// use filter_expr::executor::{Executor, SqlExecutor, SqlParam};
///
/// let compiled = SqlExecutor::new()
///     .compile("age >= 18 && city == 'NY'", "", "")
///     .unwrap();
/// assert_eq!(compiled.sql(), "( age >= ? AND city = ? )");
/// assert_eq!(compiled.params(), &[SqlParam::Float(18.0), SqlParam::from("NY")]);
/// assert_eq!(compiled.keys, vec!["age", "city"]);
/// ```
#[derive(Debug, Clone)]
pub struct SqlExecutor {
    fn_map: Arc<FnMap<SqlGenerator>>,
    key_map: KeyMap,
}

impl Default for SqlExecutor {
    fn default() -> Self {
        SqlExecutor {
            fn_map: Self::default_fn_map(),
            key_map: KeyMap::new(),
        }
    }
}

impl SqlExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in generator table.
    pub fn default_fn_map() -> Arc<FnMap<SqlGenerator>> {
        Arc::clone(&DEFAULT_FN_MAP)
    }

    pub fn with_fn_map(mut self, fn_map: Arc<FnMap<SqlGenerator>>) -> Self {
        self.fn_map = fn_map;
        self
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    pub fn fn_map(&self) -> &FnMap<SqlGenerator> {
        &self.fn_map
    }
}

impl Executor for SqlExecutor {
    type Fragment = SqlFragment;

    const NAME: &'static str = "sql";

    fn compile_term(
        &self,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(SqlFragment, Vec<String>)> {
        let generator = self.fn_map.get(term.condition, term.value.kind())?;
        let key = resolve_key(&self.key_map, &term.key, prefix, suffix);
        let fragment = generator(&key, &term.value)?;
        Some((fragment, vec![key]))
    }

    fn combine(
        &self,
        connective: Connective,
        left: SqlFragment,
        right: SqlFragment,
    ) -> SqlFragment {
        SqlFragment::join(connective, left, right)
    }
}
