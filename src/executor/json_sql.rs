use std::sync::{Arc, LazyLock};

use crate::{
    ast::{Condition, Connective, Term},
    executor::{Executor, FnMap, KeyMap, SqlFragment, SqlParam, resolve_key},
    value::{Literal, LiteralKind},
};

/// Produces the SQL for one term addressed inside a JSON column.
///
/// Receives the decorated in-document path, the literal and the name of the
/// JSON column.
pub type JsonSqlGenerator =
    fn(path: &str, value: &Literal, column: &str) -> Option<SqlFragment>;

/// Turn a dotted path into a bound JSON-path expression.
///
/// Each segment becomes one quoted, parameterised path step, so field names
/// never reach the SQL text. Returns `None` when the path is empty or has an
/// empty segment (`a..b`, `a.`), which no JSON document can address.
///
/// # Examples
///
/// ```
/// use filter_expr::executor::{json_path, SqlParam};
///
/// let (sql, params) = json_path("user.name").unwrap();
/// assert_eq!(sql, r#"CONCAT('$.', '"', ?, '"', '.', '"', ?, '"', '')"#);
/// assert_eq!(params, vec![SqlParam::from("user"), SqlParam::from("name")]);
///
/// assert_eq!(json_path(""), None);
/// ```
pub fn json_path(path: &str) -> Option<(String, Vec<SqlParam>)> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        tracing::trace!(path, "empty JSON path segment, treated as no match");
        return None;
    }
    let steps = vec![r#"'"', ?, '"'"#; segments.len()].join(", '.', ");
    let params = segments
        .into_iter()
        .map(|segment| SqlParam::Text(segment.to_string()))
        .collect();
    Some((format!("CONCAT('$.', {steps}, '')"), params))
}

// JSON_CONTAINS binds the candidate before the path.
fn contains_json(
    path: &str,
    value: &Literal,
    column: &str,
    candidate: &str,
    negate: bool,
) -> Option<SqlFragment> {
    let (path_sql, path_params) = json_path(path)?;
    let suffix = if negate { " = 0" } else { "" };
    let mut params = vec![SqlParam::from(value)];
    params.extend(path_params);
    Some(SqlFragment::new(
        format!("JSON_CONTAINS({column}, {candidate}, {path_sql}){suffix}"),
        params,
    ))
}

fn equal(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    let candidate = match value {
        Literal::Str(_) => r#"CONCAT('"', ?, '"')"#,
        _ => "CONCAT('', ?, '')",
    };
    contains_json(path, value, column, candidate, false)
}

fn not_equal(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    let candidate = match value {
        Literal::Str(_) => r#"CONCAT('"', ?, '"')"#,
        _ => "CONCAT('', ?, '')",
    };
    contains_json(path, value, column, candidate, true)
}

// JSON_EXTRACT binds the path before the compared value.
fn extract(path: &str, column: &str, op: &str, values: Vec<SqlParam>) -> Option<SqlFragment> {
    let (path_sql, mut params) = json_path(path)?;
    params.extend(values);
    Some(SqlFragment::new(
        format!("JSON_EXTRACT({column}, {path_sql}) COLLATE utf8mb4_0900_ai_ci {op} ?"),
        params,
    ))
}

fn greater_equal(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    extract(path, column, ">=", vec![SqlParam::from(value)])
}

fn less_equal(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    extract(path, column, "<=", vec![SqlParam::from(value)])
}

fn greater_than(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    extract(path, column, ">", vec![SqlParam::from(value)])
}

fn less_than(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    extract(path, column, "<", vec![SqlParam::from(value)])
}

fn regex(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    let pattern = value.as_str()?;
    extract(path, column, "REGEXP", vec![SqlParam::Text(pattern.to_string())])
}

fn search(
    path: &str,
    value: &Literal,
    column: &str,
    pattern: &str,
    negate: bool,
) -> Option<SqlFragment> {
    let text = value.as_str()?;
    let (path_sql, path_params) = json_path(path)?;
    let test = if negate { "IS NULL" } else { "IS NOT NULL" };
    let mut params = vec![SqlParam::Text(text.to_string())];
    params.extend(path_params);
    Some(SqlFragment::new(
        format!("JSON_SEARCH({column}, 'one', {pattern}, null, {path_sql}) {test}"),
        params,
    ))
}

fn contains(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT('%', ?, '%')", false)
}

fn un_contains(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT('%', ?, '%')", true)
}

fn starts_with(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT(?, '%')", false)
}

fn un_starts_with(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT(?, '%')", true)
}

fn ends_with(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT('%', ?)", false)
}

fn un_ends_with(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    search(path, value, column, "CONCAT('%', ?)", true)
}

fn membership(path: &str, value: &Literal, column: &str, negate: bool) -> Option<SqlFragment> {
    let set = value.as_str()?;
    let (path_sql, mut params) = json_path(path)?;
    let not = if negate { "!" } else { "" };
    params.push(SqlParam::Text(set.to_string()));
    Some(SqlFragment::new(
        format!("{not}FIND_IN_SET(JSON_UNQUOTE(JSON_EXTRACT({column} , {path_sql})), ?)"),
        params,
    ))
}

fn in_set(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    membership(path, value, column, false)
}

fn not_in_set(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    membership(path, value, column, true)
}

fn bits(path: &str, value: &Literal, column: &str, op: &str) -> Option<SqlFragment> {
    let bits = value.coerce_int();
    let (path_sql, mut params) = json_path(path)?;
    params.extend([SqlParam::Int(bits), SqlParam::Int(bits)]);
    Some(SqlFragment::new(
        format!("JSON_EXTRACT({column}, {path_sql}) & ? {op} ?"),
        params,
    ))
}

fn contains_bit(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    bits(path, value, column, "=")
}

fn un_contains_bit(path: &str, value: &Literal, column: &str) -> Option<SqlFragment> {
    bits(path, value, column, "!=")
}

static DEFAULT_FN_MAP: LazyLock<Arc<FnMap<JsonSqlGenerator>>> = LazyLock::new(|| {
    use LiteralKind::{Bool, Number, Str};

    let mut fns: FnMap<JsonSqlGenerator> = FnMap::new();
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

/// Compiles expressions whose identifiers address paths inside one JSON
/// column.
///
/// # Examples
///
/// ```
/// use filter_expr::executor::{Executor, JsonSqlExecutor};
///
/// let compiled = JsonSqlExecutor::new("attrs").compile("size >= 3", "", "").unwrap();
/// assert_eq!(
///     compiled.sql(),
///     r#"JSON_EXTRACT(attrs, CONCAT('$.', '"', ?, '"', '')) COLLATE utf8mb4_0900_ai_ci >= ?"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct JsonSqlExecutor {
    column: String,
    fn_map: Arc<FnMap<JsonSqlGenerator>>,
    key_map: KeyMap,
}

impl JsonSqlExecutor {
    pub fn new(column: impl Into<String>) -> Self {
        JsonSqlExecutor {
            column: column.into(),
            fn_map: Self::default_fn_map(),
            key_map: KeyMap::new(),
        }
    }

    pub fn default_fn_map() -> Arc<FnMap<JsonSqlGenerator>> {
        Arc::clone(&DEFAULT_FN_MAP)
    }

    pub fn with_fn_map(mut self, fn_map: Arc<FnMap<JsonSqlGenerator>>) -> Self {
        self.fn_map = fn_map;
        self
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn fn_map(&self) -> &FnMap<JsonSqlGenerator> {
        &self.fn_map
    }

    /// Translate one term against an explicit JSON column.
    pub fn compile_term_in(
        &self,
        column: &str,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(SqlFragment, Vec<String>)> {
        let generator = self.fn_map.get(term.condition, term.value.kind())?;
        let path = resolve_key(&self.key_map, &term.key, prefix, suffix);
        let fragment = generator(&path, &term.value, column)?;
        Some((fragment, vec![path]))
    }
}

impl Executor for JsonSqlExecutor {
    type Fragment = SqlFragment;

    const NAME: &'static str = "json-sql";

    fn compile_term(
        &self,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(SqlFragment, Vec<String>)> {
        self.compile_term_in(&self.column, term, prefix, suffix)
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
