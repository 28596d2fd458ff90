use std::sync::{Arc, LazyLock};

use serde_json::{Value, json};

use crate::{
    ast::{Condition, Connective, Term},
    executor::{Compiled, Executor, FnMap, KeyMap, resolve_key},
    value::{Literal, LiteralKind},
};

/// Produces the Query DSL clause for one term.
pub type ElasticGenerator = fn(key: &str, value: &Literal) -> Option<Value>;

fn literal_json(value: &Literal) -> Value {
    match value {
        Literal::Number(n) => json!(n),
        Literal::Bool(b) => json!(b),
        Literal::Str(s) => json!(s),
    }
}

fn keyword(key: &str) -> String {
    format!("{key}.keyword")
}

fn must_not(clause: Value) -> Value {
    json!({ "bool": { "must_not": [clause] } })
}

fn equal(key: &str, value: &Literal) -> Option<Value> {
    Some(match value {
        Literal::Str(s) => json!({
            "term": { keyword(key): { "case_insensitive": true, "value": s } }
        }),
        other => json!({
            "term": { key: { "value": literal_json(other) } }
        }),
    })
}

fn not_equal(key: &str, value: &Literal) -> Option<Value> {
    equal(key, value).map(must_not)
}

fn range(key: &str, bound: &str, value: &Literal) -> Option<Value> {
    Some(json!({ "range": { key: { bound: literal_json(value) } } }))
}

fn greater_equal(key: &str, value: &Literal) -> Option<Value> {
    range(key, "gte", value)
}

fn less_equal(key: &str, value: &Literal) -> Option<Value> {
    range(key, "lte", value)
}

fn greater_than(key: &str, value: &Literal) -> Option<Value> {
    range(key, "gt", value)
}

fn less_than(key: &str, value: &Literal) -> Option<Value> {
    range(key, "lt", value)
}

fn wildcard(key: &str, value: &Literal, leading: bool, trailing: bool) -> Option<Value> {
    let text = value.as_str()?;
    let pattern = format!(
        "{}{}{}",
        if leading { "*" } else { "" },
        text,
        if trailing { "*" } else { "" }
    );
    Some(json!({
        "wildcard": { keyword(key): { "case_insensitive": true, "value": pattern } }
    }))
}

fn contains(key: &str, value: &Literal) -> Option<Value> {
    wildcard(key, value, true, true)
}

fn un_contains(key: &str, value: &Literal) -> Option<Value> {
    contains(key, value).map(must_not)
}

fn starts_with(key: &str, value: &Literal) -> Option<Value> {
    wildcard(key, value, false, true)
}

fn un_starts_with(key: &str, value: &Literal) -> Option<Value> {
    starts_with(key, value).map(must_not)
}

fn ends_with(key: &str, value: &Literal) -> Option<Value> {
    wildcard(key, value, true, false)
}

fn un_ends_with(key: &str, value: &Literal) -> Option<Value> {
    ends_with(key, value).map(must_not)
}

fn regex(key: &str, value: &Literal) -> Option<Value> {
    let pattern = value.as_str()?;
    Some(json!({
        "regexp": { keyword(key): { "case_insensitive": true, "value": pattern } }
    }))
}

fn in_set(key: &str, value: &Literal) -> Option<Value> {
    let set = value.as_str()?;
    let members: Vec<&str> = set.split(',').collect();
    Some(json!({ "terms": { keyword(key): members } }))
}

fn not_in_set(key: &str, value: &Literal) -> Option<Value> {
    in_set(key, value).map(must_not)
}

static DEFAULT_FN_MAP: LazyLock<Arc<FnMap<ElasticGenerator>>> = LazyLock::new(|| {
    use LiteralKind::{Bool, Number, Str};

    let mut fns: FnMap<ElasticGenerator> = FnMap::new();
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
    Arc::new(fns)
});

/// Compiles expressions into an Elasticsearch Query DSL document.
///
/// `&&` becomes `bool.must`, `||` becomes `bool.should`. String matches go
/// against the `.keyword` sub-field, case-insensitively.
///
/// # Examples
///
/// ```
/// use filter_expr::executor::{ElasticExecutor, Executor};
/// use serde_json::json;
///
/// let compiled = ElasticExecutor::new().compile("age > 30", "", "").unwrap();
/// assert_eq!(compiled.output, Some(json!({"range": {"age": {"gt": 30.0}}})));
/// ```
#[derive(Debug, Clone)]
pub struct ElasticExecutor {
    fn_map: Arc<FnMap<ElasticGenerator>>,
    key_map: KeyMap,
}

impl Default for ElasticExecutor {
    fn default() -> Self {
        ElasticExecutor {
            fn_map: Self::default_fn_map(),
            key_map: KeyMap::new(),
        }
    }
}

impl ElasticExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_fn_map() -> Arc<FnMap<ElasticGenerator>> {
        Arc::clone(&DEFAULT_FN_MAP)
    }

    pub fn with_fn_map(mut self, fn_map: Arc<FnMap<ElasticGenerator>>) -> Self {
        self.fn_map = fn_map;
        self
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    pub fn fn_map(&self) -> &FnMap<ElasticGenerator> {
        &self.fn_map
    }
}

impl Compiled<Value> {
    /// Wrap the compiled clause as a search request body.
    ///
    /// An empty compile becomes `match_all`.
    pub fn to_search_body(&self) -> Value {
        match &self.output {
            Some(query) => json!({ "query": query }),
            None => json!({ "query": { "match_all": {} } }),
        }
    }
}

/// Clause list of a query that is nothing but `{"bool": {occur: [..]}}`.
fn bool_clauses<'v>(query: &'v mut Value, occur: &str) -> Option<&'v mut Vec<Value>> {
    let outer = query.as_object_mut().filter(|outer| outer.len() == 1)?;
    let inner = outer
        .get_mut("bool")?
        .as_object_mut()
        .filter(|inner| inner.len() == 1)?;
    inner.get_mut(occur)?.as_array_mut()
}

impl Executor for ElasticExecutor {
    type Fragment = Value;

    const NAME: &'static str = "elasticsearch";

    fn compile_term(
        &self,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(Value, Vec<String>)> {
        let generator = self.fn_map.get(term.condition, term.value.kind())?;
        let key = resolve_key(&self.key_map, &term.key, prefix, suffix);
        let clause = generator(&key, &term.value)?;
        Some((clause, vec![key]))
    }

    /// A left operand that is already a `bool` of the same occurrence takes
    /// the right operand as one more clause, so chains stay one level deep.
    fn combine(&self, connective: Connective, mut left: Value, right: Value) -> Value {
        let occur = match connective {
            Connective::And => "must",
            Connective::Or => "should",
        };
        if let Some(clauses) = bool_clauses(&mut left, occur) {
            clauses.push(right);
            return left;
        }
        json!({ "bool": { occur: [left, right] } })
    }
}
