use crate::{
    ast::{Connective, Term},
    executor::{Executor, JsonSqlExecutor, KeyMap, SqlExecutor, SqlFragment},
};

/// Routes each term to a plain column or to a path inside a JSON column.
///
/// After key mapping, a key without `.` is a plain column handled by the
/// relational executor. Otherwise the part before the first `.` names the
/// JSON column and the remainder is the path inside it.
///
/// # Examples
///
/// ```
/// use filter_expr::executor::{Executor, MixedExecutor};
///
/// let compiled = MixedExecutor::new()
///     .compile("status == 'open' && attrs.owner == 'bob'", "", "")
///     .unwrap();
/// assert_eq!(compiled.keys, vec!["status", "attrs.owner"]);
/// ```
#[derive(Debug, Clone)]
pub struct MixedExecutor {
    sql: SqlExecutor,
    json: JsonSqlExecutor,
    key_map: KeyMap,
}

impl Default for MixedExecutor {
    fn default() -> Self {
        MixedExecutor {
            sql: SqlExecutor::new(),
            json: JsonSqlExecutor::new(""),
            key_map: KeyMap::new(),
        }
    }
}

impl MixedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sql_executor(mut self, sql: SqlExecutor) -> Self {
        self.sql = sql;
        self
    }

    /// The executor's own column is ignored; every JSON term names its column.
    pub fn with_json_executor(mut self, json: JsonSqlExecutor) -> Self {
        self.json = json;
        self
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }
}

impl Executor for MixedExecutor {
    type Fragment = SqlFragment;

    const NAME: &'static str = "mixed";

    fn compile_term(
        &self,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(SqlFragment, Vec<String>)> {
        let key = self.key_map.get(&term.key).unwrap_or(&term.key);

        match key.split_once('.') {
            None => self.sql.compile_term(&term.with_key(key.as_str()), prefix, suffix),
            Some((column, path)) => {
                let (fragment, keys) =
                    self.json.compile_term_in(column, &term.with_key(path), prefix, suffix)?;
                let keys = keys.into_iter().map(|k| format!("{column}.{k}")).collect();
                Some((fragment, keys))
            }
        }
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
