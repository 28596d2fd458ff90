use serde_json::Value;

/// A segment of a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment<'a> {
    /// Object field access by name
    ///
    /// # Examples
    /// - `user` → `Field("user")`
    /// - `user.email` → `[Field("user"), Field("email")]`
    Field(&'a str),

    /// Array element access, produced for all-digit segments
    ///
    /// # Examples
    /// - `items.0.price` → `[Field("items"), Index(0), Field("price")]`
    ///
    /// # Note
    /// An all-digit segment applied to an object is still looked up as a
    /// field name.
    Index(usize),
}

impl<'a> PathSegment<'a> {
    fn parse(segment: &'a str) -> Self {
        match segment.parse::<usize>() {
            Ok(idx) if segment.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(idx),
            _ => PathSegment::Field(segment),
        }
    }

    fn as_field(&self) -> String {
        match self {
            PathSegment::Field(name) => name.to_string(),
            PathSegment::Index(idx) => idx.to_string(),
        }
    }
}

/// Split a dotted key into path segments.
pub fn split_path(key: &str) -> Vec<PathSegment<'_>> {
    key.split('.').map(PathSegment::parse).collect()
}

/// Look up a dotted key inside a record.
///
/// Returns `None` when any segment is missing or when a segment tries to
/// descend into a scalar.
///
/// # Examples
///
/// ```
/// use filter_expr::path::lookup;
/// use serde_json::json;
///
/// let record = json!({"user": {"tags": ["a", "b"]}});
/// assert_eq!(lookup(&record, "user.tags.1"), Some(&json!("b")));
/// assert_eq!(lookup(&record, "user.name"), None);
/// ```
pub fn lookup<'v>(record: &'v Value, key: &str) -> Option<&'v Value> {
    split_path(key)
        .into_iter()
        .try_fold(record, |current, segment| match (current, &segment) {
            (Value::Array(arr), PathSegment::Index(idx)) => arr.get(*idx),
            (Value::Object(map), segment) => map.get(&segment.as_field()),
            _ => None,
        })
}
