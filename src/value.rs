use std::fmt;

/// A literal value on the right-hand side of a term.
///
/// Filter expressions only know three literal shapes. Numbers are always
/// carried as `f64`, whatever their textual form (`18`, `-3`, `0.25`).
///
/// # Examples
///
/// ```
/// use filter_expr::{Literal, LiteralKind};
///
/// let age = Literal::Number(18.0);
/// let vip = Literal::Bool(true);
/// let city = Literal::Str("NY".to_string());
///
/// assert_eq!(age.kind(), LiteralKind::Number);
/// assert_eq!(vip.kind(), LiteralKind::Bool);
/// assert_eq!(city.as_str(), Some("NY"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Signed decimal number
    Number(f64),

    /// `true` / `false`
    Bool(bool),

    /// Quoted string, already unescaped
    Str(String),
}

/// The tag of a [`Literal`], used as the second key of a generator registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralKind {
    Number,
    Bool,
    Str,
}

impl LiteralKind {
    pub const ALL: [LiteralKind; 3] = [LiteralKind::Number, LiteralKind::Bool, LiteralKind::Str];

    pub fn name(self) -> &'static str {
        match self {
            LiteralKind::Number => "number",
            LiteralKind::Bool => "bool",
            LiteralKind::Str => "string",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Number(_) => LiteralKind::Number,
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::Str(_) => LiteralKind::Str,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to `i64` for the bit operators.
    ///
    /// Numbers truncate toward zero, strings are parsed as base-10 integers,
    /// anything else (including unparsable strings) becomes `0`.
    pub fn coerce_int(&self) -> i64 {
        match self {
            Literal::Number(n) => *n as i64,
            Literal::Str(s) => s.trim().parse::<i64>().unwrap_or(0),
            Literal::Bool(_) => 0,
        }
    }

    /// Textual form used when re-serialising an expression.
    pub fn encode(&self) -> String {
        match self {
            Literal::Number(n) => n.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Str(s) => format!("'{}'", s.replace('\'', "\\'")),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Str(s)
    }
}
