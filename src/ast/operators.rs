use std::{fmt, str::FromStr};

/// Logical connective joining two sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl Connective {
    pub fn symbol(self) -> &'static str {
        match self {
            Connective::And => "&&",
            Connective::Or => "||",
        }
    }
}

impl FromStr for Connective {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "&&" => Ok(Connective::And),
            "||" => Ok(Connective::Or),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Condition operator of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than (`<`)
    LessThan,
    /// Substring match (`contains`)
    Contains,
    /// Negated substring match (`unContains`)
    UnContains,
    /// Prefix match (`startsWith`)
    StartsWith,
    /// Negated prefix match (`unStartsWith`)
    UnStartsWith,
    /// Suffix match (`endsWith`)
    EndsWith,
    /// Negated suffix match (`unEndsWith`)
    UnEndsWith,
    /// Regular expression match (`reg`)
    Regex,
    /// Membership in a comma-separated list (`in`)
    In,
    /// Negated membership (`notIn`)
    NotIn,
    /// All bits of the literal set (`containsBit`)
    ContainsBit,
    /// Not all bits of the literal set (`unContainsBit`)
    UnContainsBit,
}

impl Condition {
    pub const ALL: [Condition; 17] = [
        Condition::Equal,
        Condition::NotEqual,
        Condition::GreaterEqual,
        Condition::LessEqual,
        Condition::GreaterThan,
        Condition::LessThan,
        Condition::Contains,
        Condition::UnContains,
        Condition::StartsWith,
        Condition::UnStartsWith,
        Condition::EndsWith,
        Condition::UnEndsWith,
        Condition::Regex,
        Condition::In,
        Condition::NotIn,
        Condition::ContainsBit,
        Condition::UnContainsBit,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Condition::Equal => "==",
            Condition::NotEqual => "!=",
            Condition::GreaterEqual => ">=",
            Condition::LessEqual => "<=",
            Condition::GreaterThan => ">",
            Condition::LessThan => "<",
            Condition::Contains => "contains",
            Condition::UnContains => "unContains",
            Condition::StartsWith => "startsWith",
            Condition::UnStartsWith => "unStartsWith",
            Condition::EndsWith => "endsWith",
            Condition::UnEndsWith => "unEndsWith",
            Condition::Regex => "reg",
            Condition::In => "in",
            Condition::NotIn => "notIn",
            Condition::ContainsBit => "containsBit",
            Condition::UnContainsBit => "unContainsBit",
        }
    }
}

impl FromStr for Condition {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.symbol() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator '{0}'")]
pub struct UnknownOperator(pub String);
