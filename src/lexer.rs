use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{Token, TokenKind},
    value::Literal,
};

static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(==|!=|>=|<=|>|<|containsBit|unContainsBit|contains|unContains|",
        r"startsWith|unStartsWith|endsWith|unEndsWith|reg|notIn|in)",
    ))
    .expect("condition pattern")
});
static LOGICAL_OP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(&&|\|\|)").expect("logical operator pattern"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?").expect("number pattern"));
static BOOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(true|false)").expect("bool pattern"));
static STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(?:'((?:\\.|[^'\\])*)'|"((?:\\.|[^"\\])*)")"#).expect("string pattern")
});
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*").expect("identifier pattern"));
static LEFT_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[(\[{]").expect("left bracket pattern"));
static RIGHT_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[)\]}]").expect("right bracket pattern"));

/// Matchers in the order they are tried at every position.
const PRIORITY: [TokenKind; 9] = [
    TokenKind::Condition,
    TokenKind::LogicalOp,
    TokenKind::Number,
    TokenKind::Bool,
    TokenKind::String,
    TokenKind::Identifier,
    TokenKind::LeftBracket,
    TokenKind::RightBracket,
    TokenKind::Illegal,
];

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
}

/// Splits an expression into a flat token sequence.
///
/// The lexer never fails: input it cannot classify becomes a single
/// [`TokenKind::Illegal`] token covering the rest of the string, which the
/// grouper then rejects with a position.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    /// A word-shaped keyword only counts when it is not the start of a
    /// longer identifier (`region`, `index`, `trueValue`).
    fn at_word_boundary(&self, matched: &str) -> bool {
        if !matched.ends_with(|c: char| c.is_ascii_alphabetic()) {
            return true;
        }
        !self.rest()[matched.len()..]
            .chars()
            .next()
            .is_some_and(is_identifier_char)
    }

    fn match_kind(&self, kind: TokenKind) -> Option<Token> {
        let rest = self.rest();
        let offset = self.position;

        match kind {
            TokenKind::Condition => {
                let symbol = CONDITION.find(rest)?.as_str();
                if !self.at_word_boundary(symbol) {
                    return None;
                }
                let after = &rest[symbol.len()..];
                let trailing = after.len() - after.trim_start().len();
                Some(Token::text(kind, symbol, offset, symbol.len() + trailing))
            }
            TokenKind::LogicalOp => {
                let op = LOGICAL_OP.find(rest)?.as_str();
                Some(Token::text(kind, op, offset, op.len()))
            }
            TokenKind::Number => {
                let text = NUMBER.find(rest)?.as_str();
                let number = text.parse::<f64>().ok()?;
                Some(Token::literal(Literal::Number(number), offset, text.len()))
            }
            TokenKind::Bool => {
                let text = BOOL.find(rest)?.as_str();
                if !self.at_word_boundary(text) {
                    return None;
                }
                Some(Token::literal(Literal::Bool(text == "true"), offset, text.len()))
            }
            TokenKind::String => {
                let caps = STRING.captures(rest)?;
                let len = caps.get(0)?.len();
                let body = caps.get(1).or_else(|| caps.get(2))?.as_str();
                Some(Token::literal(Literal::Str(unescape(body)), offset, len))
            }
            TokenKind::Identifier => {
                let name = IDENTIFIER.find(rest)?.as_str();
                Some(Token::text(kind, name, offset, name.len()))
            }
            TokenKind::LeftBracket => {
                let bracket = LEFT_BRACKET.find(rest)?.as_str();
                Some(Token::text(kind, bracket, offset, bracket.len()))
            }
            TokenKind::RightBracket => {
                let bracket = RIGHT_BRACKET.find(rest)?.as_str();
                Some(Token::text(kind, bracket, offset, bracket.len()))
            }
            TokenKind::Illegal if !rest.is_empty() => {
                Some(Token::text(kind, rest, offset, rest.len()))
            }
            _ => None,
        }
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        if self.rest().is_empty() {
            return None;
        }

        let token = PRIORITY.iter().find_map(|kind| self.match_kind(*kind))?;
        self.position += token.len;
        Some(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Tokenizes a whole expression.
///
/// # Examples
///
/// ```
/// use filter_expr::{lexer::tokenize, TokenKind};
///
/// let kinds: Vec<_> = tokenize("age >= 18").into_iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Condition, TokenKind::Number]);
/// ```
pub fn tokenize(expr: &str) -> Vec<Token> {
    Lexer::new(expr).collect()
}

/// Resolve `\'` and `\"`; every other backslash sequence is kept verbatim so
/// regular expressions survive untouched.
fn unescape(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some('\'') | Some('"')) => {
                if let Some(quote) = chars.next() {
                    result.push(quote);
                }
            }
            '\\' => {
                result.push('\\');
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
            _ => result.push(ch),
        }
    }
    result
}

#[test]
fn test_condition_keeps_trailing_whitespace_in_len() {
    let tokens = tokenize("test == 123");
    assert_eq!(tokens[1], Token::text(TokenKind::Condition, "==", 5, 3));
    assert_eq!(tokens[2], Token::literal(Literal::Number(123.0), 8, 3));
}

#[test]
fn test_keyword_prefixed_identifiers() {
    let kinds: Vec<_> = tokenize("region in 'a,b' && trueish == true")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Condition,
            TokenKind::String,
            TokenKind::LogicalOp,
            TokenKind::Identifier,
            TokenKind::Condition,
            TokenKind::Bool,
        ]
    );
}

#[test]
fn test_unescape() {
    assert_eq!(unescape(r"it\'s"), "it's");
    assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
    assert_eq!(unescape(r"^\d+$"), r"^\d+$");
}
