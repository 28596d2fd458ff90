use std::{fmt, mem};

use crate::value::Literal;

/// Lexical category of a token.
///
/// `LiteralBegin` and `LiteralEnd` never come out of the lexer; they are the
/// start and accepting states of the grouping automaton. `Delimiter` is
/// recognised but skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `(`, `[` or `{`
    LeftBracket,

    /// `)`, `]` or `}`
    RightBracket,

    /// `&&` or `||`
    LogicalOp,

    /// Comparison or matching operator such as `>=` or `startsWith`
    Condition,

    /// Field name, possibly a dotted/dashed path
    ///
    /// # Examples
    /// ```text
    /// age
    /// user.address.city
    /// x-request-id
    /// ```
    Identifier,

    /// Signed decimal number
    Number,

    /// `true` or `false`
    Bool,

    /// Single- or double-quoted string
    String,

    /// Whitespace run
    Delimiter,

    /// Anything the lexer could not recognise; always the last token
    Illegal,

    LiteralBegin,
    LiteralEnd,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::LeftBracket => "left bracket",
            TokenKind::RightBracket => "right bracket",
            TokenKind::LogicalOp => "logical operator",
            TokenKind::Condition => "condition",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Bool => "bool",
            TokenKind::String => "string",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Illegal => "illegal input",
            TokenKind::LiteralBegin => "start of input",
            TokenKind::LiteralEnd => "end of input",
        }
    }

    /// Token kinds allowed to follow `self` in a well-formed expression.
    pub fn successors(self) -> &'static [TokenKind] {
        use TokenKind::*;
        match self {
            LiteralBegin | LeftBracket | LogicalOp => &[LeftBracket, Identifier],
            RightBracket => &[LogicalOp, RightBracket, LiteralEnd],
            Condition => &[Number, Bool, String],
            Identifier => &[Condition],
            Number | Bool | String => &[LogicalOp, RightBracket, LiteralEnd],
            Illegal => &[LiteralEnd],
            Delimiter | LiteralEnd => &[],
        }
    }

    pub fn can_precede(self, next: TokenKind) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::Number | TokenKind::Bool | TokenKind::String)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// Raw text for brackets, operators, conditions, identifiers and illegal input
    Text(String),

    /// Decoded number, bool or string
    Literal(Literal),
}

/// A single lexical token with its position in the source expression.
///
/// `offset` and `len` are byte counts. For conditions `len` also covers the
/// whitespace that trails the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub offset: usize,
    pub len: usize,
}

impl Token {
    pub fn text(kind: TokenKind, text: impl Into<String>, offset: usize, len: usize) -> Self {
        Token {
            kind,
            value: TokenValue::Text(text.into()),
            offset,
            len,
        }
    }

    pub fn literal(literal: Literal, offset: usize, len: usize) -> Self {
        let kind = match literal {
            Literal::Number(_) => TokenKind::Number,
            Literal::Bool(_) => TokenKind::Bool,
            Literal::Str(_) => TokenKind::String,
        };
        Token {
            kind,
            value: TokenValue::Literal(literal),
            offset,
            len,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(s) => Some(s),
            TokenValue::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.value {
            TokenValue::Literal(l) => Some(l),
            TokenValue::Text(_) => None,
        }
    }

    /// Byte offset just past this token.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Textual form used when re-serialising an expression.
    pub fn encode(&self) -> String {
        match &self.value {
            TokenValue::Text(s) => s.clone(),
            TokenValue::Literal(l) => l.encode(),
        }
    }
}

/// Output of the grouping pass: tokens with every bracketed region folded
/// into a nested [`GroupedToken::Group`].
///
/// A group keeps its opening and closing bracket tokens as its first and
/// last members so the tree can be printed back into an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupedToken {
    Token(Token),
    Group(Vec<GroupedToken>),
}

impl GroupedToken {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            GroupedToken::Token(t) => Some(t),
            GroupedToken::Group(_) => None,
        }
    }

    pub fn kind(&self) -> Option<TokenKind> {
        self.as_token().map(|t| t.kind)
    }
}

impl Drop for GroupedToken {
    fn drop(&mut self) {
        let GroupedToken::Group(members) = self else {
            return;
        };
        let mut pending = mem::take(members);
        while let Some(mut item) = pending.pop() {
            if let GroupedToken::Group(members) = &mut item {
                pending.append(members);
            }
        }
    }
}
