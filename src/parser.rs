use std::{slice, vec};

use crate::{
    ast::{Ast, Condition, Connective, GroupedToken, Term, Token, TokenKind},
    lexer::tokenize,
};

/// Structural errors raised while grouping a token sequence.
///
/// Every variant carries the byte offset in the source expression it refers
/// to; see [`ParseError::offset`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A token appeared where the grammar does not allow it
    #[error("unexpected {found} '{text}' at position {offset} (after {after})")]
    IllegalTransition {
        offset: usize,
        found: TokenKind,
        after: TokenKind,
        text: String,
    },

    /// A closing bracket without a matching opening bracket
    #[error("unmatched right bracket at position {offset}")]
    UnmatchedRightBracket { offset: usize },

    /// An opening bracket that is never closed
    #[error("unclosed bracket at position {offset}")]
    UnclosedBracket { offset: usize },

    /// Tokens left over after grouping stopped
    #[error("unexpected end of input at position {offset}")]
    UnexpectedEndOfInput { offset: usize },

    /// The expression stops in the middle of a term or after a connective
    #[error("incomplete expression at position {offset} (ends with {last})")]
    MissingTerminator { offset: usize, last: TokenKind },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::IllegalTransition { offset, .. }
            | ParseError::UnmatchedRightBracket { offset }
            | ParseError::UnclosedBracket { offset }
            | ParseError::UnexpectedEndOfInput { offset }
            | ParseError::MissingTerminator { offset, .. } => *offset,
        }
    }
}

fn closing_bracket(open: &str) -> &'static str {
    match open {
        "[" => "]",
        "{" => "}",
        _ => ")",
    }
}

/// Validates a flat token sequence against the grammar automaton and nests
/// bracketed regions into groups.
///
/// Open brackets are kept on an explicit stack, so nesting depth is bounded
/// by memory rather than by the call stack.
pub struct Parser {
    tokens: vec::IntoIter<Token>,
    state: TokenKind,
    consumed_end: usize,
}

/// A bracket that has been opened but not yet closed.
struct OpenGroup {
    offset: usize,
    closer: &'static str,
    members: Vec<GroupedToken>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter(),
            state: TokenKind::LiteralBegin,
            consumed_end: 0,
        }
    }

    fn advance(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(token) = self.tokens.next() else {
            return Ok(None);
        };

        if !self.state.can_precede(token.kind) {
            return Err(ParseError::IllegalTransition {
                offset: token.offset,
                found: token.kind,
                after: self.state,
                text: token.encode(),
            });
        }

        self.state = token.kind;
        self.consumed_end = token.end();
        Ok(Some(token))
    }

    /// Runs the grouping pass over every token.
    pub fn group(mut self) -> Result<Vec<GroupedToken>, ParseError> {
        if self.tokens.as_slice().is_empty() {
            return Ok(Vec::new());
        }

        let mut top = Vec::new();
        let mut open: Vec<OpenGroup> = Vec::new();

        while let Some(token) = self.advance()? {
            match token.kind {
                TokenKind::LeftBracket => open.push(OpenGroup {
                    offset: token.offset,
                    closer: closing_bracket(token.as_text().unwrap_or_default()),
                    members: vec![GroupedToken::Token(token)],
                }),
                TokenKind::RightBracket => {
                    let Some(mut group) = open
                        .pop()
                        .filter(|group| token.as_text() == Some(group.closer))
                    else {
                        return Err(ParseError::UnmatchedRightBracket {
                            offset: token.offset,
                        });
                    };
                    group.members.push(GroupedToken::Token(token));
                    let group = GroupedToken::Group(group.members);
                    match open.last_mut() {
                        Some(parent) => parent.members.push(group),
                        None => top.push(group),
                    }
                }
                _ => {
                    let token = GroupedToken::Token(token);
                    match open.last_mut() {
                        Some(parent) => parent.members.push(token),
                        None => top.push(token),
                    }
                }
            }
        }

        if !self.tokens.as_slice().is_empty() {
            return Err(ParseError::UnexpectedEndOfInput {
                offset: self.consumed_end,
            });
        }
        if !self.state.can_precede(TokenKind::LiteralEnd) {
            return Err(ParseError::MissingTerminator {
                offset: self.consumed_end,
                last: self.state,
            });
        }
        // The outermost bracket still open is reported.
        if let Some(group) = open.first() {
            return Err(ParseError::UnclosedBracket {
                offset: group.offset,
            });
        }

        Ok(top)
    }
}

/// Groups a flat token sequence.
pub fn group(tokens: Vec<Token>) -> Result<Vec<GroupedToken>, ParseError> {
    Parser::new(tokens).group()
}

/// Builds the expression tree from grouped tokens.
///
/// Input is expected to come from [`group`]; anything that does not fit the
/// grammar is skipped rather than reported. Returns `None` for an empty
/// sequence.
pub fn build(grouped: &[GroupedToken]) -> Option<Ast> {
    let mut frames = vec![Frame::new(grouped)];

    while let Some(frame) = frames.last_mut() {
        let Some(item) = frame.items.next() else {
            let Some(done) = frames.pop() else { break };
            match frames.last_mut() {
                Some(parent) => parent.push(done.root),
                None => return done.root,
            }
            continue;
        };

        match item {
            GroupedToken::Group(members) => frames.push(Frame::new(members)),
            GroupedToken::Token(token) => match token.kind {
                TokenKind::LogicalOp => {
                    if frame.root.is_some() {
                        frame.pending = token.as_text().and_then(|op| op.parse().ok());
                    }
                }
                TokenKind::Identifier => {
                    let condition = frame.items.next().and_then(GroupedToken::as_token);
                    let value = frame.items.next().and_then(GroupedToken::as_token);
                    let term = build_term(token, condition, value).map(Ast::Term);
                    frame.push(term);
                }
                _ => {}
            },
        }
    }

    None
}

/// One bracket level of [`build`]: the tree folded so far and the
/// connective waiting for its right operand.
struct Frame<'a> {
    root: Option<Ast>,
    pending: Option<Connective>,
    items: slice::Iter<'a, GroupedToken>,
}

impl<'a> Frame<'a> {
    fn new(items: &'a [GroupedToken]) -> Self {
        Frame {
            root: None,
            pending: None,
            items: items.iter(),
        }
    }

    fn push(&mut self, operand: Option<Ast>) {
        let Some(operand) = operand else {
            return;
        };
        self.root = Some(match (self.root.take(), self.pending.take()) {
            (Some(left), Some(connective)) => Ast::operator(connective, left, operand),
            _ => operand,
        });
    }
}

fn build_term(
    ident: &Token,
    condition: Option<&Token>,
    value: Option<&Token>,
) -> Option<Term> {
    let key = ident.as_text()?;
    let condition: Condition = condition?.as_text()?.parse().ok()?;
    let value = value?.as_literal()?.clone();
    Some(Term::new(key, condition, value))
}

/// Tokenize, group and build in one step.
///
/// # Examples
///
/// ```
/// use filter_expr::{parser::parse, Ast, Condition};
///
/// let ast = parse("a == 1 && b == 2 || c == 3").unwrap().unwrap();
/// assert_eq!(
///     ast,
///     Ast::or(
///         Ast::and(
///             Ast::term("a", Condition::Equal, 1.0),
///             Ast::term("b", Condition::Equal, 2.0),
///         ),
///         Ast::term("c", Condition::Equal, 3.0),
///     )
/// );
/// ```
pub fn parse(expr: &str) -> Result<Option<Ast>, ParseError> {
    let grouped = group(tokenize(expr))?;
    Ok(build(&grouped))
}
