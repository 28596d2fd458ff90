//! # Filter Expressions - Tokens and Syntax Tree
//!
//! This module defines every shape an expression passes through on its way
//! from text to a backend fragment.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and the nested token tree built by the grouper
//! - **[operators]** - Condition operators and logical connectives
//! - **[expressions]** - The binary expression tree (operators and terms)
//!
//! ## Quick Start
//!
//! ```text
//! age >= 18 && (city == "NY" || tag contains "vip")
//! ```
//!
//! Three terms joined by two connectives. Brackets may be any of `()`, `[]`
//! or `{}` as long as each pair matches.
//!
//! ## Grammar
//!
//! ```text
//! expr  = term (LogicalOp term)*
//! term  = '(' expr ')' | Identifier Condition Value
//! Value = Number | Bool | String
//! ```
//!
//! ### Associativity
//!
//! `&&` and `||` share a single precedence level and associate to the left,
//! purely by order of appearance:
//!
//! ```text
//! a == 1 && b == 2 || c == 3   =>   ((a == 1 && b == 2) || c == 3)
//! a == 1 || b == 2 && c == 3   =>   ((a == 1 || b == 2) && c == 3)
//! ```
//!
//! Use brackets when a different grouping is meant.
//!
//! ### Literals
//!
//! - Numbers: `18`, `-3`, `+2.5`
//! - Booleans: `true`, `false`
//! - Strings: `'NY'`, `"NY"`, with `\'` and `\"` escapes
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Ast, Term};
pub use operators::{Condition, Connective, UnknownOperator};
pub use tokens::{GroupedToken, Token, TokenKind, TokenValue};
