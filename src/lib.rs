//! Filter expressions compiled to SQL, JSON-path SQL, Elasticsearch, or
//! evaluated in memory.
//!
//! ```text
//! age >= 18 && ( city == 'NY' || city == 'LA' )
//! ```
//!
//! The pipeline is [`tokenize`] → [`group`] → [`build`], then one of the
//! backends in [`executor`] or the in-memory [`Evaluator`].

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod path;
pub mod value;

pub use ast::{Ast, Condition, Connective, GroupedToken, Term, Token, TokenKind, TokenValue};
pub use evaluator::{EvalGenerator, Evaluation, Evaluator};
pub use executor::{Compiled, Executor, FnMap, KeyMap};
pub use lexer::{Lexer, tokenize};
pub use output::{ExpressionPrinter, to_expression};
pub use parser::{ParseError, Parser, build, group, parse};
pub use value::{Literal, LiteralKind};
