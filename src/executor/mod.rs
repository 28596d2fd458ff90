//! Compile-time backends.
//!
//! Every backend folds the expression tree into its own representation using
//! a [`FnMap`] of per-operator, per-literal-kind generators:
//!
//! - [`SqlExecutor`] - parameterised SQL over plain columns
//! - [`JsonSqlExecutor`] - parameterised SQL over paths inside a JSON column
//! - [`MixedExecutor`] - plain columns or JSON paths, decided per key
//! - [`ElasticExecutor`] - Elasticsearch Query DSL
//!
//! A term with no generator for its (condition, literal kind) pair compiles
//! to nothing, and so does every `&&`/`||` above it: these targets cannot
//! express "no condition" as half of a connective.

mod elastic;
mod json_sql;
mod mixed;
mod registry;
mod sql;

pub use elastic::{ElasticExecutor, ElasticGenerator};
pub use json_sql::{JsonSqlExecutor, JsonSqlGenerator, json_path};
pub use mixed::MixedExecutor;
pub use registry::FnMap;
pub use sql::{SqlExecutor, SqlFragment, SqlGenerator, SqlParam};

use std::collections::HashMap;

use crate::{
    ast::{Ast, Connective, Term},
    parser::{ParseError, parse},
};

/// Field renames applied to identifiers before any decoration.
pub type KeyMap = HashMap<String, String>;

/// Result of compiling an expression.
///
/// `output` is `None` when the expression is empty or when no-match
/// propagated all the way to the root. `keys` lists every field the output
/// references, fully decorated, in left-to-right term order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled<T> {
    pub output: Option<T>,
    pub keys: Vec<String>,
}

impl<T> Compiled<T> {
    pub fn empty() -> Self {
        Compiled {
            output: None,
            keys: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_none()
    }
}

/// Apply the key map, then `prefix.` and `.suffix`.
pub fn resolve_key(key_map: &KeyMap, key: &str, prefix: &str, suffix: &str) -> String {
    let mut key = key_map.get(key).map(String::as_str).unwrap_or(key).to_string();
    if !prefix.is_empty() {
        key = format!("{prefix}.{key}");
    }
    if !suffix.is_empty() {
        key = format!("{key}.{suffix}");
    }
    key
}

/// A backend that folds the expression tree into `Fragment`s.
pub trait Executor {
    type Fragment;

    /// Backend name used in diagnostics.
    const NAME: &'static str;

    /// Translate one term. `None` means no match.
    fn compile_term(
        &self,
        term: &Term,
        prefix: &str,
        suffix: &str,
    ) -> Option<(Self::Fragment, Vec<String>)>;

    /// Join two compiled operands.
    fn combine(
        &self,
        connective: Connective,
        left: Self::Fragment,
        right: Self::Fragment,
    ) -> Self::Fragment;

    /// Folds the tree bottom-up with an explicit stack.
    ///
    /// A term without a generator ends the fold: the no-match reaches every
    /// ancestor, so the whole tree compiles to `None`.
    fn compile_ast(
        &self,
        ast: &Ast,
        prefix: &str,
        suffix: &str,
    ) -> Option<(Self::Fragment, Vec<String>)> {
        let mut steps = vec![Step::Visit(ast)];
        let mut fragments = Vec::new();
        let mut keys = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(Ast::Operator {
                    connective,
                    left,
                    right,
                }) => {
                    steps.push(Step::Combine(*connective));
                    steps.push(Step::Visit(right));
                    steps.push(Step::Visit(left));
                }
                Step::Visit(Ast::Term(term)) => {
                    let Some((fragment, term_keys)) = self.compile_term(term, prefix, suffix) else {
                        tracing::trace!(
                            backend = Self::NAME,
                            key = %term.key,
                            condition = %term.condition,
                            kind = %term.value.kind(),
                            "term has no generator, treated as no match"
                        );
                        return None;
                    };
                    fragments.push(fragment);
                    keys.extend(term_keys);
                }
                Step::Combine(connective) => {
                    let (Some(right), Some(left)) = (fragments.pop(), fragments.pop()) else {
                        return None;
                    };
                    fragments.push(self.combine(connective, left, right));
                }
            }
        }

        fragments.pop().map(|fragment| (fragment, keys))
    }

    /// Tokenize, group, build and fold an expression.
    fn compile(
        &self,
        expr: &str,
        prefix: &str,
        suffix: &str,
    ) -> Result<Compiled<Self::Fragment>, ParseError> {
        let ast = parse(expr)?;
        tracing::debug!(backend = Self::NAME, expression = expr, "compiling filter expression");

        Ok(match ast.and_then(|ast| self.compile_ast(&ast, prefix, suffix)) {
            Some((output, keys)) => Compiled {
                output: Some(output),
                keys,
            },
            None => Compiled::empty(),
        })
    }
}

enum Step<'a> {
    Visit(&'a Ast),
    Combine(Connective),
}
