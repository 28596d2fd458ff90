//! Textual re-serialisation of grouped tokens.
//!
//! The grouping pass keeps enough information in every token (decoded value
//! plus the bracket markers of each group) to print an equivalent expression
//! back out. Output is canonical: one space between tokens, numbers in their
//! shortest form, strings single-quoted.
//!
//! # Examples
//!
//! ```
//! use filter_expr::{lexer::tokenize, output::to_expression, parser::group};
//!
//! let grouped = group(tokenize("age>=18&&(city==\"NY\")")).unwrap();
//! assert_eq!(to_expression(&grouped), "age >= 18 && ( city == 'NY' )");
//! ```

use crate::ast::GroupedToken;

pub struct ExpressionPrinter {
    separator: &'static str,
}

impl Default for ExpressionPrinter {
    fn default() -> Self {
        ExpressionPrinter { separator: " " }
    }
}

impl ExpressionPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, tokens: &[GroupedToken]) -> String {
        let mut parts = Vec::with_capacity(tokens.len());
        let mut levels = vec![tokens.iter()];
        while let Some(level) = levels.last_mut() {
            match level.next() {
                Some(GroupedToken::Group(members)) => levels.push(members.iter()),
                Some(GroupedToken::Token(token)) => parts.push(token.encode()),
                None => {
                    levels.pop();
                }
            }
        }
        parts.join(self.separator)
    }
}

/// Prints grouped tokens back into an expression string.
pub fn to_expression(tokens: &[GroupedToken]) -> String {
    ExpressionPrinter::new().print(tokens)
}
