use std::mem;

use crate::{
    ast::{Condition, Connective},
    value::Literal,
};

/// Binary expression tree produced by the AST builder.
///
/// Connectives carry no precedence: `a == 1 && b == 2 || c == 3` becomes
/// `((a == 1 && b == 2) || c == 3)`, the tree always growing to the left.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// Two sub-expressions joined by `&&` or `||`
    Operator {
        connective: Connective,
        left: Box<Ast>,
        right: Box<Ast>,
    },

    /// A single `identifier condition literal` clause
    Term(Term),
}

/// Leaf clause of the grammar.
///
/// # Example
/// ```text
/// city == 'NY'
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub key: String,
    pub condition: Condition,
    pub value: Literal,
}

impl Term {
    pub fn new(
        key: impl Into<String>,
        condition: Condition,
        value: impl Into<Literal>,
    ) -> Self {
        Term {
            key: key.into(),
            condition,
            value: value.into(),
        }
    }

    /// Same clause addressed at a different field.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Term {
            key: key.into(),
            condition: self.condition,
            value: self.value.clone(),
        }
    }
}

impl Ast {
    pub fn term(
        key: impl Into<String>,
        condition: Condition,
        value: impl Into<Literal>,
    ) -> Self {
        Ast::Term(Term::new(key, condition, value))
    }

    pub fn operator(connective: Connective, left: Ast, right: Ast) -> Self {
        Ast::Operator {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Ast, right: Ast) -> Self {
        Ast::operator(Connective::And, left, right)
    }

    pub fn or(left: Ast, right: Ast) -> Self {
        Ast::operator(Connective::Or, left, right)
    }

    /// Terms in left-to-right order.
    pub fn terms(&self) -> Vec<&Term> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Ast::Operator { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
                Ast::Term(term) => out.push(term),
            }
        }
        out
    }

    fn placeholder() -> Self {
        Ast::Term(Term {
            key: String::new(),
            condition: Condition::Equal,
            value: Literal::Bool(false),
        })
    }

    fn detach_children(&mut self, out: &mut Vec<Ast>) {
        if let Ast::Operator { left, right, .. } = self {
            out.push(mem::replace(left.as_mut(), Ast::placeholder()));
            out.push(mem::replace(right.as_mut(), Ast::placeholder()));
        }
    }
}

// Long chains nest thousands of boxes deep; unlink them one node at a time.
impl Drop for Ast {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        self.detach_children(&mut detached);
        while let Some(mut node) = detached.pop() {
            node.detach_children(&mut detached);
        }
    }
}
