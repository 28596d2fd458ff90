use std::collections::HashMap;

use crate::{ast::Condition, value::LiteralKind};

/// Generator registry: condition × literal kind → generator.
///
/// A missing entry means the operator is not supported for that literal
/// kind; the term then degrades to "no match" instead of failing the
/// whole compile.
///
/// # Examples
///
/// ```
/// use filter_expr::{Condition, LiteralKind};
/// use filter_expr::executor::FnMap;
///
/// let mut fns: FnMap<&str> = FnMap::new();
/// fns.insert(Condition::Equal, LiteralKind::Number, "eq-number");
/// assert_eq!(fns.get(Condition::Equal, LiteralKind::Number), Some(&"eq-number"));
/// assert_eq!(fns.get(Condition::Equal, LiteralKind::Str), None);
/// ```
#[derive(Debug, Clone)]
pub struct FnMap<G> {
    entries: HashMap<Condition, HashMap<LiteralKind, G>>,
}

impl<G> Default for FnMap<G> {
    fn default() -> Self {
        FnMap {
            entries: HashMap::new(),
        }
    }
}

impl<G> FnMap<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, condition: Condition, kind: LiteralKind) -> Option<&G> {
        self.entries.get(&condition)?.get(&kind)
    }

    pub fn insert(&mut self, condition: Condition, kind: LiteralKind, generator: G) -> Option<G> {
        self.entries
            .entry(condition)
            .or_default()
            .insert(kind, generator)
    }

    /// Register the same generator for several literal kinds.
    pub fn register(&mut self, condition: Condition, kinds: &[LiteralKind], generator: G)
    where
        G: Clone,
    {
        for kind in kinds {
            self.insert(condition, *kind, generator.clone());
        }
    }

    pub fn remove(&mut self, condition: Condition, kind: LiteralKind) -> Option<G> {
        let by_kind = self.entries.get_mut(&condition)?;
        let removed = by_kind.remove(&kind);
        if by_kind.is_empty() {
            self.entries.remove(&condition);
        }
        removed
    }

    /// Drop every generator of a condition.
    pub fn remove_condition(&mut self, condition: Condition) {
        self.entries.remove(&condition);
    }

    pub fn supports(&self, condition: Condition, kind: LiteralKind) -> bool {
        self.get(condition, kind).is_some()
    }

    /// Literal kinds registered for a condition, in a stable order.
    pub fn kinds(&self, condition: Condition) -> Vec<LiteralKind> {
        let mut kinds: Vec<_> = self
            .entries
            .get(&condition)
            .map(|by_kind| by_kind.keys().copied().collect())
            .unwrap_or_default();
        kinds.sort();
        kinds
    }
}
