use super::Operator;
use super::builtin::{create_builtin_by_name, register_builtin_operators};
use ahash::AHashMap;
use itertools::Itertools;
use std::sync::Arc;

/// Maps operator names, as used by graph nodes, to operator implementations.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: AHashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `Read`, `Write`, `Filter`, `Subset` and
    /// `BandMerge` operators.
    pub fn with_defaults() -> Self {
        let mut operators = AHashMap::new();
        register_builtin_operators(&mut operators);
        Self { operators }
    }

    /// Registers `operator` under its metadata name, replacing any previous entry.
    pub fn register(&mut self, operator: Arc<dyn Operator>) {
        let name = operator.metadata().name.clone();
        self.operators.insert(name, operator);
    }

    pub fn with_operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.register(operator);
        self
    }

    /// Makes the operator known as `target` also available as `alias`.
    /// Unknown targets are ignored.
    pub fn with_alias(mut self, alias: &str, target: &str) -> Self {
        let operator = self
            .operators
            .get(target)
            .cloned()
            .or_else(|| create_builtin_by_name(target));
        if let Some(operator) = operator {
            self.operators.insert(alias.to_string(), operator);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        self.operators.keys().cloned().sorted().collect()
    }

    /// Registered names grouped by operator category, both sorted alphabetically.
    pub fn by_category(&self) -> Vec<(String, Vec<String>)> {
        self.operators
            .iter()
            .into_group_map_by(|(_, op)| op.metadata().category.clone())
            .into_iter()
            .map(|(category, ops)| {
                let names = ops.into_iter().map(|(name, _)| name.clone()).sorted().collect();
                (category, names)
            })
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect()
    }
}
