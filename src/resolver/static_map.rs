use std::collections::HashMap;

use crate::resolver::{RelationKey, Resolver};
use crate::schema::Schema;

/// Explicit `table -> column -> [related keys]` map.
///
/// Patches relationships the other strategies miss, or drives schemas that
/// declare no constraints at all.
#[derive(Debug, Clone, Default)]
pub struct StaticMapResolver {
    keys: HashMap<String, HashMap<String, Vec<RelationKey>>>,
}

impl StaticMapResolver {
    /// Add a relationship from `table.column` to `key`.
    pub fn insert(&mut self, table: &str, column: &str, key: RelationKey) {
        self.keys
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default()
            .push(key);
    }

    /// Builder form of [`StaticMapResolver::insert`].
    #[must_use]
    pub fn with(mut self, table: &str, column: &str, key: RelationKey) -> Self {
        self.insert(table, column, key);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.values().all(HashMap::is_empty)
    }
}

impl Resolver for StaticMapResolver {
    fn resolve(&self, _schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        self.keys.get(table).and_then(|cols| cols.get(column)).cloned().unwrap_or_default()
    }
}
