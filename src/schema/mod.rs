//! Reflected schema metadata.
//!
//! `Schema` is produced by a [`crate::db::Database`] adapter and passed
//! read-only to resolvers, the traversal engine and exporters.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type as reported by the database, possibly empty.
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    #[must_use]
    pub fn single(column: &str, referenced_table: &str, referenced_column: &str) -> Self {
        Self {
            columns: vec![column.to_string()],
            referenced_table: referenced_table.to_string(),
            referenced_columns: vec![referenced_column.to_string()],
        }
    }

    #[must_use]
    pub fn is_single_column(&self) -> bool {
        self.columns.len() == 1 && self.referenced_columns.len() == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    /// Builder helper: append a column with an optional declared type.
    #[must_use]
    pub fn column(mut self, name: &str, declared_type: &str) -> Self {
        self.columns.push(Column { name: name.to_string(), declared_type: declared_type.to_string() });
        self
    }

    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// The primary key column when the key has exactly one column.
    #[must_use]
    pub fn single_primary_key(&self) -> Option<&str> {
        match self.primary_key.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterate over every foreign key in the schema together with its owning table.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Table, &ForeignKey)> {
        self.tables.values().flat_map(|t| t.foreign_keys.iter().map(move |fk| (t, fk)))
    }

    /// Tables ordered so that referenced tables come before the tables
    /// referencing them.
    ///
    /// Self references are ignored and ties are broken by table name. Tables
    /// that sit on a reference cycle cannot be ordered; they are appended by
    /// name after everything else.
    #[must_use]
    pub fn sorted_tables(&self) -> Vec<&Table> {
        // Kahn's algorithm over table -> referenced table edges
        let mut pending: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (name, table) in &self.tables {
            let deps: BTreeSet<&str> = table
                .foreign_keys
                .iter()
                .map(|fk| fk.referenced_table.as_str())
                .filter(|r| *r != name.as_str() && self.tables.contains_key(*r))
                .collect();
            pending.insert(name.as_str(), deps);
        }

        let mut out: Vec<&Table> = Vec::with_capacity(self.tables.len());
        loop {
            let ready: Vec<&str> =
                pending.iter().filter(|(_, deps)| deps.is_empty()).map(|(n, _)| *n).collect();
            if ready.is_empty() {
                break;
            }
            for name in &ready {
                pending.remove(name);
                if let Some(t) = self.tables.get(*name) {
                    out.push(t);
                }
            }
            for deps in pending.values_mut() {
                for name in &ready {
                    deps.remove(name);
                }
            }
        }

        if !pending.is_empty() {
            let names: Vec<&str> = pending.keys().copied().collect();
            log::warn!("tables on a reference cycle, insert order may violate constraints: {}", names.join(", "));
            out.extend(names.into_iter().filter_map(|n| self.tables.get(n)));
        }
        out
    }
}
