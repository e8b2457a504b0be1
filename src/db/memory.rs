use std::cell::Cell;
use std::collections::HashMap;

use crate::db::Database;
use crate::errors::{CopyError, Result};
use crate::rows::{Row, Value};
use crate::schema::{Schema, Table};

/// Rows held in memory behind a fixed schema.
///
/// Fetch compares the textual form of each stored value with the query value,
/// so a text seed `"5"` finds an integer 5. Blobs only match blobs.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    schema: Schema,
    rows: HashMap<String, Vec<Row>>,
    fetches: Cell<usize>,
}

impl MemoryDatabase {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema, rows: HashMap::new(), fetches: Cell::new(0) }
    }

    /// Store a row. Columns missing from `values` are stored as null and the
    /// row is kept in the table's column order.
    ///
    /// # Errors
    /// `UnknownTable` or `UnknownColumn` when `values` does not fit the schema.
    pub fn insert(&mut self, table: &str, values: Vec<(&str, Value)>) -> Result<()> {
        let t = self.schema.table(table).ok_or_else(|| CopyError::UnknownTable(table.to_string()))?;
        if let Some((bad, _)) = values.iter().find(|(c, _)| !t.has_column(c)) {
            return Err(CopyError::UnknownColumn { table: table.to_string(), column: (*bad).to_string() });
        }
        let mut ordered = Vec::with_capacity(t.columns.len());
        for col in &t.columns {
            let value = values
                .iter()
                .find(|(c, _)| *c == col.name)
                .map_or(Value::Null, |(_, v)| v.clone());
            ordered.push((col.name.clone(), value));
        }
        self.rows.entry(table.to_string()).or_default().push(Row::new(table, ordered));
        Ok(())
    }

    /// Builder form of [`MemoryDatabase::insert`].
    ///
    /// # Errors
    /// Same as [`MemoryDatabase::insert`].
    pub fn with_row(mut self, table: &str, values: Vec<(&str, Value)>) -> Result<Self> {
        self.insert(table, values)?;
        Ok(self)
    }

    /// Number of `fetch` calls served so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl Database for MemoryDatabase {
    fn schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    fn fetch(&self, table: &Table, column: &str, value: &Value) -> Result<Vec<Row>> {
        if !self.schema.contains_table(&table.name) {
            return Err(CopyError::Adapter(format!("no such table: {}", table.name)));
        }
        self.fetches.set(self.fetches.get() + 1);
        let rows = self.rows.get(&table.name).map_or(&[][..], Vec::as_slice);
        Ok(rows
            .iter()
            .filter(|r| r.get(column).is_some_and(|v| value_matches(v, value)))
            .cloned()
            .collect())
    }
}

fn value_matches(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Blob(a), Value::Blob(b)) => a == b,
        (Value::Blob(_), _) | (_, Value::Blob(_)) => false,
        (a, b) => a.to_string() == b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> MemoryDatabase {
        let schema = Schema::new().with_table(
            Table::new("users").column("id", "INTEGER").column("name", "TEXT").primary_key(&["id"]),
        );
        MemoryDatabase::new(schema)
            .with_row("users", vec![("id", Value::Integer(1)), ("name", "ann".into())])
            .unwrap()
            .with_row("users", vec![("name", "bob".into()), ("id", Value::Integer(2))])
            .unwrap()
            .with_row("users", vec![("id", Value::Integer(3))])
            .unwrap()
    }

    #[test]
    fn fetch_compares_textual_values() {
        let db = users();
        let schema = db.schema().unwrap();
        let t = schema.table("users").unwrap();
        let rows = db.fetch(t, "id", &Value::from("2")).unwrap();
        assert_eq!(rows.len(), 1);
        // stored in schema column order regardless of insert order
        assert_eq!(rows[0].values[0], ("id".to_string(), Value::Integer(2)));
        assert_eq!(rows[0].get("name"), Some(&Value::Text("bob".into())));
        assert_eq!(db.fetch(t, "id", &Value::Integer(2)).unwrap(), rows);
        assert_eq!(db.fetch_count(), 2);
    }

    #[test]
    fn null_never_matches() {
        let db = users();
        let schema = db.schema().unwrap();
        let t = schema.table("users").unwrap();
        assert!(db.fetch(t, "name", &Value::from("null")).unwrap().is_empty());
        assert!(db.fetch(t, "name", &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn blobs_match_bytes_not_hex_text() {
        let schema = Schema::new().with_table(Table::new("keys").column("k", "BLOB"));
        let db = MemoryDatabase::new(schema).with_row("keys", vec![("k", Value::Blob(vec![0xbe, 0xef]))]).unwrap();
        let schema = db.schema().unwrap();
        let t = schema.table("keys").unwrap();
        assert_eq!(db.fetch(t, "k", &Value::Blob(vec![0xbe, 0xef])).unwrap().len(), 1);
        assert!(db.fetch(t, "k", &Value::from("beef")).unwrap().is_empty());
    }

    #[test]
    fn insert_rejects_unknown_table_and_column() {
        let mut db = users();
        assert!(matches!(db.insert("ghosts", vec![]), Err(CopyError::UnknownTable(t)) if t == "ghosts"));
        assert!(matches!(
            db.insert("users", vec![("email", "x".into())]),
            Err(CopyError::UnknownColumn { column, .. }) if column == "email"
        ));
    }

    #[test]
    fn fetch_on_foreign_table_is_adapter_error() {
        let db = users();
        let ghost = Table::new("ghosts").column("id", "");
        assert!(matches!(db.fetch(&ghost, "id", &Value::Integer(1)), Err(CopyError::Adapter(_))));
    }
}
