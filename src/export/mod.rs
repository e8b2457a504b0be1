//! Serialising a [`ResultSet`] for re-insertion elsewhere.
//!
//! Exporters receive the schema and the finished result set read-only. Tables
//! are emitted in [`Schema::sorted_tables`] order so referenced rows land
//! before the rows referencing them.
use std::collections::BTreeMap;
use std::io::Write;

use crate::errors::{CopyError, Result};
use crate::rows::{ResultSet, Row};
use crate::schema::Schema;

pub mod json;
pub mod sql;

pub use json::JsonExporter;
pub use sql::SqlExporter;

pub trait Exporter {
    /// Write `rows` to `out`.
    ///
    /// # Errors
    /// Returns `CopyError::Io` or `CopyError::Json` when writing fails.
    fn export(&self, schema: &Schema, rows: &ResultSet, out: &mut dyn Write) -> Result<()>;
}

impl<E: Exporter + ?Sized> Exporter for Box<E> {
    fn export(&self, schema: &Schema, rows: &ResultSet, out: &mut dyn Write) -> Result<()> {
        (**self).export(schema, rows, out)
    }
}

/// Non-empty tables of `rows` in dependency order. Tables unknown to the
/// schema follow, by name.
#[must_use]
pub fn ordered_tables<'r>(schema: &Schema, rows: &'r ResultSet) -> Vec<(&'r str, &'r [Row])> {
    let mut out: Vec<(&str, &[Row])> = Vec::new();
    for table in schema.sorted_tables() {
        if let Some((name, t)) = rows.tables().find(|(n, _)| *n == table.name) {
            if !t.is_empty() {
                out.push((name, t.rows()));
            }
        }
    }
    for (name, t) in rows.tables() {
        if !schema.contains_table(name) && !t.is_empty() {
            out.push((name, t.rows()));
        }
    }
    out
}

/// Exporters by format name.
///
/// `sql` and `json` are registered up front; registering under an existing
/// name replaces that exporter.
pub struct Exporters {
    by_name: BTreeMap<String, Box<dyn Exporter>>,
}

impl Default for Exporters {
    fn default() -> Self {
        let mut e = Self { by_name: BTreeMap::new() };
        e.register("sql", SqlExporter);
        e.register("json", JsonExporter);
        e
    }
}

impl Exporters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E: Exporter + 'static>(&mut self, name: &str, exporter: E) {
        self.by_name.insert(name.to_string(), Box::new(exporter));
    }

    /// # Errors
    /// `CopyError::Config` when no exporter is registered under `name`.
    pub fn get(&self, name: &str) -> Result<&dyn Exporter> {
        self.by_name
            .get(name)
            .map(|e| &**e)
            .ok_or_else(|| CopyError::Config(format!("Unsupported format: {name}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Look up `format` and run it.
    ///
    /// # Errors
    /// Unknown format, or the exporter's own error.
    pub fn export(&self, format: &str, schema: &Schema, rows: &ResultSet, out: &mut dyn Write) -> Result<()> {
        let exporter = self.get(format)?;
        log::debug!("exporting {} rows as {format}", rows.len());
        exporter.export(schema, rows, out)
    }
}
