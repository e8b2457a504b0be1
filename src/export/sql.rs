use std::io::Write;

use crate::errors::Result;
use crate::export::{ordered_tables, Exporter};
use crate::rows::{ResultSet, Value};
use crate::schema::Schema;
use crate::utils::{hex, ident};

/// One `INSERT` statement per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlExporter;

/// SQL literal for a value.
#[must_use]
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) if r.is_finite() => format!("{r:?}"),
        Value::Blob(b) => format!("X'{}'", hex::encode(b)),
        other => quote(&other.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

impl Exporter for SqlExporter {
    fn export(&self, schema: &Schema, rows: &ResultSet, out: &mut dyn Write) -> Result<()> {
        for (table, table_rows) in ordered_tables(schema, rows) {
            for row in table_rows {
                let columns: Vec<String> = row.iter().map(|(c, _)| ident::quote(c)).collect();
                let values: Vec<String> = row.iter().map(|(_, v)| literal(v)).collect();
                writeln!(
                    out,
                    "INSERT INTO {} ({}) VALUES ({});",
                    ident::quote(table),
                    columns.join(", "),
                    values.join(", ")
                )?;
            }
        }
        Ok(())
    }
}
