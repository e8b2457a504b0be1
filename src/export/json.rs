use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::io::Write;

use crate::errors::Result;
use crate::export::{ordered_tables, Exporter};
use crate::rows::{ResultSet, Row, Value};
use crate::schema::Schema;
use crate::utils::hex;

/// `{"table": [{"column": value, ...}, ...], ...}` with tables in dependency
/// order and columns in schema order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

struct Document<'a>(Vec<(&'a str, &'a [Row])>);
struct Rows<'a>(&'a [Row]);
struct Object<'a>(&'a Row);
struct Scalar<'a>(&'a Value);

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.len()))?;
        for (table, rows) in &self.0 {
            map.serialize_entry(table, &Rows(rows))?;
        }
        map.end()
    }
}

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(self.0.len()))?;
        for row in self.0 {
            seq.serialize_element(&Object(row))?;
        }
        seq.end()
    }
}

impl Serialize for Object<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(self.0.values.len()))?;
        for (column, value) in self.0.iter() {
            map.serialize_entry(column, &Scalar(value))?;
        }
        map.end()
    }
}

impl Serialize for Scalar<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => s.serialize_unit(),
            Value::Integer(i) => s.serialize_i64(*i),
            Value::Real(r) if r.is_finite() => s.serialize_f64(*r),
            Value::Blob(b) => s.serialize_str(&hex::encode(b)),
            other => s.collect_str(other),
        }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, schema: &Schema, rows: &ResultSet, out: &mut dyn Write) -> Result<()> {
        let doc = Document(ordered_tables(schema, rows));
        serde_json::to_writer(&mut *out, &doc)?;
        writeln!(out)?;
        Ok(())
    }
}
