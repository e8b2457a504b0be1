//! Row model and the deduplicating result accumulator.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::utils::fingerprint::Canonical;
use crate::utils::hex;

/// A scalar column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Parsed date plus the exact text it was stored as.
    Date(NaiveDate, String),
    Time(NaiveTime, String),
    DateTime(NaiveDateTime, String),
    /// Exact numeric kept in its textual form.
    Decimal(String),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn date(d: NaiveDate) -> Self {
        Value::Date(d, d.format("%Y-%m-%d").to_string())
    }

    #[must_use]
    pub fn time(t: NaiveTime) -> Self {
        Value::Time(t, t.format("%H:%M:%S%.f").to_string())
    }

    #[must_use]
    pub fn datetime(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt, dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }

    pub(crate) fn tag(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Real(_) => 2,
            Value::Text(_) => 3,
            Value::Blob(_) => 4,
            Value::Date(..) => 5,
            Value::Time(..) => 6,
            Value::DateTime(..) => 7,
            Value::Decimal(_) => 8,
        }
    }

    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Integer(i) => i.to_le_bytes().to_vec(),
            Value::Real(r) => r.to_bits().to_le_bytes().to_vec(),
            Value::Blob(b) => b.clone(),
            other => other.to_string().into_bytes(),
        }
    }
}

impl fmt::Display for Value {
    /// Textual form used by exporters. Dates and times print as stored.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Blob(b) => f.write_str(&hex::encode(b)),
            Value::Text(s)
            | Value::Decimal(s)
            | Value::Date(_, s)
            | Value::Time(_, s)
            | Value::DateTime(_, s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Content identity of a row within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowFingerprint([u8; 32]);

/// One database row: ordered `(column, value)` pairs tagged with the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub table: String,
    pub values: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub fn new(table: &str, values: Vec<(String, Value)>) -> Self {
        Self { table: table.to_string(), values }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Fingerprint over the `(column, value)` pairs sorted by column name, so
    /// column order does not matter.
    #[must_use]
    pub fn fingerprint(&self) -> RowFingerprint {
        let mut pairs: Vec<&(String, Value)> = self.values.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let mut c = Canonical::new();
        for (column, value) in pairs {
            c.field(b'c', column.as_bytes()).field(value.tag(), &value.canonical_bytes());
        }
        RowFingerprint(c.finish())
    }
}

/// Rows of one table in first-seen order plus their fingerprints.
#[derive(Debug, Clone, Default)]
pub struct TableRows {
    rows: Vec<Row>,
    seen: HashSet<RowFingerprint>,
}

impl TableRows {
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &RowFingerprint) -> bool {
        self.seen.contains(fingerprint)
    }
}

/// Accumulated traversal output keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    tables: BTreeMap<String, TableRows>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row unless an identical row of the same table is already
    /// present. Returns the stored row when it was newly inserted.
    pub fn insert(&mut self, row: Row) -> Option<&Row> {
        let fp = row.fingerprint();
        let entry = self.tables.entry(row.table.clone()).or_default();
        if !entry.seen.insert(fp) {
            return None;
        }
        entry.rows.push(row);
        entry.rows.last()
    }

    #[must_use]
    pub fn contains(&self, row: &Row) -> bool {
        self.tables.get(&row.table).is_some_and(|t| t.contains(&row.fingerprint()))
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableRows> {
        self.tables.get(name)
    }

    /// Rows stored for `name`, empty when the table was never reached.
    #[must_use]
    pub fn rows(&self, name: &str) -> &[Row] {
        self.tables.get(name).map_or(&[][..], TableRows::rows)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableRows)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Total number of rows across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(TableRows::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
