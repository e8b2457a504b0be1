use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags, ToSql};
use std::collections::BTreeMap;
use std::path::Path;

use crate::db::Database;
use crate::errors::Result;
use crate::rows::{Row, Value};
use crate::schema::{Column, ForeignKey, Schema, Table};
use crate::utils::ident;

/// SQLite adapter over a single `rusqlite` connection.
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Open an existing database file read-only.
    ///
    /// # Errors
    /// Returns `CopyError::Database` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Wrap an already open connection, e.g. an in-memory database.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for name in names {
            out.push(name?);
        }
        Ok(out)
    }

    // Foreign keys whose target columns are omitted reference the primary key;
    // those come back with `None` targets and are filled in by `schema()`.
    fn reflect_table(&self, name: &str) -> Result<(Table, Vec<PendingKey>)> {
        let mut table = Table::new(name);

        let mut stmt =
            self.conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
        let mut rows = stmt.query([name])?;
        let mut pk: Vec<(i64, String)> = Vec::new();
        while let Some(row) = rows.next()? {
            let column: String = row.get(0)?;
            let declared_type: String = row.get::<_, Option<String>>(1)?.unwrap_or_default();
            let pk_pos: i64 = row.get(2)?;
            if pk_pos > 0 {
                pk.push((pk_pos, column.clone()));
            }
            table.columns.push(Column { name: column, declared_type });
        }
        pk.sort_by_key(|(pos, _)| *pos);
        table.primary_key = pk.into_iter().map(|(_, c)| c).collect();

        let mut stmt = self.conn.prepare(
            "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let mut rows = stmt.query([name])?;
        let mut grouped: BTreeMap<i64, PendingKey> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let referenced: String = row.get(1)?;
            let from: String = row.get(2)?;
            let to: Option<String> = row.get(3)?;
            let key = grouped.entry(id).or_insert_with(|| PendingKey {
                columns: Vec::new(),
                referenced_table: referenced,
                referenced_columns: Vec::new(),
            });
            key.columns.push(from);
            key.referenced_columns.push(to);
        }
        Ok((table, grouped.into_values().collect()))
    }
}

struct PendingKey {
    columns: Vec<String>,
    referenced_table: String,
    referenced_columns: Vec<Option<String>>,
}

impl Database for SqliteDatabase {
    fn schema(&self) -> Result<Schema> {
        let mut schema = Schema::new();
        let mut pending: Vec<(String, Vec<PendingKey>)> = Vec::new();
        for name in self.table_names()? {
            let (table, keys) = self.reflect_table(&name)?;
            schema.add_table(table);
            pending.push((name, keys));
        }

        for (name, keys) in pending {
            let mut resolved = Vec::with_capacity(keys.len());
            for key in keys {
                let referenced_columns = if key.referenced_columns.iter().all(Option::is_some) {
                    key.referenced_columns.into_iter().flatten().collect()
                } else {
                    schema
                        .table(&key.referenced_table)
                        .map(|t| t.primary_key.clone())
                        .unwrap_or_default()
                };
                resolved.push(ForeignKey {
                    columns: key.columns,
                    referenced_table: key.referenced_table,
                    referenced_columns,
                });
            }
            if let Some(table) = schema.tables.get_mut(&name) {
                table.foreign_keys = resolved;
            }
        }

        log::debug!("reflected {} tables", schema.tables.len());
        Ok(schema)
    }

    fn fetch(&self, table: &Table, column: &str, value: &Value) -> Result<Vec<Row>> {
        let columns: Vec<String> = table.column_names().map(ident::quote).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            columns.join(", "),
            ident::quote(&table.name),
            ident::quote(column)
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query([Bind(value)])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(table.columns.len());
            for (i, col) in table.columns.iter().enumerate() {
                values.push((col.name.clone(), decode(&col.declared_type, row.get_ref(i)?)));
            }
            out.push(Row::new(&table.name, values));
        }
        Ok(out)
    }
}

/// Binds a value the way it was read: blobs as bytes, numbers as numbers and
/// dates as their stored text.
struct Bind<'a>(&'a Value);

impl ToSql for Bind<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
            Value::Text(s)
            | Value::Decimal(s)
            | Value::Date(_, s)
            | Value::Time(_, s)
            | Value::DateTime(_, s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

// SQLite stores dates and exact numerics as text or numbers; the declared
// column type decides how they are read back.
fn decode(declared_type: &str, raw: ValueRef<'_>) -> Value {
    let decl = declared_type.to_ascii_uppercase();
    let exact = decl.contains("DECIMAL") || decl.contains("NUMERIC");
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) if exact => Value::Decimal(r.to_string()),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            decode_text(&decl, exact, text)
        }
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn decode_text(decl: &str, exact: bool, text: String) -> Value {
    if decl.contains("DATETIME") || decl.contains("TIMESTAMP") {
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
                return Value::DateTime(dt, text);
            }
        }
    } else if decl.contains("DATE") {
        if let Ok(d) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            return Value::Date(d, text);
        }
    } else if decl.contains("TIME") {
        if let Ok(t) = NaiveTime::parse_from_str(&text, "%H:%M:%S%.f") {
            return Value::Time(t, text);
        }
    } else if exact {
        return Value::Decimal(text);
    }
    Value::Text(text)
}
