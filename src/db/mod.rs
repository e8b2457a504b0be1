//! Database adapters.
//!
//! The traversal engine only needs two capabilities from a database: reflected
//! schema metadata and an equality row fetch. [`SqliteDatabase`] talks to a
//! SQLite file; [`MemoryDatabase`] keeps rows in memory for tests and
//! benchmarks.
use crate::config::{ConnectionConfig, Driver};
use crate::errors::Result;
use crate::rows::{Row, Value};
use crate::schema::{Schema, Table};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDatabase;
pub use sqlite::SqliteDatabase;

pub trait Database {
    /// Reflect tables, columns, primary keys and foreign keys.
    ///
    /// # Errors
    /// Returns the adapter's error when metadata cannot be read.
    fn schema(&self) -> Result<Schema>;

    /// All rows of `table` where `column` equals `value`. A null value
    /// matches nothing.
    ///
    /// # Errors
    /// Returns the adapter's error when the query fails.
    fn fetch(&self, table: &Table, column: &str, value: &Value) -> Result<Vec<Row>>;
}

impl<D: Database + ?Sized> Database for Box<D> {
    fn schema(&self) -> Result<Schema> {
        (**self).schema()
    }

    fn fetch(&self, table: &Table, column: &str, value: &Value) -> Result<Vec<Row>> {
        (**self).fetch(table, column, value)
    }
}

/// Open the database described by a connection entry.
///
/// # Errors
/// Returns `CopyError::Database` when the database cannot be opened.
pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn Database>> {
    match config.driver {
        Driver::Sqlite => {
            log::debug!("opening sqlite database {}", config.database.display());
            Ok(Box::new(SqliteDatabase::open(&config.database)?))
        }
    }
}
