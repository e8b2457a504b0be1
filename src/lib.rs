//! copyql — copy a connected subset of rows out of a relational database.
//!
//! Starting from seed lookups such as `orders.id:42`, copyql fetches the
//! matching rows, asks a relationship resolver which columns of other tables
//! they point to (or are pointed to by), and keeps fetching until no new rows
//! turn up. The result is a closed set of rows that can be re-inserted
//! elsewhere without dangling references.
//!
//! # Features
//! - Worklist traversal that terminates on cyclic schemas (query and row dedup)
//! - Resolvers: declared foreign keys, `<singular>_id` naming conventions,
//!   explicit key maps, or any chain of them
//! - SQLite adapter with schema reflection; in-memory adapter for tests
//! - SQL (`INSERT`) and JSON exporters, parents before children
//!
//! # Quickstart (Library)
//! ```no_run
//! use copyql::db::{Database, SqliteDatabase};
//! use copyql::export::{Exporter, SqlExporter};
//! use copyql::query::Query;
//! use copyql::resolver::ConstraintResolver;
//! use copyql::traversal::Traversal;
//!
//! let db = SqliteDatabase::open(std::path::Path::new("shop.db")).expect("open database");
//! let schema = db.schema().expect("reflect schema");
//! let seeds = vec!["orders.id:42".parse::<Query>().expect("seed")];
//! let rows = Traversal::new(&schema, &db, &ConstraintResolver).run(&seeds).expect("traverse");
//! SqlExporter.export(&schema, &rows, &mut std::io::stdout()).expect("export");
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! copyql export -c copyql.toml local orders.id:42 > subset.sql
//! copyql export -f json local users.email:ann@example.com
//! ```
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod query;
pub mod resolver;
pub mod rows;
pub mod schema;
pub mod traversal;
pub mod utils;
