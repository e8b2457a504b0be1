#![allow(dead_code)]

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub const SHOP: &str = r"
CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER NOT NULL REFERENCES customers(id),
    placed_on DATE
);
CREATE TABLE order_items (
    id INTEGER PRIMARY KEY,
    order_id INTEGER NOT NULL REFERENCES orders(id),
    sku TEXT,
    price DECIMAL(10, 2)
);
INSERT INTO customers VALUES (1, 'ann'), (2, 'O''Brien');
INSERT INTO orders VALUES (1, 1, '2024-03-01'), (2, 2, '2024-03-02');
INSERT INTO order_items VALUES (1, 1, 'apple', '1.50'), (2, 1, 'pear', '2.00'), (3, 2, 'plum', '0.75');
";

pub const BLOG: &str = r"
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER, title TEXT);
INSERT INTO users VALUES (1, 'ann'), (2, 'bob');
INSERT INTO posts VALUES (10, 1, 'hello'), (11, 1, 'again'), (12, 2, 'other');
";

pub const STAFF: &str = r"
CREATE TABLE employees (
    id INTEGER PRIMARY KEY,
    name TEXT,
    manager_id INTEGER REFERENCES employees(id)
);
INSERT INTO employees VALUES (1, 'boss', 1), (2, 'dev', 1), (3, 'loner', NULL);
";

/// Create a SQLite file from `ddl` inside `dir`.
pub fn create_db(dir: &Path, name: &str, ddl: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(ddl).unwrap();
    path
}

pub fn write_file(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

/// Config with one `local` connection pointing at `db_file` next to it.
pub fn write_config(dir: &Path, db_file: &str, extra: &str) -> PathBuf {
    let path = dir.join("copyql.toml");
    write_file(
        &path,
        &format!("[connections.local]\ndriver = \"sqlite\"\ndatabase = \"{db_file}\"\n{extra}"),
    );
    path
}
