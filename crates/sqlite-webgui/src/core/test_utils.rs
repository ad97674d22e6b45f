use std::path::Path;

use rusqlite::Connection;

use crate::core::types::{RowValues, SqlValue};

const USERS_SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT
    );
    INSERT INTO users (name, email) VALUES
        ('Alice', 'alice@example.com'),
        ('Bob', 'bob@example.com');
";

/// In-memory database with a two-row `users` table.
pub fn users_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(USERS_SCHEMA).unwrap();
    conn
}

/// Same fixture as `users_db`, written to a file so it can be reopened read-only.
pub fn users_db_file(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(USERS_SCHEMA).unwrap();
}

pub fn row_values(pairs: &[(&str, SqlValue)]) -> RowValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
