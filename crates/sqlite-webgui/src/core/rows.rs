use rusqlite::{params_from_iter, Connection};

use crate::core::schema::{ensure_columns, quote_ident};
use crate::core::types::{RowValues, SqlValue};
use crate::error::{AppError, AppResult};

// Identifiers are checked against the live schema and then quoted into the
// statement text; values are always bound.

pub fn insert_row(conn: &Connection, table: &str, values: &RowValues) -> AppResult<usize> {
    ensure_columns(conn, table, values.keys().map(String::as_str), None)?;

    let sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
    } else {
        let columns: Vec<String> = values.keys().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    let n = conn.execute(&sql, params_from_iter(values.values()))?;
    Ok(n)
}

/// Zero matching rows is not an error; the affected count is returned.
pub fn update_row(
    conn: &Connection,
    table: &str,
    pk_column: &str,
    pk_value: &SqlValue,
    values: &RowValues,
) -> AppResult<usize> {
    if values.is_empty() {
        return Err(AppError::Validation("no columns to update".into()));
    }
    ensure_columns(conn, table, values.keys().map(String::as_str), Some(pk_column))?;

    let set_clauses: Vec<String> = values
        .keys()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote_ident(c), i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quote_ident(table),
        set_clauses.join(", "),
        quote_ident(pk_column),
        values.len() + 1
    );

    let params = values.values().chain(std::iter::once(pk_value));
    let n = conn.execute(&sql, params_from_iter(params))?;
    Ok(n)
}

pub fn delete_row(
    conn: &Connection,
    table: &str,
    pk_column: &str,
    pk_value: &SqlValue,
) -> AppResult<usize> {
    ensure_columns(conn, table, std::iter::empty::<&str>(), Some(pk_column))?;

    let sql = format!(
        "DELETE FROM {} WHERE {} = ?1",
        quote_ident(table),
        quote_ident(pk_column)
    );
    let n = conn.execute(&sql, [pk_value])?;
    Ok(n)
}
