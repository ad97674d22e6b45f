use std::collections::HashSet;

use rusqlite::{Connection, Row};

use crate::core::types::{Column, Table};
use crate::error::{AppError, AppResult};

const ROWID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// User tables ordered by name, each with its row count.
///
/// Per-table failures do not fail the whole listing: a table whose count
/// query fails is reported with zero rows, and one whose schema lookup
/// fails is reported without columns.
pub fn list_tables(conn: &Connection, with_columns: bool) -> AppResult<Vec<Table>> {
    list_tables_with(conn, with_columns, count_rows, table_schema)
}

fn list_tables_with(
    conn: &Connection,
    with_columns: bool,
    count: impl Fn(&Connection, &str) -> AppResult<i64>,
    columns_of: impl Fn(&Connection, &str) -> AppResult<Vec<Column>>,
) -> AppResult<Vec<Table>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let row_count = match count(conn, &name) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(table = %name, error = %e, "row count failed; reporting 0");
                0
            }
        };
        let columns = if with_columns {
            match columns_of(conn, &name) {
                Ok(cols) => Some(cols),
                Err(e) => {
                    tracing::warn!(table = %name, error = %e, "schema lookup failed; omitting columns");
                    None
                }
            }
        } else {
            None
        };
        tables.push(Table {
            name,
            row_count,
            columns,
        });
    }
    Ok(tables)
}

/// Columns of `table` in declaration order.
pub fn table_schema(conn: &Connection, table: &str) -> AppResult<Vec<Column>> {
    ensure_table(conn, table)?;

    // The table-valued form of table_info takes the name as a bound parameter.
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let cols = stmt
        .query_map([table], |row: &Row<'_>| {
            Ok(Column {
                name: row.get(0)?,
                decl_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(2)? != 0,
                default_value: row.get(3)?,
                primary_key: row.get::<_, i64>(4)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cols)
}

pub fn count_rows(conn: &Connection, table: &str) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let n = conn.query_row(&sql, [], |r| r.get::<_, i64>(0))?;
    Ok(n)
}

/// Fails with `NotFound` unless `table` is a table or view in the live schema.
pub fn ensure_table(conn: &Connection, table: &str) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE)",
        [table],
        |r| r.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("no such table: {table}")))
    }
}

/// Checks every name in `columns` (and the primary-key column, if any)
/// against the table's introspected columns. Names match case-insensitively,
/// as the engine resolves them.
///
/// The rowid aliases are accepted as primary-key column only when the table
/// really has a rowid. Quoted, an alias that resolves to nothing would be
/// read by the engine as a string literal.
pub fn ensure_columns<'a>(
    conn: &Connection,
    table: &str,
    columns: impl IntoIterator<Item = &'a str>,
    pk_column: Option<&str>,
) -> AppResult<()> {
    let known: HashSet<String> = table_schema(conn, table)?
        .into_iter()
        .map(|c| c.name.to_ascii_lowercase())
        .collect();
    let is_known = |name: &str| known.contains(&name.to_ascii_lowercase());

    for col in columns {
        if !is_known(col) {
            return Err(AppError::Validation(format!(
                "no such column: {col} in table {table}"
            )));
        }
    }

    if let Some(pk) = pk_column {
        if !is_known(pk) && !is_rowid_alias_of(conn, table, pk) {
            return Err(AppError::Validation(format!(
                "no such column: {pk} in table {table}"
            )));
        }
    }
    Ok(())
}

/// True when `name` is one of the rowid aliases and resolves as such on
/// `table`. `WITHOUT ROWID` tables and views have no rowid.
fn is_rowid_alias_of(conn: &Connection, table: &str, name: &str) -> bool {
    let Some(alias) = ROWID_ALIASES.iter().find(|a| a.eq_ignore_ascii_case(name)) else {
        return false;
    };
    // Left unquoted so an unresolvable alias is a prepare error.
    let sql = format!("SELECT {alias} FROM {} LIMIT 0", quote_ident(table));
    conn.prepare(&sql).is_ok()
}

/// Quotes an identifier for embedding into SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
