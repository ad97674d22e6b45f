use rusqlite::{Connection, Params, Statement};

use crate::core::limits::Pagination;
use crate::core::schema::{count_rows, ensure_table, quote_ident};
use crate::core::types::{SqlValue, TableData};
use crate::error::{AppError, AppResult};

/// One page of `table` in whatever order the engine yields rows.
pub fn table_data(conn: &Connection, table: &str, page: Pagination) -> AppResult<TableData> {
    ensure_table(conn, table)?;
    let total = count_rows(conn, table)?;

    let sql = format!("SELECT * FROM {} LIMIT ?1 OFFSET ?2", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    let (columns, rows) = collect_rows(&mut stmt, [limit, offset])?;

    Ok(TableData {
        columns,
        rows,
        total,
        page: page.page,
        limit: page.limit,
    })
}

/// Runs arbitrary SQL and returns whatever rows it produces.
///
/// Write statements are not filtered here; on a read-only connection the
/// engine itself rejects them.
pub fn execute_query(conn: &Connection, sql: &str) -> AppResult<TableData> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(AppError::Validation("query cannot be empty".into()));
    }

    let mut stmt = conn.prepare(sql)?;
    let (columns, rows) = collect_rows(&mut stmt, [])?;
    let n = rows.len();
    Ok(TableData {
        columns,
        rows,
        total: i64::try_from(n).unwrap_or(i64::MAX),
        page: 1,
        limit: n,
    })
}

fn collect_rows<P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
) -> AppResult<(Vec<String>, Vec<Vec<SqlValue>>)> {
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut r = stmt.query(params)?;
    while let Some(row) = r.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(SqlValue::from(row.get_ref(i)?));
        }
        rows.push(cells);
    }
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::users_db;

    #[test]
    fn first_page_returns_everything_on_small_table() {
        let conn = users_db();
        let data = table_data(&conn, "users", Pagination::default()).unwrap();
        assert_eq!(data.total, 2);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.columns, ["id", "name", "email"]);
        assert_eq!(data.page, 1);
        assert_eq!(data.limit, 50);
    }

    #[test]
    fn pages_are_offset_by_limit() {
        let conn = users_db();
        let p = Pagination::from_params(Some("2"), Some("1"));
        let data = table_data(&conn, "users", p).unwrap();
        assert_eq!(data.total, 2);
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.page, 2);

        let p = Pagination::from_params(Some("3"), Some("1"));
        let data = table_data(&conn, "users", p).unwrap();
        assert!(data.rows.is_empty());
        assert_eq!(data.total, 2);
    }

    #[test]
    fn mixed_cell_types_and_blobs() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE m (a, b, c, d, e); INSERT INTO m VALUES (NULL, 7, 2.5, 'txt', X'6869');",
        )
        .unwrap();
        let data = table_data(&conn, "m", Pagination::default()).unwrap();
        assert_eq!(
            data.rows[0],
            vec![
                SqlValue::Null,
                SqlValue::Integer(7),
                SqlValue::Real(2.5),
                SqlValue::Text("txt".into()),
                SqlValue::Text("hi".into()),
            ]
        );
    }

    #[test]
    fn unknown_table_fails() {
        let conn = users_db();
        let err = table_data(&conn, "missing", Pagination::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn hostile_table_name_is_rejected_before_sql_is_built() {
        let conn = users_db();
        let err = table_data(&conn, "users\" ; DROP TABLE users; --", Pagination::default())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(table_data(&conn, "users", Pagination::default()).unwrap().total, 2);
    }

    #[test]
    fn select_covers_whole_result() {
        let conn = users_db();
        let data = execute_query(&conn, "  SELECT * FROM users WHERE name = 'Alice'  ").unwrap();
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.total, 1);
        assert_eq!(data.page, 1);
        assert_eq!(data.limit, 1);
    }

    #[test]
    fn blank_query_is_a_validation_error() {
        let conn = users_db();
        for sql in ["", "   ", "\n\t"] {
            let err = execute_query(&conn, sql).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn write_statements_run_on_writable_connection() {
        let conn = users_db();
        let data = execute_query(&conn, "UPDATE users SET name = 'Alice Updated' WHERE id = 1").unwrap();
        assert!(data.columns.is_empty());
        assert!(data.rows.is_empty());

        let data = execute_query(&conn, "SELECT name FROM users WHERE id = 1").unwrap();
        assert_eq!(data.rows[0][0], SqlValue::Text("Alice Updated".into()));
    }

    #[test]
    fn syntax_errors_are_query_errors() {
        let conn = users_db();
        let err = execute_query(&conn, "SELEC nonsense").unwrap_err();
        assert!(matches!(err, AppError::Query(_)));
    }
}
