use std::{
    path::Path,
    sync::mpsc,
    thread,
    time::Duration,
};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::oneshot;

use crate::{
    core::{
        limits::Pagination,
        query, rows, schema,
        types::{Column, Mode, RowValues, SqlValue, Table, TableData},
    },
    error::{AppError, AppResult},
};

/// Handle to the single connection shared by every request.
///
/// The connection lives on a dedicated thread; calls are queued and run
/// one at a time in arrival order. Cloning the handle is cheap.
#[derive(Debug, Clone)]
pub struct Database {
    tx: mpsc::Sender<DbTask>,
    mode: Mode,
}

impl Database {
    /// Opens an existing database file. The file is never created; in
    /// read-only mode the engine connection itself is read-only too.
    pub fn open(db_path: &Path, mode: Mode, busy_timeout_ms: u64) -> AppResult<Self> {
        let conn = open_conn(db_path, mode, busy_timeout_ms)?;
        let (tx, rx) = mpsc::channel::<DbTask>();
        thread::Builder::new()
            .name("sqlite-worker".into())
            .spawn(move || db_worker_main(conn, rx))?;
        Ok(Self { tx, mode })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub async fn list_tables(&self, with_columns: bool) -> AppResult<Vec<Table>> {
        self.call(|respond_to| DbTask::Tables {
            with_columns,
            respond_to,
        })
        .await
    }

    pub async fn table_schema(&self, table: String) -> AppResult<Vec<Column>> {
        self.call(|respond_to| DbTask::Schema { table, respond_to })
            .await
    }

    pub async fn table_data(&self, table: String, page: Pagination) -> AppResult<TableData> {
        self.call(|respond_to| DbTask::Data {
            table,
            page,
            respond_to,
        })
        .await
    }

    pub async fn insert_row(&self, table: String, values: RowValues) -> AppResult<usize> {
        self.ensure_writable()?;
        self.call(|respond_to| DbTask::Insert {
            table,
            values,
            respond_to,
        })
        .await
    }

    pub async fn update_row(
        &self,
        table: String,
        pk_column: String,
        pk_value: SqlValue,
        values: RowValues,
    ) -> AppResult<usize> {
        self.ensure_writable()?;
        self.call(|respond_to| DbTask::Update {
            table,
            pk_column,
            pk_value,
            values,
            respond_to,
        })
        .await
    }

    pub async fn delete_row(
        &self,
        table: String,
        pk_column: String,
        pk_value: SqlValue,
    ) -> AppResult<usize> {
        self.ensure_writable()?;
        self.call(|respond_to| DbTask::Delete {
            table,
            pk_column,
            pk_value,
            respond_to,
        })
        .await
    }

    /// Runs arbitrary SQL. Not gated by mode: a read-only connection makes
    /// the engine refuse writes on its own.
    pub async fn execute_query(&self, sql: String) -> AppResult<TableData> {
        self.call(|respond_to| DbTask::Query { sql, respond_to })
            .await
    }

    fn ensure_writable(&self) -> AppResult<()> {
        if self.mode.is_readonly() {
            return Err(AppError::ReadOnly);
        }
        Ok(())
    }

    async fn call<T>(
        &self,
        task: impl FnOnce(oneshot::Sender<AppResult<T>>) -> DbTask,
    ) -> AppResult<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(task(tx))
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }
}

enum DbTask {
    Tables {
        with_columns: bool,
        respond_to: oneshot::Sender<AppResult<Vec<Table>>>,
    },
    Schema {
        table: String,
        respond_to: oneshot::Sender<AppResult<Vec<Column>>>,
    },
    Data {
        table: String,
        page: Pagination,
        respond_to: oneshot::Sender<AppResult<TableData>>,
    },
    Insert {
        table: String,
        values: RowValues,
        respond_to: oneshot::Sender<AppResult<usize>>,
    },
    Update {
        table: String,
        pk_column: String,
        pk_value: SqlValue,
        values: RowValues,
        respond_to: oneshot::Sender<AppResult<usize>>,
    },
    Delete {
        table: String,
        pk_column: String,
        pk_value: SqlValue,
        respond_to: oneshot::Sender<AppResult<usize>>,
    },
    Query {
        sql: String,
        respond_to: oneshot::Sender<AppResult<TableData>>,
    },
}

fn db_worker_main(conn: Connection, rx: mpsc::Receiver<DbTask>) {
    while let Ok(task) = rx.recv() {
        match task {
            DbTask::Tables {
                with_columns,
                respond_to,
            } => {
                let _ = respond_to.send(schema::list_tables(&conn, with_columns));
            }
            DbTask::Schema { table, respond_to } => {
                let _ = respond_to.send(schema::table_schema(&conn, &table));
            }
            DbTask::Data {
                table,
                page,
                respond_to,
            } => {
                let _ = respond_to.send(query::table_data(&conn, &table, page));
            }
            DbTask::Insert {
                table,
                values,
                respond_to,
            } => {
                let res = rows::insert_row(&conn, &table, &values);
                if let Ok(n) = &res {
                    tracing::info!(%table, changes = *n, "row inserted");
                }
                let _ = respond_to.send(res);
            }
            DbTask::Update {
                table,
                pk_column,
                pk_value,
                values,
                respond_to,
            } => {
                let res = rows::update_row(&conn, &table, &pk_column, &pk_value, &values);
                if let Ok(n) = &res {
                    tracing::info!(%table, pk = %pk_column, changes = *n, "row updated");
                }
                let _ = respond_to.send(res);
            }
            DbTask::Delete {
                table,
                pk_column,
                pk_value,
                respond_to,
            } => {
                let res = rows::delete_row(&conn, &table, &pk_column, &pk_value);
                if let Ok(n) = &res {
                    tracing::info!(%table, pk = %pk_column, changes = *n, "row deleted");
                }
                let _ = respond_to.send(res);
            }
            DbTask::Query { sql, respond_to } => {
                tracing::debug!(%sql, "executing ad-hoc query");
                let _ = respond_to.send(query::execute_query(&conn, &sql));
            }
        }
    }
    tracing::debug!("db worker exiting");
}

fn open_conn(path: &Path, mode: Mode, busy_timeout_ms: u64) -> AppResult<Connection> {
    let access = match mode {
        Mode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
        Mode::Writable => OpenFlags::SQLITE_OPEN_READ_WRITE,
    };
    let flags = access | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let open_failed = |source| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open_with_flags(path, flags).map_err(open_failed)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(open_failed)?;

    // Opening is lazy; touch the schema so a non-database file fails here.
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))
        .map_err(open_failed)?;
    Ok(conn)
}
