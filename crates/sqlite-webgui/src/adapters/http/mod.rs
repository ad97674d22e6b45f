//! JSON API over HTTP.
//!
//! Routes live under `/api`. Write routes are only registered when the
//! database was opened writable; in read-only mode they do not exist.

mod handler;
mod protocol;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    cli::Args,
    core::{connection::Database, types::Mode},
    error::{AppError, AppResult},
};

use handler::AppState;

pub fn router(db: Database) -> Router {
    let readonly = db.mode().is_readonly();

    let mut api = Router::new()
        .route("/mode", get(handler::get_mode))
        .route("/tables", get(handler::get_tables))
        .route("/tables/:name/schema", get(handler::get_table_schema))
        .route("/tables/:name/data", get(handler::get_table_data))
        .route("/query", post(handler::execute_query));

    if !readonly {
        api = api.route(
            "/tables/:name/rows",
            post(handler::insert_row)
                .put(handler::update_row)
                .delete(handler::delete_row),
        );
    }

    Router::new()
        .nest("/api", api)
        .with_state(AppState { db })
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn run(args: Args) -> AppResult<()> {
    let mode = Mode::from_writable(args.writable);
    let db = Database::open(&args.database, mode, args.busy_timeout_ms)?;
    let app = router(db);

    let addr = args.addr();
    let listener = TcpListener::bind(&addr).await?;
    let url = args.url();
    let mode_label = if mode.is_readonly() {
        "READ-ONLY"
    } else {
        "READ-WRITE"
    };

    tracing::info!(
        database = %args.database.display(),
        mode = mode_label,
        %url,
        "sqlite web gui is running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("http server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
