use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::core::{
    connection::Database,
    limits::Pagination,
    types::{Column, RowValues, SqlValue, Table, TableData},
};

use super::protocol::*;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

type ApiResult<T> = Result<T, ApiError>;

pub async fn get_mode(State(state): State<AppState>) -> Json<ModeResponse> {
    Json(ModeResponse {
        readonly: state.db.mode().is_readonly(),
    })
}

pub async fn get_tables(
    State(state): State<AppState>,
    Query(params): Query<TablesParams>,
) -> ApiResult<Json<Vec<Table>>> {
    let tables = state.db.list_tables(params.with_columns()).await?;
    Ok(Json(tables))
}

pub async fn get_table_schema(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Column>>> {
    let columns = state.db.table_schema(name).await?;
    Ok(Json(columns))
}

pub async fn get_table_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<TableData>> {
    let page = Pagination::from_params(params.page.as_deref(), params.limit.as_deref());
    let data = state.db.table_data(name, page).await?;
    Ok(Json(data))
}

pub async fn insert_row(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<RowValues>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(values) = payload?;
    state.db.insert_row(name, values).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Row inserted successfully",
        }),
    ))
}

pub async fn update_row(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PkParams>,
    payload: Result<Json<RowValues>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let (pk, pk_value) = params.require()?;
    let Json(values) = payload?;
    state
        .db
        .update_row(name, pk, SqlValue::from(pk_value.as_str()), values)
        .await?;
    Ok(Json(MessageResponse {
        message: "Row updated successfully",
    }))
}

pub async fn delete_row(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PkParams>,
) -> ApiResult<Json<MessageResponse>> {
    let (pk, pk_value) = params.require()?;
    state
        .db
        .delete_row(name, pk, SqlValue::from(pk_value.as_str()))
        .await?;
    Ok(Json(MessageResponse {
        message: "Row deleted successfully",
    }))
}

/// Every failure on this endpoint, engine errors included, is a 400.
pub async fn execute_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<TableData>> {
    let Json(req) = payload?;
    let data = state
        .db
        .execute_query(req.sql)
        .await
        .map_err(ApiError::bad_request)?;
    Ok(Json(data))
}
