//! Video search and metadata route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchParams {
    pub id: Option<String>,
}

/// GET /query?q=TERM
pub async fn query(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let Some(term) = params.q else {
        return Ok((StatusCode::BAD_REQUEST, "missing query term!").into_response());
    };
    let results = ctx
        .lookup
        .search(&term, ctx.config.lookup.max_results)
        .await?;
    Ok(Json(results).into_response())
}

/// GET /watch?id=VIDEO_ID
pub async fn watch(
    State(ctx): State<AppContext>,
    Query(params): Query<WatchParams>,
) -> Result<Response, AppError> {
    let Some(id) = params.id else {
        return Ok((StatusCode::BAD_REQUEST, "missing video id!").into_response());
    };
    let info = ctx.lookup.watch(&id).await?;
    Ok(Json(info).into_response())
}
