//! Operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::context::AppContext;

/// GET /health
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// GET /tools
pub async fn tools(State(ctx): State<AppContext>) -> Json<Vec<splicer_av::ToolInfo>> {
    let infos = ctx.tools.check_all();
    Json(infos)
}
