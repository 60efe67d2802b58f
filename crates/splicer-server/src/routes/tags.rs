//! Tag index route handlers.

use axum::extract::State;
use axum::Json;

use crate::context::AppContext;

/// GET /tags
///
/// Every label submitted so far, sorted.
pub async fn list_tags(State(ctx): State<AppContext>) -> Json<Vec<String>> {
    Json(ctx.tags.snapshot())
}
