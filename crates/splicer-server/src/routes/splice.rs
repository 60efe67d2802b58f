//! Splice route handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use splicer_core::Error;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

pub const SPLICE_OK: &str = "successfully spliced clips";
pub const SPLICE_FAILED: &str = "failed to split clip!";

/// POST /splice
///
/// The body is read raw so malformed JSON becomes a 400 with the parser's
/// message rather than the extractor's default rejection.
///
/// The splice runs on its own task. A client that disconnects only loses the
/// response; the clips are still encoded to completion or first failure.
pub async fn splice(
    State(ctx): State<AppContext>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Response {
    let orchestrator = ctx.orchestrator.clone();
    let task = tokio::spawn(async move { orchestrator.splice_json(&body).await });
    let result = task
        .await
        .unwrap_or_else(|e| Err(Error::Internal(format!("splice task failed: {e}"))));

    match result {
        Ok(outcome) => {
            tracing::info!(
                prefix = %outcome.prefix,
                written = outcome.files.len(),
                "Splice complete"
            );
            (StatusCode::OK, SPLICE_OK).into_response()
        }
        Err(Error::Encode { index, message }) => {
            tracing::error!(index, error = %message, "Splice aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, SPLICE_FAILED).into_response()
        }
        Err(e) => {
            let err = AppError::new(e);
            match request_id {
                Some(Extension(RequestId(id))) => err.with_request_id(id),
                None => err,
            }
            .into_response()
        }
    }
}
