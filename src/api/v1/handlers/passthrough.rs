/*
 * Responsibility
 * - /serve/{*path} を LiteLLM へ中継する handler
 * - 同期応答は JSON、stream 指定時は text/event-stream で chunk を流す
 */
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Method, Uri, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    services::passthrough::{ForwardRequest, Forwarded},
    state::AppState,
};

pub async fn passthrough(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    tracing::debug!(username = %ctx.username, %path, "passthrough");

    let forwarded = state
        .passthrough
        .forward(ForwardRequest {
            method,
            path,
            query: uri.query().map(str::to_string),
            headers,
            body,
        })
        .await?;

    Ok(match forwarded {
        Forwarded::Json { status, body } => (status, Json(body)).into_response(),
        Forwarded::Stream { status, lines } => {
            let mut res = Response::new(Body::from_stream(lines));
            *res.status_mut() = status;
            let headers = res.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/event-stream"),
            );
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            res
        }
    })
}
