use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::errors::GatewayError;
use crate::models::models::{HealthResponse, VideoData};
use crate::service::state::AppState;

/// `POST /download` with `{"url": "..."}`.
///
/// Always answers with a [`VideoData`] envelope. The pipeline runs on its own
/// task so a panic inside it is reported as an internal error instead of
/// dropping the connection. Unreadable bodies keep axum's status (413 for
/// oversized uploads) but still get the envelope.
pub async fn download(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("download", %request_id);

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = GatewayError::from(rejection);
            info!(parent: &span, "{}: {err}", err.status());
            return err.into_response();
        }
    };

    let gateway = state.gateway.clone();
    let api_key = state.api_key();
    let outcome = tokio::spawn(
        async move { gateway.download(&body, api_key.as_deref()).await }.instrument(span.clone()),
    )
    .await
    .unwrap_or_else(|e| {
        error!(parent: &span, "Download task failed: {e}");
        Err(GatewayError::Internal)
    });

    match outcome {
        Ok(details) => (StatusCode::OK, Json(VideoData::success(details))).into_response(),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                warn!(parent: &span, "{status}: {err}");
            } else {
                info!(parent: &span, "{status}: {err}");
            }
            err.into_response()
        }
    }
}

/// Any method other than POST on the download routes.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(VideoData::failure("Method Not Allowed")),
    )
        .into_response()
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
