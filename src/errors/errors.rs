use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::models::VideoData;

/// Everything that can go wrong between receiving a URL and returning
/// normalized video details. The `Display` text is what the client sees.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The body could not be read at all (too large, aborted upload).
    #[error("Invalid request: {message}")]
    BodyRejected { status: u16, message: String },

    #[error("Server error: the RapidAPI key is not configured. Set RAPIDAPI_KEY in the environment.")]
    Configuration,

    #[error("Could not reach the upstream API: {0}")]
    UpstreamUnreachable(String),

    #[error("The upstream API returned an invalid response (status: {status})")]
    UpstreamMalformedResponse { status: u16 },

    #[error("You are not subscribed to this API. Subscribe to \"TikTok Download Without Watermark\" on RapidAPI to use this feature.")]
    Subscription,

    #[error("Invalid API key. Check your RAPIDAPI_KEY on RapidAPI.com")]
    InvalidCredential,

    #[error("Request limit exceeded. Try again in a few minutes.")]
    RateLimit,

    #[error("Upstream API error: {message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    NoVideoFound(String),

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::NoVideoFound(_) => StatusCode::BAD_REQUEST,
            GatewayError::Configuration | GatewayError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::UpstreamUnreachable(_)
            | GatewayError::UpstreamMalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Subscription | GatewayError::InvalidCredential => StatusCode::FORBIDDEN,
            GatewayError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BodyRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::UpstreamUnreachable(err.to_string())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        GatewayError::BodyRejected {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(VideoData::failure(self.to_string()))).into_response()
    }
}
