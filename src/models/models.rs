use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::errors::GatewayError;
use crate::utils::utils::{is_tiktok_url, is_valid_http_url};

/// Incoming body of `POST /download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Trimmed TikTok URL
    pub url: String,
}

impl DownloadRequest {
    /// Validate an untyped request body.
    ///
    /// The body must be a JSON object whose `url` is a non-blank http(s) URL
    /// pointing at a `tiktok.com` host. The stored URL is trimmed.
    pub fn from_body(body: &Value) -> Result<Self, GatewayError> {
        let Some(raw) = body.get("url") else {
            return Err(GatewayError::Validation("url is required".into()));
        };
        let Some(raw) = raw.as_str() else {
            return Err(GatewayError::Validation("url must be a string".into()));
        };

        let url = raw.trim();
        if url.is_empty() {
            return Err(GatewayError::Validation("url cannot be empty".into()));
        }
        if !is_valid_http_url(url) {
            return Err(GatewayError::Validation(
                "url is not a valid http(s) URL".into(),
            ));
        }
        if !is_tiktok_url(url) {
            return Err(GatewayError::Validation(
                "url must point to tiktok.com".into(),
            ));
        }

        Ok(Self {
            url: url.to_string(),
        })
    }

    /// Same as [`DownloadRequest::from_body`], starting from raw bytes.
    /// A body that is not JSON is reported like a missing `url`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GatewayError> {
        let body = serde_json::from_slice::<Value>(bytes).unwrap_or(Value::Null);
        Self::from_body(&body)
    }
}

/// Normalized video metadata handed back to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDetails {
    /// Direct, watermark-free media URL (never empty)
    pub video_url: String,
    pub title: String,
    pub author: String,

    /// Length in seconds, never negative
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,

    pub thumbnail: String,
}

/// Whole seconds go out as integers (`12`, not `12.0`).
fn serialize_duration<S: Serializer>(duration: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if duration.fract() == 0.0 && *duration >= 0.0 && *duration <= u64::MAX as f64 {
        serializer.serialize_u64(*duration as u64)
    } else {
        serializer.serialize_f64(*duration)
    }
}

/// The envelope every `/download` response is wrapped in.
/// The `success` flag is derived from the variant when serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoData {
    Success(VideoDetails),
    Failure(String),
}

impl VideoData {
    pub fn success(data: VideoDetails) -> Self {
        VideoData::Success(data)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        VideoData::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, VideoData::Success(_))
    }
}

impl Serialize for VideoData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("VideoData", 2)?;
        match self {
            VideoData::Success(data) => {
                envelope.serialize_field("success", &true)?;
                envelope.serialize_field("data", data)?;
            }
            VideoData::Failure(error) => {
                envelope.serialize_field("success", &false)?;
                envelope.serialize_field("error", error)?;
            }
        }
        envelope.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
