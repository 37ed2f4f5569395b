use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::errors::GatewayError;
use crate::models::models::{DownloadRequest, VideoDetails};
use crate::upstream::fetchers::VideoSource;
use crate::upstream::parsers::normalize;

/// Validates a download request, calls the provider once and normalizes
/// the answer. Holds no per-request state.
#[derive(Clone)]
pub struct Gateway {
    source: Arc<dyn VideoSource>,
}

impl Gateway {
    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }

    /// Full pipeline from a raw request body. The credential is passed in
    /// explicitly; a missing one is reported before any network call.
    pub async fn download(
        &self,
        body: &[u8],
        api_key: Option<&str>,
    ) -> Result<VideoDetails, GatewayError> {
        let request = DownloadRequest::from_bytes(body)?;
        self.resolve(&request, api_key).await
    }

    pub async fn resolve(
        &self,
        request: &DownloadRequest,
        api_key: Option<&str>,
    ) -> Result<VideoDetails, GatewayError> {
        let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            warn!("Refusing {}: RAPIDAPI_KEY is not configured", request.url);
            return Err(GatewayError::Configuration);
        };

        let reply = self.source.analyze(&request.url, api_key).await?;
        let details = normalize(&reply)?;

        info!(
            "Resolved {} => {} ({}s by {})",
            request.url, details.video_url, details.duration, details.author
        );
        Ok(details)
    }
}
