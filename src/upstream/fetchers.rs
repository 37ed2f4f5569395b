use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::app::config::Config;
use crate::errors::errors::GatewayError;
use crate::upstream::models::UpstreamReply;

pub const API_KEY_HEADER: &str = "X-RapidAPI-Key";
pub const API_HOST_HEADER: &str = "X-RapidAPI-Host";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Something that can resolve a TikTok URL into a raw provider reply.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// One outbound call, no retries. Only transport failures are errors;
    /// any HTTP status comes back as an [`UpstreamReply`].
    async fn analyze(&self, video_url: &str, api_key: &str) -> Result<UpstreamReply, GatewayError>;
}

/// The RapidAPI "TikTok Download Without Watermark" endpoint.
#[derive(Debug, Clone)]
pub struct RapidApiClient {
    client: Client,
    endpoint: Url,
    host: String,
}

impl RapidApiClient {
    pub fn new(endpoint: Url, host: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint,
            host: host.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.upstream_url.clone(), config.api_host.clone())
    }

    /// `<endpoint>?url=<percent-encoded video url>`
    pub fn request_url(&self, video_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", video_url);
        url
    }
}

#[async_trait]
impl VideoSource for RapidApiClient {
    async fn analyze(&self, video_url: &str, api_key: &str) -> Result<UpstreamReply, GatewayError> {
        let request_url = self.request_url(video_url);
        debug!("GET {}", self.endpoint);

        let response = self
            .client
            .get(request_url)
            .header(API_KEY_HEADER, api_key)
            .header(API_HOST_HEADER, &self.host)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Upstream answered {status} with {} bytes", body.len());

        Ok(UpstreamReply::new(status, body))
    }
}
