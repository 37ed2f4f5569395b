use std::net::SocketAddr;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_RAPIDAPI_HOST: &str = "tiktok-download-without-watermark.p.rapidapi.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Process configuration, read once at start-up.
#[derive(Clone)]
pub struct Config {
    /// RapidAPI credential. `None` is allowed at start-up and reported per request.
    pub api_key: Option<String>,

    /// Value of the `X-RapidAPI-Host` header
    pub api_host: String,

    /// Endpoint receiving `?url=<encoded>`
    pub upstream_url: Url,

    pub bind_addr: SocketAddr,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_host", &self.api_host)
            .field("upstream_url", &self.upstream_url.as_str())
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    /// Build from `RAPIDAPI_KEY`, `RAPIDAPI_HOST`, `UPSTREAM_URL` and `BIND_ADDR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("RAPIDAPI_KEY").filter(|k| !k.trim().is_empty());

        let api_host = lookup("RAPIDAPI_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_string());

        let upstream_raw = lookup("UPSTREAM_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://{api_host}/analysis"));
        let upstream_url = Url::parse(&upstream_raw)
            .with_context(|| format!("UPSTREAM_URL is not a valid URL: {upstream_raw}"))?;

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind_raw}"))?;

        Ok(Self {
            api_key,
            api_host,
            upstream_url,
            bind_addr,
        })
    }

    /// Override the bind address (first CLI argument).
    pub fn with_bind_addr(mut self, address: Option<String>) -> Result<Self> {
        if let Some(addr) = address {
            self.bind_addr = addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid address: {addr}"))?;
        }
        Ok(self)
    }
}
