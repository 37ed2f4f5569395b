use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tracing::{info, warn};

use crate::app::config::Config;
use crate::handlers::handlers::{download, health, method_not_allowed};
use crate::service::state::AppState;
use crate::upstream::fetchers::RapidApiClient;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Routes are exposed both bare and under `/api`.
pub fn build_router(state: AppState) -> Router {
    let download_route: MethodRouter<AppState> = post(download).fallback(method_not_allowed);

    Router::new()
        .route("/download", download_route.clone())
        .route("/api/download", download_route)
        .route("/health", get(health))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Serve until Ctrl-C, then drain in-flight requests.
pub async fn start_axum_server(config: Config) -> Result<()> {
    let addr = config.bind_addr;
    if config.api_key.is_none() {
        warn!("RAPIDAPI_KEY is not set; /download will answer 500 until it is configured");
    }
    info!("Forwarding to {} (host {})", config.upstream_url, config.api_host);

    let source = Arc::new(RapidApiClient::from_config(&config)?);
    let app = build_router(AppState::new(config, source));

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    info!("Listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::gateway::tests::FakeSource;
    use crate::errors::errors::GatewayError;
    use crate::upstream::fetchers::VideoSource;
    use crate::upstream::models::UpstreamReply;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn config(api_key: Option<&str>) -> Config {
        let key = api_key.map(str::to_string);
        Config::from_lookup(move |name| match name {
            "RAPIDAPI_KEY" => key.clone(),
            _ => None,
        })
        .unwrap()
    }

    fn app(api_key: Option<&str>, source: Arc<dyn VideoSource>) -> Router {
        build_router(AppState::new(config(api_key), source))
    }

    async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_download(app: Router, body: &str) -> (StatusCode, Value) {
        send(app, Method::POST, "/download", body).await
    }

    const REQUEST: &str = r#"{"url":"https://www.tiktok.com/@user/video/123"}"#;

    #[tokio::test]
    async fn wrapped_payload_is_normalized() {
        let upstream = r#"{"code":0,"data":{"play":"https://cdn/x.mp4","title":"Hi","author":{"unique_id":"u1"},"duration":12,"cover":"https://cdn/c.jpg"}}"#;
        let (status, body) = post_download(app(Some("key"), FakeSource::replying(200, upstream)), REQUEST).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "data": {
                "video_url": "https://cdn/x.mp4",
                "title": "Hi",
                "author": "u1",
                "duration": 12,
                "thumbnail": "https://cdn/c.jpg"
            }})
        );
    }

    #[tokio::test]
    async fn rate_limit_is_propagated() {
        let (status, body) = post_download(app(Some("key"), FakeSource::replying(429, "{}")), REQUEST).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], "Request limit exceeded. Try again in a few minutes.");
    }

    #[tokio::test]
    async fn provider_msg_becomes_the_error() {
        let source = FakeSource::replying(200, r#"{"code":1,"msg":"no video"}"#);
        let (status, body) = post_download(app(Some("key"), source), REQUEST).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "no video"}));
    }

    #[tokio::test]
    async fn missing_or_empty_url_is_rejected_without_upstream_call() {
        let source = FakeSource::replying(200, "{}");
        for request in [r#"{}"#, r#"{"url":""}"#, r#"{"url":"   "}"#, "not json"] {
            let (status, body) = post_download(app(Some("key"), source.clone()), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{request}");
            assert_eq!(body["success"], json!(false));
            assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
        }
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_upstream_body_is_bad_gateway() {
        let (status, body) =
            post_download(app(Some("key"), FakeSource::replying(200, "<html>")), REQUEST).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], json!(false));
        assert_eq!(
            body["error"],
            "The upstream API returned an invalid response (status: 200)"
        );
    }

    #[tokio::test]
    async fn missing_credential_is_a_server_error() {
        let source = FakeSource::replying(200, "{}");
        let (status, body) = post_download(app(None, source.clone()), REQUEST).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn forbidden_variants() {
        let sub = FakeSource::replying(403, r#"{"message":"You are not subscribed to this API."}"#);
        let (status, body) = post_download(app(Some("key"), sub), REQUEST).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("not subscribed"));

        let bad_key = FakeSource::replying(403, r#"{"message":"Invalid API key."}"#);
        let (status, body) = post_download(app(Some("key"), bad_key), REQUEST).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid API key"));
    }

    #[tokio::test]
    async fn api_prefixed_route_behaves_the_same() {
        let source = FakeSource::replying(200, r#"{"video_url":"https://cdn/v.mp4","author":"flat"}"#);
        let (status, body) = send(app(Some("key"), source), Method::POST, "/api/download", REQUEST).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["video_url"], "https://cdn/v.mp4");
        assert_eq!(body["data"]["author"], "flat");
        assert_eq!(body["data"]["title"], "TikTok Video");
    }

    #[tokio::test]
    async fn other_methods_get_an_envelope() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/download")
            .body(Body::empty())
            .unwrap();
        let response = app(Some("key"), FakeSource::replying(200, "{}"))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"success": false, "error": "Method Not Allowed"}));
    }

    #[tokio::test]
    async fn oversized_body_keeps_413_with_an_envelope() {
        let source = FakeSource::replying(200, "{}");
        let huge = format!(r#"{{"url":"{}"}}"#, "a".repeat(3 * 1024 * 1024));
        let (status, body) = post_download(app(Some("key"), source.clone()), &huge).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
        assert_eq!(source.call_count(), 0);
    }

    /// A provider that blows up mid-call.
    struct PanickingSource;

    #[async_trait]
    impl VideoSource for PanickingSource {
        async fn analyze(&self, _video_url: &str, _api_key: &str) -> Result<UpstreamReply, GatewayError> {
            panic!("provider exploded")
        }
    }

    #[tokio::test]
    async fn panic_in_pipeline_is_an_internal_error() {
        let (status, body) = post_download(app(Some("key"), Arc::new(PanickingSource)), REQUEST).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Internal server error"}));
    }

    #[tokio::test]
    async fn health_on_both_prefixes() {
        for uri in ["/health", "/api/health"] {
            let (status, body) = send(app(None, FakeSource::replying(200, "{}")), Method::GET, uri, "").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"status": "ok"}));
        }
    }
}
