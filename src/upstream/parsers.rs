//! Turns whatever the provider sent back into [`VideoDetails`] or a
//! classified [`GatewayError`].
//!
//! Every normalized field is read through a fixed, ordered list of candidate
//! keys; the first truthy value wins and values are never merged. These are
//! pure functions over `serde_json::Value`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::errors::GatewayError;
use crate::models::models::VideoDetails;
use crate::upstream::models::UpstreamReply;

/// Keys probed for each normalized field of the wrapped shape (`{code, data}`).
pub const WRAPPED_VIDEO_URL: &[&str] = &["play", "wmplay", "hdplay"];
pub const WRAPPED_TITLE: &[&str] = &["title", "desc"];
pub const WRAPPED_THUMBNAIL: &[&str] = &["cover", "origin_cover", "dynamic_cover"];

/// Keys probed for each normalized field of the flat shape.
pub const FLAT_VIDEO_URL: &[&str] = &["video_url", "play"];
pub const FLAT_TITLE: &[&str] = &["title", "desc"];
pub const FLAT_THUMBNAIL: &[&str] = &["thumbnail", "cover", "origin_cover"];

/// Keys tried inside an `author` object.
pub const AUTHOR_OBJECT: &[&str] = &["unique_id", "nickname"];
/// Sibling key tried when `author` yields nothing.
pub const AUTHOR_FALLBACK: &str = "username";

pub const DEFAULT_TITLE: &str = "TikTok Video";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_NO_VIDEO: &str = "Invalid video URL or video not found";
pub const MISSING_DOWNLOAD_URL: &str =
    "The video was processed, but the API did not return a download URL.";

const SUBSCRIPTION_MARKER: &str = "not subscribed";
const BODY_PREVIEW_CHARS: usize = 200;

/// Interpret one upstream reply.
pub fn normalize(reply: &UpstreamReply) -> Result<VideoDetails, GatewayError> {
    if !reply.is_success() {
        let body = parse_error_body(&reply.body);
        return Err(classify_failure(reply.status, &reply.status_text, &body));
    }

    let body = parse_success_body(reply)?;
    normalize_body(&body)
}

/// Interpret an already parsed body that arrived with a 2xx status.
pub fn normalize_body(body: &Value) -> Result<VideoDetails, GatewayError> {
    let details = if let Some(data) = wrapped_data(body) {
        extract_wrapped(data)
    } else if has_flat_video(body) {
        extract_flat(body)
    } else {
        let message = string_field(body, "msg").unwrap_or_else(|| DEFAULT_NO_VIDEO.to_string());
        return Err(GatewayError::NoVideoFound(message));
    };

    if details.video_url.is_empty() {
        return Err(GatewayError::NoVideoFound(MISSING_DOWNLOAD_URL.to_string()));
    }
    Ok(details)
}

/// Map a non-2xx status (and its body, if any) onto the error taxonomy.
pub fn classify_failure(status: u16, status_text: &str, body: &Value) -> GatewayError {
    let message = string_field(body, "message").or_else(|| string_field(body, "msg"));

    match status {
        403 => {
            let not_subscribed = message
                .as_deref()
                .is_some_and(|m| m.to_ascii_lowercase().contains(SUBSCRIPTION_MARKER));
            if not_subscribed {
                GatewayError::Subscription
            } else {
                GatewayError::InvalidCredential
            }
        }
        429 => GatewayError::RateLimit,
        _ => {
            let message = message
                .or_else(|| Some(status_text.to_string()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| format!("HTTP {status}"));
            GatewayError::Upstream { status, message }
        }
    }
}

fn parse_success_body(reply: &UpstreamReply) -> Result<Value, GatewayError> {
    serde_json::from_str(&reply.body).map_err(|e| {
        warn!(
            "Upstream did not return valid JSON (status {}): {e}; body starts with {:?}",
            reply.status,
            preview(&reply.body)
        );
        GatewayError::UpstreamMalformedResponse {
            status: reply.status,
        }
    })
}

/// Error bodies are best effort: anything unparseable becomes `{}`.
fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn preview(text: &str) -> String {
    text.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// `data` of the wrapped shape, only when `code == 0`.
fn wrapped_data(body: &Value) -> Option<&Value> {
    let code_is_zero = body.get("code").and_then(Value::as_f64) == Some(0.0);
    if !code_is_zero {
        return None;
    }
    body.get("data").filter(|d| d.is_object())
}

fn has_flat_video(body: &Value) -> bool {
    FLAT_VIDEO_URL
        .iter()
        .any(|key| body.get(*key).is_some_and(is_truthy))
}

pub fn extract_wrapped(data: &Value) -> VideoDetails {
    VideoDetails {
        video_url: first_string(data, WRAPPED_VIDEO_URL).unwrap_or_default(),
        title: first_text(data, WRAPPED_TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: author_of(data),
        duration: data.get("duration").map(coerce_duration).unwrap_or(0.0),
        thumbnail: first_string(data, WRAPPED_THUMBNAIL).unwrap_or_default(),
    }
}

pub fn extract_flat(body: &Value) -> VideoDetails {
    VideoDetails {
        video_url: first_string(body, FLAT_VIDEO_URL).unwrap_or_default(),
        title: first_text(body, FLAT_TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: author_of(body),
        duration: body.get("duration").map(coerce_duration).unwrap_or(0.0),
        thumbnail: first_string(body, FLAT_THUMBNAIL).unwrap_or_default(),
    }
}

/// `author` as an object (`unique_id`, then `nickname`) or a plain string,
/// then the sibling `username`, then the default.
fn author_of(obj: &Value) -> String {
    let from_author = obj.get("author").and_then(|author| match author {
        Value::Object(_) => first_text(author, AUTHOR_OBJECT),
        other => text_of(other),
    });

    from_author
        .or_else(|| obj.get(AUTHOR_FALLBACK).and_then(text_of))
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
}

/// First key holding a non-empty string.
fn first_string(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string_field(obj, key))
}

/// First key holding a non-empty string or a non-zero number (rendered as text).
fn first_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(text_of))
}

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if is_truthy(value) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric coercion: numbers, numeric strings (decimal, exponent, or
/// `0x`/`0o`/`0b` prefixed) and booleans; anything else is 0.
/// Negative or non-finite results are clamped to 0.
pub fn coerce_duration(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                parse_numeric_text(trimmed).unwrap_or(0.0)
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };

    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            // Signs are not allowed after a radix prefix.
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }
    text.parse::<f64>().ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
