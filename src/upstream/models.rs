/// What came back from the provider, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    /// HTTP status code
    pub status: u16,

    /// Canonical reason phrase for `status` ("Not Found"), empty if unknown
    pub status_text: String,

    /// Raw body text, parsed later
    pub body: String,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
