//! Log Redaction Layer
//!
//! Scrubs API keys and access tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static GOOGLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AIza[0-9A-Za-z\-_]{35}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&](?:key|api_key)=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = GOOGLE_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    KEY_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "upstream said Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 for sk-abcdefghijklmnopqrstuvwxyz0123456789";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("sk-abcdefghijklmnopqrstuvwxyz0123456789"));
    }

    #[test]
    fn redacts_google_keys_and_query_params() {
        let key = format!("AIza{}", "x".repeat(35));
        let raw = format!("GET /v1beta/models/m:generateContent?key={key}&alt=json failed");
        let clean = redact_sensitive_data(&raw);
        assert!(!clean.contains(&key));
        assert!(clean.contains("?key=[REDACTED_TOKEN]&alt=json"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(
            redact_sensitive_data("provider returned HTTP 503"),
            "provider returned HTTP 503"
        );
    }
}
