//! Secret Redaction
//!
//! Upstream errors carry the full request URL, and the weather, price and
//! Wolfram|Alpha APIs take their keys as query parameters. Strings are
//! scrubbed with this before they are logged.

use regex::Regex;
use std::sync::LazyLock;

static QUERY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(appid|apikey|api_key|securitytoken|token)=[^&\s)]+").unwrap()
});
static URL_CREDENTIALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z][a-z0-9+.-]*://[^:/@\s]*):[^@/\s]+@").unwrap());

/// Redacts API keys in query strings and passwords in connection URLs.
pub fn redact_secrets(input: &str) -> String {
    let redacted = QUERY_KEY_RE.replace_all(input, "$1=[REDACTED]");
    URL_CREDENTIALS_RE
        .replace_all(&redacted, "$1:[REDACTED]@")
        .into_owned()
}
