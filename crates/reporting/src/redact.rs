//! Removal of credentials from text that is about to be published.
//!
//! Only exact occurrences are replaced. A token that was split across lines,
//! encoded, or otherwise transformed by the logging process is not detected.

/// Placeholder written in place of a redacted secret.
pub const REDACTION_PLACEHOLDER: &str = "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

/// Replaces every occurrence of `secret` in `text` with
/// [`REDACTION_PLACEHOLDER`].
///
/// An empty `secret` leaves `text` unchanged.
pub fn redact_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() || !text.contains(secret) {
        return text.to_string();
    }
    tracing::warn!("Log output contained the access token; redacting it");
    text.replace(secret, REDACTION_PLACEHOLDER)
}
