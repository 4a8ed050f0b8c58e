use once_cell::sync::Lazy;
use regex::Regex;
use subtle::ConstantTimeEq;

// Lowercase only: "A@B.COM" does not match.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email regex is valid")
});

/// True iff `email` looks like `local@domain.tld` with a 2-4 letter suffix.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Exact match against the configured admin key, compared in constant time.
/// An empty configured key never matches.
pub fn validate_admin_key(provided: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    provided.as_bytes().ct_eq(configured.as_bytes()).into()
}
