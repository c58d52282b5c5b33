//! Domain string normalization
//!
//! Every domain is stored and compared in one canonical form: scheme,
//! leading `www.`, path and trailing slash stripped, lowercased. The same
//! site must land on the same quota slot no matter how the URL was typed.

use crate::error::{AppError, ErrorCode};

/// Normalize a user- or plugin-supplied domain to its canonical form.
///
/// `"HTTPS://WWW.Example.com/"` and `"example.com"` both normalize to
/// `"example.com"`.
pub fn normalize_domain(raw: &str) -> Result<String, AppError> {
    let mut s = raw.trim().to_lowercase();

    // Strip scheme
    if let Some(rest) = s.strip_prefix("https://") {
        s = rest.to_string();
    } else if let Some(rest) = s.strip_prefix("http://") {
        s = rest.to_string();
    }

    // Host only: drop path, query, fragment
    if let Some(idx) = s.find(['/', '?', '#']) {
        s.truncate(idx);
    }

    // Strip credentials and port
    if let Some(idx) = s.rfind('@') {
        s = s[idx + 1..].to_string();
    }
    if let Some(idx) = s.find(':') {
        s.truncate(idx);
    }

    // Strip leading www.
    if let Some(rest) = s.strip_prefix("www.") {
        s = rest.to_string();
    }

    let s = s.trim_matches('.').to_string();

    if s.is_empty() || !s.contains('.') {
        return Err(AppError::new(ErrorCode::InvalidDomain).with_detail("domain", raw));
    }
    if !s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return Err(AppError::new(ErrorCode::InvalidDomain).with_detail("domain", raw));
    }

    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_www_slash_case_insensitive() {
        assert_eq!(
            normalize_domain("HTTPS://WWW.Example.com/").unwrap(),
            normalize_domain("example.com").unwrap()
        );
        assert_eq!(normalize_domain("http://foo.de").unwrap(), "foo.de");
        assert_eq!(normalize_domain("www.foo.de/").unwrap(), "foo.de");
    }

    #[test]
    fn test_path_and_port_stripped() {
        assert_eq!(
            normalize_domain("https://shop.example.de/kontakt?x=1").unwrap(),
            "shop.example.de"
        );
        assert_eq!(normalize_domain("example.com:8080").unwrap(), "example.com");
    }

    #[test]
    fn test_subdomains_are_distinct() {
        assert_ne!(
            normalize_domain("blog.example.com").unwrap(),
            normalize_domain("example.com").unwrap()
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("https://").is_err());
        assert!(normalize_domain("localhost").is_err());
        assert!(normalize_domain("exa mple.com").is_err());
    }
}
