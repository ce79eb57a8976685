use url::Url;

use crate::config::SecurityConfig;

/// Why a URL may not be used as a redirect target, or `None` if it may.
///
/// Parse failures count as rejections; this never panics on hostile input.
pub fn rejection_reason(url_str: &str, security: &SecurityConfig) -> Option<&'static str> {
    // The parser silently drops tab, CR and LF; the raw string is what ends up
    // in the `Location` header.
    if url_str.chars().any(char::is_control) {
        return Some("control characters");
    }

    let url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return Some("unparseable URL"),
    };

    if url.scheme().is_empty() {
        return Some("missing scheme");
    }

    if !security
        .allowed_schemes
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(url.scheme()))
    {
        return Some("scheme not allowed");
    }

    // The parser repairs `https:example.com`, `https:///example.com` and
    // `https:\\example.com` into a host; only an explicit `//` authority counts.
    let has_authority = url_str
        .split_once(':')
        .and_then(|(_, rest)| rest.strip_prefix("//"))
        .is_some_and(|authority| !authority.is_empty() && !authority.starts_with(['/', '\\']));
    if !has_authority || url.host_str().map_or(true, str::is_empty) {
        return Some("missing host");
    }

    let lowered = url_str.to_lowercase();
    if security
        .blocked_patterns
        .iter()
        .any(|pattern| lowered.contains(&pattern.to_lowercase()))
    {
        return Some("blocked pattern");
    }

    if url_str.chars().count() > security.max_url_length {
        return Some("too long");
    }

    None
}

/// Validates that a URL is safe to redirect to: allowed scheme, a host, no
/// control characters or blocked scheme patterns, and within the length limit.
pub fn validate_url(url_str: &str, security: &SecurityConfig) -> bool {
    rejection_reason(url_str, security).is_none()
}

/// Ensures the URL carries an http(s) scheme, defaulting to https.
pub fn sanitize_url(url_str: &str) -> String {
    if url_str.starts_with("http://") || url_str.starts_with("https://") {
        url_str.to_string()
    } else {
        format!("https://{}", url_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig::default()
    }

    #[test]
    fn test_validate_url() {
        // Valid URLs
        assert!(validate_url("https://example.com", &security()));
        assert!(validate_url("http://example.com/path?query=value#frag", &security()));
        assert!(validate_url("HTTPS://EXAMPLE.COM/Page", &security()));

        // Invalid URLs
        assert!(!validate_url("not-a-url", &security()));
        assert!(!validate_url("", &security()));
        assert!(!validate_url("ftp://example.com", &security())); // Not http/https
    }

    #[test]
    fn test_rejects_script_schemes() {
        assert!(!validate_url("javascript:alert(1)", &security()));
        assert!(!validate_url("data:text/html,<script>", &security()));
        assert!(!validate_url("vbscript:msgbox", &security()));
    }

    #[test]
    fn test_rejects_blocked_pattern_anywhere() {
        assert!(!validate_url(
            "https://example.com/?next=JavaScript:alert(1)",
            &security()
        ));
        assert!(!validate_url("https://example.com/file:///etc/passwd", &security()));
        assert_eq!(
            rejection_reason("https://example.com/#about:blank", &security()),
            Some("blocked pattern")
        );
    }

    #[test]
    fn test_rejects_missing_host() {
        assert!(!validate_url("https://", &security()));
        assert!(!validate_url("http:///path", &security()));
        assert!(!validate_url("https:example.com", &security()));
        assert!(!validate_url("https:\\\\evil.example", &security()));
    }

    #[test]
    fn test_rejects_control_characters() {
        for url in [
            "https://exa\nmple.com/",
            "https://example.com/\r\nSet-Cookie:x",
            "https://example.com/\tpage",
            "https://example.com/\u{7f}",
        ] {
            assert_eq!(
                rejection_reason(url, &security()),
                Some("control characters"),
                "{:?}",
                url
            );
        }
    }

    #[test]
    fn test_length_limit() {
        let too_long = format!("https://{}", "a".repeat(9000));
        assert!(!validate_url(&too_long, &security()));

        let path = "a".repeat(8192 - "https://example.com/".len());
        let exactly_max = format!("https://example.com/{}", path);
        assert_eq!(exactly_max.len(), 8192);
        assert!(validate_url(&exactly_max, &security()));
        assert!(!validate_url(&format!("{}b", exactly_max), &security()));
    }

    #[test]
    fn test_custom_security_config() {
        let strict = SecurityConfig {
            allowed_schemes: vec!["https".into()],
            blocked_patterns: vec!["evil".into()],
            max_url_length: 30,
        };
        assert!(validate_url("https://example.com", &strict));
        assert!(!validate_url("http://example.com", &strict));
        assert!(!validate_url("https://EVIL.example.com", &strict));
        assert!(!validate_url("https://example.com/a/long/path", &strict));
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("example.com"), "https://example.com");
        assert_eq!(sanitize_url("http://example.com"), "http://example.com");
        assert_eq!(sanitize_url("https://example.com/x"), "https://example.com/x");
        assert_eq!(sanitize_url("ftp://example.com"), "https://ftp://example.com");
    }
}
