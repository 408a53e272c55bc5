use axum::http::HeaderMap;

/// Name of the cookie carrying the session JWT.
pub const SESSION_COOKIE: &str = "token";

/// Pulls the session token out of the request's `Cookie` header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    for cookie in cookies.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Builds the `Set-Cookie` value for a freshly issued session token.
///
/// Always `HttpOnly; Path=/`. Production gets `Secure; SameSite=None`
/// (the frontend is served from another origin); everything else gets
/// `SameSite=Strict` so local setups work without TLS.
pub fn session_cookie(production: bool, token: &str, max_age_secs: i64) -> String {
    if production {
        format!(
            "{}={}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={}",
            SESSION_COOKIE, token, max_age_secs
        )
    } else {
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            SESSION_COOKIE, token, max_age_secs
        )
    }
}

/// Builds the `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie(production: bool) -> String {
    session_cookie(production, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_token_extracted_from_cookie_header() {
        let headers = headers_with_cookie("token=abc.def.ghi");
        assert_eq!(token_from_headers(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_token_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc; lang=en");
        assert_eq!(token_from_headers(&headers), Some("abc".to_string()));
    }

    #[test]
    fn test_missing_or_empty_token_is_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
        assert_eq!(token_from_headers(&headers_with_cookie("theme=dark")), None);
        // A cleared cookie must not count as a credential.
        assert_eq!(token_from_headers(&headers_with_cookie("token=")), None);
    }

    #[test]
    fn test_cookie_attributes_follow_runtime_mode() {
        let prod = session_cookie(true, "t", 7200);
        assert!(prod.contains("Secure"));
        assert!(prod.contains("SameSite=None"));
        assert!(prod.contains("HttpOnly"));

        let dev = session_cookie(false, "t", 7200);
        assert!(!dev.contains("Secure"));
        assert!(dev.contains("SameSite=Strict"));
        assert!(dev.contains("HttpOnly"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cleared = clear_session_cookie(false);
        assert!(cleared.starts_with("token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}
