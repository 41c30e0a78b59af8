//! Token cookies: reading the `Cookie` header and building `Set-Cookie` values

use super::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use axum::http::{header, HeaderMap};

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Find a cookie value by name across all `Cookie` headers
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn build(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax", name, value, max_age);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn access_cookie(token: &str, secure: bool) -> String {
    build(ACCESS_COOKIE_NAME, token, ACCESS_TOKEN_TTL_SECS, secure)
}

pub fn refresh_cookie(token: &str, secure: bool) -> String {
    build(REFRESH_COOKIE_NAME, token, REFRESH_TOKEN_TTL_SECS, secure)
}

/// Empty value with `Max-Age=0` so the browser drops the cookie
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; accessToken=abc.def.ghi".parse().unwrap());

        assert_eq!(get_cookie(&headers, ACCESS_COOKIE_NAME), Some("abc.def.ghi".to_string()));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "refreshToken=".parse().unwrap());

        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = access_cookie("tok", false);
        assert_eq!(cookie, "accessToken=tok; HttpOnly; Path=/; Max-Age=900; SameSite=Lax");

        let cookie = refresh_cookie("tok", true);
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(cookie.ends_with("; Secure"));

        let cleared = clear_cookie(ACCESS_COOKIE_NAME, false);
        assert!(cleared.starts_with("accessToken=;"));
        assert!(cleared.contains("Max-Age=0"));
    }
}
