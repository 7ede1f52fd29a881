//! Double-submit CSRF helpers
//!
//! The backend sets a `csrf_token` cookie and expects the same value back in
//! the `X-CSRF-Token` header on every state-changing request.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Method;
use url::Url;
use voketag_core::CSRF_COOKIE;

/// POST, PUT, PATCH and DELETE carry the CSRF header
#[must_use]
pub fn is_mutation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Value of `csrf_token` in a `Cookie` header string
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == CSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// CSRF cookie the jar would send to `url`, if any
#[must_use]
pub fn token_from_jar(jar: &Jar, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    token_from_cookie_header(header.to_str().ok()?)
}
