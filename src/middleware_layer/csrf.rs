use axum::{
    body::Body,
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{crypto::csrf::tokens_match, error::AppError};

/// Name of the cookie carrying the CSRF token (readable by the page).
pub const CSRF_COOKIE: &str = "csrf_token";
/// Header the page echoes the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// A middleware that verifies the CSRF token.
///
/// Double-submit: the header must equal the cookie. Both are compared in
/// constant time; nothing is stored server-side.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`.
pub async fn verify_csrf(cookies: Cookies, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        tracing::debug!("✅ CSRF exemption: {} request", req.method());
        return next.run(req).await;
    }

    let Some(cookie_token) = cookies.get(CSRF_COOKIE).map(|c| c.value().to_string()) else {
        tracing::warn!("❌ CSRF: {} cookie not found", CSRF_COOKIE);
        return AppError::Forbidden("Missing CSRF token cookie".to_string()).into_response();
    };

    let header_token = match req.headers().get(CSRF_HEADER).map(|v| v.to_str()) {
        Some(Ok(token)) => token.to_string(),
        Some(Err(_)) => {
            tracing::warn!("❌ CSRF: header is not valid text");
            return AppError::Forbidden("Invalid CSRF token format".to_string()).into_response();
        }
        None => {
            tracing::warn!("❌ CSRF: {} header not found", CSRF_HEADER);
            return AppError::Forbidden("Missing CSRF token header".to_string()).into_response();
        }
    };

    if !tokens_match(&cookie_token, &header_token) {
        tracing::warn!("❌ CSRF: tokens do not match");
        return AppError::Forbidden("CSRF token mismatch".to_string()).into_response();
    }

    tracing::debug!("✅ CSRF token valid");
    next.run(req).await
}
