use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    crypto::cipher::EncryptedSecret,
    error::AppError,
    state::AppState,
    validation::auth::{mask_user, normalize_user},
};

/// Name of the cookie holding the sealed SGE credentials.
pub const CREDENTIALS_COOKIE: &str = "sge_credentials";

/// A middleware that requires a valid credential cookie to be present.
///
/// The cookie is opened with the credential cipher and the `Credentials` are
/// placed in the request extensions. A missing cookie, a tampered one or one
/// sealed under another key is answered with 401.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`.
pub async fn require_credentials(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking SGE credentials...");

    let Some(cookie) = cookies.get(CREDENTIALS_COOKIE) else {
        tracing::debug!("❌ No {} cookie found", CREDENTIALS_COOKIE);
        return AppError::Unauthorized.into_response();
    };

    let sealed = EncryptedSecret::new(cookie.value());
    let credentials = match state.cipher.decrypt_credentials(&sealed) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!("❌ Credential cookie rejected");
            return e.into_response();
        }
    };

    match normalize_user(&credentials.user) {
        Ok(user) => tracing::debug!("✅ Credentials opened for {}", mask_user(&user)),
        Err(e) => return e.into_response(),
    }

    request.extensions_mut().insert(credentials);

    next.run(request).await
}
