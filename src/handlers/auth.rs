use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    crypto::csrf::generate_csrf_token,
    error::Result,
    middleware_layer::{auth::CREDENTIALS_COOKIE, csrf::{CSRF_COOKIE, CSRF_HEADER}},
    models::credentials::Credentials,
    state::AppState,
    validation::auth::{mask_user, normalize_user, validate_password},
};

/// The response payload for login and logout.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

/// The response payload for the session status.
#[derive(Serialize)]
pub struct SessionStatus {
    /// The signed-in user, masked.
    pub user: String,
    /// Whether a live SGE session is pooled for the user.
    pub session_cached: bool,
}

/// Creates a secure cookie with the given name, value, and max age.
fn create_secure_cookie(
    name: &'static str,
    value: String,
    max_age_hours: i64,
    http_only: bool,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);

    cookie.set_http_only(http_only);
    cookie.set_secure(secure);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::hours(max_age_hours));
    cookie.set_path("/");

    cookie
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookie
}

/// Handles SGE login.
///
/// Checks the credentials against SGE (which also warms the session pool),
/// then stores them sealed in an HttpOnly cookie and issues a CSRF token.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<Credentials>,
) -> Result<Response> {
    let user = normalize_user(&payload.user)?;
    validate_password(&payload.password)?;
    tracing::info!("🔐 Login attempt for {}", mask_user(&user));

    let credentials = Credentials::new(user.clone(), payload.password.clone());
    state.sge.pool().get_session(&credentials).await?;

    let sealed = state.cipher.encrypt_credentials(&credentials)?;
    cookies.add(create_secure_cookie(
        CREDENTIALS_COOKIE,
        sealed.into_string(),
        state.config.credential_cookie_hours,
        true,
        state.config.is_production,
    ));

    let csrf_token = generate_csrf_token();
    cookies.add(create_secure_cookie(
        CSRF_COOKIE,
        csrf_token.clone(),
        state.config.credential_cookie_hours,
        false,
        state.config.is_production,
    ));

    tracing::info!("✅ User logged in: {}", mask_user(&user));

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        csrf_token: Some(csrf_token.clone()),
    };

    Ok((StatusCode::OK, [(CSRF_HEADER, csrf_token)], Json(response)).into_response())
}

/// Handles logout: drops the pooled SGE session and clears the cookies.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    cookies: Cookies,
) -> Result<Response> {
    let user = normalize_user(&credentials.user)?;
    tracing::info!("👋 Logout for {}", mask_user(&user));

    state.sge.pool().invalidate_session(&user)?;

    cookies.remove(expired_cookie(CREDENTIALS_COOKIE));
    cookies.remove(expired_cookie(CSRF_COOKIE));

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
        csrf_token: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Reports who is signed in and whether their SGE session is pooled.
pub async fn session_status(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
) -> Result<Json<SessionStatus>> {
    let user = normalize_user(&credentials.user)?;

    Ok(Json(SessionStatus {
        user: mask_user(&user),
        session_cached: state.sge.pool().is_cached(&user),
    }))
}
