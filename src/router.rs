use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Largest request body accepted.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    pooled_sessions: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        pooled_sessions: state.sge.pool().len(),
    })
}

/// Builds the HTTP API.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`:
/// rate limiting keys on the peer address.
///
/// # Arguments
///
/// * `state` - The application state.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
            header::HeaderName::from_static(middleware_layer::csrf::CSRF_HEADER),
        ])
        .allow_credentials(true)
        .expose_headers([header::HeaderName::from_static(
            middleware_layer::csrf::CSRF_HEADER,
        )])
        .max_age(Duration::from_secs(86400));

    let protected_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(100)
            .burst_size(60)
            .use_headers()
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let public_routes = Router::new()
        .route("/api/health", get(health))
        .with_state(state.clone());

    let login_routes = Router::new()
        .route("/api/sge/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::rate_limit_login,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/sge/logout", post(handlers::auth::logout))
        .route("/api/sge/session", get(handlers::auth::session_status))
        .route("/api/sge/classes", get(handlers::attendance::list_classes))
        .route(
            "/api/sge/classes/{class_id}/subjects",
            get(handlers::attendance::list_subjects),
        )
        .route(
            "/api/sge/classes/{class_id}/roster",
            get(handlers::attendance::list_roster),
        )
        .route(
            "/api/sge/attendance",
            get(handlers::attendance::attendance_detail)
                .post(handlers::attendance::submit_attendance)
                .delete(handlers::attendance::delete_attendance),
        )
        .route(
            "/api/sge/attendance/records/{record_id}",
            put(handlers::attendance::edit_presence),
        )
        .route(
            "/api/sge/content",
            get(handlers::content::list_contents).post(handlers::content::create_content),
        )
        .route(
            "/api/sge/content/{content_id}",
            put(handlers::content::edit_content).delete(handlers::content::delete_content),
        )
        .route(
            "/api/sge/incidents",
            get(handlers::incidents::list_incidents).post(handlers::incidents::save_incident),
        )
        .route(
            "/api/sge/incidents/{incident_id}",
            get(handlers::incidents::get_incident),
        )
        .route(
            "/api/sge/incidents/{incident_id}/status",
            put(handlers::incidents::set_incident_status),
        )
        .route("/api/sge/reports/daily", get(handlers::reports::daily_report))
        .route(
            "/api/sge/reports/monthly",
            get(handlers::reports::monthly_report),
        )
        .route("/api/sge/reports/proxy", get(handlers::reports::proxy_report))
        .layer(tower_governor::GovernorLayer::new(
            protected_governor_conf.clone(),
        ))
        .route_layer(from_fn(middleware_layer::csrf::verify_csrf))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_credentials,
        ))
        .with_state(state.clone());

    Ok(Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::from_lookup(|key| match key {
            "SGE_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
            _ => None,
        })
        .unwrap();
        build_router(AppState::new(&config).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_an_empty_pool() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok","pooled_sessions":0}"#);
    }

    #[tokio::test]
    async fn protected_routes_need_the_credential_cookie() {
        for (method, uri) in [
            ("GET", "/api/sge/classes"),
            ("GET", "/api/sge/incidents/7"),
            ("POST", "/api/sge/logout"),
        ] {
            let response = app()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[test]
    fn invalid_cors_origin_is_a_startup_error() {
        let config = Config::from_lookup(|key| match key {
            "SGE_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
            "CORS_ORIGIN" => Some("bad\norigin".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(build_router(AppState::new(&config).unwrap()).is_err());
    }
}
