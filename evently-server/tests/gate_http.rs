//! Router-level tests of the auth gate
//!
//! No database anywhere: the stub connector counts attempts and always
//! fails, which also exercises the fail-fast and degraded paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use evently_core::identity::{ExternalIdentity, ExternalUserId, IdentityError, IdentityProvider};
use evently_server::db::{Connect, ConnectionCache, DbError};
use evently_server::gate::RouteGate;
use evently_server::http::server::build_router;
use evently_server::state::AppState;

const VALID_TOKEN: &str = "valid-session-token";

#[derive(Default)]
struct NoDb {
    attempts: AtomicUsize,
}

#[async_trait]
impl Connect<PgPool> for NoDb {
    async fn connect(&self, _url: &str) -> Result<PgPool, DbError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DbError::Connection(Arc::new(sqlx::Error::PoolTimedOut)))
    }
}

struct StaticTokens;

#[async_trait]
impl IdentityProvider for StaticTokens {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        if token == VALID_TOKEN {
            Ok(ExternalIdentity {
                id: ExternalUserId::new("user_123"),
                email: "ada@example.com".to_string(),
                first_name: Some("Ada".to_string()),
                last_name: None,
            })
        } else {
            Err(IdentityError::InvalidToken)
        }
    }
}

fn app(database_url: Option<&str>, webhook_secret: Option<&str>) -> (Router, Arc<NoDb>) {
    let connector = Arc::new(NoDb::default());
    let cache = ConnectionCache::new(database_url.map(str::to_owned), connector.clone());
    let state = AppState::new(
        cache,
        Arc::new(StaticTokens),
        RouteGate::standard(),
        webhook_secret.map(str::to_owned),
    );
    (build_router(state, false), connector)
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("infallible service")
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request builds")
}

fn get_with_token(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn health_is_reachable_anonymously() {
    let (router, connector) = app(Some("postgres://stub"), None);

    let response = send(&router, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn profile_rejects_anonymous_requests() {
    let (router, connector) = app(Some("postgres://stub"), None);

    let response = send(&router, get("/profile")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["error"], "unauthorized");
    // The handler never ran, so the database was never consulted.
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn profile_rejects_bad_tokens() {
    let (router, _) = app(Some("postgres://stub"), None);

    let response = send(&router, get_with_token("/profile", "forged")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_profile_reaches_the_database() {
    let (router, connector) = app(Some("postgres://stub"), None);

    let response = send(&router, get_with_token("/profile", VALID_TOKEN)).await;
    // The gate let the request through; the stub connector then failed the
    // connection attempt, which surfaces as 503.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_database_url_fails_before_any_attempt() {
    let (router, connector) = app(None, None);

    let response = send(&router, get_with_token("/profile", VALID_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["error"], "service_unavailable");
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn asset_requests_bypass_the_gate() {
    let (router, _) = app(Some("postgres://stub"), None);

    // No such route, but the point is the gate let it through: 404, not 401.
    let response = send(&router, get("/logo.png")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_detail_validates_the_id_before_touching_storage() {
    let (router, connector) = app(Some("postgres://stub"), None);

    let response = send(&router, get("/events/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn webhook_rejects_a_wrong_secret() {
    let (router, connector) = app(Some("postgres://stub"), Some("s3cret"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhook/clerk")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-secret", "wrong")
        .body(Body::from(
            serde_json::json!({"type": "user.deleted", "data": {"id": "user_1"}}).to_string(),
        ))
        .expect("request builds");

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn webhook_acknowledges_unhandled_event_types() {
    let (router, connector) = app(Some("postgres://stub"), Some("s3cret"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhook/clerk")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-secret", "s3cret")
        .body(Body::from(
            serde_json::json!({"type": "session.created", "data": {"id": "sess_1"}}).to_string(),
        ))
        .expect("request builds");

    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["received"], true);
    // Unhandled types are acknowledged without touching storage.
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}
