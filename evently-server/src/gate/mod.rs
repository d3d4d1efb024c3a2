//! Route gate
//!
//! Classifies every inbound path before any handler logic runs, and enforces
//! the result: a non-public path with no authenticated identity is rejected
//! with 401 right here - the handler never executes.
//!
//! Pipeline, per request:
//! 1. bypass check - static assets and framework internals skip gating
//!    entirely; `/api` and `/trpc` never bypass, whatever their extension;
//! 2. authenticate the bearer token if one is present, and attach the
//!    verified identity to the request so public handlers can personalize;
//! 3. classify the path against the public pattern list; protected +
//!    anonymous means 401.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::error::ApiError;
use crate::state::AppState;

mod pattern;

pub use pattern::{PatternError, RoutePattern};

/// Paths reachable without a session, as patterns.
///
/// `/` and the event-detail page are the anonymous browsing surface;
/// the webhook and upload callbacks are called by machines that have no
/// session; `/health` is for probes.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/events/:id",
    "/api/webhook/clerk",
    "/api/uploadthing/*",
    "/health",
];

/// Extensions served as static assets. Requests for these bypass the gate.
/// Note `js` is here and `json` is not: `.json` is data, not an asset.
const ASSET_EXTENSIONS: &[&str] = &[
    "html",
    "htm",
    "css",
    "js",
    "jpg",
    "jpeg",
    "webp",
    "png",
    "gif",
    "svg",
    "ttf",
    "woff",
    "woff2",
    "ico",
    "csv",
    "doc",
    "docx",
    "xls",
    "xlsx",
    "zip",
    "webmanifest",
];

/// The gate's classification table. Built once at startup, immutable after.
#[derive(Debug, Clone)]
pub struct RouteGate {
    patterns: Vec<RoutePattern>,
}

impl RouteGate {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, PatternError> {
        let patterns = patterns
            .into_iter()
            .map(RoutePattern::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Gate over [`PUBLIC_ROUTES`].
    pub fn standard() -> Self {
        Self::new(PUBLIC_ROUTES.iter().copied()).expect("default route patterns are valid")
    }

    /// True iff the path matches any public pattern. Union semantics: order
    /// never matters.
    pub fn is_public(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.patterns.iter()
    }
}

/// True when the path skips gating entirely: framework internals and static
/// assets. `/api` and `/trpc` are always gated, extensions notwithstanding.
pub fn bypasses(path: &str) -> bool {
    if under(path, "/api") || under(path, "/trpc") {
        return false;
    }
    if under(path, "/_next") {
        return true;
    }
    is_asset_request(path)
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_asset_request(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let Some((_, extension)) = name.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    ASSET_EXTENSIONS.contains(&extension.as_str())
}

/// Axum middleware enforcing the gate.
pub async fn enforce(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    if bypasses(&path) {
        return next.run(req).await;
    }

    let identity = match bearer_token(req.headers()) {
        Some(token) => match state.identity().verify(token).await {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::debug!(error = %err, "session token rejected");
                None
            }
        },
        None => None,
    };

    match identity {
        Some(identity) => {
            req.extensions_mut().insert(identity);
        }
        None if !state.gate().is_public(&path) => {
            tracing::debug!(path = %path, "unauthenticated request to protected route");
            return ApiError::Unauthorized.into_response();
        }
        None => {}
    }

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let gate = RouteGate::standard();

        assert!(gate.is_public("/"));
        assert!(gate.is_public("/events/abc123"));
        assert!(!gate.is_public("/events/abc123/edit"));
        assert!(gate.is_public("/api/webhook/clerk"));
        assert!(gate.is_public("/api/uploadthing"));
        assert!(gate.is_public("/api/uploadthing/callback"));
        assert!(gate.is_public("/health"));

        assert!(!gate.is_public("/profile"));
        assert!(!gate.is_public("/api/orders"));
        assert!(!gate.is_public("/events"));
    }

    #[test]
    fn classification_is_order_independent() {
        let forward = RouteGate::new(["/", "/events/:id"]).expect("valid");
        let reverse = RouteGate::new(["/events/:id", "/"]).expect("valid");

        for path in ["/", "/events/x", "/profile"] {
            assert_eq!(forward.is_public(path), reverse.is_public(path));
        }
    }

    #[test]
    fn assets_and_internals_bypass() {
        assert!(bypasses("/logo.png"));
        assert!(bypasses("/fonts/Inter.woff2"));
        assert!(bypasses("/index.html"));
        assert!(bypasses("/_next/static/chunk.css"));
        assert!(bypasses("/_next"));
    }

    #[test]
    fn pages_and_data_do_not_bypass() {
        assert!(!bypasses("/"));
        assert!(!bypasses("/profile"));
        assert!(!bypasses("/events/abc123"));
        // .json is data, not an asset
        assert!(!bypasses("/data.json"));
        // version-looking segments are not extensions we know
        assert!(!bypasses("/events/v1.2"));
    }

    #[test]
    fn api_and_trpc_never_bypass() {
        assert!(!bypasses("/api/orders"));
        assert!(!bypasses("/api/export.csv"));
        assert!(!bypasses("/trpc/events.list"));
        // but a path merely starting with the letters 'api' is not /api
        assert!(bypasses("/apidocs/guide.html"));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
