//! Application state shared across handlers

use std::sync::Arc;

use evently_core::identity::IdentityProvider;

use crate::db::DbCache;
use crate::gate::RouteGate;

/// Shared application state. Cheap to clone; everything lives behind one Arc.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: DbCache,
    identity: Arc<dyn IdentityProvider>,
    gate: RouteGate,
    webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(
        db: DbCache,
        identity: Arc<dyn IdentityProvider>,
        gate: RouteGate,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                identity,
                gate,
                webhook_secret,
            }),
        }
    }

    pub fn db(&self) -> &DbCache {
        &self.inner.db
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    pub fn gate(&self) -> &RouteGate {
        &self.inner.gate
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.inner.webhook_secret.as_deref()
    }
}
