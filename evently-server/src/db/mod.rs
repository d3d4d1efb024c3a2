//! Database layer
//!
//! [`ConnectionCache`] owns the single process-wide handle to Postgres. It
//! is constructed once at startup, handed to [`crate::state::AppState`], and
//! reached only through dependency injection - there is no ambient global.
//!
//! The contract, regardless of caller concurrency:
//! - once a handle is live, `get()` clones it with no I/O;
//! - while an attempt is in flight, every caller joins that attempt instead
//!   of starting another;
//! - a failed attempt delivers the same error to all of its waiters and
//!   leaves the cache retryable.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;

pub mod migrations;
pub mod repos;

/// Maximum connections held by the production pool.
const MAX_CONNECTIONS: u32 = 10;

/// Cache holding the production Postgres handle.
pub type DbCache = ConnectionCache<PgPool>;

#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// The database URL is missing or blank. Fatal until an operator fixes
    /// the environment; surfaced before any network attempt.
    #[error("DATABASE_URL is not configured")]
    Configuration,

    /// The connection attempt itself failed. Shared verbatim with every
    /// caller that joined the attempt; later calls may retry.
    #[error("database connection failed: {0}")]
    Connection(Arc<sqlx::Error>),
}

/// The seam between the cache and the network. Production uses
/// [`PgConnector`]; tests inject counting or failing stand-ins.
#[async_trait]
pub trait Connect<H>: Send + Sync {
    async fn connect(&self, url: &str) -> Result<H, DbError>;
}

/// Connects a real Postgres pool with an explicit connection limit.
pub struct PgConnector;

#[async_trait]
impl Connect<PgPool> for PgConnector {
    async fn connect(&self, url: &str) -> Result<PgPool, DbError> {
        PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(url)
            .await
            .map_err(|err| DbError::Connection(Arc::new(err)))
    }
}

type PendingAttempt<H> = Shared<BoxFuture<'static, Result<H, DbError>>>;

struct CacheState<H> {
    /// Resolved handle, reused by every later call.
    live: Option<H>,
    /// In-flight attempt that new callers join instead of duplicating.
    pending: Option<PendingAttempt<H>>,
}

/// Process-wide connection cache: at most one live handle, at most one
/// in-flight attempt.
pub struct ConnectionCache<H>
where
    H: Clone + Send + Sync + 'static,
{
    database_url: Option<String>,
    connector: Arc<dyn Connect<H>>,
    state: Mutex<CacheState<H>>,
}

impl ConnectionCache<PgPool> {
    /// Production cache over [`PgConnector`].
    pub fn postgres(database_url: impl Into<String>) -> Self {
        Self::new(Some(database_url.into()), Arc::new(PgConnector))
    }
}

impl<H> ConnectionCache<H>
where
    H: Clone + Send + Sync + 'static,
{
    pub fn new(database_url: Option<String>, connector: Arc<dyn Connect<H>>) -> Self {
        Self {
            database_url,
            connector,
            state: Mutex::new(CacheState {
                live: None,
                pending: None,
            }),
        }
    }

    /// Return the cached handle, joining or starting a connection attempt as
    /// needed.
    ///
    /// # Errors
    ///
    /// [`DbError::Configuration`] when no database URL is configured - checked
    /// before the connector is consulted, so no network I/O happens.
    /// [`DbError::Connection`] when the attempt this caller joined failed.
    pub async fn get(&self) -> Result<H, DbError> {
        let attempt = {
            let mut state = self.state.lock().await;
            if let Some(handle) = &state.live {
                return Ok(handle.clone());
            }

            let url = self
                .database_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or(DbError::Configuration)?;

            match &state.pending {
                Some(pending) => pending.clone(),
                None => {
                    let connector = Arc::clone(&self.connector);
                    let url = url.to_owned();
                    let attempt = async move { connector.connect(&url).await }
                        .boxed()
                        .shared();
                    state.pending = Some(attempt.clone());
                    attempt
                }
            }
        };
        // Lock released: waiting must not block unrelated callers.

        match attempt.clone().await {
            Ok(handle) => {
                let mut state = self.state.lock().await;
                if state.live.is_none() {
                    state.live = Some(handle.clone());
                }
                self.clear_attempt(&mut state, &attempt);
                Ok(handle)
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                self.clear_attempt(&mut state, &attempt);
                Err(err)
            }
        }
    }

    /// Clear the pending slot, but only if it still holds this attempt - a
    /// waiter waking up late must not clobber a newer retry.
    fn clear_attempt(&self, state: &mut CacheState<H>, attempt: &PendingAttempt<H>) {
        if state
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ptr_eq(attempt))
        {
            state.pending = None;
        }
    }
}
