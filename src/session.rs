//! Shared session state: the cached access token, its expiry, and the
//! authenticated principal.
//!
//! `SessionStore` guards the session with a `tokio::sync::RwLock` and
//! implements double-checked locking around refresh:
//!
//! 1. Callers check validity under the shared lock (`fresh_token`). In the
//!    common case the token is valid and no exclusive lock is taken.
//! 2. A caller that sees an expired or missing token calls `refresh`, which
//!    takes the exclusive lock and checks again. If another caller refreshed
//!    while this one waited, the new token is returned without a network call.
//! 3. Only the caller that still finds the session invalid runs the exchange,
//!    while holding the exclusive lock, and commits the whole `IssuedToken`.
//!
//! The exclusive lock is held across the exchange `.await`, which is why this
//! is an async lock rather than a blocking one. Dropping a `refresh` future
//! drops the guard, so a cancelled exchange releases waiting callers.

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// A token returned by one successful exchange.
///
/// The three fields are only ever replaced together.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Opaque credential, forwarded verbatim in the `Authorization` header.
    pub access_token: String,
    /// Instant after which the token must not be presented. Already includes
    /// the safety margin.
    pub expires_at: DateTime<Utc>,
    /// Identifier of the authenticated account.
    pub principal_id: i64,
}

impl IssuedToken {
    /// True when the token is non-empty and `now` is before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && now < self.expires_at
    }
}

// The token is a live credential; keep it out of logs.
impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("principal_id", &self.principal_id)
            .finish()
    }
}

/// Concurrency-safe holder of the current session.
///
/// `None` inside the lock means "never authenticated".
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<IssuedToken>>,
}

impl SessionStore {
    /// Creates an empty, unauthenticated store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current session, or `None` if no exchange has
    /// succeeded yet.
    pub async fn snapshot(&self) -> Option<IssuedToken> {
        self.inner.read().await.clone()
    }

    /// Fast-path validity check under the shared lock.
    pub async fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.fresh_token(now).await.is_some()
    }

    /// Returns the cached token if it is valid at `now`.
    ///
    /// Checking and reading happen under the same shared guard, so the token
    /// returned is the one that was checked.
    pub async fn fresh_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|issued| issued.is_valid_at(now))
            .map(|issued| issued.access_token.clone())
    }

    /// Replaces the session with a freshly exchanged token unless another
    /// caller already did so, and returns the token that is valid afterwards.
    ///
    /// `exchange` runs at most once, and only while the exclusive lock is
    /// held. On failure the previous session is left as it was and the error
    /// is returned to this caller only.
    pub async fn refresh<F, Fut>(&self, now: DateTime<Utc>, exchange: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        let mut session = self.inner.write().await;

        if let Some(issued) = session.as_ref().filter(|issued| issued.is_valid_at(now)) {
            debug!(
                principal_id = issued.principal_id,
                "session already refreshed by another caller"
            );
            return Ok(issued.access_token.clone());
        }

        let issued = exchange().await?;
        let token = issued.access_token.clone();
        *session = Some(issued);
        Ok(token)
    }
}
