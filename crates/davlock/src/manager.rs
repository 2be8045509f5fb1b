//! Client facade.
//!
//! [`LockManager`] wraps a [`LockStore`] backend with path canonicalisation,
//! typed arguments, and the public error taxonomy. It is callable
//! concurrently from any number of requests and processes sharing the same
//! store; each call is one atomic dispatch and there is no process-local
//! locking.

use std::sync::Arc;

use davlock_types::Condition;
use davlock_types::ConfirmOutcome;
use davlock_types::CreateOutcome;
use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::LockError;
use davlock_types::LockToken;
use davlock_types::RefreshOutcome;
use davlock_types::UnlockOutcome;
use tracing::debug;
use tracing::warn;

use crate::paths::slash_clean;
use crate::store::LockStore;

/// Typed entry point to the lock system.
pub struct LockManager<S: LockStore + ?Sized> {
    store: Arc<S>,
    prefix: String,
}

impl<S: LockStore + ?Sized + 'static> LockManager<S> {
    /// Bind a manager to a store and a namespace prefix.
    pub fn new(store: Arc<S>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix this manager operates under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create a lock described by `details`, canonicalising its root.
    ///
    /// Returns the new token, or [`LockError::Locked`] if an existing lock
    /// conflicts.
    pub async fn create(&self, now: i64, mut details: LockDetails) -> Result<LockToken, LockError> {
        details.root = slash_clean(&details.root);
        match self.store.create(&self.prefix, now, details).await? {
            CreateOutcome::Created { token } => {
                debug!(token = %token, "lock created");
                Ok(token)
            }
            CreateOutcome::Locked => Err(LockError::Locked),
        }
    }

    /// Replace the duration of the lock behind `token` and return its
    /// refreshed details.
    pub async fn refresh(&self, now: i64, token: &str, duration: LockDuration) -> Result<LockDetails, LockError> {
        match self.store.refresh(&self.prefix, now, token, duration).await? {
            RefreshOutcome::Refreshed { details } => {
                debug!(token, root = %details.root, "lock refreshed");
                Ok(details)
            }
            RefreshOutcome::NoSuchLock => Err(LockError::NoSuchLock),
            RefreshOutcome::Locked => Err(LockError::Locked),
        }
    }

    /// Remove the lock behind `token`.
    pub async fn unlock(&self, now: i64, token: &str) -> Result<(), LockError> {
        match self.store.unlock(&self.prefix, now, token).await? {
            UnlockOutcome::Unlocked => {
                debug!(token, "lock removed");
                Ok(())
            }
            UnlockOutcome::NoSuchLock => Err(LockError::NoSuchLock),
            UnlockOutcome::Locked => Err(LockError::Locked),
        }
    }

    /// Match up to two names (either may be empty) against the condition
    /// tokens and pin the matched locks for the duration of a request.
    ///
    /// On success the returned [`ReleaseGuard`] must be released exactly
    /// once; consuming it is the only way to do so.
    pub async fn confirm(
        &self,
        now: i64,
        name0: &str,
        name1: &str,
        conditions: &[Condition],
    ) -> Result<ReleaseGuard<S>, LockError> {
        let name0 = (!name0.is_empty()).then(|| slash_clean(name0));
        let name1 = (!name1.is_empty()).then(|| slash_clean(name1));
        let tokens: Vec<String> = conditions.iter().map(|condition| condition.token.clone()).collect();

        let outcome = self
            .store
            .confirm(&self.prefix, now, name0.as_deref(), name1.as_deref(), &tokens)
            .await?;
        match outcome {
            ConfirmOutcome::Confirmed { root0, root1 } => {
                debug!(root0 = ?root0, root1 = ?root1, "locks confirmed and held");
                Ok(ReleaseGuard {
                    store: self.store.clone(),
                    prefix: self.prefix.clone(),
                    root0,
                    root1,
                    released: false,
                })
            }
            ConfirmOutcome::ConfirmationFailed => Err(LockError::ConfirmationFailed),
        }
    }
}

/// One-shot release of the roots pinned by a confirm.
///
/// [`ReleaseGuard::release`] consumes the guard, so releasing twice cannot be
/// written. A guard that is dropped without being released leaves its locks
/// held - they are immune to expiry and unlock until an operator clears the
/// namespace - and logs a warning to that effect.
#[must_use = "confirmed locks stay held until the guard is released"]
pub struct ReleaseGuard<S: LockStore + ?Sized + 'static> {
    store: Arc<S>,
    prefix: String,
    root0: Option<String>,
    root1: Option<String>,
    released: bool,
}

impl<S: LockStore + ?Sized + 'static> std::fmt::Debug for ReleaseGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("prefix", &self.prefix)
            .field("root0", &self.root0)
            .field("root1", &self.root1)
            .field("released", &self.released)
            .finish()
    }
}

impl<S: LockStore + ?Sized + 'static> ReleaseGuard<S> {
    /// The pinned roots, as stored.
    pub fn roots(&self) -> (Option<&str>, Option<&str>) {
        (self.root0.as_deref(), self.root1.as_deref())
    }

    /// Unpin the held locks, re-exposing them to expiry and unlock.
    pub async fn release(mut self) -> Result<(), LockError> {
        self.store
            .release(&self.prefix, self.root0.as_deref(), self.root1.as_deref())
            .await?;
        self.released = true;
        debug!(root0 = ?self.root0, root1 = ?self.root1, "held locks released");
        Ok(())
    }
}

impl<S: LockStore + ?Sized + 'static> Drop for ReleaseGuard<S> {
    fn drop(&mut self) {
        if !self.released && (self.root0.is_some() || self.root1.is_some()) {
            warn!(
                root0 = ?self.root0,
                root1 = ?self.root1,
                "release guard dropped without release; held locks remain pinned"
            );
        }
    }
}
