//! Typed outcomes of the atomic lock operations.
//!
//! Backends return these instead of the wire sentinel strings; the facade
//! maps the refusal variants onto [`crate::LockError`].

use serde::Deserialize;
use serde::Serialize;

use crate::LockDetails;
use crate::LockToken;

/// Outcome of creating a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateOutcome {
    /// The lock was granted under a freshly allocated token.
    Created { token: LockToken },
    /// The request conflicts with an existing lock.
    Locked,
}

/// Outcome of refreshing a lock's duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    /// The duration was replaced; the details reflect the new duration.
    Refreshed { details: LockDetails },
    /// The token does not resolve to a lock.
    NoSuchLock,
    /// The lock is currently held by a confirm and cannot be refreshed.
    Locked,
}

/// Outcome of unlocking by token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockOutcome {
    /// The lock and any nodes it alone kept alive were removed.
    Unlocked,
    /// The token does not resolve to a lock.
    NoSuchLock,
    /// The lock is currently held by a confirm and cannot be unlocked.
    Locked,
}

/// Outcome of confirming up to two names against condition tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmOutcome {
    /// The matched locks are now held; the roots name what must be released.
    /// A name that was absent, or that matched the same lock as the other
    /// name, yields `None`.
    Confirmed {
        root0: Option<String>,
        root1: Option<String>,
    },
    /// Some non-empty name matched none of the condition tokens.
    ConfirmationFailed,
}
