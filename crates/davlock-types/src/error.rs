//! Error taxonomy for lock operations.

use thiserror::Error;

/// Failures raised by a store backend while executing an atomic operation.
///
/// These are distinct from operation refusals (a conflicting lock, an unknown
/// token), which are ordinary outcomes; a `StoreError` means the backend
/// itself could not complete the transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport, protocol, or backend failure, surfaced verbatim.
    #[error("store operation failed: {reason}")]
    Failed {
        /// Human-readable description from the backend.
        reason: String,
    },

    /// A persisted record could not be decoded.
    #[error("corrupted record at key '{key}': {reason}")]
    Corrupted {
        /// The store key holding the undecodable record.
        key: String,
        /// What failed to decode.
        reason: String,
    },

    /// A hold or release found the pinned flag in the opposite state.
    ///
    /// This is a programmer error: the engine never holds a node twice and
    /// never releases an unheld node, so seeing it means the backend was
    /// driven outside the public contract.
    #[error("inconsistent held state for '{name}'")]
    InconsistentHeldState {
        /// Path of the node with the unexpected flag.
        name: String,
    },
}

/// Public error taxonomy of the lock manager facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The requested lock conflicts with an existing lock, or the operation
    /// targeted a lock that is currently held by a confirm.
    #[error("resource is locked")]
    Locked,

    /// The token does not resolve to a lock: it expired, was never created,
    /// or was already released.
    #[error("no lock matches the supplied token")]
    NoSuchLock,

    /// No supplied condition token matches the named resources.
    #[error("confirmation failed for the named resources")]
    ConfirmationFailed,

    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::Failed {
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "store operation failed: connection reset");

        let err = StoreError::Corrupted {
            key: "p:n:/a".to_string(),
            reason: "field 'd' is not an integer".to_string(),
        };
        assert_eq!(err.to_string(), "corrupted record at key 'p:n:/a': field 'd' is not an integer");

        let err = StoreError::InconsistentHeldState { name: "/a".to_string() };
        assert_eq!(err.to_string(), "inconsistent held state for '/a'");
    }

    #[test]
    fn lock_error_display() {
        assert_eq!(LockError::Locked.to_string(), "resource is locked");
        assert_eq!(LockError::NoSuchLock.to_string(), "no lock matches the supplied token");
        assert_eq!(
            LockError::ConfirmationFailed.to_string(),
            "confirmation failed for the named resources"
        );
    }

    #[test]
    fn store_error_converts_into_lock_error() {
        let err: LockError = StoreError::Failed {
            reason: "timeout".to_string(),
        }
        .into();
        assert!(matches!(err, LockError::Store(StoreError::Failed { .. })));
        assert_eq!(err.to_string(), "store operation failed: timeout");
    }
}
