//! Distributed WebDAV lock manager over a shared key-value store.
//!
//! Locks are hierarchical: a lock is anchored at a URL-style path and, unless
//! it is zero-depth, covers every descendant of that path. All state lives in
//! a key-value store shared by any number of stateless front ends; the store
//! is the only writer coordination point. Every public operation runs as one
//! indivisible transaction against it, so correctness never depends on a
//! process-local mutex.
//!
//! The pieces:
//!
//! - [`paths`] - path canonicalisation and the walk from a path to "/"
//! - [`schema`] - the persisted key and field layout, stable across
//!   implementations sharing a prefix
//! - [`store`] - the [`StoreOps`] command vocabulary and the [`LockStore`]
//!   atomic dispatch trait implemented by backends
//! - [`txn`] - the operation bodies: create, refresh, unlock, confirm,
//!   release, and the expiration sweep that prefixes them
//! - [`inmemory`] - a deterministic, non-persistent backend for tests and
//!   simulation
//! - [`manager`] - the typed client facade
//!
//! ## Example
//!
//! ```ignore
//! use davlock::{DeterministicLockStore, LockManager};
//! use davlock_types::{Condition, LockDetails, LockDuration};
//!
//! let store = DeterministicLockStore::new();
//! let locks = LockManager::new(store, "webdav:");
//!
//! let token = locks
//!     .create(now, LockDetails::new("/shared/report", LockDuration::Seconds(300)))
//!     .await?;
//!
//! // Pin the lock for the duration of a request against two resources.
//! let guard = locks
//!     .confirm(now, "/shared/report", "/shared/report.bak", &[Condition::new(token.as_str())])
//!     .await?;
//! // ... act on both resources ...
//! guard.release().await?;
//!
//! locks.unlock(now, token.as_str()).await?;
//! ```

pub mod inmemory;
pub mod manager;
pub mod paths;
pub mod schema;
pub mod store;
pub mod txn;

pub use davlock_types::Condition;
pub use davlock_types::ConfirmOutcome;
pub use davlock_types::CreateOutcome;
pub use davlock_types::LockDetails;
pub use davlock_types::LockDuration;
pub use davlock_types::LockError;
pub use davlock_types::LockToken;
pub use davlock_types::RefreshOutcome;
pub use davlock_types::StoreError;
pub use davlock_types::UnlockOutcome;
pub use inmemory::DeterministicLockStore;
pub use manager::LockManager;
pub use manager::ReleaseGuard;
pub use store::LockStore;
pub use store::StoreOps;
