//! Store contract.
//!
//! Two seams separate the lock semantics from storage:
//!
//! - [`StoreOps`] is the small command vocabulary the operation bodies in
//!   [`crate::txn`] are written against: plain strings, hashes with
//!   multi-field access, and one score-sorted member index. An in-process
//!   backend implements it directly; a remote backend runs the equivalent
//!   program on the store server instead.
//! - [`LockStore`] is the dispatch boundary callers see: one async method per
//!   public operation. An implementation MUST execute each call as a single
//!   indivisible transaction - the whole read/decide/mutate body completes
//!   without interleaving with any other call on the same namespace. That
//!   atomicity is the only concurrency primitive the lock semantics rely on.

use async_trait::async_trait;
use davlock_types::ConfirmOutcome;
use davlock_types::CreateOutcome;
use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::RefreshOutcome;
use davlock_types::StoreError;
use davlock_types::UnlockOutcome;

/// The command vocabulary of one atomic execution.
///
/// Scores and counters are signed so the sentinel encoding of negative
/// durations survives the store unchanged.
pub trait StoreOps {
    /// Read a plain string value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a plain string value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete a key of any kind.
    fn del(&mut self, key: &str);

    /// Atomically increment an integer-valued string, treating a missing key
    /// as zero, and return the new value.
    fn incr(&mut self, key: &str) -> i64;

    /// Read one hash field.
    fn hget(&self, key: &str, field: &str) -> Option<String>;

    /// Write several hash fields at once, creating the hash if needed.
    fn hset(&mut self, key: &str, pairs: &[(&str, String)]);

    /// Delete one hash field. A hash with no fields left ceases to exist.
    fn hdel(&mut self, key: &str, field: &str);

    /// Atomically add `delta` to an integer-valued hash field, treating a
    /// missing field as zero, and return the new value.
    fn hincr(&mut self, key: &str, field: &str, delta: i64) -> i64;

    /// Insert or update a member of a score-sorted index.
    fn zadd(&mut self, key: &str, score: i64, member: &str);

    /// Remove a member from a score-sorted index.
    fn zrem(&mut self, key: &str, member: &str);

    /// Up to `limit` members with score at most `max_score`, lowest scores
    /// first.
    fn zrange_by_score_limit(&self, key: &str, max_score: i64, limit: usize) -> Vec<String>;
}

/// Atomic dispatch of the public lock operations.
///
/// `prefix` namespaces every key; two callers with different prefixes never
/// observe each other. `now` is the caller's clock in whole unix seconds -
/// the engine never reads a clock of its own.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Grant a lock at `details.root` (already canonical), or refuse it.
    async fn create(&self, prefix: &str, now: i64, details: LockDetails) -> Result<CreateOutcome, StoreError>;

    /// Replace the duration of the lock behind `token`.
    async fn refresh(
        &self,
        prefix: &str,
        now: i64,
        token: &str,
        duration: LockDuration,
    ) -> Result<RefreshOutcome, StoreError>;

    /// Remove the lock behind `token`.
    async fn unlock(&self, prefix: &str, now: i64, token: &str) -> Result<UnlockOutcome, StoreError>;

    /// Match up to two canonical names against condition tokens and pin the
    /// matched locks.
    async fn confirm(
        &self,
        prefix: &str,
        now: i64,
        name0: Option<&str>,
        name1: Option<&str>,
        tokens: &[String],
    ) -> Result<ConfirmOutcome, StoreError>;

    /// Unpin previously confirmed roots, re-exposing them to expiration.
    async fn release(&self, prefix: &str, name0: Option<&str>, name1: Option<&str>) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: LockStore + ?Sized> LockStore for std::sync::Arc<T> {
    async fn create(&self, prefix: &str, now: i64, details: LockDetails) -> Result<CreateOutcome, StoreError> {
        (**self).create(prefix, now, details).await
    }

    async fn refresh(
        &self,
        prefix: &str,
        now: i64,
        token: &str,
        duration: LockDuration,
    ) -> Result<RefreshOutcome, StoreError> {
        (**self).refresh(prefix, now, token, duration).await
    }

    async fn unlock(&self, prefix: &str, now: i64, token: &str) -> Result<UnlockOutcome, StoreError> {
        (**self).unlock(prefix, now, token).await
    }

    async fn confirm(
        &self,
        prefix: &str,
        now: i64,
        name0: Option<&str>,
        name1: Option<&str>,
        tokens: &[String],
    ) -> Result<ConfirmOutcome, StoreError> {
        (**self).confirm(prefix, now, name0, name1, tokens).await
    }

    async fn release(&self, prefix: &str, name0: Option<&str>, name1: Option<&str>) -> Result<(), StoreError> {
        (**self).release(prefix, name0, name1).await
    }
}
