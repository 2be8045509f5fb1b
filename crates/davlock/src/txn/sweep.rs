//! Expiration sweep.

use davlock_types::StoreError;
use tracing::debug;
use tracing::warn;

use super::Txn;
use crate::schema::field;
use crate::store::StoreOps;

/// Upper bound on index members taken per query, so one sweep iteration
/// stays bounded regardless of backlog.
const SWEEP_BATCH: usize = 100;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Remove every lock whose expiry is at or before `now`.
    ///
    /// Runs at the start of create, refresh, unlock, and confirm, amortising
    /// expiration into the calling operation; backends may also run it on its
    /// own as a maintenance pass. Held locks never appear in the index, so
    /// the removal needs no held check. Idempotent: a second sweep at the
    /// same `now` finds nothing.
    pub fn collect_expired(&mut self, now: i64) -> Result<(), StoreError> {
        let index_key = self.keys.expiry_index_key();
        loop {
            let names = self.store.zrange_by_score_limit(&index_key, now, SWEEP_BATCH);
            if names.is_empty() {
                return Ok(());
            }
            let batch_len = names.len();
            for name in names {
                let node_key = self.keys.node_key(&name);
                let root = self.store.hget(&node_key, field::ROOT);
                let token = self.store.hget(&node_key, field::TOKEN);
                match (root, token) {
                    (Some(root), Some(token)) => {
                        let duration = self.required_i64_field(&node_key, field::DURATION)?;
                        self.remove_lock(&name, &root, &token, duration);
                    }
                    _ => {
                        // An indexed path without a lock behind it. Drop the
                        // stale entry, or this loop would re-read it forever.
                        warn!(name = %name, "expiry index entry has no matching lock; dropping it");
                        self.store.zrem(&index_key, &name);
                    }
                }
            }
            debug!(count = batch_len, "collected expired locks");
        }
    }
}
