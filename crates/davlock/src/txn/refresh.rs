//! Lock duration refresh.

use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::RefreshOutcome;
use davlock_types::StoreError;

use super::Txn;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Replace the duration of the lock behind `token` and recompute its
    /// expiry from `now`.
    ///
    /// The new duration may extend, shorten, or make the lock non-expiring
    /// regardless of the previous value. The old expiry entry is dropped iff
    /// the OLD duration was non-negative.
    pub fn refresh(&mut self, now: i64, token: &str, duration: LockDuration) -> Result<RefreshOutcome, StoreError> {
        self.collect_expired(now)?;

        let token_key = self.keys.token_key(token);
        let Some(name) = self.store.get(&token_key) else {
            return Ok(RefreshOutcome::NoSuchLock);
        };

        let node_key = self.keys.node_key(&name);
        let root = self.required_field(&node_key, field::ROOT)?;
        let old_duration = self.required_i64_field(&node_key, field::DURATION)?;
        let owner_xml = self.store.hget(&node_key, field::OWNER_XML).unwrap_or_default();
        let zero_depth = self.bool_field(&node_key, field::ZERO_DEPTH);
        if self.bool_field(&node_key, field::HELD) {
            return Ok(RefreshOutcome::Locked);
        }

        let index_key = self.keys.expiry_index_key();
        if old_duration >= 0 {
            self.store.zrem(&index_key, &name);
        }

        let new_duration = duration.as_secs();
        let mut new_expiry = 0;
        if new_duration >= 0 {
            new_expiry = now + new_duration;
            self.store.zadd(&index_key, new_expiry, &name);
        }

        self.store.hset(&node_key, &[
            (field::DURATION, new_duration.to_string()),
            (field::EXPIRY, new_expiry.to_string()),
        ]);

        Ok(RefreshOutcome::Refreshed {
            details: LockDetails {
                root,
                duration,
                owner_xml,
                zero_depth,
            },
        })
    }
}
