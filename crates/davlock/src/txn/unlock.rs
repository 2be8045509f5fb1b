//! Unlock by token.

use davlock_types::StoreError;
use davlock_types::UnlockOutcome;

use super::Txn;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Remove the lock behind `token`, deleting every node it alone kept
    /// alive.
    pub fn unlock(&mut self, now: i64, token: &str) -> Result<UnlockOutcome, StoreError> {
        self.collect_expired(now)?;

        let token_key = self.keys.token_key(token);
        let Some(name) = self.store.get(&token_key) else {
            return Ok(UnlockOutcome::NoSuchLock);
        };

        let node_key = self.keys.node_key(&name);
        let root = self.required_field(&node_key, field::ROOT)?;
        let duration = self.required_i64_field(&node_key, field::DURATION)?;
        if self.bool_field(&node_key, field::HELD) {
            return Ok(UnlockOutcome::Locked);
        }

        self.remove_lock(&name, &root, token, duration);
        Ok(UnlockOutcome::Unlocked)
    }
}
