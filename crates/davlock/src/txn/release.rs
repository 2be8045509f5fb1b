//! Release of previously confirmed roots.

use davlock_types::StoreError;

use super::Txn;
use crate::schema::FALSE_VALUE;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Unpin each present root, re-exposing it to expiration.
    ///
    /// Release runs no expiration sweep: held nodes are absent from the
    /// index, and any past-due entry re-added here is collected by the next
    /// mutating operation.
    pub fn release(&mut self, name0: Option<&str>, name1: Option<&str>) -> Result<(), StoreError> {
        if let Some(name) = name0 {
            self.unhold(name)?;
        }
        if let Some(name) = name1 {
            self.unhold(name)?;
        }
        Ok(())
    }

    /// Clear the held flag and re-add the UNCHANGED stored expiry for
    /// expiring locks. Holding does not refresh a lock's lifetime.
    fn unhold(&mut self, name: &str) -> Result<(), StoreError> {
        let node_key = self.keys.node_key(name);
        if !self.bool_field(&node_key, field::HELD) {
            return Err(StoreError::InconsistentHeldState { name: name.to_string() });
        }

        let duration = self.required_i64_field(&node_key, field::DURATION)?;
        let expiry = self.required_i64_field(&node_key, field::EXPIRY)?;

        self.store.hset(&node_key, &[(field::HELD, FALSE_VALUE.to_string())]);
        if duration >= 0 {
            let index_key = self.keys.expiry_index_key();
            self.store.zadd(&index_key, expiry, name);
        }
        Ok(())
    }
}
