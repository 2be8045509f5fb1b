//! Stored-node access and removal.

use davlock_types::StoreError;

use super::Txn;
use crate::paths::ancestors_to_root;
use crate::schema::decode_bool;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Remove a lock: delete the reverse pointer, clear the node's token
    /// field, drop the expiry entry for expiring locks, and walk from the
    /// lock root to "/" decrementing refcounts, deleting any node whose count
    /// reaches zero.
    pub(super) fn remove_lock(&mut self, name: &str, root: &str, token: &str, duration: i64) {
        let token_key = self.keys.token_key(token);
        self.store.del(&token_key);

        let node_key = self.keys.node_key(name);
        self.store.hdel(&node_key, field::TOKEN);

        if duration >= 0 {
            let index_key = self.keys.expiry_index_key();
            self.store.zrem(&index_key, name);
        }

        for path in ancestors_to_root(root) {
            let path_key = self.keys.node_key(path);
            if self.store.hincr(&path_key, field::REF_COUNT, -1) == 0 {
                self.store.del(&path_key);
            }
        }
    }

    /// A field every node of interest must carry; its absence means the
    /// record is corrupt relative to the reverse pointer that led here.
    pub(super) fn required_field(&self, node_key: &str, field: &'static str) -> Result<String, StoreError> {
        self.store.hget(node_key, field).ok_or_else(|| StoreError::Corrupted {
            key: node_key.to_string(),
            reason: format!("missing field '{field}'"),
        })
    }

    /// As [`Self::required_field`], decoded as a signed integer.
    pub(super) fn required_i64_field(&self, node_key: &str, field: &'static str) -> Result<i64, StoreError> {
        let raw = self.required_field(node_key, field)?;
        raw.parse().map_err(|_| StoreError::Corrupted {
            key: node_key.to_string(),
            reason: format!("field '{field}' is not an integer: {raw:?}"),
        })
    }

    /// A boolean field; absent decodes as false.
    pub(super) fn bool_field(&self, node_key: &str, field: &'static str) -> bool {
        self.store.hget(node_key, field).as_deref().map(decode_bool).unwrap_or(false)
    }
}
