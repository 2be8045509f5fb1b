//! Confirmation: match names against condition tokens and pin the locks.

use davlock_types::ConfirmOutcome;
use davlock_types::StoreError;

use super::Txn;
use crate::schema::TRUE_VALUE;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Match each present name against the condition tokens and pin the
    /// matched locks.
    ///
    /// Both names matching the same lock pin it once. Any non-matching name
    /// fails the whole confirmation and pins nothing.
    pub fn confirm(
        &mut self,
        now: i64,
        name0: Option<&str>,
        name1: Option<&str>,
        tokens: &[String],
    ) -> Result<ConfirmOutcome, StoreError> {
        self.collect_expired(now)?;

        let mut match0 = None;
        let mut match1 = None;
        if let Some(name) = name0 {
            match0 = self.lookup(name, tokens)?;
            if match0.is_none() {
                return Ok(ConfirmOutcome::ConfirmationFailed);
            }
        }
        if let Some(name) = name1 {
            match1 = self.lookup(name, tokens)?;
            if match1.is_none() {
                return Ok(ConfirmOutcome::ConfirmationFailed);
            }
        }

        // Never pin the same lock twice.
        if let (Some(first), Some(second)) = (&match0, &match1) {
            if first.root == second.root {
                match1 = None;
            }
        }

        let mut root0 = None;
        let mut root1 = None;
        if let Some(matched) = match0 {
            self.hold(&matched.root, matched.duration)?;
            root0 = Some(matched.root);
        }
        if let Some(matched) = match1 {
            self.hold(&matched.root, matched.duration)?;
            root1 = Some(matched.root);
        }

        Ok(ConfirmOutcome::Confirmed { root0, root1 })
    }

    /// Find the lock that covers `name` among the candidate tokens.
    ///
    /// A lock matches if its root is `name` itself, or if it is an
    /// infinite-depth lock whose root is "/" or a proper ancestor of `name`.
    /// Held locks never match.
    fn lookup(&self, name: &str, tokens: &[String]) -> Result<Option<LookupMatch>, StoreError> {
        for token in tokens {
            let token_key = self.keys.token_key(token);
            let Some(node_name) = self.store.get(&token_key) else {
                continue;
            };
            let node_key = self.keys.node_key(&node_name);
            let root = self.required_field(&node_key, field::ROOT)?;
            let duration = self.required_i64_field(&node_key, field::DURATION)?;
            if self.bool_field(&node_key, field::HELD) {
                continue;
            }
            if name == root {
                return Ok(Some(LookupMatch { root, duration }));
            }
            if self.bool_field(&node_key, field::ZERO_DEPTH) {
                continue;
            }
            if root == "/" || name.starts_with(&format!("{root}/")) {
                return Ok(Some(LookupMatch { root, duration }));
            }
        }
        Ok(None)
    }

    /// Pin a lock: set the held flag and shield it from expiration.
    pub(super) fn hold(&mut self, name: &str, duration: i64) -> Result<(), StoreError> {
        let node_key = self.keys.node_key(name);
        if self.bool_field(&node_key, field::HELD) {
            return Err(StoreError::InconsistentHeldState { name: name.to_string() });
        }
        self.store.hset(&node_key, &[(field::HELD, TRUE_VALUE.to_string())]);
        if duration >= 0 {
            let index_key = self.keys.expiry_index_key();
            self.store.zrem(&index_key, name);
        }
        Ok(())
    }
}

/// The lock a lookup resolved a name to.
struct LookupMatch {
    root: String,
    duration: i64,
}
