//! Lock creation.

use davlock_types::CreateOutcome;
use davlock_types::LockDetails;
use davlock_types::LockToken;
use davlock_types::StoreError;

use super::Txn;
use crate::paths::ancestors_to_root;
use crate::schema::FALSE_VALUE;
use crate::schema::encode_bool;
use crate::schema::field;
use crate::store::StoreOps;

impl<S: StoreOps + ?Sized> Txn<'_, S> {
    /// Grant a lock at `details.root`, or refuse it with
    /// [`CreateOutcome::Locked`] if any existing lock conflicts.
    ///
    /// The root must already be canonical.
    pub fn create(&mut self, now: i64, details: &LockDetails) -> Result<CreateOutcome, StoreError> {
        self.collect_expired(now)?;
        if !self.can_create(&details.root, details.zero_depth) {
            return Ok(CreateOutcome::Locked);
        }
        let token = self.create_token(now, details);
        Ok(CreateOutcome::Created {
            token: LockToken::new(token),
        })
    }

    /// Walk from `name` to "/" checking for conflicts.
    fn can_create(&self, name: &str, zero_depth: bool) -> bool {
        for (step, path) in ancestors_to_root(name).enumerate() {
            let node_key = self.keys.node_key(path);
            if self.store.hget(&node_key, field::ROOT).is_none() {
                // No node on this path.
                continue;
            }
            let locked = self.store.hget(&node_key, field::TOKEN).is_some();
            if step == 0 {
                if locked {
                    // The target itself is locked.
                    return false;
                }
                if !zero_depth {
                    // The node exists, so some descendant is locked; an
                    // infinite-depth lock above it cannot be granted.
                    return false;
                }
            } else if locked && !self.bool_field(&node_key, field::ZERO_DEPTH) {
                // An infinite-depth ancestor lock covers this path.
                return false;
            }
        }
        true
    }

    /// Allocate a token and materialise the lock along the path to "/".
    fn create_token(&mut self, now: i64, details: &LockDetails) -> String {
        let counter_key = self.keys.next_token_key();
        let token = self.store.incr(&counter_key).to_string();

        let duration = details.duration.as_secs();
        let expiry = if duration >= 0 { now + duration } else { 0 };

        for (step, path) in ancestors_to_root(&details.root).enumerate() {
            let node_key = self.keys.node_key(path);
            let ref_count = self.store.hincr(&node_key, field::REF_COUNT, 1);

            let mut fields: Vec<(&str, String)> = Vec::new();
            if ref_count == 1 {
                // First reference: the node did not exist yet.
                fields.push((field::NAME, path.to_string()));
                fields.push((field::ROOT, path.to_string()));
                fields.push((field::HELD, FALSE_VALUE.to_string()));
            }
            if step == 0 {
                fields.push((field::TOKEN, token.clone()));
                fields.push((field::DURATION, duration.to_string()));
                fields.push((field::OWNER_XML, details.owner_xml.clone()));
                fields.push((field::ZERO_DEPTH, encode_bool(details.zero_depth).to_string()));
                fields.push((field::EXPIRY, expiry.to_string()));
            }
            if !fields.is_empty() {
                self.store.hset(&node_key, &fields);
            }

            if step == 0 {
                let token_key = self.keys.token_key(&token);
                self.store.set(&token_key, path);
                if duration >= 0 {
                    let index_key = self.keys.expiry_index_key();
                    self.store.zadd(&index_key, expiry, path);
                }
            }
        }

        token
    }
}
