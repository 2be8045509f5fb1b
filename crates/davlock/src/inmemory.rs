//! In-memory deterministic backend for testing and simulation.
//!
//! [`MemoryScriptState`] implements the [`StoreOps`] command vocabulary over
//! plain maps; [`DeterministicLockStore`] serializes whole operation bodies
//! behind a mutex - the in-process equivalent of a store-side script engine.
//! Operations are instant and repeatable, with no network or disk I/O.
//!
//! # Limitations
//!
//! - No persistence across restarts
//! - Single process only (nothing is shared between stores)
//! - The caller's `now` is the only clock; nothing expires on its own

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use davlock_types::ConfirmOutcome;
use davlock_types::CreateOutcome;
use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::RefreshOutcome;
use davlock_types::StoreError;
use davlock_types::UnlockOutcome;
use tokio::sync::Mutex;

use crate::schema::KeySchema;
use crate::schema::decode_bool;
use crate::schema::field;
use crate::store::LockStore;
use crate::store::StoreOps;
use crate::txn::Txn;

/// One score-sorted member index.
#[derive(Debug, Default, Clone)]
struct SortedIndex {
    by_score: BTreeSet<(i64, String)>,
    scores: HashMap<String, i64>,
}

impl SortedIndex {
    fn add(&mut self, score: i64, member: &str) {
        if let Some(old) = self.scores.insert(member.to_string(), score) {
            self.by_score.remove(&(old, member.to_string()));
        }
        self.by_score.insert((score, member.to_string()));
    }

    fn remove(&mut self, member: &str) {
        if let Some(old) = self.scores.remove(member) {
            self.by_score.remove(&(old, member.to_string()));
        }
    }

    fn range_up_to(&self, max_score: i64, limit: usize) -> Vec<String> {
        self.by_score
            .iter()
            .take_while(|(score, _)| *score <= max_score)
            .take(limit)
            .map(|(_, member)| member.clone())
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.by_score.is_empty()
    }
}

/// The raw key space of the deterministic backend.
///
/// Usable directly (synchronously) for unit tests of the operation bodies.
#[derive(Debug, Default, Clone)]
pub struct MemoryScriptState {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
    indexes: HashMap<String, SortedIndex>,
}

impl StoreOps for MemoryScriptState {
    fn get(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.strings.insert(key.to_string(), value.to_string());
    }

    fn del(&mut self, key: &str) {
        self.strings.remove(key);
        self.hashes.remove(key);
        self.indexes.remove(key);
    }

    fn incr(&mut self, key: &str) -> i64 {
        let slot = self.strings.entry(key.to_string()).or_default();
        let value = slot.parse::<i64>().unwrap_or(0) + 1;
        *slot = value.to_string();
        value
    }

    fn hget(&self, key: &str, field: &str) -> Option<String> {
        self.hashes.get(key).and_then(|hash| hash.get(field)).cloned()
    }

    fn hset(&mut self, key: &str, pairs: &[(&str, String)]) {
        let hash = self.hashes.entry(key.to_string()).or_default();
        for (field, value) in pairs {
            hash.insert(field.to_string(), value.clone());
        }
    }

    fn hdel(&mut self, key: &str, field: &str) {
        if let Some(hash) = self.hashes.get_mut(key) {
            hash.remove(field);
            if hash.is_empty() {
                self.hashes.remove(key);
            }
        }
    }

    fn hincr(&mut self, key: &str, field: &str, delta: i64) -> i64 {
        let hash = self.hashes.entry(key.to_string()).or_default();
        let slot = hash.entry(field.to_string()).or_default();
        let value = slot.parse::<i64>().unwrap_or(0) + delta;
        *slot = value.to_string();
        value
    }

    fn zadd(&mut self, key: &str, score: i64, member: &str) {
        self.indexes.entry(key.to_string()).or_default().add(score, member);
    }

    fn zrem(&mut self, key: &str, member: &str) {
        if let Some(index) = self.indexes.get_mut(key) {
            index.remove(member);
            if index.is_empty() {
                self.indexes.remove(key);
            }
        }
    }

    fn zrange_by_score_limit(&self, key: &str, max_score: i64, limit: usize) -> Vec<String> {
        self.indexes
            .get(key)
            .map(|index| index.range_up_to(max_score, limit))
            .unwrap_or_default()
    }
}

impl MemoryScriptState {
    /// Reconstruct the logical model under `prefix` for inspection.
    pub fn snapshot(&self, prefix: &str) -> StoreSnapshot {
        let keys = KeySchema::new(prefix);
        let node_prefix = keys.node_key("");
        let token_prefix = keys.token_key("");

        let mut nodes = BTreeMap::new();
        for (key, hash) in &self.hashes {
            let Some(name) = key.strip_prefix(&node_prefix) else {
                continue;
            };
            nodes.insert(name.to_string(), NodeSnapshot {
                name: hash.get(field::NAME).cloned().unwrap_or_default(),
                root: hash.get(field::ROOT).cloned().unwrap_or_default(),
                token: hash.get(field::TOKEN).cloned(),
                ref_count: hash.get(field::REF_COUNT).and_then(|raw| raw.parse().ok()).unwrap_or(0),
                duration: hash.get(field::DURATION).and_then(|raw| raw.parse().ok()),
                expiry: hash.get(field::EXPIRY).and_then(|raw| raw.parse().ok()),
                owner_xml: hash.get(field::OWNER_XML).cloned(),
                zero_depth: hash.get(field::ZERO_DEPTH).map(|raw| decode_bool(raw)),
                held: hash.get(field::HELD).map(|raw| decode_bool(raw)).unwrap_or(false),
            });
        }

        let mut tokens = BTreeMap::new();
        for (key, value) in &self.strings {
            if let Some(token) = key.strip_prefix(&token_prefix) {
                tokens.insert(token.to_string(), value.clone());
            }
        }

        let expiry = self
            .indexes
            .get(&keys.expiry_index_key())
            .map(|index| index.scores.iter().map(|(member, score)| (member.clone(), *score)).collect())
            .unwrap_or_default();

        let next_token = self
            .strings
            .get(&keys.next_token_key())
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        StoreSnapshot {
            next_token,
            nodes,
            tokens,
            expiry,
        }
    }
}

/// A node as reconstructed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Stored copy of the node's path.
    pub name: String,
    /// Stored lock root (equals the path).
    pub root: String,
    /// Lock token; `None` on refcount-only nodes.
    pub token: Option<String>,
    /// Count of locked nodes at or below this path.
    pub ref_count: i64,
    /// Signed whole-second duration; only on locked nodes.
    pub duration: Option<i64>,
    /// Absolute unix-second expiry; only on locked nodes.
    pub expiry: Option<i64>,
    /// Owner blob; only on locked nodes.
    pub owner_xml: Option<String>,
    /// Depth flag; only on locked nodes.
    pub zero_depth: Option<bool>,
    /// Whether a confirm currently pins this node.
    pub held: bool,
}

/// Everything stored under one prefix.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Current value of the next-token counter.
    pub next_token: i64,
    /// Nodes by path.
    pub nodes: BTreeMap<String, NodeSnapshot>,
    /// Reverse pointers: token to locked path.
    pub tokens: BTreeMap<String, String>,
    /// Expiry index: path to unix-second deadline.
    pub expiry: BTreeMap<String, i64>,
}

/// In-memory deterministic [`LockStore`].
///
/// Every operation locks the whole state for its duration, which is exactly
/// the atomicity the contract demands: one body at a time, never interleaved.
#[derive(Clone, Default)]
pub struct DeterministicLockStore {
    inner: Arc<Mutex<MemoryScriptState>>,
}

impl DeterministicLockStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reconstruct the logical model under `prefix`.
    pub async fn snapshot(&self, prefix: &str) -> StoreSnapshot {
        self.inner.lock().await.snapshot(prefix)
    }

    /// Run the expiration sweep on its own, outside any public operation.
    ///
    /// The public operations sweep on entry already; this exists for
    /// maintenance and for observing expiration at a chosen instant.
    pub async fn collect_expired(&self, prefix: &str, now: i64) -> Result<(), StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).collect_expired(now)
    }
}

#[async_trait]
impl LockStore for DeterministicLockStore {
    async fn create(&self, prefix: &str, now: i64, details: LockDetails) -> Result<CreateOutcome, StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).create(now, &details)
    }

    async fn refresh(
        &self,
        prefix: &str,
        now: i64,
        token: &str,
        duration: LockDuration,
    ) -> Result<RefreshOutcome, StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).refresh(now, token, duration)
    }

    async fn unlock(&self, prefix: &str, now: i64, token: &str) -> Result<UnlockOutcome, StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).unlock(now, token)
    }

    async fn confirm(
        &self,
        prefix: &str,
        now: i64,
        name0: Option<&str>,
        name1: Option<&str>,
        tokens: &[String],
    ) -> Result<ConfirmOutcome, StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).confirm(now, name0, name1, tokens)
    }

    async fn release(&self, prefix: &str, name0: Option<&str>, name1: Option<&str>) -> Result<(), StoreError> {
        let mut state = self.inner.lock().await;
        Txn::new(&mut *state, prefix).release(name0, name1)
    }
}
