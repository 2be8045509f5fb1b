//! Expiration schedules driven through the public operations.

use std::collections::HashMap;
use std::sync::Arc;

use davlock::DeterministicLockStore;
use davlock::LockManager;
use davlock_testing::check_consistent;
use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::LockToken;

const PREFIX: &str = "webdavtest:";

/// One step of an expiration schedule. Deadlines are absolute unix seconds;
/// `Create` and `Refresh` derive the duration from the current `now`.
enum Step {
    SetNow(i64),
    Create { path: &'static str, expires_at: i64 },
    Refresh { path: &'static str, expires_at: i64 },
    /// Sweep at the current `now`, then expect exactly these locks, written
    /// as `path.deadline`.
    Want(&'static [&'static str]),
}

use Step::*;

async fn run_schedule(steps: &[Step]) {
    let store = DeterministicLockStore::new();
    let locks = LockManager::new(store.clone(), PREFIX);
    let mut tokens: HashMap<&'static str, LockToken> = HashMap::new();
    let mut now = 0;

    for (index, step) in steps.iter().enumerate() {
        match step {
            SetNow(at) => now = *at,
            Create { path, expires_at } => {
                let duration = LockDuration::Seconds((*expires_at - now) as u64);
                let details = LockDetails {
                    root: path.to_string(),
                    duration,
                    owner_xml: String::new(),
                    zero_depth: true,
                };
                let token = locks.create(now, details).await.unwrap();
                tokens.insert(*path, token);
            }
            Refresh { path, expires_at } => {
                let duration = LockDuration::Seconds((*expires_at - now) as u64);
                let token = tokens.get(path).unwrap_or_else(|| panic!("step #{index}: no token for {path}"));
                let refreshed = locks.refresh(now, token.as_str(), duration).await.unwrap();
                assert_eq!(refreshed.root, *path);
                assert_eq!(refreshed.duration, duration);
            }
            Want(expected) => {
                store.collect_expired(PREFIX, now).await.unwrap();
                let snapshot = store.snapshot(PREFIX).await;
                let mut live: Vec<String> = snapshot
                    .nodes
                    .values()
                    .filter(|node| node.token.is_some())
                    .map(|node| format!("{}.{}", node.root, node.expiry.unwrap_or(0)))
                    .collect();
                live.sort();
                assert_eq!(live, *expected, "step #{index} at now={now}");
            }
        }

        check_consistent(&store.snapshot(PREFIX).await)
            .unwrap_or_else(|err| panic!("step #{index}: inconsistent state: {err}"));
    }
}

#[tokio::test]
async fn locks_expire_on_schedule() {
    run_schedule(&[
        SetNow(0),
        Create { path: "/a", expires_at: 5 },
        Want(&["/a.5"]),
        Create { path: "/c", expires_at: 6 },
        Want(&["/a.5", "/c.6"]),
        Create { path: "/a/b", expires_at: 7 },
        Want(&["/a.5", "/a/b.7", "/c.6"]),
        SetNow(4),
        Want(&["/a.5", "/a/b.7", "/c.6"]),
        SetNow(5),
        Want(&["/a/b.7", "/c.6"]),
        SetNow(6),
        Want(&["/a/b.7"]),
        SetNow(7),
        Want(&[]),
        SetNow(8),
        Want(&[]),
    ])
    .await;
}

#[tokio::test]
async fn refresh_replaces_the_deadline() {
    run_schedule(&[
        SetNow(8),
        Create { path: "/a", expires_at: 12 },
        Create { path: "/b", expires_at: 13 },
        Create { path: "/c", expires_at: 15 },
        Create { path: "/a/d", expires_at: 16 },
        Want(&["/a.12", "/a/d.16", "/b.13", "/c.15"]),
        Refresh { path: "/a", expires_at: 14 },
        Want(&["/a.14", "/a/d.16", "/b.13", "/c.15"]),
        SetNow(12),
        Want(&["/a.14", "/a/d.16", "/b.13", "/c.15"]),
        SetNow(13),
        Want(&["/a.14", "/a/d.16", "/c.15"]),
        SetNow(14),
        Want(&["/a/d.16", "/c.15"]),
        Refresh { path: "/a/d", expires_at: 20 },
        Refresh { path: "/c", expires_at: 20 },
        Want(&["/a/d.20", "/c.20"]),
        SetNow(20),
        Want(&[]),
    ])
    .await;
}

#[tokio::test]
async fn zero_duration_expires_at_the_same_instant() {
    run_schedule(&[
        SetNow(3),
        Create { path: "/a", expires_at: 3 },
        Want(&[]),
    ])
    .await;
}

#[tokio::test]
async fn mutating_operations_sweep_on_entry() {
    let store = DeterministicLockStore::new();
    let locks = LockManager::new(store.clone(), PREFIX);

    let first = locks
        .create(0, LockDetails::new("/a", LockDuration::Seconds(5)))
        .await
        .unwrap();

    // Past the deadline, the same root is grantable again: the create swept
    // the expired lock before checking for conflicts.
    let second = locks
        .create(10, LockDetails::new("/a", LockDuration::Seconds(5)))
        .await
        .unwrap();
    assert_ne!(first, second);

    let snapshot = store.snapshot(PREFIX).await;
    assert_eq!(snapshot.tokens.len(), 1);
    assert_eq!(snapshot.tokens[second.as_str()], "/a");
    check_consistent(&snapshot).unwrap();
}

#[tokio::test]
async fn large_backlogs_are_swept_in_batches() {
    let store = DeterministicLockStore::new();
    let locks = LockManager::new(store.clone(), PREFIX);

    for i in 0..250 {
        let details = LockDetails {
            root: format!("/bulk/{i}"),
            duration: LockDuration::Seconds(1),
            owner_xml: String::new(),
            zero_depth: true,
        };
        locks.create(0, details).await.unwrap();
    }
    assert_eq!(store.snapshot(PREFIX).await.expiry.len(), 250);

    // A single operation past the deadline drains the whole backlog, more
    // than two full sweep batches, before doing its own work.
    let token = locks
        .create(2, LockDetails::new("/after", LockDuration::Seconds(60)))
        .await
        .unwrap();

    let snapshot = store.snapshot(PREFIX).await;
    assert_eq!(snapshot.tokens.len(), 1);
    assert_eq!(snapshot.tokens[token.as_str()], "/after");
    assert!(!snapshot.nodes.contains_key("/bulk"));
    check_consistent(&snapshot).unwrap();
}

#[tokio::test]
async fn infinite_locks_never_enter_the_index() {
    let store: Arc<DeterministicLockStore> = DeterministicLockStore::new();
    let locks = LockManager::new(store.clone(), PREFIX);

    locks.create(0, LockDetails::new("/keep", LockDuration::Infinite)).await.unwrap();
    store.collect_expired(PREFIX, i64::MAX).await.unwrap();

    let snapshot = store.snapshot(PREFIX).await;
    assert_eq!(snapshot.tokens.len(), 1);
    assert!(snapshot.expiry.is_empty());
    check_consistent(&snapshot).unwrap();
}
