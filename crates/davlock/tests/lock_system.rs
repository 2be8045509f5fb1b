//! End-to-end behavior of the lock system against the deterministic backend,
//! with the consistency checker run between steps.

use std::sync::Arc;

use davlock::DeterministicLockStore;
use davlock::LockManager;
use davlock_testing::check_consistent;
use davlock_types::Condition;
use davlock_types::LockDetails;
use davlock_types::LockDuration;
use davlock_types::LockError;

const PREFIX: &str = "webdavtest:";

fn manager() -> (Arc<DeterministicLockStore>, LockManager<DeterministicLockStore>) {
    let store = DeterministicLockStore::new();
    let locks = LockManager::new(store.clone(), PREFIX);
    (store, locks)
}

async fn assert_consistent(store: &DeterministicLockStore) {
    check_consistent(&store.snapshot(PREFIX).await).unwrap();
}

fn details(root: &str, duration: LockDuration, zero_depth: bool) -> LockDetails {
    LockDetails {
        root: root.to_string(),
        duration,
        owner_xml: "<owner />".to_string(),
        zero_depth,
    }
}

#[tokio::test]
async fn confirm_hold_and_release_sequence() {
    let now = 0;
    let (store, locks) = manager();

    let alice = locks
        .create(now, details("/alice", LockDuration::Infinite, false))
        .await
        .unwrap();
    let tweedle = locks
        .create(now, details("/tweedle", LockDuration::Infinite, false))
        .await
        .unwrap();
    assert_consistent(&store).await;

    // A name under one lock does not confirm against another lock's token.
    let err = locks
        .confirm(now, "/tweedle/dee", "", &[Condition::new(alice.as_str())])
        .await
        .unwrap_err();
    assert_eq!(err, LockError::ConfirmationFailed);
    assert_consistent(&store).await;

    // Two names under the same infinite-depth lock confirm as one hold.
    let release = locks
        .confirm(
            now,
            "/tweedle/dee",
            "/tweedle/dum",
            &[Condition::new(tweedle.as_str())],
        )
        .await
        .unwrap();
    assert_eq!(release.roots(), (Some("/tweedle"), None));
    assert_consistent(&store).await;
    release.release().await.unwrap();
    assert_consistent(&store).await;

    // Overlapping confirmations of the two names: while the lock is held for
    // the first, the second cannot confirm.
    let release_dee = locks
        .confirm(now, "/tweedle/dee", "", &[Condition::new(tweedle.as_str())])
        .await
        .unwrap();
    assert_consistent(&store).await;

    let err = locks
        .confirm(now, "/tweedle/dum", "", &[Condition::new(tweedle.as_str())])
        .await
        .unwrap_err();
    assert_eq!(err, LockError::ConfirmationFailed);
    assert_consistent(&store).await;

    release_dee.release().await.unwrap();
    assert_consistent(&store).await;

    let release_dum = locks
        .confirm(now, "/tweedle/dum", "", &[Condition::new(tweedle.as_str())])
        .await
        .unwrap();
    assert_consistent(&store).await;

    // A held lock cannot be unlocked.
    let err = locks.unlock(now, tweedle.as_str()).await.unwrap_err();
    assert_eq!(err, LockError::Locked);

    release_dum.release().await.unwrap();
    assert_consistent(&store).await;

    locks.unlock(now, tweedle.as_str()).await.unwrap();
    assert_consistent(&store).await;
}

#[tokio::test]
async fn conflict_matrix() {
    // (existing depth at /p1/p2, new path, new depth, allowed)
    let cases = [
        (true, "/p1/p2", true, false),
        (true, "/p1/p2", false, false),
        (true, "/p1", true, true),
        (true, "/p1", false, false),
        (true, "/p1/p2/p3", true, true),
        (true, "/p1/p2/p3", false, true),
        (false, "/p1/p2", true, false),
        (false, "/p1/p2", false, false),
        (false, "/p1", true, true),
        (false, "/p1", false, false),
        (false, "/p1/p2/p3", true, false),
        (false, "/p1/p2/p3", false, false),
    ];

    for (existing_zero_depth, new_path, new_zero_depth, allowed) in cases {
        let (store, locks) = manager();
        locks
            .create(0, details("/p1/p2", LockDuration::Seconds(300), existing_zero_depth))
            .await
            .unwrap();

        let result = locks
            .create(0, details(new_path, LockDuration::Seconds(300), new_zero_depth))
            .await;
        assert_eq!(
            result.is_ok(),
            allowed,
            "existing zero_depth={existing_zero_depth}, new {new_path} zero_depth={new_zero_depth}"
        );
        assert_consistent(&store).await;
    }
}

#[tokio::test]
async fn non_canonical_root_is_stored_clean_and_unlocks_clean() {
    let now = 0;
    let (store, locks) = manager();

    let token = locks
        .create(now, details("/foo/./bar//", LockDuration::Seconds(1), false))
        .await
        .unwrap();
    assert_consistent(&store).await;

    let snapshot = store.snapshot(PREFIX).await;
    assert_eq!(snapshot.tokens[token.as_str()], "/foo/bar");

    locks.unlock(now, token.as_str()).await.unwrap();
    assert_consistent(&store).await;

    let snapshot = store.snapshot(PREFIX).await;
    assert!(snapshot.nodes.is_empty());
    assert!(snapshot.tokens.is_empty());
    assert!(snapshot.expiry.is_empty());
}

#[tokio::test]
async fn unlock_twice_reports_no_such_lock() {
    let (store, locks) = manager();
    let token = locks
        .create(0, details("/a", LockDuration::Seconds(60), true))
        .await
        .unwrap();

    locks.unlock(0, token.as_str()).await.unwrap();
    let err = locks.unlock(0, token.as_str()).await.unwrap_err();
    assert_eq!(err, LockError::NoSuchLock);
    assert_consistent(&store).await;
}

#[tokio::test]
async fn held_locks_survive_attempts_but_not_release() {
    let now = 0;
    let (store, locks) = manager();
    let token = locks
        .create(now, details("/doc", LockDuration::Seconds(300), true))
        .await
        .unwrap();

    let guard = locks
        .confirm(now, "/doc", "", &[Condition::new(token.as_str())])
        .await
        .unwrap();

    // While held: refresh and unlock are refused, and a second confirm
    // cannot match the held lock.
    assert_eq!(
        locks.refresh(now, token.as_str(), LockDuration::Seconds(600)).await.unwrap_err(),
        LockError::Locked
    );
    assert_eq!(locks.unlock(now, token.as_str()).await.unwrap_err(), LockError::Locked);
    assert_eq!(
        locks
            .confirm(now, "/doc", "", &[Condition::new(token.as_str())])
            .await
            .unwrap_err(),
        LockError::ConfirmationFailed
    );
    assert_consistent(&store).await;

    guard.release().await.unwrap();
    assert_consistent(&store).await;
    locks.unlock(now, token.as_str()).await.unwrap();
    assert_consistent(&store).await;
}

#[tokio::test]
async fn held_locks_do_not_expire() {
    let (store, locks) = manager();
    let token = locks
        .create(0, details("/doc", LockDuration::Seconds(5), true))
        .await
        .unwrap();

    let guard = locks
        .confirm(0, "/doc", "", &[Condition::new(token.as_str())])
        .await
        .unwrap();

    // Long past the nominal expiry, the held lock is still there.
    store.collect_expired(PREFIX, 1000).await.unwrap();
    assert_eq!(store.snapshot(PREFIX).await.tokens.len(), 1);
    assert_consistent(&store).await;

    // Released with its original expiry of 5, it is overdue and collected by
    // the next sweep.
    guard.release().await.unwrap();
    assert_consistent(&store).await;
    store.collect_expired(PREFIX, 1000).await.unwrap();
    assert!(store.snapshot(PREFIX).await.tokens.is_empty());
    assert_consistent(&store).await;
}
