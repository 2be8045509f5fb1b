//! Contract types for the davlock lock manager.
//!
//! This crate defines the public vocabulary shared by the lock engine, its
//! store backends, and callers: lock descriptions ([`LockDetails`],
//! [`LockDuration`], [`LockToken`], [`Condition`]), the typed outcome of each
//! atomic operation, and the error taxonomy ([`LockError`], [`StoreError`]).
//!
//! Nothing here touches a store. Keeping the contract in its own crate lets
//! backends and protocol front ends depend on the types without pulling in
//! the engine.

mod error;
mod lock;
mod outcome;

pub use error::LockError;
pub use error::StoreError;
pub use lock::Condition;
pub use lock::LockDetails;
pub use lock::LockDuration;
pub use lock::LockToken;
pub use outcome::ConfirmOutcome;
pub use outcome::CreateOutcome;
pub use outcome::RefreshOutcome;
pub use outcome::UnlockOutcome;
