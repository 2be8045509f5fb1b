//! Atomic operation bodies.
//!
//! A [`Txn`] is one indivisible execution against the store: it borrows a
//! [`StoreOps`] implementation exclusively for its lifetime and mutates the
//! layout of [`crate::schema`]. Backends run exactly one public method per
//! [`crate::store::LockStore`] call, inside whatever mechanism guarantees the
//! body completes without interleaving (a mutex in process, a script engine
//! on a server).
//!
//! Every mutating operation except release begins with the expiration sweep,
//! so expired locks can never satisfy or obstruct a precondition.

mod confirm;
mod create;
mod node;
mod refresh;
mod release;
mod sweep;
mod unlock;

use crate::schema::KeySchema;
use crate::store::StoreOps;

/// One atomic execution of a lock operation.
pub struct Txn<'a, S: StoreOps + ?Sized> {
    store: &'a mut S,
    keys: KeySchema,
}

impl<'a, S: StoreOps + ?Sized> Txn<'a, S> {
    /// Bind an execution to a store and a namespace prefix.
    pub fn new(store: &'a mut S, prefix: &str) -> Self {
        Self {
            store,
            keys: KeySchema::new(prefix),
        }
    }
}
