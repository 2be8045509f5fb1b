//! Test support for the davlock lock manager.
//!
//! - [`consistency`] - reconstructs the logical lock model from a store
//!   snapshot and asserts every structural invariant; run it between the
//!   steps of any stateful test.
//! - [`fixtures`] - the canonical lock-name and duration tables shared by
//!   the randomized operation mix.

pub mod consistency;
pub mod fixtures;

pub use consistency::check_consistent;
