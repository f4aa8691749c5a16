//! Common primitives and helpers shared by the `ledger-sim` crates.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod hex;
mod types;

// re-exports
pub use hex::*;
pub use types::*;
