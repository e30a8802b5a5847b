//! Record storage for SplitLedger.
//!
//! This crate provides:
//! - `InMemoryLedgerStore`, a `LedgerStore` kept in process memory
//! - JSON group fixtures for seeding and exporting the store

pub mod fixture;
pub mod memory;

pub use fixture::{FixtureError, FixtureFile, GroupFixture};
pub use memory::InMemoryLedgerStore;
