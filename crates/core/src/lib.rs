//! Core business logic for SplitLedger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, netting rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Debt matrix, balances, settlement minimization and validation

pub mod ledger;
