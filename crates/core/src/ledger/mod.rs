//! Shared-expense debt ledger and netting engine.
//!
//! This module implements the core ledger functionality:
//! - Pairwise debt matrix construction with clamp-at-zero settlements
//! - Per-member balance reduction
//! - Greedy settlement minimization
//! - Bilateral settlement validation
//! - Read projections and the orchestrating ledger service
//! - The persistence seam the service runs against

pub mod balance;
pub mod error;
pub mod matrix;
pub mod minimizer;
pub mod projection;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod matrix_props;
#[cfg(test)]
mod minimizer_props;
#[cfg(test)]
mod validation_props;

pub use balance::{BalanceReducer, MemberBalance};
pub use error::LedgerError;
pub use matrix::DebtMatrix;
pub use minimizer::{SettlementMinimizer, SettlementPlan, SuggestedTransaction};
pub use projection::{
    DebtDetail, Ledger, MemberBalanceView, MemberBalances, NetBalanceEntry, NetBalanceKind,
    NetBalances, OptimalSettlements, PartyAmount, SettlementSuggestion,
};
pub use service::LedgerService;
pub use store::{LedgerStore, PairGuard, StoreError};
pub use types::{
    Expense, ExpenseSplit, GroupMember, GroupSnapshot, LedgerPolicy, NewSettlement,
    SettleCommand, Settlement, SettlementStatus,
};
pub use validation::SettlementValidator;
