//! Persistence seam for ledger records.
//!
//! The engine never owns records. It reads group-scoped snapshots and asks the
//! store to record validated settlements through this trait.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use splitledger_shared::types::{GroupId, UserId};
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

use super::error::LedgerError;
use super::types::{Expense, GroupMember, GroupSnapshot, NewSettlement, Settlement};

/// Record store operation error.
///
/// These are infrastructure failures, as opposed to ledger rule violations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused to persist a record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A settlement amount the store cannot represent.
    #[error("unrepresentable amount: {0}")]
    InvalidAmount(Decimal),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Exclusive hold on settlement recording for one pair of members.
///
/// Dropping the guard releases the pair, then runs the release hook if any.
pub struct PairGuard {
    guard: Option<OwnedMutexGuard<()>>,
    on_release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl PairGuard {
    /// Wraps an acquired pair lock.
    #[must_use]
    pub fn new(guard: OwnedMutexGuard<()>) -> Self {
        Self {
            guard: Some(guard),
            on_release: None,
        }
    }

    /// Wraps an acquired pair lock and runs `on_release` once it is unlocked.
    ///
    /// Stores use the hook to evict idle locks from their lock table.
    #[must_use]
    pub fn with_release(
        guard: OwnedMutexGuard<()>,
        on_release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            guard: Some(guard),
            on_release: Some(Box::new(on_release)),
        }
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        // Unlock first so the hook sees no reference from this guard.
        drop(self.guard.take());
        if let Some(on_release) = self.on_release.take() {
            on_release();
        }
    }
}

impl fmt::Debug for PairGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairGuard")
            .field("held", &self.guard.is_some())
            .field("has_release_hook", &self.on_release.is_some())
            .finish()
    }
}

/// Group-scoped access to members, expenses and settlements.
///
/// Implementations must serialize settlement recording per pair while a
/// [`PairGuard`] for that pair is held, so two concurrent validations cannot
/// both spend the same outstanding debt.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lists the members of a group.
    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, StoreError>;

    /// Lists the expenses of a group, each with its splits.
    async fn list_expenses_with_splits(&self, group_id: GroupId)
    -> Result<Vec<Expense>, StoreError>;

    /// Lists every completed settlement of a group.
    async fn list_completed_settlements(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Settlement>, StoreError>;

    /// Lists completed settlements between `a` and `b`, in either direction.
    async fn list_completed_settlements_between(
        &self,
        group_id: GroupId,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Settlement>, StoreError>;

    /// Persists a completed settlement and returns it.
    async fn record_settlement(&self, settlement: NewSettlement) -> Result<Settlement, StoreError>;

    /// Acquires the settlement lock for the unordered pair `{a, b}`.
    async fn lock_pair(&self, group_id: GroupId, a: UserId, b: UserId) -> PairGuard;

    /// Reads every record of a group.
    ///
    /// The default issues the three list calls one after another. Stores that
    /// can read atomically should override it.
    async fn load_snapshot(&self, group_id: GroupId) -> Result<GroupSnapshot, StoreError> {
        Ok(GroupSnapshot {
            members: self.list_members(group_id).await?,
            expenses: self.list_expenses_with_splits(group_id).await?,
            settlements: self.list_completed_settlements(group_id).await?,
        })
    }
}
