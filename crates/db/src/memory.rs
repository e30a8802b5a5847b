//! In-memory ledger record store.
//!
//! Each group lives behind its own `tokio::sync::RwLock`, so a snapshot reads
//! members, expenses and settlements atomically. Settlement recording is
//! serialized per unordered member pair through a second map of mutexes. A
//! pair's mutex is evicted once no task holds or awaits it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use splitledger_core::ledger::{
    Expense, GroupMember, GroupSnapshot, LedgerStore, NewSettlement, PairGuard, Settlement,
    SettlementStatus, StoreError,
};
use splitledger_shared::types::{GroupId, SettlementId, UserId};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct GroupRecords {
    members: Vec<GroupMember>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

impl GroupRecords {
    fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

/// Unordered pair key: `(group, lower user, higher user)`.
type PairKey = (GroupId, UserId, UserId);

/// Ledger store that keeps every record in process memory.
///
/// Intended for development, demos and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    groups: DashMap<GroupId, Arc<RwLock<GroupRecords>>>,
    pair_locks: Arc<DashMap<PairKey, Arc<Mutex<()>>>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&self, group_id: GroupId) -> Option<Arc<RwLock<GroupRecords>>> {
        self.groups.get(&group_id).map(|g| Arc::clone(g.value()))
    }

    fn group_or_create(&self, group_id: GroupId) -> Arc<RwLock<GroupRecords>> {
        Arc::clone(&self.groups.entry(group_id).or_default())
    }

    fn pair_key(group_id: GroupId, a: UserId, b: UserId) -> PairKey {
        if a <= b { (group_id, a, b) } else { (group_id, b, a) }
    }

    /// Adds a member to a group, creating the group on first use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the user is already a member.
    pub async fn add_member(&self, member: GroupMember) -> Result<(), StoreError> {
        let group = self.group_or_create(member.group_id);
        let mut records = group.write().await;
        if records.is_member(member.user_id) {
            return Err(StoreError::InvalidRecord(format!(
                "user {} is already a member of group {}",
                member.user_id, member.group_id
            )));
        }
        records.members.push(member);
        Ok(())
    }

    /// Adds an expense with its splits.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` if the payer or a split user is not a
    /// member, a split belongs to another expense, or a split amount is negative.
    pub async fn add_expense(&self, expense: Expense) -> Result<(), StoreError> {
        let group = self.group(expense.group_id).ok_or_else(|| {
            StoreError::InvalidRecord(format!("group {} has no members", expense.group_id))
        })?;
        let mut records = group.write().await;

        if !records.is_member(expense.paid_by) {
            return Err(StoreError::InvalidRecord(format!(
                "payer {} is not a member",
                expense.paid_by
            )));
        }
        for split in &expense.splits {
            if split.expense_id != expense.id {
                return Err(StoreError::InvalidRecord(format!(
                    "split belongs to expense {}, not {}",
                    split.expense_id, expense.id
                )));
            }
            if !records.is_member(split.user_id) {
                return Err(StoreError::InvalidRecord(format!(
                    "split user {} is not a member",
                    split.user_id
                )));
            }
            if split.amount < Decimal::ZERO {
                return Err(StoreError::InvalidAmount(split.amount));
            }
        }

        records.expenses.push(expense);
        Ok(())
    }

    /// Adds an already-made settlement in any status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidAmount` for a non-positive amount and
    /// `StoreError::InvalidRecord` if either party is not a member.
    pub async fn add_settlement(&self, settlement: Settlement) -> Result<(), StoreError> {
        if settlement.amount <= Decimal::ZERO {
            return Err(StoreError::InvalidAmount(settlement.amount));
        }
        let group = self.group(settlement.group_id).ok_or_else(|| {
            StoreError::InvalidRecord(format!("group {} has no members", settlement.group_id))
        })?;
        let mut records = group.write().await;
        if !records.is_member(settlement.from_user_id) || !records.is_member(settlement.to_user_id)
        {
            return Err(StoreError::InvalidRecord(format!(
                "settlement {} names a non-member",
                settlement.id
            )));
        }
        records.settlements.push(settlement);
        Ok(())
    }

    /// Returns every settlement of a group, whatever its status.
    pub async fn all_settlements(&self, group_id: GroupId) -> Vec<Settlement> {
        match self.group(group_id) {
            Some(group) => group.read().await.settlements.clone(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, StoreError> {
        Ok(match self.group(group_id) {
            Some(group) => group.read().await.members.clone(),
            None => Vec::new(),
        })
    }

    async fn list_expenses_with_splits(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Expense>, StoreError> {
        Ok(match self.group(group_id) {
            Some(group) => group.read().await.expenses.clone(),
            None => Vec::new(),
        })
    }

    async fn list_completed_settlements(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Settlement>, StoreError> {
        Ok(self
            .all_settlements(group_id)
            .await
            .into_iter()
            .filter(Settlement::is_completed)
            .collect())
    }

    async fn list_completed_settlements_between(
        &self,
        group_id: GroupId,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Settlement>, StoreError> {
        Ok(self
            .all_settlements(group_id)
            .await
            .into_iter()
            .filter(|s| s.is_completed() && s.is_between(a, b))
            .collect())
    }

    async fn record_settlement(&self, new: NewSettlement) -> Result<Settlement, StoreError> {
        let settlement = Settlement {
            id: SettlementId::new(),
            group_id: new.group_id,
            from_user_id: new.from_user_id,
            to_user_id: new.to_user_id,
            amount: new.amount,
            status: SettlementStatus::Completed,
            settled_at: Utc::now(),
        };
        self.add_settlement(settlement.clone()).await?;

        tracing::debug!(
            group_id = %settlement.group_id,
            settlement_id = %settlement.id,
            amount = %settlement.amount,
            "Recorded settlement"
        );
        Ok(settlement)
    }

    async fn lock_pair(&self, group_id: GroupId, a: UserId, b: UserId) -> PairGuard {
        let key = Self::pair_key(group_id, a, b);
        let lock = Arc::clone(&self.pair_locks.entry(key).or_default());
        let guard = lock.lock_owned().await;
        let pair_locks = Arc::clone(&self.pair_locks);
        PairGuard::with_release(guard, move || {
            // Only the table's own reference left: no holder and no waiter.
            pair_locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        })
    }

    async fn load_snapshot(&self, group_id: GroupId) -> Result<GroupSnapshot, StoreError> {
        let Some(group) = self.group(group_id) else {
            return Ok(GroupSnapshot::default());
        };
        let records = group.read().await;
        Ok(GroupSnapshot {
            members: records.members.clone(),
            expenses: records.expenses.clone(),
            settlements: records
                .settlements
                .iter()
                .filter(|s| s.is_completed())
                .cloned()
                .collect(),
        })
    }
}
