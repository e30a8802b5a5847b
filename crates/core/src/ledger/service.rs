//! Ledger service: membership checks and orchestration over a record store.
//!
//! Reads load one group snapshot, build the ledger once and project it.
//! Settling validates against the bilateral records while holding the pair
//! lock, then asks the store to persist the settlement.

use std::sync::Arc;

use rust_decimal::Decimal;
use splitledger_shared::types::{GroupId, UserId};

use super::error::LedgerError;
use super::projection::{DebtDetail, Ledger, MemberBalances, NetBalances, OptimalSettlements};
use super::store::LedgerStore;
use super::types::{GroupSnapshot, LedgerPolicy, NewSettlement, SettleCommand, Settlement};
use super::validation::SettlementValidator;

/// Orchestrates ledger reads and settlement recording for groups.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    policy: LedgerPolicy,
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LedgerService {
    /// Creates a service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, policy: LedgerPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the policy applied to every computation.
    #[must_use]
    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    async fn ledger_for(&self, group_id: GroupId, viewer: UserId) -> Result<Ledger, LedgerError> {
        let snapshot = self.store.load_snapshot(group_id).await?;
        Self::ensure_member(&snapshot, viewer)?;
        Ledger::build(&snapshot, self.policy)
    }

    fn ensure_member(snapshot: &GroupSnapshot, user_id: UserId) -> Result<(), LedgerError> {
        if snapshot.members.iter().any(|m| m.user_id == user_id) {
            Ok(())
        } else {
            Err(LedgerError::NotAMember(user_id))
        }
    }

    /// Gross debts and credits of `viewer` in a group.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotAMember` if `viewer` is not in the group, or
    /// an internal error if the records are inconsistent.
    pub async fn debt_detail(
        &self,
        group_id: GroupId,
        viewer: UserId,
    ) -> Result<DebtDetail, LedgerError> {
        Ok(self.ledger_for(group_id, viewer).await?.debt_detail(viewer))
    }

    /// Balances of every member of a group.
    ///
    /// # Errors
    ///
    /// Same as [`Self::debt_detail`].
    pub async fn member_balances(
        &self,
        group_id: GroupId,
        viewer: UserId,
    ) -> Result<MemberBalances, LedgerError> {
        Ok(self.ledger_for(group_id, viewer).await?.member_balances())
    }

    /// Netted positions of `viewer` with every other member.
    ///
    /// # Errors
    ///
    /// Same as [`Self::debt_detail`].
    pub async fn net_balances(
        &self,
        group_id: GroupId,
        viewer: UserId,
    ) -> Result<NetBalances, LedgerError> {
        Ok(self.ledger_for(group_id, viewer).await?.net_balances(viewer))
    }

    /// The minimized settlement plan of a group.
    ///
    /// # Errors
    ///
    /// Same as [`Self::debt_detail`].
    pub async fn optimal_settlements(
        &self,
        group_id: GroupId,
        viewer: UserId,
    ) -> Result<OptimalSettlements, LedgerError> {
        self.ledger_for(group_id, viewer).await?.optimal_settlements()
    }

    /// Records a payment from `acting` to the command's target.
    ///
    /// Steps:
    /// 1. `acting` must be a group member
    /// 2. The amount must be positive and the target must be another member
    /// 3. Under the pair lock, the amount is checked against the bilateral
    ///    outstanding debt and the settlement is recorded
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotAMember` if `acting` is not in the group
    /// - `LedgerError::NonPositiveAmount`, `SelfSettlement` or
    ///   `UnknownCounterparty` for invalid input
    /// - `LedgerError::ExceedsOutstandingDebt` if the amount is too large
    /// - `LedgerError::Store` if the store fails
    pub async fn settle(
        &self,
        group_id: GroupId,
        acting: UserId,
        command: SettleCommand,
    ) -> Result<Settlement, LedgerError> {
        let members = self.store.list_members(group_id).await?;
        if !members.iter().any(|m| m.user_id == acting) {
            return Err(LedgerError::NotAMember(acting));
        }
        if command.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        if command.to_user_id == acting {
            return Err(LedgerError::SelfSettlement);
        }
        if !members.iter().any(|m| m.user_id == command.to_user_id) {
            return Err(LedgerError::UnknownCounterparty(command.to_user_id));
        }

        let _pair = self
            .store
            .lock_pair(group_id, acting, command.to_user_id)
            .await;

        let expenses = self.store.list_expenses_with_splits(group_id).await?;
        let settlements = self
            .store
            .list_completed_settlements_between(group_id, acting, command.to_user_id)
            .await?;

        SettlementValidator::validate(
            acting,
            command.to_user_id,
            command.amount,
            &expenses,
            &settlements,
        )?;

        let settlement = self
            .store
            .record_settlement(NewSettlement {
                group_id,
                from_user_id: acting,
                to_user_id: command.to_user_id,
                amount: command.amount,
            })
            .await?;

        Ok(settlement)
    }
}
