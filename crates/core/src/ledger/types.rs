//! Ledger domain types: the records the engine consumes and the policy it applies.
//!
//! Records are owned by the persistence collaborator and are read-only here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitledger_shared::types::{
    DEFAULT_SETTLEMENT_EPSILON, ExpenseId, GroupId, SettlementId, UserId,
};

use super::error::LedgerError;

/// A participant of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// The group this membership belongs to.
    pub group_id: GroupId,
    /// The member.
    pub user_id: UserId,
    /// Name shown next to the member's amounts.
    pub display_name: String,
}

/// One member's share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    /// The expense this share belongs to.
    pub expense_id: ExpenseId,
    /// The member who owes this share.
    pub user_id: UserId,
    /// The share (must be non-negative).
    pub amount: Decimal,
}

/// An expense paid by one member and split across members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The expense ID.
    pub id: ExpenseId,
    /// The group the expense was recorded in.
    pub group_id: GroupId,
    /// The member who paid.
    pub paid_by: UserId,
    /// Shares of the expense.
    pub splits: Vec<ExpenseSplit>,
}

/// Settlement lifecycle status.
///
/// Only completed settlements reduce debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Announced but not yet confirmed.
    Pending,
    /// Paid; participates in every computation.
    Completed,
    /// Withdrawn; ignored.
    Cancelled,
}

/// A real payment recorded between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The settlement ID.
    pub id: SettlementId,
    /// The group the settlement was recorded in.
    pub group_id: GroupId,
    /// The member who paid.
    pub from_user_id: UserId,
    /// The member who received the payment.
    pub to_user_id: UserId,
    /// The amount paid (positive).
    pub amount: Decimal,
    /// Lifecycle status.
    pub status: SettlementStatus,
    /// When the payment was recorded.
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Returns true if this settlement participates in balance computation.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SettlementStatus::Completed
    }

    /// Returns true if this settlement was made between `a` and `b`, in either direction.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }
}

/// A settlement the store is asked to record after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSettlement {
    /// The group to record into.
    pub group_id: GroupId,
    /// The paying member.
    pub from_user_id: UserId,
    /// The receiving member.
    pub to_user_id: UserId,
    /// The validated amount.
    pub amount: Decimal,
}

/// A request by the acting member to pay another member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleCommand {
    /// The member being paid.
    pub to_user_id: UserId,
    /// The proposed amount.
    pub amount: Decimal,
}

/// Every record of one group, read at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Group members.
    pub members: Vec<GroupMember>,
    /// Expenses with their splits.
    pub expenses: Vec<Expense>,
    /// Completed settlements.
    pub settlements: Vec<Settlement>,
}

/// Tolerance policy for "materially zero" balances.
///
/// The tolerance is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    epsilon: Decimal,
}

impl LedgerPolicy {
    /// Creates a policy with the given tolerance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidEpsilon` if `epsilon` is negative.
    pub fn new(epsilon: Decimal) -> Result<Self, LedgerError> {
        if epsilon < Decimal::ZERO {
            return Err(LedgerError::InvalidEpsilon(epsilon));
        }
        Ok(Self { epsilon })
    }

    /// Balances whose magnitude is at or below this value are treated as settled.
    #[must_use]
    pub const fn epsilon(&self) -> Decimal {
        self.epsilon
    }
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_SETTLEMENT_EPSILON,
        }
    }
}
