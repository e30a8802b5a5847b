//! Per-member balance calculations.
//!
//! A member's `owes` is the sum of their row in the debt matrix and `owed` is
//! the sum of their column. `net_balance = owed - owes`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitledger_shared::types::UserId;

use super::error::LedgerError;
use super::matrix::DebtMatrix;
use super::types::{Expense, GroupMember, Settlement};

/// Member balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member.
    pub user_id: UserId,
    /// Total this member owes everyone else.
    pub owes: Decimal,
    /// Total everyone else owes this member.
    pub owed: Decimal,
    /// `owed - owes`. Positive means the member is owed money overall.
    pub net_balance: Decimal,
}

impl MemberBalance {
    /// Creates a zero balance for a member.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            owes: Decimal::ZERO,
            owed: Decimal::ZERO,
            net_balance: Decimal::ZERO,
        }
    }

    /// Adds an amount this member owes someone.
    pub(crate) fn add_owes(&mut self, amount: Decimal) {
        self.owes += amount;
        self.net_balance = self.owed - self.owes;
    }

    /// Adds an amount someone owes this member.
    pub(crate) fn add_owed(&mut self, amount: Decimal) {
        self.owed += amount;
        self.net_balance = self.owed - self.owes;
    }
}

/// Derives member balances from a debt matrix.
pub struct BalanceReducer;

impl BalanceReducer {
    /// Reduces a built matrix to one balance per member, in member order.
    ///
    /// Row and column sums are bounded by the matrix total, which
    /// [`DebtMatrix::build`] has already checked for overflow.
    #[must_use]
    pub fn from_matrix(matrix: &DebtMatrix) -> Vec<MemberBalance> {
        matrix
            .members()
            .iter()
            .map(|&user_id| {
                let mut balance = MemberBalance::new(user_id);
                for (_, amount) in matrix.debts_of(user_id) {
                    balance.add_owes(amount);
                }
                for (_, amount) in matrix.credits_of(user_id) {
                    balance.add_owed(amount);
                }
                balance
            })
            .collect()
    }

    /// Reduces raw records to member balances.
    ///
    /// Goes through the same matrix construction as every other projection,
    /// so both entry points always agree.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InconsistentRecord` if the records are malformed
    /// or `LedgerError::AmountOverflow` if their totals overflow.
    pub fn from_records(
        members: &[GroupMember],
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Vec<MemberBalance>, LedgerError> {
        let matrix = DebtMatrix::build(members, expenses, settlements)?;
        Ok(Self::from_matrix(&matrix))
    }

    /// Checks the closed-group conservation law: net balances sum to zero.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ConservationViolated` with the imbalance otherwise,
    /// or `LedgerError::AmountOverflow` if the sum cannot be represented.
    pub fn verify_conservation(balances: &[MemberBalance]) -> Result<(), LedgerError> {
        let imbalance = balances
            .iter()
            .try_fold(Decimal::ZERO, |sum, b| sum.checked_add(b.net_balance))
            .ok_or(LedgerError::AmountOverflow("conservation check"))?;
        if imbalance.is_zero() {
            Ok(())
        } else {
            Err(LedgerError::ConservationViolated { imbalance })
        }
    }
}
