//! Pairwise debt matrix construction.
//!
//! The matrix holds, for every ordered pair of distinct members, the gross
//! amount the first member (debtor) owes the second (creditor). Cells are
//! never netted against each other and never negative.
//!
//! Construction happens in two phases: every expense split is accumulated
//! first, then every completed settlement is subtracted with clamping at zero.
//! Because all settlement amounts are positive, successive clamped
//! subtractions on one cell commute, so settlement order does not matter.
//!
//! The sum of all split debts must fit in a `Decimal`. Every row, column and
//! net balance derived from the matrix is bounded by that sum, so downstream
//! totals cannot overflow once a matrix is built.

use std::collections::HashMap;

use rust_decimal::Decimal;
use splitledger_shared::types::UserId;

use super::error::LedgerError;
use super::types::{Expense, GroupMember, Settlement};

/// Gross pairwise debts between the members of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtMatrix {
    members: Vec<UserId>,
    index: HashMap<UserId, usize>,
    /// Row-major `n * n` cells; row = debtor, column = creditor.
    cells: Vec<Decimal>,
}

impl DebtMatrix {
    /// Creates an all-zero matrix over the given members.
    ///
    /// Duplicate member IDs are ignored after their first occurrence.
    #[must_use]
    pub fn new(members: impl IntoIterator<Item = UserId>) -> Self {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for user_id in members {
            if !index.contains_key(&user_id) {
                index.insert(user_id, ordered.len());
                ordered.push(user_id);
            }
        }
        let n = ordered.len();
        Self {
            members: ordered,
            index,
            cells: vec![Decimal::ZERO; n * n],
        }
    }

    /// Builds the debt matrix for one group from its raw records.
    ///
    /// 1. Every split whose member is not the payer adds to `debt[member][payer]`.
    /// 2. Every completed settlement subtracts from `debt[from][to]`, clamped at zero.
    ///
    /// Settlements that are not completed, or that name a non-member, are ignored.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InconsistentRecord` if an expense references a
    /// non-member, a split amount is negative, or a completed settlement
    /// amount is not positive. Returns `LedgerError::AmountOverflow` if the
    /// accumulated debts leave the `Decimal` range.
    pub fn build(
        members: &[GroupMember],
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Self, LedgerError> {
        let mut matrix = Self::new(members.iter().map(|m| m.user_id));
        let mut total = Decimal::ZERO;

        for expense in expenses {
            matrix.apply_expense(expense, &mut total)?;
        }

        for settlement in settlements.iter().filter(|s| s.is_completed()) {
            if settlement.amount <= Decimal::ZERO {
                return Err(LedgerError::InconsistentRecord(format!(
                    "settlement {} has non-positive amount {}",
                    settlement.id, settlement.amount
                )));
            }
            matrix.apply_settlement(settlement.from_user_id, settlement.to_user_id, settlement.amount);
        }

        Ok(matrix)
    }

    fn apply_expense(&mut self, expense: &Expense, total: &mut Decimal) -> Result<(), LedgerError> {
        if !self.contains(expense.paid_by) {
            return Err(LedgerError::InconsistentRecord(format!(
                "expense {} was paid by non-member {}",
                expense.id, expense.paid_by
            )));
        }

        for split in &expense.splits {
            if split.amount < Decimal::ZERO {
                return Err(LedgerError::InconsistentRecord(format!(
                    "expense {} has negative split {} for {}",
                    expense.id, split.amount, split.user_id
                )));
            }
            // Paying your own share creates no debt
            if split.user_id == expense.paid_by {
                continue;
            }
            let Some(cell) = self.cell_index(split.user_id, expense.paid_by) else {
                return Err(LedgerError::InconsistentRecord(format!(
                    "expense {} has a split for non-member {}",
                    expense.id, split.user_id
                )));
            };
            *total = total
                .checked_add(split.amount)
                .ok_or(LedgerError::AmountOverflow("debt matrix"))?;
            // Bounded by `total`, so this cannot overflow
            self.cells[cell] += split.amount;
        }

        Ok(())
    }

    /// Reduces what `from` owes `to` by `amount`, never going below zero.
    ///
    /// Returns the amount actually applied; zero when the pair has no debt or
    /// either party is not a member.
    pub fn apply_settlement(&mut self, from: UserId, to: UserId, amount: Decimal) -> Decimal {
        let Some(cell) = self.cell_index(from, to) else {
            return Decimal::ZERO;
        };
        let current = self.cells[cell];
        let reduced = (current - amount).max(Decimal::ZERO);
        self.cells[cell] = reduced;
        current - reduced
    }

    fn cell_index(&self, debtor: UserId, creditor: UserId) -> Option<usize> {
        if debtor == creditor {
            return None;
        }
        let row = *self.index.get(&debtor)?;
        let col = *self.index.get(&creditor)?;
        Some(row * self.members.len() + col)
    }

    /// Returns the members in the order the matrix was built with.
    #[must_use]
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the matrix has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if `user_id` is one of the matrix members.
    #[must_use]
    pub fn contains(&self, user_id: UserId) -> bool {
        self.index.contains_key(&user_id)
    }

    /// Returns what `debtor` owes `creditor` (zero for unknown or identical members).
    #[must_use]
    pub fn debt(&self, debtor: UserId, creditor: UserId) -> Decimal {
        self.cell_index(debtor, creditor)
            .map_or(Decimal::ZERO, |cell| self.cells[cell])
    }

    /// Iterates over what `debtor` owes every other member, in member order.
    pub fn debts_of(&self, debtor: UserId) -> impl Iterator<Item = (UserId, Decimal)> + '_ {
        self.members
            .iter()
            .filter(move |&&creditor| creditor != debtor)
            .map(move |&creditor| (creditor, self.debt(debtor, creditor)))
    }

    /// Iterates over what every other member owes `creditor`, in member order.
    pub fn credits_of(&self, creditor: UserId) -> impl Iterator<Item = (UserId, Decimal)> + '_ {
        self.members
            .iter()
            .filter(move |&&debtor| debtor != creditor)
            .map(move |&debtor| (debtor, self.debt(debtor, creditor)))
    }

    /// Checks that no cell is negative.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeDebt` for the first negative cell found.
    pub fn verify_non_negative(&self) -> Result<(), LedgerError> {
        let n = self.members.len();
        match self.cells.iter().position(|c| c.is_sign_negative() && !c.is_zero()) {
            None => Ok(()),
            Some(cell) => Err(LedgerError::NegativeDebt {
                debtor: self.members[cell / n],
                creditor: self.members[cell % n],
                amount: self.cells[cell],
            }),
        }
    }
}
