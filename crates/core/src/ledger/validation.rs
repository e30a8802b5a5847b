//! Settlement validation against outstanding bilateral debt.
//!
//! The validator only looks at records involving the two parties. It never
//! routes debt through other members, so a settlement can only clear what the
//! pair owe each other directly.

use rust_decimal::Decimal;
use splitledger_shared::types::UserId;

use super::error::LedgerError;
use super::types::{Expense, Settlement};

/// Validates proposed settlements between two members.
pub struct SettlementValidator;

impl SettlementValidator {
    /// Computes what `acting` owes `target` from their shared records.
    ///
    /// Positive means `acting` owes `target`; negative means `target` owes
    /// `acting`. Settlements are subtracted without clamping, and settlements
    /// that are not completed or not between exactly this pair are skipped.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the running total leaves the
    /// `Decimal` range.
    pub fn outstanding_between(
        acting: UserId,
        target: UserId,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Decimal, LedgerError> {
        let overflow = || LedgerError::AmountOverflow("bilateral outstanding debt");
        let mut outstanding = Decimal::ZERO;

        for expense in expenses {
            for split in &expense.splits {
                if expense.paid_by == target && split.user_id == acting {
                    outstanding = outstanding.checked_add(split.amount).ok_or_else(overflow)?;
                } else if expense.paid_by == acting && split.user_id == target {
                    outstanding = outstanding.checked_sub(split.amount).ok_or_else(overflow)?;
                }
            }
        }

        for settlement in settlements
            .iter()
            .filter(|s| s.is_completed() && s.is_between(acting, target))
        {
            outstanding = if settlement.from_user_id == acting {
                outstanding.checked_sub(settlement.amount)
            } else {
                outstanding.checked_add(settlement.amount)
            }
            .ok_or_else(overflow)?;
        }

        Ok(outstanding)
    }

    /// Accepts or rejects a payment of `amount` from `acting` to `target`.
    ///
    /// Returns the outstanding bilateral debt the payment was checked against.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`
    /// - `LedgerError::SelfSettlement` if `acting == target`
    /// - `LedgerError::ExceedsOutstandingDebt` if `amount > |outstanding|`
    /// - `LedgerError::AmountOverflow` if the bilateral records overflow
    pub fn validate(
        acting: UserId,
        target: UserId,
        amount: Decimal,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        if acting == target {
            return Err(LedgerError::SelfSettlement);
        }

        let outstanding = Self::outstanding_between(acting, target, expenses, settlements)?;
        if amount > outstanding.abs() {
            return Err(LedgerError::ExceedsOutstandingDebt {
                amount,
                outstanding: outstanding.abs(),
            });
        }

        Ok(outstanding)
    }
}
