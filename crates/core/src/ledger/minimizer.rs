//! Greedy settlement minimization.
//!
//! Matches the largest remaining creditor with the largest remaining debtor
//! until one side runs out. Every step fully settles at least one party, so
//! the plan never has more than `member_count - 1` transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitledger_shared::types::{UserId, is_material};

use super::balance::MemberBalance;
use super::error::LedgerError;

/// A recommended payment. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedTransaction {
    /// The member who should pay.
    pub from_user_id: UserId,
    /// The member who should receive.
    pub to_user_id: UserId,
    /// Amount to pay (always greater than the policy epsilon).
    pub amount: Decimal,
}

/// Result of minimizing a group's balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Suggested payments in the order they were matched.
    pub transactions: Vec<SuggestedTransaction>,
    /// Number of suggested payments.
    pub total_transactions: usize,
    /// Sum of all suggested amounts.
    pub total_amount: Decimal,
    /// Number of members considered.
    pub member_count: usize,
    /// Upper bound on the number of payments: `member_count - 1`.
    pub max_possible_transactions: usize,
}

#[derive(Debug)]
struct Party {
    user_id: UserId,
    remaining: Decimal,
}

/// Computes suggested settlements from net balances.
pub struct SettlementMinimizer;

impl SettlementMinimizer {
    /// Builds a settlement plan.
    ///
    /// Members with `net_balance > epsilon` are creditors and members with
    /// `net_balance < -epsilon` are debtors. Both sides are sorted by amount,
    /// largest first, with ties kept in input order.
    ///
    /// Parties are only matched while both hold more than `epsilon`, so a
    /// debtor facing only dust creditors keeps its balance.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidEpsilon` if `epsilon` is negative
    /// - `LedgerError::AmountOverflow` if the plan total leaves the `Decimal` range
    pub fn minimize(
        balances: &[MemberBalance],
        epsilon: Decimal,
    ) -> Result<SettlementPlan, LedgerError> {
        // A negative tolerance would let zero balances match forever
        if epsilon < Decimal::ZERO {
            return Err(LedgerError::InvalidEpsilon(epsilon));
        }
        let mut creditors = Self::parties(balances, epsilon, |net| net > Decimal::ZERO, |net| net);
        let mut debtors = Self::parties(balances, epsilon, |net| net < Decimal::ZERO, |net| -net);

        let mut transactions = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < creditors.len() && j < debtors.len() {
            let creditor = &mut creditors[i];
            let debtor = &mut debtors[j];
            let amount = creditor.remaining.min(debtor.remaining);

            if amount > epsilon {
                transactions.push(SuggestedTransaction {
                    from_user_id: debtor.user_id,
                    to_user_id: creditor.user_id,
                    amount,
                });
            }

            creditor.remaining -= amount;
            debtor.remaining -= amount;

            if creditor.remaining <= epsilon {
                i += 1;
            }
            if debtor.remaining <= epsilon {
                j += 1;
            }
        }

        let total_amount = transactions
            .iter()
            .try_fold(Decimal::ZERO, |total, t| total.checked_add(t.amount))
            .ok_or(LedgerError::AmountOverflow("settlement plan total"))?;

        let member_count = balances.len();
        Ok(SettlementPlan {
            total_transactions: transactions.len(),
            total_amount,
            transactions,
            member_count,
            max_possible_transactions: member_count.saturating_sub(1),
        })
    }

    fn parties(
        balances: &[MemberBalance],
        epsilon: Decimal,
        side: impl Fn(Decimal) -> bool,
        magnitude: impl Fn(Decimal) -> Decimal,
    ) -> Vec<Party> {
        let mut parties: Vec<Party> = balances
            .iter()
            .filter(|b| side(b.net_balance) && is_material(b.net_balance, epsilon))
            .map(|b| Party {
                user_id: b.user_id,
                remaining: magnitude(b.net_balance),
            })
            .collect();
        // Stable: equal amounts keep member order
        parties.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        parties
    }
}
