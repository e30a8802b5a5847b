//! Read-side projections of one built ledger.
//!
//! A [`Ledger`] is built once per request from a group snapshot. Every read
//! payload is a pure projection of it, so all of them agree with each other.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use splitledger_shared::types::{UserId, is_material};

use super::balance::{BalanceReducer, MemberBalance};
use super::error::LedgerError;
use super::matrix::DebtMatrix;
use super::minimizer::SettlementMinimizer;
use super::types::{GroupSnapshot, LedgerPolicy};

/// An amount owed to or by one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAmount {
    /// The counterparty.
    pub user_id: UserId,
    /// The counterparty's display name.
    pub display_name: String,
    /// The gross amount.
    pub amount: Decimal,
}

/// Gross debts and credits of one viewing member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtDetail {
    /// The viewing member.
    pub viewer_id: UserId,
    /// What the viewer owes, per creditor.
    pub debts: Vec<PartyAmount>,
    /// What others owe the viewer, per debtor.
    pub credits: Vec<PartyAmount>,
    /// Sum of `debts`.
    pub total_debt: Decimal,
    /// Sum of `credits`.
    pub total_credit: Decimal,
    /// `total_credit - total_debt`.
    pub net_balance: Decimal,
}

/// One row of [`MemberBalances`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalanceView {
    /// The member.
    pub user_id: UserId,
    /// The member's display name.
    pub display_name: String,
    /// `owed - owes`.
    pub net_balance: Decimal,
    /// Total the member owes.
    pub owes: Decimal,
    /// Total the member is owed.
    pub owed: Decimal,
}

/// Balances of every group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalances {
    /// One row per member, in member order.
    pub member_balances: Vec<MemberBalanceView>,
}

/// Direction of a net position relative to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetBalanceKind {
    /// The member owes the viewer.
    Owed,
    /// The viewer owes the member.
    Owes,
}

/// The viewer's netted position with one other member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalanceEntry {
    /// The other member.
    pub user_id: UserId,
    /// The other member's display name.
    pub display_name: String,
    /// `debt[member][viewer] - debt[viewer][member]`.
    pub net_amount: Decimal,
    /// Sign of `net_amount` from the viewer's perspective.
    pub kind: NetBalanceKind,
}

/// Pairwise netted positions of one viewing member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalances {
    /// The viewing member.
    pub viewer_id: UserId,
    /// Material positions, largest magnitude first.
    pub net_balances: Vec<NetBalanceEntry>,
}

/// A suggested payment with display names attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    /// Paying member.
    pub from_user_id: UserId,
    /// Paying member's display name.
    pub from_display_name: String,
    /// Receiving member.
    pub to_user_id: UserId,
    /// Receiving member's display name.
    pub to_display_name: String,
    /// Amount to pay.
    pub amount: Decimal,
}

/// The minimized settlement plan of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimalSettlements {
    /// Suggested payments.
    pub transactions: Vec<SettlementSuggestion>,
    /// Number of suggested payments.
    pub total_transactions: usize,
    /// Sum of suggested amounts.
    pub total_amount: Decimal,
    /// Number of group members.
    pub member_count: usize,
    /// `member_count - 1`, floored at zero.
    pub max_possible_transactions: usize,
}

/// A fully built, verified ledger for one group.
#[derive(Debug, Clone)]
pub struct Ledger {
    matrix: DebtMatrix,
    balances: Vec<MemberBalance>,
    names: HashMap<UserId, String>,
    policy: LedgerPolicy,
}

impl Ledger {
    /// Builds and verifies the ledger of one group snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InconsistentRecord` for malformed records, and
    /// `NegativeDebt` or `ConservationViolated` if an invariant fails.
    pub fn build(snapshot: &GroupSnapshot, policy: LedgerPolicy) -> Result<Self, LedgerError> {
        let matrix = DebtMatrix::build(
            &snapshot.members,
            &snapshot.expenses,
            &snapshot.settlements,
        )?;
        matrix.verify_non_negative()?;

        let balances = BalanceReducer::from_matrix(&matrix);
        BalanceReducer::verify_conservation(&balances)?;

        let mut names = HashMap::with_capacity(snapshot.members.len());
        for member in &snapshot.members {
            names
                .entry(member.user_id)
                .or_insert_with(|| member.display_name.clone());
        }

        Ok(Self {
            matrix,
            balances,
            names,
            policy,
        })
    }

    /// Returns the underlying debt matrix.
    #[must_use]
    pub fn matrix(&self) -> &DebtMatrix {
        &self.matrix
    }

    /// Returns per-member balances in member order.
    #[must_use]
    pub fn balances(&self) -> &[MemberBalance] {
        &self.balances
    }

    /// Returns true if `user_id` is a member of the group.
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.matrix.contains(user_id)
    }

    fn name_of(&self, user_id: UserId) -> String {
        self.names.get(&user_id).cloned().unwrap_or_default()
    }

    fn party(&self, user_id: UserId, amount: Decimal) -> PartyAmount {
        PartyAmount {
            user_id,
            display_name: self.name_of(user_id),
            amount,
        }
    }

    /// Gross debts and credits of `viewer`. Zero cells are omitted.
    #[must_use]
    pub fn debt_detail(&self, viewer: UserId) -> DebtDetail {
        let debts: Vec<_> = self
            .matrix
            .debts_of(viewer)
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .map(|(creditor, amount)| self.party(creditor, amount))
            .collect();
        let credits: Vec<_> = self
            .matrix
            .credits_of(viewer)
            .filter(|(_, amount)| *amount > Decimal::ZERO)
            .map(|(debtor, amount)| self.party(debtor, amount))
            .collect();

        // Bounded by the matrix total
        let total_debt: Decimal = debts.iter().map(|d| d.amount).sum();
        let total_credit: Decimal = credits.iter().map(|c| c.amount).sum();

        DebtDetail {
            viewer_id: viewer,
            debts,
            credits,
            total_debt,
            total_credit,
            net_balance: total_credit - total_debt,
        }
    }

    /// Balances of every member.
    #[must_use]
    pub fn member_balances(&self) -> MemberBalances {
        MemberBalances {
            member_balances: self
                .balances
                .iter()
                .map(|b| MemberBalanceView {
                    user_id: b.user_id,
                    display_name: self.name_of(b.user_id),
                    net_balance: b.net_balance,
                    owes: b.owes,
                    owed: b.owed,
                })
                .collect(),
        }
    }

    /// Netted position of `viewer` with each other member.
    ///
    /// Positions within the policy epsilon are dropped.
    #[must_use]
    pub fn net_balances(&self, viewer: UserId) -> NetBalances {
        let mut entries: Vec<NetBalanceEntry> = self
            .matrix
            .members()
            .iter()
            .filter(|&&member| member != viewer)
            .filter_map(|&member| {
                let net_amount = self.matrix.debt(member, viewer) - self.matrix.debt(viewer, member);
                if !is_material(net_amount, self.policy.epsilon()) {
                    return None;
                }
                Some(NetBalanceEntry {
                    user_id: member,
                    display_name: self.name_of(member),
                    net_amount,
                    kind: if net_amount > Decimal::ZERO {
                        NetBalanceKind::Owed
                    } else {
                        NetBalanceKind::Owes
                    },
                })
            })
            .collect();
        entries.sort_by(|a, b| b.net_amount.abs().cmp(&a.net_amount.abs()));

        NetBalances {
            viewer_id: viewer,
            net_balances: entries,
        }
    }

    /// The minimized settlement plan of the group.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the plan total overflows.
    pub fn optimal_settlements(&self) -> Result<OptimalSettlements, LedgerError> {
        let plan = SettlementMinimizer::minimize(&self.balances, self.policy.epsilon())?;

        Ok(OptimalSettlements {
            transactions: plan
                .transactions
                .into_iter()
                .map(|t| SettlementSuggestion {
                    from_display_name: self.name_of(t.from_user_id),
                    to_display_name: self.name_of(t.to_user_id),
                    from_user_id: t.from_user_id,
                    to_user_id: t.to_user_id,
                    amount: t.amount,
                })
                .collect(),
            total_transactions: plan.total_transactions,
            total_amount: plan.total_amount,
            member_count: plan.member_count,
            max_possible_transactions: plan.max_possible_transactions,
        })
    }
}
