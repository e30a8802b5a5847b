//! Property-based tests for debt matrix construction and balance reduction.
//!
//! - Every cell is non-negative, whatever the settlements
//! - Oversized settlements clamp at zero
//! - Net balances always sum to zero
//! - Settlement order does not change the matrix

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use splitledger_shared::types::{ExpenseId, GroupId, SettlementId, UserId};

use super::balance::BalanceReducer;
use super::matrix::DebtMatrix;
use super::projection::Ledger;
use super::types::{
    Expense, ExpenseSplit, GroupMember, GroupSnapshot, LedgerPolicy, Settlement, SettlementStatus,
};

/// Raw expense shape: payer index and `(member index, cents)` shares.
type RawExpense = (usize, Vec<(usize, i64)>);
/// Raw settlement shape: from index, to index, cents.
type RawSettlement = (usize, usize, i64);

/// Strategy for a group size plus expenses and settlements over it.
fn group_strategy() -> impl Strategy<Value = (usize, Vec<RawExpense>, Vec<RawSettlement>)> {
    (2usize..=6).prop_flat_map(|n| {
        let expense = (0..n, prop::collection::vec((0..n, 0i64..50_000), 1..=4));
        let settlement = (0..n, 0..n, 1i64..80_000);
        (
            Just(n),
            prop::collection::vec(expense, 0..8),
            prop::collection::vec(settlement, 0..6),
        )
    })
}

/// Builds a concrete snapshot from the raw shape.
fn snapshot(n: usize, expenses: &[RawExpense], settlements: &[RawSettlement]) -> GroupSnapshot {
    let group_id = GroupId::new();
    let users: Vec<UserId> = (0..n).map(|_| UserId::new()).collect();

    let members = users
        .iter()
        .enumerate()
        .map(|(i, &user_id)| GroupMember {
            group_id,
            user_id,
            display_name: format!("member-{i}"),
        })
        .collect();

    let expenses = expenses
        .iter()
        .map(|(payer, shares)| {
            let id = ExpenseId::new();
            Expense {
                id,
                group_id,
                paid_by: users[*payer],
                splits: shares
                    .iter()
                    .map(|&(who, cents)| ExpenseSplit {
                        expense_id: id,
                        user_id: users[who],
                        amount: Decimal::new(cents, 2),
                    })
                    .collect(),
            }
        })
        .collect();

    let settlements = settlements
        .iter()
        .map(|&(from, to, cents)| Settlement {
            id: SettlementId::new(),
            group_id,
            from_user_id: users[from],
            to_user_id: users[to],
            amount: Decimal::new(cents, 2),
            status: SettlementStatus::Completed,
            settled_at: Utc::now(),
        })
        .collect();

    GroupSnapshot {
        members,
        expenses,
        settlements,
    }
}

fn build(snapshot: &GroupSnapshot) -> DebtMatrix {
    DebtMatrix::build(&snapshot.members, &snapshot.expenses, &snapshot.settlements)
        .expect("generated records are consistent")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* records, every matrix cell SHALL be non-negative.
    #[test]
    fn prop_cells_never_negative((n, expenses, settlements) in group_strategy()) {
        let snap = snapshot(n, &expenses, &settlements);
        let matrix = build(&snap);

        prop_assert!(matrix.verify_non_negative().is_ok());
        for &debtor in matrix.members() {
            for (_, amount) in matrix.debts_of(debtor) {
                prop_assert!(amount >= Decimal::ZERO);
            }
        }
    }

    /// *For any* records, net balances SHALL sum to exactly zero.
    #[test]
    fn prop_conservation((n, expenses, settlements) in group_strategy()) {
        let snap = snapshot(n, &expenses, &settlements);
        let balances = BalanceReducer::from_matrix(&build(&snap));

        let total: Decimal = balances.iter().map(|b| b.net_balance).sum();
        prop_assert_eq!(total, Decimal::ZERO);
        for b in &balances {
            prop_assert!(b.owes >= Decimal::ZERO);
            prop_assert!(b.owed >= Decimal::ZERO);
        }
    }

    /// *For any* cell, settling more than its debt SHALL leave it at zero.
    #[test]
    fn prop_oversized_settlement_clamps(
        (n, expenses, _) in group_strategy(),
        extra_cents in 1i64..100_000,
    ) {
        let snap = snapshot(n, &expenses, &[]);
        let mut matrix = build(&snap);
        let (from, to) = (matrix.members()[1], matrix.members()[0]);
        let before = matrix.debt(from, to);
        let reverse = matrix.debt(to, from);

        let applied = matrix.apply_settlement(from, to, before + Decimal::new(extra_cents, 2));

        prop_assert_eq!(applied, before);
        prop_assert_eq!(matrix.debt(from, to), Decimal::ZERO);
        prop_assert_eq!(matrix.debt(to, from), reverse);
    }

    /// *For any* records, reversing the settlement order SHALL give the same matrix.
    #[test]
    fn prop_settlement_order_commutes((n, expenses, settlements) in group_strategy()) {
        let snap = snapshot(n, &expenses, &settlements);
        let mut reversed = snap.clone();
        reversed.settlements.reverse();

        prop_assert_eq!(build(&snap), build(&reversed));
    }

    /// *For any* records, the built ledger SHALL pass its own invariant checks
    /// and give identical projections when built twice.
    #[test]
    fn prop_ledger_builds_and_reads_are_idempotent(
        (n, expenses, settlements) in group_strategy(),
    ) {
        let snap = snapshot(n, &expenses, &settlements);
        let first = Ledger::build(&snap, LedgerPolicy::default());
        prop_assert!(first.is_ok());
        let first = first.expect("checked above");
        let second = Ledger::build(&snap, LedgerPolicy::default()).expect("same input");

        let viewer = snap.members[0].user_id;
        prop_assert_eq!(first.debt_detail(viewer), second.debt_detail(viewer));
        prop_assert_eq!(first.member_balances(), second.member_balances());
        prop_assert_eq!(first.net_balances(viewer), second.net_balances(viewer));
        prop_assert_eq!(first.optimal_settlements().unwrap(), second.optimal_settlements().unwrap());
    }

    /// *For any* viewer, debt detail totals SHALL match the viewer's member balance.
    #[test]
    fn prop_debt_detail_matches_member_balance(
        (n, expenses, settlements) in group_strategy(),
    ) {
        let snap = snapshot(n, &expenses, &settlements);
        let ledger = Ledger::build(&snap, LedgerPolicy::default()).expect("consistent");

        for balance in ledger.balances() {
            let detail = ledger.debt_detail(balance.user_id);
            prop_assert_eq!(detail.total_debt, balance.owes);
            prop_assert_eq!(detail.total_credit, balance.owed);
            prop_assert_eq!(detail.net_balance, balance.net_balance);
        }
    }
}
