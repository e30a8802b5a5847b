//! Property-based tests for bilateral settlement validation.
//!
//! - The bilateral figure agrees with the full matrix for any pair
//! - Amounts up to the outstanding magnitude are accepted, larger ones rejected
//! - Non-positive amounts are always rejected

use proptest::prelude::*;
use rust_decimal::Decimal;
use splitledger_shared::types::{ExpenseId, GroupId, UserId};

use super::error::LedgerError;
use super::matrix::DebtMatrix;
use super::types::{Expense, ExpenseSplit, GroupMember};
use super::validation::SettlementValidator;

const MEMBERS: usize = 4;

/// Strategy for expenses as `(payer, [(member, cents)])` over four members.
fn expenses_strategy() -> impl Strategy<Value = Vec<(usize, Vec<(usize, i64)>)>> {
    prop::collection::vec(
        (
            0..MEMBERS,
            prop::collection::vec((0..MEMBERS, 0i64..50_000), 1..=MEMBERS),
        ),
        0..10,
    )
}

/// Strategy to generate a positive amount (0.01 to 1,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-positive amount (-1,000.00 to 0).
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-100_000i64..=0).prop_map(|cents| Decimal::new(cents, 2))
}

fn fixture(raw: &[(usize, Vec<(usize, i64)>)]) -> (Vec<GroupMember>, Vec<Expense>) {
    let group_id = GroupId::new();
    let users: Vec<UserId> = (0..MEMBERS).map(|_| UserId::new()).collect();
    let members = users
        .iter()
        .map(|&user_id| GroupMember {
            group_id,
            user_id,
            display_name: user_id.to_string(),
        })
        .collect();
    let expenses = raw
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
    (members, expenses)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* expenses and pair, the bilateral outstanding SHALL equal
    /// `debt[A][B] - debt[B][A]` of the full matrix.
    #[test]
    fn prop_bilateral_matches_matrix(
        raw in expenses_strategy(),
        a in 0..MEMBERS,
        b in 0..MEMBERS,
    ) {
        prop_assume!(a != b);
        let (members, expenses) = fixture(&raw);
        let (ua, ub) = (members[a].user_id, members[b].user_id);
        let matrix = DebtMatrix::build(&members, &expenses, &[]).expect("consistent");

        prop_assert_eq!(
            SettlementValidator::outstanding_between(ua, ub, &expenses, &[]).unwrap(),
            matrix.debt(ua, ub) - matrix.debt(ub, ua)
        );
    }

    /// *For any* pair, swapping the roles SHALL negate the outstanding figure.
    #[test]
    fn prop_outstanding_is_antisymmetric(
        raw in expenses_strategy(),
        a in 0..MEMBERS,
        b in 0..MEMBERS,
    ) {
        prop_assume!(a != b);
        let (members, expenses) = fixture(&raw);
        let (ua, ub) = (members[a].user_id, members[b].user_id);

        prop_assert_eq!(
            SettlementValidator::outstanding_between(ua, ub, &expenses, &[]).unwrap(),
            -SettlementValidator::outstanding_between(ub, ua, &expenses, &[]).unwrap()
        );
    }

    /// *For any* proposed amount, validation SHALL accept exactly the amounts
    /// up to the outstanding magnitude.
    #[test]
    fn prop_accepts_iff_within_outstanding(
        raw in expenses_strategy(),
        a in 0..MEMBERS,
        b in 0..MEMBERS,
        amount in positive_amount(),
    ) {
        prop_assume!(a != b);
        let (members, expenses) = fixture(&raw);
        let (ua, ub) = (members[a].user_id, members[b].user_id);
        let outstanding = SettlementValidator::outstanding_between(ua, ub, &expenses, &[]).unwrap();

        let result = SettlementValidator::validate(ua, ub, amount, &expenses, &[]);
        if amount <= outstanding.abs() {
            prop_assert_eq!(result.ok(), Some(outstanding));
        } else {
            let is_exceeds = matches!(result, Err(LedgerError::ExceedsOutstandingDebt { .. }));
            prop_assert!(is_exceeds);
        }
    }

    /// *For any* non-positive amount, validation SHALL reject with NonPositiveAmount.
    #[test]
    fn prop_non_positive_rejected(
        raw in expenses_strategy(),
        amount in non_positive_amount(),
    ) {
        let (members, expenses) = fixture(&raw);
        let result = SettlementValidator::validate(
            members[0].user_id,
            members[1].user_id,
            amount,
            &expenses,
            &[],
        );
        let is_non_positive = matches!(result, Err(LedgerError::NonPositiveAmount));
        prop_assert!(is_non_positive);
    }
}
