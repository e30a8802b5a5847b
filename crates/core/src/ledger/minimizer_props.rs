//! Property-based tests for the settlement minimizer.
//!
//! - Never more than `member_count - 1` transactions
//! - Every amount is above epsilon
//! - Executing the plan settles every balance when no creditor is dust
//! - Material residue never remains on both sides at once

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use splitledger_shared::types::UserId;

use super::balance::MemberBalance;
use super::minimizer::{SettlementMinimizer, SettlementPlan};

/// Builds balances from net amounts, appending one member that closes the group.
fn closed_group(nets: &[Decimal]) -> Vec<MemberBalance> {
    let closing: Decimal = -nets.iter().copied().sum::<Decimal>();
    nets.iter()
        .copied()
        .chain(std::iter::once(closing))
        .map(|net| {
            let mut b = MemberBalance::new(UserId::new());
            if net >= Decimal::ZERO {
                b.add_owed(net);
            } else {
                b.add_owes(-net);
            }
            b
        })
        .collect()
}

/// Strategy for whole-unit nets (-1,000 to 1,000).
fn whole_unit_nets() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((-1_000i64..=1_000).prop_map(Decimal::from), 0..10)
}

/// Strategy for cent-precision nets (-1,000.00 to 1,000.00).
fn cent_nets() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((-100_000i64..=100_000).prop_map(|c| Decimal::new(c, 2)), 0..10)
}

/// Applies every suggested payment to the balances and returns the residuals.
fn residuals(balances: &[MemberBalance], plan: &SettlementPlan) -> HashMap<UserId, Decimal> {
    let mut nets: HashMap<UserId, Decimal> =
        balances.iter().map(|b| (b.user_id, b.net_balance)).collect();
    for t in &plan.transactions {
        *nets.entry(t.from_user_id).or_default() += t.amount;
        *nets.entry(t.to_user_id).or_default() -= t.amount;
    }
    nets
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* closed group, the plan SHALL have at most `member_count - 1`
    /// transactions and at most `creditors + debtors - 1`.
    #[test]
    fn prop_transaction_upper_bound(nets in whole_unit_nets()) {
        let balances = closed_group(&nets);
        let epsilon = dec!(0.01);
        let plan = SettlementMinimizer::minimize(&balances, epsilon).unwrap();

        prop_assert!(plan.total_transactions <= plan.max_possible_transactions);
        prop_assert_eq!(plan.max_possible_transactions, balances.len() - 1);

        let parties = balances.iter().filter(|b| b.net_balance.abs() > epsilon).count();
        prop_assert!(plan.total_transactions <= parties.saturating_sub(1));
    }

    /// *For any* closed group, every suggested amount SHALL exceed epsilon and
    /// the totals SHALL be consistent.
    #[test]
    fn prop_amounts_positive_and_totals_consistent(nets in cent_nets()) {
        let balances = closed_group(&nets);
        let epsilon = dec!(0.01);
        let plan = SettlementMinimizer::minimize(&balances, epsilon).unwrap();

        for t in &plan.transactions {
            prop_assert!(t.amount > epsilon);
            prop_assert_ne!(t.from_user_id, t.to_user_id);
        }
        prop_assert_eq!(plan.total_transactions, plan.transactions.len());
        let sum: Decimal = plan.transactions.iter().map(|t| t.amount).sum();
        prop_assert_eq!(plan.total_amount, sum);
    }

    /// *For any* closed group of whole-unit balances, executing the plan SHALL
    /// bring every balance within epsilon of zero.
    #[test]
    fn prop_plan_settles_whole_units(nets in whole_unit_nets()) {
        let balances = closed_group(&nets);
        let epsilon = dec!(0.01);
        let plan = SettlementMinimizer::minimize(&balances, epsilon).unwrap();

        for (user, residual) in residuals(&balances, &plan) {
            prop_assert!(residual.abs() <= epsilon, "{} left with {}", user, residual);
        }
    }

    /// *For any* closed group of cent balances with sub-cent epsilon, executing
    /// the plan SHALL settle every balance.
    #[test]
    fn prop_plan_settles_cents(nets in cent_nets()) {
        let balances = closed_group(&nets);
        let epsilon = dec!(0.001);
        let plan = SettlementMinimizer::minimize(&balances, epsilon).unwrap();

        for (user, residual) in residuals(&balances, &plan) {
            prop_assert!(residual.abs() <= epsilon, "{} left with {}", user, residual);
        }
    }

    /// *For any* closed group at the default epsilon, executing the plan SHALL
    /// NOT leave a creditor and a debtor both holding more than epsilon. Dust
    /// creditors are never paid, so one side may keep a material residue.
    #[test]
    fn prop_residue_is_one_sided(nets in cent_nets()) {
        let balances = closed_group(&nets);
        let epsilon = dec!(0.01);
        let plan = SettlementMinimizer::minimize(&balances, epsilon).unwrap();
        let left = residuals(&balances, &plan);

        let creditor_left = left.values().any(|r| *r > epsilon);
        let debtor_left = left.values().any(|r| *r < -epsilon);
        prop_assert!(!(creditor_left && debtor_left));
    }

    /// *For any* closed group, payers SHALL be debtors and payees creditors.
    #[test]
    fn prop_payments_flow_from_debtors_to_creditors(nets in cent_nets()) {
        let balances = closed_group(&nets);
        let plan = SettlementMinimizer::minimize(&balances, dec!(0.01)).unwrap();
        let net_of: HashMap<UserId, Decimal> =
            balances.iter().map(|b| (b.user_id, b.net_balance)).collect();

        for t in &plan.transactions {
            prop_assert!(net_of[&t.from_user_id] < Decimal::ZERO);
            prop_assert!(net_of[&t.to_user_id] > Decimal::ZERO);
        }
    }
}
