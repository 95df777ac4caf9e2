//! Property tests: whatever sequence of deduct / restore / adjust runs
//! against a balance, `remaining == total - used` and `used >= 0` hold.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::rules::{adjustment, deduction, restoration};
use super::rules::tests::balance;
use crate::model::leave_balance::{BalanceUpdate, LeaveBalance};

#[derive(Debug, Clone)]
enum Op {
    Deduct(Decimal),
    Restore(Decimal),
    Adjust(Decimal),
}

/// Half-day steps between 0 and 30 days.
fn arb_days() -> impl Strategy<Value = Decimal> {
    (0i64..=60).prop_map(|halves| Decimal::new(halves * 5, 1))
}

fn arb_delta() -> impl Strategy<Value = Decimal> {
    (-40i64..=40).prop_map(|halves| Decimal::new(halves * 5, 1))
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_days().prop_map(Op::Deduct),
        arb_days().prop_map(Op::Restore),
        arb_delta().prop_map(Op::Adjust),
    ]
}

fn apply(balance: &mut LeaveBalance, update: BalanceUpdate) {
    balance.remaining_balance = update.remaining_balance();
    balance.total_entitlement = update.total_entitlement;
    balance.used_balance = update.used_balance;
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_ledger_invariant_holds(
        start in arb_days(),
        ops in proptest::collection::vec(arb_op(), 0..40),
    ) {
        let mut b = balance(start, Decimal::ZERO);

        for op in ops {
            let before = b.clone();
            let result = match op {
                Op::Deduct(days) => deduction(&b, days),
                Op::Restore(days) => Ok(restoration(&b, days)),
                Op::Adjust(delta) => adjustment(&b, delta, "prop", 1, None),
            };
            match result {
                Ok(update) => apply(&mut b, update),
                // a refused operation changes nothing
                Err(_) => prop_assert_eq!(&b, &before),
            }

            prop_assert_eq!(b.remaining_balance, b.total_entitlement - b.used_balance);
            prop_assert!(b.used_balance >= Decimal::ZERO);
            prop_assert!(b.total_entitlement >= Decimal::ZERO);
        }
    }

    #[test]
    fn prop_deduction_never_overdraws(
        total in arb_days(),
        used in arb_days(),
        days in arb_days(),
    ) {
        prop_assume!(used <= total);
        let b = balance(total, used);

        match deduction(&b, days) {
            Ok(update) => {
                prop_assert!(days <= b.remaining_balance);
                prop_assert!(update.remaining_balance() >= Decimal::ZERO);
                prop_assert_eq!(update.used_balance, used + days);
            }
            Err(_) => prop_assert!(days > b.remaining_balance),
        }
    }

    #[test]
    fn prop_restore_after_deduct_round_trips(
        total in arb_days(),
        days in arb_days(),
    ) {
        prop_assume!(days <= total);
        let mut b = balance(total, Decimal::ZERO);

        let update = deduction(&b, days).unwrap();
        apply(&mut b, update);
        let update = restoration(&b, days);
        apply(&mut b, update);
        prop_assert_eq!(b.used_balance, Decimal::ZERO);
        prop_assert_eq!(b.remaining_balance, total);
    }
}
