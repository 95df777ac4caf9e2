//! Pure balance arithmetic. Every function here takes a snapshot read under
//! the row lock and returns the numbers to write back.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{LeaveError, LeaveResult};
use crate::model::leave_balance::{BalanceUpdate, JournalEntry, LeaveBalance};

/// Largest day quantity a balance field or a single movement may hold.
pub const MAX_DAYS: Decimal = dec!(9999.5);

/// Day quantities move in half-day steps.
pub fn is_half_day_granular(days: Decimal) -> bool {
    days.checked_mul(Decimal::TWO)
        .is_some_and(|doubled| doubled.fract().is_zero())
}

pub fn validate_days(days: Decimal, what: &str) -> LeaveResult<()> {
    if days.is_sign_negative() && !days.is_zero() {
        return Err(LeaveError::Validation(format!("{what} cannot be negative")));
    }
    validate_delta(days, what)
}

pub fn validate_delta(days: Decimal, what: &str) -> LeaveResult<()> {
    if days.abs() > MAX_DAYS {
        return Err(LeaveError::Validation(format!(
            "{what} cannot exceed {MAX_DAYS} days, got {days}"
        )));
    }
    if !is_half_day_granular(days) {
        return Err(LeaveError::Validation(format!(
            "{what} must be a multiple of 0.5 days, got {days}"
        )));
    }
    Ok(())
}

pub fn deduction(balance: &LeaveBalance, days: Decimal) -> LeaveResult<BalanceUpdate> {
    if balance.remaining_balance < days {
        return Err(LeaveError::InsufficientBalance {
            available: balance.remaining_balance,
            requested: days,
        });
    }

    Ok(BalanceUpdate {
        total_entitlement: balance.total_entitlement,
        used_balance: balance.used_balance + days,
        journal: None,
    })
}

/// Gives `days` back. Used never drops below zero, so restoring more than
/// was used under-restores instead of failing.
pub fn restoration(balance: &LeaveBalance, days: Decimal) -> BalanceUpdate {
    BalanceUpdate {
        total_entitlement: balance.total_entitlement,
        used_balance: (balance.used_balance - days).max(Decimal::ZERO),
        journal: None,
    }
}

pub fn adjustment(
    balance: &LeaveBalance,
    delta: Decimal,
    reason: &str,
    changed_by: u64,
    notes: Option<String>,
) -> LeaveResult<BalanceUpdate> {
    let after = balance.total_entitlement + delta;
    if after < Decimal::ZERO {
        return Err(LeaveError::NegativeResult {
            current: balance.total_entitlement,
            delta,
        });
    }

    if after > MAX_DAYS {
        return Err(LeaveError::Validation(format!(
            "Entitlement cannot exceed {MAX_DAYS} days, got {after}"
        )));
    }

    Ok(BalanceUpdate {
        total_entitlement: after,
        used_balance: balance.used_balance,
        journal: Some(JournalEntry {
            changed_by,
            reason: reason.to_string(),
            delta,
            before: balance.total_entitlement,
            after,
            notes,
        }),
    })
}
