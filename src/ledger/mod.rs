//! Balance ledger: per user / leave type / year balances and their
//! adjustment journal.
//!
//! Nothing outside this module decides the numeric fields of a balance. The
//! workflow gates submissions with [`BalanceLedger::check_sufficient`] and
//! charges HR approvals with the mutation from [`BalanceLedger::deduction`],
//! which the request store runs in the same atomic unit as the status change.
//! Every write is re-validated inside the store's row lock, so a stale
//! `check_sufficient` answer can never overdraw a balance.

pub mod rules;
pub mod store;

#[cfg(test)]
mod props;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::directory::LeaveTypeRegistry;
use crate::error::{LeaveError, LeaveResult};
use crate::model::leave_balance::{
    BalanceFilter, BalanceHistory, BalanceKey, BalanceRef, LeaveBalance, NewBalance,
};

pub use store::{BalanceMutation, BalanceStore};

#[derive(Clone)]
pub struct BalanceLedger {
    store: Arc<dyn BalanceStore>,
    leave_types: Arc<dyn LeaveTypeRegistry>,
}

impl BalanceLedger {
    pub fn new(store: Arc<dyn BalanceStore>, leave_types: Arc<dyn LeaveTypeRegistry>) -> Self {
        Self { store, leave_types }
    }

    #[instrument(skip(self), fields(user_id = key.user_id, leave_type_id = key.leave_type_id, year = key.year))]
    pub async fn initialize(
        &self,
        key: BalanceKey,
        base_entitlement: Decimal,
        carried_over: Decimal,
    ) -> LeaveResult<LeaveBalance> {
        rules::validate_days(base_entitlement, "Entitlement")?;
        rules::validate_days(carried_over, "Carry-over")?;
        rules::validate_days(base_entitlement + carried_over, "Total entitlement")?;
        if self.leave_types.leave_type(key.leave_type_id).await?.is_none() {
            return Err(LeaveError::NotFound("Leave type not found".into()));
        }

        let balance = self
            .store
            .insert(NewBalance {
                key,
                base_entitlement,
                carried_over,
            })
            .await
            .map_err(|e| match e {
                LeaveError::AlreadyExists(_) => LeaveError::AlreadyExists(format!(
                    "Leave balance already exists for this user and leave type in year {}",
                    key.year
                )),
                other => other,
            })?;

        info!(balance_id = balance.id, total = %balance.total_entitlement, "Leave balance initialized");
        Ok(balance)
    }

    /// Creates the missing balances of `user_id` for every active leave type,
    /// at that type's annual entitlement. Returns only what was created.
    #[instrument(skip(self))]
    pub async fn initialize_user(&self, user_id: u64, year: i32) -> LeaveResult<Vec<LeaveBalance>> {
        let mut created = Vec::new();

        for leave_type in self.leave_types.active_types().await? {
            let key = BalanceKey {
                user_id,
                leave_type_id: leave_type.id,
                year,
            };
            match self.initialize(key, leave_type.annual_entitlement, Decimal::ZERO).await {
                Ok(balance) => created.push(balance),
                Err(LeaveError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        info!(count = created.len(), "Initialized leave balances for user");
        Ok(created)
    }

    /// Pre-flight gate only; a missing balance is simply "not enough".
    pub async fn check_sufficient(&self, key: BalanceKey, days: Decimal) -> LeaveResult<bool> {
        Ok(self
            .store
            .get(BalanceRef::Key(key))
            .await?
            .is_some_and(|b| b.remaining_balance >= days))
    }

    /// Validated deduction of `days`, for stores that charge a balance
    /// inside a wider atomic write.
    pub fn deduction(days: Decimal) -> LeaveResult<BalanceMutation> {
        rules::validate_days(days, "Days")?;
        Ok(Box::new(move |b: &LeaveBalance| rules::deduction(b, days)))
    }

    #[instrument(skip(self), fields(user_id = key.user_id, leave_type_id = key.leave_type_id, year = key.year))]
    pub async fn deduct(&self, key: BalanceKey, days: Decimal) -> LeaveResult<LeaveBalance> {
        let balance = self
            .store
            .update_locked(BalanceRef::Key(key), Self::deduction(days)?)
            .await?;

        info!(%days, remaining = %balance.remaining_balance, "Leave balance deducted");
        Ok(balance)
    }

    #[instrument(skip(self), fields(user_id = key.user_id, leave_type_id = key.leave_type_id, year = key.year))]
    pub async fn restore(&self, key: BalanceKey, days: Decimal) -> LeaveResult<LeaveBalance> {
        rules::validate_days(days, "Days")?;

        let balance = self
            .store
            .update_locked(BalanceRef::Key(key), Box::new(move |b: &LeaveBalance| Ok(rules::restoration(b, days))))
            .await?;

        info!(%days, remaining = %balance.remaining_balance, "Leave balance restored");
        Ok(balance)
    }

    #[instrument(skip(self, reason, notes))]
    pub async fn adjust_entitlement(
        &self,
        balance_id: u64,
        delta: Decimal,
        reason: &str,
        actor_id: u64,
        notes: Option<String>,
    ) -> LeaveResult<LeaveBalance> {
        rules::validate_delta(delta, "Adjustment")?;
        if reason.trim().is_empty() {
            return Err(LeaveError::Validation("Adjustment reason is required".into()));
        }

        let reason = reason.to_string();
        let balance = self
            .store
            .update_locked(
                BalanceRef::Id(balance_id),
                Box::new(move |b: &LeaveBalance| rules::adjustment(b, delta, &reason, actor_id, notes)),
            )
            .await?;

        info!(%delta, total = %balance.total_entitlement, "Leave entitlement adjusted");
        Ok(balance)
    }

    pub async fn history(&self, balance_id: u64) -> LeaveResult<Vec<BalanceHistory>> {
        self.get(balance_id).await?;
        self.store.history(balance_id).await
    }

    pub async fn get(&self, balance_id: u64) -> LeaveResult<LeaveBalance> {
        self.store
            .get(BalanceRef::Id(balance_id))
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("Leave balance #{balance_id} not found")))
    }

    pub async fn find(&self, key: BalanceKey) -> LeaveResult<Option<LeaveBalance>> {
        self.store.get(BalanceRef::Key(key)).await
    }

    pub async fn list(&self, filter: &BalanceFilter) -> LeaveResult<Vec<LeaveBalance>> {
        self.store.list(filter).await
    }

    pub async fn user_balances(&self, user_id: u64, year: i32) -> LeaveResult<Vec<LeaveBalance>> {
        self.store
            .list(&BalanceFilter {
                user_id: Some(user_id),
                year: Some(year),
                ..Default::default()
            })
            .await
    }

    /// Only balances that were never used or adjusted can go.
    #[instrument(skip(self))]
    pub async fn remove(&self, balance_id: u64) -> LeaveResult<()> {
        self.get(balance_id).await?;

        if !self.store.delete_unused(balance_id).await? {
            return Err(LeaveError::Conflict(format!(
                "Leave balance #{balance_id} has usage or adjustment history and cannot be deleted"
            )));
        }

        info!("Leave balance deleted");
        Ok(())
    }
}
