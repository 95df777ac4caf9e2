use async_trait::async_trait;

use crate::error::LeaveResult;
use crate::model::leave_balance::{
    BalanceFilter, BalanceHistory, BalanceRef, BalanceUpdate, LeaveBalance, NewBalance,
};

/// Computes the new numbers from the locked row.
pub type BalanceMutation = Box<dyn FnOnce(&LeaveBalance) -> LeaveResult<BalanceUpdate> + Send>;

/// Persistence for balance rows and their journal.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// `AlreadyExists` when the key is taken.
    async fn insert(&self, new: NewBalance) -> LeaveResult<LeaveBalance>;

    async fn get(&self, at: BalanceRef) -> LeaveResult<Option<LeaveBalance>>;

    /// Ordered by user then leave type.
    async fn list(&self, filter: &BalanceFilter) -> LeaveResult<Vec<LeaveBalance>>;

    /// Locks the row, runs `mutate` on it and writes the result together with
    /// its journal entry as one atomic unit. `NotFound` when there is no row;
    /// an error from `mutate` leaves the row untouched.
    async fn update_locked(&self, at: BalanceRef, mutate: BalanceMutation) -> LeaveResult<LeaveBalance>;

    /// Newest first.
    async fn history(&self, balance_id: u64) -> LeaveResult<Vec<BalanceHistory>>;

    /// Deletes the row only if nothing was used and no journal entry exists.
    /// Returns whether a row was removed.
    async fn delete_unused(&self, balance_id: u64) -> LeaveResult<bool>;
}
