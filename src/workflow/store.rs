use async_trait::async_trait;

use crate::error::LeaveResult;
use crate::ledger::BalanceMutation;
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, NewLeaveRequest, RequestDetails, RequestFilter, StatusChange,
};

/// Persistence for leave requests.
///
/// Every write that depends on the current status is a compare-and-set: it
/// only applies while the row is still in one of `from`, and reports `None`
/// / `false` otherwise.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, new: NewLeaveRequest) -> LeaveResult<LeaveRequest>;

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveRequest>>;

    /// Matching rows (windowed) and the total count before windowing.
    async fn list(&self, filter: &RequestFilter) -> LeaveResult<(Vec<LeaveRequest>, i64)>;

    async fn transition(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
    ) -> LeaveResult<Option<LeaveRequest>>;

    /// Applies `change` and runs `charge` against the request's balance
    /// (`LeaveRequest::balance_key`) as one atomic unit. Readers see either
    /// both writes or neither. `None` when the request has left `from`; an
    /// error from `charge` leaves the request and the balance untouched.
    async fn transition_with_charge(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
        charge: BalanceMutation,
    ) -> LeaveResult<Option<LeaveRequest>>;

    async fn update_details(
        &self,
        id: u64,
        from: &[LeaveStatus],
        details: RequestDetails,
    ) -> LeaveResult<Option<LeaveRequest>>;

    async fn delete(&self, id: u64, from: &[LeaveStatus]) -> LeaveResult<bool>;
}
