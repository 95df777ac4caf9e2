//! Contracts for the services the leave workflow consumes but does not own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LeaveResult;
use crate::model::{
    department::Department, leave_type::LeaveType, notification::Notification, role::Role,
    user::UserProfile,
};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user(&self, user_id: u64) -> LeaveResult<Option<UserProfile>>;

    /// Active users holding any of `roles`.
    async fn users_with_roles(&self, roles: &[Role]) -> LeaveResult<Vec<u64>>;
}

#[async_trait]
pub trait DepartmentDirectory: Send + Sync {
    async fn department(&self, department_id: u64) -> LeaveResult<Option<Department>>;

    /// Employees in the departments `manager_id` manages.
    async fn reports_of(&self, manager_id: u64) -> LeaveResult<Vec<u64>>;
}

/// Fire-and-forget delivery; callers log failures and carry on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> LeaveResult<()>;
}

#[async_trait]
pub trait LeaveTypeRegistry: Send + Sync {
    async fn leave_type(&self, id: u64) -> LeaveResult<Option<LeaveType>>;

    async fn active_types(&self) -> LeaveResult<Vec<LeaveType>>;
}

/// Monotonic per year. Gaps are fine, repeats are not.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    async fn next_request_seq(&self, year: i32) -> LeaveResult<u32>;
}

pub fn format_request_number(year: i32, seq: u32) -> String {
    format!("LR{year}{seq:05}")
}

#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub departments: Arc<dyn DepartmentDirectory>,
    pub leave_types: Arc<dyn LeaveTypeRegistry>,
    pub sequence: Arc<dyn SequenceSource>,
    pub notifier: Arc<dyn NotificationSink>,
}
