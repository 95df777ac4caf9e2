//! Leave request state machine.
//!
//! ```text
//! pending_manager --manager approve--> pending_hr --HR approve--> approved_hr
//!        |                             (approved_manager accepted too)
//!        +--manager reject--> rejected_manager      \--HR reject--> rejected_hr
//! any of pending_manager / approved_manager / pending_hr --cancel--> cancelled
//! ```
//!
//! Manager approval lands on `pending_hr` in one write. `approved_manager` is
//! still a legal source for the HR decision so rows left there by a
//! half-applied two-step write remain actionable.

use crate::error::{LeaveError, LeaveResult};
use crate::model::leave_request::{LeaveAction, LeaveStatus};

use LeaveStatus::*;

/// Statuses from which `action` is legal.
pub fn sources(action: LeaveAction) -> &'static [LeaveStatus] {
    match action {
        LeaveAction::ManagerApprove | LeaveAction::ManagerReject | LeaveAction::Edit => {
            &[PendingManager]
        }
        LeaveAction::HrApprove | LeaveAction::HrReject => &[PendingHr, ApprovedManager],
        LeaveAction::Cancel => &[PendingManager, ApprovedManager, PendingHr],
        LeaveAction::Delete => &[
            PendingManager,
            ApprovedManager,
            PendingHr,
            RejectedManager,
            RejectedHr,
            Cancelled,
        ],
    }
}

/// Where `action` takes a request currently in `status`. Edit and delete
/// leave the status as is.
pub fn transition(status: LeaveStatus, action: LeaveAction) -> LeaveResult<LeaveStatus> {
    if !sources(action).contains(&status) {
        return Err(LeaveError::InvalidTransition { status, action });
    }

    Ok(match action {
        LeaveAction::ManagerApprove => PendingHr,
        LeaveAction::ManagerReject => RejectedManager,
        LeaveAction::HrApprove => ApprovedHr,
        LeaveAction::HrReject => RejectedHr,
        LeaveAction::Cancel => Cancelled,
        LeaveAction::Edit | LeaveAction::Delete => status,
    })
}
