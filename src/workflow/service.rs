use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::machine;
use super::store::RequestStore;
use crate::directory::{Collaborators, format_request_number};
use crate::error::{LeaveError, LeaveResult};
use crate::ledger::BalanceLedger;
use crate::model::actor::Actor;
use crate::model::leave_balance::BalanceKey;
use crate::model::leave_request::{
    LeaveAction, LeavePatch, LeaveRequest, LeaveStatus, NewLeaveRequest, Page, RequestDetails,
    RequestFilter, StatusChange, SubmitLeave, leave_days,
};
use crate::model::leave_type::LeaveType;
use crate::model::notification::Notification;
use crate::model::role::Role;

/// Drives leave requests through their lifecycle and keeps the ledger in step.
#[derive(Clone)]
pub struct LeaveWorkflow {
    requests: Arc<dyn RequestStore>,
    ledger: BalanceLedger,
    deps: Collaborators,
}

impl LeaveWorkflow {
    pub fn new(requests: Arc<dyn RequestStore>, ledger: BalanceLedger, deps: Collaborators) -> Self {
        Self {
            requests,
            ledger,
            deps,
        }
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /* =========================
    Queries
    ========================= */

    pub async fn get(&self, id: u64) -> LeaveResult<LeaveRequest> {
        self.requests
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("Leave request #{id} not found")))
    }

    /// Owner, the request's manager, or HR.
    pub async fn view(&self, actor: &Actor, id: u64) -> LeaveResult<LeaveRequest> {
        let request = self.get(id).await?;
        if request.user_id == actor.user_id
            || request.manager_id == Some(actor.user_id)
            || actor.is_hr()
        {
            Ok(request)
        } else {
            Err(LeaveError::Forbidden("You cannot view this request".into()))
        }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        user_id: Option<u64>,
        status: Option<LeaveStatus>,
        page: u64,
        per_page: u64,
    ) -> LeaveResult<Page<LeaveRequest>> {
        require_hr(actor)?;
        self.page(user_id, status, page, per_page).await
    }

    pub async fn my_requests(
        &self,
        actor: &Actor,
        status: Option<LeaveStatus>,
        page: u64,
        per_page: u64,
    ) -> LeaveResult<Page<LeaveRequest>> {
        self.page(Some(actor.user_id), status, page, per_page).await
    }

    async fn page(
        &self,
        user_id: Option<u64>,
        status: Option<LeaveStatus>,
        page: u64,
        per_page: u64,
    ) -> LeaveResult<Page<LeaveRequest>> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let filter = RequestFilter {
            user_ids: user_id.map(|id| vec![id]),
            statuses: status.map(|s| vec![s]),
            oldest_first: false,
            window: Some((per_page, (page - 1) * per_page)),
        };
        let (data, total) = self.requests.list(&filter).await?;

        Ok(Page {
            data,
            page,
            per_page,
            total,
        })
    }

    /// Requests of the actor's reports still waiting for a manager.
    pub async fn pending_for_manager(&self, actor: &Actor) -> LeaveResult<Vec<LeaveRequest>> {
        let reports = self.deps.departments.reports_of(actor.user_id).await?;
        if reports.is_empty() {
            return Ok(Vec::new());
        }

        let filter = RequestFilter {
            user_ids: Some(reports),
            statuses: Some(vec![LeaveStatus::PendingManager]),
            oldest_first: true,
            window: None,
        };
        Ok(self.requests.list(&filter).await?.0)
    }

    pub async fn pending_for_hr(&self, actor: &Actor) -> LeaveResult<Vec<LeaveRequest>> {
        require_hr(actor)?;

        let filter = RequestFilter {
            user_ids: None,
            statuses: Some(machine::sources(LeaveAction::HrApprove).to_vec()),
            oldest_first: true,
            window: None,
        };
        Ok(self.requests.list(&filter).await?.0)
    }

    /* =========================
    Submission and edits
    ========================= */

    #[instrument(skip(self, input), fields(user_id = actor.user_id, leave_type_id = input.leave_type_id))]
    pub async fn submit(&self, actor: &Actor, input: SubmitLeave, year: i32) -> LeaveResult<LeaveRequest> {
        let details = RequestDetails {
            leave_type_id: input.leave_type_id,
            start_date: input.start_date,
            end_date: input.end_date,
            total_days: leave_days(input.start_date, input.end_date, input.is_half_day),
            is_half_day: input.is_half_day,
            half_day_period: input.half_day_period.filter(|_| input.is_half_day),
            reason: input.reason.trim().to_string(),
            attachment_path: input.attachment_path.filter(|p| !p.trim().is_empty()),
        };
        validate_details(&details)?;

        let leave_type = self.usable_leave_type(&details).await?;
        self.ensure_balance(actor.user_id, &details, year).await?;

        let requester = self.deps.identity.user(actor.user_id).await?;
        let manager_id = match requester.as_ref().and_then(|u| u.department_id) {
            Some(department_id) => self
                .deps
                .departments
                .department(department_id)
                .await?
                .and_then(|d| d.manager_id),
            None => None,
        };

        let status = LeaveStatus::initial(leave_type.requires_approval);
        let seq = self.deps.sequence.next_request_seq(year).await?;

        let request = self
            .requests
            .insert(NewLeaveRequest {
                request_number: format_request_number(year, seq),
                user_id: actor.user_id,
                leave_year: year,
                details,
                status,
                manager_id,
            })
            .await?;

        info!(
            request_id = request.id,
            request_number = %request.request_number,
            %status,
            total_days = %request.total_days,
            "Leave request submitted"
        );

        if leave_type.requires_approval {
            self.notify(Notification::leave(
                request.user_id,
                request.id,
                "Leave Request Submitted",
                format!(
                    "Your {} request {} for {} day(s) is waiting for manager approval",
                    leave_type.name, request.request_number, request.total_days
                ),
            ))
            .await;

            if let Some(manager_id) = manager_id {
                let name = requester
                    .as_ref()
                    .map(|u| u.display_name.clone())
                    .unwrap_or_else(|| format!("User #{}", actor.user_id));
                self.notify(Notification::leave(
                    manager_id,
                    request.id,
                    "New Leave Request",
                    format!(
                        "{name} has submitted a {} request for {} day(s)",
                        leave_type.name, request.total_days
                    ),
                ))
                .await;
            }
        } else {
            // pre-approved types are tracked, never charged to the ledger
            self.notify(Notification::leave(
                request.user_id,
                request.id,
                "Leave Request - Approved",
                format!(
                    "Your {} request {} for {} day(s) was recorded as approved",
                    leave_type.name, request.request_number, request.total_days
                ),
            ))
            .await;
        }

        Ok(request)
    }

    #[instrument(skip(self, patch), fields(user_id = actor.user_id))]
    pub async fn update(&self, actor: &Actor, id: u64, patch: LeavePatch) -> LeaveResult<LeaveRequest> {
        let request = self.get(id).await?;
        if request.user_id != actor.user_id {
            return Err(LeaveError::Forbidden("You can only update your own requests".into()));
        }
        machine::transition(request.status, LeaveAction::Edit)?;

        let mut details = patch.merge(&request.details());
        details.total_days = leave_days(details.start_date, details.end_date, details.is_half_day);
        validate_details(&details)?;

        self.usable_leave_type(&details).await?;
        self.ensure_balance(request.user_id, &details, request.leave_year).await?;

        let updated = self
            .requests
            .update_details(id, machine::sources(LeaveAction::Edit), details)
            .await?;
        let updated = self.settled(id, updated, LeaveAction::Edit).await?;

        info!(total_days = %updated.total_days, "Leave request updated");
        Ok(updated)
    }

    /* =========================
    Manager decision
    ========================= */

    #[instrument(skip(self, notes), fields(manager_id = actor.user_id))]
    pub async fn manager_approve(
        &self,
        actor: &Actor,
        id: u64,
        notes: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        let (request, to) = self.manager_guard(actor, id, LeaveAction::ManagerApprove).await?;

        let change = StatusChange::Manager {
            to,
            manager_id: actor.user_id,
            at: Utc::now(),
            notes,
        };
        let updated = self.requests.transition(id, &[request.status], change).await?;
        let updated = self.settled(id, updated, LeaveAction::ManagerApprove).await?;

        info!(status = %updated.status, "Leave request approved by manager");

        self.notify(Notification::leave(
            updated.user_id,
            id,
            "Leave Request - Manager Approved",
            format!(
                "Your leave request {} has been approved by your manager and is now pending HR review",
                updated.request_number
            ),
        ))
        .await;

        match self.deps.identity.users_with_roles(&Role::HR_ROLES).await {
            Ok(hr_users) => {
                for hr_user in hr_users {
                    self.notify(Notification::leave(
                        hr_user,
                        id,
                        "Leave Request - Pending HR Approval",
                        format!("Leave request {} is pending HR approval", updated.request_number),
                    ))
                    .await;
                }
            }
            Err(e) => warn!(error = %e, "Could not resolve HR recipients"),
        }

        Ok(updated)
    }

    #[instrument(skip(self, notes), fields(manager_id = actor.user_id))]
    pub async fn manager_reject(
        &self,
        actor: &Actor,
        id: u64,
        notes: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        let (request, to) = self.manager_guard(actor, id, LeaveAction::ManagerReject).await?;

        let change = StatusChange::Manager {
            to,
            manager_id: actor.user_id,
            at: Utc::now(),
            notes: notes.clone(),
        };
        let updated = self.requests.transition(id, &[request.status], change).await?;
        let updated = self.settled(id, updated, LeaveAction::ManagerReject).await?;

        info!("Leave request rejected by manager");

        self.notify(Notification::leave(
            updated.user_id,
            id,
            "Leave Request - Rejected by Manager",
            format!(
                "Your leave request {} has been rejected by your manager{}",
                updated.request_number,
                comment_suffix(&notes)
            ),
        ))
        .await;

        Ok(updated)
    }

    /* =========================
    HR decision
    ========================= */

    /// Final approval. The status change and the balance deduction commit
    /// together; an insufficient balance leaves both untouched and reports a
    /// conflict.
    #[instrument(skip(self, notes), fields(hr_officer_id = actor.user_id))]
    pub async fn hr_approve(
        &self,
        actor: &Actor,
        id: u64,
        notes: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        let request = self.get(id).await?;
        let to = machine::transition(request.status, LeaveAction::HrApprove)?;
        require_hr(actor)?;

        let change = StatusChange::Hr {
            to,
            hr_officer_id: actor.user_id,
            at: Utc::now(),
            notes,
        };
        let charge = BalanceLedger::deduction(request.total_days)?;
        let approved = self
            .requests
            .transition_with_charge(id, &[request.status], change, charge)
            .await
            .map_err(|e| match e {
                LeaveError::InsufficientBalance { available, requested } => LeaveError::Conflict(format!(
                    "Leave balance changed since submission. Available: {available} days, Requested: {requested} days"
                )),
                other => other,
            })?;
        let approved = self.settled(id, approved, LeaveAction::HrApprove).await?;

        info!(total_days = %approved.total_days, "Leave request approved by HR");

        self.notify(Notification::leave(
            approved.user_id,
            id,
            "Leave Request - Approved",
            format!(
                "Your leave request {} has been approved by HR. {} day(s) have been deducted from your balance.",
                approved.request_number, approved.total_days
            ),
        ))
        .await;

        Ok(approved)
    }

    #[instrument(skip(self, notes), fields(hr_officer_id = actor.user_id))]
    pub async fn hr_reject(
        &self,
        actor: &Actor,
        id: u64,
        notes: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        let request = self.get(id).await?;
        let to = machine::transition(request.status, LeaveAction::HrReject)?;
        require_hr(actor)?;

        let change = StatusChange::Hr {
            to,
            hr_officer_id: actor.user_id,
            at: Utc::now(),
            notes: notes.clone(),
        };
        let updated = self.requests.transition(id, &[request.status], change).await?;
        let updated = self.settled(id, updated, LeaveAction::HrReject).await?;

        info!("Leave request rejected by HR");

        self.notify(Notification::leave(
            updated.user_id,
            id,
            "Leave Request - Rejected by HR",
            format!(
                "Your leave request {} has been rejected by HR{}",
                updated.request_number,
                comment_suffix(&notes)
            ),
        ))
        .await;

        Ok(updated)
    }

    /* =========================
    Owner actions
    ========================= */

    /// Cancellation only happens before HR approval, so the ledger was never
    /// charged and nothing is restored.
    #[instrument(skip(self, reason), fields(user_id = actor.user_id))]
    pub async fn cancel(&self, actor: &Actor, id: u64, reason: &str) -> LeaveResult<LeaveRequest> {
        let request = self.get(id).await?;
        if request.user_id != actor.user_id {
            return Err(LeaveError::Forbidden("You can only cancel your own requests".into()));
        }
        machine::transition(request.status, LeaveAction::Cancel)?;

        let change = StatusChange::Cancel {
            notes: format!("Cancelled by user. Reason: {}", reason.trim()),
        };
        let updated = self.requests.transition(id, &[request.status], change).await?;
        let updated = self.settled(id, updated, LeaveAction::Cancel).await?;

        info!("Leave request cancelled");

        self.notify(Notification::leave(
            updated.user_id,
            id,
            "Leave Request - Cancelled",
            format!("Your leave request {} has been cancelled", updated.request_number),
        ))
        .await;

        Ok(updated)
    }

    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: u64) -> LeaveResult<()> {
        let request = self.get(id).await?;
        if request.user_id != actor.user_id && !actor.is_hr() {
            return Err(LeaveError::Forbidden("You can only delete your own requests".into()));
        }
        machine::transition(request.status, LeaveAction::Delete)?;

        if !self.requests.delete(id, machine::sources(LeaveAction::Delete)).await? {
            let current = self.get(id).await?;
            return Err(LeaveError::InvalidTransition {
                status: current.status,
                action: LeaveAction::Delete,
            });
        }

        info!("Leave request deleted");
        Ok(())
    }

    /* =========================
    Helpers
    ========================= */

    async fn manager_guard(
        &self,
        actor: &Actor,
        id: u64,
        action: LeaveAction,
    ) -> LeaveResult<(LeaveRequest, LeaveStatus)> {
        let request = self.get(id).await?;
        let to = machine::transition(request.status, action)?;

        let reports = self.deps.departments.reports_of(actor.user_id).await?;
        if !reports.contains(&request.user_id) {
            return Err(LeaveError::Forbidden(
                "You are not the manager of this employee".into(),
            ));
        }

        Ok((request, to))
    }

    /// Turns a lost compare-and-set into the error for the status that won.
    async fn settled(
        &self,
        id: u64,
        written: Option<LeaveRequest>,
        action: LeaveAction,
    ) -> LeaveResult<LeaveRequest> {
        match written {
            Some(request) => Ok(request),
            None => {
                let current = self.get(id).await?;
                warn!(status = %current.status, %action, "Lost a concurrent status change");
                Err(LeaveError::InvalidTransition {
                    status: current.status,
                    action,
                })
            }
        }
    }

    async fn usable_leave_type(&self, details: &RequestDetails) -> LeaveResult<LeaveType> {
        let leave_type = self
            .deps
            .leave_types
            .leave_type(details.leave_type_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| LeaveError::Validation("Invalid or inactive leave type".into()))?;

        if leave_type.requires_attachment && details.attachment_path.is_none() {
            return Err(LeaveError::Validation(format!(
                "Attachment is required for {}",
                leave_type.name
            )));
        }

        Ok(leave_type)
    }

    async fn ensure_balance(&self, user_id: u64, details: &RequestDetails, year: i32) -> LeaveResult<()> {
        let key = BalanceKey {
            user_id,
            leave_type_id: details.leave_type_id,
            year,
        };
        if self.ledger.check_sufficient(key, details.total_days).await? {
            return Ok(());
        }

        let available = self
            .ledger
            .find(key)
            .await?
            .map(|b| b.remaining_balance)
            .unwrap_or_default();
        Err(LeaveError::InsufficientBalance {
            available,
            requested: details.total_days,
        })
    }

    async fn notify(&self, notification: Notification) {
        let recipient = notification.recipient_id;
        if let Err(e) = self.deps.notifier.notify(notification).await {
            warn!(recipient, error = %e, "Notification delivery failed");
        }
    }
}

fn require_hr(actor: &Actor) -> LeaveResult<()> {
    if actor.is_hr() {
        Ok(())
    } else {
        Err(LeaveError::Forbidden("HR/Admin only".into()))
    }
}

fn validate_details(details: &RequestDetails) -> LeaveResult<()> {
    if details.start_date > details.end_date {
        return Err(LeaveError::Validation("Start date must be before end date".into()));
    }
    if details.reason.trim().is_empty() {
        return Err(LeaveError::Validation("Reason is required".into()));
    }
    if details.is_half_day && details.half_day_period.is_none() {
        return Err(LeaveError::Validation(
            "Half-day requests need a half_day_period (morning or afternoon)".into(),
        ));
    }
    Ok(())
}

fn comment_suffix(notes: &Option<String>) -> String {
    match notes.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => format!(": {c}"),
        _ => String::new(),
    }
}
