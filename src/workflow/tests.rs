//! Lifecycle scenarios run against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{LeaveWorkflow, RequestStore};
use crate::directory::Collaborators;
use crate::error::{LeaveError, LeaveResult};
use crate::ledger::{BalanceLedger, BalanceMutation};
use crate::model::actor::Actor;
use crate::model::leave_balance::{BalanceKey, LeaveBalance};
use crate::model::leave_request::{
    HalfDayPeriod, LeavePatch, LeaveRequest, LeaveStatus, NewLeaveRequest, RequestDetails,
    RequestFilter, StatusChange, SubmitLeave, leave_days,
};
use crate::model::role::Role;
use crate::store::memory::MemoryStore;

const EMPLOYEE: u64 = 10;
const COLLEAGUE: u64 = 11;
const MANAGER: u64 = 100;
const HR: u64 = 200;
const YEAR: i32 = 2026;

const ANNUAL: u64 = 1;
const CASUAL: u64 = 2;
const SICK: u64 = 3;

fn employee() -> Actor {
    Actor::new(EMPLOYEE, [Role::Employee])
}

fn colleague() -> Actor {
    Actor::new(COLLEAGUE, [Role::Employee])
}

fn manager() -> Actor {
    Actor::new(MANAGER, [Role::Employee])
}

fn hr() -> Actor {
    Actor::new(HR, [Role::Hr])
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn leave(leave_type_id: u64, start: &str, end: &str) -> SubmitLeave {
    SubmitLeave {
        leave_type_id,
        start_date: date(start),
        end_date: date(end),
        is_half_day: false,
        half_day_period: None,
        reason: "Family trip".into(),
        attachment_path: None,
    }
}

fn key(leave_type_id: u64) -> BalanceKey {
    BalanceKey {
        user_id: EMPLOYEE,
        leave_type_id,
        year: YEAR,
    }
}

fn setup() -> (LeaveWorkflow, Arc<MemoryStore>) {
    let store = seeded_store();
    let workflow = workflow_over(store.clone(), store.clone());
    (workflow, store)
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    store.seed_leave_type(ANNUAL, "AL", dec!(20), true, false);
    store.seed_leave_type(CASUAL, "CL", dec!(5), false, false);
    store.seed_leave_type(SICK, "SL", dec!(10), true, true);
    store.seed_department(1, "Engineering", Some(MANAGER));
    store.seed_user(EMPLOYEE, "Alice", Some(1), &[Role::Employee]);
    store.seed_user(COLLEAGUE, "Bob", Some(1), &[Role::Employee]);
    store.seed_user(MANAGER, "Mona", Some(1), &[Role::Employee]);
    store.seed_user(HR, "Hana", None, &[Role::Hr]);
    store
}

fn workflow_over(store: Arc<MemoryStore>, requests: Arc<dyn RequestStore>) -> LeaveWorkflow {
    let ledger = BalanceLedger::new(store.clone(), store.clone());
    let deps = Collaborators {
        identity: store.clone(),
        departments: store.clone(),
        leave_types: store.clone(),
        sequence: store.clone(),
        notifier: store,
    };
    LeaveWorkflow::new(requests, ledger, deps)
}

async fn with_balance(workflow: &LeaveWorkflow, leave_type_id: u64, days: Decimal) {
    workflow
        .ledger()
        .initialize(key(leave_type_id), days, Decimal::ZERO)
        .await
        .unwrap();
}

async fn balance(workflow: &LeaveWorkflow, leave_type_id: u64) -> (Decimal, Decimal) {
    let b = workflow.ledger().find(key(leave_type_id)).await.unwrap().unwrap();
    assert_eq!(b.remaining_balance, b.total_entitlement - b.used_balance);
    (b.used_balance, b.remaining_balance)
}

/// Puts a request straight into `approved_manager`, a status only legacy
/// rows carry.
async fn at_approved_manager(store: &MemoryStore, number: &str, start: &str, end: &str) -> u64 {
    let request = NewLeaveRequest {
        request_number: number.into(),
        user_id: EMPLOYEE,
        leave_year: YEAR,
        details: RequestDetails {
            leave_type_id: ANNUAL,
            start_date: date(start),
            end_date: date(end),
            total_days: leave_days(date(start), date(end), false),
            is_half_day: false,
            half_day_period: None,
            reason: "Family trip".into(),
            attachment_path: None,
        },
        status: LeaveStatus::ApprovedManager,
        manager_id: Some(MANAGER),
    };
    RequestStore::insert(store, request).await.unwrap().id
}

/// Request store whose charged transitions stall, then fail on the balance
/// side, so a reader can look at the request while the approval is in flight.
struct StallingCharge {
    inner: Arc<MemoryStore>,
    stall: Duration,
}

#[async_trait]
impl RequestStore for StallingCharge {
    async fn insert(&self, new: NewLeaveRequest) -> LeaveResult<LeaveRequest> {
        RequestStore::insert(self.inner.as_ref(), new).await
    }

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveRequest>> {
        RequestStore::get(self.inner.as_ref(), id).await
    }

    async fn list(&self, filter: &RequestFilter) -> LeaveResult<(Vec<LeaveRequest>, i64)> {
        RequestStore::list(self.inner.as_ref(), filter).await
    }

    async fn transition(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
    ) -> LeaveResult<Option<LeaveRequest>> {
        RequestStore::transition(self.inner.as_ref(), id, from, change).await
    }

    async fn transition_with_charge(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
        _charge: BalanceMutation,
    ) -> LeaveResult<Option<LeaveRequest>> {
        tokio::time::sleep(self.stall).await;
        let failing: BalanceMutation =
            Box::new(|_: &LeaveBalance| Err(LeaveError::Database("connection reset".into())));
        RequestStore::transition_with_charge(self.inner.as_ref(), id, from, change, failing).await
    }

    async fn update_details(
        &self,
        id: u64,
        from: &[LeaveStatus],
        details: RequestDetails,
    ) -> LeaveResult<Option<LeaveRequest>> {
        RequestStore::update_details(self.inner.as_ref(), id, from, details).await
    }

    async fn delete(&self, id: u64, from: &[LeaveStatus]) -> LeaveResult<bool> {
        RequestStore::delete(self.inner.as_ref(), id, from).await
    }
}

/// Submits and takes the request through manager approval.
async fn at_pending_hr(workflow: &LeaveWorkflow, input: SubmitLeave) -> u64 {
    let r = workflow.submit(&employee(), input, YEAR).await.unwrap();
    workflow.manager_approve(&manager(), r.id, None).await.unwrap();
    r.id
}

#[actix_web::test]
async fn test_full_approval_deducts_once() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let r = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap();
    assert_eq!(r.status, LeaveStatus::PendingManager);
    assert_eq!(r.total_days, dec!(5));
    assert_eq!(r.request_number, "LR202600001");
    assert_eq!(r.manager_id, Some(MANAGER));
    assert_eq!(r.leave_year, YEAR);

    let r = workflow
        .manager_approve(&manager(), r.id, Some("enjoy".into()))
        .await
        .unwrap();
    assert_eq!(r.status, LeaveStatus::PendingHr);
    assert_eq!(r.manager_notes.as_deref(), Some("enjoy"));
    assert!(r.manager_approval_date.is_some());
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));

    let r = workflow.hr_approve(&hr(), r.id, None).await.unwrap();
    assert_eq!(r.status, LeaveStatus::ApprovedHr);
    assert_eq!(r.hr_officer_id, Some(HR));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));

    let titles = |recipient: u64| -> Vec<String> {
        store
            .notifications()
            .into_iter()
            .filter(|n| n.recipient_id == recipient)
            .map(|n| n.title)
            .collect()
    };
    assert_eq!(
        titles(EMPLOYEE),
        vec![
            "Leave Request Submitted",
            "Leave Request - Manager Approved",
            "Leave Request - Approved"
        ]
    );
    assert_eq!(titles(MANAGER), vec!["New Leave Request"]);
    assert_eq!(titles(HR), vec!["Leave Request - Pending HR Approval"]);
}

#[actix_web::test]
async fn test_second_hr_approval_is_refused() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;

    workflow.hr_approve(&hr(), id, None).await.unwrap();
    let err = workflow.hr_approve(&hr(), id, None).await.unwrap_err();
    assert!(matches!(
        err,
        LeaveError::InvalidTransition {
            status: LeaveStatus::ApprovedHr,
            ..
        }
    ));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}

#[actix_web::test]
async fn test_no_approval_type_is_recorded_without_deduction() {
    let (workflow, store) = setup();
    with_balance(&workflow, CASUAL, dec!(5)).await;

    let r = workflow
        .submit(&employee(), leave(CASUAL, "2026-04-01", "2026-04-03"), YEAR)
        .await
        .unwrap();
    assert_eq!(r.status, LeaveStatus::ApprovedHr);
    assert_eq!(balance(&workflow, CASUAL).await, (dec!(0), dec!(5)));

    let manager_notes: Vec<_> = store
        .notifications()
        .into_iter()
        .filter(|n| n.recipient_id == MANAGER)
        .collect();
    assert!(manager_notes.is_empty());
}

#[actix_web::test]
async fn test_insufficient_submission_creates_nothing() {
    let (workflow, _) = setup();

    let err = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LeaveError::InsufficientBalance { available, requested }
            if available == dec!(0) && requested == dec!(5)
    ));

    with_balance(&workflow, ANNUAL, dec!(2)).await;
    let err = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LeaveError::InsufficientBalance { available, .. } if available == dec!(2)
    ));

    let mine = workflow.my_requests(&employee(), None, 1, 10).await.unwrap();
    assert_eq!(mine.total, 0);
}

#[actix_web::test]
async fn test_half_day_counts_half() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let mut input = leave(ANNUAL, "2026-03-02", "2026-03-02");
    input.is_half_day = true;
    let err = workflow.submit(&employee(), input.clone(), YEAR).await.unwrap_err();
    assert!(matches!(err, LeaveError::Validation(_)));

    input.half_day_period = Some(HalfDayPeriod::Morning);
    let r = workflow.submit(&employee(), input, YEAR).await.unwrap();
    assert_eq!(r.total_days, dec!(0.5));
    assert_eq!(r.half_day_period, Some(HalfDayPeriod::Morning));

    workflow.manager_approve(&manager(), r.id, None).await.unwrap();
    workflow.hr_approve(&hr(), r.id, None).await.unwrap();
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0.5), dec!(19.5)));
}

#[actix_web::test]
async fn test_balance_drained_before_hr_approval_conflicts() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let first = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-16")).await;
    let second = at_pending_hr(&workflow, leave(ANNUAL, "2026-06-01", "2026-06-15")).await;

    workflow.hr_approve(&hr(), first, None).await.unwrap();
    let err = workflow.hr_approve(&hr(), second, None).await.unwrap_err();
    assert!(matches!(err, LeaveError::Conflict(_)));

    let r = workflow.get(second).await.unwrap();
    assert_eq!(r.status, LeaveStatus::PendingHr);
    assert_eq!(r.hr_officer_id, None);
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(15), dec!(5)));

    // still actionable after the failed attempt
    let r = workflow.hr_reject(&hr(), second, Some("no balance".into())).await.unwrap();
    assert_eq!(r.status, LeaveStatus::RejectedHr);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_deduction_is_never_visible_as_approved() {
    let store = seeded_store();
    let workflow = workflow_over(store.clone(), store.clone());
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;

    let stalling = Arc::new(StallingCharge {
        inner: store.clone(),
        stall: Duration::from_millis(300),
    });
    let slow = workflow_over(store.clone(), stalling);
    let approval = tokio::spawn(async move { slow.hr_approve(&hr(), id, None).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mid_flight = workflow.get(id).await.unwrap();
    assert_eq!(mid_flight.status, LeaveStatus::PendingHr);
    assert_eq!(mid_flight.hr_officer_id, None);
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));

    let err = approval.await.unwrap().unwrap_err();
    assert!(matches!(err, LeaveError::Database(_)));

    let after = workflow.get(id).await.unwrap();
    assert_eq!(after.status, LeaveStatus::PendingHr);
    assert_eq!(after.hr_officer_id, None);
    assert_eq!(after.hr_approval_date, None);
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));

    // nothing is left half-done, so the request is still decidable
    let r = workflow.hr_approve(&hr(), id, None).await.unwrap();
    assert_eq!(r.status, LeaveStatus::ApprovedHr);
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}

#[actix_web::test]
async fn test_manager_approved_request_is_charged_once_by_hr() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_approved_manager(&store, "LR202600901", "2026-03-02", "2026-03-06").await;

    let r = workflow.hr_approve(&hr(), id, Some("ok".into())).await.unwrap();
    assert_eq!(r.status, LeaveStatus::ApprovedHr);
    assert_eq!(r.total_days, dec!(5));
    assert_eq!(r.hr_officer_id, Some(HR));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));

    let err = workflow.hr_approve(&hr(), id, None).await.unwrap_err();
    assert!(matches!(
        err,
        LeaveError::InvalidTransition {
            status: LeaveStatus::ApprovedHr,
            ..
        }
    ));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}

#[actix_web::test]
async fn test_manager_approved_request_can_be_rejected_or_cancelled() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let rejected = at_approved_manager(&store, "LR202600901", "2026-03-02", "2026-03-06").await;
    let r = workflow.hr_reject(&hr(), rejected, Some("audit".into())).await.unwrap();
    assert_eq!(r.status, LeaveStatus::RejectedHr);
    assert_eq!(r.hr_notes.as_deref(), Some("audit"));

    let cancelled = at_approved_manager(&store, "LR202600902", "2026-04-06", "2026-04-07").await;
    let r = workflow.cancel(&employee(), cancelled, "plans changed").await.unwrap();
    assert_eq!(r.status, LeaveStatus::Cancelled);

    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));
    assert!(matches!(
        workflow.hr_approve(&hr(), cancelled, None).await.unwrap_err(),
        LeaveError::InvalidTransition { .. }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_never_overdraw() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let first = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-16")).await;
    let second = at_pending_hr(&workflow, leave(ANNUAL, "2026-06-01", "2026-06-15")).await;

    let tasks = [first, second].map(|id| {
        let workflow = workflow.clone();
        tokio::spawn(async move { workflow.hr_approve(&hr(), id, None).await })
    });
    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(LeaveError::Conflict(_)))));

    let statuses = [
        workflow.get(first).await.unwrap().status,
        workflow.get(second).await.unwrap().status,
    ];
    assert!(statuses.contains(&LeaveStatus::ApprovedHr));
    assert!(statuses.contains(&LeaveStatus::PendingHr));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(15), dec!(5)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_approvers_deduct_once() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.hr_approve(&hr(), id, None).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(LeaveError::InvalidTransition { .. }))));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}

#[actix_web::test]
async fn test_cancel_before_hr_decision() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;

    let err = workflow.cancel(&colleague(), id, "mine now").await.unwrap_err();
    assert!(matches!(err, LeaveError::Forbidden(_)));

    let r = workflow.cancel(&employee(), id, "plans changed").await.unwrap();
    assert_eq!(r.status, LeaveStatus::Cancelled);
    assert_eq!(r.hr_notes.as_deref(), Some("Cancelled by user. Reason: plans changed"));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));

    let err = workflow.cancel(&employee(), id, "again").await.unwrap_err();
    assert!(matches!(
        err,
        LeaveError::InvalidTransition {
            status: LeaveStatus::Cancelled,
            ..
        }
    ));
}

#[actix_web::test]
async fn test_approved_request_cannot_be_cancelled_or_deleted() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;
    workflow.hr_approve(&hr(), id, None).await.unwrap();

    assert!(matches!(
        workflow.cancel(&employee(), id, "too late").await.unwrap_err(),
        LeaveError::InvalidTransition { .. }
    ));
    assert!(matches!(
        workflow.delete(&hr(), id).await.unwrap_err(),
        LeaveError::InvalidTransition { .. }
    ));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}

#[actix_web::test]
async fn test_only_the_requesters_manager_decides() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let r = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap();

    for actor in [colleague(), hr(), employee()] {
        let err = workflow.manager_approve(&actor, r.id, None).await.unwrap_err();
        assert!(matches!(err, LeaveError::Forbidden(_)));
    }
    assert_eq!(workflow.get(r.id).await.unwrap().status, LeaveStatus::PendingManager);

    // HR cannot skip the manager step
    let err = workflow.hr_approve(&hr(), r.id, None).await.unwrap_err();
    assert!(matches!(err, LeaveError::InvalidTransition { .. }));
}

#[actix_web::test]
async fn test_hr_decision_requires_hr_role() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;

    for actor in [manager(), employee()] {
        assert!(matches!(
            workflow.hr_approve(&actor, id, None).await.unwrap_err(),
            LeaveError::Forbidden(_)
        ));
        assert!(matches!(
            workflow.hr_reject(&actor, id, None).await.unwrap_err(),
            LeaveError::Forbidden(_)
        ));
    }

    let admin = Actor::new(300, [Role::Admin]);
    let r = workflow.hr_approve(&admin, id, None).await.unwrap();
    assert_eq!(r.status, LeaveStatus::ApprovedHr);
}

#[actix_web::test]
async fn test_rejections_never_touch_the_ledger() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let r = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap();
    let r = workflow
        .manager_reject(&manager(), r.id, Some("release week".into()))
        .await
        .unwrap();
    assert_eq!(r.status, LeaveStatus::RejectedManager);
    assert_eq!(r.manager_id, Some(MANAGER));

    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-05-04", "2026-05-05")).await;
    let r = workflow.hr_reject(&hr(), id, Some("audit".into())).await.unwrap();
    assert_eq!(r.status, LeaveStatus::RejectedHr);
    assert_eq!(r.hr_notes.as_deref(), Some("audit"));

    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));

    let messages: Vec<_> = store
        .notifications()
        .into_iter()
        .filter(|n| n.recipient_id == EMPLOYEE && n.title.contains("Rejected"))
        .map(|n| n.message)
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].ends_with(": release week"));
    assert!(messages[1].ends_with(": audit"));
}

#[actix_web::test]
async fn test_edit_recomputes_days() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(6)).await;
    let r = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap();

    let patch = LeavePatch {
        end_date: Some(date("2026-03-03")),
        ..Default::default()
    };
    let err = workflow.update(&colleague(), r.id, patch.clone()).await.unwrap_err();
    assert!(matches!(err, LeaveError::Forbidden(_)));

    let updated = workflow.update(&employee(), r.id, patch).await.unwrap();
    assert_eq!(updated.total_days, dec!(2));
    assert_eq!(updated.status, LeaveStatus::PendingManager);

    let too_long = LeavePatch {
        end_date: Some(date("2026-03-20")),
        ..Default::default()
    };
    assert!(matches!(
        workflow.update(&employee(), r.id, too_long).await.unwrap_err(),
        LeaveError::InsufficientBalance { .. }
    ));

    workflow.manager_approve(&manager(), r.id, None).await.unwrap();
    let late = LeavePatch {
        reason: Some("changed my mind".into()),
        ..Default::default()
    };
    assert!(matches!(
        workflow.update(&employee(), r.id, late).await.unwrap_err(),
        LeaveError::InvalidTransition { .. }
    ));
}

#[actix_web::test]
async fn test_delete_pending_request() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    let r = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-06"), YEAR)
        .await
        .unwrap();

    assert!(matches!(
        workflow.delete(&colleague(), r.id).await.unwrap_err(),
        LeaveError::Forbidden(_)
    ));
    workflow.delete(&employee(), r.id).await.unwrap();
    assert!(matches!(workflow.get(r.id).await.unwrap_err(), LeaveError::NotFound(_)));
}

#[actix_web::test]
async fn test_submission_validation() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    with_balance(&workflow, SICK, dec!(10)).await;

    let backwards = leave(ANNUAL, "2026-03-06", "2026-03-02");
    assert!(matches!(
        workflow.submit(&employee(), backwards, YEAR).await.unwrap_err(),
        LeaveError::Validation(_)
    ));

    let mut blank = leave(ANNUAL, "2026-03-02", "2026-03-02");
    blank.reason = "   ".into();
    assert!(matches!(
        workflow.submit(&employee(), blank, YEAR).await.unwrap_err(),
        LeaveError::Validation(_)
    ));

    let mut sick = leave(SICK, "2026-03-02", "2026-03-03");
    assert!(matches!(
        workflow.submit(&employee(), sick.clone(), YEAR).await.unwrap_err(),
        LeaveError::Validation(_)
    ));
    sick.attachment_path = Some("uploads/note.pdf".into());
    workflow.submit(&employee(), sick, YEAR).await.unwrap();

    store.deactivate_leave_type(ANNUAL);
    assert!(matches!(
        workflow
            .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-02"), YEAR)
            .await
            .unwrap_err(),
        LeaveError::Validation(_)
    ));
    assert!(matches!(
        workflow
            .submit(&employee(), leave(99, "2026-03-02", "2026-03-02"), YEAR)
            .await
            .unwrap_err(),
        LeaveError::Validation(_)
    ));
}

#[actix_web::test]
async fn test_operative_year_follows_the_request() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let next_year = leave(ANNUAL, "2027-01-04", "2027-01-05");
    assert!(matches!(
        workflow.submit(&employee(), next_year.clone(), 2027).await.unwrap_err(),
        LeaveError::InsufficientBalance { .. }
    ));

    let key_2027 = BalanceKey { year: 2027, ..key(ANNUAL) };
    workflow.ledger().initialize(key_2027, dec!(22), dec!(0)).await.unwrap();

    let r = workflow.submit(&employee(), next_year, 2027).await.unwrap();
    assert_eq!(r.request_number, "LR202700001");
    workflow.manager_approve(&manager(), r.id, None).await.unwrap();
    workflow.hr_approve(&hr(), r.id, None).await.unwrap();

    let b = workflow.ledger().find(key_2027).await.unwrap().unwrap();
    assert_eq!(b.used_balance, dec!(2));
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(0), dec!(20)));
}

#[actix_web::test]
async fn test_queues_and_visibility() {
    let (workflow, _) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;

    let a = workflow
        .submit(&employee(), leave(ANNUAL, "2026-03-02", "2026-03-03"), YEAR)
        .await
        .unwrap();
    let b = workflow
        .submit(&employee(), leave(ANNUAL, "2026-04-02", "2026-04-03"), YEAR)
        .await
        .unwrap();
    assert_eq!(b.request_number, "LR202600002");

    let queue = workflow.pending_for_manager(&manager()).await.unwrap();
    assert_eq!(queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    assert!(workflow.pending_for_manager(&colleague()).await.unwrap().is_empty());

    workflow.manager_approve(&manager(), b.id, None).await.unwrap();
    let hr_queue = workflow.pending_for_hr(&hr()).await.unwrap();
    assert_eq!(hr_queue.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b.id]);
    assert!(matches!(
        workflow.pending_for_hr(&employee()).await.unwrap_err(),
        LeaveError::Forbidden(_)
    ));

    for actor in [employee(), manager(), hr()] {
        workflow.view(&actor, a.id).await.unwrap();
    }
    assert!(matches!(
        workflow.view(&colleague(), a.id).await.unwrap_err(),
        LeaveError::Forbidden(_)
    ));

    let page = workflow.list(&hr(), Some(EMPLOYEE), None, 1, 1).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, b.id);
    assert!(matches!(
        workflow.list(&employee(), None, None, 1, 10).await.unwrap_err(),
        LeaveError::Forbidden(_)
    ));

    let pending = workflow
        .my_requests(&employee(), Some(LeaveStatus::PendingManager), 1, 10)
        .await
        .unwrap();
    assert_eq!(pending.total, 1);
}

#[actix_web::test]
async fn test_notification_failures_are_swallowed() {
    let (workflow, store) = setup();
    with_balance(&workflow, ANNUAL, dec!(20)).await;
    store.fail_notifications(true);

    let id = at_pending_hr(&workflow, leave(ANNUAL, "2026-03-02", "2026-03-06")).await;
    workflow.hr_approve(&hr(), id, None).await.unwrap();

    assert!(store.notifications().is_empty());
    assert_eq!(balance(&workflow, ANNUAL).await, (dec!(5), dec!(15)));
}
