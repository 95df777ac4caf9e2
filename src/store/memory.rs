//! Process-local implementation of every storage seam, behind one mutex.
//!
//! Backs `STORAGE=memory` and the test suites. Holding the single lock for the
//! whole of a write gives the same atomicity the MySQL store gets from row
//! locks and conditional updates.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::catalog::LeaveTypeStore;
use crate::directory::{
    DepartmentDirectory, IdentityProvider, LeaveTypeRegistry, NotificationSink, SequenceSource,
};
use crate::error::{LeaveError, LeaveResult};
use crate::ledger::{BalanceMutation, BalanceStore};
use crate::model::department::Department;
use crate::model::leave_balance::{
    BalanceFilter, BalanceHistory, BalanceRef, LeaveBalance, NewBalance,
};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, NewLeaveRequest, RequestDetails, RequestFilter, StatusChange,
};
use crate::model::leave_type::{LeaveType, NewLeaveType};
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::user::UserProfile;
use crate::workflow::RequestStore;

#[derive(Default)]
struct State {
    balances: BTreeMap<u64, LeaveBalance>,
    history: Vec<BalanceHistory>,
    requests: BTreeMap<u64, LeaveRequest>,
    leave_types: BTreeMap<u64, LeaveType>,
    users: BTreeMap<u64, UserProfile>,
    departments: BTreeMap<u64, Department>,
    sequences: HashMap<i32, u32>,
    notifications: Vec<Notification>,
    fail_notifications: bool,
    last_balance_id: u64,
    last_request_id: u64,
    last_leave_type_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_leave_type(
        &self,
        id: u64,
        code: &str,
        annual_entitlement: Decimal,
        requires_approval: bool,
        requires_attachment: bool,
    ) -> u64 {
        let now = Utc::now();
        self.state().leave_types.insert(
            id,
            LeaveType {
                id,
                code: code.to_string(),
                name: format!("{code} leave"),
                description: None,
                annual_entitlement,
                max_consecutive_days: 0,
                requires_approval,
                requires_attachment,
                is_paid: true,
                affects_salary: false,
                is_carryover_allowed: false,
                max_carryover_days: Decimal::ZERO,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn deactivate_leave_type(&self, id: u64) {
        if let Some(t) = self.state().leave_types.get_mut(&id) {
            t.is_active = false;
        }
    }

    pub fn seed_user(&self, id: u64, display_name: &str, department_id: Option<u64>, roles: &[Role]) {
        self.state().users.insert(
            id,
            UserProfile {
                id,
                display_name: display_name.to_string(),
                department_id,
                roles: roles.to_vec(),
                is_active: true,
            },
        );
    }

    pub fn seed_department(&self, id: u64, name: &str, manager_id: Option<u64>) {
        self.state().departments.insert(
            id,
            Department {
                id,
                name: name.to_string(),
                manager_id,
            },
        );
    }

    /// Everything delivered so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    /// Makes every following delivery fail.
    pub fn fail_notifications(&self, fail: bool) {
        self.state().fail_notifications = fail;
    }
}

/// Ids are never handed out twice, even after a delete. Seeded rows can sit
/// above the counter, so it also skips past the highest live key.
fn bump<V>(last: &mut u64, map: &BTreeMap<u64, V>) -> u64 {
    let newest = map.keys().next_back().copied().unwrap_or(0);
    *last = (*last).max(newest) + 1;
    *last
}

impl State {
    fn next_balance_id(&mut self) -> u64 {
        bump(&mut self.last_balance_id, &self.balances)
    }

    fn next_request_id(&mut self) -> u64 {
        bump(&mut self.last_request_id, &self.requests)
    }

    fn next_leave_type_id(&mut self) -> u64 {
        bump(&mut self.last_leave_type_id, &self.leave_types)
    }

    /// Read-validate-write of one balance. Nothing is written when `mutate`
    /// fails.
    fn mutate_balance(&mut self, at: BalanceRef, mutate: BalanceMutation) -> LeaveResult<LeaveBalance> {
        let id = find_balance(self, at)
            .ok_or_else(|| LeaveError::NotFound("Leave balance not found".into()))?;

        let snapshot = self.balances[&id].clone();
        let update = mutate(&snapshot)?;
        let now = Utc::now();

        if let Some(entry) = update.journal.clone() {
            let history_id = self.history.len() as u64 + 1;
            self.history.push(BalanceHistory {
                id: history_id,
                balance_id: id,
                changed_by: entry.changed_by,
                reason: entry.reason,
                delta: entry.delta,
                before: entry.before,
                after: entry.after,
                notes: entry.notes,
                created_at: now,
            });
        }

        let balance = self
            .balances
            .get_mut(&id)
            .ok_or_else(|| LeaveError::NotFound("Leave balance not found".into()))?;
        balance.total_entitlement = update.total_entitlement;
        balance.used_balance = update.used_balance;
        balance.remaining_balance = update.remaining_balance();
        balance.updated_at = now;
        Ok(balance.clone())
    }
}

fn find_balance(state: &State, at: BalanceRef) -> Option<u64> {
    match at {
        BalanceRef::Id(id) => state.balances.contains_key(&id).then_some(id),
        BalanceRef::Key(key) => state
            .balances
            .values()
            .find(|b| b.key() == key)
            .map(|b| b.id),
    }
}

fn apply_change(request: &mut LeaveRequest, change: StatusChange) {
    request.status = change.target();
    match change {
        StatusChange::Manager {
            manager_id, at, notes, ..
        } => {
            request.manager_id = Some(manager_id);
            request.manager_approval_date = Some(at);
            request.manager_notes = notes;
        }
        StatusChange::Hr {
            hr_officer_id, at, notes, ..
        } => {
            request.hr_officer_id = Some(hr_officer_id);
            request.hr_approval_date = Some(at);
            request.hr_notes = notes;
        }
        StatusChange::Cancel { notes } => {
            request.hr_notes = Some(notes);
        }
    }
    request.updated_at = Utc::now();
}

/* =========================
Balances
========================= */

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn insert(&self, new: NewBalance) -> LeaveResult<LeaveBalance> {
        let mut state = self.state();
        if find_balance(&state, BalanceRef::Key(new.key)).is_some() {
            return Err(LeaveError::AlreadyExists("Leave balance already exists".into()));
        }

        let now = Utc::now();
        let total = new.base_entitlement + new.carried_over;
        let balance = LeaveBalance {
            id: state.next_balance_id(),
            user_id: new.key.user_id,
            leave_type_id: new.key.leave_type_id,
            year: new.key.year,
            total_entitlement: total,
            used_balance: Decimal::ZERO,
            carried_over: new.carried_over,
            remaining_balance: total,
            created_at: now,
            updated_at: now,
        };
        state.balances.insert(balance.id, balance.clone());
        Ok(balance)
    }

    async fn get(&self, at: BalanceRef) -> LeaveResult<Option<LeaveBalance>> {
        let state = self.state();
        Ok(find_balance(&state, at).and_then(|id| state.balances.get(&id).cloned()))
    }

    async fn list(&self, filter: &BalanceFilter) -> LeaveResult<Vec<LeaveBalance>> {
        let mut rows: Vec<LeaveBalance> = self
            .state()
            .balances
            .values()
            .filter(|b| filter.user_id.is_none_or(|u| b.user_id == u))
            .filter(|b| filter.leave_type_id.is_none_or(|t| b.leave_type_id == t))
            .filter(|b| filter.year.is_none_or(|y| b.year == y))
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.user_id, b.leave_type_id, b.year));
        Ok(rows)
    }

    async fn update_locked(&self, at: BalanceRef, mutate: BalanceMutation) -> LeaveResult<LeaveBalance> {
        self.state().mutate_balance(at, mutate)
    }

    async fn history(&self, balance_id: u64) -> LeaveResult<Vec<BalanceHistory>> {
        Ok(self
            .state()
            .history
            .iter()
            .rev()
            .filter(|h| h.balance_id == balance_id)
            .cloned()
            .collect())
    }

    async fn delete_unused(&self, balance_id: u64) -> LeaveResult<bool> {
        let mut state = self.state();
        let has_history = state.history.iter().any(|h| h.balance_id == balance_id);
        let unused = state
            .balances
            .get(&balance_id)
            .is_some_and(|b| b.used_balance.is_zero());

        if has_history || !unused {
            return Ok(false);
        }
        Ok(state.balances.remove(&balance_id).is_some())
    }
}

/* =========================
Requests
========================= */

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert(&self, new: NewLeaveRequest) -> LeaveResult<LeaveRequest> {
        let mut state = self.state();
        if state.requests.values().any(|r| r.request_number == new.request_number) {
            return Err(LeaveError::AlreadyExists(format!(
                "Request number {} already exists",
                new.request_number
            )));
        }

        let now = Utc::now();
        let d = new.details;
        let request = LeaveRequest {
            id: state.next_request_id(),
            request_number: new.request_number,
            user_id: new.user_id,
            leave_type_id: d.leave_type_id,
            leave_year: new.leave_year,
            start_date: d.start_date,
            end_date: d.end_date,
            total_days: d.total_days,
            is_half_day: d.is_half_day,
            half_day_period: d.half_day_period,
            reason: d.reason,
            attachment_path: d.attachment_path,
            status: new.status,
            manager_id: new.manager_id,
            manager_approval_date: None,
            manager_notes: None,
            hr_officer_id: None,
            hr_approval_date: None,
            hr_notes: None,
            created_at: now,
            updated_at: now,
        };
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveRequest>> {
        Ok(self.state().requests.get(&id).cloned())
    }

    async fn list(&self, filter: &RequestFilter) -> LeaveResult<(Vec<LeaveRequest>, i64)> {
        let mut rows: Vec<LeaveRequest> = self
            .state()
            .requests
            .values()
            .filter(|r| filter.user_ids.as_ref().is_none_or(|ids| ids.contains(&r.user_id)))
            .filter(|r| filter.statuses.as_ref().is_none_or(|s| s.contains(&r.status)))
            .cloned()
            .collect();

        // ids grow with insertion, so they order by creation
        rows.sort_by_key(|r| r.id);
        if !filter.oldest_first {
            rows.reverse();
        }

        let total = rows.len() as i64;
        if let Some((limit, offset)) = filter.window {
            rows = rows.into_iter().skip(offset as usize).take(limit as usize).collect();
        }
        Ok((rows, total))
    }

    async fn transition(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
    ) -> LeaveResult<Option<LeaveRequest>> {
        let mut state = self.state();
        match state.requests.get_mut(&id) {
            Some(request) if from.contains(&request.status) => {
                apply_change(request, change);
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn transition_with_charge(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
        charge: BalanceMutation,
    ) -> LeaveResult<Option<LeaveRequest>> {
        let mut state = self.state();
        let key = match state.requests.get(&id) {
            Some(request) if from.contains(&request.status) => request.balance_key(),
            _ => return Ok(None),
        };

        state.mutate_balance(BalanceRef::Key(key), charge)?;

        let request = state
            .requests
            .get_mut(&id)
            .ok_or_else(|| LeaveError::NotFound("Leave request not found".into()))?;
        apply_change(request, change);
        Ok(Some(request.clone()))
    }

    async fn update_details(
        &self,
        id: u64,
        from: &[LeaveStatus],
        details: RequestDetails,
    ) -> LeaveResult<Option<LeaveRequest>> {
        let mut state = self.state();
        match state.requests.get_mut(&id) {
            Some(request) if from.contains(&request.status) => {
                request.leave_type_id = details.leave_type_id;
                request.start_date = details.start_date;
                request.end_date = details.end_date;
                request.total_days = details.total_days;
                request.is_half_day = details.is_half_day;
                request.half_day_period = details.half_day_period;
                request.reason = details.reason;
                request.attachment_path = details.attachment_path;
                request.updated_at = Utc::now();
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: u64, from: &[LeaveStatus]) -> LeaveResult<bool> {
        let mut state = self.state();
        if state.requests.get(&id).is_some_and(|r| from.contains(&r.status)) {
            state.requests.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

/* =========================
Leave types
========================= */

fn types_by_name(state: &State, is_active: Option<bool>) -> Vec<LeaveType> {
    let mut rows: Vec<LeaveType> = state
        .leave_types
        .values()
        .filter(|t| is_active.is_none_or(|a| t.is_active == a))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

#[async_trait]
impl LeaveTypeStore for MemoryStore {
    async fn insert(&self, new: NewLeaveType) -> LeaveResult<LeaveType> {
        let mut state = self.state();
        if state.leave_types.values().any(|t| t.code == new.code) {
            return Err(LeaveError::AlreadyExists(format!("Leave type code {} already exists", new.code)));
        }

        let now = Utc::now();
        let leave_type = LeaveType {
            id: state.next_leave_type_id(),
            code: new.code,
            name: new.name,
            description: new.description,
            annual_entitlement: new.annual_entitlement,
            max_consecutive_days: new.max_consecutive_days,
            requires_approval: new.requires_approval,
            requires_attachment: new.requires_attachment,
            is_paid: new.is_paid,
            affects_salary: new.affects_salary,
            is_carryover_allowed: new.is_carryover_allowed,
            max_carryover_days: new.max_carryover_days,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        state.leave_types.insert(leave_type.id, leave_type.clone());
        Ok(leave_type)
    }

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveType>> {
        Ok(self.state().leave_types.get(&id).cloned())
    }

    async fn list(&self, is_active: Option<bool>) -> LeaveResult<Vec<LeaveType>> {
        Ok(types_by_name(&self.state(), is_active))
    }

    async fn save(&self, leave_type: &LeaveType) -> LeaveResult<bool> {
        let mut state = self.state();
        match state.leave_types.get_mut(&leave_type.id) {
            Some(row) => {
                *row = LeaveType {
                    updated_at: Utc::now(),
                    ..leave_type.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl LeaveTypeRegistry for MemoryStore {
    async fn leave_type(&self, id: u64) -> LeaveResult<Option<LeaveType>> {
        Ok(self.state().leave_types.get(&id).cloned())
    }

    async fn active_types(&self) -> LeaveResult<Vec<LeaveType>> {
        Ok(types_by_name(&self.state(), Some(true)))
    }
}

/* =========================
Directory, sequence, notifications
========================= */

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn user(&self, user_id: u64) -> LeaveResult<Option<UserProfile>> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn users_with_roles(&self, roles: &[Role]) -> LeaveResult<Vec<u64>> {
        Ok(self
            .state()
            .users
            .values()
            .filter(|u| u.is_active && u.roles.iter().any(|r| roles.contains(r)))
            .map(|u| u.id)
            .collect())
    }
}

#[async_trait]
impl DepartmentDirectory for MemoryStore {
    async fn department(&self, department_id: u64) -> LeaveResult<Option<Department>> {
        Ok(self.state().departments.get(&department_id).cloned())
    }

    async fn reports_of(&self, manager_id: u64) -> LeaveResult<Vec<u64>> {
        let state = self.state();
        Ok(state
            .users
            .values()
            .filter(|u| u.id != manager_id)
            .filter(|u| {
                u.department_id
                    .and_then(|d| state.departments.get(&d))
                    .is_some_and(|d| d.manager_id == Some(manager_id))
            })
            .map(|u| u.id)
            .collect())
    }
}

#[async_trait]
impl SequenceSource for MemoryStore {
    async fn next_request_seq(&self, year: i32) -> LeaveResult<u32> {
        let mut state = self.state();
        let seq = state.sequences.entry(year).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}

#[async_trait]
impl NotificationSink for MemoryStore {
    async fn notify(&self, notification: Notification) -> LeaveResult<()> {
        let mut state = self.state();
        if state.fail_notifications {
            return Err(LeaveError::Database("notification channel unavailable".into()));
        }
        state.notifications.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_balance::BalanceKey;
    use crate::model::leave_request::RequestDetails;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn new_request(number: &str, user_id: u64, status: LeaveStatus) -> NewLeaveRequest {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        NewLeaveRequest {
            request_number: number.into(),
            user_id,
            leave_year: 2026,
            details: RequestDetails {
                leave_type_id: 1,
                start_date: day,
                end_date: day,
                total_days: dec!(1),
                is_half_day: false,
                half_day_period: None,
                reason: "errand".into(),
                attachment_path: None,
            },
            status,
            manager_id: None,
        }
    }

    #[actix_web::test]
    async fn test_transition_is_compare_and_set() {
        let store: Arc<dyn RequestStore> = Arc::new(MemoryStore::default());
        let r = store
            .insert(new_request("LR202600001", 10, LeaveStatus::PendingHr))
            .await
            .unwrap();

        let claim = || StatusChange::Hr {
            to: LeaveStatus::ApprovedHr,
            hr_officer_id: 7,
            at: Utc::now(),
            notes: None,
        };
        assert!(store.transition(r.id, &[LeaveStatus::PendingHr], claim()).await.unwrap().is_some());
        assert!(store.transition(r.id, &[LeaveStatus::PendingHr], claim()).await.unwrap().is_none());

        let stored = store.get(r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::ApprovedHr);
        assert_eq!(stored.hr_officer_id, Some(7));
    }

    fn hr_approval() -> StatusChange {
        StatusChange::Hr {
            to: LeaveStatus::ApprovedHr,
            hr_officer_id: 7,
            at: Utc::now(),
            notes: None,
        }
    }

    #[actix_web::test]
    async fn test_charged_transition_writes_both_or_neither() {
        let store = Arc::new(MemoryStore::default());
        let key = BalanceKey {
            user_id: 10,
            leave_type_id: 1,
            year: 2026,
        };
        BalanceStore::insert(
            store.as_ref(),
            NewBalance {
                key,
                base_entitlement: dec!(1),
                carried_over: dec!(0),
            },
        )
        .await
        .unwrap();
        let requests: Arc<dyn RequestStore> = store.clone();
        let first = requests
            .insert(new_request("LR202600001", 10, LeaveStatus::PendingHr))
            .await
            .unwrap();
        let second = requests
            .insert(new_request("LR202600002", 10, LeaveStatus::PendingHr))
            .await
            .unwrap();
        let charge = || -> BalanceMutation {
            Box::new(|b: &LeaveBalance| crate::ledger::rules::deduction(b, dec!(1)))
        };

        let approved = requests
            .transition_with_charge(first.id, &[LeaveStatus::PendingHr], hr_approval(), charge())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::ApprovedHr);

        // balance is now empty, so the second charge fails and nothing moves
        let err = requests
            .transition_with_charge(second.id, &[LeaveStatus::PendingHr], hr_approval(), charge())
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InsufficientBalance { .. }));
        let untouched = requests.get(second.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, LeaveStatus::PendingHr);
        assert_eq!(untouched.hr_officer_id, None);

        // stale `from` is a no-op and charges nothing
        let none = requests
            .transition_with_charge(first.id, &[LeaveStatus::PendingHr], hr_approval(), charge())
            .await
            .unwrap();
        assert!(none.is_none());

        let b = BalanceStore::get(store.as_ref(), BalanceRef::Key(key)).await.unwrap().unwrap();
        assert_eq!(b.used_balance, dec!(1));
        assert_eq!(b.remaining_balance, dec!(0));
    }

    #[actix_web::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store: Arc<dyn RequestStore> = Arc::new(MemoryStore::default());
        store.insert(new_request("LR202600001", 10, LeaveStatus::PendingManager)).await.unwrap();
        let second = store
            .insert(new_request("LR202600002", 10, LeaveStatus::PendingManager))
            .await
            .unwrap();
        assert_eq!(second.id, 2);

        assert!(store.delete(second.id, &[LeaveStatus::PendingManager]).await.unwrap());
        let third = store
            .insert(new_request("LR202600003", 10, LeaveStatus::PendingManager))
            .await
            .unwrap();
        assert_eq!(third.id, 3);
        assert!(store.get(second.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_leave_type_ids_continue_past_seeded_rows() {
        let store = MemoryStore::default();
        store.seed_leave_type(5, "AL", dec!(20), true, false);
        let created = LeaveTypeStore::insert(
            &store,
            NewLeaveType {
                code: "SL".into(),
                name: "Sick".into(),
                description: None,
                annual_entitlement: dec!(10),
                max_consecutive_days: 0,
                requires_approval: true,
                requires_attachment: false,
                is_paid: true,
                affects_salary: false,
                is_carryover_allowed: false,
                max_carryover_days: dec!(0),
                is_active: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.id, 6);
    }

    #[actix_web::test]
    async fn test_request_list_window_and_order() {
        let store: Arc<dyn RequestStore> = Arc::new(MemoryStore::default());
        for n in 1..=5 {
            store
                .insert(new_request(&format!("LR2026{n:05}"), 10, LeaveStatus::PendingManager))
                .await
                .unwrap();
        }
        store.insert(new_request("LR202600006", 11, LeaveStatus::Cancelled)).await.unwrap();

        let filter = RequestFilter {
            user_ids: Some(vec![10]),
            window: Some((2, 1)),
            ..Default::default()
        };
        let (rows, total) = store.list(&filter).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![4, 3]);
    }

    #[actix_web::test]
    async fn test_balance_mutation_error_leaves_row_untouched() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryStore::default());
        let key = BalanceKey {
            user_id: 1,
            leave_type_id: 1,
            year: 2026,
        };
        store
            .insert(NewBalance {
                key,
                base_entitlement: dec!(3),
                carried_over: dec!(0),
            })
            .await
            .unwrap();

        let err = store
            .update_locked(
                BalanceRef::Key(key),
                Box::new(|b: &LeaveBalance| crate::ledger::rules::deduction(b, dec!(4))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InsufficientBalance { .. }));

        let b = store.get(BalanceRef::Key(key)).await.unwrap().unwrap();
        assert_eq!(b.used_balance, dec!(0));
        assert_eq!(b.remaining_balance, dec!(3));
    }

    #[actix_web::test]
    async fn test_reports_and_hr_lookup() {
        let store = MemoryStore::default();
        store.seed_department(1, "Engineering", Some(100));
        store.seed_user(100, "Manager", Some(1), &[Role::Employee]);
        store.seed_user(10, "Alice", Some(1), &[Role::Employee]);
        store.seed_user(11, "Bob", None, &[Role::Employee]);
        store.seed_user(200, "Hana", None, &[Role::Hr]);
        store.seed_user(300, "Root", None, &[Role::Admin]);

        assert_eq!(store.reports_of(100).await.unwrap(), vec![10]);
        assert_eq!(store.users_with_roles(&Role::HR_ROLES).await.unwrap(), vec![200, 300]);
    }

    #[actix_web::test]
    async fn test_sequence_is_per_year() {
        let store = MemoryStore::default();
        assert_eq!(store.next_request_seq(2026).await.unwrap(), 1);
        assert_eq!(store.next_request_seq(2026).await.unwrap(), 2);
        assert_eq!(store.next_request_seq(2027).await.unwrap(), 1);
    }
}
