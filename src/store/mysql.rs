//! sqlx / MySQL implementation of the storage seams.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlConnection, MySqlExecutor, MySqlPool};
use tracing::error;

use crate::catalog::LeaveTypeStore;
use crate::directory::{DepartmentDirectory, IdentityProvider, NotificationSink, SequenceSource};
use crate::error::{LeaveError, LeaveResult};
use crate::ledger::{BalanceMutation, BalanceStore};
use crate::model::department::Department;
use crate::model::leave_balance::{
    BalanceFilter, BalanceHistory, BalanceRef, LeaveBalance, NewBalance,
};
use crate::model::leave_request::{
    HalfDayPeriod, LeaveRequest, LeaveStatus, NewLeaveRequest, RequestDetails, RequestFilter,
    StatusChange,
};
use crate::model::leave_type::{LeaveType, NewLeaveType};
use crate::model::notification::Notification;
use crate::model::role::Role;
use crate::model::user::UserProfile;
use crate::workflow::RequestStore;

const BALANCE_COLUMNS: &str = "id, user_id, leave_type_id, year, total_entitlement, used_balance, \
     carried_over, remaining_balance, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, request_number, user_id, leave_type_id, leave_year, start_date, \
     end_date, total_days, is_half_day, half_day_period, reason, attachment_path, status, \
     manager_id, manager_approval_date, manager_notes, hr_officer_id, hr_approval_date, hr_notes, \
     created_at, updated_at";

const LEAVE_TYPE_COLUMNS: &str = "id, code, name, description, annual_entitlement, \
     max_consecutive_days, requires_approval, requires_attachment, is_paid, affects_salary, \
     is_carryover_allowed, max_carryover_days, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// `?, ?, ?` for an `IN (…)` list.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/* =========================
Balances
========================= */

async fn fetch_balance<'e, E: MySqlExecutor<'e>>(
    executor: E,
    at: BalanceRef,
    for_update: bool,
) -> LeaveResult<Option<LeaveBalance>> {
    let lock = if for_update { " FOR UPDATE" } else { "" };

    let row = match at {
        BalanceRef::Id(id) => {
            let sql = format!("SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE id = ?{lock}");
            sqlx::query_as::<_, LeaveBalance>(&sql)
                .bind(id)
                .fetch_optional(executor)
                .await?
        }
        BalanceRef::Key(key) => {
            let sql = format!(
                "SELECT {BALANCE_COLUMNS} FROM leave_balances \
                 WHERE user_id = ? AND leave_type_id = ? AND year = ?{lock}"
            );
            sqlx::query_as::<_, LeaveBalance>(&sql)
                .bind(key.user_id)
                .bind(key.leave_type_id)
                .bind(key.year)
                .fetch_optional(executor)
                .await?
        }
    };
    Ok(row)
}

/// Locks the balance row, runs `mutate` on the locked snapshot and writes the
/// result (plus its journal row) on `conn`. The caller owns the transaction.
async fn charge_balance(
    conn: &mut MySqlConnection,
    at: BalanceRef,
    mutate: BalanceMutation,
) -> LeaveResult<LeaveBalance> {
    let current = fetch_balance(&mut *conn, at, true)
        .await?
        .ok_or_else(|| LeaveError::NotFound("Leave balance not found".into()))?;

    let update = mutate(&current)?;

    sqlx::query(
        r#"
        UPDATE leave_balances
        SET total_entitlement = ?, used_balance = ?, remaining_balance = ?
        WHERE id = ?
        "#,
    )
    .bind(update.total_entitlement)
    .bind(update.used_balance)
    .bind(update.remaining_balance())
    .bind(current.id)
    .execute(&mut *conn)
    .await?;

    if let Some(entry) = &update.journal {
        sqlx::query(
            r#"
            INSERT INTO leave_balance_history
                (balance_id, changed_by, reason, delta, before_value, after_value, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(current.id)
        .bind(entry.changed_by)
        .bind(&entry.reason)
        .bind(entry.delta)
        .bind(entry.before)
        .bind(entry.after)
        .bind(&entry.notes)
        .execute(&mut *conn)
        .await?;
    }

    fetch_balance(&mut *conn, BalanceRef::Id(current.id), false)
        .await?
        .ok_or_else(|| LeaveError::NotFound("Leave balance not found".into()))
}

/// Conditional status update; `false` when the row is not in `from`.
async fn apply_transition<'e, E: MySqlExecutor<'e>>(
    executor: E,
    id: u64,
    from: &[LeaveStatus],
    change: StatusChange,
) -> LeaveResult<bool> {
    if from.is_empty() {
        return Ok(false);
    }

    let set_sql = match &change {
        StatusChange::Manager { .. } => {
            "status = ?, manager_id = ?, manager_approval_date = ?, manager_notes = ?"
        }
        StatusChange::Hr { .. } => "status = ?, hr_officer_id = ?, hr_approval_date = ?, hr_notes = ?",
        StatusChange::Cancel { .. } => "status = ?, hr_notes = ?",
    };
    let sql = format!(
        "UPDATE leave_requests SET {set_sql} WHERE id = ? AND status IN ({})",
        placeholders(from.len())
    );

    let mut q = sqlx::query(&sql).bind(change.target().to_string());
    q = match change {
        StatusChange::Manager {
            manager_id, at, notes, ..
        } => q.bind(manager_id).bind(at).bind(notes),
        StatusChange::Hr {
            hr_officer_id, at, notes, ..
        } => q.bind(hr_officer_id).bind(at).bind(notes),
        StatusChange::Cancel { notes } => q.bind(notes),
    };
    q = q.bind(id);
    for status in from {
        q = q.bind(status.to_string());
    }

    Ok(q.execute(executor).await?.rows_affected() > 0)
}

#[async_trait]
impl BalanceStore for MySqlStore {
    async fn insert(&self, new: NewBalance) -> LeaveResult<LeaveBalance> {
        let total = new.base_entitlement + new.carried_over;

        let result = sqlx::query(
            r#"
            INSERT INTO leave_balances
                (user_id, leave_type_id, year, total_entitlement, used_balance, carried_over, remaining_balance)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(new.key.user_id)
        .bind(new.key.leave_type_id)
        .bind(new.key.year)
        .bind(total)
        .bind(new.carried_over)
        .bind(total)
        .execute(&self.pool)
        .await?;

        fetch_balance(&self.pool, BalanceRef::Id(result.last_insert_id()), false)
            .await?
            .ok_or_else(|| LeaveError::Database("Inserted balance vanished".into()))
    }

    async fn get(&self, at: BalanceRef) -> LeaveResult<Option<LeaveBalance>> {
        fetch_balance(&self.pool, at, false).await
    }

    async fn list(&self, filter: &BalanceFilter) -> LeaveResult<Vec<LeaveBalance>> {
        let mut where_sql = String::from(" WHERE 1=1");
        if filter.user_id.is_some() {
            where_sql.push_str(" AND user_id = ?");
        }
        if filter.leave_type_id.is_some() {
            where_sql.push_str(" AND leave_type_id = ?");
        }
        if filter.year.is_some() {
            where_sql.push_str(" AND year = ?");
        }

        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances{where_sql} ORDER BY user_id, leave_type_id, year"
        );
        let mut q = sqlx::query_as::<_, LeaveBalance>(&sql);
        if let Some(v) = filter.user_id {
            q = q.bind(v);
        }
        if let Some(v) = filter.leave_type_id {
            q = q.bind(v);
        }
        if let Some(v) = filter.year {
            q = q.bind(v);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn update_locked(&self, at: BalanceRef, mutate: BalanceMutation) -> LeaveResult<LeaveBalance> {
        let mut tx = self.pool.begin().await?;
        // dropping `tx` on an early return rolls back and releases the lock
        let balance = charge_balance(&mut *tx, at, mutate).await?;
        tx.commit().await?;

        Ok(balance)
    }

    async fn history(&self, balance_id: u64) -> LeaveResult<Vec<BalanceHistory>> {
        let rows = sqlx::query_as::<_, BalanceHistory>(
            r#"
            SELECT id, balance_id, changed_by, reason, delta,
                   before_value AS `before`, after_value AS `after`, notes, created_at
            FROM leave_balance_history
            WHERE balance_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(balance_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_unused(&self, balance_id: u64) -> LeaveResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM leave_balances
            WHERE id = ?
              AND used_balance = 0
              AND NOT EXISTS (SELECT 1 FROM leave_balance_history h WHERE h.balance_id = leave_balances.id)
            "#,
        )
        .bind(balance_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/* =========================
Requests
========================= */

#[derive(FromRow)]
struct RequestRow {
    id: u64,
    request_number: String,
    user_id: u64,
    leave_type_id: u64,
    leave_year: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_days: Decimal,
    is_half_day: bool,
    half_day_period: Option<String>,
    reason: String,
    attachment_path: Option<String>,
    status: String,
    manager_id: Option<u64>,
    manager_approval_date: Option<DateTime<Utc>>,
    manager_notes: Option<String>,
    hr_officer_id: Option<u64>,
    hr_approval_date: Option<DateTime<Utc>>,
    hr_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for LeaveRequest {
    type Error = LeaveError;

    fn try_from(row: RequestRow) -> LeaveResult<Self> {
        let status = LeaveStatus::from_str(&row.status).map_err(|_| {
            error!(request_id = row.id, status = %row.status, "Unknown leave status in database");
            LeaveError::Database(format!("unknown leave status {}", row.status))
        })?;
        let half_day_period = row
            .half_day_period
            .as_deref()
            .map(HalfDayPeriod::from_str)
            .transpose()
            .map_err(|_| LeaveError::Database("unknown half day period".into()))?;

        Ok(LeaveRequest {
            id: row.id,
            request_number: row.request_number,
            user_id: row.user_id,
            leave_type_id: row.leave_type_id,
            leave_year: row.leave_year,
            start_date: row.start_date,
            end_date: row.end_date,
            total_days: row.total_days,
            is_half_day: row.is_half_day,
            half_day_period,
            reason: row.reason,
            attachment_path: row.attachment_path,
            status,
            manager_id: row.manager_id,
            manager_approval_date: row.manager_approval_date,
            manager_notes: row.manager_notes,
            hr_officer_id: row.hr_officer_id,
            hr_approval_date: row.hr_approval_date,
            hr_notes: row.hr_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl RequestStore for MySqlStore {
    async fn insert(&self, new: NewLeaveRequest) -> LeaveResult<LeaveRequest> {
        let d = &new.details;
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (request_number, user_id, leave_type_id, leave_year, start_date, end_date, total_days,
                 is_half_day, half_day_period, reason, attachment_path, status, manager_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.request_number)
        .bind(new.user_id)
        .bind(d.leave_type_id)
        .bind(new.leave_year)
        .bind(d.start_date)
        .bind(d.end_date)
        .bind(d.total_days)
        .bind(d.is_half_day)
        .bind(d.half_day_period.map(|p| p.to_string()))
        .bind(&d.reason)
        .bind(&d.attachment_path)
        .bind(new.status.to_string())
        .bind(new.manager_id)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        RequestStore::get(self, id)
            .await?
            .ok_or_else(|| LeaveError::Database(format!("Inserted leave request #{id} vanished")))
    }

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?");
        sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn list(&self, filter: &RequestFilter) -> LeaveResult<(Vec<LeaveRequest>, i64)> {
        // -------------------------
        // WHERE clause
        // -------------------------
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(ids) = &filter.user_ids {
            if ids.is_empty() {
                return Ok((Vec::new(), 0));
            }
            where_sql.push_str(&format!(" AND user_id IN ({})", placeholders(ids.len())));
            args.extend(ids.iter().copied().map(FilterValue::U64));
        }
        if let Some(statuses) = &filter.statuses {
            if statuses.is_empty() {
                return Ok((Vec::new(), 0));
            }
            where_sql.push_str(&format!(" AND status IN ({})", placeholders(statuses.len())));
            args.extend(statuses.iter().map(|s| FilterValue::Str(s.to_string())));
        }

        // -------------------------
        // COUNT query
        // -------------------------
        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(s.as_str()),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        // -------------------------
        // DATA query
        // -------------------------
        let order = if filter.oldest_first { "ASC" } else { "DESC" };
        let window = if filter.window.is_some() { " LIMIT ? OFFSET ?" } else { "" };
        let data_sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_requests{where_sql} ORDER BY created_at {order}, id {order}{window}"
        );

        let mut data_q = sqlx::query_as::<_, RequestRow>(&data_sql);
        for arg in &args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(*v),
                FilterValue::Str(s) => data_q.bind(s.as_str()),
            };
        }
        if let Some((limit, offset)) = filter.window {
            data_q = data_q.bind(limit).bind(offset);
        }

        let rows = data_q
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<LeaveResult<Vec<_>>>()?;

        Ok((rows, total))
    }

    async fn transition(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
    ) -> LeaveResult<Option<LeaveRequest>> {
        if !apply_transition(&self.pool, id, from, change).await? {
            return Ok(None);
        }
        RequestStore::get(self, id).await
    }

    async fn transition_with_charge(
        &self,
        id: u64,
        from: &[LeaveStatus],
        change: StatusChange,
        charge: BalanceMutation,
    ) -> LeaveResult<Option<LeaveRequest>> {
        let mut tx = self.pool.begin().await?;

        // request row first, then balance row; the same order everywhere
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ? FOR UPDATE");
        let request = match sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(row) => LeaveRequest::try_from(row)?,
            None => return Ok(None),
        };
        if !from.contains(&request.status) {
            return Ok(None);
        }

        charge_balance(&mut *tx, BalanceRef::Key(request.balance_key()), charge).await?;
        if !apply_transition(&mut *tx, id, from, change).await? {
            return Ok(None);
        }

        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        LeaveRequest::try_from(row).map(Some)
    }

    async fn update_details(
        &self,
        id: u64,
        from: &[LeaveStatus],
        details: RequestDetails,
    ) -> LeaveResult<Option<LeaveRequest>> {
        if from.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            r#"
            UPDATE leave_requests
            SET leave_type_id = ?, start_date = ?, end_date = ?, total_days = ?, is_half_day = ?,
                half_day_period = ?, reason = ?, attachment_path = ?
            WHERE id = ? AND status IN ({})
            "#,
            placeholders(from.len())
        );

        let mut q = sqlx::query(&sql)
            .bind(details.leave_type_id)
            .bind(details.start_date)
            .bind(details.end_date)
            .bind(details.total_days)
            .bind(details.is_half_day)
            .bind(details.half_day_period.map(|p| p.to_string()))
            .bind(details.reason)
            .bind(details.attachment_path)
            .bind(id);
        for status in from {
            q = q.bind(status.to_string());
        }

        if q.execute(&self.pool).await?.rows_affected() == 0 {
            return Ok(None);
        }
        RequestStore::get(self, id).await
    }

    async fn delete(&self, id: u64, from: &[LeaveStatus]) -> LeaveResult<bool> {
        if from.is_empty() {
            return Ok(false);
        }

        let sql = format!(
            "DELETE FROM leave_requests WHERE id = ? AND status IN ({})",
            placeholders(from.len())
        );
        let mut q = sqlx::query(&sql).bind(id);
        for status in from {
            q = q.bind(status.to_string());
        }
        Ok(q.execute(&self.pool).await?.rows_affected() > 0)
    }
}

/* =========================
Leave types
========================= */

#[async_trait]
impl LeaveTypeStore for MySqlStore {
    async fn insert(&self, new: NewLeaveType) -> LeaveResult<LeaveType> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_types
                (code, name, description, annual_entitlement, max_consecutive_days, requires_approval,
                 requires_attachment, is_paid, affects_salary, is_carryover_allowed, max_carryover_days, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.code)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.annual_entitlement)
        .bind(new.max_consecutive_days)
        .bind(new.requires_approval)
        .bind(new.requires_attachment)
        .bind(new.is_paid)
        .bind(new.affects_salary)
        .bind(new.is_carryover_allowed)
        .bind(new.max_carryover_days)
        .bind(new.is_active)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        LeaveTypeStore::get(self, id)
            .await?
            .ok_or_else(|| LeaveError::Database(format!("Inserted leave type #{id} vanished")))
    }

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveType>> {
        let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE id = ?");
        Ok(sqlx::query_as::<_, LeaveType>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, is_active: Option<bool>) -> LeaveResult<Vec<LeaveType>> {
        let rows = match is_active {
            Some(active) => {
                let sql = format!(
                    "SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE is_active = ? ORDER BY name"
                );
                sqlx::query_as::<_, LeaveType>(&sql)
                    .bind(active)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types ORDER BY name");
                sqlx::query_as::<_, LeaveType>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(rows)
    }

    async fn save(&self, t: &LeaveType) -> LeaveResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_types
            SET name = ?, description = ?, annual_entitlement = ?, max_consecutive_days = ?,
                requires_approval = ?, requires_attachment = ?, is_paid = ?, affects_salary = ?,
                is_carryover_allowed = ?, max_carryover_days = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.annual_entitlement)
        .bind(t.max_consecutive_days)
        .bind(t.requires_approval)
        .bind(t.requires_attachment)
        .bind(t.is_paid)
        .bind(t.affects_salary)
        .bind(t.is_carryover_allowed)
        .bind(t.max_carryover_days)
        .bind(t.is_active)
        .bind(t.id)
        .execute(&self.pool)
        .await?;

        // MySQL reports 0 affected rows for a no-op update, so check existence separately
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(LeaveTypeStore::get(self, t.id).await?.is_some())
    }
}

/* =========================
Directory, sequence, notifications
========================= */

#[derive(FromRow)]
struct UserRow {
    id: u64,
    display_name: String,
    department_id: Option<u64>,
    role_id: u8,
    is_active: bool,
}

#[async_trait]
impl IdentityProvider for MySqlStore {
    async fn user(&self, user_id: u64) -> LeaveResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, display_name, department_id, role_id, is_active FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|u| UserProfile {
            id: u.id,
            display_name: u.display_name,
            department_id: u.department_id,
            roles: Role::from_id(u.role_id).into_iter().collect(),
            is_active: u.is_active,
        }))
    }

    async fn users_with_roles(&self, roles: &[Role]) -> LeaveResult<Vec<u64>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id FROM users WHERE is_active = TRUE AND role_id IN ({}) ORDER BY id",
            placeholders(roles.len())
        );
        let mut q = sqlx::query_scalar::<_, u64>(&sql);
        for role in roles {
            q = q.bind(role.id());
        }
        Ok(q.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl DepartmentDirectory for MySqlStore {
    async fn department(&self, department_id: u64) -> LeaveResult<Option<Department>> {
        Ok(sqlx::query_as::<_, Department>(
            "SELECT id, name, manager_id FROM departments WHERE id = ?",
        )
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn reports_of(&self, manager_id: u64) -> LeaveResult<Vec<u64>> {
        Ok(sqlx::query_scalar::<_, u64>(
            r#"
            SELECT u.id
            FROM users u
            JOIN departments d ON d.id = u.department_id
            WHERE d.manager_id = ? AND u.id <> ?
            ORDER BY u.id
            "#,
        )
        .bind(manager_id)
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl SequenceSource for MySqlStore {
    async fn next_request_seq(&self, year: i32) -> LeaveResult<u32> {
        // LAST_INSERT_ID(expr) hands the new counter back through the result
        let result = sqlx::query(
            r#"
            INSERT INTO leave_request_sequences (year, last_seq)
            VALUES (?, LAST_INSERT_ID(1))
            ON DUPLICATE KEY UPDATE last_seq = LAST_INSERT_ID(last_seq + 1)
            "#,
        )
        .bind(year)
        .execute(&self.pool)
        .await?;

        u32::try_from(result.last_insert_id())
            .map_err(|_| LeaveError::Database(format!("request sequence for {year} overflowed")))
    }
}

#[async_trait]
impl NotificationSink for MySqlStore {
    async fn notify(&self, n: Notification) -> LeaveResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, title, message, category, correlated_entity_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(n.recipient_id)
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.category.to_string())
        .bind(n.correlated_entity_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
