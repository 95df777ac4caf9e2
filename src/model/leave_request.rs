use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::leave_balance::BalanceKey;

/// Half-day leave always counts as this much, whatever dates were supplied.
pub const HALF_DAY: Decimal = dec!(0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    PendingManager,
    ApprovedManager,
    PendingHr,
    ApprovedHr,
    RejectedManager,
    RejectedHr,
    Cancelled,
}

impl LeaveStatus {
    pub const ALL: [LeaveStatus; 7] = [
        LeaveStatus::PendingManager,
        LeaveStatus::ApprovedManager,
        LeaveStatus::PendingHr,
        LeaveStatus::ApprovedHr,
        LeaveStatus::RejectedManager,
        LeaveStatus::RejectedHr,
        LeaveStatus::Cancelled,
    ];

    /// Status a freshly submitted request starts in.
    pub fn initial(requires_approval: bool) -> Self {
        if requires_approval {
            LeaveStatus::PendingManager
        } else {
            LeaveStatus::ApprovedHr
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LeaveStatus::ApprovedHr
                | LeaveStatus::RejectedManager
                | LeaveStatus::RejectedHr
                | LeaveStatus::Cancelled
        )
    }
}

/// Everything that can be done to an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LeaveAction {
    #[strum(serialize = "manager approve")]
    ManagerApprove,
    #[strum(serialize = "manager reject")]
    ManagerReject,
    #[strum(serialize = "HR approve")]
    HrApprove,
    #[strum(serialize = "HR reject")]
    HrReject,
    #[strum(serialize = "cancel")]
    Cancel,
    #[strum(serialize = "edit")]
    Edit,
    #[strum(serialize = "delete")]
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HalfDayPeriod {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    /// `LR<year><5-digit sequence>`
    #[schema(example = "LR202600001")]
    pub request_number: String,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    /// Year of the balance this request is checked and charged against
    #[schema(example = 2026)]
    pub leave_year: i32,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "5", value_type = String)]
    pub total_days: Decimal,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    #[schema(example = "Family trip")]
    pub reason: String,
    pub attachment_path: Option<String>,
    pub status: LeaveStatus,
    pub manager_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub manager_approval_date: Option<DateTime<Utc>>,
    pub manager_notes: Option<String>,
    pub hr_officer_id: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub hr_approval_date: Option<DateTime<Utc>>,
    pub hr_notes: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// The owner-editable part of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDetails {
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: Decimal,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub reason: String,
    pub attachment_path: Option<String>,
}

impl LeaveRequest {
    /// The balance an HR approval charges.
    pub fn balance_key(&self) -> BalanceKey {
        BalanceKey {
            user_id: self.user_id,
            leave_type_id: self.leave_type_id,
            year: self.leave_year,
        }
    }

    pub fn details(&self) -> RequestDetails {
        RequestDetails {
            leave_type_id: self.leave_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
            total_days: self.total_days,
            is_half_day: self.is_half_day,
            half_day_period: self.half_day_period,
            reason: self.reason.clone(),
            attachment_path: self.attachment_path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub request_number: String,
    pub user_id: u64,
    pub leave_year: i32,
    pub details: RequestDetails,
    pub status: LeaveStatus,
    pub manager_id: Option<u64>,
}

/// Field writes that accompany a status change.
#[derive(Debug, Clone)]
pub enum StatusChange {
    Manager {
        to: LeaveStatus,
        manager_id: u64,
        at: DateTime<Utc>,
        notes: Option<String>,
    },
    Hr {
        to: LeaveStatus,
        hr_officer_id: u64,
        at: DateTime<Utc>,
        notes: Option<String>,
    },
    Cancel {
        notes: String,
    },
}

impl StatusChange {
    pub fn target(&self) -> LeaveStatus {
        match self {
            StatusChange::Manager { to, .. } | StatusChange::Hr { to, .. } => *to,
            StatusChange::Cancel { .. } => LeaveStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub user_ids: Option<Vec<u64>>,
    pub statuses: Option<Vec<LeaveStatus>>,
    pub oldest_first: bool,
    /// `(limit, offset)`; `None` returns everything
    pub window: Option<(u64, u64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    #[schema(example = "Family trip")]
    pub reason: String,
    pub attachment_path: Option<String>,
}

/// Owner edit of a request still waiting for its manager.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeavePatch {
    pub leave_type_id: Option<u64>,
    #[schema(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub is_half_day: Option<bool>,
    pub half_day_period: Option<HalfDayPeriod>,
    pub reason: Option<String>,
    pub attachment_path: Option<String>,
}

impl LeavePatch {
    /// Merges the patch over `current`; `total_days` is left for the caller to recompute.
    pub fn merge(self, current: &RequestDetails) -> RequestDetails {
        let is_half_day = self.is_half_day.unwrap_or(current.is_half_day);
        RequestDetails {
            leave_type_id: self.leave_type_id.unwrap_or(current.leave_type_id),
            start_date: self.start_date.unwrap_or(current.start_date),
            end_date: self.end_date.unwrap_or(current.end_date),
            total_days: current.total_days,
            is_half_day,
            half_day_period: if is_half_day {
                self.half_day_period.or(current.half_day_period)
            } else {
                None
            },
            reason: self.reason.unwrap_or_else(|| current.reason.clone()),
            attachment_path: self.attachment_path.or_else(|| current.attachment_path.clone()),
        }
    }
}

/// Calendar days covered by `start..=end`, or a flat half day.
pub fn leave_days(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> Decimal {
    if is_half_day {
        return HALF_DAY;
    }
    Decimal::from((end - start).num_days().abs() + 1)
}
