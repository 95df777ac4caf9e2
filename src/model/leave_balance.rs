use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Identity of a balance row: one per user, leave type and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceKey {
    pub user_id: u64,
    pub leave_type_id: u64,
    pub year: i32,
}

#[derive(Debug, Clone, Copy)]
pub enum BalanceRef {
    Id(u64),
    Key(BalanceKey),
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    /// base entitlement plus carry-over
    #[schema(example = "20", value_type = String)]
    pub total_entitlement: Decimal,
    #[schema(example = "5", value_type = String)]
    pub used_balance: Decimal,
    #[schema(example = "0", value_type = String)]
    pub carried_over: Decimal,
    #[schema(example = "15", value_type = String)]
    pub remaining_balance: Decimal,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    pub fn key(&self) -> BalanceKey {
        BalanceKey {
            user_id: self.user_id,
            leave_type_id: self.leave_type_id,
            year: self.year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBalance {
    pub key: BalanceKey,
    pub base_entitlement: Decimal,
    pub carried_over: Decimal,
}

/// One manual entitlement adjustment. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct BalanceHistory {
    pub id: u64,
    pub balance_id: u64,
    pub changed_by: u64,
    pub reason: String,
    #[schema(value_type = String)]
    pub delta: Decimal,
    #[schema(value_type = String)]
    pub before: Decimal,
    #[schema(value_type = String)]
    pub after: Decimal,
    pub notes: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub changed_by: u64,
    pub reason: String,
    pub delta: Decimal,
    pub before: Decimal,
    pub after: Decimal,
    pub notes: Option<String>,
}

/// New numbers for a balance row, computed from a locked snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    pub total_entitlement: Decimal,
    pub used_balance: Decimal,
    pub journal: Option<JournalEntry>,
}

impl BalanceUpdate {
    pub fn remaining_balance(&self) -> Decimal {
        self.total_entitlement - self.used_balance
    }
}

#[derive(Debug, Clone, Default)]
pub struct BalanceFilter {
    pub user_id: Option<u64>,
    pub leave_type_id: Option<u64>,
    pub year: Option<i32>,
}
