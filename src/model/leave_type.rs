use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "AL")]
    pub code: String,
    #[schema(example = "Annual Leave")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "20", value_type = String)]
    pub annual_entitlement: Decimal,
    #[schema(example = 0)]
    pub max_consecutive_days: u32,
    pub requires_approval: bool,
    pub requires_attachment: bool,
    pub is_paid: bool,
    pub affects_salary: bool,
    pub is_carryover_allowed: bool,
    #[schema(example = "5", value_type = String)]
    pub max_carryover_days: Decimal,
    pub is_active: bool,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLeaveType {
    #[schema(example = "AL")]
    pub code: String,
    #[schema(example = "Annual Leave")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "20", value_type = String)]
    pub annual_entitlement: Decimal,
    #[serde(default)]
    pub max_consecutive_days: u32,
    #[serde(default = "yes")]
    pub requires_approval: bool,
    #[serde(default)]
    pub requires_attachment: bool,
    #[serde(default = "yes")]
    pub is_paid: bool,
    #[serde(default)]
    pub affects_salary: bool,
    #[serde(default)]
    pub is_carryover_allowed: bool,
    #[serde(default)]
    #[schema(value_type = String)]
    pub max_carryover_days: Decimal,
    #[serde(default = "yes")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeaveTypePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub annual_entitlement: Option<Decimal>,
    pub max_consecutive_days: Option<u32>,
    pub requires_approval: Option<bool>,
    pub requires_attachment: Option<bool>,
    pub is_paid: Option<bool>,
    pub affects_salary: Option<bool>,
    pub is_carryover_allowed: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub max_carryover_days: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl LeaveTypePatch {
    pub fn apply(self, leave_type: &mut LeaveType) {
        if let Some(v) = self.name {
            leave_type.name = v;
        }
        if let Some(v) = self.description {
            leave_type.description = Some(v);
        }
        if let Some(v) = self.annual_entitlement {
            leave_type.annual_entitlement = v;
        }
        if let Some(v) = self.max_consecutive_days {
            leave_type.max_consecutive_days = v;
        }
        if let Some(v) = self.requires_approval {
            leave_type.requires_approval = v;
        }
        if let Some(v) = self.requires_attachment {
            leave_type.requires_attachment = v;
        }
        if let Some(v) = self.is_paid {
            leave_type.is_paid = v;
        }
        if let Some(v) = self.affects_salary {
            leave_type.affects_salary = v;
        }
        if let Some(v) = self.is_carryover_allowed {
            leave_type.is_carryover_allowed = v;
        }
        if let Some(v) = self.max_carryover_days {
            leave_type.max_carryover_days = v;
        }
        if let Some(v) = self.is_active {
            leave_type.is_active = v;
        }
    }
}
