use crate::api::leave_balance::{AdjustBalance, CreateBalance};
use crate::api::leave_request::{CancelLeave, Decision, LeaveListResponse};
use crate::model::leave_balance::{BalanceHistory, LeaveBalance};
use crate::model::leave_request::{HalfDayPeriod, LeavePatch, LeaveRequest, LeaveStatus, SubmitLeave};
use crate::model::leave_type::{LeaveType, LeaveTypePatch, NewLeaveType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "0.1.0",
        description = r#"
## Employee Leave Management

Leave requests move through a two-stage approval (line manager, then HR).
Final HR approval deducts the requested days from the employee's balance
for the request's leave year.

### Key Features
- **Leave requests**: submit, edit, cancel, and decide at manager and HR level
- **Leave balances**: per user, leave type and year, with an adjustment journal
- **Leave types**: catalog administration

### Security
All endpoints expect a **JWT Bearer** token. Decisions and administration
are limited to HR/Admin roles, manager decisions to the requester's manager.

### Response Format
JSON bodies; errors are `{"error": CODE, "message": text}`.
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_for_manager,
        crate::api::leave_request::pending_for_hr,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::manager_approve_leave,
        crate::api::leave_request::manager_reject_leave,
        crate::api::leave_request::hr_approve_leave,
        crate::api::leave_request::hr_reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::leave_balance::list_balances,
        crate::api::leave_balance::create_balance,
        crate::api::leave_balance::my_balances,
        crate::api::leave_balance::initialize_user_balances,
        crate::api::leave_balance::get_balance,
        crate::api::leave_balance::delete_balance,
        crate::api::leave_balance::adjust_balance,
        crate::api::leave_balance::balance_history,

        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::get_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::toggle_leave_type,
        crate::api::leave_type::delete_leave_type
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveStatus,
            HalfDayPeriod,
            SubmitLeave,
            LeavePatch,
            Decision,
            CancelLeave,
            LeaveListResponse,
            LeaveBalance,
            BalanceHistory,
            CreateBalance,
            AdjustBalance,
            LeaveType,
            NewLeaveType,
            LeaveTypePatch
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle"),
        (name = "Balance", description = "Leave balance ledger"),
        (name = "Leave Type", description = "Leave type catalog"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
