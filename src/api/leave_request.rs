use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::YearQuery;
use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeavePatch, LeaveRequest, LeaveStatus, Page, SubmitLeave};
use crate::workflow::LeaveWorkflow;

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

impl From<Page<LeaveRequest>> for LeaveListResponse {
    fn from(page: Page<LeaveRequest>) -> Self {
        Self {
            data: page.data,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by requester
    #[param(example = 1000)]
    pub user_id: Option<u64>,
    /// Filter by status
    #[param(example = "pending_hr", value_type = Option<String>)]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Default, Deserialize, ToSchema)]
pub struct Decision {
    #[schema(example = "Enjoy your time off")]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelLeave {
    #[schema(example = "Plans changed")]
    pub reason: String,
}

fn notes(body: Option<web::Json<Decision>>) -> Option<String> {
    body.map(web::Json::into_inner).unwrap_or_default().notes
}

/* =========================
Submit / edit / delete
========================= */

#[utoipa::path(
    post,
    path = "/api/leave",
    params(YearQuery),
    request_body = SubmitLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates, reason or leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Insufficient leave balance")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    year: web::Query<YearQuery>,
    payload: web::Json<SubmitLeave>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .submit(&auth.actor(), payload.into_inner(), year.resolve())
        .await?;
    Ok(HttpResponse::Created().json(request))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to edit")),
    request_body = LeavePatch,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Request is no longer editable"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<LeavePatch>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .update(&auth.actor(), path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to delete")),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted"
        })),
        (status = 400, description = "Approved requests cannot be deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    workflow.delete(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request deleted" })))
}

/* =========================
Decisions
========================= */

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/manager/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body(content = Decision, description = "Optional notes"),
    responses(
        (status = 200, description = "Forwarded to HR", body = LeaveRequest),
        (status = 400, description = "Request is not waiting for a manager"),
        (status = 403, description = "Not the requester's manager")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn manager_approve_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    body: Option<web::Json<Decision>>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .manager_approve(&auth.actor(), path.into_inner(), notes(body))
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/manager/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body(content = Decision, description = "Optional notes"),
    responses(
        (status = 200, description = "Rejected by manager", body = LeaveRequest),
        (status = 400, description = "Request is not waiting for a manager"),
        (status = 403, description = "Not the requester's manager")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn manager_reject_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    body: Option<web::Json<Decision>>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .manager_reject(&auth.actor(), path.into_inner(), notes(body))
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/hr/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body(content = Decision, description = "Optional notes"),
    responses(
        (status = 200, description = "Approved and deducted", body = LeaveRequest),
        (status = 400, description = "Request is not waiting for HR"),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "Balance no longer covers the request")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn hr_approve_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    body: Option<web::Json<Decision>>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .hr_approve(&auth.actor(), path.into_inner(), notes(body))
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/hr/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body(content = Decision, description = "Optional notes"),
    responses(
        (status = 200, description = "Rejected by HR", body = LeaveRequest),
        (status = 400, description = "Request is not waiting for HR"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn hr_reject_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    body: Option<web::Json<Decision>>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .hr_reject(&auth.actor(), path.into_inner(), notes(body))
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "ID of the leave request")),
    request_body = CancelLeave,
    responses(
        (status = 200, description = "Leave request cancelled", body = LeaveRequest),
        (status = 400, description = "Request can no longer be cancelled"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<CancelLeave>,
) -> actix_web::Result<impl Responder> {
    let request = workflow
        .cancel(&auth.actor(), path.into_inner(), &payload.reason)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Queries
========================= */

#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = workflow.view(&auth.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let page = workflow
        .list(
            &auth.actor(),
            query.user_id,
            query.status,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(10),
        )
        .await?;
    Ok(HttpResponse::Ok().json(LeaveListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/leave/mine",
    params(LeaveFilter),
    responses(
        (status = 200, description = "The caller's own requests", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let page = workflow
        .my_requests(
            &auth.actor(),
            query.status,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(10),
        )
        .await?;
    Ok(HttpResponse::Ok().json(LeaveListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/leave/pending/manager",
    responses(
        (status = 200, description = "Requests of the caller's reports waiting for a decision", body = [LeaveRequest])
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_for_manager(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> actix_web::Result<impl Responder> {
    let requests = workflow.pending_for_manager(&auth.actor()).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    get,
    path = "/api/leave/pending/hr",
    responses(
        (status = 200, description = "Requests waiting for HR, oldest first", body = [LeaveRequest]),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_for_hr(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> actix_web::Result<impl Responder> {
    let requests = workflow.pending_for_hr(&auth.actor()).await?;
    Ok(HttpResponse::Ok().json(requests))
}
