use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::catalog::LeaveTypeCatalog;
use crate::model::leave_type::{LeaveTypePatch, NewLeaveType};

#[derive(Deserialize, IntoParams)]
pub struct LeaveTypeQuery {
    /// Only active (true) or inactive (false) types
    #[param(example = true)]
    pub is_active: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/leave-types",
    params(LeaveTypeQuery),
    responses((status = 200, description = "Leave types ordered by name", body = [LeaveType])),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    query: web::Query<LeaveTypeQuery>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(catalog.list(query.is_active).await?))
}

#[utoipa::path(
    post,
    path = "/api/leave-types",
    request_body = NewLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "Code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    payload: web::Json<NewLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave_type = catalog.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave_type))
}

#[utoipa::path(
    get,
    path = "/api/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "ID of the leave type")),
    responses(
        (status = 200, description = "Leave type found", body = LeaveType),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn get_leave_type(
    _auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(catalog.get(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "ID of the leave type")),
    request_body = LeaveTypePatch,
    responses(
        (status = 200, description = "Leave type updated", body = LeaveType),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn update_leave_type(
    auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    path: web::Path<u64>,
    payload: web::Json<LeaveTypePatch>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave_type = catalog
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(leave_type))
}

#[utoipa::path(
    put,
    path = "/api/leave-types/{leave_type_id}/toggle",
    params(("leave_type_id" = u64, Path, description = "ID of the leave type")),
    responses(
        (status = 200, description = "Active flag flipped", body = LeaveType),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn toggle_leave_type(
    auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(catalog.toggle_active(path.into_inner()).await?))
}

/// Deactivates; leave types are never hard deleted.
#[utoipa::path(
    delete,
    path = "/api/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "ID of the leave type")),
    responses(
        (status = 200, description = "Leave type deactivated", body = LeaveType),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn delete_leave_type(
    auth: AuthUser,
    catalog: web::Data<LeaveTypeCatalog>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    Ok(HttpResponse::Ok().json(catalog.deactivate(path.into_inner()).await?))
}
