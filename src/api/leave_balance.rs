use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::YearQuery;
use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::ledger::BalanceLedger;
use crate::model::leave_balance::{BalanceFilter, BalanceKey, LeaveBalance};

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    #[param(example = 1000)]
    pub user_id: Option<u64>,
    #[param(example = 1)]
    pub leave_type_id: Option<u64>,
    #[param(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateBalance {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    /// defaults to the current year
    #[schema(example = 2026)]
    pub year: Option<i32>,
    #[schema(example = "20", value_type = String)]
    pub base_entitlement: Decimal,
    #[serde(default)]
    #[schema(example = "2.5", value_type = String)]
    pub carried_over: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct AdjustBalance {
    /// positive grants, negative revokes
    #[schema(example = "-1.5", value_type = String)]
    pub delta: Decimal,
    #[schema(example = "Correction after audit")]
    pub reason: String,
    pub notes: Option<String>,
}

/// Balances are visible to their owner and to HR.
async fn visible_balance(
    auth: &AuthUser,
    ledger: &BalanceLedger,
    balance_id: u64,
) -> actix_web::Result<LeaveBalance> {
    let balance = ledger.get(balance_id).await?;
    if balance.user_id != auth.user_id {
        auth.require_hr_or_admin()
            .map_err(|_| LeaveError::Forbidden("You cannot view this balance".into()))?;
    }
    Ok(balance)
}

#[utoipa::path(
    get,
    path = "/api/balances",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balances ordered by user then leave type", body = [LeaveBalance]),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn list_balances(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let filter = BalanceFilter {
        user_id: query.user_id,
        leave_type_id: query.leave_type_id,
        year: query.year,
    };
    Ok(HttpResponse::Ok().json(ledger.list(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/balances",
    request_body = CreateBalance,
    responses(
        (status = 201, description = "Balance initialized", body = LeaveBalance),
        (status = 400, description = "Invalid amounts"),
        (status = 403, description = "HR/Admin only"),
        (status = 409, description = "Balance already exists for that year")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn create_balance(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    payload: web::Json<CreateBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let key = BalanceKey {
        user_id: payload.user_id,
        leave_type_id: payload.leave_type_id,
        year: YearQuery { year: payload.year }.resolve(),
    };
    let balance = ledger
        .initialize(key, payload.base_entitlement, payload.carried_over)
        .await?;
    Ok(HttpResponse::Created().json(balance))
}

#[utoipa::path(
    get,
    path = "/api/balances/mine",
    params(YearQuery),
    responses(
        (status = 200, description = "The caller's balances for the year", body = [LeaveBalance])
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn my_balances(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    year: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let balances = ledger.user_balances(auth.user_id, year.resolve()).await?;
    Ok(HttpResponse::Ok().json(balances))
}

#[utoipa::path(
    post,
    path = "/api/balances/initialize/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User to create balances for"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Balances that were missing and got created", body = [LeaveBalance]),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn initialize_user_balances(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<u64>,
    year: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let created = ledger
        .initialize_user(path.into_inner(), year.resolve())
        .await?;
    Ok(HttpResponse::Ok().json(created))
}

#[utoipa::path(
    get,
    path = "/api/balances/{balance_id}",
    params(("balance_id" = u64, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "Balance found", body = LeaveBalance),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Balance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn get_balance(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let balance = visible_balance(&auth, &ledger, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[utoipa::path(
    delete,
    path = "/api/balances/{balance_id}",
    params(("balance_id" = u64, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "Balance deleted", body = Object, example = json!({
            "message": "Leave balance deleted"
        })),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Balance not found"),
        (status = 409, description = "Balance has usage or adjustment history")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn delete_balance(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    ledger.remove(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave balance deleted" })))
}

#[utoipa::path(
    post,
    path = "/api/balances/{balance_id}/adjust",
    params(("balance_id" = u64, Path, description = "ID of the balance")),
    request_body = AdjustBalance,
    responses(
        (status = 200, description = "Entitlement adjusted", body = LeaveBalance),
        (status = 400, description = "Invalid delta or missing reason"),
        (status = 403, description = "HR/Admin only"),
        (status = 422, description = "Entitlement would become negative")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn adjust_balance(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<u64>,
    payload: web::Json<AdjustBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let balance = ledger
        .adjust_entitlement(
            path.into_inner(),
            payload.delta,
            &payload.reason,
            auth.user_id,
            payload.notes,
        )
        .await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[utoipa::path(
    get,
    path = "/api/balances/{balance_id}/history",
    params(("balance_id" = u64, Path, description = "ID of the balance")),
    responses(
        (status = 200, description = "Adjustments, newest first", body = [BalanceHistory]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Balance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Balance"
)]
pub async fn balance_history(
    auth: AuthUser,
    ledger: web::Data<BalanceLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let balance = visible_balance(&auth, &ledger, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ledger.history(balance.id).await?))
}
