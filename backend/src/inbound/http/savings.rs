//! Savings deposit handlers.
//!
//! ```text
//! GET  /api/v1/groups/{groupId}/savings?memberId=&monthYear=
//! POST /api/v1/groups/{groupId}/savings
//! PUT  /api/v1/groups/{groupId}/savings/{savingId}/status
//! ```

use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NewSaving, Saving, SavingFilter, SavingId, SavingStatus};
use crate::inbound::http::access::group_access;
use crate::inbound::http::members::MEMBER_ID;
use crate::inbound::http::schemas::{ErrorSchema, SavingSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_amount, parse_date, parse_id, parse_optional_id, parse_optional_month_year,
    parse_optional_value, parse_value, require, FieldName,
};
use crate::inbound::http::ApiResult;

const AMOUNT: FieldName = FieldName::new("amount");
const DEPOSIT_DATE: FieldName = FieldName::new("depositDate");
const MONTH_YEAR: FieldName = FieldName::new("monthYear");
const STATUS: FieldName = FieldName::new("status");
const SAVING_ID: FieldName = FieldName::new("savingId");

/// A savings deposit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavingRequest {
    #[schema(format = Uuid)]
    pub member_id: Option<String>,
    #[schema(example = "500.00")]
    pub amount: Option<String>,
    #[schema(format = Date)]
    pub deposit_date: Option<String>,
    /// Savings month; defaults to the deposit date's month.
    #[schema(example = "2025-03")]
    pub month_year: Option<String>,
    /// Bookkeepers may choose; member deposits are always `pending`.
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// New status for a deposit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavingStatusRequest {
    /// `completed`, `pending` or `late`.
    #[schema(example = "completed")]
    pub status: Option<String>,
}

/// Query string for listing deposits.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SavingsQuery {
    /// Only deposits of this member.
    pub member_id: Option<String>,
    /// Only deposits in this `YYYY-MM` bucket.
    pub month_year: Option<String>,
}

fn parse_saving(payload: SavingRequest) -> Result<NewSaving, Error> {
    Ok(NewSaving {
        member_id: parse_id(&require(payload.member_id, MEMBER_ID)?, MEMBER_ID)?,
        amount: parse_amount(&require(payload.amount, AMOUNT)?, AMOUNT)?,
        deposit_date: parse_date(&require(payload.deposit_date, DEPOSIT_DATE)?, DEPOSIT_DATE)?,
        month_year: parse_optional_month_year(payload.month_year.as_deref(), MONTH_YEAR)?,
        status: parse_optional_value(payload.status.as_deref(), STATUS)?,
        notes: payload.notes,
    })
}

/// List deposits of the group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/savings",
    params(("groupId" = String, Path, description = "Group id"), SavingsQuery),
    responses(
        (status = 200, description = "Deposits, newest first", body = [SavingSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["savings"],
    operation_id = "listSavings"
)]
#[get("/groups/{groupId}/savings")]
pub async fn list_savings(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<SavingsQuery>,
) -> ApiResult<web::Json<Vec<Saving>>> {
    let access = group_access(&state, &session, &path).await?;
    let filter = SavingFilter {
        member_id: parse_optional_id(query.member_id.as_deref(), MEMBER_ID)?,
        month_year: parse_optional_month_year(query.month_year.as_deref(), MONTH_YEAR)?,
    };
    Ok(web::Json(state.savings.list_savings(&access, filter).await?))
}

/// Record a deposit.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/savings",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = SavingRequest,
    responses(
        (status = 201, description = "Deposit recorded", body = SavingSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["savings"],
    operation_id = "recordDeposit"
)]
#[post("/groups/{groupId}/savings")]
pub async fn record_deposit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SavingRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let request = parse_saving(payload.into_inner())?;
    let saving = state.savings.record_deposit(&access, request).await?;
    Ok(HttpResponse::Created().json(saving))
}

/// Change a deposit's status.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{groupId}/savings/{savingId}/status",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("savingId" = String, Path, description = "Deposit id")
    ),
    request_body = SavingStatusRequest,
    responses(
        (status = 200, description = "Updated deposit", body = SavingSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["savings"],
    operation_id = "updateSavingStatus"
)]
#[put("/groups/{groupId}/savings/{savingId}/status")]
pub async fn update_saving_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<SavingStatusRequest>,
) -> ApiResult<web::Json<Saving>> {
    let (group_id, saving_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let saving_id: SavingId = parse_id(&saving_id, SAVING_ID)?;
    let status: SavingStatus =
        parse_value(&require(payload.into_inner().status, STATUS)?, STATUS)?;
    Ok(web::Json(
        state
            .savings
            .update_saving_status(&access, saving_id, status)
            .await?,
    ))
}
