//! Penalty handlers.
//!
//! ```text
//! GET  /api/v1/groups/{groupId}/penalties?memberId=&status=
//! POST /api/v1/groups/{groupId}/penalties
//! POST /api/v1/groups/{groupId}/penalties/{penaltyId}/pay
//! POST /api/v1/groups/{groupId}/penalties/{penaltyId}/waive
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NewPenalty, Penalty, PenaltyFilter, PenaltyId, PenaltyType};
use crate::inbound::http::access::group_access;
use crate::inbound::http::loans::LOAN_ID;
use crate::inbound::http::members::MEMBER_ID;
use crate::inbound::http::schemas::{ErrorSchema, PenaltySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_amount, parse_date, parse_id, parse_optional_id, parse_optional_value, parse_value,
    require, FieldName,
};
use crate::inbound::http::ApiResult;

const AMOUNT: FieldName = FieldName::new("amount");
const PENALTY_TYPE: FieldName = FieldName::new("penaltyType");
const PENALTY_DATE: FieldName = FieldName::new("penaltyDate");
const PENALTY_ID: FieldName = FieldName::new("penaltyId");
const STATUS: FieldName = FieldName::new("status");

/// A penalty to levy.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyRequest {
    #[schema(format = Uuid)]
    pub member_id: Option<String>,
    /// Only for `late_repayment` and `default` penalties.
    #[schema(format = Uuid)]
    pub loan_id: Option<String>,
    /// Omit to use the group's default for the penalty type.
    #[schema(example = "500")]
    pub amount: Option<String>,
    /// `late_deposit`, `late_repayment`, `default` or `other`.
    #[schema(example = "late_deposit")]
    pub penalty_type: Option<String>,
    #[schema(format = Date)]
    pub penalty_date: Option<String>,
    pub reason: Option<String>,
}

/// Query string for listing penalties.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyQuery {
    pub member_id: Option<String>,
    /// `unpaid`, `paid` or `waived`.
    pub status: Option<String>,
}

fn parse_penalty(payload: PenaltyRequest) -> Result<NewPenalty, Error> {
    let penalty_type: PenaltyType =
        parse_value(&require(payload.penalty_type, PENALTY_TYPE)?, PENALTY_TYPE)?;
    Ok(NewPenalty {
        member_id: parse_id(&require(payload.member_id, MEMBER_ID)?, MEMBER_ID)?,
        loan_id: parse_optional_id(payload.loan_id.as_deref(), LOAN_ID)?,
        amount: payload
            .amount
            .as_deref()
            .map(|raw| parse_amount(raw, AMOUNT))
            .transpose()?,
        penalty_type,
        penalty_date: parse_date(&require(payload.penalty_date, PENALTY_DATE)?, PENALTY_DATE)?,
        reason: payload.reason,
    })
}

/// List penalties of the group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/penalties",
    params(("groupId" = String, Path, description = "Group id"), PenaltyQuery),
    responses(
        (status = 200, description = "Penalties, newest first", body = [PenaltySchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["penalties"],
    operation_id = "listPenalties"
)]
#[get("/groups/{groupId}/penalties")]
pub async fn list_penalties(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PenaltyQuery>,
) -> ApiResult<web::Json<Vec<Penalty>>> {
    let access = group_access(&state, &session, &path).await?;
    let filter = PenaltyFilter {
        member_id: parse_optional_id(query.member_id.as_deref(), MEMBER_ID)?,
        status: parse_optional_value(query.status.as_deref(), STATUS)?,
    };
    Ok(web::Json(state.penalties.list_penalties(&access, filter).await?))
}

/// Levy a penalty.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/penalties",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = PenaltyRequest,
    responses(
        (status = 201, description = "Penalty levied", body = PenaltySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["penalties"],
    operation_id = "createPenalty"
)]
#[post("/groups/{groupId}/penalties")]
pub async fn create_penalty(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PenaltyRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let request = parse_penalty(payload.into_inner())?;
    let penalty = state.penalties.create_penalty(&access, request).await?;
    Ok(HttpResponse::Created().json(penalty))
}

async fn settle(
    state: &HttpState,
    session: &SessionContext,
    path: (String, String),
    pay: bool,
) -> ApiResult<web::Json<Penalty>> {
    let (group_id, penalty_id) = path;
    let access = group_access(state, session, &group_id).await?;
    let penalty_id: PenaltyId = parse_id(&penalty_id, PENALTY_ID)?;
    let penalty = if pay {
        state.penalties.pay_penalty(&access, penalty_id).await?
    } else {
        state.penalties.waive_penalty(&access, penalty_id).await?
    };
    Ok(web::Json(penalty))
}

/// `unpaid → paid`, dated today.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/penalties/{penaltyId}/pay",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("penaltyId" = String, Path, description = "Penalty id")
    ),
    responses(
        (status = 200, description = "Paid penalty", body = PenaltySchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already settled", body = ErrorSchema)
    ),
    tags = ["penalties"],
    operation_id = "payPenalty"
)]
#[post("/groups/{groupId}/penalties/{penaltyId}/pay")]
pub async fn pay_penalty(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Penalty>> {
    settle(&state, &session, path.into_inner(), true).await
}

/// `unpaid → waived`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/penalties/{penaltyId}/waive",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("penaltyId" = String, Path, description = "Penalty id")
    ),
    responses(
        (status = 200, description = "Waived penalty", body = PenaltySchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already settled", body = ErrorSchema)
    ),
    tags = ["penalties"],
    operation_id = "waivePenalty"
)]
#[post("/groups/{groupId}/penalties/{penaltyId}/waive")]
pub async fn waive_penalty(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Penalty>> {
    settle(&state, &session, path.into_inner(), false).await
}
