//! Member register handlers plus per-member ledger views.
//!
//! ```text
//! GET    /api/v1/groups/{groupId}/members
//! POST   /api/v1/groups/{groupId}/members
//! GET    /api/v1/groups/{groupId}/members/{memberId}
//! PUT    /api/v1/groups/{groupId}/members/{memberId}
//! DELETE /api/v1/groups/{groupId}/members/{memberId}
//! GET    /api/v1/groups/{groupId}/members/{memberId}/summary
//! GET    /api/v1/groups/{groupId}/members/{memberId}/eligibility?principal=
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, LoanEligibility, Member, MemberDetails, MemberId, MemberStatus, MemberSummary,
    MemberUpdate,
};
use crate::inbound::http::access::group_access;
use crate::inbound::http::schemas::{
    ErrorSchema, LoanEligibilitySchema, MemberSchema, MemberSummarySchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_decimal, parse_id, parse_optional_date, parse_value, require, FieldName,
};
use crate::inbound::http::ApiResult;

pub(crate) const MEMBER_ID: FieldName = FieldName::new("memberId");
const FULL_NAME: FieldName = FieldName::new("fullName");
const JOIN_DATE: FieldName = FieldName::new("joinDate");
const STATUS: FieldName = FieldName::new("status");
const PRINCIPAL: FieldName = FieldName::new("principal");

/// Member contact details; `status` is required on update only.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    #[schema(example = "Achieng Otieno")]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    /// Defaults to today on create; ignored on update.
    #[schema(format = Date)]
    pub join_date: Option<String>,
    /// `active`, `inactive` or `suspended`.
    pub status: Option<String>,
}

/// Query string for the eligibility check.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EligibilityQuery {
    /// Principal to assess, as a decimal string.
    pub principal: Option<String>,
}

fn parse_details(payload: &mut MemberRequest) -> Result<MemberDetails, Error> {
    let full_name = require(payload.full_name.take(), FULL_NAME)?;
    MemberDetails::new(
        full_name,
        payload.phone.take(),
        payload.email.take(),
        payload.national_id.take(),
        payload.address.take(),
    )
}

fn parse_update(mut payload: MemberRequest) -> Result<MemberUpdate, Error> {
    let details = parse_details(&mut payload)?;
    let status: MemberStatus = parse_value(&require(payload.status, STATUS)?, STATUS)?;
    Ok(MemberUpdate { details, status })
}

/// List members of the group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/members",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Members", body = [MemberSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "listMembers"
)]
#[get("/groups/{groupId}/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Member>>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.members.list_members(&access).await?))
}

/// Register a member.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/members",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = MemberRequest,
    responses(
        (status = 201, description = "Member registered", body = MemberSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "createMember"
)]
#[post("/groups/{groupId}/members")]
pub async fn create_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<MemberRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let mut payload = payload.into_inner();
    let details = parse_details(&mut payload)?;
    let join_date = parse_optional_date(payload.join_date.as_deref(), JOIN_DATE)?;
    let member = state
        .members
        .create_member(&access, details, join_date)
        .await?;
    Ok(HttpResponse::Created().json(member))
}

/// Fetch a member.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/members/{memberId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("memberId" = String, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Member", body = MemberSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "getMember"
)]
#[get("/groups/{groupId}/members/{memberId}")]
pub async fn get_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Member>> {
    let (group_id, member_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let member_id: MemberId = parse_id(&member_id, MEMBER_ID)?;
    Ok(web::Json(state.members.get_member(&access, member_id).await?))
}

/// Replace a member's contact details and status.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{groupId}/members/{memberId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("memberId" = String, Path, description = "Member id")
    ),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Updated member", body = MemberSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "updateMember"
)]
#[put("/groups/{groupId}/members/{memberId}")]
pub async fn update_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<MemberRequest>,
) -> ApiResult<web::Json<Member>> {
    let (group_id, member_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let member_id: MemberId = parse_id(&member_id, MEMBER_ID)?;
    let update = parse_update(payload.into_inner())?;
    Ok(web::Json(
        state.members.update_member(&access, member_id, update).await?,
    ))
}

/// Delete a member that has no ledger history.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{groupId}/members/{memberId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("memberId" = String, Path, description = "Member id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Member has ledger history", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "removeMember"
)]
#[delete("/groups/{groupId}/members/{memberId}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (group_id, member_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let member_id: MemberId = parse_id(&member_id, MEMBER_ID)?;
    state.members.remove_member(&access, member_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Savings, loan, social fund and penalty position of a member.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/members/{memberId}/summary",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("memberId" = String, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Member summary", body = MemberSummarySchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "getMemberSummary"
)]
#[get("/groups/{groupId}/members/{memberId}/summary")]
pub async fn member_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MemberSummary>> {
    let (group_id, member_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let member_id: MemberId = parse_id(&member_id, MEMBER_ID)?;
    Ok(web::Json(
        state.reports.member_summary(&access, member_id).await?,
    ))
}

/// Largest principal the member may borrow.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/members/{memberId}/eligibility",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("memberId" = String, Path, description = "Member id"),
        EligibilityQuery
    ),
    responses(
        (status = 200, description = "Eligibility", body = LoanEligibilitySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "getLoanEligibility"
)]
#[get("/groups/{groupId}/members/{memberId}/eligibility")]
pub async fn eligibility(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    query: web::Query<EligibilityQuery>,
) -> ApiResult<web::Json<LoanEligibility>> {
    let (group_id, member_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let member_id: MemberId = parse_id(&member_id, MEMBER_ID)?;
    let principal = query
        .principal
        .as_deref()
        .map(|raw| parse_decimal(raw, PRINCIPAL))
        .transpose()?;
    Ok(web::Json(
        state.loans.eligibility(&access, member_id, principal).await?,
    ))
}
