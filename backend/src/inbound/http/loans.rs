//! Loan lifecycle handlers.
//!
//! ```text
//! GET  /api/v1/groups/{groupId}/loans?memberId=&status=
//! POST /api/v1/groups/{groupId}/loans
//! GET  /api/v1/groups/{groupId}/loans/{loanId}
//! POST /api/v1/groups/{groupId}/loans/{loanId}/approve
//! POST /api/v1/groups/{groupId}/loans/{loanId}/reject
//! POST /api/v1/groups/{groupId}/loans/{loanId}/disburse
//! POST /api/v1/groups/{groupId}/loans/{loanId}/complete
//! POST /api/v1/groups/{groupId}/loans/{loanId}/default
//! ```
//!
//! Transitions take no body except `disburse`, which accepts an optional
//! `disbursementDate`. A loan that has already left the expected status
//! answers `409` with `{entity, from, to}` details.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::LoanApplication;
use crate::domain::{
    DurationMonths, Error, InterestRate, Loan, LoanFilter, LoanId, LoanTerms, LoanView,
};
use crate::inbound::http::access::group_access;
use crate::inbound::http::members::MEMBER_ID;
use crate::inbound::http::schemas::{
    ErrorSchema, LoanApplicationSchema, LoanSchema, LoanViewSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_amount, parse_decimal, parse_id, parse_optional_date, parse_optional_id,
    parse_optional_value, require, FieldName,
};
use crate::inbound::http::ApiResult;

pub(crate) const LOAN_ID: FieldName = FieldName::new("loanId");
const PRINCIPAL: FieldName = FieldName::new("principalAmount");
const INTEREST_RATE: FieldName = FieldName::new("interestRate");
const DURATION: FieldName = FieldName::new("durationMonths");
const STATUS: FieldName = FieldName::new("status");
const DISBURSEMENT_DATE: FieldName = FieldName::new("disbursementDate");

/// Loan request. Rate and duration default to the group settings.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    #[schema(format = Uuid)]
    pub member_id: Option<String>,
    #[schema(example = "10000")]
    pub principal_amount: Option<String>,
    /// Percent over the whole term, between 0 and 100.
    #[schema(example = "10")]
    pub interest_rate: Option<String>,
    #[schema(example = 3)]
    pub duration_months: Option<u32>,
    pub purpose: Option<String>,
}

/// Optional body of the disburse transition.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisburseRequest {
    /// Defaults to today.
    #[schema(format = Date)]
    pub disbursement_date: Option<String>,
}

/// Query string for listing loans.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LoanListQuery {
    pub member_id: Option<String>,
    pub status: Option<String>,
}

fn invalid_term(field: FieldName, err: impl std::fmt::Display, value: impl Serialize) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": "invalid_value",
    }))
}

fn parse_terms(payload: LoanRequest) -> Result<LoanTerms, Error> {
    let interest_rate = match payload.interest_rate.as_deref() {
        Some(raw) => {
            let rate = parse_decimal(raw, INTEREST_RATE)?;
            Some(InterestRate::new(rate).map_err(|err| invalid_term(INTEREST_RATE, err, raw))?)
        }
        None => None,
    };
    let duration_months = payload
        .duration_months
        .map(|months| DurationMonths::new(months).map_err(|err| invalid_term(DURATION, err, months)))
        .transpose()?;
    Ok(LoanTerms {
        member_id: parse_id(&require(payload.member_id, MEMBER_ID)?, MEMBER_ID)?,
        principal: parse_amount(&require(payload.principal_amount, PRINCIPAL)?, PRINCIPAL)?,
        interest_rate,
        duration_months,
        purpose: payload.purpose,
    })
}

#[derive(Debug, Clone, Copy)]
enum LoanAction {
    Approve,
    Reject,
    Complete,
    Default,
}

async fn apply(
    state: &HttpState,
    session: &SessionContext,
    path: (String, String),
    action: LoanAction,
) -> ApiResult<web::Json<Loan>> {
    let (group_id, loan_id) = path;
    let access = group_access(state, session, &group_id).await?;
    let loan_id: LoanId = parse_id(&loan_id, LOAN_ID)?;
    let loan = match action {
        LoanAction::Approve => state.loans.approve_loan(&access, loan_id).await?,
        LoanAction::Reject => state.loans.reject_loan(&access, loan_id).await?,
        LoanAction::Complete => state.loans.complete_loan(&access, loan_id).await?,
        LoanAction::Default => state.loans.default_loan(&access, loan_id).await?,
    };
    Ok(web::Json(loan))
}

/// List loans with their repayment position.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/loans",
    params(("groupId" = String, Path, description = "Group id"), LoanListQuery),
    responses(
        (status = 200, description = "Loans, newest first", body = [LoanViewSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "listLoans"
)]
#[get("/groups/{groupId}/loans")]
pub async fn list_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<LoanListQuery>,
) -> ApiResult<web::Json<Vec<LoanView>>> {
    let access = group_access(&state, &session, &path).await?;
    let filter = LoanFilter {
        member_id: parse_optional_id(query.member_id.as_deref(), MEMBER_ID)?,
        status: parse_optional_value(query.status.as_deref(), STATUS)?,
    };
    Ok(web::Json(state.loans.list_loans(&access, filter).await?))
}

/// Request a loan. The response carries an advisory eligibility check.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = LoanRequest,
    responses(
        (status = 201, description = "Loan requested", body = LoanApplicationSchema),
        (status = 400, description = "Invalid request or not eligible", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "createLoan"
)]
#[post("/groups/{groupId}/loans")]
pub async fn create_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<LoanRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let terms = parse_terms(payload.into_inner())?;
    let application: LoanApplication = state.loans.create_loan(&access, terms).await?;
    Ok(HttpResponse::Created().json(application))
}

/// Fetch a loan with its repayment position.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/loans/{loanId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    responses(
        (status = 200, description = "Loan", body = LoanViewSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "getLoan"
)]
#[get("/groups/{groupId}/loans/{loanId}")]
pub async fn get_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<LoanView>> {
    let (group_id, loan_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let loan_id: LoanId = parse_id(&loan_id, LOAN_ID)?;
    Ok(web::Json(state.loans.get_loan(&access, loan_id).await?))
}

/// `pending → approved`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans/{loanId}/approve",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    responses(
        (status = 200, description = "Approved loan", body = LoanSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "approveLoan"
)]
#[post("/groups/{groupId}/loans/{loanId}/approve")]
pub async fn approve_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Loan>> {
    apply(&state, &session, path.into_inner(), LoanAction::Approve).await
}

/// `pending → rejected`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans/{loanId}/reject",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    responses(
        (status = 200, description = "Rejected loan", body = LoanSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "rejectLoan"
)]
#[post("/groups/{groupId}/loans/{loanId}/reject")]
pub async fn reject_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Loan>> {
    apply(&state, &session, path.into_inner(), LoanAction::Reject).await
}

/// `approved → disbursed`, dated `disbursementDate` or today.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans/{loanId}/disburse",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    request_body(content = Option<DisburseRequest>, description = "Optional disbursement date"),
    responses(
        (status = 200, description = "Disbursed loan", body = LoanSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "disburseLoan"
)]
#[post("/groups/{groupId}/loans/{loanId}/disburse")]
pub async fn disburse_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: Option<web::Json<DisburseRequest>>,
) -> ApiResult<web::Json<Loan>> {
    let (group_id, loan_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let loan_id: LoanId = parse_id(&loan_id, LOAN_ID)?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let date = parse_optional_date(body.disbursement_date.as_deref(), DISBURSEMENT_DATE)?;
    Ok(web::Json(
        state.loans.disburse_loan(&access, loan_id, date).await?,
    ))
}

/// `repaying → completed`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans/{loanId}/complete",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    responses(
        (status = 200, description = "Completed loan", body = LoanSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "completeLoan"
)]
#[post("/groups/{groupId}/loans/{loanId}/complete")]
pub async fn complete_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Loan>> {
    apply(&state, &session, path.into_inner(), LoanAction::Complete).await
}

/// `repaying → defaulted`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/loans/{loanId}/default",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("loanId" = String, Path, description = "Loan id")
    ),
    responses(
        (status = 200, description = "Defaulted loan", body = LoanSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["loans"],
    operation_id = "defaultLoan"
)]
#[post("/groups/{groupId}/loans/{loanId}/default")]
pub async fn default_loan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Loan>> {
    apply(&state, &session, path.into_inner(), LoanAction::Default).await
}

#[cfg(test)]
#[path = "loans_tests.rs"]
mod tests;
