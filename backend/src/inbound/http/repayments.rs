//! Loan repayment handlers.
//!
//! ```text
//! GET  /api/v1/groups/{groupId}/repayments?loanId=&memberId=
//! POST /api/v1/groups/{groupId}/repayments
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NewRepayment, Repayment, RepaymentFilter};
use crate::inbound::http::access::group_access;
use crate::inbound::http::loans::LOAN_ID;
use crate::inbound::http::members::MEMBER_ID;
use crate::inbound::http::schemas::{ErrorSchema, RepaymentSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_amount, parse_date, parse_id, parse_optional_id, parse_optional_month_year, require,
    FieldName,
};
use crate::inbound::http::ApiResult;

const AMOUNT: FieldName = FieldName::new("amount");
const PAYMENT_DATE: FieldName = FieldName::new("paymentDate");
const MONTH_YEAR: FieldName = FieldName::new("monthYear");

/// A repayment against a disbursed or repaying loan.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentRequest {
    #[schema(format = Uuid)]
    pub loan_id: Option<String>,
    #[schema(example = "3666.67")]
    pub amount: Option<String>,
    #[schema(format = Date)]
    pub payment_date: Option<String>,
    #[schema(example = "2025-04")]
    pub month_year: Option<String>,
    #[serde(default)]
    pub is_late: bool,
    pub notes: Option<String>,
}

/// Query string for listing repayments.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentQuery {
    pub loan_id: Option<String>,
    pub member_id: Option<String>,
}

fn parse_repayment(payload: RepaymentRequest) -> Result<NewRepayment, Error> {
    Ok(NewRepayment {
        loan_id: parse_id(&require(payload.loan_id, LOAN_ID)?, LOAN_ID)?,
        amount: parse_amount(&require(payload.amount, AMOUNT)?, AMOUNT)?,
        payment_date: parse_date(&require(payload.payment_date, PAYMENT_DATE)?, PAYMENT_DATE)?,
        month_year: parse_optional_month_year(payload.month_year.as_deref(), MONTH_YEAR)?,
        is_late: payload.is_late,
        notes: payload.notes,
    })
}

/// List repayments of the group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/repayments",
    params(("groupId" = String, Path, description = "Group id"), RepaymentQuery),
    responses(
        (status = 200, description = "Repayments, newest first", body = [RepaymentSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["repayments"],
    operation_id = "listRepayments"
)]
#[get("/groups/{groupId}/repayments")]
pub async fn list_repayments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RepaymentQuery>,
) -> ApiResult<web::Json<Vec<Repayment>>> {
    let access = group_access(&state, &session, &path).await?;
    let filter = RepaymentFilter {
        loan_id: parse_optional_id(query.loan_id.as_deref(), LOAN_ID)?,
        member_id: parse_optional_id(query.member_id.as_deref(), MEMBER_ID)?,
    };
    Ok(web::Json(
        state.repayments.list_repayments(&access, filter).await?,
    ))
}

/// Record a repayment. The first one moves the loan to `repaying`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/repayments",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = RepaymentRequest,
    responses(
        (status = 201, description = "Repayment recorded", body = RepaymentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Loan not repayable", body = ErrorSchema)
    ),
    tags = ["repayments"],
    operation_id = "recordRepayment"
)]
#[post("/groups/{groupId}/repayments")]
pub async fn record_repayment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RepaymentRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let request = parse_repayment(payload.into_inner())?;
    let repayment = state.repayments.record_repayment(&access, request).await?;
    Ok(HttpResponse::Created().json(repayment))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::ports::MockRepaymentLedger;
    use crate::domain::service_test_support::access;
    use crate::domain::{ErrorCode, GroupRole, LoanId, MemberId};
    use crate::inbound::http::test_utils::{granting, init_app, memory_state, session_cookie};

    #[test]
    fn late_flag_defaults_to_false() {
        let payload: RepaymentRequest = serde_json::from_value(json!({
            "loanId": LoanId::random().to_string(),
            "amount": "100",
            "paymentDate": "2025-03-14",
        }))
        .expect("payload");
        let repayment = parse_repayment(payload).expect("valid");
        assert!(!repayment.is_late);
        assert_eq!(repayment.month_year, None);
    }

    #[test]
    fn missing_loan_is_named() {
        let payload: RepaymentRequest =
            serde_json::from_value(json!({ "amount": "100", "paymentDate": "2025-03-14" }))
                .expect("payload");
        let error = parse_repayment(payload).expect_err("loan missing");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "loanId");
    }

    #[actix_web::test]
    async fn list_passes_filters_to_the_ledger() {
        let access = access(GroupRole::Member);
        let loan_id = LoanId::random();
        let member_id = MemberId::random();
        let mut ledger = MockRepaymentLedger::new();
        ledger
            .expect_list_repayments()
            .withf(move |_, filter| {
                filter.loan_id == Some(loan_id) && filter.member_id == Some(member_id)
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let state = HttpState {
            access: granting(&access),
            repayments: Arc::new(ledger),
            ..memory_state()
        };
        let app = init_app(state, |cfg| {
            cfg.service(list_repayments);
        })
        .await;
        let cookie = session_cookie(&app, access.user_id()).await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/groups/{}/repayments?loanId={loan_id}&memberId={member_id}",
                    access.group_id()
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn malformed_filter_is_bad_request() {
        let access = access(GroupRole::Member);
        let state = HttpState {
            access: granting(&access),
            ..memory_state()
        };
        let app = init_app(state, |cfg| {
            cfg.service(list_repayments);
        })
        .await;
        let cookie = session_cookie(&app, access.user_id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/groups/{}/repayments?loanId=abc", access.group_id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
