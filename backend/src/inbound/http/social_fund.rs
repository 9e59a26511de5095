//! Social fund handlers.
//!
//! ```text
//! GET  /api/v1/groups/{groupId}/social-fund
//! POST /api/v1/groups/{groupId}/social-fund/contributions
//! POST /api/v1/groups/{groupId}/social-fund/withdrawals
//! POST /api/v1/groups/{groupId}/social-fund/withdrawals/{txId}/approve
//! POST /api/v1/groups/{groupId}/social-fund/withdrawals/{txId}/reject
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SocialFundOverview;
use crate::domain::{Error, NewSocialFundTx, SocialFundTransaction, SocialFundTxId};
use crate::inbound::http::access::group_access;
use crate::inbound::http::members::MEMBER_ID;
use crate::inbound::http::schemas::{
    ErrorSchema, SocialFundOverviewSchema, SocialFundTransactionSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_amount, parse_date, parse_id, require, FieldName};
use crate::inbound::http::ApiResult;

const AMOUNT: FieldName = FieldName::new("amount");
const TRANSACTION_DATE: FieldName = FieldName::new("transactionDate");
const TX_ID: FieldName = FieldName::new("txId");

/// A contribution or withdrawal request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialFundRequest {
    #[schema(format = Uuid)]
    pub member_id: Option<String>,
    #[schema(example = "1000")]
    pub amount: Option<String>,
    #[schema(format = Date)]
    pub transaction_date: Option<String>,
    #[schema(example = "funeral support")]
    pub purpose: Option<String>,
}

fn parse_request(payload: SocialFundRequest) -> Result<NewSocialFundTx, Error> {
    Ok(NewSocialFundTx {
        member_id: parse_id(&require(payload.member_id, MEMBER_ID)?, MEMBER_ID)?,
        amount: parse_amount(&require(payload.amount, AMOUNT)?, AMOUNT)?,
        transaction_date: parse_date(
            &require(payload.transaction_date, TRANSACTION_DATE)?,
            TRANSACTION_DATE,
        )?,
        purpose: payload.purpose,
    })
}

/// Balance and transactions of the group fund.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/social-fund",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Social fund", body = SocialFundOverviewSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["social-fund"],
    operation_id = "getSocialFund"
)]
#[get("/groups/{groupId}/social-fund")]
pub async fn social_fund(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SocialFundOverview>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.social_fund.social_fund(&access).await?))
}

/// Book a contribution.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/social-fund/contributions",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = SocialFundRequest,
    responses(
        (status = 201, description = "Contribution booked", body = SocialFundTransactionSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["social-fund"],
    operation_id = "contributeSocialFund"
)]
#[post("/groups/{groupId}/social-fund/contributions")]
pub async fn contribute(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SocialFundRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let request = parse_request(payload.into_inner())?;
    let tx = state.social_fund.contribute(&access, request).await?;
    Ok(HttpResponse::Created().json(tx))
}

/// Request a withdrawal. It stays `pending` until reviewed.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/social-fund/withdrawals",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = SocialFundRequest,
    responses(
        (status = 201, description = "Withdrawal requested", body = SocialFundTransactionSchema),
        (status = 400, description = "Invalid request or insufficient balance", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["social-fund"],
    operation_id = "requestWithdrawal"
)]
#[post("/groups/{groupId}/social-fund/withdrawals")]
pub async fn request_withdrawal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SocialFundRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let request = parse_request(payload.into_inner())?;
    let tx = state.social_fund.request_withdrawal(&access, request).await?;
    Ok(HttpResponse::Created().json(tx))
}

async fn review(
    state: &HttpState,
    session: &SessionContext,
    path: (String, String),
    approve: bool,
) -> ApiResult<web::Json<SocialFundTransaction>> {
    let (group_id, tx_id) = path;
    let access = group_access(state, session, &group_id).await?;
    let tx_id: SocialFundTxId = parse_id(&tx_id, TX_ID)?;
    let tx = if approve {
        state.social_fund.approve_withdrawal(&access, tx_id).await?
    } else {
        state.social_fund.reject_withdrawal(&access, tx_id).await?
    };
    Ok(web::Json(tx))
}

/// `pending → approved`; the amount leaves the balance.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/social-fund/withdrawals/{txId}/approve",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("txId" = String, Path, description = "Withdrawal id")
    ),
    responses(
        (status = 200, description = "Approved withdrawal", body = SocialFundTransactionSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already reviewed", body = ErrorSchema)
    ),
    tags = ["social-fund"],
    operation_id = "approveWithdrawal"
)]
#[post("/groups/{groupId}/social-fund/withdrawals/{txId}/approve")]
pub async fn approve_withdrawal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<SocialFundTransaction>> {
    review(&state, &session, path.into_inner(), true).await
}

/// `pending → rejected`.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/social-fund/withdrawals/{txId}/reject",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("txId" = String, Path, description = "Withdrawal id")
    ),
    responses(
        (status = 200, description = "Rejected withdrawal", body = SocialFundTransactionSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already reviewed", body = ErrorSchema)
    ),
    tags = ["social-fund"],
    operation_id = "rejectWithdrawal"
)]
#[post("/groups/{groupId}/social-fund/withdrawals/{txId}/reject")]
pub async fn reject_withdrawal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<SocialFundTransaction>> {
    review(&state, &session, path.into_inner(), false).await
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::GroupRole;
    use crate::inbound::http::test_utils::{
        init_app, memory_state_over, seed_group, seed_member, session_cookie,
    };
    use crate::outbound::memory::MemoryStore;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(social_fund)
            .service(contribute)
            .service(request_withdrawal)
            .service(approve_withdrawal)
            .service(reject_withdrawal);
    }

    fn balance(body: &Value) -> Decimal {
        body["balance"]
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .expect("decimal balance")
    }

    #[actix_web::test]
    async fn approved_withdrawals_reduce_the_balance() {
        let store = MemoryStore::new();
        let (group_id, treasurer) = seed_group(&store, GroupRole::Treasurer).await;
        let member = seed_member(&store, group_id).await;
        let app = init_app(memory_state_over(&store), routes).await;
        let cookie = session_cookie(&app, &treasurer).await;
        let base = format!("/groups/{group_id}/social-fund");
        let body = |amount: &str| {
            json!({
                "memberId": member.id.to_string(),
                "amount": amount,
                "transactionDate": "2025-03-14",
            })
        };

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("{base}/contributions"))
                .cookie(cookie.clone())
                .set_json(body("1000"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let withdrawal: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("{base}/withdrawals"))
                .cookie(cookie.clone())
                .set_json(body("400"))
                .to_request(),
        )
        .await;
        assert_eq!(withdrawal["status"], "pending");
        let overview: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri(&base).cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(balance(&overview), dec!(1000));

        let tx_id = withdrawal["id"].as_str().expect("id");
        let approved: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("{base}/withdrawals/{tx_id}/approve"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(approved["status"], "approved");

        let overview: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri(&base).cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(balance(&overview), dec!(600));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("{base}/withdrawals/{tx_id}/reject"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn overdrawing_requests_are_bad_requests() {
        let store = MemoryStore::new();
        let (group_id, user_id) = seed_group(&store, GroupRole::Member).await;
        let member = seed_member(&store, group_id).await;
        let app = init_app(memory_state_over(&store), routes).await;
        let cookie = session_cookie(&app, &user_id).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/groups/{group_id}/social-fund/withdrawals"))
                .cookie(cookie)
                .set_json(json!({
                    "memberId": member.id.to_string(),
                    "amount": "1",
                    "transactionDate": "2025-03-14",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Value = actix_test::read_body_json(res).await;
        assert_eq!(error["details"]["code"], "insufficient_social_fund");
    }
}
