//! End-to-end ledger flows over the HTTP API and the in-memory store.

use actix_web::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use village_bank::domain::UserId;
use village_bank::outbound::memory::MemoryStore;

#[path = "support/http.rs"]
mod http;

use http::{call, id_of, init_api, promote, sign_in};

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("decimal")
}

/// Request a group as `founder`, have a super admin approve it and enrol one
/// member. Returns `(group_id, member_id)`.
async fn active_group_with_member<S>(
    app: &S,
    store: &MemoryStore,
    founder: &actix_web::cookie::Cookie<'static>,
) -> (String, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, group) = call(
        app,
        founder,
        Method::POST,
        "/api/v1/groups",
        Some(json!({ "name": "Umoja Savers", "location": "Kisumu" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["status"], "pending");
    let group_id = id_of(&group);

    let reviewer = UserId::random();
    promote(store, &reviewer).await;
    let reviewer_cookie = sign_in(app, &reviewer).await;
    let (status, reviewed) = call(
        app,
        &reviewer_cookie,
        Method::POST,
        &format!("/api/v1/admin/groups/{group_id}/review"),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "active");

    let (status, member) = call(
        app,
        founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/members"),
        Some(json!({ "fullName": "Achieng Otieno", "phone": "+254700000001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (group_id, id_of(&member))
}

#[actix_web::test]
async fn loan_lifecycle_from_request_to_completion() {
    let store = MemoryStore::new();
    let app = init_api(&store).await;
    let founder = sign_in(&app, &UserId::random()).await;
    let (group_id, member_id) = active_group_with_member(&app, &store, &founder).await;

    let (status, application) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/loans"),
        Some(json!({
            "memberId": member_id,
            "principalAmount": "10000",
            "interestRate": "10",
            "durationMonths": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let loan = &application["loan"];
    assert_eq!(loan["status"], "pending");
    assert_eq!(loan["totalAmount"], "11000.00");
    let loan_uri = format!("/api/v1/groups/{group_id}/loans/{}", id_of(loan));

    let (status, _) = call(&app, &founder, Method::POST, &format!("{loan_uri}/approve"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, disbursed) = call(
        &app,
        &founder,
        Method::POST,
        &format!("{loan_uri}/disburse"),
        Some(json!({ "disbursementDate": "2025-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disbursed["status"], "disbursed");
    assert_eq!(disbursed["disbursementDate"], "2025-03-01");

    let (status, error) = call(&app, &founder, Method::POST, &format!("{loan_uri}/reject"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "invalid_transition");

    let (status, _) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/repayments"),
        Some(json!({
            "loanId": id_of(loan),
            "amount": "11000",
            "paymentDate": "2025-03-14"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, view) = call(&app, &founder, Method::GET, &loan_uri, None).await;
    assert_eq!(view["status"], "repaying");
    assert_eq!(decimal(&view["remainingBalance"]), Decimal::ZERO);

    let (_, report) = call(
        &app,
        &founder,
        Method::GET,
        &format!("/api/v1/groups/{group_id}/reconciliation"),
        None,
    )
    .await;
    let findings = report["findings"].as_array().expect("findings");
    assert!(findings.iter().any(|finding| finding["kind"] == "loan_fully_repaid"));

    let (status, completed) =
        call(&app, &founder, Method::POST, &format!("{loan_uri}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["totalAmount"], "11000.00");
}

#[actix_web::test]
async fn savings_bound_loan_eligibility() {
    let store = MemoryStore::new();
    let app = init_api(&store).await;
    let founder = sign_in(&app, &UserId::random()).await;
    let (group_id, member_id) = active_group_with_member(&app, &store, &founder).await;

    let (status, saving) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/savings"),
        Some(json!({
            "memberId": member_id,
            "amount": "5000",
            "depositDate": "2025-03-10",
            "status": "completed"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saving["status"], "completed");

    let (status, eligibility) = call(
        &app,
        &founder,
        Method::GET,
        &format!("/api/v1/groups/{group_id}/members/{member_id}/eligibility?principal=20000"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&eligibility["maxEligiblePrincipal"]), Decimal::from(15000));
    assert_eq!(eligibility["eligible"], false);

    let (status, application) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/loans"),
        Some(json!({ "memberId": member_id, "principalAmount": "20000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["eligibility"]["eligible"], false);

    let (status, _) = call(
        &app,
        &founder,
        Method::PUT,
        &format!("/api/v1/groups/{group_id}/settings/enforce_loan_eligibility"),
        Some(json!({ "value": "true" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, error) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/loans"),
        Some(json!({ "memberId": member_id, "principalAmount": "20000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "invalid_request");
}

#[actix_web::test]
async fn oversized_principals_are_rejected_without_panicking() {
    let store = MemoryStore::new();
    let app = init_api(&store).await;
    let founder = sign_in(&app, &UserId::random()).await;
    let (group_id, member_id) = active_group_with_member(&app, &store, &founder).await;
    let loans_uri = format!("/api/v1/groups/{group_id}/loans");

    for principal in ["50000000000000000000000000000", "1000000000000"] {
        let (status, error) = call(
            &app,
            &founder,
            Method::POST,
            &loans_uri,
            Some(json!({
                "memberId": member_id,
                "principalAmount": principal,
                "interestRate": "100"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "principal {principal}");
        assert_eq!(error["code"], "invalid_request");
        assert_eq!(error["details"]["field"], "principalAmount");
    }

    let (status, error) = call(
        &app,
        &founder,
        Method::POST,
        &loans_uri,
        Some(json!({
            "memberId": member_id,
            "principalAmount": "999999999999.99",
            "interestRate": "100"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "invalid_request");

    let (status, listed) = call(&app, &founder, Method::GET, &loans_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn social_fund_and_penalties() {
    let store = MemoryStore::new();
    let app = init_api(&store).await;
    let founder = sign_in(&app, &UserId::random()).await;
    let (group_id, member_id) = active_group_with_member(&app, &store, &founder).await;
    let fund_uri = format!("/api/v1/groups/{group_id}/social-fund");

    let (_, fund) = call(&app, &founder, Method::GET, &fund_uri, None).await;
    assert_eq!(decimal(&fund["balance"]), Decimal::ZERO);

    let tx = json!({
        "memberId": member_id,
        "amount": "1000",
        "transactionDate": "2025-03-14"
    });
    let (status, _) = call(
        &app,
        &founder,
        Method::POST,
        &format!("{fund_uri}/contributions"),
        Some(tx),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, withdrawal) = call(
        &app,
        &founder,
        Method::POST,
        &format!("{fund_uri}/withdrawals"),
        Some(json!({
            "memberId": member_id,
            "amount": "400",
            "transactionDate": "2025-03-14",
            "purpose": "hospital bill"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(withdrawal["status"], "pending");
    let (_, fund) = call(&app, &founder, Method::GET, &fund_uri, None).await;
    assert_eq!(decimal(&fund["balance"]), Decimal::from(1000));

    let (status, _) = call(
        &app,
        &founder,
        Method::POST,
        &format!("{fund_uri}/withdrawals/{}/approve", id_of(&withdrawal)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, fund) = call(&app, &founder, Method::GET, &fund_uri, None).await;
    assert_eq!(decimal(&fund["balance"]), Decimal::from(600));

    let (status, penalty) = call(
        &app,
        &founder,
        Method::POST,
        &format!("/api/v1/groups/{group_id}/penalties"),
        Some(json!({
            "memberId": member_id,
            "amount": "500",
            "penaltyType": "other",
            "penaltyDate": "2025-03-14"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(penalty["status"], "unpaid");
    let penalty_uri = format!("/api/v1/groups/{group_id}/penalties/{}", id_of(&penalty));

    let (status, waived) =
        call(&app, &founder, Method::POST, &format!("{penalty_uri}/waive"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(waived["status"], "waived");
    let (status, error) =
        call(&app, &founder, Method::POST, &format!("{penalty_uri}/pay"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["from"], "waived");

    let (_, summary) = call(
        &app,
        &founder,
        Method::GET,
        &format!("/api/v1/groups/{group_id}/members/{member_id}/summary"),
        None,
    )
    .await;
    assert_eq!(decimal(&summary["unpaidPenalties"]), Decimal::ZERO);
}

#[actix_web::test]
async fn outsiders_cannot_see_a_group() {
    let store = MemoryStore::new();
    let app = init_api(&store).await;
    let founder = sign_in(&app, &UserId::random()).await;
    let (group_id, _) = active_group_with_member(&app, &store, &founder).await;

    let outsider = sign_in(&app, &UserId::random()).await;
    let (status, error) = call(
        &app,
        &outsider,
        Method::GET,
        &format!("/api/v1/groups/{group_id}/members"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "not_found");
}
