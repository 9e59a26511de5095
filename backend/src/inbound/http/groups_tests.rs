//! Tests for the group and administration handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{json, Value};

use super::*;
use crate::domain::ports::ProfileRepository;
use crate::inbound::http::test_utils::{init_app, memory_state_over, session_cookie};
use crate::outbound::memory::MemoryStore;

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me)
        .service(list_groups)
        .service(create_group)
        .service(get_group)
        .service(update_group)
        .service(review_group)
        .service(list_users)
        .service(set_platform_role);
}

async fn promote(store: &MemoryStore, user_id: &UserId) {
    store
        .set_platform_role(user_id, PlatformRole::SuperAdmin)
        .await
        .expect("promoted");
}

#[actix_web::test]
async fn me_requires_a_session() {
    let app = init_app(memory_state_over(&MemoryStore::new()), routes).await;
    let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/me").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn me_reports_platform_role() {
    let store = MemoryStore::new();
    let app = init_app(memory_state_over(&store), routes).await;
    let user_id = UserId::random();
    promote(&store, &user_id).await;
    let cookie = session_cookie(&app, &user_id).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get().uri("/me").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(body["userId"], user_id.to_string());
    assert_eq!(body["platformRole"], "super_admin");
}

#[actix_web::test]
async fn requested_group_is_pending_until_approved() {
    let store = MemoryStore::new();
    let app = init_app(memory_state_over(&store), routes).await;
    let founder = UserId::random();
    let reviewer = UserId::random();
    promote(&store, &reviewer).await;
    let founder_cookie = session_cookie(&app, &founder).await;
    let reviewer_cookie = session_cookie(&app, &reviewer).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/groups")
            .cookie(founder_cookie.clone())
            .set_json(json!({ "name": "Umoja", "location": "Kisumu" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let group: Value = actix_test::read_body_json(res).await;
    assert_eq!(group["status"], "pending");
    assert_eq!(group["createdBy"], founder.to_string());
    let group_id = group["id"].as_str().expect("id").to_owned();

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/admin/groups/{group_id}/review"))
            .cookie(founder_cookie.clone())
            .set_json(json!({ "action": "approve" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let reviewed: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/admin/groups/{group_id}/review"))
            .cookie(reviewer_cookie)
            .set_json(json!({ "action": "approve", "notes": "documents verified" }))
            .to_request(),
    )
    .await;
    assert_eq!(reviewed["status"], "active");
    assert_eq!(reviewed["reviewedBy"], reviewer.to_string());

    let listed: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/groups")
            .cookie(founder_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn strangers_see_not_found() {
    let store = MemoryStore::new();
    let app = init_app(memory_state_over(&store), routes).await;
    let founder_cookie = session_cookie(&app, &UserId::random()).await;
    let group: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/groups")
            .cookie(founder_cookie)
            .set_json(json!({ "name": "Umoja" }))
            .to_request(),
    )
    .await;
    let group_id = group["id"].as_str().expect("id");

    let stranger = session_cookie(&app, &UserId::random()).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/groups/{group_id}"))
            .cookie(stranger)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn invalid_payloads_name_the_field() {
    let app = init_app(memory_state_over(&MemoryStore::new()), routes).await;
    let cookie = session_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/groups")
            .cookie(cookie.clone())
            .set_json(json!({ "location": "Kisumu" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "name");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/groups/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "groupId");
}

#[actix_web::test]
async fn platform_roles_need_a_super_admin() {
    let store = MemoryStore::new();
    let app = init_app(memory_state_over(&store), routes).await;
    let target = UserId::random();
    let cookie = session_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/admin/users/{target}/platform-role"))
            .cookie(cookie)
            .set_json(json!({ "platformRole": "super_admin" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = UserId::random();
    promote(&store, &admin).await;
    let cookie = session_cookie(&app, &admin).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/admin/users/{target}/platform-role"))
            .cookie(cookie)
            .set_json(json!({ "platformRole": "super_admin" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        store.platform_role(&target).await.expect("role"),
        PlatformRole::SuperAdmin
    );
}

#[actix_web::test]
async fn user_listing_is_for_super_admins() {
    let store = MemoryStore::new();
    let app = init_app(memory_state_over(&store), routes).await;
    let admin = UserId::random();
    promote(&store, &admin).await;

    let plain = session_cookie(&app, &UserId::random()).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/admin/users")
            .cookie(plain)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let cookie = session_cookie(&app, &admin).await;
    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/admin/users")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(
        body,
        json!([{ "userId": admin.to_string(), "platformRole": "super_admin" }])
    );
}
