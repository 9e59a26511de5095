//! Full HTTP stack over the in-memory store for integration tests.

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;

use village_bank::domain::{PlatformRole, UserId};
use village_bank::inbound::http::state::HttpState;
use village_bank::inbound::http::{api_routes, configure_extractors};
use village_bank::outbound::memory::MemoryStore;
use village_bank::test_support::{
    login, session_cookie_at, test_session_middleware, MutableClock, LOGIN_PATH,
};
use village_bank::Trace;

/// Frozen "today" shared by the suites.
pub(crate) fn clock() -> Arc<MutableClock> {
    let noon = Utc
        .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("fixture instant");
    Arc::new(MutableClock::new(noon))
}

/// Initialise the production route table, mounted under `/api/v1`, over
/// `store`.
pub(crate) async fn init_api(
    store: &MemoryStore,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let state = HttpState::from_store(store.ledger_store(), clock());
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_extractors)
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .route(LOGIN_PATH, web::get().to(login))
                    .configure(api_routes),
            ),
    )
    .await
}

/// Sign `user_id` in and return the session cookie.
pub(crate) async fn sign_in<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    session_cookie_at(app, &format!("/api/v1/test/login/{user_id}")).await
}

/// Grant `user_id` the super admin platform role directly in `store`.
pub(crate) async fn promote(store: &MemoryStore, user_id: &UserId) {
    store
        .ledger_store()
        .profiles
        .set_platform_role(user_id, PlatformRole::SuperAdmin)
        .await
        .expect("promote");
}

/// Send a JSON request and return the status plus decoded body.
pub(crate) async fn call<S>(
    app: &S,
    cookie: &Cookie<'static>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = test::TestRequest::default()
        .method(method)
        .uri(uri)
        .cookie(cookie.clone());
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

/// Id field of a JSON entity.
pub(crate) fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_owned()
}
