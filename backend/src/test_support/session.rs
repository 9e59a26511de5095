//! Sign-in plumbing for HTTP tests.
//!
//! Production never issues sessions itself, so tests mount [`login`] at
//! [`LOGIN_PATH`] to obtain a signed cookie for any user id.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test as actix_test, web, HttpResponse};

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

/// Route that signs the given user in.
pub const LOGIN_PATH: &str = "/test/login/{userId}";

/// Session middleware with a fresh key and the `Secure` flag disabled for
/// plain HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler behind [`LOGIN_PATH`].
pub async fn login(session: SessionContext, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let user_id: UserId = path
        .into_inner()
        .parse()
        .map_err(|_| Error::invalid_request("bad user id"))?;
    session.sign_in(user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign `user_id` in through `login_uri` and return the session cookie.
pub async fn session_cookie_at<S>(app: &S, login_uri: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, actix_test::TestRequest::get().uri(login_uri).to_request()).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Sign `user_id` in through [`LOGIN_PATH`] mounted at the app root.
pub async fn session_cookie<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    session_cookie_at(app, &format!("/test/login/{user_id}")).await
}
