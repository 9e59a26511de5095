//! Signed-cookie session carrying the caller's [`UserId`].
//!
//! Sessions are issued outside this service; the adapter only trusts what
//! the signed cookie says.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

const USER_KEY: &str = "user";

/// Caller identity as recorded in the session cookie.
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    /// Record `user_id` as the signed-in user.
    ///
    /// # Errors
    /// Returns `InternalError` when the session cannot be written.
    pub fn sign_in(&self, user_id: UserId) -> Result<(), Error> {
        self.session.renew();
        self.session
            .insert(USER_KEY, user_id)
            .map_err(|error| Error::internal(format!("session write failed: {error}")))
    }

    /// The signed-in user, if any.
    ///
    /// A cookie whose user entry no longer decodes is purged and treated as
    /// anonymous.
    pub fn current_user(&self) -> Option<UserId> {
        match self.session.get::<UserId>(USER_KEY) {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "discarding unreadable session");
                self.session.purge();
                None
            }
        }
    }

    /// The signed-in user, or `401 Unauthorized`.
    ///
    /// # Errors
    /// Returns `Unauthorized` for anonymous callers.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.current_user()
            .ok_or_else(|| Error::unauthorized("sign-in required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { Ok(Self { session: session.await? }) })
    }
}

#[cfg(test)]
mod tests {
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App, HttpResponse};
    use rstest::rstest;

    use super::*;
    use crate::test_support::{session_cookie_at, test_session_middleware};

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let user = session.require_user()?;
        Ok(HttpResponse::Ok().body(user.to_string()))
    }

    async fn sign_in(session: SessionContext, path: web::Path<UserId>) -> Result<HttpResponse, Error> {
        session.sign_in(path.into_inner())?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn corrupt(session: Session, value: web::Path<String>) -> HttpResponse {
        match session.insert(USER_KEY, value.into_inner()) {
            Ok(()) => HttpResponse::NoContent().finish(),
            Err(_) => HttpResponse::InternalServerError().finish(),
        }
    }

    macro_rules! session_app {
        () => {
            actix_test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .route("/whoami", web::get().to(whoami))
                    .route("/sign-in/{userId}", web::get().to(sign_in))
                    .route("/corrupt/{value}", web::get().to(corrupt)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn signed_in_user_is_read_back() {
        let app = session_app!();
        let user = UserId::random();
        let cookie = session_cookie_at(&app, &format!("/sign-in/{user}")).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, user.to_string());
    }

    #[actix_web::test]
    async fn anonymous_callers_are_unauthorised() {
        let app = session_app!();
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("42")]
    #[actix_web::test]
    async fn undecodable_user_entries_are_unauthorised(#[case] value: &str) {
        let app = session_app!();
        let cookie = session_cookie_at(&app, &format!("/corrupt/{value}")).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
