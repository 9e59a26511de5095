//! Test utilities for the village bank crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). It is
//! only compiled for tests or with the `test-support` feature.

mod clock;
mod session;

pub use clock::MutableClock;
pub use session::{
    login, session_cookie, session_cookie_at, test_session_middleware, LOGIN_PATH,
};
