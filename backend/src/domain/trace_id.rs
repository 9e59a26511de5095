//! Correlation id for one request.
//!
//! The HTTP middleware opens a scope per request; anything running inside it
//! (services, error constructors, log spans) can read the id without it being
//! passed around. The value lives in a Tokio task-local, so work moved to
//! another task must be wrapped in [`TraceId::scope`] again.

use std::fmt;
use std::future::Future;

use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// Per-request correlation identifier.
///
/// ```
/// use village_bank::domain::TraceId;
///
/// // Outside a request scope there is nothing to correlate with.
/// assert!(TraceId::current().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the enclosing request, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<F: Future>(trace_id: Self, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let first = TraceId::generate();
        let second = TraceId::generate();
        assert_ne!(first, second);
        Uuid::parse_str(&first.to_string()).expect("hyphenated uuid");
    }

    #[tokio::test]
    async fn scope_exposes_the_id_until_it_ends() {
        let id = TraceId::generate();
        let inner = TraceId::scope(id, async {
            tokio::task::yield_now().await;
            TraceId::current()
        })
        .await;
        assert_eq!(inner, Some(id));
        assert_eq!(TraceId::current(), None);
    }

    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (nested, TraceId::current())
        })
        .await;
        assert_eq!(seen, (Some(inner), Some(outer)));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_id() {
        let id = TraceId::generate();
        let spawned = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task joins")
        })
        .await;
        assert_eq!(spawned, None);
    }
}
