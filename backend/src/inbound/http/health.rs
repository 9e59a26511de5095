//! Health endpoints: liveness and readiness probes for orchestration.
//!
//! The process moves through three phases: starting (store not yet
//! initialised), serving, and draining during graceful shutdown. Readiness
//! holds only while serving; liveness fails only once draining.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{get, http::header, web, HttpResponse};
use tracing::debug;

const STARTING: u8 = 0;
const SERVING: u8 = 1;
const DRAINING: u8 = 2;

/// Shared lifecycle phase behind both probes.
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(STARTING),
        }
    }
}

impl HealthState {
    /// A process that is alive but not yet ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ledger store is up; start accepting traffic. Ignored once draining.
    pub fn mark_ready(&self) {
        let moved = self
            .phase
            .compare_exchange(STARTING, SERVING, Ordering::AcqRel, Ordering::Acquire);
        if let Err(phase) = moved {
            debug!(phase, "ready signal ignored");
        }
    }

    /// Begin draining: both probes fail from now on.
    pub fn mark_unhealthy(&self) {
        self.phase.store(DRAINING, Ordering::Release);
    }

    fn phase(&self) -> u8 {
        self.phase.load(Ordering::Acquire)
    }
}

fn health_response(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe. Returns 503 until the ledger store is available.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is starting or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.phase() == SERVING)
}

/// Liveness probe. Returns 503 once the server starts draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    health_response(state.phase() != DRAINING)
}
