//! Builds the repository bundle and the HTTP state the handlers share.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use village_bank::domain::ports::{LedgerStore, ProfileRepository};
use village_bank::domain::{PlatformRole, UserId};
use village_bank::inbound::http::state::HttpState;
use village_bank::outbound::memory::MemoryStore;
use village_bank::outbound::persistence::{ledger_store, run_migrations_blocking, DbPool, PoolConfig};

use super::ServerConfig;

/// Select PostgreSQL when a database URL is configured, else the in-memory
/// store. Runs embedded migrations first when enabled.
pub(crate) async fn build_ledger_store(config: &ServerConfig) -> std::io::Result<LedgerStore> {
    let Some(database_url) = config.database_url.clone() else {
        info!("no database configured; using the in-memory store");
        return Ok(MemoryStore::new().ledger_store());
    };

    if config.run_migrations {
        run_migrations_blocking(database_url.clone())
            .await
            .map_err(|error| std::io::Error::other(format!("migrations failed: {error}")))?;
        info!("database migrations applied");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(config.db_max_connections))
        .await
        .map_err(|error| std::io::Error::other(format!("database pool: {error}")))?;
    Ok(ledger_store(pool))
}

/// Grant `user_id` the `super_admin` platform role.
pub(crate) async fn seed_super_admin(
    profiles: &dyn ProfileRepository,
    user_id: &UserId,
) -> std::io::Result<()> {
    profiles
        .set_platform_role(user_id, PlatformRole::SuperAdmin)
        .await
        .map_err(|error| std::io::Error::other(format!("bootstrap super admin: {error}")))?;
    info!(%user_id, "bootstrap super admin granted");
    Ok(())
}

/// Wire the services over `store` with the wall clock.
pub(crate) fn build_http_state(store: LedgerStore) -> web::Data<HttpState> {
    web::Data::new(HttpState::from_store(store, Arc::new(DefaultClock)))
}
