//! Village bank server entry point: loads settings, prepares the ledger
//! store and serves the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use server::{create_server, ServerConfig, ServerSettings};
use village_bank::inbound::http::health::HealthState;
use village_bank::inbound::http::session_config::{session_settings_from_env, BuildMode};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|error| std::io::Error::other(format!("configuration: {error}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_migrations(settings.run_migrations)
    .with_bootstrap_super_admin(settings.bootstrap_super_admin()?);
    if let Some(database_url) = settings.database_url.clone() {
        config = config.with_database(database_url, settings.db_max_connections());
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    info!(bind_addr = ?settings.bind_addr, "village bank listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
