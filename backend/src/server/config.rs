//! Server settings loaded via OrthoConfig and the builder handed to
//! [`super::create_server`].

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use village_bank::domain::UserId;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Process settings read from `VILLAGE_BANK_*` variables, config files and
/// flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VILLAGE_BANK")]
pub struct ServerSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// User id granted `super_admin` at startup.
    pub bootstrap_super_admin: Option<String>,
}

impl ServerSettings {
    /// Parse the configured listen address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {error}"),
            )
        })
    }

    /// Maximum pool size, falling back to the default.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Parse the bootstrap super admin id, if configured.
    pub fn bootstrap_super_admin(&self) -> std::io::Result<Option<UserId>> {
        self.bootstrap_super_admin
            .as_deref()
            .map(|raw| {
                raw.parse::<UserId>().map_err(|error| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("invalid bootstrap super admin id {raw:?}: {error}"),
                    )
                })
            })
            .transpose()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) db_max_connections: u32,
    pub(crate) run_migrations: bool,
    pub(crate) bootstrap_super_admin: Option<UserId>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            run_migrations: true,
            bootstrap_super_admin: None,
        }
    }

    /// Persist to PostgreSQL at `database_url` through a pool of at most
    /// `max_connections`.
    #[must_use]
    pub fn with_database(mut self, database_url: String, max_connections: u32) -> Self {
        self.database_url = Some(database_url);
        self.db_max_connections = max_connections;
        self
    }

    /// Toggle embedded migrations at startup.
    #[must_use]
    pub fn with_migrations(mut self, run_migrations: bool) -> Self {
        self.run_migrations = run_migrations;
        self
    }

    /// Grant `user_id` the `super_admin` platform role at startup.
    #[must_use]
    pub fn with_bootstrap_super_admin(mut self, user_id: Option<UserId>) -> Self {
        self.bootstrap_super_admin = user_id;
        self
    }
}
