//! Embedded schema migrations.
//!
//! `diesel_migrations` only drives synchronous connections, so the runner
//! opens a plain `PgConnection` on a blocking thread.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::RepositoryError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration.
///
/// # Errors
///
/// Returns [`RepositoryError::Connection`] when the database is unreachable
/// and [`RepositoryError::Query`] when a migration fails.
pub fn run_migrations(database_url: &str) -> Result<(), RepositoryError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| RepositoryError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::query(format!("migration: {err}")))?;
    info!(applied = applied.len(), "database migrations applied");
    Ok(())
}

/// Async wrapper running [`run_migrations`] off the reactor.
///
/// # Errors
///
/// As [`run_migrations`]; a panicked worker is reported as a query failure.
pub async fn run_migrations_blocking(database_url: String) -> Result<(), RepositoryError> {
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .map_err(|err| RepositoryError::query(format!("migration task: {err}")))?
}
