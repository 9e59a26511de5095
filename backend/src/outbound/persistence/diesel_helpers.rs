//! Shared helpers and macros for Diesel repository implementations.
//!
//! This module provides common utilities for database access including:
//! - Error mapping from pool and Diesel errors to [`RepositoryError`]
//! - Column decoding for enum text and money values
//! - Disambiguation of zero-row compare-and-swap updates
//! - Declarative macros for common query patterns

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ports::RepositoryError;
use crate::domain::Amount;

use super::pool::PoolError;

/// Map pool errors to a retryable connection failure.
pub fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
///
/// Unique violations become [`RepositoryError::Duplicate`] carrying the
/// constraint name; driver messages are logged at debug and never
/// forwarded.
pub fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => RepositoryError::duplicate(
                info.constraint_name()
                    .unwrap_or("unique constraint")
                    .to_owned(),
            ),
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection error")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Decode an enum or key column stored as text.
pub fn parse_column<T>(value: &str, column: &'static str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|error| RepositoryError::query(format!("corrupt {column} column: {error}")))
}

/// Decode a strictly positive money column.
pub fn amount_column(value: Decimal, column: &'static str) -> Result<Amount, RepositoryError> {
    Amount::new(value)
        .map_err(|error| RepositoryError::query(format!("corrupt {column} column: {error}")))
}

/// Explain a compare-and-swap that updated nothing.
///
/// `found` is the status re-read after the update: `None` means the row is
/// not in the group at all.
pub fn cas_failure(entity: &str, expected: &str, found: Option<String>) -> RepositoryError {
    match found {
        Some(actual) => RepositoryError::status_mismatch(entity, expected, actual),
        None => RepositoryError::missing(entity),
    }
}

/// Collect row conversion results, stopping at the first corrupt row.
pub fn collect_rows<T>(
    results: impl Iterator<Item = Result<T, RepositoryError>>,
) -> Result<Vec<T>, RepositoryError> {
    results.collect()
}

/// Macro for query methods that return `Option<T>`.
///
/// Reduces boilerplate: acquire connection, execute query, map errors,
/// convert the row with a fallible converter.
#[macro_export]
macro_rules! query_optional {
    (
        $self:ident,
        $table:expr,
        $filter:expr,
        $row_type:ty,
        $converter:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;
        use $crate::outbound::persistence::diesel_helpers::map_pool_error;

        let mut conn = $self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map($converter).transpose()
    }};
}

/// Macro for query methods that return `Vec<T>`.
///
/// Reduces boilerplate: acquire connection, execute query with ordering,
/// map errors, convert rows.
#[macro_export]
macro_rules! query_vec {
    (
        $self:ident,
        $query:expr,
        $row_type:ty,
        $converter:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::collect_rows;
        use $crate::outbound::persistence::diesel_helpers::map_diesel_error;
        use $crate::outbound::persistence::diesel_helpers::map_pool_error;

        let mut conn = $self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<$row_type> = $query
            .select(<$row_type>::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows.into_iter().map($converter))
    }};
}
