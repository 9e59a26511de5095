//! PostgreSQL-backed `SavingsRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, SavingsRepository};
use crate::domain::{GroupId, MemberId, Saving, SavingFilter, SavingId, SavingStatus, UserId};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{amount_column, map_diesel_error, map_pool_error, parse_column};
use super::models::SavingRow;
use super::pool::DbPool;
use super::schema::savings;

/// Diesel-backed implementation of [`SavingsRepository`].
#[derive(Clone)]
pub struct DieselSavingsRepository {
    pool: DbPool,
}

impl DieselSavingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_saving(row: SavingRow) -> Result<Saving, RepositoryError> {
    Ok(Saving {
        id: SavingId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        member_id: MemberId::from_uuid(row.member_id),
        amount: amount_column(row.amount, "savings.amount")?,
        deposit_date: row.deposit_date,
        month_year: parse_column(&row.month_year, "savings.month_year")?,
        status: parse_column(&row.status, "savings.status")?,
        notes: row.notes,
        recorded_by: UserId::from_uuid(row.recorded_by),
        created_at: row.created_at,
    })
}

#[async_trait]
impl SavingsRepository for DieselSavingsRepository {
    async fn insert(&self, saving: &Saving) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = SavingRow {
            id: *saving.id.as_uuid(),
            group_id: *saving.group_id.as_uuid(),
            member_id: *saving.member_id.as_uuid(),
            amount: saving.amount.value(),
            deposit_date: saving.deposit_date,
            month_year: saving.month_year.to_string(),
            status: saving.status.as_str().to_owned(),
            notes: saving.notes.clone(),
            recorded_by: *saving.recorded_by.as_uuid(),
            created_at: saving.created_at,
        };
        diesel::insert_into(savings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &SavingId,
    ) -> Result<Option<Saving>, RepositoryError> {
        query_optional!(
            self,
            savings::table,
            savings::group_id
                .eq(group_id.as_uuid())
                .and(savings::id.eq(id.as_uuid())),
            SavingRow,
            row_to_saving
        )
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: SavingFilter,
    ) -> Result<Vec<Saving>, RepositoryError> {
        let mut query = savings::table
            .filter(savings::group_id.eq(*group_id.as_uuid()))
            .order_by(savings::created_at.desc())
            .into_boxed();
        if let Some(member_id) = filter.member_id {
            query = query.filter(savings::member_id.eq(*member_id.as_uuid()));
        }
        if let Some(month_year) = filter.month_year {
            query = query.filter(savings::month_year.eq(month_year.to_string()));
        }
        query_vec!(self, query, SavingRow, row_to_saving)
    }

    async fn update_status(
        &self,
        group_id: &GroupId,
        id: &SavingId,
        status: SavingStatus,
    ) -> Result<Saving, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SavingRow> = diesel::update(
            savings::table
                .filter(savings::group_id.eq(group_id.as_uuid()))
                .filter(savings::id.eq(id.as_uuid())),
        )
        .set(savings::status.eq(status.as_str()))
        .returning(SavingRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_saving)
            .transpose()?
            .ok_or_else(|| RepositoryError::missing("saving"))
    }
}
