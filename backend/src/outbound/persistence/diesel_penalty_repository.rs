//! PostgreSQL-backed `PenaltyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PenaltyRepository, RepositoryError};
use crate::domain::{
    GroupId, LoanId, MemberId, Penalty, PenaltyFilter, PenaltyId, PenaltyTransition,
};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{
    amount_column, cas_failure, map_diesel_error, map_pool_error, parse_column,
};
use super::models::PenaltyRow;
use super::pool::DbPool;
use super::schema::penalties;

/// Diesel-backed implementation of [`PenaltyRepository`].
#[derive(Clone)]
pub struct DieselPenaltyRepository {
    pool: DbPool,
}

impl DieselPenaltyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_penalty(row: PenaltyRow) -> Result<Penalty, RepositoryError> {
    Ok(Penalty {
        id: PenaltyId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        member_id: MemberId::from_uuid(row.member_id),
        loan_id: row.loan_id.map(LoanId::from_uuid),
        amount: amount_column(row.amount, "penalties.amount")?,
        penalty_type: parse_column(&row.penalty_type, "penalties.penalty_type")?,
        penalty_date: row.penalty_date,
        reason: row.reason,
        status: parse_column(&row.status, "penalties.status")?,
        paid_date: row.paid_date,
        created_at: row.created_at,
    })
}

#[async_trait]
impl PenaltyRepository for DieselPenaltyRepository {
    async fn insert(&self, penalty: &Penalty) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PenaltyRow {
            id: *penalty.id.as_uuid(),
            group_id: *penalty.group_id.as_uuid(),
            member_id: *penalty.member_id.as_uuid(),
            loan_id: penalty.loan_id.map(|id| *id.as_uuid()),
            amount: penalty.amount.value(),
            penalty_type: penalty.penalty_type.as_str().to_owned(),
            penalty_date: penalty.penalty_date,
            reason: penalty.reason.clone(),
            status: penalty.status.as_str().to_owned(),
            paid_date: penalty.paid_date,
            created_at: penalty.created_at,
        };
        diesel::insert_into(penalties::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
    ) -> Result<Option<Penalty>, RepositoryError> {
        query_optional!(
            self,
            penalties::table,
            penalties::group_id
                .eq(group_id.as_uuid())
                .and(penalties::id.eq(id.as_uuid())),
            PenaltyRow,
            row_to_penalty
        )
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: PenaltyFilter,
    ) -> Result<Vec<Penalty>, RepositoryError> {
        let mut query = penalties::table
            .filter(penalties::group_id.eq(*group_id.as_uuid()))
            .order_by(penalties::created_at.desc())
            .into_boxed();
        if let Some(member_id) = filter.member_id {
            query = query.filter(penalties::member_id.eq(*member_id.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(penalties::status.eq(status.as_str()));
        }
        query_vec!(self, query, PenaltyRow, row_to_penalty)
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
        transition: &PenaltyTransition,
    ) -> Result<Penalty, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated: Option<PenaltyRow> = diesel::update(
            penalties::table
                .filter(penalties::group_id.eq(group_id.as_uuid()))
                .filter(penalties::id.eq(id.as_uuid()))
                .filter(penalties::status.eq(PenaltyTransition::FROM.as_str())),
        )
        .set((
            penalties::status.eq(transition.to.as_str()),
            penalties::paid_date.eq(transition.paid_date),
        ))
        .returning(PenaltyRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => row_to_penalty(row),
            None => {
                let found: Option<String> = penalties::table
                    .filter(penalties::group_id.eq(group_id.as_uuid()))
                    .filter(penalties::id.eq(id.as_uuid()))
                    .select(penalties::status)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Err(cas_failure("penalty", PenaltyTransition::FROM.as_str(), found))
            }
        }
    }
}
