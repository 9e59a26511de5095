//! PostgreSQL-backed `SocialFundRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, SocialFundRepository};
use crate::domain::{
    GroupId, MemberId, SocialFundTransaction, SocialFundTransition, SocialFundTxId,
    SocialFundTxType, UserId,
};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{
    amount_column, cas_failure, map_diesel_error, map_pool_error, parse_column,
};
use super::models::SocialFundRow;
use super::pool::DbPool;
use super::schema::social_fund_transactions as txs;

/// Diesel-backed implementation of [`SocialFundRepository`].
#[derive(Clone)]
pub struct DieselSocialFundRepository {
    pool: DbPool,
}

impl DieselSocialFundRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_tx(row: SocialFundRow) -> Result<SocialFundTransaction, RepositoryError> {
    Ok(SocialFundTransaction {
        id: SocialFundTxId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        member_id: MemberId::from_uuid(row.member_id),
        amount: amount_column(row.amount, "social_fund_transactions.amount")?,
        transaction_type: parse_column(
            &row.transaction_type,
            "social_fund_transactions.transaction_type",
        )?,
        status: parse_column(&row.status, "social_fund_transactions.status")?,
        transaction_date: row.transaction_date,
        month_year: parse_column(&row.month_year, "social_fund_transactions.month_year")?,
        purpose: row.purpose,
        approved_by: row.approved_by.map(UserId::from_uuid),
        created_at: row.created_at,
    })
}

#[async_trait]
impl SocialFundRepository for DieselSocialFundRepository {
    async fn insert(&self, tx: &SocialFundTransaction) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = SocialFundRow {
            id: *tx.id.as_uuid(),
            group_id: *tx.group_id.as_uuid(),
            member_id: *tx.member_id.as_uuid(),
            amount: tx.amount.value(),
            transaction_type: tx.transaction_type.as_str().to_owned(),
            status: tx.status.as_str().to_owned(),
            transaction_date: tx.transaction_date,
            month_year: tx.month_year.to_string(),
            purpose: tx.purpose.clone(),
            approved_by: tx.approved_by.map(|id| *id.as_uuid()),
            created_at: tx.created_at,
        };
        diesel::insert_into(txs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
    ) -> Result<Option<SocialFundTransaction>, RepositoryError> {
        query_optional!(
            self,
            txs::table,
            txs::group_id
                .eq(group_id.as_uuid())
                .and(txs::id.eq(id.as_uuid())),
            SocialFundRow,
            row_to_tx
        )
    }

    async fn list(
        &self,
        group_id: &GroupId,
        member_id: Option<MemberId>,
    ) -> Result<Vec<SocialFundTransaction>, RepositoryError> {
        let mut query = txs::table
            .filter(txs::group_id.eq(*group_id.as_uuid()))
            .order_by(txs::created_at.desc())
            .into_boxed();
        if let Some(member_id) = member_id {
            query = query.filter(txs::member_id.eq(*member_id.as_uuid()));
        }
        query_vec!(self, query, SocialFundRow, row_to_tx)
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
        transition: &SocialFundTransition,
    ) -> Result<SocialFundTransaction, RepositoryError> {
        let withdrawal = SocialFundTxType::Withdrawal.as_str();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated: Option<SocialFundRow> = diesel::update(
            txs::table
                .filter(txs::group_id.eq(group_id.as_uuid()))
                .filter(txs::id.eq(id.as_uuid()))
                .filter(txs::transaction_type.eq(withdrawal))
                .filter(txs::status.eq(transition.from.as_str())),
        )
        .set((
            txs::status.eq(transition.to.as_str()),
            txs::approved_by.eq(Some(*transition.approved_by.as_uuid())),
        ))
        .returning(SocialFundRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = updated {
            return row_to_tx(row);
        }
        // Contributions are never reviewable, so only withdrawals count as found.
        let found: Option<String> = txs::table
            .filter(txs::group_id.eq(group_id.as_uuid()))
            .filter(txs::id.eq(id.as_uuid()))
            .filter(txs::transaction_type.eq(withdrawal))
            .select(txs::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(cas_failure("withdrawal", transition.from.as_str(), found))
    }
}
