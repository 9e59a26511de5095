//! PostgreSQL-backed `MemberRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MemberRepository, RepositoryError};
use crate::domain::{GroupId, Member, MemberId};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_column};
use super::models::{MemberRow, MemberUpdateRow};
use super::pool::DbPool;
use super::schema::members;

/// Diesel-backed implementation of [`MemberRepository`].
#[derive(Clone)]
pub struct DieselMemberRepository {
    pool: DbPool,
}

impl DieselMemberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_member(row: MemberRow) -> Result<Member, RepositoryError> {
    Ok(Member {
        id: MemberId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        full_name: row.full_name,
        phone: row.phone,
        email: row.email,
        national_id: row.national_id,
        address: row.address,
        status: parse_column(&row.status, "members.status")?,
        join_date: row.join_date,
        created_at: row.created_at,
    })
}

#[async_trait]
impl MemberRepository for DieselMemberRepository {
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = MemberRow {
            id: *member.id.as_uuid(),
            group_id: *member.group_id.as_uuid(),
            full_name: member.full_name.clone(),
            phone: member.phone.clone(),
            email: member.email.clone(),
            national_id: member.national_id.clone(),
            address: member.address.clone(),
            status: member.status.as_str().to_owned(),
            join_date: member.join_date,
            created_at: member.created_at,
        };
        diesel::insert_into(members::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<Option<Member>, RepositoryError> {
        query_optional!(
            self,
            members::table,
            members::group_id
                .eq(group_id.as_uuid())
                .and(members::id.eq(member_id.as_uuid())),
            MemberRow,
            row_to_member
        )
    }

    async fn list(&self, group_id: &GroupId) -> Result<Vec<Member>, RepositoryError> {
        query_vec!(
            self,
            members::table
                .filter(members::group_id.eq(*group_id.as_uuid()))
                .order_by(members::full_name.asc()),
            MemberRow,
            row_to_member
        )
    }

    async fn update(&self, member: &Member) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = MemberUpdateRow {
            full_name: &member.full_name,
            phone: member.phone.as_deref(),
            email: member.email.as_deref(),
            national_id: member.national_id.as_deref(),
            address: member.address.as_deref(),
            status: member.status.as_str(),
        };
        let updated = diesel::update(
            members::table
                .filter(members::group_id.eq(member.group_id.as_uuid()))
                .filter(members::id.eq(member.id.as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(RepositoryError::missing("member"));
        }
        Ok(())
    }

    async fn delete(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            members::table
                .filter(members::group_id.eq(group_id.as_uuid()))
                .filter(members::id.eq(member_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(RepositoryError::missing("member"));
        }
        Ok(())
    }
}
