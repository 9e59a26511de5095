//! PostgreSQL-backed registry adapters: groups, memberships and profiles.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    GroupRepository, MembershipRepository, ProfileRepository, RepositoryError,
};
use crate::domain::{
    Group, GroupId, GroupProfile, GroupReview, GroupRole, GroupStatus, Membership, PlatformRole,
    UserId, UserProfile,
};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{cas_failure, map_diesel_error, map_pool_error, parse_column};
use super::models::{
    GroupProfileUpdate, GroupReviewUpdate, GroupRow, MembershipRow, ProfileRecord, ProfileRow,
};
use super::pool::DbPool;
use super::schema::{group_memberships, groups, profiles};

fn row_to_group(row: GroupRow) -> Result<Group, RepositoryError> {
    Ok(Group {
        id: GroupId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        location: row.location,
        status: parse_column(&row.status, "groups.status")?,
        created_by: UserId::from_uuid(row.created_by),
        reviewed_by: row.reviewed_by.map(UserId::from_uuid),
        reviewed_at: row.reviewed_at,
        admin_notes: row.admin_notes,
        created_at: row.created_at,
    })
}

fn group_to_row(group: &Group) -> GroupRow {
    GroupRow {
        id: *group.id.as_uuid(),
        name: group.name.clone(),
        description: group.description.clone(),
        location: group.location.clone(),
        status: group.status.as_str().to_owned(),
        created_by: *group.created_by.as_uuid(),
        reviewed_by: group.reviewed_by.map(|id| *id.as_uuid()),
        reviewed_at: group.reviewed_at,
        admin_notes: group.admin_notes.clone(),
        created_at: group.created_at,
    }
}

fn row_to_membership(row: MembershipRow) -> Result<Membership, RepositoryError> {
    Ok(Membership {
        group_id: GroupId::from_uuid(row.group_id),
        user_id: UserId::from_uuid(row.user_id),
        role: parse_column(&row.role, "group_memberships.role")?,
        created_at: row.created_at,
    })
}

fn row_to_profile(row: ProfileRecord) -> Result<UserProfile, RepositoryError> {
    Ok(UserProfile {
        user_id: UserId::from_uuid(row.user_id),
        platform_role: parse_column(&row.platform_role, "profiles.platform_role")?,
    })
}

fn membership_to_row(membership: &Membership) -> MembershipRow {
    MembershipRow {
        group_id: *membership.group_id.as_uuid(),
        user_id: *membership.user_id.as_uuid(),
        role: membership.role.as_str().to_owned(),
        created_at: membership.created_at,
    }
}

/// Diesel-backed implementation of [`GroupRepository`].
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create(&self, group: &Group, founder: &Membership) -> Result<(), RepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let group_row = group_to_row(group);
        let founder_row = membership_to_row(founder);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // A group never exists without its founding admin.
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(groups::table)
                    .values(&group_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(group_memberships::table)
                    .values(&founder_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError> {
        query_optional!(
            self,
            groups::table,
            groups::id.eq(id.as_uuid()),
            GroupRow,
            row_to_group
        )
    }

    async fn list(&self, status: Option<GroupStatus>) -> Result<Vec<Group>, RepositoryError> {
        let mut query = groups::table.order_by(groups::created_at.desc()).into_boxed();
        if let Some(status) = status {
            query = query.filter(groups::status.eq(status.as_str()));
        }
        query_vec!(self, query, GroupRow, row_to_group)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Group>, RepositoryError> {
        let joined = group_memberships::table
            .filter(group_memberships::user_id.eq(*user_id.as_uuid()))
            .select(group_memberships::group_id);
        query_vec!(
            self,
            groups::table
                .filter(groups::id.eq_any(joined))
                .order_by(groups::created_at.desc()),
            GroupRow,
            row_to_group
        )
    }

    async fn update_profile(
        &self,
        id: &GroupId,
        profile: &GroupProfile,
    ) -> Result<Group, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = GroupProfileUpdate {
            name: profile.name(),
            description: profile.description(),
            location: profile.location(),
        };
        let row: Option<GroupRow> = diesel::update(groups::table.filter(groups::id.eq(id.as_uuid())))
            .set(&changes)
            .returning(GroupRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_group)
            .transpose()?
            .ok_or_else(|| RepositoryError::missing("group"))
    }

    async fn review(
        &self,
        id: &GroupId,
        expected: GroupStatus,
        review: &GroupReview,
    ) -> Result<Group, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = GroupReviewUpdate {
            status: review.status.as_str(),
            reviewed_by: Some(*review.reviewed_by.as_uuid()),
            reviewed_at: Some(review.reviewed_at),
            admin_notes: review.admin_notes.as_deref(),
        };
        let updated: Option<GroupRow> = diesel::update(
            groups::table
                .filter(groups::id.eq(id.as_uuid()))
                .filter(groups::status.eq(expected.as_str())),
        )
        .set(&changes)
        .returning(GroupRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => row_to_group(row),
            None => {
                let found: Option<String> = groups::table
                    .filter(groups::id.eq(id.as_uuid()))
                    .select(groups::status)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Err(cas_failure("group", expected.as_str(), found))
            }
        }
    }
}

/// Diesel-backed implementation of [`MembershipRepository`].
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn find(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, RepositoryError> {
        query_optional!(
            self,
            group_memberships::table,
            group_memberships::group_id
                .eq(group_id.as_uuid())
                .and(group_memberships::user_id.eq(user_id.as_uuid())),
            MembershipRow,
            row_to_membership
        )
    }

    async fn list(&self, group_id: &GroupId) -> Result<Vec<Membership>, RepositoryError> {
        query_vec!(
            self,
            group_memberships::table
                .filter(group_memberships::group_id.eq(*group_id.as_uuid()))
                .order_by(group_memberships::created_at.asc()),
            MembershipRow,
            row_to_membership
        )
    }

    async fn insert(&self, membership: &Membership) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(group_memberships::table)
            .values(&membership_to_row(membership))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_role(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        role: GroupRole,
    ) -> Result<Membership, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MembershipRow> = diesel::update(
            group_memberships::table
                .filter(group_memberships::group_id.eq(group_id.as_uuid()))
                .filter(group_memberships::user_id.eq(user_id.as_uuid())),
        )
        .set(group_memberships::role.eq(role.as_str()))
        .returning(MembershipRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_membership)
            .transpose()?
            .ok_or_else(|| RepositoryError::missing("membership"))
    }

    async fn delete(&self, group_id: &GroupId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            group_memberships::table
                .filter(group_memberships::group_id.eq(group_id.as_uuid()))
                .filter(group_memberships::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(RepositoryError::missing("membership"));
        }
        Ok(())
    }
}

/// Diesel-backed implementation of [`ProfileRepository`].
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn platform_role(&self, user_id: &UserId) -> Result<PlatformRole, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: Option<String> = profiles::table
            .filter(profiles::user_id.eq(user_id.as_uuid()))
            .select(profiles::platform_role)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        stored.map_or(Ok(PlatformRole::User), |role| {
            parse_column(&role, "profiles.platform_role")
        })
    }

    async fn set_platform_role(
        &self,
        user_id: &UserId,
        role: PlatformRole,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ProfileRow {
            user_id: *user_id.as_uuid(),
            platform_role: role.as_str(),
            updated_at: Utc::now(),
        };
        diesel::insert_into(profiles::table)
            .values(&row)
            .on_conflict(profiles::user_id)
            .do_update()
            .set((
                profiles::platform_role.eq(excluded(profiles::platform_role)),
                profiles::updated_at.eq(excluded(profiles::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let query = profiles::table.order_by(profiles::user_id.asc());
        query_vec!(self, query, ProfileRecord, row_to_profile)
    }
}

