//! PostgreSQL-backed `SettingsRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, SettingsRepository};
use crate::domain::{GroupId, Setting, UserId};
use crate::query_vec;

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_column};
use super::models::SettingRow;
use super::pool::DbPool;
use super::schema::group_settings;

/// Diesel-backed implementation of [`SettingsRepository`].
#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_setting(row: SettingRow) -> Result<Setting, RepositoryError> {
    Ok(Setting {
        group_id: GroupId::from_uuid(row.group_id),
        key: parse_column(&row.key, "group_settings.key")?,
        value: row.value,
        updated_by: row.updated_by.map(UserId::from_uuid),
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Setting>, RepositoryError> {
        let query = group_settings::table
            .filter(group_settings::group_id.eq(*group_id.as_uuid()))
            .order_by(group_settings::key.asc());
        query_vec!(self, query, SettingRow, row_to_setting)
    }

    async fn upsert(&self, setting: &Setting) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = SettingRow {
            group_id: *setting.group_id.as_uuid(),
            key: setting.key.as_str().to_owned(),
            value: setting.value.clone(),
            updated_by: setting.updated_by.map(|id| *id.as_uuid()),
            updated_at: setting.updated_at,
        };
        diesel::insert_into(group_settings::table)
            .values(&row)
            .on_conflict((group_settings::group_id, group_settings::key))
            .do_update()
            .set((
                group_settings::value.eq(excluded(group_settings::value)),
                group_settings::updated_by.eq(excluded(group_settings::updated_by)),
                group_settings::updated_at.eq(excluded(group_settings::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
