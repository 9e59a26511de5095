//! Port for per-group settings.

use async_trait::async_trait;

use crate::domain::{GroupId, Setting};

use super::RepositoryError;

/// Key/value storage, unique per `(group, key)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored rows for the group. Keys never written are absent.
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Setting>, RepositoryError>;

    /// Insert or replace one setting.
    async fn upsert(&self, setting: &Setting) -> Result<(), RepositoryError>;
}
