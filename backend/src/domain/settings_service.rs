//! Group settings service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{LedgerStore, SettingsStore};
use crate::domain::{
    effective_settings, Capability, EffectiveSetting, Error, GroupAccess, Setting, SettingKey,
};

/// Implements [`SettingsStore`].
#[derive(Clone)]
pub struct SettingsService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl SettingsService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl SettingsStore for SettingsService {
    async fn get_settings(&self, access: &GroupAccess) -> Result<Vec<EffectiveSetting>, Error> {
        let stored = self.store.settings.list(access.group_id()).await?;
        Ok(effective_settings(&stored))
    }

    async fn update_setting(
        &self,
        access: &GroupAccess,
        key: SettingKey,
        value: String,
    ) -> Result<EffectiveSetting, Error> {
        access.require(Capability::ManageSettings)?;
        let value = key.normalise(&value).map_err(|error| {
            Error::invalid_request(error.to_string())
                .with_details(json!({ "field": "value", "key": key }))
        })?;
        let setting = Setting {
            group_id: *access.group_id(),
            key,
            value,
            updated_by: Some(*access.user_id()),
            updated_at: self.clock.utc(),
        };
        self.store.settings.upsert(&setting).await?;
        info!(group_id = %setting.group_id, %key, value = %setting.value, "setting updated");
        Ok(EffectiveSetting {
            key,
            value: setting.value,
            is_default: false,
            updated_by: setting.updated_by,
            updated_at: Some(setting.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::service_test_support::{access, access_in, fixture_clock, group, MockStore};
    use crate::domain::{ErrorCode, GroupRole, GroupStatus};

    #[tokio::test]
    async fn every_key_is_reported_with_defaults() {
        let mocks = MockStore::default().with_default_settings();
        let service = SettingsService::new(mocks.into_store(), fixture_clock());

        let settings = service
            .get_settings(&access(GroupRole::Member))
            .await
            .expect("settings");
        assert_eq!(settings.len(), SettingKey::ALL.len());
        assert!(settings.iter().all(|setting| setting.is_default));
    }

    #[tokio::test]
    async fn values_are_normalised_before_storage() {
        let mut mocks = MockStore::default();
        mocks
            .settings
            .expect_upsert()
            .withf(|setting| setting.key == SettingKey::Currency && setting.value == "UGX")
            .times(1)
            .return_once(|_| Ok(()));
        let service = SettingsService::new(mocks.into_store(), fixture_clock());

        let access = access(GroupRole::Admin);
        let updated = service
            .update_setting(&access, SettingKey::Currency, " ugx ".to_owned())
            .await
            .expect("stored");
        assert_eq!(updated.value, "UGX");
        assert_eq!(updated.updated_by, Some(*access.user_id()));
        assert!(!updated.is_default);
    }

    #[rstest]
    #[case(SettingKey::InterestRate, "101")]
    #[case(SettingKey::LoanDurationMonths, "0")]
    #[case(SettingKey::AllowMemberDeposits, "maybe")]
    #[tokio::test]
    async fn invalid_values_are_rejected(#[case] key: SettingKey, #[case] raw: &str) {
        let mut mocks = MockStore::default();
        mocks.settings.expect_upsert().never();
        let service = SettingsService::new(mocks.into_store(), fixture_clock());

        let error = service
            .update_setting(&access(GroupRole::Admin), key, raw.to_owned())
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn pending_groups_can_be_configured() {
        let mut mocks = MockStore::default();
        mocks.settings.expect_upsert().times(1).return_once(|_| Ok(()));
        let service = SettingsService::new(mocks.into_store(), fixture_clock());

        let access = access_in(&group(GroupStatus::Pending), GroupRole::Admin);
        service
            .update_setting(&access, SettingKey::MaxLoanMultiplier, "2.5".to_owned())
            .await
            .expect("configurable before approval");
    }

    #[tokio::test]
    async fn members_cannot_change_settings() {
        let service = SettingsService::new(MockStore::default().into_store(), fixture_clock());
        let error = service
            .update_setting(&access(GroupRole::Member), SettingKey::Currency, "KES".to_owned())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
