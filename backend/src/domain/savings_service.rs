//! Savings ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{LedgerStore, RepositoryError, SavingsLedger};
use crate::domain::service_support::{load_policy, not_found, require_member};
use crate::domain::{
    Capability, Error, GroupAccess, NewSaving, Saving, SavingFilter, SavingId, SavingStatus,
};

/// Implements [`SavingsLedger`].
#[derive(Clone)]
pub struct SavingsService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl SavingsService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Resolve the status a deposit is booked with for this caller.
    async fn deposit_status(
        &self,
        access: &GroupAccess,
        requested: Option<SavingStatus>,
    ) -> Result<SavingStatus, Error> {
        if access.has(Capability::RecordSavings) {
            return Ok(requested.unwrap_or(SavingStatus::Completed));
        }
        access.require(Capability::DepositSavings)?;
        let policy = load_policy(self.store.settings.as_ref(), access).await?;
        if !policy.allow_member_deposits {
            return Err(
                Error::forbidden("member deposits are disabled for this group")
                    .with_details(json!({ "code": "member_deposits_disabled" })),
            );
        }
        Ok(SavingStatus::Pending)
    }
}

#[async_trait]
impl SavingsLedger for SavingsService {
    async fn record_deposit(
        &self,
        access: &GroupAccess,
        request: NewSaving,
    ) -> Result<Saving, Error> {
        let status = self.deposit_status(access, request.status).await?;
        access.require_active()?;
        require_member(self.store.members.as_ref(), access, &request.member_id).await?;
        let saving = request.into_saving(
            *access.group_id(),
            status,
            *access.user_id(),
            self.clock.utc(),
        );
        self.store.savings.insert(&saving).await?;
        info!(
            group_id = %saving.group_id,
            saving_id = %saving.id,
            member_id = %saving.member_id,
            amount = %saving.amount,
            status = %saving.status,
            "deposit recorded"
        );
        Ok(saving)
    }

    async fn update_saving_status(
        &self,
        access: &GroupAccess,
        saving_id: SavingId,
        status: SavingStatus,
    ) -> Result<Saving, Error> {
        access.require_mutation(Capability::RecordSavings)?;
        let saving = self
            .store
            .savings
            .update_status(access.group_id(), &saving_id, status)
            .await
            .map_err(|error| match error {
                RepositoryError::Missing { .. } => not_found("saving", &saving_id),
                other => other.into(),
            })?;
        info!(group_id = %saving.group_id, %saving_id, %status, "deposit status changed");
        Ok(saving)
    }

    async fn list_savings(
        &self,
        access: &GroupAccess,
        filter: SavingFilter,
    ) -> Result<Vec<Saving>, Error> {
        Ok(self.store.savings.list(access.group_id(), filter).await?)
    }
}
