//! Social fund ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{LedgerStore, RepositoryError, SocialFundLedger, SocialFundOverview};
use crate::domain::service_support::{not_found, require_member, transition_error};
use crate::domain::{
    social_fund_balance, Capability, Error, GroupAccess, NewSocialFundTx, SocialFundTransaction,
    SocialFundTransition, SocialFundTxId,
};

/// Implements [`SocialFundLedger`].
#[derive(Clone)]
pub struct SocialFundService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl SocialFundService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn balance(&self, access: &GroupAccess) -> Result<rust_decimal::Decimal, Error> {
        let transactions = self.store.social_fund.list(access.group_id(), None).await?;
        Ok(social_fund_balance(&transactions))
    }

    async fn review(
        &self,
        access: &GroupAccess,
        tx_id: SocialFundTxId,
        transition: SocialFundTransition,
    ) -> Result<SocialFundTransaction, Error> {
        access.require_mutation(Capability::ApproveWithdrawals)?;
        let tx = self
            .store
            .social_fund
            .transition(access.group_id(), &tx_id, &transition)
            .await
            .map_err(|error| match error {
                RepositoryError::Missing { .. } => not_found("social fund transaction", &tx_id),
                other => transition_error(other, "social_fund_transaction", transition.to.as_str()),
            })?;
        info!(
            group_id = %access.group_id(),
            %tx_id,
            status = %tx.status,
            reviewer = %access.user_id(),
            "withdrawal reviewed"
        );
        Ok(tx)
    }
}

#[async_trait]
impl SocialFundLedger for SocialFundService {
    async fn contribute(
        &self,
        access: &GroupAccess,
        request: NewSocialFundTx,
    ) -> Result<SocialFundTransaction, Error> {
        access.require_mutation(Capability::ContributeSocialFund)?;
        require_member(self.store.members.as_ref(), access, &request.member_id).await?;
        let tx = request.into_contribution(*access.group_id(), self.clock.utc());
        self.store.social_fund.insert(&tx).await?;
        info!(group_id = %tx.group_id, tx_id = %tx.id, amount = %tx.amount, "contribution booked");
        Ok(tx)
    }

    async fn request_withdrawal(
        &self,
        access: &GroupAccess,
        request: NewSocialFundTx,
    ) -> Result<SocialFundTransaction, Error> {
        access.require_mutation(Capability::RequestWithdrawal)?;
        require_member(self.store.members.as_ref(), access, &request.member_id).await?;
        let balance = self.balance(access).await?;
        if request.amount.value() > balance {
            return Err(Error::invalid_request("withdrawal exceeds the social fund balance")
                .with_details(json!({
                    "code": "insufficient_social_fund",
                    "balance": balance,
                    "requested": request.amount.value(),
                })));
        }
        let tx = request.into_withdrawal(*access.group_id(), self.clock.utc());
        self.store.social_fund.insert(&tx).await?;
        info!(group_id = %tx.group_id, tx_id = %tx.id, amount = %tx.amount, "withdrawal requested");
        Ok(tx)
    }

    async fn approve_withdrawal(
        &self,
        access: &GroupAccess,
        tx_id: SocialFundTxId,
    ) -> Result<SocialFundTransaction, Error> {
        let tx = self
            .review(access, tx_id, SocialFundTransition::approve(*access.user_id()))
            .await?;
        let balance = self.balance(access).await?;
        if balance.is_sign_negative() {
            warn!(group_id = %access.group_id(), %balance, "social fund overdrawn");
        }
        Ok(tx)
    }

    async fn reject_withdrawal(
        &self,
        access: &GroupAccess,
        tx_id: SocialFundTxId,
    ) -> Result<SocialFundTransaction, Error> {
        self.review(access, tx_id, SocialFundTransition::reject(*access.user_id()))
            .await
    }

    async fn social_fund(&self, access: &GroupAccess) -> Result<SocialFundOverview, Error> {
        let transactions = self.store.social_fund.list(access.group_id(), None).await?;
        Ok(SocialFundOverview {
            balance: social_fund_balance(&transactions),
            transactions,
        })
    }
}

#[cfg(test)]
#[path = "social_fund_service_tests.rs"]
mod tests;
