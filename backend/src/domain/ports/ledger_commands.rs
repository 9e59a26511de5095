//! Driving ports for the transaction ledgers and group settings.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    EffectiveSetting, Error, GroupAccess, NewPenalty, NewRepayment, NewSaving, NewSocialFundTx,
    Penalty, PenaltyFilter, PenaltyId, Repayment, RepaymentFilter, Saving, SavingFilter,
    SavingId, SavingStatus, SettingKey, SocialFundTransaction, SocialFundTxId,
};

/// Savings deposits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavingsLedger: Send + Sync {
    /// Record a deposit.
    ///
    /// Bookkeepers (`record_savings`) record completed deposits, or the
    /// status they choose. Members (`deposit_savings`) may deposit only when
    /// the group allows it, and their deposits are recorded `pending`.
    async fn record_deposit(&self, access: &GroupAccess, request: NewSaving)
    -> Result<Saving, Error>;

    /// Change a deposit's status. Requires `record_savings`.
    async fn update_saving_status(
        &self,
        access: &GroupAccess,
        saving_id: SavingId,
        status: SavingStatus,
    ) -> Result<Saving, Error>;

    /// List deposits, optionally for one member or reporting month.
    async fn list_savings(
        &self,
        access: &GroupAccess,
        filter: SavingFilter,
    ) -> Result<Vec<Saving>, Error>;
}

/// Loan repayments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepaymentLedger: Send + Sync {
    /// Record a repayment against a disbursed or repaying loan. The first
    /// repayment moves the loan to `repaying`.
    async fn record_repayment(
        &self,
        access: &GroupAccess,
        request: NewRepayment,
    ) -> Result<Repayment, Error>;

    /// List repayments.
    async fn list_repayments(
        &self,
        access: &GroupAccess,
        filter: RepaymentFilter,
    ) -> Result<Vec<Repayment>, Error>;
}

/// Social fund balance with its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialFundOverview {
    /// Group balance.
    pub balance: Decimal,
    /// Transactions, newest first.
    pub transactions: Vec<SocialFundTransaction>,
}

/// Social fund contributions and withdrawals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialFundLedger: Send + Sync {
    /// Book a completed contribution.
    async fn contribute(
        &self,
        access: &GroupAccess,
        request: NewSocialFundTx,
    ) -> Result<SocialFundTransaction, Error>;

    /// Request a withdrawal; the amount must not exceed the group balance.
    async fn request_withdrawal(
        &self,
        access: &GroupAccess,
        request: NewSocialFundTx,
    ) -> Result<SocialFundTransaction, Error>;

    /// `pending → approved`. Requires `approve_withdrawals`.
    async fn approve_withdrawal(
        &self,
        access: &GroupAccess,
        tx_id: SocialFundTxId,
    ) -> Result<SocialFundTransaction, Error>;

    /// `pending → rejected`. Requires `approve_withdrawals`.
    async fn reject_withdrawal(
        &self,
        access: &GroupAccess,
        tx_id: SocialFundTxId,
    ) -> Result<SocialFundTransaction, Error>;

    /// Balance and transactions of the group.
    async fn social_fund(&self, access: &GroupAccess) -> Result<SocialFundOverview, Error>;
}

/// Penalties.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PenaltyLedger: Send + Sync {
    /// Levy a penalty. Requires `manage_penalties`.
    async fn create_penalty(
        &self,
        access: &GroupAccess,
        request: NewPenalty,
    ) -> Result<Penalty, Error>;

    /// `unpaid → paid`, dated today.
    async fn pay_penalty(&self, access: &GroupAccess, penalty_id: PenaltyId)
    -> Result<Penalty, Error>;

    /// `unpaid → waived`.
    async fn waive_penalty(
        &self,
        access: &GroupAccess,
        penalty_id: PenaltyId,
    ) -> Result<Penalty, Error>;

    /// List penalties.
    async fn list_penalties(
        &self,
        access: &GroupAccess,
        filter: PenaltyFilter,
    ) -> Result<Vec<Penalty>, Error>;
}

/// Group policy settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Every known key with the value in force.
    async fn get_settings(&self, access: &GroupAccess) -> Result<Vec<EffectiveSetting>, Error>;

    /// Validate and store one value. Requires `manage_settings`.
    async fn update_setting(
        &self,
        access: &GroupAccess,
        key: SettingKey,
        value: String,
    ) -> Result<EffectiveSetting, Error>;
}
