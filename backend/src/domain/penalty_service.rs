//! Penalty ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{LedgerStore, PenaltyLedger, RepositoryError};
use crate::domain::service_support::{load_policy, not_found, require_member, today, transition_error};
use crate::domain::{
    percent_of, Amount, Capability, Error, GroupAccess, NewPenalty, Penalty, PenaltyFilter,
    PenaltyId, PenaltyTransition, PenaltyType,
};

/// Implements [`PenaltyLedger`].
#[derive(Clone)]
pub struct PenaltyService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl PenaltyService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Amount to levy: the explicit one, or the policy default for the type.
    async fn resolve_amount(
        &self,
        access: &GroupAccess,
        request: &NewPenalty,
        loan_total: Option<Decimal>,
    ) -> Result<Amount, Error> {
        if let Some(amount) = request.amount {
            return Ok(amount);
        }
        let policy = load_policy(self.store.settings.as_ref(), access).await?;
        let default = match (request.penalty_type, loan_total) {
            (PenaltyType::LateDeposit, _) => policy.late_deposit_penalty,
            (PenaltyType::LateRepayment, Some(total)) => {
                percent_of(total, policy.late_repayment_penalty_percent)
                    .map_err(|err| Error::invalid_request(err.to_string()))?
            }
            (penalty_type, _) => {
                return Err(Error::invalid_request(format!(
                    "amount is required for {penalty_type} penalties"
                ))
                .with_details(json!({ "field": "amount" })));
            }
        };
        Amount::new(default).map_err(|_| {
            Error::invalid_request("group policy yields no default amount for this penalty")
                .with_details(json!({ "field": "amount", "policyAmount": default }))
        })
    }

    async fn apply(
        &self,
        access: &GroupAccess,
        penalty_id: PenaltyId,
        transition: PenaltyTransition,
    ) -> Result<Penalty, Error> {
        access.require_mutation(Capability::ManagePenalties)?;
        let penalty = self
            .store
            .penalties
            .transition(access.group_id(), &penalty_id, &transition)
            .await
            .map_err(|error| match error {
                RepositoryError::Missing { .. } => not_found("penalty", &penalty_id),
                other => transition_error(other, "penalty", transition.to.as_str()),
            })?;
        info!(group_id = %access.group_id(), %penalty_id, status = %penalty.status, "penalty settled");
        Ok(penalty)
    }
}

#[async_trait]
impl PenaltyLedger for PenaltyService {
    async fn create_penalty(
        &self,
        access: &GroupAccess,
        request: NewPenalty,
    ) -> Result<Penalty, Error> {
        access.require_mutation(Capability::ManagePenalties)?;
        request.validate()?;
        require_member(self.store.members.as_ref(), access, &request.member_id).await?;

        let loan_total = match request.loan_id {
            Some(loan_id) => {
                let loan = self
                    .store
                    .loans
                    .find(access.group_id(), &loan_id)
                    .await?
                    .ok_or_else(|| not_found("loan", &loan_id))?;
                if loan.member_id != request.member_id {
                    return Err(Error::invalid_request("loan belongs to a different member")
                        .with_details(json!({ "field": "loanId" })));
                }
                Some(loan.total_amount)
            }
            None => None,
        };

        let amount = self.resolve_amount(access, &request, loan_total).await?;
        let penalty = request.into_penalty(*access.group_id(), amount, self.clock.utc());
        self.store.penalties.insert(&penalty).await?;
        info!(
            group_id = %penalty.group_id,
            penalty_id = %penalty.id,
            member_id = %penalty.member_id,
            penalty_type = %penalty.penalty_type,
            amount = %penalty.amount,
            "penalty levied"
        );
        Ok(penalty)
    }

    async fn pay_penalty(
        &self,
        access: &GroupAccess,
        penalty_id: PenaltyId,
    ) -> Result<Penalty, Error> {
        let paid_on = today(self.clock.as_ref());
        self.apply(access, penalty_id, PenaltyTransition::pay(paid_on))
            .await
    }

    async fn waive_penalty(
        &self,
        access: &GroupAccess,
        penalty_id: PenaltyId,
    ) -> Result<Penalty, Error> {
        self.apply(access, penalty_id, PenaltyTransition::waive())
            .await
    }

    async fn list_penalties(
        &self,
        access: &GroupAccess,
        filter: PenaltyFilter,
    ) -> Result<Vec<Penalty>, Error> {
        Ok(self.store.penalties.list(access.group_id(), filter).await?)
    }
}

#[cfg(test)]
#[path = "penalty_service_tests.rs"]
mod tests;
