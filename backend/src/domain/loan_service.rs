//! Loan lifecycle service.
//!
//! Requests are assessed against savings-based eligibility; every later
//! step is a compare-and-swap on the loan status so concurrent reviewers
//! cannot both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{LedgerStore, LoanApplication, LoanLifecycle, RepositoryError};
use crate::domain::service_support::{load_policy, not_found, require_member, today, transition_error};
use crate::domain::{
    total_repaid, total_savings, Capability, Error, GroupAccess, Loan, LoanEligibility,
    LoanFilter, LoanId, LoanStatus, LoanTerms, LoanTransition, LoanView, MemberId,
    RepaymentFilter, SavingFilter,
};

/// Implements [`LoanLifecycle`].
#[derive(Clone)]
pub struct LoanService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl LoanService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn assess(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
        multiplier: Decimal,
        principal: Option<Decimal>,
    ) -> Result<LoanEligibility, Error> {
        let savings = self
            .store
            .savings
            .list(
                access.group_id(),
                SavingFilter {
                    member_id: Some(member_id),
                    month_year: None,
                },
            )
            .await?;
        Ok(LoanEligibility::assess(
            member_id,
            total_savings(&savings),
            multiplier,
            principal,
        ))
    }

    async fn apply(
        &self,
        access: &GroupAccess,
        capability: Capability,
        loan_id: LoanId,
        transition: LoanTransition,
    ) -> Result<Loan, Error> {
        access.require_mutation(capability)?;
        let loan = self
            .store
            .loans
            .transition(access.group_id(), &loan_id, &transition)
            .await
            .map_err(|error| match error {
                RepositoryError::Missing { .. } => not_found("loan", &loan_id),
                other => transition_error(other, "loan", transition.to.as_str()),
            })?;
        info!(
            group_id = %access.group_id(),
            %loan_id,
            from = %transition.from,
            to = %transition.to,
            actor = %access.user_id(),
            "loan status changed"
        );
        Ok(loan)
    }

    async fn repaid_by_loan(
        &self,
        access: &GroupAccess,
        filter: RepaymentFilter,
    ) -> Result<HashMap<LoanId, Decimal>, Error> {
        let repayments = self.store.repayments.list(access.group_id(), filter).await?;
        let mut repaid: HashMap<LoanId, Vec<_>> = HashMap::new();
        for repayment in &repayments {
            repaid.entry(repayment.loan_id).or_default().push(repayment);
        }
        Ok(repaid
            .into_iter()
            .map(|(loan_id, rows)| (loan_id, total_repaid(rows)))
            .collect())
    }
}

#[async_trait]
impl LoanLifecycle for LoanService {
    async fn create_loan(
        &self,
        access: &GroupAccess,
        terms: LoanTerms,
    ) -> Result<LoanApplication, Error> {
        access.require_mutation(Capability::RequestLoan)?;
        let policy = load_policy(self.store.settings.as_ref(), access).await?;
        let member = require_member(self.store.members.as_ref(), access, &terms.member_id).await?;
        if !member.is_active() {
            return Err(Error::invalid_request(format!(
                "member {} is {} and cannot borrow",
                member.id, member.status
            ))
            .with_details(json!({ "code": "member_not_active", "status": member.status })));
        }

        let eligibility = self
            .assess(
                access,
                member.id,
                policy.max_loan_multiplier,
                Some(terms.principal.value()),
            )
            .await?;
        if !eligibility.eligible {
            if policy.enforce_loan_eligibility {
                return Err(Error::invalid_request(
                    "requested principal exceeds the member's eligibility",
                )
                .with_details(json!({
                    "code": "loan_not_eligible",
                    "maxEligiblePrincipal": eligibility.max_eligible_principal,
                    "requestedPrincipal": terms.principal.value(),
                })));
            }
            warn!(
                group_id = %access.group_id(),
                member_id = %member.id,
                requested = %terms.principal,
                max_eligible = %eligibility.max_eligible_principal,
                "loan requested above eligibility"
            );
        }

        let rate = terms.interest_rate.unwrap_or(policy.interest_rate);
        let duration = terms.duration_months.unwrap_or(policy.loan_duration_months);
        let loan = terms.into_pending_loan(*access.group_id(), rate, duration, self.clock.utc())?;
        self.store.loans.insert(&loan).await?;
        info!(
            group_id = %loan.group_id,
            loan_id = %loan.id,
            member_id = %loan.member_id,
            total = %loan.total_amount,
            "loan requested"
        );
        Ok(LoanApplication { loan, eligibility })
    }

    async fn approve_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error> {
        let transition = LoanTransition::approve(*access.user_id(), self.clock.utc());
        self.apply(access, Capability::ApproveLoans, loan_id, transition)
            .await
    }

    async fn reject_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error> {
        self.apply(access, Capability::ApproveLoans, loan_id, LoanTransition::reject())
            .await
    }

    async fn disburse_loan(
        &self,
        access: &GroupAccess,
        loan_id: LoanId,
        date: Option<NaiveDate>,
    ) -> Result<Loan, Error> {
        let date = date.unwrap_or_else(|| today(self.clock.as_ref()));
        self.apply(
            access,
            Capability::DisburseLoans,
            loan_id,
            LoanTransition::disburse(date),
        )
        .await
    }

    async fn complete_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error> {
        self.apply(access, Capability::ManageLoans, loan_id, LoanTransition::complete())
            .await
    }

    async fn default_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error> {
        self.apply(
            access,
            Capability::ManageLoans,
            loan_id,
            LoanTransition::default_loan(),
        )
        .await
    }

    async fn get_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<LoanView, Error> {
        let loan = self
            .store
            .loans
            .find(access.group_id(), &loan_id)
            .await?
            .ok_or_else(|| not_found("loan", &loan_id))?;
        let repayments = self
            .store
            .repayments
            .list(
                access.group_id(),
                RepaymentFilter {
                    loan_id: Some(loan_id),
                    member_id: None,
                },
            )
            .await?;
        Ok(LoanView::new(loan, total_repaid(&repayments)))
    }

    async fn list_loans(
        &self,
        access: &GroupAccess,
        filter: LoanFilter,
    ) -> Result<Vec<LoanView>, Error> {
        let loans = self.store.loans.list(access.group_id(), filter).await?;
        let repaid = self
            .repaid_by_loan(
                access,
                RepaymentFilter {
                    loan_id: None,
                    member_id: filter.member_id,
                },
            )
            .await?;
        Ok(loans
            .into_iter()
            .map(|loan| {
                let sum = repaid.get(&loan.id).copied().unwrap_or_default();
                LoanView::new(loan, sum)
            })
            .collect())
    }

    async fn eligibility(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
        principal: Option<Decimal>,
    ) -> Result<LoanEligibility, Error> {
        require_member(self.store.members.as_ref(), access, &member_id).await?;
        let policy = load_policy(self.store.settings.as_ref(), access).await?;
        self.assess(access, member_id, policy.max_loan_multiplier, principal)
            .await
    }

    async fn complete_fully_repaid(&self, access: &GroupAccess) -> Result<Vec<Loan>, Error> {
        access.require_mutation(Capability::ManageLoans)?;
        let repaying = self
            .store
            .loans
            .list(
                access.group_id(),
                LoanFilter {
                    member_id: None,
                    status: Some(LoanStatus::Repaying),
                },
            )
            .await?;
        let repaid = self
            .repaid_by_loan(access, RepaymentFilter::default())
            .await?;

        let mut completed = Vec::new();
        for loan in repaying {
            let sum = repaid.get(&loan.id).copied().unwrap_or_default();
            if sum < loan.total_amount {
                continue;
            }
            match self
                .store
                .loans
                .transition(access.group_id(), &loan.id, &LoanTransition::complete())
                .await
            {
                Ok(done) => completed.push(done),
                Err(RepositoryError::StatusMismatch { actual, .. }) => {
                    debug!(loan_id = %loan.id, %actual, "loan moved on before completion");
                }
                Err(other) => return Err(other.into()),
            }
        }
        info!(
            group_id = %access.group_id(),
            completed = completed.len(),
            "fully repaid loans completed"
        );
        Ok(completed)
    }
}

#[cfg(test)]
#[path = "loan_service_tests.rs"]
mod tests;
