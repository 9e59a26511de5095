//! Member register service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{LedgerStore, MemberDirectory};
use crate::domain::service_support::{require_member, today};
use crate::domain::{
    Capability, Error, GroupAccess, LoanFilter, Member, MemberDetails, MemberId, MemberStatus,
    MemberUpdate, PenaltyFilter, RepaymentFilter, SavingFilter,
};

/// Implements [`MemberDirectory`].
#[derive(Clone)]
pub struct MemberService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl MemberService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn has_ledger_history(&self, access: &GroupAccess, member_id: MemberId) -> Result<bool, Error> {
        let group_id = access.group_id();
        let member = Some(member_id);
        let savings = SavingFilter {
            member_id: member,
            month_year: None,
        };
        Ok(!self.store.savings.list(group_id, savings).await?.is_empty()
            || !self
                .store
                .loans
                .list(group_id, LoanFilter { member_id: member, status: None })
                .await?
                .is_empty()
            || !self
                .store
                .repayments
                .list(group_id, RepaymentFilter { loan_id: None, member_id: member })
                .await?
                .is_empty()
            || !self.store.social_fund.list(group_id, member).await?.is_empty()
            || !self
                .store
                .penalties
                .list(group_id, PenaltyFilter { member_id: member, status: None })
                .await?
                .is_empty())
    }
}

#[async_trait]
impl MemberDirectory for MemberService {
    async fn create_member(
        &self,
        access: &GroupAccess,
        details: MemberDetails,
        join_date: Option<NaiveDate>,
    ) -> Result<Member, Error> {
        access.require(Capability::ManageMembers)?;
        let member = details.into_member(
            *access.group_id(),
            MemberStatus::Active,
            join_date.unwrap_or_else(|| today(self.clock.as_ref())),
            self.clock.utc(),
        );
        self.store.members.insert(&member).await?;
        info!(group_id = %member.group_id, member_id = %member.id, "member registered");
        Ok(member)
    }

    async fn get_member(&self, access: &GroupAccess, member_id: MemberId) -> Result<Member, Error> {
        require_member(self.store.members.as_ref(), access, &member_id).await
    }

    async fn list_members(&self, access: &GroupAccess) -> Result<Vec<Member>, Error> {
        Ok(self.store.members.list(access.group_id()).await?)
    }

    async fn update_member(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, Error> {
        access.require(Capability::ManageMembers)?;
        let mut member = require_member(self.store.members.as_ref(), access, &member_id).await?;
        update.apply_to(&mut member);
        self.store.members.update(&member).await?;
        info!(group_id = %member.group_id, %member_id, status = %member.status, "member updated");
        Ok(member)
    }

    async fn remove_member(&self, access: &GroupAccess, member_id: MemberId) -> Result<(), Error> {
        access.require(Capability::ManageMembers)?;
        require_member(self.store.members.as_ref(), access, &member_id).await?;
        if self.has_ledger_history(access, member_id).await? {
            return Err(Error::conflict(
                "member has ledger history; set the status to inactive instead",
            )
            .with_details(json!({
                "code": "member_has_history",
                "memberId": member_id.to_string(),
            })));
        }
        self.store
            .members
            .delete(access.group_id(), &member_id)
            .await?;
        info!(group_id = %access.group_id(), %member_id, "member removed");
        Ok(())
    }
}
