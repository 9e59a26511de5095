//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by the integration tests.
//! All tables sit behind one `std::sync::Mutex`, so each port call is
//! atomic with respect to every other call; status changes follow the same
//! compare-and-swap contract as the PostgreSQL adapter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    GroupRepository, LedgerStore, LoanRepository, MemberRepository, MembershipRepository,
    PenaltyRepository, ProfileRepository, RepaymentRepository, RepositoryError,
    SavingsRepository, SettingsRepository, SocialFundRepository,
};
use crate::domain::{
    Group, GroupId, GroupProfile, GroupReview, GroupRole, GroupStatus, Loan, LoanFilter, LoanId,
    LoanTransition, Member, MemberId, Membership, Penalty, PenaltyFilter, PenaltyId,
    PenaltyTransition, PlatformRole, Repayment, RepaymentFilter, Saving, SavingFilter, SavingId,
    SavingStatus, Setting, SettingKey, SocialFundTransaction, SocialFundTransition,
    SocialFundTxId, SocialFundTxType, UserId, UserProfile,
};

#[derive(Default)]
struct Tables {
    groups: Vec<Group>,
    memberships: Vec<Membership>,
    profiles: HashMap<UserId, PlatformRole>,
    members: Vec<Member>,
    savings: Vec<Saving>,
    loans: Vec<Loan>,
    repayments: Vec<Repayment>,
    social_fund: Vec<SocialFundTransaction>,
    penalties: Vec<Penalty>,
    settings: HashMap<(GroupId, SettingKey), Setting>,
}

/// Shared in-memory tables. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as every port of a [`LedgerStore`].
    #[must_use]
    pub fn ledger_store(&self) -> LedgerStore {
        let shared = Arc::new(self.clone());
        LedgerStore {
            groups: shared.clone(),
            memberships: shared.clone(),
            profiles: shared.clone(),
            members: shared.clone(),
            savings: shared.clone(),
            loans: shared.clone(),
            repayments: shared.clone(),
            social_fund: shared.clone(),
            penalties: shared.clone(),
            settings: shared,
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::connection("memory store lock poisoned"))
    }
}

/// Newest rows first, matching the SQL adapters' `ORDER BY created_at DESC`.
fn newest_first<T: Clone>(
    rows: &[T],
    keep: impl Fn(&T) -> bool,
    created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    let mut selected: Vec<T> = rows.iter().filter(|row| keep(row)).cloned().collect();
    selected.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    selected
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: &Group, founder: &Membership) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.groups.iter().any(|row| row.id == group.id) {
            return Err(RepositoryError::duplicate(format!("group {}", group.id)));
        }
        tables.groups.push(group.clone());
        tables.memberships.push(founder.clone());
        Ok(())
    }

    async fn find(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.groups.iter().find(|row| row.id == *id).cloned())
    }

    async fn list(&self, status: Option<GroupStatus>) -> Result<Vec<Group>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.groups,
            |row| status.is_none_or(|wanted| row.status == wanted),
            |row| row.created_at,
        ))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Group>, RepositoryError> {
        let tables = self.tables()?;
        let joined: Vec<GroupId> = tables
            .memberships
            .iter()
            .filter(|row| row.user_id == *user_id)
            .map(|row| row.group_id)
            .collect();
        Ok(newest_first(
            &tables.groups,
            |row| joined.contains(&row.id),
            |row| row.created_at,
        ))
    }

    async fn update_profile(
        &self,
        id: &GroupId,
        profile: &GroupProfile,
    ) -> Result<Group, RepositoryError> {
        let mut tables = self.tables()?;
        let group = tables
            .groups
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| RepositoryError::missing("group"))?;
        group.name = profile.name().to_owned();
        group.description = profile.description().map(str::to_owned);
        group.location = profile.location().map(str::to_owned);
        Ok(group.clone())
    }

    async fn review(
        &self,
        id: &GroupId,
        expected: GroupStatus,
        review: &GroupReview,
    ) -> Result<Group, RepositoryError> {
        let mut tables = self.tables()?;
        let group = tables
            .groups
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| RepositoryError::missing("group"))?;
        if group.status != expected {
            return Err(RepositoryError::status_mismatch(
                "group",
                expected.as_str(),
                group.status.as_str(),
            ));
        }
        group.status = review.status;
        group.reviewed_by = Some(review.reviewed_by);
        group.reviewed_at = Some(review.reviewed_at);
        group.admin_notes = review.admin_notes.clone();
        Ok(group.clone())
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .memberships
            .iter()
            .find(|row| row.group_id == *group_id && row.user_id == *user_id)
            .cloned())
    }

    async fn list(&self, group_id: &GroupId) -> Result<Vec<Membership>, RepositoryError> {
        let tables = self.tables()?;
        let mut rows: Vec<Membership> = tables
            .memberships
            .iter()
            .filter(|row| row.group_id == *group_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn insert(&self, membership: &Membership) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .memberships
            .iter()
            .any(|row| row.group_id == membership.group_id && row.user_id == membership.user_id)
        {
            return Err(RepositoryError::duplicate(format!(
                "user {} already belongs to group {}",
                membership.user_id, membership.group_id
            )));
        }
        tables.memberships.push(membership.clone());
        Ok(())
    }

    async fn update_role(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        role: GroupRole,
    ) -> Result<Membership, RepositoryError> {
        let mut tables = self.tables()?;
        let membership = tables
            .memberships
            .iter_mut()
            .find(|row| row.group_id == *group_id && row.user_id == *user_id)
            .ok_or_else(|| RepositoryError::missing("membership"))?;
        membership.role = role;
        Ok(membership.clone())
    }

    async fn delete(&self, group_id: &GroupId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|row| !(row.group_id == *group_id && row.user_id == *user_id));
        if tables.memberships.len() == before {
            return Err(RepositoryError::missing("membership"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn platform_role(&self, user_id: &UserId) -> Result<PlatformRole, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .get(user_id)
            .copied()
            .unwrap_or(PlatformRole::User))
    }

    async fn set_platform_role(
        &self,
        user_id: &UserId,
        role: PlatformRole,
    ) -> Result<(), RepositoryError> {
        self.tables()?.profiles.insert(*user_id, role);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let tables = self.tables()?;
        let mut profiles: Vec<UserProfile> = tables
            .profiles
            .iter()
            .map(|(user_id, platform_role)| UserProfile {
                user_id: *user_id,
                platform_role: *platform_role,
            })
            .collect();
        profiles.sort_by_key(|profile| *profile.user_id.as_uuid());
        Ok(profiles)
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError> {
        self.tables()?.members.push(member.clone());
        Ok(())
    }

    async fn find(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<Option<Member>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .members
            .iter()
            .find(|row| row.group_id == *group_id && row.id == *member_id)
            .cloned())
    }

    async fn list(&self, group_id: &GroupId) -> Result<Vec<Member>, RepositoryError> {
        let tables = self.tables()?;
        let mut rows: Vec<Member> = tables
            .members
            .iter()
            .filter(|row| row.group_id == *group_id)
            .cloned()
            .collect();
        rows.sort_by(|left, right| left.full_name.cmp(&right.full_name));
        Ok(rows)
    }

    async fn update(&self, member: &Member) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let row = tables
            .members
            .iter_mut()
            .find(|row| row.group_id == member.group_id && row.id == member.id)
            .ok_or_else(|| RepositoryError::missing("member"))?;
        row.full_name.clone_from(&member.full_name);
        row.phone.clone_from(&member.phone);
        row.email.clone_from(&member.email);
        row.national_id.clone_from(&member.national_id);
        row.address.clone_from(&member.address);
        row.status = member.status;
        Ok(())
    }

    async fn delete(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.members.len();
        tables
            .members
            .retain(|row| !(row.group_id == *group_id && row.id == *member_id));
        if tables.members.len() == before {
            return Err(RepositoryError::missing("member"));
        }
        Ok(())
    }
}

#[async_trait]
impl SavingsRepository for MemoryStore {
    async fn insert(&self, saving: &Saving) -> Result<(), RepositoryError> {
        self.tables()?.savings.push(saving.clone());
        Ok(())
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &SavingId,
    ) -> Result<Option<Saving>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .savings
            .iter()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: SavingFilter,
    ) -> Result<Vec<Saving>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.savings,
            |row| row.group_id == *group_id && filter.matches(row),
            |row| row.created_at,
        ))
    }

    async fn update_status(
        &self,
        group_id: &GroupId,
        id: &SavingId,
        status: SavingStatus,
    ) -> Result<Saving, RepositoryError> {
        let mut tables = self.tables()?;
        let saving = tables
            .savings
            .iter_mut()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .ok_or_else(|| RepositoryError::missing("saving"))?;
        saving.status = status;
        Ok(saving.clone())
    }
}

#[async_trait]
impl LoanRepository for MemoryStore {
    async fn insert(&self, loan: &Loan) -> Result<(), RepositoryError> {
        self.tables()?.loans.push(loan.clone());
        Ok(())
    }

    async fn find(&self, group_id: &GroupId, id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .loans
            .iter()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: LoanFilter,
    ) -> Result<Vec<Loan>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.loans,
            |row| row.group_id == *group_id && filter.matches(row),
            |row| row.created_at,
        ))
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &LoanId,
        transition: &LoanTransition,
    ) -> Result<Loan, RepositoryError> {
        let mut tables = self.tables()?;
        let loan = tables
            .loans
            .iter_mut()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .ok_or_else(|| RepositoryError::missing("loan"))?;
        let mismatch = RepositoryError::status_mismatch(
            "loan",
            transition.from.as_str(),
            loan.status.as_str(),
        );
        if loan.status != transition.from {
            return Err(mismatch);
        }
        transition.apply(loan).map_err(|_| mismatch)?;
        Ok(loan.clone())
    }
}

#[async_trait]
impl RepaymentRepository for MemoryStore {
    async fn insert(&self, repayment: &Repayment) -> Result<(), RepositoryError> {
        self.tables()?.repayments.push(repayment.clone());
        Ok(())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: RepaymentFilter,
    ) -> Result<Vec<Repayment>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.repayments,
            |row| row.group_id == *group_id && filter.matches(row),
            |row| row.created_at,
        ))
    }
}

#[async_trait]
impl SocialFundRepository for MemoryStore {
    async fn insert(&self, tx: &SocialFundTransaction) -> Result<(), RepositoryError> {
        self.tables()?.social_fund.push(tx.clone());
        Ok(())
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
    ) -> Result<Option<SocialFundTransaction>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .social_fund
            .iter()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        member_id: Option<MemberId>,
    ) -> Result<Vec<SocialFundTransaction>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.social_fund,
            |row| row.group_id == *group_id && member_id.is_none_or(|id| row.member_id == id),
            |row| row.created_at,
        ))
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
        transition: &SocialFundTransition,
    ) -> Result<SocialFundTransaction, RepositoryError> {
        let mut tables = self.tables()?;
        // Contributions are never reviewable, so they are invisible here.
        let tx = tables
            .social_fund
            .iter_mut()
            .find(|row| {
                row.group_id == *group_id
                    && row.id == *id
                    && row.transaction_type == SocialFundTxType::Withdrawal
            })
            .ok_or_else(|| RepositoryError::missing("withdrawal"))?;
        if tx.status != transition.from {
            return Err(RepositoryError::status_mismatch(
                "social_fund_transaction",
                transition.from.as_str(),
                tx.status.as_str(),
            ));
        }
        tx.status = transition.to;
        tx.approved_by = Some(transition.approved_by);
        Ok(tx.clone())
    }
}

#[async_trait]
impl PenaltyRepository for MemoryStore {
    async fn insert(&self, penalty: &Penalty) -> Result<(), RepositoryError> {
        self.tables()?.penalties.push(penalty.clone());
        Ok(())
    }

    async fn find(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
    ) -> Result<Option<Penalty>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .penalties
            .iter()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: PenaltyFilter,
    ) -> Result<Vec<Penalty>, RepositoryError> {
        let tables = self.tables()?;
        Ok(newest_first(
            &tables.penalties,
            |row| row.group_id == *group_id && filter.matches(row),
            |row| row.created_at,
        ))
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
        transition: &PenaltyTransition,
    ) -> Result<Penalty, RepositoryError> {
        let mut tables = self.tables()?;
        let penalty = tables
            .penalties
            .iter_mut()
            .find(|row| row.group_id == *group_id && row.id == *id)
            .ok_or_else(|| RepositoryError::missing("penalty"))?;
        if penalty.status != PenaltyTransition::FROM {
            return Err(RepositoryError::status_mismatch(
                "penalty",
                PenaltyTransition::FROM.as_str(),
                penalty.status.as_str(),
            ));
        }
        penalty.status = transition.to;
        penalty.paid_date = transition.paid_date;
        Ok(penalty.clone())
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Setting>, RepositoryError> {
        let tables = self.tables()?;
        let mut rows: Vec<Setting> = tables
            .settings
            .values()
            .filter(|row| row.group_id == *group_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.key.as_str());
        Ok(rows)
    }

    async fn upsert(&self, setting: &Setting) -> Result<(), RepositoryError> {
        self.tables()?
            .settings
            .insert((setting.group_id, setting.key), setting.clone());
        Ok(())
    }
}
