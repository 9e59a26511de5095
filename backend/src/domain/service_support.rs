//! Helpers shared by the domain services.

use chrono::NaiveDate;
use mockable::Clock;

use crate::domain::ports::{MemberRepository, RepositoryError, SettingsRepository};
use crate::domain::{Error, GroupAccess, GroupPolicy, Member, MemberId};

/// Read the group's policy snapshot once for the current operation.
pub(crate) async fn load_policy(
    settings: &dyn SettingsRepository,
    access: &GroupAccess,
) -> Result<GroupPolicy, Error> {
    let stored = settings.list(access.group_id()).await?;
    Ok(GroupPolicy::from_settings(&stored))
}

/// Fetch a member of the accessed group or fail with `NotFound`.
pub(crate) async fn require_member(
    members: &dyn MemberRepository,
    access: &GroupAccess,
    member_id: &MemberId,
) -> Result<Member, Error> {
    members
        .find(access.group_id(), member_id)
        .await?
        .ok_or_else(|| not_found("member", member_id))
}

/// `NotFound` for an entity addressed by id.
pub(crate) fn not_found(entity: &str, id: &impl std::fmt::Display) -> Error {
    Error::not_found(format!("{entity} {id} not found"))
}

/// Map a failed compare-and-swap into the domain error for `entity`.
///
/// A status mismatch becomes `InvalidTransition` with the status actually
/// found as `from`; a missing row becomes `NotFound`.
pub(crate) fn transition_error(error: RepositoryError, entity: &str, to: &str) -> Error {
    match error {
        RepositoryError::StatusMismatch { actual, .. } => {
            Error::status_transition(entity, &actual, to)
        }
        RepositoryError::Missing { .. } => Error::not_found(format!("{entity} not found")),
        other => other.into(),
    }
}

/// Today's date according to the injected clock.
pub(crate) fn today(clock: &dyn Clock) -> NaiveDate {
    clock.utc().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn status_mismatch_reports_actual_as_from() {
        let error = transition_error(
            RepositoryError::status_mismatch("loan", "pending", "disbursed"),
            "loan",
            "rejected",
        );
        assert_eq!(error.code(), ErrorCode::InvalidTransition);
        let details = error.details().expect("details");
        assert_eq!(details["from"], "disbursed");
        assert_eq!(details["to"], "rejected");
        assert_eq!(details["entity"], "loan");
    }

    #[rstest]
    fn missing_row_is_not_found() {
        let error = transition_error(RepositoryError::missing("penalty"), "penalty", "paid");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn connection_failures_pass_through() {
        let error = transition_error(RepositoryError::connection("down"), "loan", "approved");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
