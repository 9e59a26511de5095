//! Strongly typed identifiers.
//!
//! Every entity is keyed by a UUID, wrapped in a dedicated newtype so a loan id
//! can never be passed where a member id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Raised when text is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must be a valid UUID: {value}")]
pub struct IdParseError {
    /// Name of the identifier being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Borrow the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| IdParseError {
                        kind: $kind,
                        value: value.to_owned(),
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Platform user identity, issued by the external authentication provider.
    UserId,
    "userId"
);
define_id!(
    /// Village bank group (tenant) identifier.
    GroupId,
    "groupId"
);
define_id!(
    /// Member (financial subject) identifier.
    MemberId,
    "memberId"
);
define_id!(
    /// Savings deposit identifier.
    SavingId,
    "savingId"
);
define_id!(
    /// Loan identifier.
    LoanId,
    "loanId"
);
define_id!(
    /// Repayment identifier.
    RepaymentId,
    "repaymentId"
);
define_id!(
    /// Social fund transaction identifier.
    SocialFundTxId,
    "transactionId"
);
define_id!(
    /// Penalty identifier.
    PenaltyId,
    "penaltyId"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_and_displays_uuid() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: LoanId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    fn parse_error_names_the_identifier() {
        let err = "not-a-uuid".parse::<MemberId>().expect_err("invalid");
        assert_eq!(err.kind, "memberId");
        assert!(err.to_string().contains("memberId must be a valid UUID"));
    }

    #[rstest]
    fn serialises_transparently() {
        let id = GroupId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
