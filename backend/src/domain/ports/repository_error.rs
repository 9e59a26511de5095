//! Error shared by every driven repository port.

use serde_json::json;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// Store unreachable or pool exhausted; safe to retry.
        Connection { message: String } =>
            "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "repository query failed: {message}",
        /// The addressed row does not exist in the group.
        Missing { entity: String } =>
            "{entity} not found",
        /// A compare-and-swap found the row in a different status.
        StatusMismatch { entity: String, expected: String, actual: String } =>
            "{entity} status is {actual}, expected {expected}",
        /// A uniqueness constraint was violated.
        Duplicate { message: String } =>
            "duplicate record: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => Self::service_unavailable(message),
            RepositoryError::Query { message } => Self::internal(message),
            RepositoryError::Missing { entity } => {
                Self::not_found(format!("{entity} not found")).with_details(json!({
                    "entity": entity,
                }))
            }
            RepositoryError::StatusMismatch {
                entity,
                expected,
                actual,
            } => Self::invalid_transition(format!(
                "{entity} is {actual}, expected {expected}"
            ))
            .with_details(json!({
                "entity": entity,
                "expected": expected,
                "actual": actual,
            })),
            RepositoryError::Duplicate { message } => Self::conflict(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(RepositoryError::missing("loan"), ErrorCode::NotFound)]
    #[case(
        RepositoryError::status_mismatch("loan", "pending", "approved"),
        ErrorCode::InvalidTransition
    )]
    #[case(RepositoryError::duplicate("membership"), ErrorCode::Conflict)]
    fn maps_to_domain_codes(#[case] error: RepositoryError, #[case] code: ErrorCode) {
        assert_eq!(Error::from(error).code(), code);
    }

    #[rstest]
    fn status_mismatch_formats_both_statuses() {
        let error = RepositoryError::status_mismatch("penalty", "unpaid", "waived");
        assert_eq!(error.to_string(), "penalty status is waived, expected unpaid");
    }
}
