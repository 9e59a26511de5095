//! HTTP inbound adapter exposing the `/api/v1` REST endpoints.
//!
//! Handlers translate JSON bodies into validated domain values, resolve the
//! caller's [`crate::domain::GroupAccess`] and delegate to the driving ports
//! held in [`state::HttpState`].

pub(crate) mod access;
pub mod error;
pub mod groups;
pub mod health;
pub mod loans;
pub mod members;
pub mod memberships;
pub mod penalties;
pub mod repayments;
pub mod reports;
pub mod savings;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod settings;
pub mod social_fund;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

use actix_web::{error::JsonPayloadError, error::QueryPayloadError, web, HttpRequest};
use tracing::debug;

pub use error::ApiResult;

use crate::domain::Error;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON body");
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

/// Map extractor failures onto the domain error payload so malformed
/// bodies and query strings answer with the same JSON shape as every other
/// `400`.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));
}

/// Register every `/api/v1` handler on `cfg`.
///
/// The caller mounts this under the versioned scope and wraps it with the
/// session middleware.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(groups::me)
        .service(groups::list_groups)
        .service(groups::create_group)
        .service(groups::get_group)
        .service(groups::update_group)
        .service(groups::review_group)
        .service(groups::list_users)
        .service(groups::set_platform_role)
        .service(memberships::list_memberships)
        .service(memberships::add_membership)
        .service(memberships::update_membership_role)
        .service(memberships::remove_membership)
        .service(members::list_members)
        .service(members::create_member)
        .service(members::get_member)
        .service(members::update_member)
        .service(members::remove_member)
        .service(members::member_summary)
        .service(members::eligibility)
        .service(savings::list_savings)
        .service(savings::record_deposit)
        .service(savings::update_saving_status)
        .service(loans::list_loans)
        .service(loans::create_loan)
        .service(loans::get_loan)
        .service(loans::approve_loan)
        .service(loans::reject_loan)
        .service(loans::disburse_loan)
        .service(loans::complete_loan)
        .service(loans::default_loan)
        .service(repayments::list_repayments)
        .service(repayments::record_repayment)
        .service(social_fund::social_fund)
        .service(social_fund::contribute)
        .service(social_fund::request_withdrawal)
        .service(social_fund::approve_withdrawal)
        .service(social_fund::reject_withdrawal)
        .service(penalties::list_penalties)
        .service(penalties::create_penalty)
        .service(penalties::pay_penalty)
        .service(penalties::waive_penalty)
        .service(settings::get_settings)
        .service(settings::update_setting)
        .service(reports::dashboard)
        .service(reports::monthly_totals)
        .service(reports::reconciliation);
}
