//! Operator job: reconcile group ledgers and optionally complete loans that
//! are fully repaid.
//!
//! Prints one JSON document holding a report per group.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use village_bank::domain::ports::{LedgerReports, LedgerStore, LoanLifecycle};
use village_bank::domain::{
    Actor, Error, GroupAccess, GroupId, GroupStatus, LedgerService, Loan, LoanService,
    PlatformRole, ReconciliationReport, UserId,
};
use village_bank::outbound::persistence::{ledger_store, DbPool, PoolConfig};

/// Reconcile village bank ledgers.
#[derive(Debug, Parser)]
#[command(name = "reconcile", version, about)]
struct Args {
    /// PostgreSQL connection URL.
    #[arg(long)]
    database_url: String,
    /// Group to check; repeat for several. Defaults to every active group.
    #[arg(long = "group")]
    groups: Vec<GroupId>,
    /// Move fully repaid loans to `completed`.
    #[arg(long)]
    complete_repaid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupOutcome {
    report: ReconciliationReport,
    completed_loans: Vec<Loan>,
}

/// Reconcile `groups` (or every active group) in `store`.
async fn reconcile(
    store: LedgerStore,
    clock: Arc<dyn Clock>,
    groups: &[GroupId],
    complete_repaid: bool,
) -> Result<Vec<GroupOutcome>, Error> {
    let targets = if groups.is_empty() {
        store.groups.list(Some(GroupStatus::Active)).await?
    } else {
        let mut found = Vec::with_capacity(groups.len());
        for group_id in groups {
            match store.groups.find(group_id).await? {
                Some(group) => found.push(group),
                None => warn!(%group_id, "group not found; skipping"),
            }
        }
        found
    };

    let operator = Actor::new(UserId::random(), PlatformRole::SuperAdmin);
    let reports = LedgerService::new(store.clone(), clock.clone());
    let loans = LoanService::new(store, clock);
    let mut outcomes = Vec::with_capacity(targets.len());
    for group in &targets {
        let access = GroupAccess::operator(operator.clone(), group);
        let completed_loans = if complete_repaid {
            loans.complete_fully_repaid(&access).await?
        } else {
            Vec::new()
        };
        let report = reports.reconciliation(&access).await?;
        info!(
            group_id = %group.id,
            findings = report.findings.len(),
            completed = completed_loans.len(),
            "group reconciled"
        );
        outcomes.push(GroupOutcome {
            report,
            completed_loans,
        });
    }
    Ok(outcomes)
}

async fn run(args: Args) -> Result<String, String> {
    let pool = DbPool::new(PoolConfig::new(args.database_url))
        .await
        .map_err(|error| format!("database pool: {error}"))?;
    let outcomes = reconcile(
        ledger_store(pool),
        Arc::new(DefaultClock),
        &args.groups,
        args.complete_repaid,
    )
    .await
    .map_err(|error| format!("reconciliation failed: {}", error.message()))?;
    serde_json::to_string_pretty(&outcomes).map_err(|error| format!("encode report: {error}"))
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(run(args)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
