//! Import job that coordinates the statement source, the engine and the ledger

use chrono::{DateTime, Utc};

use crate::config::Configuration;
use crate::reconciliation::{ReconciliationEngine, ReconciliationReport};
use crate::traits::*;
use crate::types::*;
use crate::utils::dates::window_start;

/// Result of one import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub report: ReconciliationReport,
    /// Whether a diff was sent to the ledger
    pub submitted: bool,
}

/// Run-to-completion import of bank statements into the ledger
pub struct ImportRunner<L: LedgerClient, S: StatementSource> {
    engine: ReconciliationEngine,
    ledger: L,
    statements: S,
}

impl<L: LedgerClient, S: StatementSource> ImportRunner<L, S> {
    pub fn new(config: Configuration, ledger: L, statements: S) -> Self {
        Self {
            engine: ReconciliationEngine::new(config),
            ledger,
            statements,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Reconcile without submitting anything
    pub async fn preview(&self) -> ReconcileResult<ReconciliationReport> {
        self.preview_at(Utc::now()).await
    }

    pub async fn preview_at(&self, now: DateTime<Utc>) -> ReconcileResult<ReconciliationReport> {
        let lookback_days = self.engine.config().ledger.lookback_days;

        let statements = self.statements.fetch_statements(lookback_days).await?;
        tracing::info!(count = statements.len(), lookback_days, "Fetched statements");

        let since = window_start(now, lookback_days);
        let snapshot = self.ledger.fetch_snapshot(since).await?;
        tracing::info!(
            since,
            transactions = snapshot.transactions.len(),
            accounts = snapshot.accounts.len(),
            "Fetched ledger snapshot"
        );

        self.engine.reconcile(&statements, &snapshot, now.timestamp())
    }

    /// Fetch, reconcile and submit the new records
    pub async fn run(&mut self) -> ReconcileResult<ImportSummary> {
        self.run_at(Utc::now()).await
    }

    /// Same as [`run`](Self::run) with an explicit batch time
    pub async fn run_at(&mut self, now: DateTime<Utc>) -> ReconcileResult<ImportSummary> {
        let report = self.preview_at(now).await?;

        if report.is_empty() {
            tracing::info!("Nothing new to import");
            return Ok(ImportSummary {
                report,
                submitted: false,
            });
        }

        self.ledger.submit(&report.diff).await?;
        tracing::info!(transactions = report.diff.len(), "Submitted ledger diff");

        Ok(ImportSummary {
            report,
            submitted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::utils::{MemoryLedger, MemoryStatements};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).unwrap()
    }

    fn source() -> MemoryStatements {
        MemoryStatements::new(vec![Statement::new(
            "EUR-1",
            vec![raw("ACME", "-500", "EUR", "", "05.01.2024", "Office chairs")],
        )])
    }

    #[tokio::test]
    async fn test_run_submits_once() {
        let ledger = MemoryLedger::new(empty_snapshot());
        let mut runner = ImportRunner::new(test_config(), ledger.clone(), source());

        let first = runner.run_at(now()).await.unwrap();
        let second = runner.run_at(now()).await.unwrap();

        assert!(first.submitted);
        assert_eq!(first.report.diff.current_client_timestamp, now().timestamp());
        assert!(!second.submitted);
        assert_eq!(ledger.submissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_leaves_ledger_untouched() {
        let ledger = MemoryLedger::new(empty_snapshot());
        let runner = ImportRunner::new(test_config(), ledger.clone(), source());

        let report = runner.preview_at(now()).await.unwrap();

        assert_eq!(report.diff.len(), 1);
        assert!(ledger.submissions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_outside_window_are_not_seen() {
        let mut snapshot = empty_snapshot();
        let mut manual = ledger_transaction("2024-01-05", Money::ZERO, money("500"), "acc-eur", 2);
        // Changed long before the look-back window opened
        manual.changed = 1_600_000_000;
        snapshot.transactions.push(manual);
        let runner = ImportRunner::new(test_config(), MemoryLedger::new(snapshot), source());

        let report = runner.preview_at(now()).await.unwrap();

        assert_eq!(report.new_operations.len(), 1);
    }
}
