//! Reconciliation pipeline: dedup → link → classify → filter → build
//!
//! Each stage consumes the previous one's output. The engine is synchronous
//! and holds no state between runs; everything it knows about earlier runs
//! comes from the ledger snapshot.

pub mod classifier;
pub mod dedup;
pub mod filter;
pub mod linker;

pub use classifier::*;
pub use dedup::*;
pub use filter::*;
pub use linker::*;

use serde::Serialize;

use crate::config::Configuration;
use crate::ledger::snapshot::{LedgerDiff, LedgerSnapshot};
use crate::ledger::transaction::TransactionBuilder;
use crate::types::*;

/// Counters collected while processing one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub statements: usize,
    pub raw_operations: usize,
    pub duplicates: usize,
    /// Lines that move no money and are never imported
    pub zero_amount: usize,
    pub transitions: usize,
    pub operations: usize,
    pub already_imported: usize,
    pub unconfirmable: usize,
    pub new_operations: usize,
}

/// Operations prepared from statements, before the ledger is consulted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedOperations {
    pub operations: Vec<Operation>,
    pub stats: BatchStats,
}

/// Outcome of reconciling one batch
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationReport {
    /// Operations missing from the ledger, in pipeline order
    pub new_operations: Vec<Operation>,
    /// Records to submit, one per new operation
    pub diff: LedgerDiff,
    pub stats: BatchStats,
}

impl ReconciliationReport {
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

pub struct ReconciliationEngine {
    config: Configuration,
}

impl ReconciliationEngine {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Deduplicate, link and classify statement lines.
    ///
    /// Lines that round to a zero amount are dropped after deduplication.
    /// Exchanges come first in discovery order, followed by the remaining
    /// lines in statement order.
    pub fn prepare(&self, statements: &[Statement]) -> PreparedOperations {
        let mut stats = BatchStats {
            statements: statements.len(),
            raw_operations: statements.iter().map(|s| s.operations.len()).sum(),
            ..BatchStats::default()
        };

        let deduplicated = deduplicate(statements);
        stats.duplicates = deduplicated.duplicates;

        let (zero, lines): (Vec<RawOperation>, Vec<RawOperation>) = deduplicated
            .operations
            .into_iter()
            .partition(|op| op.amount.is_zero());
        for op in &zero {
            tracing::debug!(
                date = %op.date,
                currency = %op.currency,
                customer = %op.customer,
                "Zero-amount statement line skipped"
            );
        }
        stats.zero_amount = zero.len();

        let linked = Linker::new(&self.config.exchange).link(lines);
        stats.transitions = linked.transitions.len();

        let mut operations: Vec<Operation> = linked
            .transitions
            .into_iter()
            .map(Operation::Transition)
            .collect();
        operations.extend(Classifier::new(&self.config).classify_all(linked.unresolved));
        stats.operations = operations.len();

        tracing::info!(
            statements = stats.statements,
            raw = stats.raw_operations,
            duplicates = stats.duplicates,
            zero_amount = stats.zero_amount,
            exchanges = stats.transitions,
            operations = stats.operations,
            "Prepared statement operations"
        );

        PreparedOperations { operations, stats }
    }

    /// Run the whole pipeline for one batch.
    ///
    /// `batch_timestamp` is stamped on every built record and on the diff.
    pub fn reconcile(
        &self,
        statements: &[Statement],
        snapshot: &LedgerSnapshot,
        batch_timestamp: i64,
    ) -> ReconcileResult<ReconciliationReport> {
        let PreparedOperations { operations, mut stats } = self.prepare(statements);

        let filter = ReconciliationFilter::new(snapshot, &self.config);
        let filtered = filter.filter(operations);
        stats.already_imported = filtered.already_imported;
        stats.unconfirmable = filtered.unconfirmable;
        stats.new_operations = filtered.kept.len();

        let diff = TransactionBuilder::new(&self.config, batch_timestamp).build_diff(&filtered.kept)?;

        tracing::info!(
            already_imported = stats.already_imported,
            unconfirmable = stats.unconfirmable,
            new = stats.new_operations,
            "Reconciled against ledger"
        );
        for operation in &filtered.kept {
            tracing::info!("New operation: {}", operation);
        }

        Ok(ReconciliationReport {
            new_operations: filtered.kept,
            diff,
            stats,
        })
    }
}
