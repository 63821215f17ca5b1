//! Collaborator seams for statement fetching and ledger synchronisation
//!
//! The engine is storage-agnostic: any bank client or ledger API can be
//! plugged into the [`ImportRunner`](crate::ledger::ImportRunner) by
//! implementing these traits.

use async_trait::async_trait;

use crate::ledger::snapshot::{LedgerDiff, LedgerSnapshot};
use crate::types::*;

/// Source of bank statements
#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Fetch every statement covering the last `lookback_days` days.
    ///
    /// Overlapping statements are fine, repeated lines are deduplicated.
    async fn fetch_statements(&self, lookback_days: u32) -> ReconcileResult<Vec<Statement>>;
}

/// Remote ledger the statements are reconciled against
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch instruments, accounts and the transactions changed at or after
    /// `since` (unix seconds)
    async fn fetch_snapshot(&self, since: i64) -> ReconcileResult<LedgerSnapshot>;

    /// Submit new records
    async fn submit(&mut self, diff: &LedgerDiff) -> ReconcileResult<()>;
}
