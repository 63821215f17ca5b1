//! # Statement Reconciler
//!
//! Reconciles bank statement lines against a snapshot of a remote ledger and
//! builds the delta of transactions still missing from it.
//!
//! ## Pipeline
//!
//! - **Deduplication**: identical lines from overlapping statements collapse to one
//! - **Linking**: the two legs of a bank currency exchange merge into a transition
//! - **Classification**: payroll payouts, cash withdrawals and categorised expenses
//! - **Filtering**: operations already in the ledger, typed by hand or imported
//!   by an earlier run, are dropped
//! - **Building**: surviving operations become ledger records tagged with an
//!   import comment, so running the import twice submits nothing the second time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statement_reconciler::{Configuration, ImportRunner, MemoryLedger, MemoryStatements};
//!
//! # async fn run() -> statement_reconciler::ReconcileResult<()> {
//! let config = Configuration::load("config.toml")?;
//! // Any LedgerClient / StatementSource implementation works here
//! let ledger = MemoryLedger::default();
//! let statements = MemoryStatements::default();
//!
//! let mut runner = ImportRunner::new(config, ledger, statements);
//! let summary = runner.run().await?;
//! println!("imported {} operations", summary.report.new_operations.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod logging;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use reconciliation::{BatchStats, ReconciliationEngine, ReconciliationReport};
pub use traits::*;
pub use types::*;
pub use utils::{MemoryLedger, MemoryStatements};

// Re-export record patterns for convenience
pub use ledger::transaction::patterns;
