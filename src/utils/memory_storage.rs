//! In-memory ledger and statement source for testing and development

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::ledger::snapshot::{LedgerDiff, LedgerSnapshot};
use crate::traits::*;
use crate::types::*;

fn poisoned<E>(_: E) -> ReconcileError {
    ReconcileError::Ledger("in-memory ledger lock poisoned".to_string())
}

/// In-memory ledger holding one snapshot.
///
/// Clones share state, so a test can keep a handle while the runner owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    snapshot: Arc<RwLock<LedgerSnapshot>>,
    submissions: Arc<RwLock<Vec<LedgerDiff>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl MemoryLedger {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            ..Self::default()
        }
    }

    /// Make every following call fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) -> ReconcileResult<()> {
        *self.failure.write().map_err(poisoned)? = Some(message.into());
        Ok(())
    }

    pub fn recover(&self) -> ReconcileResult<()> {
        *self.failure.write().map_err(poisoned)? = None;
        Ok(())
    }

    /// Every diff accepted so far, in submission order
    pub fn submissions(&self) -> ReconcileResult<Vec<LedgerDiff>> {
        Ok(self.submissions.read().map_err(poisoned)?.clone())
    }

    /// Full current state, ignoring any `since` window
    pub fn snapshot(&self) -> ReconcileResult<LedgerSnapshot> {
        Ok(self.snapshot.read().map_err(poisoned)?.clone())
    }

    fn check_failure(&self) -> ReconcileResult<()> {
        match self.failure.read().map_err(poisoned)?.as_ref() {
            Some(message) => Err(ReconcileError::Ledger(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn fetch_snapshot(&self, since: i64) -> ReconcileResult<LedgerSnapshot> {
        self.check_failure()?;

        let snapshot = self.snapshot.read().map_err(poisoned)?;
        Ok(LedgerSnapshot {
            server_timestamp: snapshot.server_timestamp,
            instruments: snapshot.instruments.clone(),
            accounts: snapshot.accounts.clone(),
            transactions: snapshot
                .transactions
                .iter()
                .filter(|t| t.changed >= since)
                .cloned()
                .collect(),
        })
    }

    async fn submit(&mut self, diff: &LedgerDiff) -> ReconcileResult<()> {
        self.check_failure()?;

        self.snapshot.write().map_err(poisoned)?.apply(diff);
        self.submissions.write().map_err(poisoned)?.push(diff.clone());
        Ok(())
    }
}

/// Statement source returning a fixed list of statements
#[derive(Debug, Clone, Default)]
pub struct MemoryStatements {
    statements: Arc<RwLock<Vec<Statement>>>,
    failure: Option<String>,
}

impl MemoryStatements {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements: Arc::new(RwLock::new(statements)),
            failure: None,
        }
    }

    /// Source whose every fetch fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn push(&self, statement: Statement) -> ReconcileResult<()> {
        self.statements
            .write()
            .map_err(|_| ReconcileError::Statements("statement store lock poisoned".to_string()))?
            .push(statement);
        Ok(())
    }
}

#[async_trait]
impl StatementSource for MemoryStatements {
    async fn fetch_statements(&self, _lookback_days: u32) -> ReconcileResult<Vec<Statement>> {
        if let Some(message) = &self.failure {
            return Err(ReconcileError::Statements(message.clone()));
        }

        Ok(self
            .statements
            .read()
            .map_err(|_| ReconcileError::Statements("statement store lock poisoned".to_string()))?
            .clone())
    }
}
