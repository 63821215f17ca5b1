//! Ledger state as exchanged with the remote finance service

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::*;
use crate::utils::validation::validate_transaction;

/// Currency as known to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Currency code, e.g. `EUR`
    pub short_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAccount {
    pub id: String,
    pub title: String,
    /// Instrument id the account is kept in
    pub instrument: i64,
}

/// Transaction record, both as read from the snapshot and as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub id: String,
    pub user: i64,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    pub income: Money,
    pub outcome: Money,
    pub income_account: String,
    #[serde(default)]
    pub outcome_account: Option<String>,
    pub income_instrument: i64,
    pub outcome_instrument: i64,
    pub created: i64,
    pub changed: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub viewed: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub tag: Option<Vec<String>>,
}

impl LedgerTransaction {
    pub fn validate(&self) -> ReconcileResult<()> {
        validate_transaction(self)
    }
}

/// Point-in-time read of the ledger, authoritative and read-only to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub server_timestamp: i64,
    #[serde(default, rename = "instrument")]
    pub instruments: Vec<Instrument>,
    #[serde(default, rename = "account")]
    pub accounts: Vec<LedgerAccount>,
    #[serde(default, rename = "transaction")]
    pub transactions: Vec<LedgerTransaction>,
}

impl LedgerSnapshot {
    /// Parse a snapshot from the ledger's JSON diff response
    pub fn from_json(content: &str) -> ReconcileResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Instrument id → currency code
    pub fn instrument_codes(&self) -> HashMap<i64, &str> {
        self.instruments
            .iter()
            .map(|i| (i.id, i.short_title.as_str()))
            .collect()
    }

    /// Accounts whose title marks them as mirrors of the tracked bank
    pub fn monitored_accounts(&self, title_prefix: &str) -> MonitoredAccounts {
        let codes = self.instrument_codes();
        let mut monitored = MonitoredAccounts::default();

        for account in &self.accounts {
            if !account.title.starts_with(title_prefix) {
                continue;
            }
            // Accounts in an unknown instrument cannot be keyed, skip them
            if let Some(code) = codes.get(&account.instrument) {
                monitored.account_ids.insert(account.id.clone());
                monitored.currencies.insert(code.to_string());
            }
        }

        monitored
    }

    /// Merge a submitted diff into this snapshot
    pub fn apply(&mut self, diff: &LedgerDiff) {
        for transaction in &diff.transactions {
            match self.transactions.iter_mut().find(|t| t.id == transaction.id) {
                Some(existing) => *existing = transaction.clone(),
                None => self.transactions.push(transaction.clone()),
            }
        }
        self.server_timestamp = self.server_timestamp.max(diff.current_client_timestamp);
    }
}

/// Ledger accounts mirroring the tracked bank, with the currencies they cover
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitoredAccounts {
    account_ids: HashSet<String>,
    currencies: HashSet<String>,
}

impl MonitoredAccounts {
    pub fn contains_account(&self, account_id: &str) -> bool {
        self.account_ids.contains(account_id)
    }

    pub fn covers_currency(&self, currency: &str) -> bool {
        self.currencies.contains(currency)
    }

    pub fn is_empty(&self) -> bool {
        self.account_ids.is_empty()
    }

    /// Whether either side of `transaction` sits on a monitored account
    pub fn touches(&self, transaction: &LedgerTransaction) -> bool {
        self.contains_account(&transaction.income_account)
            || transaction
                .outcome_account
                .as_deref()
                .is_some_and(|id| self.contains_account(id))
    }
}

/// Delta submitted back to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDiff {
    /// Batch timestamp shared by every record in the diff
    pub current_client_timestamp: i64,
    pub server_timestamp: i64,
    #[serde(default, rename = "transaction", skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<LedgerTransaction>,
}

impl LedgerDiff {
    pub fn new(current_client_timestamp: i64, transactions: Vec<LedgerTransaction>) -> Self {
        Self {
            current_client_timestamp,
            server_timestamp: 0,
            transactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn to_json(&self) -> ReconcileResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
