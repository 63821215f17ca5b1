//! Dropping operations the ledger already holds
//!
//! Two indices are built from the snapshot, both limited to non-deleted
//! transactions that touch a monitored account:
//!
//! - plain keys `(date, amount, currency)` of every transaction, which catch
//!   entries typed in by hand;
//! - import keys, the plain key plus the full comment, for transactions whose
//!   comment carries an import tag, which catch earlier runs of the engine.

use std::collections::{HashMap, HashSet};

use crate::config::{Configuration, LedgerSettings};
use crate::ledger::comment::*;
use crate::ledger::snapshot::{LedgerSnapshot, MonitoredAccounts};
use crate::types::*;
use crate::utils::dates::normalize_date;

/// `(date, amount, currency)` with an ISO date and an absolute amount
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub date: String,
    pub amount: Money,
    pub currency: String,
}

impl LedgerKey {
    pub fn new(date: &str, amount: Money, currency: &str) -> Self {
        Self {
            date: normalize_date(date),
            amount: amount.abs(),
            currency: currency.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportKey {
    pub key: LedgerKey,
    pub comment: String,
}

/// Lookup structures built once per snapshot
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex {
    monitored: MonitoredAccounts,
    existing_transactions: HashSet<LedgerKey>,
    existing_import_operations: HashSet<ImportKey>,
}

impl LedgerIndex {
    pub fn build(snapshot: &LedgerSnapshot, settings: &LedgerSettings) -> Self {
        let monitored = snapshot.monitored_accounts(&settings.monitored_account_prefix);
        let codes = snapshot.instrument_codes();
        let mut index = LedgerIndex::default();

        if monitored.is_empty() {
            tracing::warn!(
                prefix = %settings.monitored_account_prefix,
                "No ledger account matches the monitored prefix"
            );
        }

        for transaction in snapshot
            .transactions
            .iter()
            .filter(|t| !t.deleted && monitored.touches(t))
        {
            let sides = [
                (
                    transaction.outcome,
                    transaction.outcome_instrument,
                    transaction.outcome_account.as_deref(),
                ),
                (
                    transaction.income,
                    transaction.income_instrument,
                    Some(transaction.income_account.as_str()),
                ),
            ];
            let non_zero: Vec<_> = sides
                .iter()
                .filter(|(amount, _, _)| !amount.is_zero())
                .filter_map(|(amount, instrument, account)| {
                    codes
                        .get(instrument)
                        .map(|code| (LedgerKey::new(&transaction.date, *amount, code), *account))
                })
                .collect();

            // A two-sided transfer only counts on the side that hits the bank
            let two_sided = non_zero.len() > 1;
            for (key, account) in &non_zero {
                let on_bank = account.is_some_and(|id| monitored.contains_account(id));
                if !two_sided || on_bank {
                    index.existing_transactions.insert(key.clone());
                }
            }

            let Some(comment) = transaction.comment.as_deref() else {
                continue;
            };
            if ImportTag::detect(comment).is_none() {
                continue;
            }
            for (key, _) in non_zero {
                index.existing_import_operations.insert(ImportKey {
                    key,
                    comment: comment.to_string(),
                });
            }
        }

        index.monitored = monitored;
        tracing::debug!(
            transactions = index.existing_transactions.len(),
            imports = index.existing_import_operations.len(),
            "Built ledger index"
        );
        index
    }

    pub fn monitored(&self) -> &MonitoredAccounts {
        &self.monitored
    }

    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.existing_transactions.contains(key)
    }

    pub fn contains_import(&self, key: &LedgerKey, comment: &str) -> bool {
        self.existing_import_operations.contains(&ImportKey {
            key: key.clone(),
            comment: comment.to_string(),
        })
    }
}

/// Ledger currency each statement currency is booked in.
///
/// Mirrors the transaction builder: a configured code uses its own entry,
/// anything else the default currency's entry. `None` means the entry's
/// instrument is unknown to the ledger.
#[derive(Debug, Clone, Default)]
pub struct CurrencyBooking {
    configured: HashMap<String, Option<String>>,
    fallback: Option<String>,
}

impl CurrencyBooking {
    pub fn new(config: &Configuration, snapshot: &LedgerSnapshot) -> Self {
        let codes = snapshot.instrument_codes();
        let ledger_code = |instrument: i64| codes.get(&instrument).map(|code| code.to_string());

        Self {
            configured: config
                .currencies
                .iter()
                .map(|(code, entry)| (code.clone(), ledger_code(entry.instrument_id)))
                .collect(),
            fallback: config
                .currencies
                .get(&config.default_currency)
                .and_then(|entry| ledger_code(entry.instrument_id)),
        }
    }

    pub fn ledger_currency(&self, code: &str) -> Option<&str> {
        match self.configured.get(code) {
            Some(booked) => booked.as_deref(),
            None => self.fallback.as_deref(),
        }
    }
}

/// What the filter decided for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    New,
    AlreadyImported,
    /// The operation lands outside every monitored account, so the ledger can never confirm it
    Unconfirmable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Operations to import, in input order
    pub kept: Vec<Operation>,
    pub already_imported: usize,
    pub unconfirmable: usize,
}

/// Drops operations already represented in the ledger snapshot
pub struct ReconciliationFilter {
    index: LedgerIndex,
    booking: CurrencyBooking,
}

impl ReconciliationFilter {
    pub fn new(snapshot: &LedgerSnapshot, config: &Configuration) -> Self {
        Self::with_index(
            LedgerIndex::build(snapshot, &config.ledger),
            CurrencyBooking::new(config, snapshot),
        )
    }

    pub fn with_index(index: LedgerIndex, booking: CurrencyBooking) -> Self {
        Self { index, booking }
    }

    pub fn index(&self) -> &LedgerIndex {
        &self.index
    }

    /// Booked currency of `code`, if a monitored account holds it
    fn monitored_currency(&self, code: &str) -> Option<&str> {
        self.booking
            .ledger_currency(code)
            .filter(|currency| self.index.monitored().covers_currency(currency))
    }

    pub fn verdict(&self, operation: &Operation) -> Verdict {
        let index = &self.index;

        let imported = match operation {
            Operation::Simple(op) => {
                let Some(currency) = self.monitored_currency(&op.currency) else {
                    return Verdict::Unconfirmable;
                };
                let key = LedgerKey::new(&op.date, op.amount, currency);
                index.contains(&key) || index.contains_import(&key, &simple_comment(op))
            }
            Operation::Transition(op) => {
                let from_monitored = self.monitored_currency(&op.from_currency);
                let to_monitored = self.monitored_currency(&op.to_currency);
                if from_monitored.is_none() && to_monitored.is_none() {
                    return Verdict::Unconfirmable;
                }
                let (Some(from_currency), Some(to_currency)) = (
                    self.booking.ledger_currency(&op.from_currency),
                    self.booking.ledger_currency(&op.to_currency),
                ) else {
                    return Verdict::Unconfirmable;
                };

                let comment = exchange_comment(op);
                let from = LedgerKey::new(&op.date, op.from_amount, from_currency);
                let to = LedgerKey::new(&op.date, op.to_amount, to_currency);

                if index.contains_import(&from, &comment) && index.contains_import(&to, &comment) {
                    true
                } else {
                    // One matching leg is not enough
                    from_monitored.is_some()
                        && to_monitored.is_some()
                        && index.contains(&from)
                        && index.contains(&to)
                }
            }
            Operation::DeelTransfer(op) => {
                let Some(currency) = self.monitored_currency(&op.currency) else {
                    return Verdict::Unconfirmable;
                };
                let key = LedgerKey::new(&op.date, op.amount, currency);
                index.contains_import(&key, &deel_comment(op))
            }
            Operation::CashWithdrawal(op) => {
                let Some(currency) = self.monitored_currency(&op.currency) else {
                    return Verdict::Unconfirmable;
                };
                let key = LedgerKey::new(&op.date, op.amount, currency);
                index.contains_import(&key, &cash_withdrawal_comment(op))
            }
        };

        if imported {
            Verdict::AlreadyImported
        } else {
            Verdict::New
        }
    }

    pub fn filter(&self, operations: Vec<Operation>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for operation in operations {
            match self.verdict(&operation) {
                Verdict::New => outcome.kept.push(operation),
                Verdict::AlreadyImported => {
                    tracing::debug!(operation = %operation, "Already in ledger");
                    outcome.already_imported += 1;
                }
                Verdict::Unconfirmable => {
                    tracing::warn!(
                        operation = %operation,
                        "No monitored ledger account for this currency, skipping"
                    );
                    outcome.unconfirmable += 1;
                }
            }
        }

        outcome
    }
}
