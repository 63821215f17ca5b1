//! Shared fixtures for unit tests

use crate::config::Configuration;
use crate::ledger::snapshot::{Instrument, LedgerAccount, LedgerSnapshot, LedgerTransaction};
use crate::types::*;

pub const TEST_CONFIG: &str = r#"
    default_currency = "RSD"

    [ledger]
    user_id = 42
    monitored_account_prefix = "Raiffeizen B"

    [currencies.RSD]
    instrument_id = 3
    account_id = "acc-rsd"
    cash_account_id = "wallet-rsd"

    [currencies.EUR]
    instrument_id = 2
    account_id = "acc-eur"
    cash_account_id = "wallet-eur"

    [currencies.USD]
    instrument_id = 1
    account_id = "acc-usd"

    [[categories]]
    keyword = "maxi"
    category_id = "groceries"

    [[categories]]
    keyword = "ACME"
    category_id = "office"

    [deel]
    enabled = true
    keywords = ["deel"]
    account_id = "deel-acc"
    currency = "USD"

    [cash_withdrawal]
    enabled = true
    keywords = ["bankomat", "atm"]
"#;

pub fn test_config() -> Configuration {
    Configuration::from_toml_str(TEST_CONFIG).expect("test config is valid")
}

pub fn money(amount: &str) -> Money {
    amount.parse().expect("test amount is valid")
}

pub fn raw(
    customer: &str,
    amount: &str,
    currency: &str,
    reference: &str,
    date: &str,
    description: &str,
) -> RawOperation {
    RawOperation::new(customer, money(amount), currency, reference, date, description)
}

/// Snapshot with the bank's three currency accounts, two cash wallets and the
/// Deel pseudo-account, and no transactions
pub fn empty_snapshot() -> LedgerSnapshot {
    let instruments = [(1, "USD"), (2, "EUR"), (3, "RSD")]
        .into_iter()
        .map(|(id, code)| Instrument {
            id,
            title: code.to_string(),
            short_title: code.to_string(),
        })
        .collect();

    let accounts = [
        ("acc-usd", "Raiffeizen B USD", 1),
        ("acc-eur", "Raiffeizen B EUR", 2),
        ("acc-rsd", "Raiffeizen B RSD", 3),
        ("wallet-eur", "Cash EUR", 2),
        ("wallet-rsd", "Cash RSD", 3),
        ("deel-acc", "Deel", 1),
    ]
    .into_iter()
    .map(|(id, title, instrument)| LedgerAccount {
        id: id.to_string(),
        title: title.to_string(),
        instrument,
    })
    .collect();

    LedgerSnapshot {
        server_timestamp: 0,
        instruments,
        accounts,
        transactions: Vec::new(),
    }
}

/// Single-account ledger record; the non-zero side decides the direction
pub fn ledger_transaction(
    date: &str,
    income: Money,
    outcome: Money,
    account: &str,
    instrument: i64,
) -> LedgerTransaction {
    LedgerTransaction {
        id: format!("{}-{}-{}", date, account, income.minor() + outcome.minor()),
        user: 42,
        date: date.to_string(),
        income,
        outcome,
        income_account: account.to_string(),
        outcome_account: Some(account.to_string()),
        income_instrument: instrument,
        outcome_instrument: instrument,
        created: 0,
        changed: 0,
        deleted: false,
        viewed: false,
        comment: Some("manual entry".to_string()),
        payee: None,
        tag: None,
    }
}
