//! Validation utilities

use crate::config::Configuration;
use crate::ledger::snapshot::LedgerTransaction;
use crate::types::*;

/// Validate that a currency code looks like an ISO 4217 code
pub fn validate_currency_code(code: &str) -> ReconcileResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ReconcileError::Config(format!(
            "Currency code '{}' must be three upper-case letters",
            code
        )));
    }
    Ok(())
}

/// Validate that an account id is usable
pub fn validate_account_id(account_id: &str) -> ReconcileResult<()> {
    if account_id.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Account ID cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Check a configuration for gaps that would surface mid-run
pub fn validate_configuration(config: &Configuration) -> ReconcileResult<()> {
    for (code, currency) in &config.currencies {
        validate_currency_code(code)?;
        validate_account_id(&currency.account_id)
            .map_err(|_| ReconcileError::Config(format!("Currency '{}' has no bank account", code)))?;
    }

    if !config.currencies.contains_key(&config.default_currency) {
        return Err(ReconcileError::Config(format!(
            "Default currency '{}' has no configuration entry",
            config.default_currency
        )));
    }

    if config.ledger.monitored_account_prefix.trim().is_empty() {
        return Err(ReconcileError::Config(
            "Monitored account prefix cannot be empty".to_string(),
        ));
    }

    if config.categories.iter().any(|rule| rule.keyword.trim().is_empty()) {
        return Err(ReconcileError::Config(
            "Category keywords cannot be empty".to_string(),
        ));
    }

    if config.deel.enabled {
        let has_account = config
            .deel
            .account_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if !has_account {
            return Err(ReconcileError::Config(
                "Deel transfers are enabled but no provider account is set".to_string(),
            ));
        }
        if config.deel.keywords.is_empty() {
            tracing::warn!("Deel transfers are enabled without keywords, none will match");
        }
    }

    if config.cash_withdrawal.enabled && config.cash_withdrawal.keywords.is_empty() {
        tracing::warn!("Cash withdrawals are enabled without keywords, none will match");
    }

    Ok(())
}

/// Validate a transaction record before it is handed to the ledger
pub fn validate_transaction(transaction: &LedgerTransaction) -> ReconcileResult<()> {
    validate_account_id(&transaction.income_account)?;
    match transaction.outcome_account.as_deref() {
        Some(account) => validate_account_id(account)?,
        None => {
            return Err(ReconcileError::Validation(
                "Transaction must have an outcome account".to_string(),
            ))
        }
    }

    if transaction.income.is_negative() || transaction.outcome.is_negative() {
        return Err(ReconcileError::Validation(
            "Transaction amounts cannot be negative".to_string(),
        ));
    }

    if transaction.income.is_zero() && transaction.outcome.is_zero() {
        return Err(ReconcileError::Validation(
            "Transaction must move a non-zero amount".to_string(),
        ));
    }

    if transaction.comment.as_deref().map_or(true, str::is_empty) {
        return Err(ReconcileError::Validation(
            "Transaction must carry an import comment".to_string(),
        ));
    }

    Ok(())
}
