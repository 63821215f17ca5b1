//! Startup configuration: currency, category, Deel and cash-withdrawal tables

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::types::*;
use crate::utils::validation::validate_configuration;

/// Complete engine configuration, loaded once and passed by reference to every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub ledger: LedgerSettings,
    /// Currency whose entry is used for codes missing from `currencies`
    #[serde(default = "default_currency")]
    pub default_currency: String,
    pub currencies: HashMap<String, CurrencyConfig>,
    /// Ordered keyword rules, first match wins
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
    #[serde(default)]
    pub deel: DeelConfig,
    #[serde(default)]
    pub cash_withdrawal: CashWithdrawalConfig,
    #[serde(default)]
    pub exchange: ExchangeDetection,
}

/// Settings describing the remote ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Ledger user that owns the created transactions
    pub user_id: i64,
    /// Title prefix of ledger accounts mirroring the tracked bank
    #[serde(default = "default_monitored_account_prefix")]
    pub monitored_account_prefix: String,
    /// How many days of statements and ledger history a run looks at
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// Ledger identifiers for one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub instrument_id: i64,
    /// Bank account holding this currency
    pub account_id: String,
    /// Paired cash wallet, used as the counter-account
    #[serde(default)]
    pub cash_account_id: Option<String>,
}

impl CurrencyConfig {
    /// Cash account for this currency, falling back to the bank account
    pub fn cash_account(&self) -> &str {
        self.cash_account_id.as_deref().unwrap_or(&self.account_id)
    }
}

/// Keyword matched against the customer name to pick a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ledger pseudo-account the payouts are drawn from
    #[serde(default)]
    pub account_id: Option<String>,
    /// Currency the provider account is kept in
    #[serde(default = "default_deel_currency")]
    pub currency: String,
}

impl Default for DeelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keywords: Vec::new(),
            account_id: None,
            currency: default_deel_currency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashWithdrawalConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Markers identifying the bank's own currency-exchange lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeDetection {
    /// Lower-case description fragments
    #[serde(default = "default_exchange_keywords")]
    pub keywords: Vec<String>,
    /// Lower-case customer fragments naming the bank itself
    #[serde(default = "default_bank_counterparties")]
    pub bank_counterparties: Vec<String>,
    /// Masked card number fragment; card lines are never exchanges
    #[serde(default = "default_masked_card_marker")]
    pub masked_card_marker: String,
}

impl Default for ExchangeDetection {
    fn default() -> Self {
        Self {
            keywords: default_exchange_keywords(),
            bank_counterparties: default_bank_counterparties(),
            masked_card_marker: default_masked_card_marker(),
        }
    }
}

fn default_currency() -> String {
    "RSD".to_string()
}

fn default_monitored_account_prefix() -> String {
    "Raiffeizen B".to_string()
}

fn default_lookback_days() -> u32 {
    7
}

fn default_deel_currency() -> String {
    "USD".to_string()
}

fn default_exchange_keywords() -> Vec<String> {
    [
        "otkup",
        "kupoprodaja deviza",
        "dinarska protivvrednost",
        "po kursu",
        "protivvrednost",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_bank_counterparties() -> Vec<String> {
    vec!["raiffeisen banka".to_string()]
}

fn default_masked_card_marker() -> String {
    "******".to_string()
}

impl Configuration {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> ReconcileResult<Self> {
        let config: Configuration = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            currencies = config.currencies.len(),
            categories = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        validate_configuration(self)
    }

    /// Currency entry for `code`, or the default currency's entry when unmapped
    pub fn currency(&self, code: &str) -> ReconcileResult<&CurrencyConfig> {
        if let Some(config) = self.currencies.get(code) {
            return Ok(config);
        }

        tracing::debug!(
            currency = code,
            fallback = %self.default_currency,
            "Currency not configured, using default entry"
        );
        self.currencies.get(&self.default_currency).ok_or_else(|| {
            ReconcileError::Config(format!(
                "Default currency '{}' has no configuration entry",
                self.default_currency
            ))
        })
    }
}
