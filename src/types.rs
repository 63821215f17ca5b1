//! Core types and data structures for statement reconciliation

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Signed monetary amount in integer minor units (hundredths).
///
/// Every decimal amount entering the engine is canonicalised to `Money` once,
/// so lookup keys never compare floating point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize)]
#[serde(try_from = "BigDecimal")]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    const MINOR_PER_MAJOR: i64 = 100;

    /// Create an amount from minor units (e.g. `-10050` is `-100.50`)
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Amount in minor units
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Canonicalise a decimal amount, rounding to two decimals
    pub fn from_decimal(amount: &BigDecimal) -> ReconcileResult<Self> {
        let scaled = (amount.clone() * BigDecimal::from(Self::MINOR_PER_MAJOR)).round(0);
        scaled.to_i64().map(Self).ok_or_else(|| {
            ReconcileError::InvalidAmount(format!("{} does not fit in minor units", amount))
        })
    }

    /// Exact decimal value of this amount
    pub fn to_decimal(&self) -> BigDecimal {
        BigDecimal::new(self.0.into(), 2)
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<BigDecimal> for Money {
    type Error = ReconcileError;

    fn try_from(value: BigDecimal) -> Result<Self, Self::Error> {
        Self::from_decimal(&value)
    }
}

impl FromStr for Money {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = BigDecimal::from_str(s.trim())
            .map_err(|e| ReconcileError::InvalidAmount(format!("'{}': {}", s, e)))?;
        Self::from_decimal(&decimal)
    }
}

/// Renders with at least one fractional digit and no trailing zeros
/// (`-100.0`, `12.3`, `12.34`), the form used in ledger comments.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / Self::MINOR_PER_MAJOR as u64;
        let fraction = magnitude % Self::MINOR_PER_MAJOR as u64;

        if fraction % 10 == 0 {
            write!(f, "{}{}.{}", sign, whole, fraction / 10)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, fraction)
        }
    }
}

// The ledger wire format carries plain JSON numbers.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / Self::MINOR_PER_MAJOR as f64)
    }
}

/// One line item of a bank statement, as produced by the statement parser
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawOperation {
    /// Counterparty name as printed on the statement
    pub customer: String,
    /// Signed amount, positive for incoming money
    pub amount: Money,
    /// Currency code of the statement account
    pub currency: String,
    /// Bank reference, may be empty
    pub reference: String,
    /// Value date in the statement's native format (usually `DD.MM.YYYY`)
    pub date: String,
    /// Free-text description
    pub description: String,
}

impl RawOperation {
    /// Create a new raw operation
    pub fn new(
        customer: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
        reference: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            customer: customer.into(),
            amount,
            currency: currency.into(),
            reference: reference.into(),
            date: date.into(),
            description: description.into(),
        }
    }
}

/// A fetched statement: one per message attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub account_number: String,
    pub operations: Vec<RawOperation>,
}

impl Statement {
    pub fn new(account_number: impl Into<String>, operations: Vec<RawOperation>) -> Self {
        Self {
            account_number: account_number.into(),
            operations,
        }
    }
}

/// Plain income or expense on a bank account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleOperation {
    pub customer: String,
    pub amount: Money,
    pub currency: String,
    pub date: String,
    /// Category id assigned from the configured keyword rules
    pub category: Option<String>,
}

impl SimpleOperation {
    pub fn from_raw(raw: RawOperation, category: Option<String>) -> Self {
        Self {
            customer: raw.customer,
            amount: raw.amount,
            currency: raw.currency,
            date: raw.date,
            category,
        }
    }
}

/// Currency exchange made of two statement legs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOperation {
    /// Outgoing leg, always negative
    pub from_amount: Money,
    pub from_currency: String,
    /// Incoming leg, always positive
    pub to_amount: Money,
    pub to_currency: String,
    /// Date of the outgoing leg
    pub date: String,
}

impl TransitionOperation {
    /// Merge two legs. `from` must be the negative leg and `to` the positive one.
    pub fn from_legs(from: RawOperation, to: RawOperation) -> Self {
        debug_assert!(from.amount.is_negative() && to.amount.is_positive());
        debug_assert_ne!(from.currency, to.currency);

        Self {
            from_amount: from.amount,
            from_currency: from.currency,
            to_amount: to.amount,
            to_currency: to.currency,
            date: from.date,
        }
    }
}

/// Incoming payout from the Deel payroll provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeelTransfer {
    pub customer: String,
    pub amount: Money,
    pub currency: String,
    pub date: String,
}

impl DeelTransfer {
    pub fn from_raw(raw: RawOperation) -> Self {
        Self {
            customer: raw.customer,
            amount: raw.amount,
            currency: raw.currency,
            date: raw.date,
        }
    }
}

/// ATM or branch cash withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashWithdrawal {
    pub customer: String,
    pub amount: Money,
    pub currency: String,
    pub date: String,
}

impl CashWithdrawal {
    pub fn from_raw(raw: RawOperation) -> Self {
        Self {
            customer: raw.customer,
            amount: raw.amount,
            currency: raw.currency,
            date: raw.date,
        }
    }
}

/// Classified operation flowing through the filter and transaction builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Simple(SimpleOperation),
    Transition(TransitionOperation),
    DeelTransfer(DeelTransfer),
    CashWithdrawal(CashWithdrawal),
}

impl Operation {
    /// Statement-native date of the operation
    pub fn date(&self) -> &str {
        match self {
            Operation::Simple(op) => &op.date,
            Operation::Transition(op) => &op.date,
            Operation::DeelTransfer(op) => &op.date,
            Operation::CashWithdrawal(op) => &op.date,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Simple(op) => {
                write!(f, "{} - {} {} - {}", op.date, op.amount, op.currency, op.customer)
            }
            Operation::Transition(op) => write!(
                f,
                "{} - {} {} → {} {}",
                op.date, op.from_amount, op.from_currency, op.to_amount, op.to_currency
            ),
            Operation::DeelTransfer(op) => write!(
                f,
                "[DEEL] {} - {} {} - {}",
                op.date, op.amount, op.currency, op.customer
            ),
            Operation::CashWithdrawal(op) => write!(
                f,
                "[CASH] {} - {} {} - {}",
                op.date, op.amount, op.currency, op.customer
            ),
        }
    }
}

/// Errors that can occur while reconciling a batch
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Ledger error: {0}")]
    Ledger(String),
    #[error("Statement source error: {0}")]
    Statements(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
