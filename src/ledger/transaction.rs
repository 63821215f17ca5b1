//! Building ledger transaction records from classified operations

use uuid::Uuid;

use crate::config::Configuration;
use crate::ledger::comment::*;
use crate::ledger::snapshot::{LedgerDiff, LedgerTransaction};
use crate::types::*;
use crate::utils::dates::normalize_date;

/// Fluent builder for a single ledger record
#[derive(Debug)]
pub struct TransactionDraft {
    transaction: LedgerTransaction,
}

impl TransactionDraft {
    /// Start a record with a fresh id, stamped with the batch time
    pub fn new(user: i64, date: String, comment: String, timestamp: i64) -> Self {
        Self {
            transaction: LedgerTransaction {
                id: Uuid::new_v4().to_string(),
                user,
                date,
                income: Money::ZERO,
                outcome: Money::ZERO,
                income_account: String::new(),
                outcome_account: None,
                income_instrument: 0,
                outcome_instrument: 0,
                created: timestamp,
                changed: timestamp,
                deleted: false,
                viewed: false,
                comment: Some(comment),
                payee: None,
                tag: Some(Vec::new()),
            },
        }
    }

    /// Set the receiving side
    pub fn income(mut self, account_id: &str, instrument_id: i64, amount: Money) -> Self {
        self.transaction.income_account = account_id.to_string();
        self.transaction.income_instrument = instrument_id;
        self.transaction.income = amount;
        self
    }

    /// Set the paying side
    pub fn outcome(mut self, account_id: &str, instrument_id: i64, amount: Money) -> Self {
        self.transaction.outcome_account = Some(account_id.to_string());
        self.transaction.outcome_instrument = instrument_id;
        self.transaction.outcome = amount;
        self
    }

    pub fn payee(mut self, payee: &str) -> Self {
        self.transaction.payee = Some(payee.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.transaction
            .tag
            .get_or_insert_with(Vec::new)
            .push(tag.to_string());
        self
    }

    /// Validate and return the record
    pub fn build(self) -> ReconcileResult<LedgerTransaction> {
        self.transaction.validate()?;
        Ok(self.transaction)
    }
}

/// Record shapes for each operation kind
pub mod patterns {
    use super::*;

    fn draft(date: &str, comment: String, config: &Configuration, timestamp: i64) -> TransactionDraft {
        TransactionDraft::new(config.ledger.user_id, normalize_date(date), comment, timestamp)
    }

    /// Income or expense between the bank account and its cash counter-account
    pub fn simple_transaction(
        op: &SimpleOperation,
        config: &Configuration,
        timestamp: i64,
    ) -> ReconcileResult<LedgerTransaction> {
        let currency = config.currency(&op.currency)?;
        let amount = op.amount.abs();
        let bank = currency.account_id.as_str();
        let cash = currency.cash_account();
        let instrument = currency.instrument_id;

        let comment = simple_comment(op);
        let record = if op.amount.is_positive() {
            draft(&op.date, comment, config, timestamp)
                .income(bank, instrument, amount)
                .outcome(cash, instrument, Money::ZERO)
        } else {
            draft(&op.date, comment, config, timestamp)
                .income(cash, instrument, Money::ZERO)
                .outcome(bank, instrument, amount)
        };

        let record = record.payee(&op.customer);
        match &op.category {
            Some(category) => record.tag(category).build(),
            None => record.build(),
        }
    }

    /// Transfer between two currency accounts of the bank
    pub fn currency_exchange(
        op: &TransitionOperation,
        config: &Configuration,
        timestamp: i64,
    ) -> ReconcileResult<LedgerTransaction> {
        let from = config.currency(&op.from_currency)?;
        let to = config.currency(&op.to_currency)?;

        draft(&op.date, exchange_comment(op), config, timestamp)
            .outcome(&from.account_id, from.instrument_id, op.from_amount.abs())
            .income(&to.account_id, to.instrument_id, op.to_amount.abs())
            .build()
    }

    /// Payout from the Deel provider account into the bank
    pub fn deel_transfer(
        op: &DeelTransfer,
        config: &Configuration,
        timestamp: i64,
    ) -> ReconcileResult<LedgerTransaction> {
        let bank = config.currency(&op.currency)?;
        let provider = config.currency(&config.deel.currency)?;
        let provider_account = config.deel.account_id.as_deref().ok_or_else(|| {
            ReconcileError::Config("Deel provider account is not configured".to_string())
        })?;
        let amount = op.amount.abs();

        draft(&op.date, deel_comment(op), config, timestamp)
            .outcome(provider_account, provider.instrument_id, amount)
            .income(&bank.account_id, bank.instrument_id, amount)
            .payee(&op.customer)
            .build()
    }

    /// Move from the bank account into the cash wallet of the same currency
    pub fn cash_withdrawal(
        op: &CashWithdrawal,
        config: &Configuration,
        timestamp: i64,
    ) -> ReconcileResult<LedgerTransaction> {
        let currency = config.currency(&op.currency)?;
        let amount = op.amount.abs();

        draft(&op.date, cash_withdrawal_comment(op), config, timestamp)
            .outcome(&currency.account_id, currency.instrument_id, amount)
            .income(currency.cash_account(), currency.instrument_id, amount)
            .payee(&op.customer)
            .build()
    }
}

/// Maps surviving operations to ledger records for one batch
pub struct TransactionBuilder<'a> {
    config: &'a Configuration,
    timestamp: i64,
}

impl<'a> TransactionBuilder<'a> {
    /// `timestamp` is the batch time stamped on every record
    pub fn new(config: &'a Configuration, timestamp: i64) -> Self {
        Self { config, timestamp }
    }

    pub fn build(&self, operation: &Operation) -> ReconcileResult<LedgerTransaction> {
        match operation {
            Operation::Simple(op) => patterns::simple_transaction(op, self.config, self.timestamp),
            Operation::Transition(op) => {
                patterns::currency_exchange(op, self.config, self.timestamp)
            }
            Operation::DeelTransfer(op) => patterns::deel_transfer(op, self.config, self.timestamp),
            Operation::CashWithdrawal(op) => {
                patterns::cash_withdrawal(op, self.config, self.timestamp)
            }
        }
    }

    /// Build the whole delta, preserving operation order
    pub fn build_diff(&self, operations: &[Operation]) -> ReconcileResult<LedgerDiff> {
        let transactions = operations
            .iter()
            .map(|operation| self.build(operation))
            .collect::<ReconcileResult<Vec<_>>>()?;

        Ok(LedgerDiff::new(self.timestamp, transactions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    const BATCH: i64 = 1_704_499_200;

    fn simple(customer: &str, amount: &str, currency: &str, category: Option<&str>) -> Operation {
        Operation::Simple(SimpleOperation {
            customer: customer.to_string(),
            amount: money(amount),
            currency: currency.to_string(),
            date: "05.01.2024".to_string(),
            category: category.map(str::to_string),
        })
    }

    #[test]
    fn test_simple_expense() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);

        let record = builder
            .build(&simple("ACME", "-500", "EUR", Some("office")))
            .unwrap();

        assert_eq!(record.date, "2024-01-05");
        assert_eq!(record.outcome, money("500"));
        assert_eq!(record.income, Money::ZERO);
        assert_eq!(record.outcome_account.as_deref(), Some("acc-eur"));
        assert_eq!(record.income_account, "wallet-eur");
        assert_eq!(record.outcome_instrument, 2);
        assert_eq!(record.comment.as_deref(), Some("Импорт: ACME (EUR)"));
        assert_eq!(record.payee.as_deref(), Some("ACME"));
        assert_eq!(record.tag, Some(vec!["office".to_string()]));
        assert_eq!(record.user, 42);
        assert_eq!(record.created, BATCH);
        assert_eq!(record.changed, BATCH);
        assert!(!record.deleted);
        assert!(!record.viewed);
    }

    #[test]
    fn test_simple_income_without_cash_account() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);

        let record = builder.build(&simple("Client", "1200", "USD", None)).unwrap();

        assert_eq!(record.income, money("1200"));
        assert_eq!(record.income_account, "acc-usd");
        // USD has no cash wallet, the bank account stands in
        assert_eq!(record.outcome_account.as_deref(), Some("acc-usd"));
        assert_eq!(record.tag, Some(Vec::new()));
    }

    #[test]
    fn test_unmapped_currency_uses_default_entry() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);

        let record = builder.build(&simple("Shop", "-10", "GBP", None)).unwrap();

        assert_eq!(record.outcome_account.as_deref(), Some("acc-rsd"));
        assert_eq!(record.outcome_instrument, 3);
        assert_eq!(record.comment.as_deref(), Some("Импорт: Shop (GBP)"));
    }

    #[test]
    fn test_currency_exchange() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);
        let operation = Operation::Transition(TransitionOperation {
            from_amount: money("-100"),
            from_currency: "EUR".to_string(),
            to_amount: money("11700"),
            to_currency: "RSD".to_string(),
            date: "05.01.2024".to_string(),
        });

        let record = builder.build(&operation).unwrap();

        assert_eq!(record.outcome, money("100"));
        assert_eq!(record.outcome_account.as_deref(), Some("acc-eur"));
        assert_eq!(record.outcome_instrument, 2);
        assert_eq!(record.income, money("11700"));
        assert_eq!(record.income_account, "acc-rsd");
        assert_eq!(record.income_instrument, 3);
        assert_eq!(
            record.comment.as_deref(),
            Some("Обмен валют: -100.0 EUR → 11700.0 RSD")
        );
    }

    #[test]
    fn test_deel_transfer() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);
        let operation = Operation::DeelTransfer(DeelTransfer {
            customer: "DEEL INC".to_string(),
            amount: money("250"),
            currency: "EUR".to_string(),
            date: "05.01.2024".to_string(),
        });

        let record = builder.build(&operation).unwrap();

        assert_eq!(record.outcome_account.as_deref(), Some("deel-acc"));
        assert_eq!(record.outcome_instrument, 1);
        assert_eq!(record.income_account, "acc-eur");
        assert_eq!(record.income_instrument, 2);
        assert_eq!(record.income, money("250"));
        assert_eq!(record.outcome, money("250"));
        assert_eq!(record.comment.as_deref(), Some("Transfer from Deel: DEEL INC"));
    }

    #[test]
    fn test_cash_withdrawal() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);
        let operation = Operation::CashWithdrawal(CashWithdrawal {
            customer: "BANKOMAT 12".to_string(),
            amount: money("-3000"),
            currency: "RSD".to_string(),
            date: "05.01.2024".to_string(),
        });

        let record = builder.build(&operation).unwrap();

        assert_eq!(record.outcome_account.as_deref(), Some("acc-rsd"));
        assert_eq!(record.income_account, "wallet-rsd");
        assert_eq!(record.outcome, money("3000"));
        assert_eq!(record.income, money("3000"));
        assert_eq!(record.comment.as_deref(), Some("Снятие наличных: BANKOMAT 12"));
    }

    #[test]
    fn test_diff_has_unique_ids_and_batch_timestamp() {
        let config = test_config();
        let builder = TransactionBuilder::new(&config, BATCH);
        let operations = vec![
            simple("ACME", "-500", "EUR", None),
            simple("ACME", "-500", "EUR", None),
        ];

        let diff = builder.build_diff(&operations).unwrap();

        assert_eq!(diff.len(), 2);
        assert_eq!(diff.current_client_timestamp, BATCH);
        assert_eq!(diff.server_timestamp, 0);
        assert_ne!(diff.transactions[0].id, diff.transactions[1].id);
    }
}
