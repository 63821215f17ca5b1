//! Import tags written into ledger comments
//!
//! The comment of every record created by the engine starts with one of the
//! tags below. The reconciliation filter recomputes the same comment for each
//! candidate operation to recognise what a previous run already imported.

use crate::types::*;

/// Recognised comment prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportTag {
    Import,
    CurrencyExchange,
    DeelTransfer,
    CashWithdrawal,
}

impl ImportTag {
    pub const ALL: [ImportTag; 4] = [
        ImportTag::Import,
        ImportTag::CurrencyExchange,
        ImportTag::DeelTransfer,
        ImportTag::CashWithdrawal,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            ImportTag::Import => "Импорт: ",
            ImportTag::CurrencyExchange => "Обмен валют: ",
            ImportTag::DeelTransfer => "Transfer from Deel: ",
            ImportTag::CashWithdrawal => "Снятие наличных: ",
        }
    }

    /// Tag a ledger comment starts with, if any
    pub fn detect(comment: &str) -> Option<ImportTag> {
        Self::ALL
            .into_iter()
            .find(|tag| comment.starts_with(tag.prefix()))
    }
}

/// Comment the transaction builder writes for `operation`
pub fn import_comment(operation: &Operation) -> String {
    match operation {
        Operation::Simple(op) => simple_comment(op),
        Operation::Transition(op) => exchange_comment(op),
        Operation::DeelTransfer(op) => deel_comment(op),
        Operation::CashWithdrawal(op) => cash_withdrawal_comment(op),
    }
}

pub fn simple_comment(op: &SimpleOperation) -> String {
    format!("{}{} ({})", ImportTag::Import.prefix(), op.customer, op.currency)
}

pub fn exchange_comment(op: &TransitionOperation) -> String {
    format!(
        "{}{} {} → {} {}",
        ImportTag::CurrencyExchange.prefix(),
        op.from_amount,
        op.from_currency,
        op.to_amount,
        op.to_currency
    )
}

pub fn deel_comment(op: &DeelTransfer) -> String {
    format!("{}{}", ImportTag::DeelTransfer.prefix(), op.customer)
}

pub fn cash_withdrawal_comment(op: &CashWithdrawal) -> String {
    format!("{}{}", ImportTag::CashWithdrawal.prefix(), op.customer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_tags() {
        assert_eq!(ImportTag::detect("Импорт: ACME (EUR)"), Some(ImportTag::Import));
        assert_eq!(
            ImportTag::detect("Обмен валют: -100.0 EUR → 11700.0 RSD"),
            Some(ImportTag::CurrencyExchange)
        );
        assert_eq!(
            ImportTag::detect("Transfer from Deel: DEEL INC"),
            Some(ImportTag::DeelTransfer)
        );
        assert_eq!(
            ImportTag::detect("Снятие наличных: ATM"),
            Some(ImportTag::CashWithdrawal)
        );
        assert_eq!(ImportTag::detect("Lunch with friends"), None);
        assert_eq!(ImportTag::detect("Импорт ACME"), None);
    }

    #[test]
    fn test_exchange_comment_keeps_signs() {
        let operation = Operation::Transition(TransitionOperation {
            from_amount: Money::from_minor(-10000),
            from_currency: "EUR".to_string(),
            to_amount: Money::from_minor(1_170_000),
            to_currency: "RSD".to_string(),
            date: "05.01.2024".to_string(),
        });

        assert_eq!(
            import_comment(&operation),
            "Обмен валют: -100.0 EUR → 11700.0 RSD"
        );
    }

    #[test]
    fn test_simple_comment_ignores_category() {
        let operation = Operation::Simple(SimpleOperation {
            customer: "ACME".to_string(),
            amount: Money::from_minor(-50000),
            currency: "EUR".to_string(),
            date: "05.01.2024".to_string(),
            category: Some("groceries".to_string()),
        });

        assert_eq!(import_comment(&operation), "Импорт: ACME (EUR)");
    }
}
