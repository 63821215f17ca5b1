//! Keyword classification of unpaired statement lines

use crate::config::Configuration;
use crate::types::*;

fn contains_any(haystacks: &[&str], keywords: &[String]) -> bool {
    let haystacks: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();
    keywords.iter().any(|keyword| {
        let keyword = keyword.to_lowercase();
        haystacks.iter().any(|h| h.contains(&keyword))
    })
}

/// Assigns an operation variant to each unpaired line, first rule wins:
/// Deel payout, then cash withdrawal, then plain operation.
pub struct Classifier<'a> {
    config: &'a Configuration,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Incoming line naming the payroll provider
    pub fn is_deel_transfer(&self, op: &RawOperation) -> bool {
        let deel = &self.config.deel;
        deel.enabled
            && op.amount.is_positive()
            && contains_any(&[&op.customer, &op.description], &deel.keywords)
    }

    /// Outgoing line naming an ATM or branch withdrawal
    pub fn is_cash_withdrawal(&self, op: &RawOperation) -> bool {
        let cash = &self.config.cash_withdrawal;
        cash.enabled
            && op.amount.is_negative()
            && contains_any(&[&op.customer, &op.description], &cash.keywords)
    }

    /// Category of the first rule whose keyword appears in the customer name
    pub fn category_for(&self, customer: &str) -> Option<&'a str> {
        if customer.is_empty() {
            return None;
        }
        let customer = customer.to_lowercase();
        self.config
            .categories
            .iter()
            .find(|rule| customer.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.category_id.as_str())
    }

    pub fn classify(&self, op: RawOperation) -> Operation {
        if self.is_deel_transfer(&op) {
            tracing::debug!(customer = %op.customer, amount = %op.amount, "Classified as Deel transfer");
            return Operation::DeelTransfer(DeelTransfer::from_raw(op));
        }

        if self.is_cash_withdrawal(&op) {
            tracing::debug!(customer = %op.customer, amount = %op.amount, "Classified as cash withdrawal");
            return Operation::CashWithdrawal(CashWithdrawal::from_raw(op));
        }

        let category = self.category_for(&op.customer).map(str::to_string);
        Operation::Simple(SimpleOperation::from_raw(op, category))
    }

    pub fn classify_all(&self, operations: Vec<RawOperation>) -> Vec<Operation> {
        operations.into_iter().map(|op| self.classify(op)).collect()
    }
}
