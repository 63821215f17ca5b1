//! Pairing the two legs of a currency exchange
//!
//! The bank reports an exchange as two independent lines, one on each
//! currency account. The legs share a reference, or one leg quotes the other's
//! reference in its description.

use crate::config::ExchangeDetection;
use crate::types::*;

/// Result of the linking pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkOutcome {
    /// Exchanges in discovery order
    pub transitions: Vec<TransitionOperation>,
    /// Lines that were not merged, in original order
    pub unresolved: Vec<RawOperation>,
}

/// Whether two lines refer to each other through their references
pub fn are_linked(a: &RawOperation, b: &RawOperation) -> bool {
    if !a.reference.is_empty() && a.reference == b.reference {
        return true;
    }
    if !a.reference.is_empty() && b.description.contains(&a.reference) {
        return true;
    }
    !b.reference.is_empty() && a.description.contains(&b.reference)
}

/// Greedy, order-stable pairing of exchange legs
pub struct Linker<'a> {
    detection: &'a ExchangeDetection,
}

impl<'a> Linker<'a> {
    pub fn new(detection: &'a ExchangeDetection) -> Self {
        Self { detection }
    }

    /// Whether a line looks like one side of a bank currency exchange
    pub fn is_exchange_eligible(&self, op: &RawOperation) -> bool {
        if !self.detection.masked_card_marker.is_empty()
            && op.description.contains(&self.detection.masked_card_marker)
        {
            return false;
        }

        let description = op.description.to_lowercase();
        let customer = op.customer.to_lowercase();

        self.detection
            .keywords
            .iter()
            .any(|keyword| description.contains(&keyword.to_lowercase()))
            || self
                .detection
                .bank_counterparties
                .iter()
                .any(|bank| customer.contains(&bank.to_lowercase()))
    }

    /// Linked lines in different currencies with opposite signs, at least one
    /// of them an exchange line
    pub fn is_match(&self, a: &RawOperation, b: &RawOperation) -> bool {
        let opposite_signs = (a.amount.is_negative() && b.amount.is_positive())
            || (a.amount.is_positive() && b.amount.is_negative());

        a.currency != b.currency
            && opposite_signs
            && are_linked(a, b)
            && (self.is_exchange_eligible(a) || self.is_exchange_eligible(b))
    }

    /// Merge matching legs into transitions.
    ///
    /// Each line is paired with the first later unconsumed line it matches;
    /// consumed lines never take part in another pair.
    pub fn link(&self, operations: Vec<RawOperation>) -> LinkOutcome {
        let mut consumed = vec![false; operations.len()];
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        for i in 0..operations.len() {
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..operations.len() {
                if consumed[j] || !self.is_match(&operations[i], &operations[j]) {
                    continue;
                }
                consumed[i] = true;
                consumed[j] = true;
                pairs.push(if operations[i].amount.is_negative() {
                    (i, j)
                } else {
                    (j, i)
                });
                break;
            }
        }

        let mut slots: Vec<Option<RawOperation>> = operations.into_iter().map(Some).collect();
        let mut outcome = LinkOutcome::default();

        for (from, to) in pairs {
            if let (Some(from), Some(to)) = (slots[from].take(), slots[to].take()) {
                let transition = TransitionOperation::from_legs(from, to);
                tracing::debug!(
                    date = %transition.date,
                    from_amount = %transition.from_amount,
                    from_currency = %transition.from_currency,
                    to_amount = %transition.to_amount,
                    to_currency = %transition.to_currency,
                    "Linked currency exchange"
                );
                outcome.transitions.push(transition);
            }
        }

        outcome.unresolved = slots.into_iter().flatten().collect();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn linker_detection() -> ExchangeDetection {
        ExchangeDetection::default()
    }

    #[test]
    fn test_shared_reference_exchange() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let operations = vec![
            raw("RAIFFEISEN BANKA", "-100", "EUR", "X1", "05.01.2024", "Otkup deviza po kursu 117"),
            raw("", "11700", "RSD", "X1", "05.01.2024", "Dinarska protivvrednost"),
        ];

        let outcome = linker.link(operations);

        assert!(outcome.unresolved.is_empty());
        assert_eq!(
            outcome.transitions,
            vec![TransitionOperation {
                from_amount: money("-100"),
                from_currency: "EUR".to_string(),
                to_amount: money("11700"),
                to_currency: "RSD".to_string(),
                date: "05.01.2024".to_string(),
            }]
        );
    }

    #[test]
    fn test_pairing_independent_of_leg_order() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let from = raw("", "-100", "EUR", "X1", "05.01.2024", "otkup");
        let to = raw("", "11700", "RSD", "X1", "06.01.2024", "");

        let forward = linker.link(vec![from.clone(), to.clone()]);
        let backward = linker.link(vec![to, from]);

        assert_eq!(forward.transitions, backward.transitions);
        assert_eq!(forward.transitions[0].date, "05.01.2024");
    }

    #[test]
    fn test_reference_quoted_in_description() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let operations = vec![
            raw("", "11700", "RSD", "", "05.01.2024", "Kupoprodaja deviza ref 998877"),
            raw("", "-100", "EUR", "998877", "05.01.2024", "Transfer"),
        ];

        let outcome = linker.link(operations);

        assert_eq!(outcome.transitions.len(), 1);
        assert_eq!(outcome.transitions[0].from_currency, "EUR");
    }

    #[test]
    fn test_no_exchange_marker_no_link() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let operations = vec![
            raw("Shop", "-100", "EUR", "X1", "05.01.2024", "Purchase"),
            raw("Client", "11700", "RSD", "X1", "05.01.2024", "Invoice"),
        ];

        let outcome = linker.link(operations);

        assert!(outcome.transitions.is_empty());
        assert_eq!(outcome.unresolved.len(), 2);
    }

    #[test]
    fn test_masked_card_line_is_not_an_exchange() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let card = raw("ATM", "-100", "EUR", "X1", "05.01.2024", "Card 4111******1111 protivvrednost");

        assert!(!linker.is_exchange_eligible(&card));
    }

    #[test]
    fn test_same_currency_or_same_sign_never_match() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let a = raw("", "-100", "EUR", "X1", "05.01.2024", "otkup");

        assert!(!linker.is_match(&a, &raw("", "100", "EUR", "X1", "05.01.2024", "otkup")));
        assert!(!linker.is_match(&a, &raw("", "-100", "RSD", "X1", "05.01.2024", "otkup")));
        assert!(!linker.is_match(&a, &raw("", "0", "RSD", "X1", "05.01.2024", "otkup")));
    }

    #[test]
    fn test_first_match_wins_and_legs_used_once() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let operations = vec![
            raw("", "-100", "EUR", "X1", "05.01.2024", "otkup"),
            raw("", "11700", "RSD", "X1", "05.01.2024", "first"),
            raw("", "11800", "RSD", "X1", "05.01.2024", "second"),
        ];

        let outcome = linker.link(operations);

        assert_eq!(outcome.transitions.len(), 1);
        assert_eq!(outcome.transitions[0].to_amount, money("11700"));
        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].description, "second");
    }

    #[test]
    fn test_every_line_consumed_exactly_once() {
        let detection = linker_detection();
        let linker = Linker::new(&detection);
        let operations = vec![
            raw("Shop", "-5", "RSD", "", "04.01.2024", ""),
            raw("", "-100", "EUR", "X1", "05.01.2024", "otkup"),
            raw("", "-50", "USD", "Y2", "05.01.2024", "po kursu"),
            raw("", "11700", "RSD", "X1", "05.01.2024", ""),
            raw("", "5400", "RSD", "Y2", "05.01.2024", ""),
        ];
        let total = operations.len();

        let outcome = linker.link(operations);

        assert_eq!(outcome.transitions.len() * 2 + outcome.unresolved.len(), total);
        for transition in &outcome.transitions {
            assert!(transition.from_amount.is_negative());
            assert!(transition.to_amount.is_positive());
            assert_ne!(transition.from_currency, transition.to_currency);
        }
        assert_eq!(outcome.unresolved[0].customer, "Shop");
    }
}
