//! Exact-duplicate removal across fetched statements

use std::collections::HashSet;

use crate::types::*;

/// Unique statement lines, in fetch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    pub operations: Vec<RawOperation>,
    /// Number of dropped repeats
    pub duplicates: usize,
}

type DedupKey<'a> = (&'a str, Money, &'a str, &'a str, &'a str, &'a str);

fn dedup_key(op: &RawOperation) -> DedupKey<'_> {
    (
        &op.date,
        op.amount,
        &op.currency,
        &op.customer,
        &op.reference,
        &op.description,
    )
}

/// Flatten statements and drop later repeats of an identical line.
///
/// The same line shows up when overlapping statements are fetched, e.g. a
/// daily and a weekly statement covering the same day.
pub fn deduplicate(statements: &[Statement]) -> Deduplicated {
    let mut seen: HashSet<DedupKey<'_>> = HashSet::new();
    let mut result = Deduplicated::default();

    for statement in statements {
        for op in &statement.operations {
            if !seen.insert(dedup_key(op)) {
                result.duplicates += 1;
                tracing::debug!(
                    account = %statement.account_number,
                    date = %op.date,
                    amount = %op.amount,
                    currency = %op.currency,
                    customer = %op.customer,
                    "Duplicate statement line skipped"
                );
                continue;
            }
            result.operations.push(op.clone());
        }
    }

    if result.duplicates > 0 {
        tracing::info!(duplicates = result.duplicates, "Skipped duplicate statement lines");
    }

    result
}
