//! Candidate selection and exclusion for tag expressions.

use super::record::Record;
use crate::ir::TagExpression;

/// Candidate test: the wildcard admits everything, otherwise any positive tag
/// must be present.
pub fn is_candidate<R: Record + ?Sized>(expression: &TagExpression, record: &R) -> bool {
    expression.is_wildcard() || expression.positive.iter().any(|tag| record.is_tagged(tag))
}

/// Exclusion test: any negative tag disqualifies the record.
pub fn is_excluded<R: Record + ?Sized>(expression: &TagExpression, record: &R) -> bool {
    expression.negative.iter().any(|tag| record.is_tagged(tag))
}

impl TagExpression {
    /// Whether `record` is routed by this expression. Exclusion wins over
    /// inclusion.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        is_candidate(self, record) && !is_excluded(self, record)
    }

    /// Matching records in slice order.
    pub fn select<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.matches(*record)).collect()
    }
}
