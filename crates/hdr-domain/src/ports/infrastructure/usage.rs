//! Subscription usage accounting port

use crate::value_objects::OperationClass;

/// Metered usage per operation class for the current billing period
pub trait UsageTracker: Send + Sync {
    /// Usage recorded so far
    fn usage(&self, class: OperationClass) -> u64;

    /// Add to the recorded usage
    fn record(&self, class: OperationClass, amount: u64);

    /// Take one unit if usage is below `limit`, as a single atomic step.
    ///
    /// Returns false, without recording anything, once the limit is reached.
    fn try_acquire(&self, class: OperationClass, limit: u64) -> bool;

    /// Give back units taken for work that did not complete
    fn release(&self, class: OperationClass, amount: u64);

    /// Start a new billing period
    fn reset(&self);
}
