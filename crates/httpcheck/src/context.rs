//! Test context collaborators.
//!
//! The checker never panics or aborts on its own; every assertion mismatch
//! and internal error is handed to the bound [`TestContext`]. The two
//! implementations here cover the common cases: [`PanicContext`] for
//! conventional fail-fast tests and [`FailureLog`] for collecting every
//! failure from a chain and inspecting them afterwards.

use parking_lot::Mutex;
use std::sync::Arc;

/// A failure sink for assertion outcomes.
///
/// Implementations record the message however they see fit; the checker
/// continues its chain after reporting, so a context that wants fail-fast
/// behavior must panic itself (as [`PanicContext`] does).
pub trait TestContext: Send + Sync {
    /// Records a non-fatal assertion failure.
    fn fail(&self, message: String);
}

/// A cheaply cloneable context that records every failure.
///
/// Tests hold a clone, run the chain, then inspect the collected messages.
///
/// # Example
///
/// ```ignore
/// let log = FailureLog::new();
/// let mut checker = Checker::with_context(log.clone(), handler);
///
/// checker.test("get", "/missing").check().await.has_status(200);
///
/// assert_eq!(log.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct FailureLog {
    failures: Arc<Mutex<Vec<String>>>,
}

impl FailureLog {
    /// Creates an empty failure log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded failure messages.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns true if no failures have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl TestContext for FailureLog {
    fn fail(&self, message: String) {
        tracing::debug!(failure = %message, "assertion failed");
        self.failures.lock().push(message);
    }
}

/// A context that panics on the first failure.
///
/// This is the default for [`Checker::new`](crate::Checker::new) and gives
/// the conventional Rust test behavior: the first mismatch fails the test
/// immediately with the assertion message.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicContext;

impl TestContext for PanicContext {
    fn fail(&self, message: String) {
        panic!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_log_collects() {
        let log = FailureLog::new();
        assert!(log.is_empty());

        log.fail("first".to_string());
        log.fail("second".to_string());

        assert_eq!(log.len(), 2);
        assert_eq!(log.failures(), vec!["first", "second"]);
    }

    #[test]
    fn test_failure_log_clones_share_state() {
        let log = FailureLog::new();
        let clone = log.clone();

        clone.fail("recorded through clone".to_string());

        assert_eq!(log.len(), 1);
        assert_eq!(log.failures()[0], "recorded through clone");
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_panic_context_panics() {
        PanicContext.fail("boom".to_string());
    }
}
