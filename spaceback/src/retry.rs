//! Bounded retry for fallible multi-step restore operations.

use std::{fmt::Display, future::Future};

use tracing::warn;

/// Default attempt bound for retried restore steps.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Invokes `operation` up to `max_attempts` times, stopping at the first
/// success. Every failure is logged with its attempt number; exhausting
/// all attempts logs a final failure and yields `None`.
///
/// This is the engine's only structured failure-recovery primitive. A
/// `None` result marks the wrapped step best-effort-failed; it never
/// aborts sibling steps.
pub async fn execute_with_retry<T, E, Fut, F>(
    label: &str,
    max_attempts: u32,
    mut operation: F,
) -> Option<T>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(value) => return Some(value),
            Err(err) => {
                warn!(step = label, attempt, error = %err, "restore step failed");
            }
        }
    }
    warn!(
        step = label,
        max_attempts, "restore step failed after all attempts"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_always_failing_operation_runs_exactly_max_attempts() {
        let calls = Cell::new(0u32);
        let result: Option<()> = execute_with_retry("doomed", 3, || {
            calls.set(calls.get() + 1);
            async { Err("boom") }
        })
        .await;
        assert_eq!(calls.get(), 3);
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = Cell::new(0u32);
        let result = execute_with_retry("flaky", 5, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 { Err("not yet") } else { Ok(n) }
            }
        })
        .await;
        assert_eq!(result, Some(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_yields_none() {
        let result = execute_with_retry("skipped", 0, || async { Ok::<(), &str>(()) }).await;
        assert!(result.is_none());
    }
}
