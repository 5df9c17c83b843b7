//! Per-operation cancellation and deadline handling

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::DomainError;

/// Cancellation signal and optional deadline carried by every service call.
///
/// Storage futures are raced against both; whichever fires first drops the
/// in-flight future, so no stale or partial result is ever returned.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Attach an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Trigger cancellation for every operation sharing this context
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `fut` unless the context is cancelled or its deadline passes first.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(operation, "Storage call cancelled");
                Err(DomainError::Cancelled)
            }
            _ = expired => {
                warn!(operation, "Storage call exceeded deadline");
                Err(DomainError::timeout(format!("{} exceeded its deadline", operation)))
            }
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_passes_result_through() {
        let ctx = OperationContext::background();
        let value = ctx.run("noop", async { Ok::<_, DomainError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_pre_cancelled_context_short_circuits() {
        let ctx = OperationContext::background();
        ctx.cancel();

        let result = ctx
            .run("never", async { Err::<(), _>(DomainError::internal("polled")) })
            .await;
        assert!(matches!(result, Err(DomainError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_yields_timeout() {
        let ctx = OperationContext::with_timeout(Duration::from_millis(50));

        let result = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DomainError>(())
            })
            .await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_call() {
        let token = CancellationToken::new();
        let ctx = OperationContext::background().with_cancellation(token.clone());

        let handle = tokio::spawn(async move {
            ctx.run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DomainError>(())
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(DomainError::Cancelled)));
    }
}
