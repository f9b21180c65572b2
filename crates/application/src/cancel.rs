use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};

/// Runs `step` unless `cancel` fires first.
///
/// An already-cancelled token wins without polling `step`, so no I/O is
/// started after cancellation.
pub async fn cancellable<T, E, F>(cancel: &CancellationToken, step: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<AppError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = step => result.map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { Ok::<_, AppError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_step() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let started = AtomicBool::new(false);

        let result = cancellable(&cancel, async {
            started.store(true, Ordering::SeqCst);
            Ok::<_, AppError>(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_step() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move { trigger.cancel() });

        let stalled = std::future::pending::<std::result::Result<(), AppError>>();
        let result = cancellable(&cancel, stalled).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
