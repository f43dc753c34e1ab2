//! Background task plumbing shared by the controllers.

use crate::app::{AppEvent, TaskKind};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Returns a generation number never handed out before in this process.
///
/// Controllers tag each request with the generation current at issue time.
/// Drawing from one process-wide counter means a re-created controller can
/// never accept a result issued by the instance it replaced.
pub(crate) fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Wraps a future to catch panics and convert them to errors.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

/// Spawns a request task that reports through `event_tx`.
///
/// The task sends its own completion events. If it panics instead, an
/// [`AppEvent::TaskPanicked`] carrying `kind` is sent so the owner can clear
/// whatever in-flight state the task was holding.
pub(crate) fn spawn_reporting<F>(kind: TaskKind, event_tx: mpsc::Sender<AppEvent>, future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = catch_task_panic(future).await {
            tracing::error!(task = ?kind, error = %error, "Background task panicked");
            let _ = event_tx.send(AppEvent::TaskPanicked { task: kind, error }).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_unique_and_increasing() {
        let a = next_generation();
        let b = next_generation();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_panicking_task_reports_kind() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_reporting(TaskKind::Create, tx, async {
            panic!("boom");
        });

        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, TaskKind::Create);
                assert_eq!(error, "boom");
            }
            other => panic!("Expected TaskPanicked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completed_task_sends_nothing_extra() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_reporting(TaskKind::Create, tx, async {});
        // Sender dropped when the task finishes without panicking
        assert!(rx.recv().await.is_none());
    }
}
