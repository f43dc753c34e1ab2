use crate::api::{ApiError, RecipeApi};
use crate::app::{AppEvent, Effect, Notice, TaskKind};
use crate::tasks::spawn_reporting;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const DELETED_MESSAGE: &str = "Recipe deleted";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete recipe";

/// Tracks the delete request in flight (`pending_id`).
///
/// Confirmation happens before [`start`](Self::start) is called, see
/// [`crate::app::App::request_delete`]. Removing the recipe from the lists
/// is left to the caller and only happens after the server acknowledged.
pub struct DeleteCoordinator {
    api: Arc<dyn RecipeApi>,
    event_tx: mpsc::Sender<AppEvent>,
    pending_id: Option<String>,
    in_flight: usize,
}

impl DeleteCoordinator {
    pub fn new(api: Arc<dyn RecipeApi>, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            api,
            event_tx,
            pending_id: None,
            in_flight: 0,
        }
    }

    pub fn pending_id(&self) -> Option<&str> {
        self.pending_id.as_deref()
    }

    /// Requests sent and not yet answered, across all ids.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending_id.as_deref() == Some(id)
    }

    /// Sends `DELETE /recipe/:id`. Ignored if that id is already pending.
    pub fn start(&mut self, id: &str) -> bool {
        if self.is_pending(id) {
            tracing::debug!(id, "Delete ignored: already pending");
            return false;
        }
        self.pending_id = Some(id.to_string());
        self.in_flight += 1;

        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();
        let owned = id.to_string();
        tracing::info!(id, "Deleting recipe");
        spawn_reporting(
            TaskKind::Delete { id: owned.clone() },
            self.event_tx.clone(),
            async move {
                let result = api.delete(&owned).await;
                let _ = tx.send(AppEvent::RecipeDeleted { id: owned, result }).await;
            },
        );
        true
    }

    /// Clears the pending id (if it still names `id`) and builds the
    /// notice. The caller removes the recipe on `Ok`.
    pub fn handle_deleted(&mut self, id: &str, result: &Result<(), ApiError>) -> Effect {
        self.abandon(id);
        match result {
            Ok(()) => {
                tracing::info!(id, "Recipe deleted");
                Effect::Notify(Notice::success(DELETED_MESSAGE))
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to delete recipe");
                Effect::Notify(Notice::error(e.user_message(DELETE_FAILED_MESSAGE)))
            }
        }
    }

    /// Marks the request for `id` as finished without a result. Clears
    /// `pending_id` if it still holds `id`.
    pub fn abandon(&mut self, id: &str) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.is_pending(id) {
            self.pending_id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::app::NoticeKind;

    #[tokio::test]
    async fn test_pending_cleared_on_both_outcomes() {
        let api = Arc::new(FakeApi::default());
        api.fail_delete("R2", Some("Not your recipe"));
        let (tx, mut rx) = mpsc::channel(4);
        let mut deletes = DeleteCoordinator::new(api, tx);

        for (id, expected) in [("R1", NoticeKind::Success), ("R2", NoticeKind::Error)] {
            assert!(deletes.start(id));
            assert_eq!(deletes.pending_id(), Some(id));
            let Some(AppEvent::RecipeDeleted { id: done, result }) = rx.recv().await else {
                panic!("Expected RecipeDeleted");
            };
            assert_eq!(done, id);
            let Effect::Notify(notice) = deletes.handle_deleted(&done, &result) else {
                panic!("Expected notice");
            };
            assert_eq!(notice.kind, expected);
            assert_eq!(deletes.pending_id(), None);
        }
    }

    #[tokio::test]
    async fn test_same_id_twice_is_ignored() {
        let api = Arc::new(FakeApi::default());
        let (tx, mut rx) = mpsc::channel(4);
        let mut deletes = DeleteCoordinator::new(api.clone(), tx);
        assert!(deletes.start("R1"));
        assert!(!deletes.start("R1"));
        rx.recv().await;
        assert_eq!(*api.deleted.lock().unwrap(), vec!["R1".to_string()]);
    }

    #[test]
    fn test_abandon_only_clears_matching_id() {
        let (tx, _rx) = mpsc::channel(1);
        let mut deletes = DeleteCoordinator::new(Arc::new(FakeApi::default()), tx);
        deletes.pending_id = Some("R2".into());
        deletes.in_flight = 2;
        deletes.abandon("R1");
        assert_eq!(deletes.in_flight(), 1);
        assert_eq!(deletes.pending_id(), Some("R2"));
        deletes.abandon("R2");
        assert_eq!(deletes.pending_id(), None);
        assert_eq!(deletes.in_flight(), 0);
    }
}
