use crate::api::{ApiError, Recipe, RecipeApi, RecipePage};
use crate::auth::AuthStore;
use crate::config::Settings;
use crate::feed::FeedController;
use crate::image::{ImagePipeline, ImageSource};
use crate::mutation::{Composer, DeleteCoordinator};
use crate::profile::ProfileController;
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================================================
// Effects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-visible notification (alert, toast or stderr line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Navigation targets the core may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The feed at the root of the tab stack.
    FeedRoot,
    SignIn,
}

/// Output of state transitions, carried out by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notice),
    Navigate(Route),
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecipe { id: String, title: String },
    Logout,
}

/// Text for the confirmation dialog of a [`ConfirmAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

impl ConfirmAction {
    pub fn prompt(&self) -> ConfirmPrompt {
        match self {
            ConfirmAction::DeleteRecipe { .. } => ConfirmPrompt {
                title: "Delete Recipe",
                message: "Are you sure you want to delete this recipe?",
                confirm_label: "Delete",
                cancel_label: "Cancel",
            },
            ConfirmAction::Logout => ConfirmPrompt {
                title: "Log Out",
                message: "Are you sure you want to log out of your account?",
                confirm_label: "Log Out",
                cancel_label: "Cancel",
            },
        }
    }
}

// ============================================================================
// Content and Event Types
// ============================================================================

/// Which kind of feed request produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Initial,
    More { page: u32 },
    Refresh,
}

/// Identifies a background task in [`AppEvent::TaskPanicked`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    FeedPage { generation: u64 },
    Profile { generation: u64 },
    Create,
    Delete { id: String },
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A feed page request finished.
    ///
    /// Fields:
    /// - `generation`: Feed generation when the request was issued
    /// - `request`: What the page was requested for
    /// - `result`: The page or the error from fetching
    FeedPage {
        generation: u64,
        request: PageRequest,
        result: Result<RecipePage, ApiError>,
    },
    /// The refresh floor elapsed; the refresh indicator may go away.
    FeedRefreshSettled { generation: u64 },
    ProfileLoaded {
        generation: u64,
        result: Result<Vec<Recipe>, ApiError>,
    },
    RecipeCreated { result: Result<Recipe, ApiError> },
    RecipeDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: The task that panicked
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: TaskKind, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Owner of all client state.
///
/// Lives on one task. Controllers spawn their network work and the results
/// come back through the `AppEvent` channel; feed them to
/// [`handle_event`](Self::handle_event) in the order received.
pub struct App {
    pub feed: FeedController,
    pub profile: ProfileController,
    pub composer: Composer,
    pub deletes: DeleteCoordinator,
    pub pending_confirm: Option<ConfirmAction>,
    images: ImagePipeline,
    auth: Arc<dyn AuthStore>,
}

impl App {
    pub fn new(
        api: Arc<dyn RecipeApi>,
        auth: Arc<dyn AuthStore>,
        images: Arc<dyn ImageSource>,
        settings: Settings,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            feed: FeedController::new(Arc::clone(&api), event_tx.clone(), settings.feed),
            profile: ProfileController::new(
                Arc::clone(&api),
                event_tx.clone(),
                settings.profile_refresh_delay,
            ),
            composer: Composer::new(Arc::clone(&api), event_tx.clone()),
            deletes: DeleteCoordinator::new(api, event_tx),
            pending_confirm: None,
            images: ImagePipeline::new(images, settings.max_image_bytes),
            auth,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.token().is_some()
    }

    /// Picks a photo for the draft.
    pub async fn pick_image(&mut self) -> Option<Effect> {
        self.composer.pick_image(&self.images).await
    }

    /// First step of a delete. Returns the dialog text, or `None` when a
    /// delete of this id is already in flight.
    pub fn request_delete(&mut self, id: &str, title: &str) -> Option<ConfirmPrompt> {
        if self.deletes.is_pending(id) {
            return None;
        }
        let action = ConfirmAction::DeleteRecipe {
            id: id.to_string(),
            title: title.to_string(),
        };
        let prompt = action.prompt();
        self.pending_confirm = Some(action);
        Some(prompt)
    }

    pub fn request_logout(&mut self) -> ConfirmPrompt {
        let action = ConfirmAction::Logout;
        let prompt = action.prompt();
        self.pending_confirm = Some(action);
        prompt
    }

    /// Dismisses the pending dialog without side effects.
    pub fn cancel(&mut self) {
        if let Some(action) = self.pending_confirm.take() {
            tracing::debug!(?action, "Confirmation cancelled");
        }
    }

    /// Carries out the pending dialog's action.
    pub fn confirm(&mut self) -> Vec<Effect> {
        match self.pending_confirm.take() {
            Some(ConfirmAction::DeleteRecipe { id, title }) => {
                tracing::debug!(id = %id, title = %title, "Delete confirmed");
                self.deletes.start(&id);
                Vec::new()
            }
            Some(ConfirmAction::Logout) => {
                self.auth.logout();
                tracing::info!("Logged out");
                vec![Effect::Navigate(Route::SignIn)]
            }
            None => Vec::new(),
        }
    }

    /// Applies a background task result.
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::FeedPage {
                generation,
                request,
                result,
            } => self
                .feed
                .handle_page(generation, request, result)
                .into_iter()
                .collect(),
            AppEvent::FeedRefreshSettled { generation } => {
                self.feed.handle_refresh_settled(generation);
                Vec::new()
            }
            AppEvent::ProfileLoaded { generation, result } => self
                .profile
                .handle_loaded(generation, result)
                .into_iter()
                .collect(),
            AppEvent::RecipeCreated { result } => self.composer.handle_created(result),
            AppEvent::RecipeDeleted { id, result } => {
                let effect = self.deletes.handle_deleted(&id, &result);
                if result.is_ok() {
                    let in_feed = self.feed.remove(&id);
                    let in_profile = self.profile.remove(&id);
                    tracing::debug!(id = %id, in_feed, in_profile, "Removed deleted recipe");
                }
                vec![effect]
            }
            AppEvent::TaskPanicked { task, error } => {
                tracing::error!(?task, error = %error, "Task panicked");
                match task {
                    TaskKind::FeedPage { generation } => {
                        self.feed.handle_task_panicked(generation);
                        Vec::new()
                    }
                    TaskKind::Profile { generation } => {
                        self.profile.handle_task_panicked(generation);
                        Vec::new()
                    }
                    TaskKind::Create => vec![self.composer.handle_task_panicked()],
                    TaskKind::Delete { id } => {
                        self.deletes.abandon(&id);
                        vec![Effect::Notify(Notice::error(
                            crate::mutation::DELETE_FAILED_MESSAGE,
                        ))]
                    }
                }
            }
        }
    }

    /// True while any request is in flight (or a refresh is holding).
    pub fn is_busy(&self) -> bool {
        self.feed.phase() != crate::feed::FeedPhase::Idle
            || self.profile.phase() != crate::profile::ProfilePhase::Idle
            || self.composer.is_submitting()
            || self.deletes.in_flight() > 0
    }

    /// Applies events until nothing is in flight; returns the collected
    /// effects. For drivers without their own event loop.
    pub async fn settle(&mut self, event_rx: &mut mpsc::Receiver<AppEvent>) -> Vec<Effect> {
        let mut effects = Vec::new();
        while self.is_busy() {
            match event_rx.recv().await {
                Some(event) => effects.extend(self.handle_event(event)),
                None => break,
            }
        }
        effects
    }
}
