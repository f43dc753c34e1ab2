use super::draft::Draft;
use crate::api::{ApiError, Recipe, RecipeApi};
use crate::app::{AppEvent, Effect, Notice, Route, TaskKind};
use crate::image::ImagePipeline;
use crate::tasks::spawn_reporting;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const CREATED_MESSAGE: &str = "Your recipe has been posted!";
pub const CREATE_FAILED_MESSAGE: &str = "Something went wrong.";

/// The create-recipe form: draft state, photo selection and submission.
pub struct Composer {
    api: Arc<dyn RecipeApi>,
    event_tx: mpsc::Sender<AppEvent>,
    draft: Draft,
    submitting: bool,
}

impl Composer {
    pub fn new(api: Arc<dyn RecipeApi>, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            api,
            event_tx,
            draft: Draft::default(),
            submitting: false,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Runs the image pipeline and stores the result in the draft.
    ///
    /// The draft image is only replaced by a complete payload; a cancel keeps
    /// the previous image, a failure keeps it too and yields a notice.
    pub async fn pick_image(&mut self, pipeline: &ImagePipeline) -> Option<Effect> {
        match pipeline.acquire().await {
            Ok(Some(image)) => {
                tracing::debug!(
                    uri = %image.local_uri,
                    bytes = image.base64.len(),
                    "Image attached"
                );
                self.draft.image = Some(image);
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Image selection failed");
                Some(Effect::Notify(Notice::error(e.user_message())))
            }
        }
    }

    /// Validates the draft and sends it. Returns a notice when validation
    /// fails; nothing happens while a previous submit is in flight.
    pub fn submit(&mut self) -> Option<Effect> {
        if self.submitting {
            tracing::debug!("Submit ignored: create already in flight");
            return None;
        }
        let body = match self.draft.to_request() {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Draft rejected");
                return Some(Effect::Notify(Notice::error(e.to_string())));
            }
        };

        self.submitting = true;
        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();
        tracing::info!(
            title = %body.title,
            ingredients = body.ingredients.len(),
            steps = body.steps.len(),
            "Submitting recipe"
        );
        spawn_reporting(TaskKind::Create, self.event_tx.clone(), async move {
            let result = api.create(&body).await;
            let _ = tx.send(AppEvent::RecipeCreated { result }).await;
        });
        None
    }

    /// On success the draft is cleared and the user is sent back to the
    /// feed. On failure the draft is kept for another attempt.
    pub fn handle_created(&mut self, result: Result<Recipe, ApiError>) -> Vec<Effect> {
        self.submitting = false;
        match result {
            Ok(recipe) => {
                tracing::info!(id = %recipe.id, "Recipe created");
                self.draft.clear();
                vec![
                    Effect::Notify(Notice::success(CREATED_MESSAGE)),
                    Effect::Navigate(Route::FeedRoot),
                ]
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create recipe");
                vec![Effect::Notify(Notice::error(
                    e.user_message(CREATE_FAILED_MESSAGE),
                ))]
            }
        }
    }

    pub fn handle_task_panicked(&mut self) -> Effect {
        self.submitting = false;
        Effect::Notify(Notice::error(CREATE_FAILED_MESSAGE))
    }
}
