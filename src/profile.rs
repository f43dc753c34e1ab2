//! The signed-in user's own recipes (`GET /recipe/user`).
//!
//! Unpaginated. Deletes are issued from this list, so a successful delete
//! removes the recipe here as well as from the feed.

use crate::api::{ApiError, Recipe, RecipeApi};
use crate::app::{AppEvent, Effect, Notice, TaskKind};
use crate::feed::RecentDeletes;
use crate::tasks::{next_generation, spawn_reporting};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Delay before the pull-to-refresh request is sent.
pub const DEFAULT_PROFILE_REFRESH_DELAY: Duration = Duration::from_millis(500);

pub const PROFILE_LOAD_FAILED_MESSAGE: &str =
    "Failed to load profile data. Pull down to refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePhase {
    Idle,
    Loading,
    Refreshing,
}

pub struct ProfileController {
    api: Arc<dyn RecipeApi>,
    event_tx: mpsc::Sender<AppEvent>,
    refresh_delay: Duration,
    items: Arc<Vec<Recipe>>,
    phase: ProfilePhase,
    generation: u64,
    deleted: RecentDeletes,
}

impl ProfileController {
    pub fn new(
        api: Arc<dyn RecipeApi>,
        event_tx: mpsc::Sender<AppEvent>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            api,
            event_tx,
            refresh_delay,
            items: Arc::new(Vec::new()),
            phase: ProfilePhase::Idle,
            generation: next_generation(),
            deleted: RecentDeletes::default(),
        }
    }

    pub fn items(&self) -> &Arc<Vec<Recipe>> {
        &self.items
    }

    pub fn phase(&self) -> ProfilePhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn load(&mut self) -> bool {
        self.start(ProfilePhase::Loading, Duration::ZERO)
    }

    /// Like [`load`](Self::load), but waits the configured delay before the
    /// request goes out.
    pub fn refresh(&mut self) -> bool {
        self.start(ProfilePhase::Refreshing, self.refresh_delay)
    }

    fn start(&mut self, phase: ProfilePhase, delay: Duration) -> bool {
        if self.phase != ProfilePhase::Idle {
            return false;
        }
        self.generation = next_generation();
        self.phase = phase;

        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();
        let generation = self.generation;
        spawn_reporting(
            TaskKind::Profile { generation },
            self.event_tx.clone(),
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let result = api.list_mine().await;
                let _ = tx
                    .send(AppEvent::ProfileLoaded { generation, result })
                    .await;
            },
        );
        true
    }

    pub fn handle_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Recipe>, ApiError>,
    ) -> Option<Effect> {
        if generation != self.generation {
            tracing::debug!(generation, "Discarding stale profile result");
            return None;
        }
        self.phase = ProfilePhase::Idle;
        match result {
            Ok(recipes) => {
                tracing::debug!(count = recipes.len(), "Own recipes loaded");
                self.items = Arc::new(self.deleted.filter(recipes));
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load own recipes");
                Some(Effect::Notify(Notice::error(
                    e.user_message(PROFILE_LOAD_FAILED_MESSAGE),
                )))
            }
        }
    }

    pub fn handle_task_panicked(&mut self, generation: u64) {
        if generation == self.generation {
            self.phase = ProfilePhase::Idle;
        }
    }

    /// Removes a deleted recipe; a load already in flight will not bring it
    /// back.
    pub fn remove(&mut self, id: &str) -> bool {
        self.deleted.record(id);
        if !self.items.iter().any(|r| r.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.items).retain(|r| r.id != id);
        true
    }
}
