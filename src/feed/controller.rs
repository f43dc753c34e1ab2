use super::merge::{merge, RecentDeletes};
use super::refresh::{run_refresh, DEFAULT_REFRESH_FLOOR};
use crate::api::{ApiError, Recipe, RecipeApi, RecipePage};
use crate::app::{AppEvent, Effect, Notice, PageRequest, TaskKind};
use crate::tasks::{next_generation, spawn_reporting};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Default page size for `GET /recipe`.
pub const DEFAULT_PAGE_LIMIT: u32 = 5;

/// Fallback notification when a user-initiated feed load fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch recipes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_limit: u32,
    pub refresh_floor: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            refresh_floor: DEFAULT_REFRESH_FLOOR,
        }
    }
}

/// What the feed is doing right now. Exactly one page request can be in
/// flight, so one enum replaces separate loading/refreshing flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    LoadingInitial,
    LoadingMore,
    /// Covers the request *and* the floor delay after it.
    Refreshing,
}

/// Paginated feed state and the operations that change it.
///
/// Owned by a single task (see [`crate::app::App`]): triggers run on
/// `&mut self`, so checking the phase and starting a request is one atomic
/// step. Requests run in spawned tasks that answer with
/// [`AppEvent::FeedPage`]; results tagged with a generation other than the
/// current one are dropped.
pub struct FeedController {
    api: Arc<dyn RecipeApi>,
    event_tx: mpsc::Sender<AppEvent>,
    settings: FeedSettings,
    /// Arc so views can take a snapshot in O(1)
    items: Arc<Vec<Recipe>>,
    page: u32,
    /// 0 until the first successful load, so `has_more()` starts false
    total_pages: u32,
    phase: FeedPhase,
    generation: u64,
    deleted: RecentDeletes,
}

impl FeedController {
    pub fn new(
        api: Arc<dyn RecipeApi>,
        event_tx: mpsc::Sender<AppEvent>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            api,
            event_tx,
            settings,
            items: Arc::new(Vec::new()),
            page: 1,
            total_pages: 0,
            phase: FeedPhase::Idle,
            generation: next_generation(),
            deleted: RecentDeletes::default(),
        }
    }

    pub fn items(&self) -> &Arc<Vec<Recipe>> {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Always derived, never stored.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, FeedPhase::LoadingInitial | FeedPhase::LoadingMore)
    }

    pub fn is_refreshing(&self) -> bool {
        self.phase == FeedPhase::Refreshing
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Requests page 1 and replaces the list with it. Starts a new epoch.
    ///
    /// Returns `false` (and does nothing) while another request is in flight.
    pub fn load_initial(&mut self) -> bool {
        if self.phase != FeedPhase::Idle {
            tracing::debug!(phase = ?self.phase, "load_initial dropped: request in flight");
            return false;
        }
        self.generation = next_generation();
        self.phase = FeedPhase::LoadingInitial;
        self.spawn_page(1, PageRequest::Initial);
        true
    }

    /// Requests the next page and merges it into the list.
    ///
    /// No network call and no state change unless there are more pages and
    /// nothing is loading or refreshing.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() || self.phase != FeedPhase::Idle {
            return false;
        }
        let page = self.page + 1;
        self.phase = FeedPhase::LoadingMore;
        self.spawn_page(page, PageRequest::More { page });
        true
    }

    /// Pull-to-refresh: reloads page 1 (wholesale replace) and keeps
    /// [`FeedPhase::Refreshing`] for at least the configured floor.
    pub fn refresh(&mut self) -> bool {
        if self.phase != FeedPhase::Idle {
            tracing::debug!(phase = ?self.phase, "refresh dropped: request in flight");
            return false;
        }
        self.generation = next_generation();
        self.phase = FeedPhase::Refreshing;

        let started = Instant::now();
        let generation = self.generation;
        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();
        let limit = self.settings.page_limit;
        let floor = self.settings.refresh_floor;
        spawn_reporting(
            TaskKind::FeedPage { generation },
            self.event_tx.clone(),
            run_refresh(api, tx, generation, limit, floor, started),
        );
        tracing::info!(generation, "Feed refresh started");
        true
    }

    /// Drops all state and starts a new epoch (the feed view went away).
    /// Results of requests still in flight will be discarded.
    pub fn detach(&mut self) {
        self.generation = next_generation();
        self.items = Arc::new(Vec::new());
        self.page = 1;
        self.total_pages = 0;
        self.phase = FeedPhase::Idle;
    }

    /// Removes a deleted recipe by id; `true` if it was present. Pages still
    /// in flight will not bring it back.
    pub fn remove(&mut self, id: &str) -> bool {
        self.deleted.record(id);
        if !self.items.iter().any(|r| r.id == id) {
            return false;
        }
        Arc::make_mut(&mut self.items).retain(|r| r.id != id);
        true
    }

    fn spawn_page(&self, page: u32, request: PageRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();
        let generation = self.generation;
        let limit = self.settings.page_limit;
        tracing::debug!(generation, page, ?request, "Requesting feed page");

        spawn_reporting(
            TaskKind::FeedPage { generation },
            self.event_tx.clone(),
            async move {
                let result = api.list_page(page, limit).await;
                let _ = tx
                    .send(AppEvent::FeedPage {
                        generation,
                        request,
                        result,
                    })
                    .await;
            },
        );
    }

    /// Applies a page result. Returns a notification for failed
    /// user-initiated loads; `load_more` failures are only logged, the next
    /// scroll is the retry.
    pub fn handle_page(
        &mut self,
        generation: u64,
        request: PageRequest,
        result: Result<RecipePage, ApiError>,
    ) -> Option<Effect> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                ?request,
                "Discarding stale feed page"
            );
            return None;
        }

        // Refreshing stays set until the floor elapses (FeedRefreshSettled)
        if request != PageRequest::Refresh {
            self.phase = FeedPhase::Idle;
        }

        match result {
            Ok(data) => {
                let recipes = self.deleted.filter(data.recipes);
                match request {
                    PageRequest::Initial | PageRequest::Refresh => {
                        self.items = Arc::new(recipes);
                        self.page = 1;
                    }
                    PageRequest::More { page } => {
                        let existing = std::mem::take(Arc::make_mut(&mut self.items));
                        let before = existing.len();
                        let merged = merge(existing, recipes);
                        tracing::debug!(
                            page,
                            added = merged.len() - before,
                            "Merged feed page"
                        );
                        self.items = Arc::new(merged);
                        self.page = page;
                    }
                }
                self.total_pages = data.total_pages;
                None
            }
            Err(e) => match request {
                PageRequest::More { page } => {
                    tracing::warn!(page, error = %e, "Failed to load more recipes");
                    None
                }
                PageRequest::Initial | PageRequest::Refresh => {
                    tracing::warn!(?request, error = %e, "Failed to fetch recipes");
                    Some(Effect::Notify(Notice::error(
                        e.user_message(FETCH_FAILED_MESSAGE),
                    )))
                }
            },
        }
    }

    pub fn handle_refresh_settled(&mut self, generation: u64) {
        if generation == self.generation && self.phase == FeedPhase::Refreshing {
            self.phase = FeedPhase::Idle;
        }
    }

    /// A request task panicked: clear its phase if it belongs to this epoch.
    pub fn handle_task_panicked(&mut self, generation: u64) {
        if generation == self.generation {
            self.phase = FeedPhase::Idle;
        }
    }
}
