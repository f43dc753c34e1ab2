use crate::api::RecipeApi;
use crate::app::{AppEvent, PageRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Default minimum time the refresh indicator stays visible.
pub const DEFAULT_REFRESH_FLOOR: Duration = Duration::from_millis(800);

/// Sleeps for whatever is left of `floor` since `started`, if anything.
///
/// Total duration is `max(floor, work)`: the floor only pads fast work and
/// never adds to slow work.
pub async fn hold_for_floor(started: Instant, floor: Duration) {
    let remaining = floor.saturating_sub(started.elapsed());
    if !remaining.is_zero() {
        tokio::time::sleep(remaining).await;
    }
}

/// Body of a pull-to-refresh task.
///
/// The page-1 result is reported as soon as it arrives, so fresh items are
/// committed immediately; [`AppEvent::FeedRefreshSettled`] follows once the
/// floor since `started` has elapsed, also when the request failed.
pub(crate) async fn run_refresh(
    api: Arc<dyn RecipeApi>,
    event_tx: mpsc::Sender<AppEvent>,
    generation: u64,
    limit: u32,
    floor: Duration,
    started: Instant,
) {
    let result = api.list_page(1, limit).await;
    let _ = event_tx
        .send(AppEvent::FeedPage {
            generation,
            request: PageRequest::Refresh,
            result,
        })
        .await;

    hold_for_floor(started, floor).await;
    tracing::debug!(
        generation,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Refresh settled"
    );
    let _ = event_tx
        .send(AppEvent::FeedRefreshSettled { generation })
        .await;
}
