//! Paginated recipe feed.
//!
//! - [`controller`] - page/phase state and the load, load-more and refresh triggers
//! - [`merge`] - id-deduplicating append used when a later page arrives
//! - [`refresh`] - minimum-visible-duration hold for pull-to-refresh
//!
//! # Example
//!
//! ```ignore
//! let mut feed = FeedController::new(api, event_tx, FeedSettings::default());
//! feed.load_initial();
//! // ... App::handle_event applies AppEvent::FeedPage ...
//! feed.load_more();
//! ```

mod controller;
mod merge;
mod refresh;

pub use controller::{
    FeedController, FeedPhase, FeedSettings, DEFAULT_PAGE_LIMIT, FETCH_FAILED_MESSAGE,
};
pub use merge::{merge, RecentDeletes, RECENT_DELETES_CAP};
pub use refresh::{hold_for_floor, DEFAULT_REFRESH_FLOOR};
