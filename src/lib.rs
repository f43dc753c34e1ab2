//! Client core for a recipe-sharing service.
//!
//! - [`feed`]: the paginated public feed with dedup merge and refresh floor
//! - [`profile`]: the signed-in user's own recipes
//! - [`image`]: photo acquisition, base64 payload and data URI
//! - [`mutation`]: create (draft validation) and confirm-then-delete
//! - [`app`]: the owner of all of the above, driven by [`app::AppEvent`]s
//! - [`api`]: HTTP contract and client

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod feed;
pub mod image;
pub mod mutation;
pub mod profile;
pub mod util;

mod tasks;
