//! Creating and deleting recipes.
//!
//! - [`draft`]: form state, line parsing and validation
//! - [`create`]: [`Composer`], submission of a validated draft
//! - [`delete`]: [`DeleteCoordinator`], the per-item pending state

mod create;
mod delete;
mod draft;

pub use create::{Composer, CREATED_MESSAGE, CREATE_FAILED_MESSAGE};
pub use delete::{DeleteCoordinator, DELETED_MESSAGE, DELETE_FAILED_MESSAGE};
pub use draft::{parse_lines, Draft, ValidationError};
