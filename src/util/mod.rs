//! Utility functions for common operations.
//!
//! - **Base URL validation**: HTTPS policy for the API endpoint the bearer
//!   token is sent to
//! - **Text processing**: Unicode-aware truncation and the compact recipe
//!   card previews
//!
//! # Examples
//!
//! ```
//! use dapur::util::{truncate_to_width, validate_base_url};
//!
//! let base = validate_base_url("https://api.example.com/api").unwrap();
//! assert_eq!(base.scheme(), "https");
//!
//! assert_eq!(truncate_to_width("Tumis bumbu", 5), "Tumis...");
//! ```

mod text;
mod url_validator;

pub use text::{
    format_date, ingredients_preview, step_preview, strip_control_chars, truncate_to_width,
    INGREDIENT_PREVIEW_COUNT, STEP_PREVIEW_WIDTH,
};
pub use url_validator::{validate_base_url, UrlValidationError};
