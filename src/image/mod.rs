//! Photo acquisition and encoding for recipe submissions.
//!
//! A picked photo becomes an [`EncodedImage`]: the local URI (for preview and
//! content-type inference) plus its base64 payload. The payload is later
//! rendered as `data:<mime>;base64,<payload>` in the create request.
//!
//! - [`picker`]: the device collaborator ([`ImageSource`]) and picker options
//! - [`encode`]: payload resolution and data URI construction
//! - [`pipeline`]: permission -> pick -> resolve, all-or-nothing

mod encode;
mod picker;
mod pipeline;

use thiserror::Error;

pub use encode::{build_data_uri, content_type_for, resolve_payload, DEFAULT_CONTENT_TYPE};
pub use picker::{
    ImageSource, LocalFileSource, MediaKind, PermissionStatus, PickOptions, PickResult,
    PickedAsset,
};
pub use pipeline::ImagePipeline;

#[cfg(test)]
pub(crate) use pipeline::tests::FakeGallery;

/// Shown when gallery access is denied.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "The app needs gallery permission to upload an image";

/// Shown for every other pipeline failure.
pub const PICK_FAILED_MESSAGE: &str = "There was a problem selecting the image";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Gallery permission denied")]
    PermissionDenied,
    #[error("Image picker failed: {0}")]
    Picker(String),
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image too large: {size} bytes (max {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("Unsupported image location: {0}")]
    InvalidUri(String),
}

impl ImageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ImageError::PermissionDenied => PERMISSION_DENIED_MESSAGE,
            _ => PICK_FAILED_MESSAGE,
        }
    }
}

/// A resolved photo ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub local_uri: String,
    pub base64: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        build_data_uri(&self.local_uri, &self.base64)
    }
}
