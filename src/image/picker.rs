use super::ImageError;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Images,
}

/// Picker configuration.
///
/// The default is what recipe submission uses: images only, user-editable
/// crop at 4:3, capture quality 0.5 to keep the inline payload small, and
/// inline base64 requested where the platform can provide it.
#[derive(Debug, Clone, PartialEq)]
pub struct PickOptions {
    pub media: MediaKind,
    pub allows_editing: bool,
    /// Crop aspect ratio as (width, height).
    pub aspect: (u32, u32),
    /// Compression factor in `0.0..=1.0`.
    pub quality: f32,
    pub inline_base64: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            media: MediaKind::Images,
            allows_editing: true,
            aspect: (4, 3),
            quality: 0.5,
            inline_base64: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// What the picker returned for the chosen photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedAsset {
    /// Local URI of the (possibly cropped) file: a path or `file://` URI.
    pub uri: String,
    /// Inline payload, when the platform produced one.
    pub base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Cancelled,
    Picked(PickedAsset),
}

/// Device photo collaborator (gallery picker plus its permission gate).
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Whether gallery access must be granted before picking. Targets without
    /// a permission model (web, desktop file paths) return `false`.
    fn requires_permission(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ImageError>;

    async fn pick(&self, options: &PickOptions) -> Result<PickResult, ImageError>;
}

/// Desktop stand-in for the gallery: "picks" a file already chosen on the
/// command line.
///
/// It has no permission model and cannot crop or re-encode, so it never
/// returns an inline payload; the pipeline's file-read path encodes it.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageSource for LocalFileSource {
    fn requires_permission(&self) -> bool {
        false
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ImageError> {
        Ok(PermissionStatus::Granted)
    }

    async fn pick(&self, options: &PickOptions) -> Result<PickResult, ImageError> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        if !metadata.is_file() {
            return Err(ImageError::Picker(format!(
                "{} is not a regular file",
                self.path.display()
            )));
        }
        tracing::debug!(
            path = %self.path.display(),
            aspect = ?options.aspect,
            "Using local file as picked image (no crop or re-encode)"
        );
        Ok(PickResult::Picked(PickedAsset {
            uri: self.path.to_string_lossy().into_owned(),
            base64: None,
        }))
    }
}
