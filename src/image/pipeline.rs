use super::{
    resolve_payload, EncodedImage, ImageError, ImageSource, PermissionStatus, PickOptions,
    PickResult,
};
use std::sync::Arc;

/// Permission -> pick -> resolve payload.
///
/// Produces either a complete [`EncodedImage`] or nothing: callers only
/// write to their draft after [`ImagePipeline::acquire`] returns
/// `Ok(Some(_))`, so a cancelled or failed pick never leaves a half-updated
/// image behind.
pub struct ImagePipeline {
    source: Arc<dyn ImageSource>,
    options: PickOptions,
    max_bytes: u64,
}

impl ImagePipeline {
    pub fn new(source: Arc<dyn ImageSource>, max_bytes: u64) -> Self {
        Self {
            source,
            options: PickOptions::default(),
            max_bytes,
        }
    }

    /// Returns `Ok(None)` when the user cancels the picker.
    pub async fn acquire(&self) -> Result<Option<EncodedImage>, ImageError> {
        if self.source.requires_permission() {
            match self.source.request_permission().await? {
                PermissionStatus::Granted => {}
                PermissionStatus::Denied => {
                    tracing::info!("Gallery permission denied, image pick aborted");
                    return Err(ImageError::PermissionDenied);
                }
            }
        }

        let asset = match self.source.pick(&self.options).await? {
            PickResult::Cancelled => {
                tracing::debug!("Image pick cancelled");
                return Ok(None);
            }
            PickResult::Picked(asset) => asset,
        };

        let base64 = resolve_payload(&asset, self.max_bytes).await?;
        Ok(Some(EncodedImage {
            local_uri: asset.uri,
            base64,
        }))
    }
}
