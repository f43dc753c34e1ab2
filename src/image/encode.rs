use super::{ImageError, PickedAsset};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::PathBuf;
use url::Url;

/// Content type used when the extension is missing or not an image type.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Extensions passed through as `image/<ext>`.
const KNOWN_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "webp", "heic", "heif", "bmp", "avif", "tiff",
];

/// Infers the payload content type from the local file's extension.
///
/// The extension is taken from the last path segment (query string and
/// fragment ignored) and lower-cased. Anything not in the known image set,
/// including a missing extension, falls back to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(local_uri: &str) -> String {
    let path = local_uri
        .split(['?', '#'])
        .next()
        .unwrap_or(local_uri);
    let file_name = path.rsplit('/').next().unwrap_or(path);

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| KNOWN_EXTENSIONS.contains(&ext.as_str()));

    match extension {
        Some(ext) => format!("image/{}", ext),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

/// `data:<content type>;base64,<payload>`
pub fn build_data_uri(local_uri: &str, base64_payload: &str) -> String {
    format!(
        "data:{};base64,{}",
        content_type_for(local_uri),
        base64_payload
    )
}

/// Returns the asset's base64 payload.
///
/// Uses the picker's inline payload when it returned one, otherwise reads the
/// picked file and encodes it (standard alphabet, padded), which yields the
/// same string for the same file. Payloads whose decoded size exceeds
/// `max_bytes` are rejected.
pub async fn resolve_payload(asset: &PickedAsset, max_bytes: u64) -> Result<String, ImageError> {
    if let Some(inline) = asset.base64.as_deref().filter(|b| !b.is_empty()) {
        let decoded_size = (inline.len() as u64 / 4) * 3;
        if decoded_size > max_bytes {
            return Err(ImageError::TooLarge {
                size: decoded_size,
                limit: max_bytes,
            });
        }
        tracing::debug!(bytes = decoded_size, "Using inline image payload");
        return Ok(inline.to_string());
    }

    let path = local_path(&asset.uri)?;

    // Size check before reading so an oversized file is never loaded
    let size = tokio::fs::metadata(&path).await?.len();
    if size > max_bytes {
        return Err(ImageError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(&path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Encoded image from file");
    Ok(STANDARD.encode(&bytes))
}

/// Maps a picker URI to a filesystem path: `file://` URIs and plain paths
/// are readable, other schemes are not.
fn local_path(uri: &str) -> Result<PathBuf, ImageError> {
    if uri.starts_with("file:") {
        return Url::parse(uri)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| ImageError::InvalidUri(uri.to_string()));
    }
    if uri.contains("://") {
        return Err(ImageError::InvalidUri(uri.to_string()));
    }
    Ok(PathBuf::from(uri))
}
