//! Image selection and encoding.
//!
//! An [`ImageInput`] is what the user picked; an [`EncodedImagePart`] is what goes on the
//! wire. Encoding reads the whole file, base64-encodes it and tags it with the media type.

use crate::error::{PhysiSolveError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Short description of the selected image shown in place of a thumbnail.
///
/// Owned by its [`ImageInput`], so replacing or clearing the image releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_name: String,
    pub size_bytes: u64,
}

impl std::fmt::Display for ImagePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kib = self.size_bytes as f64 / 1024.0;
        write!(f, "{} ({:.1} KiB)", self.file_name, kib)
    }
}

/// An image the user selected, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    path: PathBuf,
    media_type: String,
    preview: ImagePreview,
}

impl ImageInput {
    /// Select an image by path, inferring the media type from its extension.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let media_type = media_type_for_path(&path).ok_or_else(|| {
            PhysiSolveError::ReadError(format!(
                "{} is not a supported image type",
                path.display()
            ))
        })?;
        Self::with_media_type(path, media_type).await
    }

    /// Select an image whose media type was declared by the caller.
    ///
    /// The declared type must be an `image/*` type.
    pub async fn with_media_type(
        path: impl Into<PathBuf>,
        media_type: impl Into<String>,
    ) -> Result<Self> {
        let path = path.into();
        let media_type = media_type.into();

        if !media_type.starts_with("image/") {
            return Err(PhysiSolveError::ReadError(format!(
                "{} has media type {}, expected an image",
                path.display(),
                media_type
            )));
        }

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| PhysiSolveError::ReadError(format!("{}: {}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(PhysiSolveError::ReadError(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path,
            media_type,
            preview: ImagePreview {
                file_name,
                size_bytes: metadata.len(),
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn preview(&self) -> &ImagePreview {
        &self.preview
    }
}

/// Base64 image payload plus its media type, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePart {
    pub data: String,
    pub media_type: String,
}

impl EncodedImagePart {
    /// Parse a pasted `data:<media>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let header = uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(',').map(|(header, _)| header))
            .ok_or_else(|| PhysiSolveError::ReadError("not a data URI".to_string()))?;

        let media_type = header.split(';').next().unwrap_or_default();
        if !media_type.starts_with("image/") {
            return Err(PhysiSolveError::ReadError(format!(
                "data URI has media type {:?}, expected an image",
                media_type
            )));
        }
        if !header.split(';').any(|param| param == "base64") {
            return Err(PhysiSolveError::ReadError(
                "data URI is not base64-encoded".to_string(),
            ));
        }

        let data = strip_data_uri_prefix(uri);
        if data.is_empty() {
            return Err(PhysiSolveError::ReadError("data URI has no payload".to_string()));
        }

        Ok(Self {
            data: data.to_string(),
            media_type: media_type.to_string(),
        })
    }
}

/// Read the selected image fully and encode it.
pub async fn encode_image(input: &ImageInput) -> Result<EncodedImagePart> {
    let bytes = tokio::fs::read(input.path()).await.map_err(|e| {
        PhysiSolveError::ReadError(format!("{}: {}", input.path().display(), e))
    })?;

    if bytes.is_empty() {
        return Err(PhysiSolveError::ReadError(format!(
            "{} is empty",
            input.path().display()
        )));
    }

    debug!("Encoding {} bytes of {}", bytes.len(), input.media_type());
    Ok(encode_bytes(&bytes, input.media_type()))
}

/// Encode raw image bytes.
pub fn encode_bytes(bytes: &[u8], media_type: &str) -> EncodedImagePart {
    let encoded = STANDARD.encode(bytes);
    EncodedImagePart {
        data: strip_data_uri_prefix(&encoded).to_string(),
        media_type: media_type.to_string(),
    }
}

/// Drop a leading `data:...,` scheme prefix, up to and including the first comma.
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    if !encoded.starts_with("data:") {
        return encoded;
    }
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

/// Media type for a file extension, if it names an image format.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(media_type)
}
