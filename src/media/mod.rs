//! Local object storage for uploaded images.
//!
//! Files live in a flat directory and are addressed publicly as
//! `{base}/media/{filename}`. Replacement uploads the new file before
//! touching the old one, so a failed upload never loses the only good image.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;

/// Upload size cap.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted upload MIME types.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/svg+xml",
    "image/gif",
];

/// Filesystem-backed image store.
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
}

impl MediaStore {
    pub fn new(root: PathBuf, public_base_url: &str) -> Self {
        Self {
            root,
            public_base: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check an upload against the MIME allow-list and size cap.
    /// Pure check; no side effects.
    pub fn validate_image(content_type: &str, size: u64) -> Result<(), AppError> {
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported image type {}; expected one of jpeg, png, webp, svg, gif",
                content_type
            )));
        }
        if size > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(format!(
                "Image is {} bytes; the limit is {} bytes",
                size, MAX_IMAGE_BYTES
            )));
        }
        Ok(())
    }

    /// Write an image and return its public URL.
    ///
    /// When `name` is not supplied, a collision-resistant filename is
    /// generated from the current time, a random suffix, and the original
    /// file's extension.
    pub async fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        name: Option<&str>,
    ) -> Result<String, AppError> {
        let file_name = match name {
            Some(name) => sanitize_file_name(name)?,
            None => generated_file_name(original_name),
        };

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        Ok(self.public_url(&file_name))
    }

    /// Delete the file a public URL points at.
    pub async fn remove(&self, url: &str) -> Result<(), AppError> {
        let file_name = self.file_name_from_url(url)?;
        let path = self.root.join(&file_name);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                format!("Media file {} not found", file_name),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Upload a new image, then delete the old one.
    ///
    /// The old file is only touched after the new upload succeeded; a failure
    /// to delete it is logged and the new URL still returned.
    pub async fn replace(
        &self,
        old_url: &str,
        bytes: &[u8],
        original_name: &str,
        name: Option<&str>,
    ) -> Result<String, AppError> {
        let url = self.store(bytes, original_name, name).await?;

        if let Err(err) = self.remove(old_url).await {
            tracing::warn!("Failed to remove replaced image {}: {}", old_url, err);
        }

        Ok(url)
    }

    /// Public URL of a stored filename.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/media/{}", self.public_base, file_name)
    }

    /// Root directory files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the stored filename from a public URL.
    ///
    /// Only the last two path segments matter: they must be `media/<file>`,
    /// and the filename must survive sanitization unchanged (no traversal).
    fn file_name_from_url(&self, url: &str) -> Result<String, AppError> {
        let mut segments = url.trim_end_matches('/').rsplit('/');
        let file_name = segments.next().unwrap_or_default();
        let dir = segments.next().unwrap_or_default();

        if dir != "media" || file_name.is_empty() {
            return Err(AppError::Validation(format!(
                "URL {} does not point into media storage",
                url
            )));
        }

        let sanitized = sanitize_file_name(file_name)?;
        if sanitized != file_name {
            return Err(AppError::Validation(format!(
                "URL {} contains an invalid filename",
                url
            )));
        }

        Ok(sanitized)
    }
}

/// Restrict filenames to a safe character set. Rejects empty names and
/// anything that could escape the media directory.
fn sanitize_file_name(name: &str) -> Result<String, AppError> {
    if name.is_empty()
        || name.starts_with('.')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AppError::Validation(format!("Invalid filename {:?}", name)));
    }
    Ok(name.to_string())
}

/// Timestamp plus random suffix plus the original extension.
fn generated_file_name(original_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let stamp = Utc::now().timestamp_millis();

    match extension_of(original_name) {
        Some(ext) => format!("{}-{}.{}", stamp, &suffix[..8], ext),
        None => format!("{}-{}", stamp, &suffix[..8]),
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let ext = name.rsplit('.').next()?;
    if ext.is_empty() || ext.len() == name.len() || ext.contains('/') {
        None
    } else {
        Some(ext)
    }
}
