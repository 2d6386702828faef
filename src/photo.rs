//! Local photo selection
//!
//! Stands in for a native file picker: the chosen path must name an existing
//! `.jpg` or `.png` file.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}

impl PhotoFile {
    /// Accepts `path` if its extension passes the picker filter and it is a regular file.
    pub async fn pick(path: &Path) -> Result<Self> {
        let content_type = content_type_for(path)
            .ok_or_else(|| Error::UnsupportedFile(path.display().to_string()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::UnsupportedFile(path.display().to_string()))?
            .to_string();

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::UnsupportedFile(path.display().to_string()));
        }

        let mut header = [0u8; 8];
        let mut file = tokio::fs::File::open(path).await?;
        let read = file.read(&mut header).await?;
        match detect_image_mime(&header[..read]) {
            Some(detected) if detected != content_type => tracing::warn!(
                "{} looks like {} but will be uploaded as {}",
                file_name,
                detected,
                content_type
            ),
            None => tracing::warn!("{} does not start with a JPEG or PNG signature", file_name),
            _ => {}
        }

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            content_type,
        })
    }
}

/// Content type implied by the extension, if the picker filter allows it.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        _ => None,
    }
}
