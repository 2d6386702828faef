//! Data models and structures
//!
//! Defines albums, photos, and the runtime configuration read from the
//! environment.

use crate::keys;
use serde::Serialize;
use std::fmt;

/// An album name that is non-empty and free of `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumName(String);

impl AlbumName {
    pub fn parse(input: &str) -> crate::Result<Self> {
        let name = input.trim();
        if name.is_empty() || name.contains(keys::DELIMITER) {
            return Err(crate::Error::InvalidAlbumName(input.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Wraps the name of an album that is already in the bucket. No trimming,
    /// since listed names may carry escaped leading or trailing spaces.
    pub fn existing(name: &str) -> crate::Result<Self> {
        if name.is_empty() || name.contains(keys::DELIMITER) {
            return Err(crate::Error::InvalidAlbumName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Album {
    pub name: String,
    pub prefix: String,
}

impl Album {
    pub fn from_prefix(prefix: String) -> Self {
        Self {
            name: keys::album_name_from_prefix(&prefix),
            prefix,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Photo {
    pub key: String,
    pub url: String,
    /// True for the zero-byte object that marks the album itself.
    pub is_marker: bool,
}

impl Photo {
    /// The part of the key after the album prefix.
    pub fn file_name(&self) -> &str {
        self.key
            .split_once(keys::DELIMITER)
            .map(|(_, rest)| rest)
            .unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumView {
    pub album: String,
    pub prefix: String,
    pub photos: Vec<Photo>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub region: String,
    pub identity_pool_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub base_url: String,
    pub first_page_only: bool,
    pub dry_run: bool,
}

pub const DEFAULT_REGION: &str = "us-east-1";

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let bucket = non_empty("ALBUMS_BUCKET")
            .ok_or_else(|| crate::Error::Config("ALBUMS_BUCKET not set".to_string()))?;
        let access_key_id = non_empty("ALBUMS_ACCESS_KEY_ID");
        let secret_access_key = non_empty("ALBUMS_SECRET_ACCESS_KEY");
        if access_key_id.is_some() != secret_access_key.is_some() {
            return Err(crate::Error::Config(
                "ALBUMS_ACCESS_KEY_ID and ALBUMS_SECRET_ACCESS_KEY must be set together"
                    .to_string(),
            ));
        }

        Ok(Self {
            region: non_empty("ALBUMS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            identity_pool_id: non_empty("ALBUMS_IDENTITY_POOL_ID"),
            access_key_id,
            secret_access_key,
            endpoint: non_empty("ALBUMS_ENDPOINT"),
            base_url: non_empty("ALBUMS_BASE_URL")
                .unwrap_or_else(|| Self::default_base_url(&bucket)),
            first_page_only: non_empty("ALBUMS_FIRST_PAGE_ONLY")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            dry_run: non_empty("DRY_RUN").map(|v| parse_flag(&v)).unwrap_or(false),
            bucket,
        })
    }

    pub fn default_base_url(bucket: &str) -> String {
        format!("https://{}.s3.amazonaws.com", bucket)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
