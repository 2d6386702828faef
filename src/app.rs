//! Album operations on top of an [`ObjectStore`].

use crate::keys;
use crate::models::{Album, AlbumName, AlbumView, Config, Photo};
use crate::photo::PhotoFile;
use crate::storage::{MockObjectStore, ObjectStore, Pages, S3ObjectStore};
use crate::Result;
use std::path::Path;
use tracing::{debug, info};

/// Lists, creates and fills albums in one bucket.
pub struct AlbumManager {
    store: Box<dyn ObjectStore>,
    base_url: String,
    pages: Pages,
}

impl AlbumManager {
    /// Build a manager around any store. Tests use this to inject
    /// [`MockObjectStore`].
    pub fn with_store(store: Box<dyn ObjectStore>, base_url: String, pages: Pages) -> Self {
        Self {
            store,
            base_url,
            pages,
        }
    }

    pub async fn new(config: &Config) -> Result<Self> {
        let store: Box<dyn ObjectStore> = if config.dry_run {
            info!("DRY_RUN enabled, using an empty in-memory bucket");
            Box::new(MockObjectStore::new())
        } else {
            Box::new(S3ObjectStore::new(config).await?)
        };
        let pages = if config.first_page_only {
            Pages::FirstOnly
        } else {
            Pages::All
        };
        info!("Using bucket {} in {}", config.bucket, config.region);

        Ok(Self::with_store(store, config.base_url.clone(), pages))
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>> {
        let prefixes = self.store.list_common_prefixes(self.pages).await?;
        debug!("Listed {} album prefixes", prefixes.len());
        Ok(prefixes.into_iter().map(Album::from_prefix).collect())
    }

    /// Writes the zero-byte marker for `input`. Existing albums are left as they are.
    pub async fn create_album(&self, input: &str) -> Result<Album> {
        let name = AlbumName::parse(input)?;
        let prefix = keys::album_prefix(&name);
        self.store.put_empty(&prefix).await?;
        info!("Created album {} at {}", name, prefix);

        Ok(Album {
            name: name.to_string(),
            prefix,
        })
    }

    /// Lists the album exactly as named; `album` is not trimmed.
    pub async fn view_album(&self, album: &str) -> Result<AlbumView> {
        let name = AlbumName::existing(album)?;
        let prefix = keys::album_prefix(&name);
        let photos = self
            .store
            .list_keys(&prefix, self.pages)
            .await?
            .into_iter()
            .map(|key| Photo {
                url: keys::public_url(&self.base_url, &key),
                is_marker: key == prefix,
                key,
            })
            .collect();

        Ok(AlbumView {
            album: name.to_string(),
            prefix,
            photos,
        })
    }

    /// Uploads a picked file into the album, replacing any photo with the same file name.
    pub async fn add_photo(&self, album: &str, path: &Path) -> Result<Photo> {
        let name = AlbumName::existing(album)?;
        let file = PhotoFile::pick(path).await?;
        let key = keys::photo_key(&name, &file.file_name);

        self.store
            .upload_file(&key, &file.path, file.content_type)
            .await?;
        info!("Uploaded {} to {}", file.path.display(), key);

        Ok(Photo {
            url: keys::public_url(&self.base_url, &key),
            is_marker: false,
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const TEST_BASE_URL: &str = "https://photos.s3.amazonaws.com";

    fn build_manager(store: &MockObjectStore) -> AlbumManager {
        AlbumManager::with_store(
            Box::new(store.clone()),
            TEST_BASE_URL.to_string(),
            Pages::All,
        )
    }

    #[tokio::test]
    async fn test_create_then_list_recovers_name() {
        let store = MockObjectStore::new();
        let manager = build_manager(&store);

        let album = manager.create_album("Paris Trip").await.unwrap();
        assert_eq!(album.prefix, "Paris%20Trip/");
        assert_eq!(store.get_keys(), vec!["Paris%20Trip/".to_string()]);

        let albums = manager.list_albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Paris Trip");
    }

    #[tokio::test]
    async fn test_create_invalid_name_makes_no_request() {
        let store = MockObjectStore::new();
        let manager = build_manager(&store);

        for bad in ["", "  ", "a/b"] {
            let err = manager.create_album(bad).await.unwrap_err();
            assert!(matches!(err, Error::InvalidAlbumName(_)));
        }
        assert_eq!(store.get_put_count(), 0);
    }

    #[tokio::test]
    async fn test_create_existing_album_is_noop() {
        let store = MockObjectStore::new().with_object("Trip/", vec![]);
        let manager = build_manager(&store);

        manager.create_album("Trip").await.unwrap();
        assert_eq!(store.get_keys(), vec!["Trip/".to_string()]);
        assert_eq!(manager.list_albums().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_view_album_marks_marker_and_builds_urls() {
        let store = MockObjectStore::new()
            .with_object("Paris%20Trip/", vec![])
            .with_object("Paris%20Trip/photo.jpg", vec![1, 2, 3])
            .with_object("Rome/other.jpg", vec![4]);
        let manager = build_manager(&store);

        let view = manager.view_album("Paris Trip").await.unwrap();
        assert_eq!(view.photos.len(), 2);
        assert!(view.photos[0].is_marker);
        assert!(!view.photos[1].is_marker);
        assert_eq!(
            view.photos[1].url,
            "https://photos.s3.amazonaws.com/Paris%2520Trip%2Fphoto.jpg"
        );
    }

    #[tokio::test]
    async fn test_add_photo_uses_raw_file_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let store = MockObjectStore::new();
        let manager = build_manager(&store);

        let photo = manager.add_photo("Paris Trip", &path).await.unwrap();
        assert_eq!(photo.key, "Paris%20Trip/photo.jpg");

        let stored = store.get_object("Paris%20Trip/photo.jpg").unwrap();
        assert_eq!(stored.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(stored.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_listed_name_with_escaped_space_resolves_to_own_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let store = MockObjectStore::new()
            .with_object("%20Trip/", vec![])
            .with_object("%20Trip/a.jpg", vec![1])
            .with_object("Trip/", vec![])
            .with_object("Trip/b.jpg", vec![2]);
        let manager = build_manager(&store);

        let albums = manager.list_albums().await.unwrap();
        let listed = albums.iter().find(|a| a.prefix == "%20Trip/").unwrap();
        assert_eq!(listed.name, " Trip");

        let view = manager.view_album(&listed.name).await.unwrap();
        assert_eq!(view.prefix, listed.prefix);
        let keys: Vec<&str> = view.photos.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["%20Trip/", "%20Trip/a.jpg"]);

        let photo = manager.add_photo(&listed.name, &path).await.unwrap();
        assert_eq!(photo.key, "%20Trip/new.jpg");
        assert!(store.get_object("Trip/new.jpg").is_none());
    }

    #[tokio::test]
    async fn test_add_photo_rejects_unsupported_file_before_upload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let store = MockObjectStore::new();
        let manager = build_manager(&store);

        let err = manager.add_photo("Trip", &path).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFile(_)));
        assert_eq!(store.get_put_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = MockObjectStore::new().with_failure(true);
        let manager = build_manager(&store);

        let err = manager.list_albums().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_first_page_only_truncates_listing() {
        let store = MockObjectStore::new()
            .with_page_size(1)
            .with_object("a/", vec![])
            .with_object("b/", vec![]);
        let manager = AlbumManager::with_store(
            Box::new(store.clone()),
            TEST_BASE_URL.to_string(),
            Pages::FirstOnly,
        );

        let albums = manager.list_albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "a");
    }
}
