use super::{ObjectStore, Pages};
use crate::keys::DELIMITER;
use crate::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Matches the S3 `MaxKeys` default.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// In-memory bucket. Keys are kept in lexicographic order and listings are
/// split into pages of `page_size` entries, like S3.
#[derive(Clone)]
pub struct MockObjectStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    page_size: usize,
    list_requests: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
            list_requests: Arc::new(Mutex::new(0)),
            put_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_object(self, key: &str, data: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: None,
            },
        );
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Number of list pages served, across all listings.
    pub fn get_list_requests(&self) -> usize {
        *self.list_requests.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Storage(format!("Mock failure: {}", operation)));
        }
        Ok(())
    }

    fn paginate(&self, entries: Vec<String>, pages: Pages) -> Vec<String> {
        let page_count = entries.len().div_ceil(self.page_size).max(1);
        let served = match pages {
            Pages::All => page_count,
            Pages::FirstOnly => 1,
        };
        *self.list_requests.lock().unwrap() += served;
        entries
            .into_iter()
            .take(served * self.page_size)
            .collect()
    }

    fn insert(&self, key: &str, object: StoredObject) {
        *self.put_count.lock().unwrap() += 1;
        self.objects.lock().unwrap().insert(key.to_string(), object);
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_common_prefixes(&self, pages: Pages) -> Result<Vec<String>> {
        self.check_failure("list albums")?;
        let prefixes: BTreeSet<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter_map(|key| {
                key.find(DELIMITER)
                    .map(|index| key[..index + DELIMITER.len()].to_string())
            })
            .collect();
        Ok(self.paginate(prefixes.into_iter().collect(), pages))
    }

    async fn list_keys(&self, prefix: &str, pages: Pages) -> Result<Vec<String>> {
        self.check_failure("list objects")?;
        let keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        Ok(self.paginate(keys, pages))
    }

    async fn put_empty(&self, key: &str) -> Result<()> {
        self.check_failure("put object")?;
        self.insert(
            key,
            StoredObject {
                data: Vec::new(),
                content_type: None,
            },
        );
        Ok(())
    }

    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()> {
        self.check_failure("upload file")?;
        let data = tokio::fs::read(path).await?;
        self.insert(
            key,
            StoredObject {
                data,
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }
}
