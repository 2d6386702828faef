use super::credentials::identity_pool_credentials;
use super::{ObjectStore, Pages};
use crate::keys::DELIMITER;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Credentials, config::Region, Client as S3Client};
use std::path::Path;
use tracing::{debug, info};

pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(pool_id) = &config.identity_pool_id {
            let credentials = identity_pool_credentials(pool_id, &config.region).await?;
            loader = loader.credentials_provider(credentials);
        } else if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            info!("Using static credentials from environment");
            loader = loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                "photo-albums-env",
            ));
        } else {
            info!("Using default AWS credential chain");
        }

        if let Some(endpoint) = &config.endpoint {
            info!("Using custom S3 endpoint {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        // S3-compatible endpoints rarely support virtual-hosted bucket names.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Ok(Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_common_prefixes(&self, pages: Pages) -> Result<Vec<String>> {
        let mut prefixes = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .delimiter(DELIMITER);
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| Error::Storage(format!("Failed to list albums: {}", e)))?;

            prefixes.extend(
                response
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string)),
            );

            continuation_token = response.next_continuation_token().map(str::to_string);
            if continuation_token.is_none() || pages == Pages::FirstOnly {
                break;
            }
            debug!("Fetched {} album prefixes so far, continuing", prefixes.len());
        }
        Ok(prefixes)
    }

    async fn list_keys(&self, prefix: &str, pages: Pages) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| Error::Storage(format!("Failed to list objects: {}", e)))?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|o| o.key().map(str::to_string)),
            );

            continuation_token = response.next_continuation_token().map(str::to_string);
            if continuation_token.is_none() || pages == Pages::FirstOnly {
                break;
            }
            debug!("Fetched {} keys under {} so far, continuing", keys.len(), prefix);
        }
        Ok(keys)
    }

    async fn put_empty(&self, key: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to create object: {}", e)))?;
        Ok(())
    }

    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to upload file: {}", e)))?;
        Ok(())
    }
}
