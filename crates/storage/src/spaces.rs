//! S3-compatible object store (DigitalOcean Spaces).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use crate::config::SpacesConfig;
use crate::{validate_key, ObjectStore, StorageError, StoredObject, OCTET_STREAM};

/// Writes objects to a private bucket. Reads go through the same client so
/// the API can proxy them without exposing bucket URLs.
#[derive(Debug, Clone)]
pub struct SpacesStore {
    client: Client,
    bucket: String,
}

impl SpacesStore {
    /// Build an S3 client pointed at the configured endpoint.
    pub async fn connect(config: &SpacesConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "threadmark-spaces",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        tracing::info!(
            bucket = %config.bucket,
            endpoint = %config.endpoint,
            "Spaces client configured"
        );

        Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for SpacesStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::Private)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Err(StorageError::NotFound(key.to_string()));
                }
                return Err(StorageError::Backend(DisplayErrorContext(&e).to_string()));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or(OCTET_STREAM)
            .to_string();
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        // S3 DeleteObject already succeeds for absent keys.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "spaces"
    }
}
