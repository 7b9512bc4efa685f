/// Object-store cleanup for uploaded images
use async_trait::async_trait;
use aws_sdk_s3::Client;

use crate::error::{AppError, Result};

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Delete the object a public media URL points at
    async fn delete_by_url(&self, url: &str) -> Result<()>;
}

pub struct S3MediaStore {
    client: Client,
    bucket: String,
}

impl S3MediaStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn delete_by_url(&self, url: &str) -> Result<()> {
        let key = object_key(url)
            .ok_or_else(|| AppError::Storage(format!("Cannot derive object key from {}", url)))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete {}: {}", key, e)))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Deleted media object");
        Ok(())
    }
}

/// Used when no bucket is configured
pub struct NoopMediaStore;

#[async_trait]
impl MediaStore for NoopMediaStore {
    async fn delete_by_url(&self, url: &str) -> Result<()> {
        tracing::debug!(url = %url, "Media bucket not configured, skipping delete");
        Ok(())
    }
}

/// Uploaded objects live at the bucket root, so the key is the last path segment
pub fn object_key(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(
            object_key("https://bucket.s3.amazonaws.com/3f2a-photo.webp"),
            Some("3f2a-photo.webp")
        );
        assert_eq!(
            object_key("https://cdn.example.com/a/b/pic.jpeg?v=2"),
            Some("pic.jpeg")
        );
        assert_eq!(object_key("https://cdn.example.com/"), None);
    }

    #[tokio::test]
    async fn test_noop_store() {
        assert!(NoopMediaStore
            .delete_by_url("https://cdn.example.com/pic.jpeg")
            .await
            .is_ok());
    }
}
