use s3::creds::Credentials;
use s3::{Bucket, Region};
use uuid::Uuid;

use crate::models::verification::DocumentKind;

/// Client for the S3-compatible bucket holding verification photos.
pub struct ObjectStorage {
    bucket: Box<Bucket>,
}

impl ObjectStorage {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket })
    }

    pub async fn upload(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, "application/octet-stream")
            .await?;
        check_status(key, response.status_code())
    }

    pub async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.bucket.get_object(key).await?;
        check_status(key, response.status_code())?;
        Ok(response.to_vec())
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self.bucket.delete_object(key).await?;
        check_status(key, response.status_code())
    }
}

/// The bucket client hands back error responses as data; only 2xx counts.
fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Status(other)),
    }
}

/// Object key for one document of a verification submission.
pub fn document_key(worker_id: Uuid, verification_id: Uuid, kind: DocumentKind) -> String {
    format!("verifications/{worker_id}/{verification_id}/{kind}.enc")
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage responded with status {0}")]
    Status(u16),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_layout() {
        let worker = Uuid::nil();
        let verification = Uuid::from_u128(1);

        assert_eq!(
            document_key(worker, verification, DocumentKind::IdCard),
            format!("verifications/{worker}/{verification}/id_card.enc")
        );
        assert!(document_key(worker, verification, DocumentKind::Selfie).ends_with("/selfie.enc"));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("k", 200).is_ok());
        assert!(check_status("k", 204).is_ok());
        assert!(matches!(check_status("k", 404), Err(StorageError::NotFound(key)) if key == "k"));
        assert!(matches!(check_status("k", 403), Err(StorageError::Status(403))));
        assert!(matches!(check_status("k", 500), Err(StorageError::Status(500))));
        assert!(matches!(check_status("k", 307), Err(StorageError::Status(307))));
    }
}
