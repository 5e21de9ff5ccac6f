//! Receipt store implementation using Apache OpenDAL.

use opendal::{Operator, services};
use uuid::Uuid;

use super::config::StorageProvider;
use super::error::StorageError;

/// Maximum accepted receipt file size (8 MiB).
const MAX_RECEIPT_BYTES: u64 = 8 * 1024 * 1024;

/// A stored receipt file.
#[derive(Debug, Clone)]
pub struct StoredReceipt {
    /// Storage key under the configured provider.
    pub key: String,
    /// Public URL recorded on the payment as `receipt_url`.
    pub url: String,
}

/// Stores payment receipt files.
pub struct ReceiptStore {
    operator: Operator,
    public_base_url: String,
}

impl std::fmt::Debug for ReceiptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptStore")
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

impl ReceiptStore {
    /// Create a receipt store from a provider configuration.
    ///
    /// `public_base_url` is prepended to storage keys to form the receipt
    /// URLs recorded on payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(
        provider: &StorageProvider,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Stores a receipt file for a payment and returns its key and URL.
    ///
    /// Key format: `{payment_id}/{sanitized_filename}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is empty, too large, or the write fails.
    pub async fn store_receipt(
        &self,
        payment_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredReceipt, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }
        let size = bytes.len() as u64;
        if size > MAX_RECEIPT_BYTES {
            return Err(StorageError::FileTooLarge {
                size,
                max: MAX_RECEIPT_BYTES,
            });
        }

        let key = format!("{payment_id}/{}", sanitize_filename(filename));
        self.operator.write(&key, bytes).await?;

        let url = format!("{}/{key}", self.public_base_url);
        Ok(StoredReceipt { key, url })
    }

    /// Reads a stored receipt back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the key does not exist.
    pub async fn read_receipt(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_vec())
    }
}

/// Keeps alphanumerics, dots, dashes, and underscores; everything else
/// becomes an underscore. Empty names become "receipt".
fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        "receipt".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("recibo 001.pdf"), "recibo_001.pdf");
        assert_eq!(sanitize_filename("a/b\\c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("///"), "receipt");
        assert_eq!(sanitize_filename(""), "receipt");
    }

    #[tokio::test]
    async fn test_store_and_read_receipt_local_fs() {
        let dir = std::env::temp_dir().join(format!("aula-receipts-{}", Uuid::now_v7()));
        let store =
            ReceiptStore::from_provider(&StorageProvider::local_fs(&dir), "/receipts").unwrap();

        let payment_id = Uuid::now_v7();
        let stored = store
            .store_receipt(payment_id, "recibo 001.pdf", b"fake pdf".to_vec())
            .await
            .unwrap();

        assert_eq!(stored.key, format!("{payment_id}/recibo_001.pdf"));
        assert_eq!(stored.url, format!("/receipts/{payment_id}/recibo_001.pdf"));

        let bytes = store.read_receipt(&stored.key).await.unwrap();
        assert_eq!(bytes, b"fake pdf");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_store_rejects_empty_file() {
        let dir = std::env::temp_dir().join(format!("aula-receipts-{}", Uuid::now_v7()));
        let store =
            ReceiptStore::from_provider(&StorageProvider::local_fs(&dir), "/receipts").unwrap();

        let result = store.store_receipt(Uuid::now_v7(), "r.pdf", Vec::new()).await;
        assert!(matches!(result, Err(StorageError::EmptyFile)));
    }
}
