//! Receipt file storage using Apache OpenDAL.
//!
//! Vendor-agnostic object storage for payment receipt files:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3
//! - Azure Blob Storage
//! - Local filesystem (development only)

mod config;
mod error;
mod service;

pub use config::StorageProvider;
pub use error::StorageError;
pub use service::{ReceiptStore, StoredReceipt};
