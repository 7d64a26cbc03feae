pub mod cloudinary;
pub mod local;

use async_trait::async_trait;

use crate::services::uploads::UploadFile;

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub folder: String,
    /// Stable name for the asset; a random one is used when absent.
    pub public_id: Option<String>,
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn folder(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, file: &UploadFile, options: &UploadOptions) -> anyhow::Result<StoredMedia>;
}
