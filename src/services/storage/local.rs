use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use super::{MediaStorage, StoredMedia, UploadOptions};
use crate::services::uploads::UploadFile;

/// Writes uploads under a directory that the router serves at `/uploads`.
pub struct LocalDiskStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn safe_segment(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn files_with_stem(dir: &Path, stem: &str) -> anyhow::Result<Vec<String>> {
    let prefix = format!("{stem}.");
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to list {}", dir.display()))?;

    let mut names = vec![];
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(&prefix) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

#[async_trait]
impl MediaStorage for LocalDiskStorage {
    async fn upload(&self, file: &UploadFile, options: &UploadOptions) -> anyhow::Result<StoredMedia> {
        let folder: Vec<String> = options
            .folder
            .split('/')
            .filter(|s| !s.is_empty())
            .map(safe_segment)
            .collect();

        let stem = match &options.public_id {
            Some(id) => safe_segment(id),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let name = format!("{stem}.{}", file.extension());

        let mut dir = self.root.clone();
        dir.extend(&folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create upload directory {}", dir.display()))?;

        let path = dir.join(&name);
        if options.public_id.is_some() {
            let existing = files_with_stem(&dir, &stem).await?;
            if !existing.is_empty() && !options.overwrite {
                anyhow::bail!("{} already exists", dir.join(&existing[0]).display());
            }
            // A replacement may carry a different extension than the file it replaces.
            for old in existing.iter().filter(|old| **old != name) {
                tokio::fs::remove_file(dir.join(old))
                    .await
                    .with_context(|| format!("failed to remove {old}"))?;
            }
        }
        tokio::fs::write(&path, &file.data)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        let mut public_id = folder.join("/");
        if !public_id.is_empty() {
            public_id.push('/');
        }
        public_id.push_str(&stem);

        Ok(StoredMedia {
            url: format!("{}/uploads/{}/{}", self.base_url, folder.join("/"), name),
            public_id,
        })
    }
}
