use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Field, Multipart};
use futures::future::try_join_all;

use crate::errors::AppError;
use crate::services::storage::{MediaStorage, UploadOptions};

pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// A file received from a multipart form, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn extension(&self) -> &str {
        if let Some((_, ext)) = self.file_name.rsplit_once('.') {
            if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return ext;
            }
        }
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "application/pdf" => "pdf",
            "text/plain" => "txt",
            _ => "bin",
        }
    }
}

pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("image/") || ALLOWED_DOCUMENT_TYPES.contains(&essence.as_str())
}

/// Which file field a form accepts and how many files it may carry.
#[derive(Debug, Clone, Copy)]
pub struct FileField {
    pub name: &'static str,
    pub max_files: usize,
}

#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadFile>,
}

impl ParsedForm {
    /// Trimmed text value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Reads every part of the form into memory, enforcing the file policy as the
/// parts arrive. Nothing is uploaded here.
pub async fn read_form(mut multipart: Multipart, accept: FileField) -> Result<ParsedForm, AppError> {
    let mut form = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if field.file_name().is_none() {
            let value = read_limited(field, MAX_TEXT_FIELD_BYTES, &name).await?;
            let value = String::from_utf8(value.to_vec())
                .map_err(|_| AppError::validation(format!("field {name} is not valid UTF-8")))?;
            form.fields.insert(name, value);
            continue;
        }

        if name != accept.name {
            return Err(AppError::Upload(format!("Unexpected field: {name}")));
        }
        if form.files.len() >= accept.max_files {
            return Err(AppError::Upload(format!(
                "too many files in {name} (max {})",
                accept.max_files
            )));
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !is_allowed_content_type(&content_type) {
            return Err(AppError::Upload(format!(
                "Unsupported file type {content_type}. Please upload images or documents."
            )));
        }

        let data = read_limited(field, MAX_FILE_BYTES, &file_name).await?;
        if data.is_empty() {
            return Err(AppError::Upload(format!("{file_name} is empty")));
        }

        form.files.push(UploadFile {
            file_name,
            content_type,
            data,
        });
    }

    Ok(form)
}

async fn read_limited(mut field: Field<'_>, limit: usize, label: &str) -> Result<Bytes, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::Upload(format!(
                "{label} exceeds the {} byte limit",
                limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Uploads all files concurrently and returns their URLs in submission order.
/// The first failure aborts the batch.
pub async fn upload_all(
    storage: &dyn MediaStorage,
    files: &[UploadFile],
    options: &UploadOptions,
) -> Result<Vec<String>, AppError> {
    let stored = try_join_all(files.iter().map(|f| storage.upload(f, options)))
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?;

    Ok(stored.into_iter().map(|s| s.url).collect())
}
