use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaStorage, StoredMedia, UploadOptions};
use crate::services::uploads::UploadFile;

pub struct CloudinaryStorage {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// `sha1("k1=v1&k2=v2..." + secret)` over the params sorted by key, hex encoded.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl CloudinaryStorage {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            client: reqwest::Client::new(),
        }
    }

    fn signed_params(&self, options: &UploadOptions, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", options.folder.clone());
        params.insert("timestamp", timestamp.to_string());
        if let Some(public_id) = &options.public_id {
            params.insert("public_id", public_id.clone());
            params.insert("overwrite", options.overwrite.to_string());
        }
        params
    }
}

#[async_trait]
impl MediaStorage for CloudinaryStorage {
    async fn upload(&self, file: &UploadFile, options: &UploadOptions) -> anyhow::Result<StoredMedia> {
        let params = self.signed_params(options, chrono::Utc::now().timestamp());
        let signature = sign_params(&params, &self.api_secret);

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("invalid upload content type")?;

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        );

        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("failed to reach Cloudinary")?;

        if !res.status().is_success() {
            let status = res.status();
            let message = res
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "no error body".to_string());
            anyhow::bail!("Cloudinary returned {status}: {message}");
        }

        let body: UploadResponse = res
            .json()
            .await
            .context("unexpected Cloudinary response")?;

        tracing::debug!(public_id = %body.public_id, "uploaded to Cloudinary");

        Ok(StoredMedia {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }
}
