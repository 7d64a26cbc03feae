use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{normalize_recipient, MessagingProvider};
use crate::config::AppConfig;

/// Sends OTPs as WhatsApp Cloud API template messages.
pub struct WhatsAppProvider {
    token: String,
    phone_number_id: String,
    api_version: String,
    template: String,
    app_name: String,
    country_code: String,
    client: reqwest::Client,
}

impl WhatsAppProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            token: config.whatsapp_token.clone(),
            phone_number_id: config.whatsapp_phone_number_id.clone(),
            api_version: config.whatsapp_api_version.clone(),
            template: config.whatsapp_template.clone(),
            app_name: config.app_name.clone(),
            country_code: config.default_country_code.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn payload(&self, to: &str, otp: &str, ttl_minutes: i64) -> serde_json::Value {
        json!({
            "messaging_product": "whatsapp",
            "to": normalize_recipient(to, &self.country_code),
            "type": "template",
            "template": {
                "name": self.template,
                "language": { "code": "en" },
                "components": [{
                    "type": "body",
                    "parameters": [
                        { "type": "text", "text": self.app_name },
                        { "type": "text", "text": otp },
                        { "type": "text", "text": ttl_minutes.to_string() },
                    ]
                }]
            }
        })
    }
}

#[async_trait]
impl MessagingProvider for WhatsAppProvider {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.token.is_empty() && !self.phone_number_id.is_empty(),
            "WhatsApp credentials are not configured"
        );

        let url = format!(
            "https://graph.facebook.com/{}/{}/messages",
            self.api_version, self.phone_number_id
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&self.payload(to, otp, ttl_minutes))
            .send()
            .await
            .context("failed to reach WhatsApp API")?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp API returned {status}: {body}");
        }

        Ok(())
    }
}
