pub mod whatsapp;

use async_trait::async_trait;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Delivers a login code to `to`, valid for `ttl_minutes`.
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> anyhow::Result<()>;
}

/// Reduces a phone number to digits and prefixes the country code onto bare
/// 10-digit national numbers.
pub fn normalize_recipient(phone: &str, country_code: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("{country_code}{digits}")
    } else {
        digits
    }
}
