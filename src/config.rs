use std::env;

#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryMode {
    /// OTPs are returned in the response body and logged.
    Development,
    /// OTPs are dispatched through the messaging provider.
    Production,
}

impl DeliveryMode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => DeliveryMode::Production,
            _ => DeliveryMode::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Development => "development",
            DeliveryMode::Production => "production",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorageBackend {
    Cloudinary,
    Local,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub mode: DeliveryMode,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub otp_ttl_minutes: i64,
    pub app_name: String,
    pub whatsapp_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_api_version: String,
    pub whatsapp_template: String,
    pub default_country_code: String,
    pub storage: StorageBackend,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub upload_dir: String,
    pub public_base_url: String,
}

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let mode = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| DeliveryMode::parse(&v))
            .unwrap_or(DeliveryMode::Development);

        let cloudinary_cloud_name = env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default();
        let cloudinary_api_key = env::var("CLOUDINARY_API_KEY").unwrap_or_default();
        let cloudinary_api_secret = env::var("CLOUDINARY_API_SECRET").unwrap_or_default();

        let storage = match env::var("MEDIA_STORAGE").ok().as_deref() {
            Some("cloudinary") => StorageBackend::Cloudinary,
            Some("local") => StorageBackend::Local,
            _ if !cloudinary_cloud_name.is_empty() && !cloudinary_api_key.is_empty() => {
                StorageBackend::Cloudinary
            }
            _ => StorageBackend::Local,
        };

        Self {
            port,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "local_services.db".to_string()),
            mode,
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            jwt_ttl_hours: env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24 * 7),
            otp_ttl_minutes: env::var("OTP_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Local Service App".to_string()),
            whatsapp_token: env::var("WHATSAPP_TOKEN").unwrap_or_default(),
            whatsapp_phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID").unwrap_or_default(),
            whatsapp_api_version: env::var("WHATSAPP_API_VERSION")
                .unwrap_or_else(|_| "v19.0".to_string()),
            whatsapp_template: env::var("WHATSAPP_TEMPLATE")
                .unwrap_or_else(|_| "otp_login".to_string()),
            default_country_code: env::var("DEFAULT_COUNTRY_CODE")
                .unwrap_or_else(|_| "91".to_string()),
            storage,
            cloudinary_cloud_name,
            cloudinary_api_key,
            cloudinary_api_secret,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
        }
    }

    /// Fails when the configuration cannot serve the selected mode.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mode == DeliveryMode::Production {
            anyhow::ensure!(
                !self.whatsapp_token.is_empty() && !self.whatsapp_phone_number_id.is_empty(),
                "WHATSAPP_TOKEN and WHATSAPP_PHONE_NUMBER_ID must be set in production"
            );
            anyhow::ensure!(
                self.jwt_secret != DEFAULT_JWT_SECRET,
                "JWT_SECRET must be changed in production"
            );
        }
        if self.storage == StorageBackend::Cloudinary {
            anyhow::ensure!(
                !self.cloudinary_cloud_name.is_empty()
                    && !self.cloudinary_api_key.is_empty()
                    && !self.cloudinary_api_secret.is_empty(),
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set when MEDIA_STORAGE=cloudinary"
            );
        }
        anyhow::ensure!(self.otp_ttl_minutes > 0, "OTP_TTL_MINUTES must be positive");
        anyhow::ensure!(self.jwt_ttl_hours > 0, "JWT_TTL_HOURS must be positive");
        Ok(())
    }
}
