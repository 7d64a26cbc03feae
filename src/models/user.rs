use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
        }
    }

    /// Strict parse for client input.
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim() {
            "user" => Some(Role::User),
            "vendor" => Some(Role::Vendor),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Self {
        Role::from_input(s).unwrap_or(Role::User)
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub otp: Option<String>,
    pub otp_expires_at: Option<NaiveDateTime>,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The user as clients see it; OTP state never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    #[serde(serialize_with = "super::timestamp::serialize")]
    pub created_at: NaiveDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            phone: user.phone.clone(),
            name: user.name.clone(),
            profile_image: user.profile_image.clone(),
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}
