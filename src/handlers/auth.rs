use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{PublicUser, Role};
use crate::services::auth::{self as auth_service, OtpDelivery};
use crate::services::storage::UploadOptions;
use crate::services::uploads::{self, FileField};
use crate::state::AppState;

pub const PROFILE_FOLDER: &str = "local_service/profiles";

// POST /api/auth/send-otp
#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<String>,
}

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<SendOtpResponse>, AppError> {
    let Json(payload) = payload?;

    let phone = payload
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("Phone number required"))?;

    let role = match payload.role.as_deref() {
        None | Some("") => Role::User,
        Some(r) => Role::from_input(r)
            .ok_or_else(|| AppError::validation(format!("Invalid role: {r}")))?,
    };

    tracing::info!(phone = %phone, "OTP requested");

    let response = match auth_service::request_otp(&state, phone, role).await? {
        OtpDelivery::Returned(otp) => SendOtpResponse {
            success: true,
            message: "OTP generated (DEV MODE)",
            otp: Some(otp),
        },
        OtpDelivery::Sent => SendOtpResponse {
            success: true,
            message: "OTP sent to WhatsApp",
            otp: None,
        },
    };

    Ok(Json(response))
}

// POST /api/auth/verify-otp
#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    success: bool,
    token: String,
    user: PublicUser,
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let Json(payload) = payload?;

    let (Some(phone), Some(otp)) = (payload.phone, payload.otp) else {
        return Err(AppError::InvalidOtp);
    };

    let session = auth_service::verify_otp(&state, phone.trim(), &otp)?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

// GET /api/auth/profile
pub async fn get_profile(user: AuthUser) -> Json<Value> {
    Json(json!({ "success": true, "user": PublicUser::from(&*user) }))
}

// PUT /api/auth/profile
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    req: Request,
) -> Result<Json<Value>, AppError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let (name, image) = if is_multipart {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| AppError::Upload(e.body_text()))?;
        let mut form = uploads::read_form(
            multipart,
            FileField {
                name: "profileImage",
                max_files: 1,
            },
        )
        .await?;
        let name = form.fields.remove("name");
        (name, form.files.pop())
    } else {
        let Json(body) = Json::<UpdateProfileRequest>::from_request(req, &state).await?;
        (body.name, None)
    };

    let name = match name {
        Some(n) if n.trim().is_empty() => {
            return Err(AppError::validation("Name cannot be empty"));
        }
        Some(n) => Some(n.trim().to_string()),
        None => None,
    };

    if let Some(file) = &image {
        if !file.content_type.starts_with("image/") {
            return Err(AppError::Upload("profile image must be an image".to_string()));
        }
    }

    let image_url = match &image {
        Some(file) => {
            let options = UploadOptions {
                folder: PROFILE_FOLDER.to_string(),
                public_id: Some(format!("user_{}_profile", user.id)),
                overwrite: true,
            };
            let stored = state
                .storage
                .upload(file, &options)
                .await
                .map_err(|e| AppError::Storage(format!("{e:#}")))?;
            Some(stored.url)
        }
        None => None,
    };

    let updated = {
        let db = state.db()?;
        queries::update_profile(&db, &user.id, name.as_deref(), image_url.as_deref())?
    }
    .ok_or(AppError::Unauthorized("User not found"))?;

    tracing::info!(user_id = %updated.id, image = image_url.is_some(), "profile updated");

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": PublicUser::from(&updated),
    })))
}
