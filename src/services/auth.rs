use std::sync::Arc;

use crate::config::DeliveryMode;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{timestamp, PublicUser, Role};
use crate::services::otp;
use crate::state::AppState;

pub enum OtpDelivery {
    /// Development mode hands the code back to the caller.
    Returned(String),
    Sent,
}

pub async fn request_otp(
    state: &Arc<AppState>,
    phone: &str,
    role: Role,
) -> Result<OtpDelivery, AppError> {
    let code = otp::generate_otp();
    let expires_at = otp::otp_expiry(timestamp::now(), state.config.otp_ttl_minutes);

    let user = {
        let db = state.db()?;
        queries::upsert_user_otp(&db, phone, role, &code, &expires_at)?
    };

    tracing::info!(phone = %phone, user_id = %user.id, "OTP issued");

    match state.config.mode {
        DeliveryMode::Development => {
            tracing::info!(phone = %phone, otp = %code, "dev OTP");
            Ok(OtpDelivery::Returned(code))
        }
        DeliveryMode::Production => {
            state
                .messaging
                .send_otp(phone, &code, state.config.otp_ttl_minutes)
                .await
                .map_err(|e| {
                    tracing::error!(phone = %phone, error = %e, "OTP delivery failed");
                    AppError::Messaging(format!("{e:#}"))
                })?;
            Ok(OtpDelivery::Sent)
        }
    }
}

pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Redeems an OTP. Every failure looks the same to the caller.
pub fn verify_otp(state: &AppState, phone: &str, submitted: &str) -> Result<Session, AppError> {
    let now = timestamp::now();

    let user = {
        let db = state.db()?;
        let Some(user) = queries::get_user_by_phone(&db, phone)? else {
            tracing::warn!(phone = %phone, "OTP verify for unknown phone");
            return Err(AppError::InvalidOtp);
        };

        if !otp::otp_matches(&user, submitted, now) {
            tracing::warn!(phone = %phone, "invalid or expired OTP");
            return Err(AppError::InvalidOtp);
        }

        let Some(code) = user.otp.as_deref() else {
            return Err(AppError::InvalidOtp);
        };
        if !queries::consume_otp(&db, &user.id, code)? {
            return Err(AppError::InvalidOtp);
        }

        queries::get_user_by_id(&db, &user.id)?.ok_or(AppError::InvalidOtp)?
    };

    let token = state
        .tokens
        .issue(&user.id, user.role)
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "OTP verified");

    Ok(Session {
        token,
        user: PublicUser::from(&user),
    })
}
