use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use crate::models::User;

pub const OTP_DIGITS: usize = 6;

/// Uniform over `000000..=999999`.
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:0width$}", width = OTP_DIGITS)
}

pub fn otp_expiry(now: NaiveDateTime, ttl_minutes: i64) -> NaiveDateTime {
    now + Duration::minutes(ttl_minutes)
}

/// True when `submitted` matches the user's outstanding code and it has not
/// expired at `now`.
pub fn otp_matches(user: &User, submitted: &str, now: NaiveDateTime) -> bool {
    match (&user.otp, &user.otp_expires_at) {
        (Some(otp), Some(expires_at)) => otp == submitted.trim() && *expires_at >= now,
        _ => false,
    }
}
