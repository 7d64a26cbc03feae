pub mod auth;
pub mod messaging;
pub mod otp;
pub mod storage;
pub mod uploads;
