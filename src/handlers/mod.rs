pub mod auth;
pub mod health;
pub mod location;
pub mod requests;
