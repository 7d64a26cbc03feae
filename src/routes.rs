use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::StorageBackend;
use crate::handlers::{auth, health, location, requests};
use crate::services::uploads::MAX_FILE_BYTES;
use crate::state::AppState;

/// Room for a full batch of attachments plus the text fields.
const MAX_BODY_BYTES: usize = requests::MAX_REQUEST_FILES * MAX_FILE_BYTES + 2 * 1024 * 1024;

pub fn app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/auth/send-otp", post(auth::send_otp))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route(
            "/api/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route(
            "/api/location",
            get(location::list_locations).post(location::save_location),
        )
        .route("/api/requests", post(requests::create_request))
        .route("/api/requests/my", get(requests::my_requests));

    if state.config.storage == StorageBackend::Local {
        router = router.nest_service("/uploads", ServeDir::new(&state.config.upload_dir));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
