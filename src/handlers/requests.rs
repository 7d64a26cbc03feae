use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::service_request::parse_preferred_date;
use crate::models::{timestamp, AddressSnapshot, RequestStatus, ServiceRequest};
use crate::services::storage::UploadOptions;
use crate::services::uploads::{self, FileField};
use crate::state::AppState;

pub const REQUEST_FOLDER: &str = "service_requests";
pub const MAX_REQUEST_FILES: usize = 6;

#[derive(Serialize)]
pub struct ServiceRequestResponse {
    success: bool,
    request: ServiceRequest,
}

// POST /api/requests
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ServiceRequestResponse>), AppError> {
    let multipart = multipart.map_err(|e| AppError::Upload(e.body_text()))?;
    let form = uploads::read_form(
        multipart,
        FileField {
            name: "images",
            max_files: MAX_REQUEST_FILES,
        },
    )
    .await?;

    let (Some(category_name), Some(description)) =
        (form.text("categoryName"), form.text("description"))
    else {
        return Err(AppError::validation("Category and description are required"));
    };

    let address = form
        .text("address")
        .map(|a| AddressSnapshot::from_json(&a))
        .transpose()
        .map_err(AppError::Validation)?;

    let preferred_date = form
        .text("preferredDate")
        .map(|d| parse_preferred_date(&d))
        .transpose()
        .map_err(AppError::Validation)?;

    let images = uploads::upload_all(
        state.storage.as_ref(),
        &form.files,
        &UploadOptions::folder(REQUEST_FOLDER),
    )
    .await
    .inspect_err(|e| {
        tracing::error!(user_id = %user.id, error = %e, "attachment upload failed");
    })?;

    let now = timestamp::now();
    let request = ServiceRequest {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        category_name,
        category_icon: form.text("categoryIcon"),
        category_color: form.text("categoryColor"),
        description,
        images,
        address,
        preferred_date,
        preferred_time: form.text("preferredTime"),
        time_slot: form.text("timeSlot"),
        status: RequestStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        queries::insert_service_request(&db, &request)?;
    }

    tracing::info!(
        user_id = %user.id,
        request_id = %request.id,
        category = %request.category_name,
        images = request.images.len(),
        "service request created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ServiceRequestResponse {
            success: true,
            request,
        }),
    ))
}

// GET /api/requests/my
#[derive(Serialize)]
pub struct ServiceRequestsResponse {
    success: bool,
    requests: Vec<ServiceRequest>,
}

pub async fn my_requests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ServiceRequestsResponse>, AppError> {
    let requests = {
        let db = state.db()?;
        queries::list_service_requests(&db, &user.id)?
    };

    Ok(Json(ServiceRequestsResponse {
        success: true,
        requests,
    }))
}
