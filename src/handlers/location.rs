use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{timestamp, AddressType, Coordinates, Location, LocationAddress};
use crate::state::AppState;

// POST /api/location
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLocationRequest {
    pub address: Option<LocationAddress>,
    pub coordinates: Option<Coordinates>,
    pub address_type: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Serialize)]
pub struct SaveLocationResponse {
    success: bool,
    message: &'static str,
    location: Location,
}

pub async fn save_location(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<SaveLocationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveLocationResponse>), AppError> {
    let Json(payload) = payload?;

    let (Some(address), Some(coordinates)) = (payload.address, payload.coordinates) else {
        return Err(AppError::validation("Location data required"));
    };

    let address = address.normalize().map_err(AppError::Validation)?;
    coordinates.validate().map_err(AppError::Validation)?;

    let address_type = match payload.address_type.as_deref() {
        None | Some("") => AddressType::Home,
        Some(t) => AddressType::from_input(t)
            .ok_or_else(|| AppError::validation(format!("Invalid addressType: {t}")))?,
    };

    let location = {
        let db = state.db()?;
        // A first address is always the default.
        let is_default =
            queries::count_locations(&db, &user.id)? == 0 || payload.is_default.unwrap_or(true);

        let now = timestamp::now();
        let location = Location {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            address,
            address_type,
            coordinates,
            is_default,
            created_at: now,
            updated_at: now,
        };
        queries::insert_location(&db, &location)?;
        location
    };

    tracing::info!(
        user_id = %user.id,
        location_id = %location.id,
        address_type = location.address_type.as_str(),
        is_default = location.is_default,
        "location saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveLocationResponse {
            success: true,
            message: "Location saved successfully",
            location,
        }),
    ))
}

// GET /api/location
#[derive(Serialize)]
pub struct LocationsResponse {
    success: bool,
    locations: Vec<Location>,
}

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<LocationsResponse>, AppError> {
    let locations = {
        let db = state.db()?;
        queries::list_locations(&db, &user.id)?
    };

    Ok(Json(LocationsResponse {
        success: true,
        locations,
    }))
}
