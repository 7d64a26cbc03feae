use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "assigned" => RequestStatus::Assigned,
            "in_progress" => RequestStatus::InProgress,
            "completed" => RequestStatus::Completed,
            "cancelled" => RequestStatus::Cancelled,
            _ => RequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Copy of the address at submission time; later edits to the user's saved
/// locations do not reach it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    pub full_address: Option<String>,
    pub coordinates: Option<SnapshotCoordinates>,
}

impl AddressSnapshot {
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| format!("invalid address: {e}"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub category_name: String,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
    pub description: String,
    pub images: Vec<String>,
    pub address: Option<AddressSnapshot>,
    #[serde(serialize_with = "super::timestamp::serialize_opt")]
    pub preferred_date: Option<NaiveDateTime>,
    pub preferred_time: Option<String>,
    pub time_slot: Option<String>,
    pub status: RequestStatus,
    #[serde(serialize_with = "super::timestamp::serialize")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "super::timestamp::serialize")]
    pub updated_at: NaiveDateTime,
}

/// Accepts an RFC 3339 timestamp (what the client's `toISOString()` sends) or
/// a bare `YYYY-MM-DD` date. The result is UTC at whole seconds.
pub fn parse_preferred_date(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc().trunc_subsecs(0));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.trunc_subsecs(0));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid preferredDate: {s}"))
}
