use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Home,
    Office,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Office => "office",
            AddressType::Other => "other",
        }
    }

    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim() {
            "home" => Some(AddressType::Home),
            "office" => Some(AddressType::Office),
            "other" => Some(AddressType::Other),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Self {
        AddressType::from_input(s).unwrap_or(AddressType::Home)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub house_no: String,
    #[serde(default)]
    pub road_area: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub full_address: String,
}

impl LocationAddress {
    /// Trims every part, rejects blanks, and composes the full address when
    /// the client did not send one.
    pub fn normalize(self) -> Result<Self, String> {
        let city = required("city", &self.city)?;
        let house_no = required("houseNo", &self.house_no)?;
        let road_area = required("roadArea", &self.road_area)?;
        let landmark = required("landmark", &self.landmark)?;

        let full_address = match self.full_address.trim() {
            "" => format!("{house_no}, {road_area}, {landmark}, {city}"),
            given => given.to_string(),
        };

        Ok(Self {
            city,
            house_no,
            road_area,
            landmark,
            full_address,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("address.{field} is required"));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude out of range: {}", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude out of range: {}", self.longitude));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub address: LocationAddress,
    pub address_type: AddressType,
    pub coordinates: Coordinates,
    pub is_default: bool,
    #[serde(serialize_with = "super::timestamp::serialize")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "super::timestamp::serialize")]
    pub updated_at: NaiveDateTime,
}
