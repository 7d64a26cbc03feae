use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    timestamp,
    AddressSnapshot, AddressType, Coordinates, Location, LocationAddress, RequestStatus, Role,
    ServiceRequest, User,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| now())
}

fn now() -> NaiveDateTime {
    timestamp::now()
}

// ── Users ──

const USER_COLUMNS: &str =
    "id, phone, name, profile_image, role, otp, otp_expires_at, is_verified, created_at, updated_at";

/// Creates the user on first contact or replaces the outstanding OTP of an
/// existing one. The role is only taken from the first request.
pub fn upsert_user_otp(
    conn: &Connection,
    phone: &str,
    role: Role,
    otp: &str,
    expires_at: &NaiveDateTime,
) -> anyhow::Result<User> {
    let ts = fmt_ts(&now());
    conn.execute(
        "INSERT INTO users (id, phone, role, otp, otp_expires_at, is_verified, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
         ON CONFLICT(phone) DO UPDATE SET
           otp = excluded.otp,
           otp_expires_at = excluded.otp_expires_at,
           updated_at = excluded.updated_at",
        params![
            uuid::Uuid::new_v4().to_string(),
            phone,
            role.as_str(),
            otp,
            fmt_ts(expires_at),
            ts,
        ],
    )
    .context("failed to upsert user")?;

    get_user_by_phone(conn, phone)?.context("user missing after upsert")
}

pub fn get_user_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?1");
    let user = conn
        .query_row(&sql, params![phone], |row| Ok(parse_user_row(row)))
        .optional()?;
    user.transpose()
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    let user = conn
        .query_row(&sql, params![id], |row| Ok(parse_user_row(row)))
        .optional()?;
    user.transpose()
}

/// Clears the OTP only if it is still the one that was checked, so a code
/// cannot be redeemed twice. Returns false when it was already consumed.
pub fn consume_otp(conn: &Connection, user_id: &str, otp: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET otp = NULL, otp_expires_at = NULL, is_verified = 1, updated_at = ?1
         WHERE id = ?2 AND otp = ?3",
        params![fmt_ts(&now()), user_id, otp],
    )?;
    Ok(count > 0)
}

pub fn update_profile(
    conn: &Connection,
    user_id: &str,
    name: Option<&str>,
    profile_image: Option<&str>,
) -> anyhow::Result<Option<User>> {
    conn.execute(
        "UPDATE users SET
           name = COALESCE(?1, name),
           profile_image = COALESCE(?2, profile_image),
           updated_at = ?3
         WHERE id = ?4",
        params![name, profile_image, fmt_ts(&now()), user_id],
    )?;
    get_user_by_id(conn, user_id)
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(4)?;
    let otp_expires_at: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(User {
        id: row.get(0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        profile_image: row.get(3)?,
        role: Role::parse(&role_str),
        otp: row.get(5)?,
        otp_expires_at: otp_expires_at
            .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
        is_verified: row.get::<_, i32>(7)? != 0,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

// ── Locations ──

pub fn count_locations(conn: &Connection, user_id: &str) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM locations WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Inserts the location; when it is the default, every other location of the
/// owner loses the flag in the same transaction.
pub fn insert_location(conn: &Connection, location: &Location) -> anyhow::Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin location transaction")?;

    if location.is_default {
        tx.execute(
            "UPDATE locations SET is_default = 0, updated_at = ?1
             WHERE user_id = ?2 AND is_default = 1",
            params![fmt_ts(&location.created_at), location.user_id],
        )?;
    }

    tx.execute(
        "INSERT INTO locations (id, user_id, city, house_no, road_area, landmark, full_address,
                                address_type, latitude, longitude, is_default, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            location.id,
            location.user_id,
            location.address.city,
            location.address.house_no,
            location.address.road_area,
            location.address.landmark,
            location.address.full_address,
            location.address_type.as_str(),
            location.coordinates.latitude,
            location.coordinates.longitude,
            location.is_default as i32,
            fmt_ts(&location.created_at),
            fmt_ts(&location.updated_at),
        ],
    )?;

    tx.commit().context("failed to commit location")?;
    Ok(())
}

pub fn list_locations(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, city, house_no, road_area, landmark, full_address, address_type,
                latitude, longitude, is_default, created_at, updated_at
         FROM locations WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_location_row(row)))?;

    let mut locations = vec![];
    for row in rows {
        locations.push(row??);
    }
    Ok(locations)
}

fn parse_location_row(row: &rusqlite::Row) -> anyhow::Result<Location> {
    let address_type: String = row.get(7)?;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    Ok(Location {
        id: row.get(0)?,
        user_id: row.get(1)?,
        address: LocationAddress {
            city: row.get(2)?,
            house_no: row.get(3)?,
            road_area: row.get(4)?,
            landmark: row.get(5)?,
            full_address: row.get(6)?,
        },
        address_type: AddressType::parse(&address_type),
        coordinates: Coordinates {
            latitude: row.get(8)?,
            longitude: row.get(9)?,
        },
        is_default: row.get::<_, i32>(10)? != 0,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

// ── Service Requests ──

pub fn insert_service_request(conn: &Connection, request: &ServiceRequest) -> anyhow::Result<()> {
    let images = serde_json::to_string(&request.images)?;
    let address = request
        .address
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO service_requests (id, user_id, category_name, category_icon, category_color,
                                       description, images, address, preferred_date, preferred_time,
                                       time_slot, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            request.id,
            request.user_id,
            request.category_name,
            request.category_icon,
            request.category_color,
            request.description,
            images,
            address,
            request.preferred_date.as_ref().map(fmt_ts),
            request.preferred_time,
            request.time_slot,
            request.status.as_str(),
            fmt_ts(&request.created_at),
            fmt_ts(&request.updated_at),
        ],
    )?;
    Ok(())
}

pub fn list_service_requests(
    conn: &Connection,
    user_id: &str,
) -> anyhow::Result<Vec<ServiceRequest>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, category_name, category_icon, category_color, description, images,
                address, preferred_date, preferred_time, time_slot, status, created_at, updated_at
         FROM service_requests WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_service_request_row(row)))?;

    let mut requests = vec![];
    for row in rows {
        requests.push(row??);
    }
    Ok(requests)
}

fn parse_service_request_row(row: &rusqlite::Row) -> anyhow::Result<ServiceRequest> {
    let images_json: String = row.get(6)?;
    let address_json: Option<String> = row.get(7)?;
    let preferred_date: Option<String> = row.get(8)?;
    let status_str: String = row.get(11)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    let images: Vec<String> = serde_json::from_str(&images_json).unwrap_or_default();
    let address = address_json
        .as_deref()
        .map(serde_json::from_str::<AddressSnapshot>)
        .transpose()
        .context("corrupt address snapshot")?;

    Ok(ServiceRequest {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_name: row.get(2)?,
        category_icon: row.get(3)?,
        category_color: row.get(4)?,
        description: row.get(5)?,
        images,
        address,
        preferred_date: preferred_date
            .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
        preferred_time: row.get(9)?,
        time_slot: row.get(10)?,
        status: RequestStatus::parse(&status_str),
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}
