//! Wire and storage form of timestamps. Values are naive UTC held at whole
//! seconds, matching the precision of the database columns, and go out as
//! RFC 3339 with a `Z` suffix.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::Serializer;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Current UTC time truncated to the stored precision.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&dt.format(WIRE_FORMAT))
}

pub fn serialize_opt<S: Serializer>(
    dt: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => serialize(dt, serializer),
        None => serializer.serialize_none(),
    }
}
