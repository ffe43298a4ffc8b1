use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Token pair issued by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(
        rename = "accessTokenExpirationDate",
        deserialize_with = "deserialize_timestamp"
    )]
    pub expires_at: DateTime<FixedOffset>,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        is_past(&self.expires_at)
    }
}

/// An instant is "past" when it is at or before now.
pub(crate) fn is_past(instant: &DateTime<FixedOffset>) -> bool {
    instant.with_timezone(&Utc) <= Utc::now()
}

/// Parse an ISO-8601 timestamp, keeping its offset.
///
/// The portal sometimes omits the offset; such values are wall-clock time
/// in the local zone. A wall-clock time skipped by a DST jump is rejected.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).or_else(|err| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|local| local.fixed_offset())
            .ok_or(err)
    })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
