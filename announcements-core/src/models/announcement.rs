use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between independently rendered body segments.
pub const SEGMENT_SEPARATOR: char = '\\';

/// A notice published by the hub's announcement service.
///
/// Records are immutable once fetched. The `timestamp` string is the
/// announcement's identity: it is what the dismissed set stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// ISO-8601 time without a zone marker, interpreted as UTC.
    pub timestamp: String,
    /// Markdown body. Segments are separated by a literal backslash.
    pub announcement: String,
    /// Name of the hub user who posted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Announcement {
    pub fn new(timestamp: impl Into<String>, announcement: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            announcement: announcement.into(),
            user: None,
        }
    }

    /// Parse the timestamp as UTC.
    ///
    /// The service emits naive times (`2024-03-01T09:30:00.123456`), which
    /// are read as UTC. Zoned RFC 3339 strings are also accepted.
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Body segments, split on the backslash separator.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.announcement.split(SEGMENT_SEPARATOR)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Response of the `latest` endpoint.
///
/// An empty queue yields `{"announcement": ""}` with no timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestAnnouncement {
    #[serde(default)]
    pub announcement: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// Site-specific extra info, present with `extra=separate`.
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

impl LatestAnnouncement {
    pub fn is_empty(&self) -> bool {
        self.announcement.is_empty() && self.extra.is_none()
    }

    /// Convert to a regular announcement when the record carries a timestamp.
    pub fn into_announcement(self) -> Option<Announcement> {
        let timestamp = self.timestamp?;
        Some(Announcement {
            timestamp,
            announcement: self.announcement,
            user: self.user,
        })
    }
}

/// How the `latest` endpoint should attach extra info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraMode {
    /// Extra info returned in its own `extra` field.
    Separate,
    /// Extra info appended to the announcement text.
    Combined,
}

impl ExtraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraMode::Separate => "separate",
            ExtraMode::Combined => "combined",
        }
    }
}

impl std::str::FromStr for ExtraMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "separate" => Ok(ExtraMode::Separate),
            "combined" => Ok(ExtraMode::Combined),
            other => Err(format!("unknown extra mode: {}", other)),
        }
    }
}
