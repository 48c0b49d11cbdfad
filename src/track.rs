use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Opaque track identifier. The archive hands out integers today, but
/// nothing on this side depends on that.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TrackId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Number(n) => write!(f, "{}", n),
            TrackId::Text(s) => f.write_str(s),
        }
    }
}

/// Typed ids become numbers only when they print back unchanged, so "007"
/// or "+7" stay text.
impl From<&str> for TrackId {
    fn from(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => TrackId::Number(n),
            _ => TrackId::Text(raw.to_string()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub original_filename: String,
    pub filesize: u64,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UploadResponse {
    pub track: Option<Track>,
}

/// Accepts RFC 3339 as well as the naive ISO form the server writes out of
/// its database (no offset, optional fractional seconds), read as UTC.
/// Anything else becomes `None` rather than rejecting the whole track.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// In-memory copy of the archive: server order, with local uploads in front.
#[derive(Debug, Default, Clone)]
pub struct TrackList {
    tracks: Vec<Track>,
}

impl TrackList {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Replace the whole list with a fresh server snapshot.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    pub fn prepend(&mut self, track: Track) {
        self.tracks.insert(0, track);
    }

    /// Matches on the printed id: `7` and `"7"` name the same track.
    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        let wanted = id.to_string();
        self.tracks.iter().find(|t| t.id.to_string() == wanted)
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn sample_track(id: i64, title: &str, filesize: u64) -> Track {
    Track {
        id: TrackId::Number(id),
        title: title.to_string(),
        original_filename: format!("{}.mp3", title),
        filesize,
        uploaded_at: parse_timestamp("2024-05-01T12:00:00Z"),
        content_type: Some("audio/mpeg".to_string()),
    }
}
