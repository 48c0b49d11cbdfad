use clap::ValueEnum;
use std::fmt;

use crate::track::Track;

/// Number of entries shown by the `recent` filter.
pub const RECENT_LIMIT: usize = 6;

/// Minimum size for the `longform` filter (10 MiB).
pub const LONGFORM_MIN_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TrackFilter {
    #[default]
    All,
    Recent,
    Longform,
}

impl TrackFilter {
    pub const ALL: [TrackFilter; 3] = [TrackFilter::All, TrackFilter::Recent, TrackFilter::Longform];

    /// Unknown names fall back to `All`, the same as an unlabelled filter chip.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "recent" => TrackFilter::Recent,
            "longform" => TrackFilter::Longform,
            _ => TrackFilter::All,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackFilter::All => "all",
            TrackFilter::Recent => "recent",
            TrackFilter::Longform => "longform",
        }
    }

    /// Visible subset of `tracks`, in their current order.
    pub fn apply(self, tracks: &[Track]) -> Vec<&Track> {
        match self {
            TrackFilter::All => tracks.iter().collect(),
            TrackFilter::Recent => tracks.iter().take(RECENT_LIMIT).collect(),
            TrackFilter::Longform => tracks
                .iter()
                .filter(|t| t.filesize >= LONGFORM_MIN_BYTES)
                .collect(),
        }
    }
}

impl fmt::Display for TrackFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
