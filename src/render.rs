use chrono::{DateTime, Utc};

use crate::filter::TrackFilter;
use crate::format::{format_filesize, format_relative_time};
use crate::track::{Track, TrackId, TrackList};

pub const EMPTY_STATE_MESSAGE: &str =
    "No audio relics yet. Upload your first echo to begin the archive!";

/// Everything a track card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCard {
    pub track_id: TrackId,
    pub timestamp: String,
    pub title: String,
    pub details: String,
    /// Source for the card's audio player, relative to the server.
    pub audio_src: String,
    /// Absolute link placed on the clipboard by the copy control.
    pub share_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Card(TrackCard),
    Empty(&'static str),
}

pub fn stream_path(id: &TrackId) -> String {
    format!("/stream/{}", id)
}

pub fn stream_url(origin: &str, id: &TrackId) -> String {
    format!("{}{}", origin.trim_end_matches('/'), stream_path(id))
}

pub fn card_for(track: &Track, now: DateTime<Utc>, origin: &str) -> TrackCard {
    TrackCard {
        track_id: track.id.clone(),
        timestamp: format_relative_time(track.uploaded_at, now),
        title: track.title.clone(),
        details: format!(
            "{} · {}",
            track.original_filename,
            format_filesize(track.filesize)
        ),
        audio_src: stream_path(&track.id),
        share_url: stream_url(origin, &track.id),
    }
}

/// Project the list through `filter` into cards, or a lone empty-state node.
pub fn render(
    tracks: &TrackList,
    filter: TrackFilter,
    now: DateTime<Utc>,
    origin: &str,
) -> Vec<RenderNode> {
    let visible = filter.apply(tracks.as_slice());
    if visible.is_empty() {
        return vec![RenderNode::Empty(EMPTY_STATE_MESSAGE)];
    }
    visible
        .into_iter()
        .map(|track| RenderNode::Card(card_for(track, now, origin)))
        .collect()
}
