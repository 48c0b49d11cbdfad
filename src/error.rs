use thiserror::Error;

use crate::track::TrackId;

/// Every failure the controller can report. `Display` is the exact text
/// shown on the status line.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to load tracks")]
    TrackListLoad(#[source] Option<reqwest::Error>),

    #[error("{0}")]
    UploadValidation(String),

    #[error("{}", transport_message(.0))]
    UploadTransport(Option<String>),

    #[error("Network error while uploading.")]
    UploadNetwork(#[source] reqwest::Error),

    #[error("Upload succeeded but response was invalid.")]
    UploadResponseMalformed,

    #[error("An upload is already in progress.")]
    UploadInFlight,

    #[error("Unable to copy link. Please copy manually.")]
    Clipboard(#[source] anyhow::Error),

    #[error("Track {0} is not in the archive.")]
    TrackNotFound(TrackId),

    #[error("Invalid server URL: {0}")]
    InvalidServerUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Any non-empty body is shown as sent, whitespace included.
fn transport_message(body: &Option<String>) -> String {
    match body.as_deref() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "Upload failed.".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
