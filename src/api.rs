use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::error::{ArchiveError, Result};
use crate::track::{Track, TrackId, UploadResponse};

/// Size of each body chunk handed to the transport; one progress event per chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
/// Chunks read from disk but not yet taken by the connection.
const UPLOAD_CHUNKS_AHEAD: usize = 4;

/// Bytes sent so far. `total` is `None` when the transport cannot tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl UploadProgress {
    /// Rounded percentage, only when the total is known and non-zero.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|t| *t > 0)?;
        let ratio = self.loaded.min(total) as f64 / total as f64;
        Some((ratio * 100.0).round() as u8)
    }
}

/// A file picked through the file input or dropped on the dropzone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }

    /// The server only accepts `audio/*` uploads.
    pub fn content_type(&self) -> &'static str {
        audio_content_type(&self.path)
    }
}

fn audio_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

fn unreadable(file: &SelectedFile, err: std::io::Error) -> ArchiveError {
    ArchiveError::UploadValidation(format!("Unable to read {}: {}", file.name, err))
}

/// HTTP side of the archive: track listing, single lookups and uploads.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: Url,
}

impl ArchiveClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ArchiveError::InvalidServerUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ArchiveError::InvalidServerUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Scheme, host and port, used to build shareable stream links.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ArchiveError::InvalidServerUrl(e.to_string()))
    }

    pub async fn fetch_tracks(&self) -> Result<Vec<Track>> {
        let url = self.endpoint("api/tracks")?;
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArchiveError::TrackListLoad(Some(e)))?;

        if !resp.status().is_success() {
            log::warn!("Track list request returned {}", resp.status());
            return Err(ArchiveError::TrackListLoad(None));
        }

        resp.json::<Vec<Track>>()
            .await
            .map_err(|e| ArchiveError::TrackListLoad(Some(e)))
    }

    pub async fn fetch_track(&self, id: &TrackId) -> Result<Track> {
        let url = self.endpoint(&format!("api/tracks/{}", id))?;
        log::debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ArchiveError::TrackNotFound(id.clone()));
        }
        let track = resp.error_for_status()?.json::<Track>().await?;
        Ok(track)
    }

    /// Send `file` as multipart field `file`, pushing progress events to
    /// `progress` as body chunks are handed to the connection.
    pub async fn upload(
        &self,
        file: &SelectedFile,
        progress: UnboundedSender<UploadProgress>,
    ) -> Result<Track> {
        let mut source = tokio::fs::File::open(&file.path)
            .await
            .map_err(|e| unreadable(file, e))?;
        let total = source.metadata().await.map_err(|e| unreadable(file, e))?.len();
        let url = self.endpoint("api/upload")?;
        log::info!("Uploading {} ({} bytes) to {}", file.name, total, url);

        // The file is read chunk by chunk as the connection drains the body,
        // so at most a few chunks are held in memory at once.
        let (chunk_tx, chunk_rx) =
            mpsc::channel::<std::io::Result<Vec<u8>>>(UPLOAD_CHUNKS_AHEAD);
        tokio::spawn(async move {
            loop {
                let mut chunk = vec![0u8; UPLOAD_CHUNK_SIZE];
                let next = match source.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        chunk.truncate(n);
                        Ok(chunk)
                    }
                    Err(e) => Err(e),
                };
                let failed = next.is_err();
                // A closed channel means the request is gone.
                if chunk_tx.send(next).await.is_err() || failed {
                    break;
                }
            }
        });

        let mut loaded = 0u64;
        let body_stream = ReceiverStream::new(chunk_rx).map(move |chunk| {
            if let Ok(chunk) = &chunk {
                loaded += chunk.len() as u64;
                // Receiver gone just means nobody is watching.
                let _ = progress.send(UploadProgress {
                    loaded,
                    total: Some(total),
                });
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(body_stream), total)
            .file_name(file.name.clone())
            .mime_str(file.content_type())?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ArchiveError::UploadNetwork)?;

        let status = resp.status();
        let body = resp.text().await.map_err(ArchiveError::UploadNetwork)?;

        if !status.is_success() {
            log::warn!("Upload of {} rejected with {}", file.name, status);
            let message = if body.is_empty() { None } else { Some(body) };
            return Err(ArchiveError::UploadTransport(message));
        }

        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(UploadResponse { track: Some(track) }) => Ok(track),
            Ok(UploadResponse { track: None }) | Err(_) => {
                log::warn!("Upload response was not a track payload: {:?}", body);
                Err(ArchiveError::UploadResponseMalformed)
            }
        }
    }
}
