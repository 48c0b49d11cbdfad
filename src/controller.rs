//! Archive page controller.
//!
//! Owns the track list, active filter, upload form and status line. Every
//! user interaction arrives as a [`UiAction`] through [`ArchiveController::dispatch`].

use chrono::Utc;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::api::{ArchiveClient, SelectedFile, UploadProgress};
use crate::clipboard::Clipboard;
use crate::error::ArchiveError;
use crate::filter::TrackFilter;
use crate::render::{self, RenderNode};
use crate::track::{TrackId, TrackList};

pub const NO_FILE_LABEL: &str = "No file selected";
pub const NO_FILE_MESSAGE: &str = "Please select an audio file to upload.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Info,
    Error,
}

/// The single line all user-visible messages go through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub message: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn is_error(&self) -> bool {
        self.tone == StatusTone::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressIndicator {
    pub hidden: bool,
    pub value: u8,
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self {
            hidden: true,
            value: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub selected: Option<SelectedFile>,
    pub dragover: bool,
    pub progress: ProgressIndicator,
    /// Set while a submission is on the wire; the form is disabled meanwhile.
    pub in_flight: bool,
}

impl UploadForm {
    pub fn selection_label(&self) -> &str {
        self.selected
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or(NO_FILE_LABEL)
    }

    fn reset(&mut self) {
        self.selected = None;
        self.dragover = false;
        self.progress = ProgressIndicator::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    LoadTracks,
    SelectFile(PathBuf),
    DragOver,
    DragLeave,
    Drop(Vec<PathBuf>),
    Submit,
    SelectFilter(TrackFilter),
    CopyLink(TrackId),
}

type StatusListener = Box<dyn FnMut(&StatusLine)>;

pub struct ArchiveController<C: Clipboard> {
    client: ArchiveClient,
    origin: String,
    clipboard: C,
    tracks: TrackList,
    filter: TrackFilter,
    form: UploadForm,
    status: StatusLine,
    view: Vec<RenderNode>,
    status_listener: Option<StatusListener>,
}

impl<C: Clipboard> ArchiveController<C> {
    pub fn new(client: ArchiveClient, clipboard: C) -> Self {
        let origin = client.origin();
        Self {
            client,
            origin,
            clipboard,
            tracks: TrackList::default(),
            filter: TrackFilter::default(),
            form: UploadForm::default(),
            status: StatusLine::default(),
            view: Vec::new(),
            status_listener: None,
        }
    }

    /// Called on every status change, including each progress tick.
    pub fn on_status(mut self, listener: impl FnMut(&StatusLine) + 'static) -> Self {
        self.status_listener = Some(Box::new(listener));
        self
    }

    pub fn tracks(&self) -> &TrackList {
        &self.tracks
    }

    pub fn filter(&self) -> TrackFilter {
        self.filter
    }

    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn view(&self) -> &[RenderNode] {
        &self.view
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Handle one UI action. Returns `true` when the track view was re-rendered.
    pub async fn dispatch(&mut self, action: UiAction) -> bool {
        log::debug!("dispatch {:?}", action);
        match action {
            UiAction::LoadTracks => self.load_tracks().await,
            UiAction::SelectFile(path) => {
                self.select_file(path);
                false
            }
            UiAction::DragOver => {
                self.form.dragover = true;
                false
            }
            UiAction::DragLeave => {
                self.form.dragover = false;
                false
            }
            UiAction::Drop(paths) => {
                self.form.dragover = false;
                if let Some(first) = paths.into_iter().next() {
                    self.select_file(first);
                }
                false
            }
            UiAction::Submit => self.submit().await,
            UiAction::SelectFilter(filter) => {
                self.filter = filter;
                self.render();
                true
            }
            UiAction::CopyLink(id) => {
                self.copy_link(&id);
                false
            }
        }
    }

    fn render(&mut self) {
        self.view = render::render(&self.tracks, self.filter, Utc::now(), &self.origin);
    }

    fn set_status(&mut self, message: impl Into<String>, tone: StatusTone) {
        self.status = StatusLine {
            message: message.into(),
            tone,
        };
        if let Some(listener) = self.status_listener.as_mut() {
            listener(&self.status);
        }
    }

    fn report(&mut self, err: ArchiveError) {
        match std::error::Error::source(&err) {
            Some(source) => log::warn!("{}: {}", err, source),
            None => log::debug!("{}", err),
        }
        self.set_status(err.to_string(), StatusTone::Error);
    }

    async fn load_tracks(&mut self) -> bool {
        match self.client.fetch_tracks().await {
            Ok(tracks) => {
                log::info!("Loaded {} tracks", tracks.len());
                self.tracks.replace(tracks);
                self.render();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    fn select_file(&mut self, path: PathBuf) {
        let file = SelectedFile::new(path);
        log::debug!("Selected {}", file.path.display());
        self.form.selected = Some(file);
    }

    async fn submit(&mut self) -> bool {
        if self.form.in_flight {
            self.report(ArchiveError::UploadInFlight);
            return false;
        }
        let Some(file) = self.form.selected.clone() else {
            self.report(ArchiveError::UploadValidation(NO_FILE_MESSAGE.to_string()));
            return false;
        };

        self.form.in_flight = true;
        self.set_status("Starting upload…", StatusTone::Info);

        let client = self.client.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let upload = client.upload(&file, tx);
        tokio::pin!(upload);

        let result = loop {
            tokio::select! {
                biased;
                Some(progress) = rx.recv() => self.on_progress(progress),
                result = &mut upload => break result,
            }
        };
        while let Ok(progress) = rx.try_recv() {
            self.on_progress(progress);
        }
        self.form.in_flight = false;

        match result {
            Ok(track) => {
                let message = format!("\"{}\" added to the archive.", track.title);
                self.tracks.prepend(track);
                self.render();
                self.set_status(message, StatusTone::Info);
                self.form.reset();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    fn on_progress(&mut self, progress: UploadProgress) {
        if let Some(percent) = progress.percent() {
            self.form.progress.hidden = false;
            self.form.progress.value = percent;
            self.set_status(format!("Uploading… {}%", percent), StatusTone::Info);
        }
    }

    fn copy_link(&mut self, id: &TrackId) {
        let found = self.tracks.find(id).map(|t| (t.title.clone(), t.id.clone()));
        let Some((title, found)) = found else {
            self.report(ArchiveError::TrackNotFound(id.clone()));
            return;
        };
        let url = render::stream_url(&self.origin, &found);
        match self.clipboard.write_text(&url) {
            Ok(()) => self.set_status(format!("Copied stream URL for \"{}\"", title), StatusTone::Info),
            Err(e) => self.report(ArchiveError::Clipboard(e)),
        }
    }
}
