//! In-process stand-in for the archive server, used by the HTTP tests.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub enum Reply {
    Tracks(Vec<Value>),
    Json(u16, Value),
    Status(u16, String),
}

impl Reply {
    /// `count` tracks with ids 1..=count, each 500 kB larger than the last.
    pub fn tracks(count: i64) -> Self {
        let tracks = (1..=count)
            .map(|i| track_json(i, &format!("track-{}", i), i as u64 * 500_000))
            .collect();
        Reply::Tracks(tracks)
    }

    pub fn track_list(tracks: Vec<Value>) -> Self {
        Reply::Tracks(tracks)
    }

    pub fn created(id: i64, title: &str) -> Self {
        Reply::Json(201, json!({ "track": track_json(id, title, 4_096) }))
    }

    pub fn status(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }

    fn respond(&self) -> Response {
        match self {
            Reply::Tracks(tracks) => Json(tracks.clone()).into_response(),
            Reply::Json(code, body) => (status_code(*code), Json(body.clone())).into_response(),
            Reply::Status(code, body) => (status_code(*code), body.clone()).into_response(),
        }
    }
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

pub fn track_json(id: i64, title: &str, filesize: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "original_filename": format!("{}.mp3", title),
        "content_type": "audio/mpeg",
        "filesize": filesize,
        "uploaded_at": "2024-05-01T12:00:00.000000"
    })
}

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub file_name: String,
    pub content_type: String,
    pub len: usize,
}

struct ServerState {
    list: Reply,
    upload: Reply,
    uploads: Mutex<Vec<ReceivedUpload>>,
    upload_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

pub struct TestServer {
    pub url: String,
    state: Arc<ServerState>,
}

impl TestServer {
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> usize {
        self.state.upload_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }
}

pub async fn spawn(list: Reply, upload: Reply) -> TestServer {
    let state = Arc::new(ServerState {
        list,
        upload,
        uploads: Mutex::new(Vec::new()),
        upload_calls: AtomicUsize::new(0),
        list_calls: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/api/tracks", get(serve_tracks))
        .route("/api/tracks/{id}", get(serve_track))
        .route("/api/upload", post(receive_upload))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        url: format!("http://{}", addr),
        state,
    }
}

/// Address nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve_tracks(State(state): State<Arc<ServerState>>) -> Response {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    state.list.respond()
}

async fn serve_track(State(state): State<Arc<ServerState>>, Path(id): Path<i64>) -> Response {
    if let Reply::Tracks(tracks) = &state.list {
        if let Some(track) = tracks.iter().find(|t| t["id"] == json!(id)) {
            return Json(track.clone()).into_response();
        }
    }
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Track not found"}))).into_response()
}

async fn receive_upload(State(state): State<Arc<ServerState>>, mut multipart: Multipart) -> Response {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.uploads.lock().unwrap().push(ReceivedUpload {
            file_name,
            content_type,
            len,
        });
    }

    state.upload.respond()
}
