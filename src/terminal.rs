use crossterm::cursor::MoveToColumn;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use std::fmt::Write as _;
use std::io::Write as _;

use crate::controller::{StatusLine, UploadForm};
use crate::filter::TrackFilter;
use crate::render::{RenderNode, TrackCard};

const ERROR_COLOR: Color = Color::Rgb {
    r: 0xff,
    g: 0x9a,
    b: 0xa2,
};

pub fn card_text(card: &TrackCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", card.track_id, card.timestamp);
    let _ = writeln!(out, "    {}", card.title.as_str().bold());
    let _ = writeln!(out, "    {}", card.details);
    let _ = writeln!(out, "    stream: {}", card.audio_src);
    let _ = write!(out, "    link:   {}", card.share_url);
    out
}

pub fn view_text(nodes: &[RenderNode]) -> String {
    nodes
        .iter()
        .map(|node| match node {
            RenderNode::Card(card) => card_text(card),
            RenderNode::Empty(message) => message.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Filter chips, active one marked.
pub fn filter_bar(active: TrackFilter) -> String {
    TrackFilter::ALL
        .iter()
        .map(|f| {
            if *f == active {
                format!("[{}]", f).cyan().to_string()
            } else {
                format!(" {} ", f)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upload form summary: selection, drop highlight and progress bar.
pub fn form_text(form: &UploadForm) -> String {
    let mut out = format!("Upload: {}", form.selection_label());
    if form.dragover {
        out.push_str(" (drop here)");
    }
    if !form.progress.hidden {
        let filled = form.progress.value as usize / 5;
        let _ = write!(
            out,
            "\n[{}{}] {}%",
            "#".repeat(filled),
            "-".repeat(20 - filled),
            form.progress.value
        );
    }
    out
}

pub fn print_view(nodes: &[RenderNode], active: TrackFilter) {
    println!("{}", filter_bar(active));
    println!();
    println!("{}", view_text(nodes));
}

pub fn print_status(status: &StatusLine) {
    if status.message.is_empty() {
        return;
    }
    let mut stdout = std::io::stdout();
    // Progress ticks share one line; whatever follows replaces the last tick.
    let _ = crossterm::queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
    if status.is_error() {
        let _ = writeln!(stdout, "{}", status.message.as_str().with(ERROR_COLOR));
    } else if status.message.starts_with("Uploading") {
        let _ = write!(stdout, "{}", status.message.as_str().cyan());
    } else {
        let _ = writeln!(stdout, "{}", status.message.as_str().cyan());
    }
    stdout.flush().ok();
}
