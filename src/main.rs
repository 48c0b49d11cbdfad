use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

pub mod api;
pub mod clipboard;
pub mod controller;
pub mod error;
pub mod filter;
pub mod format;
pub mod render;
pub mod shell;
pub mod terminal;
pub mod track;

#[cfg(test)]
mod test_server;

use api::ArchiveClient;
use clipboard::SystemClipboard;
use controller::{ArchiveController, StatusLine, UiAction};
use filter::TrackFilter;
use shell::ShellCommand;
use track::TrackId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and upload to the audio archive", long_about = None)]
struct Cli {
    /// Base URL of the archive server
    #[arg(
        long,
        global = true,
        env = "ARCHIVE_SERVER_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the archive's tracks
    List(ListArgs),
    /// Upload an audio file
    Upload(UploadArgs),
    /// Show a single track
    Show(TrackArgs),
    /// Copy a track's stream URL to the clipboard
    CopyLink(TrackArgs),
    /// Interactive session
    Shell,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Which tracks to show
    #[arg(short, long, value_enum, default_value_t = TrackFilter::All)]
    filter: TrackFilter,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// Audio file to upload
    file: PathBuf,

    /// Filter applied to the list printed after the upload
    #[arg(short, long, value_enum, default_value_t = TrackFilter::All)]
    filter: TrackFilter,
}

#[derive(Parser, Debug)]
struct TrackArgs {
    /// Track identifier
    id: String,
}

type Controller = ArchiveController<SystemClipboard>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    log::debug!("Using archive at {}", cli.server);

    match cli.command {
        Commands::List(args) => run_list(&cli.server, args).await,
        Commands::Upload(args) => run_upload(&cli.server, args).await,
        Commands::Show(args) => run_show(&cli.server, args).await,
        Commands::CopyLink(args) => run_copy_link(&cli.server, args).await,
        Commands::Shell => run_shell(&cli.server).await,
    }
}

fn connect(server: &str) -> Result<Controller> {
    let client = ArchiveClient::new(server).context("Failed to configure archive client")?;
    Ok(ArchiveController::new(client, SystemClipboard::new()).on_status(terminal::print_status))
}

/// The status listener has already printed any error, so the exit code is
/// all that is left to report.
fn exit_code(status: &StatusLine) -> u8 {
    if status.is_error() {
        1
    } else {
        0
    }
}

fn finish(ctl: &Controller) -> Result<ExitCode> {
    Ok(ExitCode::from(exit_code(ctl.status())))
}

async fn run_list(server: &str, args: ListArgs) -> Result<ExitCode> {
    let mut ctl = connect(server)?;
    if !ctl.dispatch(UiAction::LoadTracks).await {
        return finish(&ctl);
    }
    ctl.dispatch(UiAction::SelectFilter(args.filter)).await;
    terminal::print_view(ctl.view(), ctl.filter());
    Ok(ExitCode::SUCCESS)
}

async fn run_upload(server: &str, args: UploadArgs) -> Result<ExitCode> {
    let mut ctl = connect(server)?;
    // A failed listing does not block the upload.
    ctl.dispatch(UiAction::LoadTracks).await;
    ctl.dispatch(UiAction::SelectFilter(args.filter)).await;
    ctl.dispatch(UiAction::SelectFile(args.file)).await;

    if ctl.dispatch(UiAction::Submit).await {
        println!();
        terminal::print_view(ctl.view(), ctl.filter());
        return Ok(ExitCode::SUCCESS);
    }
    finish(&ctl)
}

async fn run_show(server: &str, args: TrackArgs) -> Result<ExitCode> {
    let client = ArchiveClient::new(server).context("Failed to configure archive client")?;
    let track = client.fetch_track(&TrackId::from(args.id.as_str())).await?;
    let card = render::card_for(&track, Utc::now(), &client.origin());
    println!("{}", terminal::card_text(&card));
    if let Some(content_type) = &track.content_type {
        println!("    type:   {}", content_type);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_copy_link(server: &str, args: TrackArgs) -> Result<ExitCode> {
    let mut ctl = connect(server)?;
    if !ctl.dispatch(UiAction::LoadTracks).await {
        return finish(&ctl);
    }
    let id = TrackId::from(args.id.as_str());
    ctl.dispatch(UiAction::CopyLink(id.clone())).await;
    if let Some(track) = ctl.tracks().find(&id) {
        // Also printed: without a clipboard manager the copy is gone once
        // this process exits.
        println!("{}", render::stream_url(ctl.origin(), &track.id));
    }
    finish(&ctl)
}

async fn run_shell(server: &str) -> Result<ExitCode> {
    let mut ctl = connect(server)?;
    if ctl.dispatch(UiAction::LoadTracks).await {
        terminal::print_view(ctl.view(), ctl.filter());
    }
    println!();
    println!("{}", shell::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\narchive> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        let command = match shell::parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{}", shell::HELP),
            ShellCommand::List => {
                terminal::print_view(ctl.view(), ctl.filter());
                println!("\n{}", terminal::form_text(ctl.form()));
            }
            ShellCommand::DropFiles(paths) => {
                ctl.dispatch(UiAction::DragOver).await;
                ctl.dispatch(UiAction::Drop(paths)).await;
                println!("Selected: {}", ctl.form().selection_label());
            }
            ShellCommand::Action(action) => {
                let selecting = matches!(action, UiAction::SelectFile(_));
                if ctl.dispatch(action).await {
                    println!();
                    terminal::print_view(ctl.view(), ctl.filter());
                }
                if selecting {
                    println!("Selected: {}", ctl.form().selection_label());
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
