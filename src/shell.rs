use std::path::PathBuf;

use crate::controller::UiAction;
use crate::filter::TrackFilter;
use crate::track::TrackId;

pub const HELP: &str = "\
Commands:
  filter <all|recent|longform>   switch the visible filter
  select <path>                  pick a file for upload
  drop <path> [path...]          drop files on the upload zone (first one wins)
  upload                         upload the selected file
  copy <id>                      copy a track's stream link
  reload                         fetch the track list again
  list                           show the current view
  help                           show this help
  quit                           leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Action(UiAction),
    /// A drop is a drag-over followed by the drop itself.
    DropFiles(Vec<PathBuf>),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let parsed = match command.to_ascii_lowercase().as_str() {
        "filter" => {
            let name = rest.first().copied().unwrap_or("all");
            ShellCommand::Action(UiAction::SelectFilter(TrackFilter::from_name(name)))
        }
        "select" => {
            if rest.is_empty() {
                return Err("usage: select <path>".to_string());
            }
            // Paths may contain spaces.
            ShellCommand::Action(UiAction::SelectFile(PathBuf::from(rest.join(" "))))
        }
        "drop" => ShellCommand::DropFiles(rest.iter().map(PathBuf::from).collect()),
        "upload" | "submit" => ShellCommand::Action(UiAction::Submit),
        "copy" => match rest.first() {
            Some(id) => ShellCommand::Action(UiAction::CopyLink(TrackId::from(*id))),
            None => return Err("usage: copy <id>".to_string()),
        },
        "reload" => ShellCommand::Action(UiAction::LoadTracks),
        "list" | "ls" => ShellCommand::List,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(parsed))
}
