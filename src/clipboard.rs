use anyhow::{Context, Result};

/// Where copy-link sends stream URLs.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard. The handle is opened on first copy and then kept
/// for the life of the process: on X11 and Wayland the copied text is served
/// by its owner, so dropping the handle right away would lose it unless a
/// clipboard manager picks it up. A failed open is retried on the next copy.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.handle.is_none() {
            self.handle = Some(arboard::Clipboard::new().context("Clipboard unavailable")?);
        }
        self.handle.as_mut().context("Clipboard unavailable")
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let handle = self.handle()?;
        if let Err(e) = handle.set_text(text.to_string()) {
            // A stale handle (display restarted, owner lost) is reopened next time.
            self.handle = None;
            return Err(e).context("Failed to write to clipboard");
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("clipboard disabled");
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clipboard_starts_closed() {
        let clipboard = SystemClipboard::new();
        assert!(clipboard.handle.is_none());
    }

    #[test]
    fn test_system_clipboard_keeps_handle_after_copy() {
        let mut clipboard = SystemClipboard::new();
        // Headless test hosts have no clipboard; nothing is kept then.
        match clipboard.write_text("http://archive.test/stream/1") {
            Ok(()) => assert!(clipboard.handle.is_some()),
            Err(_) => assert!(clipboard.handle.is_none()),
        }
    }
}
