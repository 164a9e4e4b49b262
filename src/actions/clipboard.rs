use arboard::Clipboard;
use std::io::Write;
use std::process::{Command, Stdio};

fn wl_copy(text: &str) -> anyhow::Result<()> {
    let mut child = Command::new("wl-copy")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    anyhow::ensure!(status.success(), "wl-copy exited with {status}");
    Ok(())
}

/// Put `text` on the clipboard, preferring `wl-copy` under Wayland.
pub fn set_text(text: &str) -> anyhow::Result<()> {
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        match wl_copy(text) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!("wl-copy unavailable, using arboard: {}", e),
        }
    }
    let mut cb = Clipboard::new()?;
    cb.set_text(text.to_string())?;
    Ok(())
}
