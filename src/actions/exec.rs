use anyhow::{anyhow, bail};
use std::path::Path;
use std::process::{Command, Stdio};

/// Split a desktop-entry command line into program and arguments. Leftover
/// field codes such as `%u` are dropped.
pub fn command_tokens(command: &str) -> anyhow::Result<Vec<String>> {
    let tokens: Vec<String> = shlex::split(command)
        .ok_or_else(|| anyhow!("unbalanced quotes in '{command}'"))?
        .into_iter()
        .filter(|t| !(t.len() == 2 && t.starts_with('%')))
        .collect();
    if tokens.is_empty() {
        bail!("empty command");
    }
    Ok(tokens)
}

/// Start `command` detached from the launcher.
pub fn launch(command: &str) -> anyhow::Result<()> {
    let tokens = command_tokens(command)?;
    Command::new(&tokens[0])
        .args(&tokens[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| anyhow!("failed to start '{}': {e}", tokens[0]))
}

pub fn open_path(path: &Path) -> anyhow::Result<()> {
    open::that(path).map_err(|e| e.into())
}
