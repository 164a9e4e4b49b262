use anyhow::bail;
use std::path::Path;
use std::process::{Command, Stdio};

pub const PATH_PLACEHOLDER: &str = "{path}";

/// Expand the wallpaper command template for `path`. Without a `{path}`
/// token the path is appended as the last argument.
pub fn command_for(template: &str, path: &Path) -> anyhow::Result<Vec<String>> {
    let Some(tokens) = shlex::split(template) else {
        bail!("cannot parse wallpaper command '{template}'");
    };
    if tokens.is_empty() {
        bail!("wallpaper command is empty");
    }
    let path = path.to_string_lossy();
    let mut args: Vec<String> = tokens
        .iter()
        .map(|t| t.replace(PATH_PLACEHOLDER, &path))
        .collect();
    if !tokens.iter().any(|t| t.contains(PATH_PLACEHOLDER)) {
        args.push(path.into_owned());
    }
    Ok(args)
}

/// Run the wallpaper command and wait for it. Fails on a non-zero exit.
pub fn apply(template: &str, path: &Path) -> anyhow::Result<()> {
    let args = command_for(template, path)?;
    let status = Command::new(&args[0])
        .args(&args[1..])
        .stdin(Stdio::null())
        .status()?;
    if !status.success() {
        bail!("'{}' exited with {status}", args[0]);
    }
    tracing::info!("wallpaper set to {}", path.display());
    Ok(())
}
