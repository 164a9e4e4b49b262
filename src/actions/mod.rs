use std::path::PathBuf;

/// What activating an entry does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Spawn a desktop entry's command line. `usage_key` is the name counted
    /// in the usage cache after a successful launch.
    Launch {
        command: String,
        usage_key: Option<String>,
    },
    /// Open a file or folder with the default handler.
    Open(PathBuf),
    CopyText(String),
    SetWallpaper(PathBuf),
}

impl Action {
    pub fn usage_key(&self) -> Option<&str> {
        match self {
            Action::Launch { usage_key, .. } => usage_key.as_deref(),
            _ => None,
        }
    }
}

pub mod clipboard;
pub mod exec;
pub mod wallpaper;
