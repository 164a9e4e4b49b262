//! `.desktop` file parsing and the application directory scan.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw keys of the `[Desktop Entry]` group. The first occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub exec: Option<String>,
    pub entry_type: Option<String>,
    pub hidden: bool,
    pub no_display: bool,
}

/// A launchable application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// File name, used to de-duplicate across directories.
    pub id: String,
    pub name: String,
    pub icon: String,
    pub exec: String,
}

pub fn parse(content: &str) -> ParsedEntry {
    let mut entry = ParsedEntry::default();
    let mut in_main = true;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_main = line == "[Desktop Entry]";
            continue;
        }
        if !in_main {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Name" if entry.name.is_none() => entry.name = Some(value.to_string()),
            "Icon" if entry.icon.is_none() => entry.icon = Some(value.to_string()),
            "Exec" if entry.exec.is_none() => entry.exec = Some(strip_field_codes(value)),
            "Type" if entry.entry_type.is_none() => entry.entry_type = Some(value.to_string()),
            "Hidden" => entry.hidden |= value.eq_ignore_ascii_case("true"),
            "NoDisplay" => entry.no_display |= value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
    entry
}

/// Cut the command at its first field code (`%U`, `%f`, ...).
pub fn strip_field_codes(exec: &str) -> String {
    match exec.find(" %") {
        Some(pos) => exec[..pos].trim_end().to_string(),
        None => exec.trim().to_string(),
    }
}

impl ParsedEntry {
    /// Turn the raw keys into an application, rejecting entries that should
    /// not be listed.
    pub fn into_entry(self, id: &str) -> Option<DesktopEntry> {
        if self.hidden || self.no_display {
            return None;
        }
        if !self
            .entry_type
            .as_deref()
            .is_some_and(|t| t.contains("Application"))
        {
            return None;
        }
        let name = self.name.filter(|n| !n.is_empty())?;
        let exec = self.exec.filter(|e| !e.is_empty())?;
        Some(DesktopEntry {
            id: id.to_string(),
            name,
            icon: self.icon.unwrap_or_default(),
            exec,
        })
    }
}

pub fn parse_file(path: &Path) -> anyhow::Result<Option<DesktopEntry>> {
    let content = fs::read_to_string(path)?;
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse(&content).into_entry(&id))
}

/// `$XDG_DATA_HOME` followed by `$XDG_DATA_DIRS`, with the usual defaults.
pub fn data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = dirs_next::data_dir() {
        dirs.push(home);
    }
    let system = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    dirs.extend(
        system
            .split(':')
            .filter(|d| !d.is_empty())
            .map(PathBuf::from),
    );
    dedup_paths(dirs)
}

/// Directories searched for desktop entries, in priority order.
pub fn application_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/applications"),
        PathBuf::from("/usr/local/share/applications"),
    ];
    if let Some(data) = dirs_next::data_dir() {
        dirs.push(data.join("applications"));
        dirs.push(data.join("flatpak/exports/share/applications"));
    }
    dirs.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    dirs.extend(data_dirs().into_iter().map(|d| d.join("applications")));
    dedup_paths(dirs)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// Collect every listable entry from `dirs`. The first file with a given name
/// wins; missing directories and unreadable files are skipped.
pub fn scan(dirs: &[PathBuf]) -> Vec<DesktopEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for dir in dirs {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping application dir");
                continue;
            }
        };
        let mut files: Vec<PathBuf> = read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "desktop"))
            .collect();
        files.sort();
        for path in files {
            let Some(id) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if seen.contains(&id) {
                continue;
            }
            match parse_file(&path) {
                Ok(Some(entry)) => {
                    seen.insert(id);
                    entries.push(entry);
                }
                Ok(None) => {
                    seen.insert(id);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read desktop entry");
                }
            }
        }
    }
    entries
}
