use crate::desktop_entry::data_dirs;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

static THEME_ROOTS: Lazy<Vec<PathBuf>> = Lazy::new(theme_roots);
static PIXMAP_DIRS: Lazy<Vec<PathBuf>> = Lazy::new(pixmap_dirs);

const THEMES: &[&str] = &["hicolor", "Adwaita", "breeze", "Papirus"];
const SIZES: &[u32] = &[16, 22, 24, 32, 48, 64, 96, 128, 256];
const CATEGORIES: &[&str] = &[
    "apps",
    "places",
    "mimetypes",
    "devices",
    "status",
    "actions",
    "categories",
];

/// Directories containing icon themes, most specific first.
pub fn theme_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs_next::home_dir() {
        roots.push(home.join(".icons"));
    }
    roots.extend(data_dirs().into_iter().map(|d| d.join("icons")));
    roots
}

pub fn pixmap_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("/usr/share/pixmaps")]
}

/// Resolve an icon name (or absolute path) from a desktop entry to a PNG file.
pub fn lookup(name: &str, size: u32) -> Option<PathBuf> {
    lookup_in(&THEME_ROOTS, &PIXMAP_DIRS, name, size)
}

pub fn lookup_in(
    roots: &[PathBuf],
    pixmaps: &[PathBuf],
    name: &str,
    size: u32,
) -> Option<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let mut sizes = SIZES.to_vec();
    sizes.sort_by_key(|s| (s.abs_diff(size), std::cmp::Reverse(*s)));
    let file = format!("{name}.png");

    for root in roots {
        for theme in THEMES {
            let theme_dir = root.join(theme);
            if !theme_dir.is_dir() {
                continue;
            }
            for s in &sizes {
                let size_dir = theme_dir.join(format!("{s}x{s}"));
                if !size_dir.is_dir() {
                    continue;
                }
                for category in CATEGORIES {
                    let candidate = size_dir.join(category).join(&file);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }
        }
    }

    pixmaps
        .iter()
        .flat_map(|dir| [dir.join(&file), dir.join(name)])
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn prefers_closest_size() {
        let dir = tempdir().unwrap();
        for s in ["32x32", "64x64"] {
            let apps = dir.path().join("hicolor").join(s).join("apps");
            fs::create_dir_all(&apps).unwrap();
            fs::write(apps.join("editor.png"), b"png").unwrap();
        }
        let found = lookup_in(&[dir.path().to_path_buf()], &[], "editor", 60).unwrap();
        assert!(found.ends_with("hicolor/64x64/apps/editor.png"));
    }

    #[test]
    fn falls_back_to_pixmaps() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tool.png"), b"png").unwrap();
        let found = lookup_in(&[], &[dir.path().to_path_buf()], "tool", 48);
        assert_eq!(found, Some(dir.path().join("tool.png")));
        assert_eq!(lookup_in(&[], &[dir.path().to_path_buf()], "", 48), None);
    }

    #[test]
    fn absolute_paths_are_used_as_is() {
        let dir = tempdir().unwrap();
        let icon = dir.path().join("custom.png");
        fs::write(&icon, b"png").unwrap();
        let name = icon.to_string_lossy().into_owned();
        assert_eq!(lookup_in(&[], &[], &name, 48), Some(icon));
    }
}
