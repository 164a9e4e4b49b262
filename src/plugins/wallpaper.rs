use crate::actions::Action;
use crate::common::{contains_ci, is_image_path};
use crate::plugin::{Mode, Plugin, Status};
use crate::render::Element;
use crate::settings::{Settings, APP_DIR};
use crate::thumbnail::{Fit, Origin, ThumbnailSource};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const WALLPAPERS_PER_PAGE: usize = 12;
pub const THUMBNAIL_SIZE: u32 = 60;

const DARK_HINTS: &[&str] = &[
    "dark",
    "night",
    "black",
    "dracula",
    "gruvbox",
    "nord",
    "tokyo",
    "catppuccin",
    "ayu",
    "solarized",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperItem {
    pub name: String,
    pub path: PathBuf,
}

/// Decide between the dark and light set. An explicit `color-scheme`
/// preference beats hints in the theme name.
pub fn is_dark_theme(theme_name: &str, color_scheme: Option<&str>) -> bool {
    match color_scheme.map(|s| s.trim_matches(|c: char| c == '\'' || c == '"' || c == ' ')) {
        Some("prefer-dark") => true,
        Some("prefer-light") => false,
        _ => {
            let lower = theme_name.to_lowercase();
            DARK_HINTS.iter().any(|hint| lower.contains(hint))
        }
    }
}

fn gsettings(key: &str) -> Option<String> {
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", key])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout)
        .trim()
        .trim_matches('\'')
        .to_string();
    Some(value).filter(|v| !v.is_empty())
}

/// Query GSettings, falling back to `GTK_THEME`.
pub fn detect_dark_theme() -> bool {
    let theme = gsettings("gtk-theme")
        .or_else(|| std::env::var("GTK_THEME").ok())
        .unwrap_or_default();
    let scheme = gsettings("color-scheme");
    is_dark_theme(&theme, scheme.as_deref())
}

pub fn default_base_dir() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("wallpaper")
}

pub fn theme_directory(base: &Path, dark: bool) -> PathBuf {
    base.join(if dark { "Dark" } else { "Light" })
}

/// Image files directly inside `dir`, sorted by name.
pub fn scan_wallpapers(dir: &Path) -> Vec<WallpaperItem> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!("wallpaper directory {} unavailable: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut items: Vec<WallpaperItem> = read
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_image_path(p))
        .map(|path| WallpaperItem {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path,
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

pub struct WallpaperPlugin {
    dir: PathBuf,
    dark: bool,
}

impl WallpaperPlugin {
    pub fn new(base: &Path, dark: bool) -> Self {
        Self {
            dir: theme_directory(base, dark),
            dark,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let base = settings
            .wallpaper_dir
            .clone()
            .unwrap_or_else(default_base_dir);
        Self::new(&base, detect_dark_theme())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Plugin for WallpaperPlugin {
    type Item = WallpaperItem;

    fn mode(&self) -> Mode {
        Mode::Wallpapers
    }

    fn page_size(&self) -> usize {
        WALLPAPERS_PER_PAGE
    }

    fn load(&mut self) -> Option<Vec<WallpaperItem>> {
        Some(scan_wallpapers(&self.dir))
    }

    fn matches(&self, item: &WallpaperItem, query: &str) -> bool {
        contains_ci(&item.name, query)
    }

    fn element(&self, item: &WallpaperItem) -> Element {
        let key = item.path.to_string_lossy();
        Element::new(&*key, &item.name).tooltip(&item.name)
    }

    fn thumbnail(&self, item: &WallpaperItem) -> Option<ThumbnailSource> {
        Some(ThumbnailSource::new(
            item.path.to_string_lossy(),
            Origin::File(item.path.clone()),
            THUMBNAIL_SIZE,
            Fit::CropSquare,
        ))
    }

    fn action(&self, item: &WallpaperItem) -> Action {
        Action::SetWallpaper(item.path.clone())
    }

    fn status(&self, selected: Option<&WallpaperItem>, status: &Status<'_>) -> String {
        match selected {
            Some(w) => w.name.clone(),
            None if !status.query.is_empty() && status.matches == 0 => {
                format!("No wallpapers found for: {}", status.query)
            }
            None if !status.query.is_empty() => format!("Found {} wallpapers", status.matches),
            None => format!(
                "Wallpapers ({} theme) - {} available",
                if self.dark { "Dark" } else { "Light" },
                status.total
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_scheme_overrides_theme_name() {
        assert!(is_dark_theme("Adwaita-dark", None));
        assert!(is_dark_theme("Catppuccin-Mocha", None));
        assert!(!is_dark_theme("Adwaita", None));
        assert!(!is_dark_theme("Nordic", Some("'prefer-light'")));
        assert!(is_dark_theme("Adwaita", Some("prefer-dark")));
        assert!(is_dark_theme("Nordic", Some("default")));
    }

    #[test]
    fn theme_directory_picks_variant() {
        let base = Path::new("/w");
        assert_eq!(theme_directory(base, true), Path::new("/w/Dark"));
        assert_eq!(theme_directory(base, false), Path::new("/w/Light"));
    }
}
