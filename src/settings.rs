use crate::plugin::Mode;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "launcher.config";
pub const APP_DIR: &str = "edge-launcher";

pub const DEFAULT_EMOJI_SIZE: u32 = 50;
pub const DEFAULT_GIF_SIZE: u32 = 64;
pub const MIN_SIZE: u32 = 20;
pub const MAX_SIZE: u32 = 200;
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 250;
pub const DEFAULT_WALLPAPER_COMMAND: &str = "swww img --transition-duration 2 --transition-type grow --transition-step 45 --transition-fps 40 {path}";

/// Launcher configuration stored as `key: value` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Glyph size of the emoji grid in pixels.
    pub emoji_size: u32,
    /// Preview size of GIF results in pixels.
    pub gif_size: u32,
    pub emoji_enabled: bool,
    pub gifs_enabled: bool,
    pub files_enabled: bool,
    /// When enabled the application initialises the logger at debug level.
    pub debug_logging: bool,
    /// Tenor API key. Falls back to `TENOR_API_KEY` when unset.
    pub tenor_api_key: Option<String>,
    /// Base directory holding `Dark/` and `Light/` wallpaper folders.
    pub wallpaper_dir: Option<PathBuf>,
    /// Command used to apply a wallpaper; `{path}` is replaced by the image.
    pub wallpaper_command: String,
    /// Pause after the last keystroke before a file search starts.
    pub search_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emoji_size: DEFAULT_EMOJI_SIZE,
            gif_size: DEFAULT_GIF_SIZE,
            emoji_enabled: true,
            gifs_enabled: true,
            files_enabled: true,
            debug_logging: false,
            tenor_api_key: None,
            wallpaper_dir: None,
            wallpaper_command: DEFAULT_WALLPAPER_COMMAND.to_string(),
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
        }
    }
}

fn parse_size(key: &str, value: &str) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(v) if (MIN_SIZE..=MAX_SIZE).contains(&v) => Some(v),
        _ => {
            tracing::warn!("{} value '{}' is outside {}..={}", key, value, MIN_SIZE, MAX_SIZE);
            None
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        tracing::warn!("{} expects true or false, got '{}'", key, value);
        None
    }
}

impl Settings {
    /// Directory holding the config file and the emoji list.
    pub fn config_dir() -> PathBuf {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Parse `content`. Malformed lines and unknown keys are skipped and
    /// invalid values keep their defaults.
    pub fn parse(content: &str) -> Self {
        Self::parse_checked(content).0
    }

    /// Like [`Settings::parse`], also counting malformed lines and invalid
    /// values.
    pub fn parse_checked(content: &str) -> (Self, usize) {
        let mut s = Self::default();
        let mut errors = 0;
        for (n, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                tracing::warn!("config line {} is not 'key: value': '{}'", n + 1, line);
                errors += 1;
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let valid = match key {
                "emoji_size" => parse_size(key, value).map(|v| s.emoji_size = v),
                "gif_size" => parse_size(key, value).map(|v| s.gif_size = v),
                "emoji_enabled" => parse_bool(key, value).map(|v| s.emoji_enabled = v),
                "gifs_enabled" => parse_bool(key, value).map(|v| s.gifs_enabled = v),
                "files_enabled" => parse_bool(key, value).map(|v| s.files_enabled = v),
                "debug_logging" => parse_bool(key, value).map(|v| s.debug_logging = v),
                "tenor_api_key" => {
                    s.tenor_api_key = Some(value.to_string()).filter(|v| !v.is_empty());
                    Some(())
                }
                "wallpaper_dir" => {
                    s.wallpaper_dir = Some(PathBuf::from(value)).filter(|_| !value.is_empty());
                    Some(())
                }
                "wallpaper_command" => {
                    if !value.is_empty() {
                        s.wallpaper_command = value.to_string();
                    }
                    Some(())
                }
                "search_delay_ms" => match value.parse() {
                    Ok(ms) => {
                        s.search_delay_ms = ms;
                        Some(())
                    }
                    Err(_) => {
                        tracing::warn!("search_delay_ms '{}' is not a number", value);
                        None
                    }
                },
                _ => {
                    tracing::warn!("unknown config key '{}' on line {}", key, n + 1);
                    Some(())
                }
            };
            if valid.is_none() {
                errors += 1;
            }
        }
        (s, errors)
    }

    /// Load from `path`, writing a default file when none exists. A config
    /// with invalid entries is replaced by a clean `<path>.backup` if one
    /// exists.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            if let Err(e) = settings.save(path) {
                tracing::warn!("could not create default config {}: {}", path.display(), e);
            }
            return Ok(settings);
        }
        let content = std::fs::read_to_string(path)?;
        let (settings, errors) = Self::parse_checked(&content);
        if errors == 0 {
            return Ok(settings);
        }
        tracing::error!("{} has {} invalid entries", path.display(), errors);
        match std::fs::read_to_string(backup_path(path)).map(|b| Self::parse_checked(&b)) {
            Ok((_, 0)) => match Self::restore_backup(path) {
                Ok(restored) => {
                    tracing::info!("restored {} from its backup", path.display());
                    Ok(restored)
                }
                Err(e) => {
                    tracing::warn!("could not restore the config backup: {}", e);
                    Ok(settings)
                }
            },
            Ok(_) => {
                tracing::warn!("the config backup is invalid too; using defaults for bad entries");
                Ok(settings)
            }
            Err(_) => Ok(settings),
        }
    }

    /// Write the config, keeping the previous file as `<path>.backup`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            std::fs::copy(path, backup_path(path))?;
        }
        std::fs::write(path, self.to_config_string())?;
        Ok(())
    }

    /// Replace the config at `path` with its backup.
    pub fn restore_backup(path: &Path) -> anyhow::Result<Self> {
        let backup = backup_path(path);
        let content = std::fs::read_to_string(&backup)?;
        std::fs::copy(&backup, path)?;
        Ok(Self::parse(&content))
    }

    pub fn to_config_string(&self) -> String {
        let mut out = String::from("# Edge launcher configuration\n");
        let _ = writeln!(out, "emoji_size: {}", self.emoji_size);
        let _ = writeln!(out, "gif_size: {}", self.gif_size);
        let _ = writeln!(out, "emoji_enabled: {}", self.emoji_enabled);
        let _ = writeln!(out, "gifs_enabled: {}", self.gifs_enabled);
        let _ = writeln!(out, "files_enabled: {}", self.files_enabled);
        let _ = writeln!(out, "debug_logging: {}", self.debug_logging);
        if let Some(key) = &self.tenor_api_key {
            let _ = writeln!(out, "tenor_api_key: {key}");
        }
        if let Some(dir) = &self.wallpaper_dir {
            let _ = writeln!(out, "wallpaper_dir: {}", dir.display());
        }
        let _ = writeln!(out, "wallpaper_command: {}", self.wallpaper_command);
        let _ = writeln!(out, "search_delay_ms: {}", self.search_delay_ms);
        out
    }

    /// Apps and wallpapers are always available.
    pub fn is_enabled(&self, mode: Mode) -> bool {
        match mode {
            Mode::Apps | Mode::Wallpapers => true,
            Mode::Emojis => self.emoji_enabled,
            Mode::Gifs => self.gifs_enabled,
            Mode::Files => self.files_enabled,
        }
    }

    pub fn tenor_key(&self) -> Option<String> {
        self.tenor_api_key
            .clone()
            .or_else(|| std::env::var("TENOR_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_sizes_use_defaults() {
        let s = Settings::parse("emoji_size: 500\ngif_size: 10\n");
        assert_eq!(s.emoji_size, DEFAULT_EMOJI_SIZE);
        assert_eq!(s.gif_size, DEFAULT_GIF_SIZE);
        let s = Settings::parse("emoji_size: 20\ngif_size: 200\n");
        assert_eq!((s.emoji_size, s.gif_size), (20, 200));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (s, errors) = Settings::parse_checked(
            "# comment\ngarbage\nfiles_enabled: false\nmystery: 1\nemoji_size: abc\n",
        );
        assert!(!s.files_enabled);
        assert_eq!(s.emoji_size, DEFAULT_EMOJI_SIZE);
        assert!(s.emoji_enabled);
        assert_eq!(errors, 2);
    }

    #[test]
    fn wallpaper_command_keeps_colons() {
        let s = Settings::parse("wallpaper_command: feh --bg-fill {path}\n");
        assert_eq!(s.wallpaper_command, "feh --bg-fill {path}");
    }

    #[test]
    fn config_string_round_trips() {
        let s = Settings {
            gifs_enabled: false,
            emoji_size: 33,
            tenor_api_key: Some("abc".into()),
            ..Settings::default()
        };
        assert_eq!(Settings::parse(&s.to_config_string()), s);
    }
}
