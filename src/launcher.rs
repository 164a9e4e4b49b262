use crate::actions::{self, Action};
use crate::common::strip_prefix_ci;
use crate::manager::{CollectionManager, Manager};
use crate::plugin::Mode;
use crate::plugins::apps::AppsPlugin;
use crate::plugins::emoji::{EmojiPlugin, EMOJI_FILE};
use crate::plugins::files::{default_roots, FilesPlugin};
use crate::plugins::gif::{GifPlugin, TenorProvider};
use crate::plugins::wallpaper::WallpaperPlugin;
use crate::render::Renderer;
use crate::settings::Settings;
use crate::thumbnail::ThumbnailLoader;
use crate::usage::UsageStore;
use std::sync::Arc;
use std::time::Duration;

/// Typing this in the apps view switches to wallpapers.
pub const WALLPAPER_PREFIX: &str = "wall:";

/// Time the window stays open after a clipboard copy so the selection owner
/// can hand the data over.
const COPY_CLOSE_DELAY_MS: u64 = 200;

/// Perform `action` using the OS facilities.
pub fn launch_action(action: &Action, wallpaper_command: &str) -> anyhow::Result<()> {
    match action {
        Action::Launch { command, .. } => actions::exec::launch(command),
        Action::Open(path) => actions::exec::open_path(path),
        Action::CopyText(text) => actions::clipboard::set_text(text),
        Action::SetWallpaper(path) => actions::wallpaper::apply(wallpaper_command, path),
    }
}

pub trait ActionExecutor {
    fn execute(&mut self, action: &Action) -> anyhow::Result<()>;
}

/// Executes actions for real via [`launch_action`].
pub struct SystemExecutor {
    wallpaper_command: String,
}

impl SystemExecutor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            wallpaper_command: settings.wallpaper_command.clone(),
        }
    }
}

impl ActionExecutor for SystemExecutor {
    fn execute(&mut self, action: &Action) -> anyhow::Result<()> {
        launch_action(action, &self.wallpaper_command)
    }
}

/// Result of an activation, telling the frontend whether to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was selected.
    Ignored,
    /// The action ran but failed; the launcher stays open.
    Failed,
    Close { delay_ms: u64 },
}

/// Routes input to the manager of the active mode.
///
/// Only managers of enabled kinds are ever registered, so a disabled kind
/// cannot be reached by switching, navigation or prefix routing.
pub struct Launcher {
    settings: Settings,
    managers: Vec<Box<dyn Manager>>,
    mode: Mode,
    query: String,
    usage: Option<UsageStore>,
}

impl Launcher {
    pub fn new(settings: Settings, usage: Option<UsageStore>) -> Self {
        Self {
            settings,
            managers: Vec::new(),
            mode: Mode::Apps,
            query: String::new(),
            usage,
        }
    }

    /// Build a launcher with a manager for every enabled kind.
    pub fn from_settings(settings: Settings, usage: UsageStore) -> Self {
        let mut launcher = Self::new(settings.clone(), None);

        let apps = AppsPlugin::with_system_dirs(usage.counts().clone());
        launcher.register(Box::new(
            CollectionManager::new(apps).with_thumbnails(ThumbnailLoader::spawn("apps", 2, 256)),
        ));

        if settings.emoji_enabled {
            let emoji = EmojiPlugin::new(Settings::config_dir().join(EMOJI_FILE));
            launcher.register(Box::new(CollectionManager::new(emoji)));
        }

        if settings.gifs_enabled {
            match settings.tenor_key().map(TenorProvider::new) {
                Some(Ok(provider)) => {
                    let gifs = GifPlugin::new(Arc::new(provider), settings.gif_size);
                    launcher.register(Box::new(
                        CollectionManager::new(gifs)
                            .with_thumbnails(ThumbnailLoader::spawn("gifs", 4, 128)),
                    ));
                }
                Some(Err(e)) => tracing::error!("GIF search unavailable: {}", e),
                None => tracing::warn!("no Tenor API key configured; GIF search disabled"),
            }
        }

        if settings.files_enabled {
            let delay = Duration::from_millis(settings.search_delay_ms);
            let files = FilesPlugin::new(default_roots(), delay);
            launcher.register(Box::new(
                CollectionManager::new(files)
                    .with_thumbnails(ThumbnailLoader::spawn("files", 2, 512)),
            ));
        }

        let walls = WallpaperPlugin::from_settings(&settings);
        launcher.register(Box::new(
            CollectionManager::new(walls)
                .with_thumbnails(ThumbnailLoader::spawn("wallpapers", 2, 64)),
        ));

        launcher.usage = Some(usage);
        launcher
    }

    /// Add a manager. Managers of disabled kinds and duplicates are refused.
    pub fn register(&mut self, manager: Box<dyn Manager>) -> bool {
        let mode = manager.mode();
        if !self.settings.is_enabled(mode) {
            tracing::info!("{} is disabled in the config", mode);
            return false;
        }
        if self.managers.iter().any(|m| m.mode() == mode) {
            tracing::warn!("a manager for {} is already registered", mode);
            return false;
        }
        self.managers.push(manager);
        true
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn usage(&self) -> Option<&UsageStore> {
        self.usage.as_ref()
    }

    pub fn is_available(&self, mode: Mode) -> bool {
        self.settings.is_enabled(mode) && self.managers.iter().any(|m| m.mode() == mode)
    }

    /// Modes offered as buttons. Wallpapers are reached through the prefix.
    pub fn switchable_modes(&self) -> Vec<Mode> {
        Mode::ALL
            .into_iter()
            .filter(|m| *m != Mode::Wallpapers && self.is_available(*m))
            .collect()
    }

    fn manager_mut(&mut self, mode: Mode) -> Option<&mut Box<dyn Manager>> {
        self.managers.iter_mut().find(|m| m.mode() == mode)
    }

    fn active(&mut self) -> Option<&mut Box<dyn Manager>> {
        let mode = self.mode;
        self.manager_mut(mode)
    }

    fn active_ref(&self) -> Option<&dyn Manager> {
        self.managers
            .iter()
            .find(|m| m.mode() == self.mode)
            .map(|m| m.as_ref())
    }

    fn enter(&mut self, mode: Mode, query: &str, ui: &mut dyn Renderer) {
        tracing::debug!("entering {} mode", mode);
        self.mode = mode;
        if let Some(m) = self.manager_mut(mode) {
            m.enter(ui);
            m.filter(query, ui);
        }
    }

    /// Show the apps view with an empty query.
    pub fn start(&mut self, ui: &mut dyn Renderer) {
        self.query.clear();
        self.enter(Mode::Apps, "", ui);
    }

    /// Switch to `mode`, clearing the query. Returns `false` for unavailable
    /// modes and for wallpapers.
    pub fn switch_mode(&mut self, mode: Mode, ui: &mut dyn Renderer) -> bool {
        if mode == Mode::Wallpapers || !self.is_available(mode) {
            tracing::debug!("refusing switch to {}", mode);
            return false;
        }
        self.query.clear();
        self.enter(mode, "", ui);
        true
    }

    /// Handle new search text, routing `wall:` queries to the wallpapers.
    pub fn set_query(&mut self, text: &str, ui: &mut dyn Renderer) {
        self.query = text.to_string();
        let wall_query = strip_prefix_ci(text, WALLPAPER_PREFIX)
            .filter(|_| matches!(self.mode, Mode::Apps | Mode::Wallpapers))
            .filter(|_| self.is_available(Mode::Wallpapers));
        match (self.mode, wall_query) {
            (Mode::Wallpapers, Some(rest)) => {
                if let Some(m) = self.active() {
                    m.filter(rest, ui);
                }
            }
            (_, Some(rest)) => self.enter(Mode::Wallpapers, rest, ui),
            (Mode::Wallpapers, None) => self.enter(Mode::Apps, text, ui),
            (_, None) => {
                if let Some(m) = self.active() {
                    m.filter(text, ui);
                }
            }
        }
    }

    pub fn select_next(&mut self, ui: &mut dyn Renderer) {
        if let Some(m) = self.active() {
            m.select_next(ui);
        }
    }

    pub fn select_prev(&mut self, ui: &mut dyn Renderer) {
        if let Some(m) = self.active() {
            m.select_prev(ui);
        }
    }

    pub fn scroll_up(&mut self, ui: &mut dyn Renderer) {
        if let Some(m) = self.active() {
            m.scroll_up(ui);
        }
    }

    pub fn scroll_down(&mut self, ui: &mut dyn Renderer) {
        if let Some(m) = self.active() {
            m.scroll_down(ui);
        }
    }

    pub fn select(&mut self, index: usize, ui: &mut dyn Renderer) {
        if let Some(m) = self.active() {
            m.select(index, ui);
        }
    }

    pub fn activate_selected(&mut self, exec: &mut dyn ActionExecutor) -> Outcome {
        let action = self.active().and_then(|m| m.activate_selected());
        self.perform(action, exec)
    }

    /// Activate the entry at `index`, e.g. after a click.
    pub fn activate_at(
        &mut self,
        index: usize,
        ui: &mut dyn Renderer,
        exec: &mut dyn ActionExecutor,
    ) -> Outcome {
        let action = self.active().and_then(|m| m.activate_at(index, ui));
        self.perform(action, exec)
    }

    fn perform(&mut self, action: Option<Action>, exec: &mut dyn ActionExecutor) -> Outcome {
        let Some(action) = action else {
            return Outcome::Ignored;
        };
        if let Err(e) = exec.execute(&action) {
            tracing::error!("failed to run {:?}: {}", action, e);
            return Outcome::Failed;
        }
        tracing::info!("activated {:?}", action);
        if let (Some(key), Some(usage)) = (action.usage_key(), self.usage.as_mut()) {
            if let Err(e) = usage.increment(key) {
                tracing::warn!("could not save usage for '{}': {}", key, e);
            }
        }
        let delay_ms = match action {
            Action::CopyText(_) => COPY_CLOSE_DELAY_MS,
            _ => 0,
        };
        Outcome::Close { delay_ms }
    }

    /// Apply finished background work of the active mode.
    pub fn poll(&mut self, ui: &mut dyn Renderer) -> bool {
        self.active().map(|m| m.poll(ui)).unwrap_or(false)
    }

    pub fn reload(&mut self, ui: &mut dyn Renderer) {
        let query = match self.mode {
            Mode::Wallpapers => strip_prefix_ci(&self.query, WALLPAPER_PREFIX)
                .unwrap_or_default()
                .to_string(),
            _ => self.query.clone(),
        };
        if let Some(m) = self.active() {
            m.reload(ui);
            m.filter(&query, ui);
        }
    }

    pub fn status(&self) -> String {
        self.active_ref().map(|m| m.status()).unwrap_or_default()
    }

    /// Completion for the current query (apps only).
    pub fn suggestion(&self) -> Option<String> {
        if self.mode != Mode::Apps {
            return None;
        }
        self.active_ref().and_then(|m| m.suggestion())
    }

    /// Replace the query with the suggestion. Returns `false` if there was none.
    pub fn accept_suggestion(&mut self, ui: &mut dyn Renderer) -> bool {
        match self.suggestion() {
            Some(s) => {
                self.set_query(&s, ui);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.active_ref().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.active_ref().and_then(|m| m.selected_index())
    }
}
