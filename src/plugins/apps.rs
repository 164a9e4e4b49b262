use crate::actions::Action;
use crate::common::contains_ci;
use crate::desktop_entry;
use crate::plugin::{Mode, Plugin, Status, Update};
use crate::render::Element;
use crate::thumbnail::{Fit, Origin, ThumbnailSource};
use crate::worker::SearchWorker;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashMap;
use std::path::PathBuf;

pub const ICON_SIZE: u32 = 50;
const FALLBACK_ICON: &str = "application-x-executable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// Desktop file name.
    pub id: String,
    pub name: String,
    pub icon: String,
    pub exec: String,
    pub usage: u32,
}

/// Most used first, then by name in plain byte order.
pub fn sort_apps(apps: &mut [AppEntry]) {
    apps.sort_by(|a, b| b.usage.cmp(&a.usage).then_with(|| a.name.cmp(&b.name)));
}

pub fn load_apps(dirs: &[PathBuf], usage: &HashMap<String, u32>) -> Vec<AppEntry> {
    let mut apps: Vec<AppEntry> = desktop_entry::scan(dirs)
        .into_iter()
        .map(|e| AppEntry {
            usage: usage.get(&e.name).copied().unwrap_or(0),
            id: e.id,
            name: e.name,
            icon: e.icon,
            exec: e.exec,
        })
        .collect();
    sort_apps(&mut apps);
    apps
}

pub struct AppsPlugin {
    dirs: Vec<PathBuf>,
    usage: HashMap<String, u32>,
    loader: SearchWorker<Vec<AppEntry>>,
    matcher: SkimMatcherV2,
}

impl AppsPlugin {
    pub fn new(dirs: Vec<PathBuf>, usage: HashMap<String, u32>) -> Self {
        Self {
            dirs,
            usage,
            loader: SearchWorker::new("apps"),
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Scan the standard desktop entry directories.
    pub fn with_system_dirs(usage: HashMap<String, u32>) -> Self {
        Self::new(desktop_entry::application_dirs(), usage)
    }
}

impl Plugin for AppsPlugin {
    type Item = AppEntry;

    fn mode(&self) -> Mode {
        Mode::Apps
    }

    fn load(&mut self) -> Option<Vec<AppEntry>> {
        let dirs = self.dirs.clone();
        let usage = self.usage.clone();
        self.loader.spawn(move |_| load_apps(&dirs, &usage));
        None
    }

    fn poll(&mut self) -> Option<Update<AppEntry>> {
        self.loader.drain().map(Update::Source)
    }

    fn is_loading(&self) -> bool {
        self.loader.is_busy()
    }

    fn matches(&self, item: &AppEntry, query: &str) -> bool {
        contains_ci(&item.name, query)
    }

    fn element(&self, item: &AppEntry) -> Element {
        Element::new(&item.id, &item.name).tooltip(&item.name)
    }

    fn thumbnail(&self, item: &AppEntry) -> Option<ThumbnailSource> {
        let mut names = Vec::with_capacity(2);
        if !item.icon.is_empty() {
            names.push(item.icon.clone());
        }
        names.push(FALLBACK_ICON.to_string());
        Some(ThumbnailSource::new(
            &item.id,
            Origin::Icon(names),
            ICON_SIZE,
            Fit::Exact,
        ))
    }

    fn action(&self, item: &AppEntry) -> Action {
        Action::Launch {
            command: item.exec.clone(),
            usage_key: Some(item.name.clone()),
        }
    }

    fn status(&self, selected: Option<&AppEntry>, status: &Status<'_>) -> String {
        match selected {
            Some(app) => app.name.clone(),
            None if status.loading => "Loading applications...".into(),
            None if !status.query.is_empty() => "No applications found".into(),
            None => String::new(),
        }
    }

    /// First name starting with the query, else the best fuzzy match.
    fn suggest(&self, source: &[AppEntry], query: &str) -> Option<String> {
        if query.is_empty() {
            return None;
        }
        let lower = query.to_lowercase();
        if let Some(app) = source
            .iter()
            .find(|a| a.name.to_lowercase().starts_with(&lower))
        {
            return Some(app.name.clone());
        }
        let mut best: Option<(i64, &AppEntry)> = None;
        for app in source {
            if let Some(score) = self.matcher.fuzzy_match(&app.name, query) {
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, app));
                }
            }
        }
        best.map(|(_, app)| app.name.clone())
    }
}
