use crate::actions::Action;
use crate::common::{contains_ci, extension_lower, is_image_path};
use crate::plugin::{Mode, Plugin, Search, Status, Update};
use crate::render::Element;
use crate::thumbnail::{Fit, Origin, ThumbnailSource};
use crate::worker::{CancelToken, Debounce, SearchWorker};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

pub const THUMBNAIL_SIZE: u32 = 50;
pub const SEARCH_DELAY: Duration = Duration::from_millis(250);

const SKIP_DIRS: &[&str] = &[
    "/proc",
    "/sys",
    "/dev",
    "/run",
    "/tmp/.X11-unix",
    "/var/run",
];

const SPECIAL_FOLDERS: &[(&str, &str)] = &[
    ("desktop", "user-desktop"),
    ("documents", "folder-documents"),
    ("downloads", "folder-download"),
    ("music", "folder-music"),
    ("pictures", "folder-pictures"),
    ("videos", "folder-videos"),
    ("public", "folder-publicshare"),
    ("templates", "folder-templates"),
    ("etc", "folder-system"),
    ("usr", "folder-system"),
    ("var", "folder-system"),
    ("opt", "folder-system"),
    ("root", "folder-root"),
];

const MIME_ICONS: &[(&str, &str)] = &[
    ("pdf", "application-pdf"),
    ("doc", "application-msword"),
    ("docx", "application-msword"),
    ("xls", "application-vnd.ms-excel"),
    ("xlsx", "application-vnd.ms-excel"),
    ("ppt", "application-vnd.ms-powerpoint"),
    ("pptx", "application-vnd.ms-powerpoint"),
    ("zip", "application-zip"),
    ("rar", "application-zip"),
    ("7z", "application-zip"),
    ("tar", "application-x-tar"),
    ("gz", "application-x-tar"),
    ("mp3", "audio-x-generic"),
    ("wav", "audio-x-generic"),
    ("flac", "audio-x-generic"),
    ("mp4", "video-x-generic"),
    ("avi", "video-x-generic"),
    ("mkv", "video-x-generic"),
    ("html", "text-html"),
    ("xml", "text-xml"),
    ("py", "text-x-python"),
    ("cpp", "text-x-c++src"),
    ("c", "text-x-csrc"),
    ("js", "text-x-javascript"),
    ("css", "text-css"),
    ("sh", "application-x-shellscript"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_results: usize,
    pub max_scanned: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_results: 60_000,
            max_scanned: 1_000_000,
        }
    }
}

/// Home first, then the rest of the filesystem.
pub fn default_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs_next::home_dir() {
        roots.push(home);
    }
    roots.push(PathBuf::from("/"));
    roots
}

fn is_skipped(path: &Path) -> bool {
    SKIP_DIRS.iter().any(|d| path == Path::new(d))
}

/// Rank of a match, lower is better: exact name, name prefix, name
/// substring, then path only. Inputs must be lower-case.
pub fn relevance(name: &str, path: &str, query: &str) -> Option<u8> {
    if name == query {
        Some(0)
    } else if name.starts_with(query) {
        Some(1)
    } else if name.contains(query) {
        Some(2)
    } else if path.contains(query) {
        Some(3)
    } else {
        None
    }
}

/// Walk `roots` for entries whose name or path contains `query`.
///
/// Symlinks are not followed and unreadable directories are skipped. A root
/// nested inside an earlier root is not walked twice. Returns early with no
/// results once `cancel` fires.
pub fn search_files(
    roots: &[PathBuf],
    query: &str,
    limits: CrawlLimits,
    cancel: &CancelToken,
) -> Vec<FileEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(u8, String, FileEntry)> = Vec::new();
    let mut scanned = 0usize;
    'roots: for (i, root) in roots.iter().enumerate() {
        let earlier = &roots[..i];
        let walker = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_skipped(e.path()) && !earlier.iter().any(|r| e.path() == r.as_path()));
        for entry in walker {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::trace!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            scanned += 1;
            if scanned > limits.max_scanned {
                tracing::debug!("file scan limit of {} reached", limits.max_scanned);
                break 'roots;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let name_lower = name.to_lowercase();
            let path_lower = entry.path().to_string_lossy().to_lowercase();
            if let Some(rank) = relevance(&name_lower, &path_lower, &needle) {
                scored.push((
                    rank,
                    name_lower,
                    FileEntry {
                        path: entry.path().to_path_buf(),
                        name,
                        is_dir: entry.file_type().is_dir(),
                    },
                ));
                if scored.len() >= limits.max_results {
                    break 'roots;
                }
            }
        }
    }
    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.path.cmp(&b.2.path))
    });
    scored.into_iter().map(|(_, _, entry)| entry).collect()
}

/// Themed icon for a folder, preferring the XDG special folder names.
pub fn folder_icon_name(path: &Path, home: Option<&Path>) -> &'static str {
    if home == Some(path) {
        return "user-home";
    }
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    SPECIAL_FOLDERS
        .iter()
        .find(|(name, _)| *name == base)
        .map(|(_, icon)| *icon)
        .unwrap_or("folder")
}

/// Candidate icon names for a regular file, most specific first.
pub fn file_icon_names(path: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(ext) = extension_lower(path) {
        if let Some((_, icon)) = MIME_ICONS.iter().find(|(e, _)| *e == ext) {
            names.push(icon.to_string());
        }
        names.push(format!("text-x-{ext}"));
    }
    names.push("text-x-generic".to_string());
    names
}

pub struct FilesPlugin {
    roots: Vec<PathBuf>,
    home: Option<PathBuf>,
    limits: CrawlLimits,
    worker: SearchWorker<Vec<FileEntry>>,
    debounce: Debounce,
}

impl FilesPlugin {
    pub fn new(roots: Vec<PathBuf>, delay: Duration) -> Self {
        Self {
            roots,
            home: dirs_next::home_dir(),
            limits: CrawlLimits::default(),
            worker: SearchWorker::new("files"),
            debounce: Debounce::new(delay),
        }
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    fn start_due_search(&mut self) {
        let Some(query) = self.debounce.take_due(Instant::now()) else {
            return;
        };
        let roots = self.roots.clone();
        let limits = self.limits;
        self.worker
            .spawn(move |cancel| search_files(&roots, &query, limits, cancel));
    }
}

impl Plugin for FilesPlugin {
    type Item = FileEntry;

    fn mode(&self) -> Mode {
        Mode::Files
    }

    fn load(&mut self) -> Option<Vec<FileEntry>> {
        Some(Vec::new())
    }

    fn matches(&self, item: &FileEntry, query: &str) -> bool {
        contains_ci(&item.name, query)
            || item.path.to_string_lossy().to_lowercase().contains(query)
    }

    fn search(&mut self, query: &str) -> Search<FileEntry> {
        let query = query.trim();
        if query.is_empty() {
            self.debounce.cancel();
            self.worker.invalidate();
            return Search::Cleared;
        }
        self.debounce.push(query);
        self.start_due_search();
        Search::Pending
    }

    fn poll(&mut self) -> Option<Update<FileEntry>> {
        self.start_due_search();
        self.worker.drain().map(Update::Results)
    }

    fn is_loading(&self) -> bool {
        self.worker.is_busy() || self.debounce.is_pending()
    }

    fn element(&self, item: &FileEntry) -> Element {
        let key = item.path.to_string_lossy();
        Element::new(&*key, &item.name).tooltip(&*key)
    }

    fn thumbnail(&self, item: &FileEntry) -> Option<ThumbnailSource> {
        let origin = if item.is_dir {
            let icon = folder_icon_name(&item.path, self.home.as_deref());
            Origin::Icon(vec![icon.to_string(), "folder".to_string()])
        } else if is_image_path(&item.path) {
            Origin::File(item.path.clone())
        } else if extension_lower(&item.path).as_deref() == Some("desktop") {
            Origin::DesktopEntry(item.path.clone())
        } else {
            Origin::Icon(file_icon_names(&item.path))
        };
        let fit = match origin {
            Origin::File(_) => Fit::Contain,
            _ => Fit::Exact,
        };
        Some(ThumbnailSource::new(
            item.path.to_string_lossy(),
            origin,
            THUMBNAIL_SIZE,
            fit,
        ))
    }

    fn action(&self, item: &FileEntry) -> Action {
        Action::Open(item.path.clone())
    }

    fn status(&self, selected: Option<&FileEntry>, status: &Status<'_>) -> String {
        match selected {
            Some(entry) => entry.name.clone(),
            None if status.loading => "Searching files...".into(),
            None if !status.query.is_empty() && status.matches == 0 => "No files found".into(),
            None if !status.query.is_empty() => format!("Found {} items", status.matches),
            None => "Type to search files...".into(),
        }
    }
}
