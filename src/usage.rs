use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const USAGE_FILE: &str = "edge_launcher_cache.json";
pub const USAGE_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct UsageFile {
    #[serde(default)]
    version: String,
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
}

/// Load usage data from `path`.
///
/// Returns a map from application name to launch count. A missing or empty
/// file yields an empty map; entries whose count is not a non-negative
/// integer are skipped.
pub fn load_usage(path: &Path) -> anyhow::Result<HashMap<String, u32>> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let file: UsageFile = serde_json::from_str(&content)?;
    if file.version != USAGE_VERSION {
        tracing::debug!("usage cache version '{}' differs from {}", file.version, USAGE_VERSION);
    }
    Ok(file
        .data
        .into_iter()
        .filter_map(|(name, count)| match count.as_u64() {
            Some(c) => Some((name, u32::try_from(c).unwrap_or(u32::MAX))),
            None => {
                tracing::warn!("skipping corrupt usage entry for '{}'", name);
                None
            }
        })
        .collect())
}

/// Save usage data in `usage` to `path`.
pub fn save_usage(path: &Path, usage: &HashMap<String, u32>) -> anyhow::Result<()> {
    let file = UsageFile {
        version: USAGE_VERSION.to_string(),
        data: usage
            .iter()
            .map(|(name, count)| (name.clone(), serde_json::Value::from(*count)))
            .collect(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Launch counts backed by a JSON file.
#[derive(Debug, Clone)]
pub struct UsageStore {
    path: PathBuf,
    counts: HashMap<String, u32>,
}

impl UsageStore {
    pub fn default_path() -> PathBuf {
        dirs_next::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(USAGE_FILE)
    }

    /// Open the store at `path`. Unreadable data starts from empty counts.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts = load_usage(&path).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable usage cache {}: {}", path.display(), e);
            HashMap::new()
        });
        Self { path, counts }
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    /// Record one launch of `name` and persist immediately.
    pub fn increment(&mut self, name: &str) -> anyhow::Result<()> {
        let entry = self.counts.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        save_usage(&self.path, &self.counts)
    }
}
