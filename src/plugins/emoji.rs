use crate::actions::Action;
use crate::plugin::{Mode, Plugin, Status, Update};
use crate::plugins::gif::http_client;
use crate::render::{Element, Icon};
use crate::worker::SearchWorker;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

pub const EMOJI_FILE: &str = "emoji.txt";
/// Where a missing emoji list is fetched from.
pub const EMOJI_LIST_URL: &str = "https://www.elysiaos.live/emoji.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiItem {
    pub glyph: String,
    pub name: String,
    /// Lower-case search text derived from the name.
    pub keywords: String,
}

const SYNONYMS: &[(&str, &str)] = &[
    ("crying", "cry sad tears"),
    ("laughing", "laugh happy joy"),
    ("smiling", "smile happy"),
    ("angry", "mad angry rage"),
    ("sad", "sad cry tears"),
    ("happy", "happy joy smile"),
    ("love", "love heart"),
    ("heart", "heart love"),
    ("food", "food eat"),
    ("drink", "drink beverage"),
    ("animal", "animal pet"),
    ("person", "person human"),
    ("object", "object thing"),
    ("symbol", "symbol sign"),
    ("flag", "flag country"),
    ("plant", "plant nature"),
    ("weather", "weather climate"),
    ("activity", "activity sport"),
    ("emotion", "emotion feeling"),
];

// Used when no emoji list is installed.
const FALLBACK: &[(&str, &str)] = &[
    ("😀", "grinning face"),
    ("😁", "beaming face with smiling eyes"),
    ("😂", "face with tears of joy"),
    ("🤣", "rolling on the floor laughing"),
    ("😃", "grinning face with big eyes"),
    ("😄", "grinning face with smiling eyes"),
    ("😅", "grinning face with sweat"),
    ("😆", "grinning squinting face"),
    ("😉", "winking face"),
    ("😊", "smiling face with smiling eyes"),
    ("😋", "face savoring food"),
    ("😎", "smiling face with sunglasses"),
    ("😍", "smiling face with heart-eyes"),
    ("😘", "face blowing a kiss"),
    ("🥳", "partying face"),
    ("🤔", "thinking face"),
    ("🤗", "smiling face with open hands"),
    ("🙃", "upside-down face"),
    ("😭", "loudly crying face"),
    ("😢", "crying face"),
    ("😇", "smiling face with halo"),
    ("😡", "enraged face"),
    ("😤", "face with steam from nose"),
    ("🤯", "exploding head"),
    ("🥺", "pleading face"),
    ("🤓", "nerd face"),
    ("🤩", "star-struck"),
    ("🤡", "clown face"),
    ("🥶", "cold face"),
    ("🥴", "woozy face"),
    ("🤪", "zany face"),
    ("🤮", "face vomiting"),
    ("😴", "sleeping face"),
    ("👀", "eyes"),
    ("👍", "thumbs up"),
    ("👎", "thumbs down"),
    ("👏", "clapping hands"),
    ("🙏", "folded hands"),
    ("💪", "flexed biceps"),
    ("🎉", "party popper"),
    ("❤️", "red heart"),
    ("💔", "broken heart"),
    ("✨", "sparkles"),
    ("🔥", "fire"),
    ("⭐", "star"),
    ("✅", "check mark button"),
    ("❌", "cross mark"),
    ("🚀", "rocket"),
    ("☕", "hot beverage"),
    ("🍕", "pizza"),
    ("🐱", "cat face"),
    ("🐶", "dog face"),
];

/// Search text for an emoji name: the name, synonyms of known words, and the
/// name again with `-`/`_` split into words.
pub fn search_keywords(name: &str) -> String {
    let mut keywords = name.to_lowercase();
    let base = keywords.clone();
    for (word, extra) in SYNONYMS {
        if base.contains(word) {
            keywords.push(' ');
            keywords.push_str(extra);
        }
    }
    let split = keywords.replace(['-', '_'], " ");
    keywords.push(' ');
    keywords.push_str(&split);
    keywords
}

fn item(glyph: &str, name: &str) -> EmojiItem {
    EmojiItem {
        glyph: glyph.to_string(),
        name: name.to_string(),
        keywords: search_keywords(name),
    }
}

/// Parse `glyph,name` lines. Lines without a comma or glyph are skipped.
pub fn parse_emoji_list(content: &str) -> Vec<EmojiItem> {
    content
        .lines()
        .filter_map(|line| {
            let (glyph, name) = line.split_once(',')?;
            let glyph = glyph.trim();
            (!glyph.is_empty()).then(|| item(glyph, name.trim()))
        })
        .collect()
}

pub fn fallback_emojis() -> Vec<EmojiItem> {
    FALLBACK.iter().map(|(g, n)| item(g, n)).collect()
}

pub fn load_emojis(path: &Path) -> Vec<EmojiItem> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let list = parse_emoji_list(&content);
            if list.is_empty() {
                tracing::warn!("{} has no emoji, using built-in list", path.display());
                fallback_emojis()
            } else {
                list
            }
        }
        Err(e) => {
            tracing::warn!("could not read {}: {}; using built-in list", path.display(), e);
            fallback_emojis()
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Fetch the emoji list from `url` and store it at `path`.
pub fn download_emoji_list(url: &str, path: &Path) -> anyhow::Result<Vec<EmojiItem>> {
    let body = http_client()?
        .get(url)
        .send()?
        .error_for_status()?
        .text()?;
    let list = parse_emoji_list(&body);
    if list.is_empty() {
        bail!("{url} returned no emoji");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &body).with_context(|| format!("writing {}", path.display()))?;
    Ok(list)
}

pub struct EmojiPlugin {
    path: PathBuf,
    download_url: Option<String>,
    download: SearchWorker<Option<Vec<EmojiItem>>>,
}

impl EmojiPlugin {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            download_url: Some(EMOJI_LIST_URL.to_string()),
            download: SearchWorker::new("emoji-download"),
        }
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// Never fetch a missing list; the built-in set is used instead.
    pub fn without_download(mut self) -> Self {
        self.download_url = None;
        self
    }

    fn start_download(&mut self, url: String) {
        tracing::info!("{} not found, downloading {}", self.path.display(), url);
        let path = self.path.clone();
        self.download.spawn(move |_| match download_emoji_list(&url, &path) {
            Ok(list) => {
                tracing::info!(count = list.len(), "emoji list saved to {}", path.display());
                Some(list)
            }
            Err(e) => {
                tracing::warn!("emoji list download failed: {:#}", e);
                None
            }
        });
    }
}

impl Plugin for EmojiPlugin {
    type Item = EmojiItem;

    fn mode(&self) -> Mode {
        Mode::Emojis
    }

    fn load(&mut self) -> Option<Vec<EmojiItem>> {
        if self.path.exists() {
            return Some(load_emojis(&self.path));
        }
        match self.download_url.clone() {
            Some(url) if !self.download.is_busy() => self.start_download(url),
            Some(_) => {}
            None => tracing::warn!("{} not found; using built-in list", self.path.display()),
        }
        Some(fallback_emojis())
    }

    fn poll(&mut self) -> Option<Update<EmojiItem>> {
        self.download.drain().flatten().map(Update::Source)
    }

    fn is_loading(&self) -> bool {
        self.download.is_busy()
    }

    fn matches(&self, item: &EmojiItem, query: &str) -> bool {
        item.keywords.contains(query) || item.glyph.contains(query)
    }

    fn element(&self, item: &EmojiItem) -> Element {
        Element::new(&item.glyph, &item.glyph)
            .tooltip(format!("{} - Click to copy to clipboard", capitalize(&item.name)))
            .icon(Icon::Glyph(item.glyph.clone()))
    }

    fn action(&self, item: &EmojiItem) -> Action {
        Action::CopyText(item.glyph.clone())
    }

    fn status(&self, selected: Option<&EmojiItem>, status: &Status<'_>) -> String {
        match selected {
            Some(e) => format!("{} {}", e.glyph, e.name),
            None if !status.query.is_empty() => "No emoji found".into(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_include_synonyms_and_split_words() {
        let k = search_keywords("Smiling_Face-with-Heart");
        assert!(k.starts_with("smiling_face-with-heart"));
        assert!(k.contains("smile happy"));
        assert!(k.contains("heart love"));
        assert!(k.contains("smiling face with heart"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let list = parse_emoji_list("😀,grinning face\nno comma here\n,empty glyph\n🔥, fire \n");
        let glyphs: Vec<_> = list.iter().map(|e| e.glyph.as_str()).collect();
        assert_eq!(glyphs, ["😀", "🔥"]);
        assert_eq!(list[1].name, "fire");
    }

    #[test]
    fn matches_keywords_or_glyph() {
        let plugin = EmojiPlugin::new(PathBuf::new());
        let fire = item("🔥", "fire");
        assert!(plugin.matches(&fire, "fir"));
        assert!(plugin.matches(&fire, "🔥"));
        assert!(!plugin.matches(&fire, "water"));
    }
}
