use crate::actions::Action;
use crate::collection::DEFAULT_PAGE_SIZE;
use crate::render::Element;
use crate::thumbnail::ThumbnailSource;
use std::fmt;

/// The content kind currently shown by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Apps,
    Emojis,
    Gifs,
    Files,
    Wallpapers,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Apps,
        Mode::Emojis,
        Mode::Gifs,
        Mode::Files,
        Mode::Wallpapers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Apps => "apps",
            Mode::Emojis => "emoji",
            Mode::Gifs => "gifs",
            Mode::Files => "files",
            Mode::Wallpapers => "wallpapers",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a plugin answers a query.
pub enum Search<T> {
    /// Filter the loaded source with [`Plugin::matches`].
    Local,
    /// Results are final and replace the filtered list.
    Ready(Vec<T>),
    /// Results will arrive later through [`Plugin::poll`].
    Pending,
    /// Show nothing.
    Cleared,
}

/// Background work delivered by [`Plugin::poll`].
pub enum Update<T> {
    /// A (re)loaded source list.
    Source(Vec<T>),
    /// Results of the latest search.
    Results(Vec<T>),
}

/// Snapshot handed to [`Plugin::status`].
#[derive(Debug, Clone, Copy)]
pub struct Status<'a> {
    /// Trimmed query text.
    pub query: &'a str,
    pub matches: usize,
    pub total: usize,
    pub loading: bool,
}

/// Kind-specific policies for one content kind.
///
/// The paging, selection and render plumbing live in
/// [`CollectionManager`](crate::manager::CollectionManager); a plugin only
/// says how to load, match, describe and act on its items.
pub trait Plugin: Send {
    type Item: Clone + Send + 'static;

    fn mode(&self) -> Mode;

    fn page_size(&self) -> usize {
        DEFAULT_PAGE_SIZE
    }

    /// Produce the source list. Returning `None` means it will arrive via
    /// [`Update::Source`].
    fn load(&mut self) -> Option<Vec<Self::Item>>;

    /// `query` is lower-case and non-empty.
    fn matches(&self, item: &Self::Item, query: &str) -> bool;

    fn search(&mut self, _query: &str) -> Search<Self::Item> {
        Search::Local
    }

    fn poll(&mut self) -> Option<Update<Self::Item>> {
        None
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn element(&self, item: &Self::Item) -> Element;

    fn thumbnail(&self, _item: &Self::Item) -> Option<ThumbnailSource> {
        None
    }

    fn action(&self, item: &Self::Item) -> Action;

    fn status(&self, selected: Option<&Self::Item>, status: &Status<'_>) -> String;

    /// Completion offered for `query`, if any.
    fn suggest(&self, _source: &[Self::Item], _query: &str) -> Option<String> {
        None
    }
}
