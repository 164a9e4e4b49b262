use crate::plugin::Mode;
use crate::thumbnail::Thumbnail;
use std::sync::Arc;

/// Visual for a single entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// Text drawn directly, e.g. an emoji.
    Glyph(String),
    /// A decoded image that was already cached when the page was built.
    Thumbnail(Arc<Thumbnail>),
    /// Stand-in until [`Renderer::thumbnail_ready`] delivers the image.
    Placeholder,
    None,
}

/// Render descriptor for one visible entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Position in the filtered list, used for the click callback.
    pub index: usize,
    /// Stable identity used to match late thumbnails.
    pub key: String,
    pub label: String,
    pub tooltip: String,
    pub icon: Icon,
}

impl Element {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            index: 0,
            key: key.into(),
            label: label.into(),
            tooltip: String::new(),
            icon: Icon::None,
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub elements: Vec<Element>,
    /// Selected index in the filtered list, not relative to the page.
    pub selected: Option<usize>,
    pub page_index: usize,
    pub page_count: usize,
}

/// Presentation side of the launcher.
///
/// Managers call into this on the event thread; implementations only draw.
pub trait Renderer {
    /// Replace all visible entries.
    fn render_page(&mut self, mode: Mode, page: PageView);
    /// Move the highlight without rebuilding the page.
    fn highlight(&mut self, mode: Mode, selected: Option<usize>);
    fn set_status(&mut self, text: &str);
    /// Swap the placeholder of the entry identified by `key`, if it is still shown.
    fn thumbnail_ready(&mut self, key: &str, thumbnail: Arc<Thumbnail>);
}
