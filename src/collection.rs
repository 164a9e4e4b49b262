//! Paged, selectable view over a list of items.
//!
//! `PagedCollection` owns the source list of one content kind together with
//! the derived filtered list, the current page and the selected index. It
//! only tracks state; callers turn the returned [`Refresh`] into render
//! requests.

/// Number of entries shown per page unless a kind overrides it.
pub const DEFAULT_PAGE_SIZE: usize = 7;

/// What the view needs after a state change.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Nothing visible changed.
    Unchanged,
    /// Only the highlighted entry moved within the current page.
    Selection,
    /// The visible slice changed and must be rebuilt.
    Page,
}

#[derive(Debug, Clone)]
pub struct PagedCollection<T> {
    source: Vec<T>,
    filtered: Vec<T>,
    page: usize,
    page_size: usize,
    selected: Option<usize>,
}

impl<T: Clone> PagedCollection<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            source: Vec::new(),
            filtered: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            selected: None,
        }
    }

    /// Replace the source list wholesale and show it unfiltered.
    pub fn set_source(&mut self, items: Vec<T>) {
        self.source = items;
        self.filtered = self.source.clone();
        self.reset_view();
    }

    /// Recompute the filtered list from the source.
    ///
    /// The query is lower-cased before it is handed to `matches`. An empty
    /// query keeps every source item in order.
    pub fn filter_by<F>(&mut self, query: &str, mut matches: F) -> Refresh
    where
        F: FnMut(&T, &str) -> bool,
    {
        let needle = query.to_lowercase();
        self.filtered = if needle.is_empty() {
            self.source.clone()
        } else {
            self.source
                .iter()
                .filter(|item| matches(item, &needle))
                .cloned()
                .collect()
        };
        self.reset_view();
        Refresh::Page
    }

    /// Install results computed elsewhere (e.g. by a background search).
    pub fn replace_filtered(&mut self, items: Vec<T>) -> Refresh {
        self.filtered = items;
        self.reset_view();
        Refresh::Page
    }

    fn reset_view(&mut self) {
        self.page = 0;
        self.selected = if self.filtered.is_empty() { None } else { Some(0) };
    }

    /// Clamp the selection into the filtered list.
    pub fn ensure_selection_initialized(&mut self) {
        let len = self.filtered.len();
        self.selected = match self.selected {
            _ if len == 0 => None,
            None => Some(0),
            Some(i) => Some(i.min(len - 1)),
        };
    }

    pub fn select_next(&mut self) -> Refresh {
        if self.filtered.is_empty() {
            return Refresh::Unchanged;
        }
        self.ensure_selection_initialized();
        let last = self.filtered.len() - 1;
        let next = self.selected.map_or(0, |i| (i + 1).min(last));
        self.move_selection(next)
    }

    pub fn select_prev(&mut self) -> Refresh {
        if self.filtered.is_empty() {
            return Refresh::Unchanged;
        }
        self.ensure_selection_initialized();
        let prev = self.selected.map_or(0, |i| i.saturating_sub(1));
        self.move_selection(prev)
    }

    /// Select a specific entry, e.g. after a click. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Refresh {
        if index >= self.filtered.len() {
            return Refresh::Unchanged;
        }
        self.move_selection(index)
    }

    fn move_selection(&mut self, index: usize) -> Refresh {
        let before = self.selected;
        self.selected = Some(index);
        let page = index / self.page_size;
        if page != self.page {
            self.page = page;
            Refresh::Page
        } else if before == self.selected {
            Refresh::Unchanged
        } else {
            Refresh::Selection
        }
    }

    pub fn scroll_up(&mut self) -> Refresh {
        if self.page == 0 {
            return Refresh::Unchanged;
        }
        self.page -= 1;
        Refresh::Page
    }

    pub fn scroll_down(&mut self) -> Refresh {
        match self.max_page() {
            Some(max) if self.page < max => {
                self.page += 1;
                Refresh::Page
            }
            _ => Refresh::Unchanged,
        }
    }

    /// Last valid page index, `None` for an empty list.
    pub fn max_page(&self) -> Option<usize> {
        if self.filtered.is_empty() {
            None
        } else {
            Some((self.filtered.len() - 1) / self.page_size)
        }
    }

    pub fn page_count(&self) -> usize {
        self.max_page().map_or(0, |max| max + 1)
    }

    /// Index of the first visible item in the filtered list.
    pub fn page_start(&self) -> usize {
        (self.page * self.page_size).min(self.filtered.len())
    }

    /// The slice of the filtered list shown on the current page.
    pub fn visible(&self) -> &[T] {
        let start = self.page_start();
        let end = (start + self.page_size).min(self.filtered.len());
        &self.filtered[start..end]
    }

    /// The current selection, clamped into the filtered list.
    pub fn selected_index(&self) -> Option<usize> {
        match self.filtered.len() {
            0 => None,
            len => Some(self.selected.unwrap_or(0).min(len - 1)),
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected_index().and_then(|i| self.filtered.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.filtered.get(index)
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn items(&self) -> &[T] {
        &self.filtered
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

impl<T: Clone> Default for PagedCollection<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
