use crate::actions::Action;
use crate::collection::{PagedCollection, Refresh};
use crate::plugin::{Mode, Plugin, Search, Status, Update};
use crate::render::{Icon, PageView, Renderer};
use crate::thumbnail::ThumbnailLoader;

/// Input surface of one content kind, as seen by the launcher and the UI.
///
/// All methods run on the event thread. Methods taking a [`Renderer`] report
/// visible changes through it before returning.
pub trait Manager: Send {
    fn mode(&self) -> Mode;
    /// Called whenever the kind becomes visible. Loads the source on first use.
    fn enter(&mut self, ui: &mut dyn Renderer);
    /// Drop the source and load it again.
    fn reload(&mut self, ui: &mut dyn Renderer);
    fn filter(&mut self, query: &str, ui: &mut dyn Renderer);
    fn select_next(&mut self, ui: &mut dyn Renderer);
    fn select_prev(&mut self, ui: &mut dyn Renderer);
    fn scroll_up(&mut self, ui: &mut dyn Renderer);
    fn scroll_down(&mut self, ui: &mut dyn Renderer);
    fn select(&mut self, index: usize, ui: &mut dyn Renderer);
    /// The action for the current selection, if there is one.
    fn activate_selected(&mut self) -> Option<Action>;
    /// Select `index` and return its action, e.g. after a click.
    fn activate_at(&mut self, index: usize, ui: &mut dyn Renderer) -> Option<Action>;
    /// Apply finished background work. Returns `true` if anything changed.
    fn poll(&mut self, ui: &mut dyn Renderer) -> bool;
    fn status(&self) -> String;
    fn suggestion(&self) -> Option<String>;
    fn len(&self) -> usize;
    fn selected_index(&self) -> Option<usize>;
}

/// The one [`Manager`] implementation, parameterised over a [`Plugin`].
pub struct CollectionManager<P: Plugin> {
    plugin: P,
    items: PagedCollection<P::Item>,
    query: String,
    load_requested: bool,
    thumbnails: Option<ThumbnailLoader>,
}

impl<P: Plugin> CollectionManager<P> {
    pub fn new(plugin: P) -> Self {
        let items = PagedCollection::new(plugin.page_size());
        Self {
            plugin,
            items,
            query: String::new(),
            load_requested: false,
            thumbnails: None,
        }
    }

    pub fn with_thumbnails(mut self, loader: ThumbnailLoader) -> Self {
        self.thumbnails = Some(loader);
        self
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn items(&self) -> &PagedCollection<P::Item> {
        &self.items
    }

    fn refilter(&mut self) {
        let plugin = &self.plugin;
        let _ = self.items.filter_by(&self.query, |item, q| plugin.matches(item, q));
    }

    fn render(&mut self, ui: &mut dyn Renderer) {
        let start = self.items.page_start();
        let mut requests = Vec::new();
        let mut elements = Vec::with_capacity(self.items.page_size());
        for (offset, item) in self.items.visible().iter().enumerate() {
            let mut element = self.plugin.element(item);
            element.index = start + offset;
            if let (Some(loader), Some(source)) = (&self.thumbnails, self.plugin.thumbnail(item)) {
                match loader.cached(&source) {
                    Some(Some(thumb)) => element.icon = Icon::Thumbnail(thumb),
                    Some(None) => element.icon = Icon::Placeholder,
                    None => {
                        element.icon = Icon::Placeholder;
                        requests.push(source);
                    }
                }
            }
            elements.push(element);
        }
        if let Some(loader) = self.thumbnails.as_mut() {
            for source in requests {
                loader.request(source);
            }
        }
        let page = PageView {
            elements,
            selected: self.items.selected_index(),
            page_index: self.items.page_index(),
            page_count: self.items.page_count(),
        };
        ui.render_page(self.plugin.mode(), page);
        ui.set_status(&self.status());
    }

    fn apply(&mut self, refresh: Refresh, ui: &mut dyn Renderer) {
        match refresh {
            Refresh::Page => self.render(ui),
            Refresh::Selection => {
                ui.highlight(self.plugin.mode(), self.items.selected_index());
                ui.set_status(&self.status());
            }
            Refresh::Unchanged => {}
        }
    }
}

impl<P: Plugin> Manager for CollectionManager<P> {
    fn mode(&self) -> Mode {
        self.plugin.mode()
    }

    fn enter(&mut self, ui: &mut dyn Renderer) {
        if !self.load_requested {
            self.load_requested = true;
            if let Some(items) = self.plugin.load() {
                tracing::debug!(mode = %self.plugin.mode(), count = items.len(), "source loaded");
                self.items.set_source(items);
                self.refilter();
            }
        }
        self.render(ui);
    }

    fn reload(&mut self, ui: &mut dyn Renderer) {
        self.load_requested = false;
        self.enter(ui);
    }

    fn filter(&mut self, query: &str, ui: &mut dyn Renderer) {
        self.query = query.to_string();
        match self.plugin.search(query) {
            Search::Local => self.refilter(),
            Search::Ready(items) => {
                let _ = self.items.replace_filtered(items);
            }
            Search::Cleared => {
                let _ = self.items.replace_filtered(Vec::new());
            }
            Search::Pending => {
                ui.set_status(&self.status());
                return;
            }
        }
        self.render(ui);
    }

    fn select_next(&mut self, ui: &mut dyn Renderer) {
        let refresh = self.items.select_next();
        self.apply(refresh, ui);
    }

    fn select_prev(&mut self, ui: &mut dyn Renderer) {
        let refresh = self.items.select_prev();
        self.apply(refresh, ui);
    }

    fn scroll_up(&mut self, ui: &mut dyn Renderer) {
        let refresh = self.items.scroll_up();
        self.apply(refresh, ui);
    }

    fn scroll_down(&mut self, ui: &mut dyn Renderer) {
        let refresh = self.items.scroll_down();
        self.apply(refresh, ui);
    }

    fn select(&mut self, index: usize, ui: &mut dyn Renderer) {
        let refresh = self.items.select(index);
        self.apply(refresh, ui);
    }

    fn activate_selected(&mut self) -> Option<Action> {
        self.items.ensure_selection_initialized();
        self.items.selected_item().map(|item| self.plugin.action(item))
    }

    fn activate_at(&mut self, index: usize, ui: &mut dyn Renderer) -> Option<Action> {
        let item = self.items.get(index)?;
        let action = self.plugin.action(item);
        self.select(index, ui);
        Some(action)
    }

    fn poll(&mut self, ui: &mut dyn Renderer) -> bool {
        let mut changed = false;
        while let Some(update) = self.plugin.poll() {
            changed = true;
            match update {
                Update::Source(items) => {
                    tracing::debug!(mode = %self.plugin.mode(), count = items.len(), "source loaded");
                    self.items.set_source(items);
                    self.refilter();
                }
                Update::Results(items) => {
                    tracing::debug!(mode = %self.plugin.mode(), count = items.len(), "search finished");
                    let _ = self.items.replace_filtered(items);
                }
            }
        }
        if changed {
            self.render(ui);
        }
        if let Some(loader) = self.thumbnails.as_mut() {
            for (key, thumb) in loader.drain() {
                ui.thumbnail_ready(&key, thumb);
                changed = true;
            }
        }
        changed
    }

    fn status(&self) -> String {
        let status = Status {
            query: self.query.trim(),
            matches: self.items.len(),
            total: self.items.source().len(),
            loading: self.plugin.is_loading(),
        };
        self.plugin.status(self.items.selected_item(), &status)
    }

    fn suggestion(&self) -> Option<String> {
        self.plugin.suggest(self.items.source(), self.query.trim())
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn selected_index(&self) -> Option<usize> {
        self.items.selected_index()
    }
}
