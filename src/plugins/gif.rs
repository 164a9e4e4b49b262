use crate::actions::Action;
use crate::common::contains_ci;
use crate::plugin::{Mode, Plugin, Search, Status, Update};
use crate::render::Element;
use crate::thumbnail::{Fit, Origin, ThumbnailSource};
use crate::worker::{CancelToken, Debounce, SearchWorker};
use anyhow::Context;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const TENOR_SEARCH_URL: &str = "https://tenor.googleapis.com/v2/search";
pub const PAGE_LIMIT: u32 = 50;
pub const MAX_PAGES: usize = 5;
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = "Edge-Launcher/1.0";
pub const SEARCH_DELAY: Duration = Duration::from_millis(300);

const PREVIEW_FORMATS: &[&str] = &["tinygif", "nanogif", "gif", "mediumgif"];

/// Blocking client shared by the GIF search and preview downloads.
pub fn http_client() -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifItem {
    pub id: String,
    pub name: String,
    /// Page link copied to the clipboard.
    pub url: String,
    pub preview_url: String,
}

/// A remote GIF search backend.
pub trait GifProvider: Send + Sync {
    /// Blocking search. Implementations should give up early once `cancel`
    /// reports the search as superseded.
    fn search(&self, query: &str, cancel: &CancelToken) -> anyhow::Result<Vec<GifItem>>;
}

#[derive(Debug, Deserialize)]
struct TenorPage {
    #[serde(default)]
    results: Vec<TenorResult>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TenorResult {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    itemurl: Option<String>,
    #[serde(default)]
    media_formats: HashMap<String, TenorMedia>,
}

#[derive(Debug, Deserialize)]
struct TenorMedia {
    #[serde(default)]
    url: Option<String>,
}

fn title_slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Parse one Tenor response page. `offset` is the number of items already
/// collected, used to number untitled GIFs. Items without a page URL or a
/// preview are skipped.
pub fn parse_page(body: &str, offset: usize) -> anyhow::Result<(Vec<GifItem>, Option<String>)> {
    let page: TenorPage = serde_json::from_str(body).context("invalid Tenor response")?;
    let mut items = Vec::with_capacity(page.results.len());
    for result in page.results {
        let id = result.id.unwrap_or_default();
        let url = match (result.itemurl.filter(|u| !u.is_empty()), &result.title) {
            (Some(url), _) => url,
            (None, Some(title)) if !id.is_empty() => {
                format!("https://tenor.com/view/{}-gif-{}", title_slug(title), id)
            }
            _ => continue,
        };
        let Some(preview_url) = PREVIEW_FORMATS
            .iter()
            .filter_map(|f| result.media_formats.get(*f))
            .find_map(|m| m.url.clone().filter(|u| !u.is_empty()))
        else {
            continue;
        };
        let name = match result.title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title,
            None => format!("GIF #{}", offset + items.len() + 1),
        };
        items.push(GifItem {
            id,
            name,
            url,
            preview_url,
        });
    }
    let next = page.next.filter(|n| !n.is_empty() && n != "0");
    Ok((items, next))
}

pub struct TenorProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TenorProvider {
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            base_url: TENOR_SEARCH_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn page_url(&self, query: &str, pos: Option<&str>) -> anyhow::Result<url::Url> {
        let limit = PAGE_LIMIT.to_string();
        let mut params = vec![
            ("q", query),
            ("key", self.api_key.as_str()),
            ("limit", limit.as_str()),
            ("media_filter", "minimal"),
            ("contentfilter", "high"),
        ];
        if let Some(pos) = pos {
            params.push(("pos", pos));
        }
        Ok(url::Url::parse_with_params(&self.base_url, &params)?)
    }

    fn fetch_page(
        &self,
        query: &str,
        pos: Option<&str>,
        offset: usize,
    ) -> anyhow::Result<(Vec<GifItem>, Option<String>)> {
        let url = self.page_url(query, pos)?;
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        parse_page(&body, offset)
    }
}

impl GifProvider for TenorProvider {
    fn search(&self, query: &str, cancel: &CancelToken) -> anyhow::Result<Vec<GifItem>> {
        let mut gifs = Vec::new();
        let mut pos: Option<String> = None;
        for page in 0..MAX_PAGES {
            if cancel.is_cancelled() {
                break;
            }
            let (items, next) = match self.fetch_page(query, pos.as_deref(), gifs.len()) {
                Ok(page) => page,
                Err(e) if gifs.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(page, kept = gifs.len(), "tenor paging stopped: {:#}", e);
                    break;
                }
            };
            tracing::debug!(page, count = items.len(), "tenor page received");
            let exhausted = items.is_empty();
            gifs.extend(items);
            match next {
                Some(next) if !exhausted => pos = Some(next),
                _ => break,
            }
        }
        Ok(gifs)
    }
}

pub struct GifPlugin {
    provider: Arc<dyn GifProvider>,
    worker: SearchWorker<Vec<GifItem>>,
    debounce: Debounce,
    size: u32,
}

impl GifPlugin {
    pub fn new(provider: Arc<dyn GifProvider>, size: u32) -> Self {
        Self::with_delay(provider, size, SEARCH_DELAY)
    }

    pub fn with_delay(provider: Arc<dyn GifProvider>, size: u32, delay: Duration) -> Self {
        Self {
            provider,
            worker: SearchWorker::new("gifs"),
            debounce: Debounce::new(delay),
            size,
        }
    }

    fn start_due_search(&mut self) {
        let Some(query) = self.debounce.take_due(Instant::now()) else {
            return;
        };
        let provider = Arc::clone(&self.provider);
        self.worker.spawn(move |cancel| {
            provider.search(&query, cancel).unwrap_or_else(|e| {
                tracing::warn!("gif search for '{}' failed: {}", query, e);
                Vec::new()
            })
        });
    }
}

impl Plugin for GifPlugin {
    type Item = GifItem;

    fn mode(&self) -> Mode {
        Mode::Gifs
    }

    fn load(&mut self) -> Option<Vec<GifItem>> {
        Some(Vec::new())
    }

    fn matches(&self, item: &GifItem, query: &str) -> bool {
        contains_ci(&item.name, query)
    }

    fn search(&mut self, query: &str) -> Search<GifItem> {
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

    fn poll(&mut self) -> Option<Update<GifItem>> {
        self.start_due_search();
        self.worker.drain().map(Update::Results)
    }

    fn is_loading(&self) -> bool {
        self.worker.is_busy() || self.debounce.is_pending()
    }

    fn element(&self, item: &GifItem) -> Element {
        let key = if item.id.is_empty() { &item.url } else { &item.id };
        Element::new(key, &item.name)
            .tooltip(format!("{} - Click to copy link to clipboard", item.name))
    }

    fn thumbnail(&self, item: &GifItem) -> Option<ThumbnailSource> {
        let key = if item.id.is_empty() { &item.url } else { &item.id };
        Some(ThumbnailSource::new(
            key,
            Origin::Url(item.preview_url.clone()),
            self.size,
            Fit::Exact,
        ))
    }

    fn action(&self, item: &GifItem) -> Action {
        Action::CopyText(item.url.clone())
    }

    fn status(&self, selected: Option<&GifItem>, status: &Status<'_>) -> String {
        match selected {
            Some(gif) => gif.name.clone(),
            None if status.loading => "Loading GIFs...".into(),
            None if !status.query.is_empty() && status.matches == 0 => "No GIFs found".into(),
            None if !status.query.is_empty() => format!("Found {} GIFs", status.matches),
            None => "Search for GIFs...".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_carries_query_parameters() {
        let provider = TenorProvider::new("KEY").unwrap();
        let url = provider.page_url("happy cat", Some("CAE")).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["q"], "happy cat");
        assert_eq!(pairs["key"], "KEY");
        assert_eq!(pairs["limit"], "50");
        assert_eq!(pairs["media_filter"], "minimal");
        assert_eq!(pairs["contentfilter"], "high");
        assert_eq!(pairs["pos"], "CAE");
    }

    #[test]
    fn base_url_can_be_overridden() {
        let provider = TenorProvider::new("KEY")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/v2/search");
        let url = provider.page_url("cat", None).unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.port(), Some(9000));
        assert!(!url.query_pairs().any(|(k, _)| k == "pos"));
    }

    #[test]
    fn slug_keeps_alphanumerics_and_dashes() {
        assert_eq!(title_slug("Happy Cat_Dance!"), "Happy-Cat-Dance");
    }
}
