//! Thumbnail decoding and the shared worker pool that produces them.

use crate::common::lru::SharedLru;
use crate::desktop_entry;
use crate::icons;
use anyhow::{anyhow, bail, Context};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::SystemTime;

/// Decoded RGBA pixels ready for upload by the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fit {
    /// Scale to exactly `size`x`size`.
    Exact,
    /// Keep the aspect ratio inside a `size` box.
    Contain,
    /// Centre crop to a square, then scale.
    CropSquare,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    File(PathBuf),
    /// Icon theme names, tried in order.
    Icon(Vec<String>),
    /// Use the `Icon=` of a desktop entry file.
    DesktopEntry(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailSource {
    pub key: String,
    pub origin: Origin,
    pub size: u32,
    pub fit: Fit,
}

impl ThumbnailSource {
    pub fn new(key: impl Into<String>, origin: Origin, size: u32, fit: Fit) -> Self {
        Self {
            key: key.into(),
            origin,
            size,
            fit,
        }
    }

    /// File sources include the modification time, so a file replaced under
    /// the same path is decoded again.
    pub fn cache_key(&self) -> CacheKey {
        let modified = match &self.origin {
            Origin::File(path) => std::fs::metadata(path).and_then(|m| m.modified()).ok(),
            _ => None,
        };
        (self.key.clone(), self.size, modified)
    }
}

pub type CacheKey = (String, u32, Option<SystemTime>);

/// Shared between the event thread and the decode workers. `None` marks a
/// source that failed to load so it is not retried on every render.
pub type ThumbnailCache = SharedLru<CacheKey, Option<Arc<Thumbnail>>>;

pub fn scale(img: DynamicImage, size: u32, fit: Fit) -> anyhow::Result<Thumbnail> {
    let size = size.max(1);
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        bail!("image has no pixels");
    }
    let img = match fit {
        Fit::Exact => img.resize_exact(size, size, FilterType::Triangle),
        Fit::Contain => img.thumbnail(size, size),
        Fit::CropSquare => {
            let side = w.min(h);
            img.crop_imm((w - side) / 2, (h - side) / 2, side, side)
                .resize_exact(size, size, FilterType::Triangle)
        }
    };
    let rgba = img.to_rgba8();
    Ok(Thumbnail {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn open_icon(names: &[String], size: u32) -> anyhow::Result<DynamicImage> {
    for name in names {
        if let Some(path) = icons::lookup(name, size) {
            match image::open(&path) {
                Ok(img) => return Ok(img),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "icon decode failed"),
            }
        }
    }
    Err(anyhow!("no usable icon among {names:?}"))
}

/// Load and scale the image described by `source`. Blocking.
pub fn load(
    source: &ThumbnailSource,
    client: Option<&reqwest::blocking::Client>,
) -> anyhow::Result<Thumbnail> {
    let img = match &source.origin {
        Origin::File(path) => {
            image::open(path).with_context(|| format!("decoding {}", path.display()))?
        }
        Origin::Icon(names) => open_icon(names, source.size)?,
        Origin::DesktopEntry(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let icon = desktop_entry::parse(&content)
                .icon
                .filter(|i| !i.is_empty())
                .ok_or_else(|| anyhow!("{} has no icon", path.display()))?;
            open_icon(&[icon, "application-x-executable".into()], source.size)?
        }
        Origin::Url(url) => {
            let client = client.ok_or_else(|| anyhow!("no http client"))?;
            let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
            image::load_from_memory(&bytes).with_context(|| format!("decoding {url}"))?
        }
    };
    scale(img, source.size, source.fit)
}

type Done = (CacheKey, Option<Arc<Thumbnail>>);

/// Fixed pool of decode threads fed through a shared job queue.
pub struct ThumbnailLoader {
    cache: ThumbnailCache,
    jobs: Sender<ThumbnailSource>,
    done: Receiver<Done>,
    pending: HashSet<CacheKey>,
}

impl ThumbnailLoader {
    pub fn spawn(name: &'static str, workers: usize, capacity: usize) -> Self {
        Self::with_cache(name, workers, SharedLru::new(capacity))
    }

    pub fn with_cache(name: &'static str, workers: usize, cache: ThumbnailCache) -> Self {
        let (jobs, job_rx) = mpsc::channel::<ThumbnailSource>();
        let (done_tx, done) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));
        for i in 0..workers.max(1) {
            let job_rx = Arc::clone(&job_rx);
            let cache = cache.clone();
            let done_tx = done_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("{name}-thumbs-{i}"))
                .spawn(move || run_worker(job_rx, cache, done_tx));
            if let Err(e) = spawned {
                tracing::error!(pool = name, error = %e, "failed to spawn thumbnail worker");
            }
        }
        Self {
            cache,
            jobs,
            done,
            pending: HashSet::new(),
        }
    }

    /// `Some(None)` means the source is known to be unloadable.
    pub fn cached(&self, source: &ThumbnailSource) -> Option<Option<Arc<Thumbnail>>> {
        self.cache.get(&source.cache_key())
    }

    /// Queue `source` unless it is cached or already queued.
    pub fn request(&mut self, source: ThumbnailSource) {
        let key = source.cache_key();
        if self.pending.contains(&key) || self.cache.contains(&key) {
            return;
        }
        if self.jobs.send(source).is_ok() {
            self.pending.insert(key);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Finished thumbnails as `(key, image)`. Failures are dropped; the
    /// placeholder stays.
    pub fn drain(&mut self) -> Vec<(String, Arc<Thumbnail>)> {
        let mut ready = Vec::new();
        while let Ok((key, thumb)) = self.done.try_recv() {
            self.pending.remove(&key);
            if let Some(thumb) = thumb {
                ready.push((key.0, thumb));
            }
        }
        ready
    }
}

fn run_worker(jobs: Arc<Mutex<Receiver<ThumbnailSource>>>, cache: ThumbnailCache, done: Sender<Done>) {
    let mut client = None;
    loop {
        let next = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(source) = next else { break };
        let key = source.cache_key();
        let thumb = match cache.get(&key) {
            Some(hit) => hit,
            None => {
                if matches!(source.origin, Origin::Url(_)) && client.is_none() {
                    client = crate::plugins::gif::http_client()
                        .map_err(|e| tracing::warn!(error = %e, "http client unavailable"))
                        .ok();
                }
                let loaded = match load(&source, client.as_ref()) {
                    Ok(t) => Some(Arc::new(t)),
                    Err(e) => {
                        tracing::debug!(key = %source.key, error = %e, "thumbnail unavailable");
                        None
                    }
                };
                cache.put(key.clone(), loaded.clone());
                loaded
            }
        };
        if done.send((key, thumb)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255])))
    }

    #[test]
    fn crop_square_produces_requested_size() {
        let t = scale(image(120, 60), 30, Fit::CropSquare).unwrap();
        assert_eq!((t.width, t.height), (30, 30));
        assert_eq!(t.rgba.len(), 30 * 30 * 4);
    }

    #[test]
    fn contain_keeps_aspect_ratio() {
        let t = scale(image(100, 50), 40, Fit::Contain).unwrap();
        assert_eq!((t.width, t.height), (40, 20));
    }

    #[test]
    fn loader_decodes_files_and_caches_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.png");
        image(8, 8).save(&good).unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let mut loader = ThumbnailLoader::spawn("test", 2, 8);
        let good_src = ThumbnailSource::new("good", Origin::File(good), 4, Fit::Exact);
        let bad_src = ThumbnailSource::new("bad", Origin::File(bad), 4, Fit::Exact);
        loader.request(good_src.clone());
        loader.request(bad_src.clone());

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut ready = Vec::new();
        while !loader.is_idle() && Instant::now() < deadline {
            ready.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].0, "good");
        assert_eq!(ready[0].1.width, 4);
        assert!(matches!(loader.cached(&good_src), Some(Some(_))));
        assert_eq!(loader.cached(&bad_src), Some(None));
    }

    fn wait_for(loader: &mut ThumbnailLoader) -> Vec<(String, Arc<Thumbnail>)> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut ready = Vec::new();
        while !loader.is_idle() && Instant::now() < deadline {
            ready.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(10));
        }
        ready
    }

    #[test]
    fn replaced_file_is_decoded_again() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wall.png");
        image(8, 8).save(&path).unwrap();
        let src = ThumbnailSource::new("wall", Origin::File(path.clone()), 4, Fit::Contain);

        let mut loader = ThumbnailLoader::spawn("test", 1, 8);
        loader.request(src.clone());
        let first = wait_for(&mut loader);
        assert_eq!((first[0].1.width, first[0].1.height), (4, 4));

        image(8, 4).save(&path).unwrap();
        let later = SystemTime::now() + Duration::from_secs(120);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert_eq!(loader.cached(&src), None);

        loader.request(src.clone());
        let second = wait_for(&mut loader);
        assert_eq!(second[0].0, "wall");
        assert_eq!((second[0].1.width, second[0].1.height), (4, 2));
    }
}
