use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use xxhash_rust::xxh3::xxh3_128;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::cache::fetch::{HttpFetcher, ImageFetcher};
use crate::cache::single_flight::SingleFlight;
use crate::foundation::error::{FetchError, ImprintResult};

const DEFAULT_CAPACITY: usize = 256;

/// Options for [`RemoteImageCache`].
#[derive(Debug, Clone)]
pub struct ImageCacheOpts {
    /// Directory holding persisted remote images, one file per URL hash.
    pub local_dir: PathBuf,
    /// Maximum number of decoded images resident in memory.
    pub capacity: usize,
    /// Persist successfully fetched payloads into `local_dir`.
    pub save_local: bool,
}

impl Default for ImageCacheOpts {
    fn default() -> Self {
        let capacity = std::env::var("IMPRINT_IMAGE_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CAPACITY);
        Self {
            local_dir: PathBuf::from("data/cache/image"),
            capacity,
            save_local: false,
        }
    }
}

impl ImageCacheOpts {
    /// Return options with a different persistence directory.
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    /// Return options with a different resident-entry bound (clamped to at least 1).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Return options with persistence of fetched payloads switched on or off.
    pub fn with_save_local(mut self, save_local: bool) -> Self {
        self.save_local = save_local;
        self
    }
}

struct CachedImage {
    image: PreparedImage,
    last_access: u64,
}

#[derive(Default)]
struct Entries {
    by_url: HashMap<String, CachedImage>,
    clock: u64,
}

impl Entries {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Bounded, deduplicating cache of remotely sourced images.
///
/// Lookup order: memory, then the local persistence directory, then one network fetch per URL
/// shared by every concurrent caller. Memory is bounded by LRU eviction over access stamps.
pub struct RemoteImageCache {
    opts: ImageCacheOpts,
    entries: Mutex<Entries>,
    inflight: SingleFlight<Result<PreparedImage, FetchError>>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl std::fmt::Debug for RemoteImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteImageCache")
            .field("opts", &self.opts)
            .field("resident", &self.len())
            .field("in_flight", &self.inflight.in_flight())
            .finish()
    }
}

impl RemoteImageCache {
    /// Cache backed by the default HTTP fetcher.
    pub fn new(opts: ImageCacheOpts) -> ImprintResult<Self> {
        Ok(Self::with_fetcher(opts, Arc::new(HttpFetcher::new()?)))
    }

    /// Cache backed by a caller-supplied fetcher.
    pub fn with_fetcher(mut opts: ImageCacheOpts, fetcher: Arc<dyn ImageFetcher>) -> Self {
        opts.capacity = opts.capacity.max(1);
        Self {
            opts,
            entries: Mutex::new(Entries::default()),
            inflight: SingleFlight::new(),
            fetcher,
        }
    }

    /// Effective options.
    pub fn opts(&self) -> &ImageCacheOpts {
        &self.opts
    }

    /// Resolve `url` to a decoded image.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, url: &str) -> Result<PreparedImage, FetchError> {
        if let Some(img) = self.lookup(url) {
            tracing::debug!("memory hit");
            return Ok(img);
        }
        if let Some(img) = self.load_local(url) {
            tracing::debug!("local hit");
            self.insert(url, img.clone());
            return Ok(img);
        }

        self.inflight
            .run(url, || self.fetch_and_store(url))
            .unwrap_or_else(|| {
                Err(FetchError::Abandoned {
                    url: url.to_owned(),
                })
            })
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.lock().by_url.len()
    }

    /// `true` when nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `url` is resident in memory (does not count as an access).
    pub fn contains(&self, url: &str) -> bool {
        self.lock().by_url.contains_key(url)
    }

    /// Path a persisted copy of `url` lives at.
    pub fn local_path(&self, url: &str) -> PathBuf {
        self.opts
            .local_dir
            .join(format!("{:032x}", xxh3_128(url.as_bytes())))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, url: &str) -> Option<PreparedImage> {
        let mut entries = self.lock();
        let stamp = entries.tick();
        let entry = entries.by_url.get_mut(url)?;
        entry.last_access = stamp;
        Some(entry.image.clone())
    }

    fn fetch_and_store(&self, url: &str) -> Result<PreparedImage, FetchError> {
        // A flight that finished just before ours started may already have stored the image.
        if let Some(img) = self.lookup(url) {
            return Ok(img);
        }

        let bytes = self.fetcher.fetch(url)?;
        let img = decode_image(&bytes).map_err(|e| FetchError::Decode {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if self.opts.save_local {
            self.persist(url, &bytes)?;
        }
        self.insert(url, img.clone());
        Ok(img)
    }

    fn insert(&self, url: &str, image: PreparedImage) {
        let mut entries = self.lock();
        if !entries.by_url.contains_key(url) && entries.by_url.len() >= self.opts.capacity {
            let oldest = entries
                .by_url
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.by_url.remove(&oldest);
                tracing::debug!(evicted = %oldest, "cache at capacity");
            }
        }
        let last_access = entries.tick();
        entries.by_url.insert(url.to_owned(), CachedImage { image, last_access });
    }

    fn load_local(&self, url: &str) -> Option<PreparedImage> {
        let path = self.local_path(url);
        let bytes = std::fs::read(&path).ok()?;
        match decode_image(&bytes) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring undecodable local copy");
                None
            }
        }
    }

    fn persist(&self, url: &str, bytes: &[u8]) -> Result<(), FetchError> {
        let persist_err = |e: std::io::Error| FetchError::Persist {
            url: url.to_owned(),
            reason: e.to_string(),
        };
        std::fs::create_dir_all(&self.opts.local_dir).map_err(persist_err)?;
        std::fs::write(self.local_path(url), bytes).map_err(persist_err)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/remote.rs"]
mod tests;
