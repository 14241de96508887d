use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use xxhash_rust::xxh3::xxh3_64;

use crate::foundation::error::{ImprintError, ImprintResult};

/// A parsed font program shared by every text font that names it.
pub struct FontProgram {
    name: String,
    data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontProgram")
            .field("name", &self.name)
            .field("bytes_len", &self.data.data.as_ref().len())
            .finish()
    }
}

impl FontProgram {
    /// Validate `bytes` as a font and wrap them.
    pub fn parse(name: impl Into<String>, bytes: Vec<u8>) -> ImprintResult<Self> {
        let name = name.into();
        skrifa::FontRef::from_index(&bytes, 0)
            .map_err(|e| ImprintError::validation(format!("malformed font '{name}': {e}")))?;
        Ok(Self {
            name,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    /// Registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }

    pub(crate) fn font_ref(&self) -> ImprintResult<skrifa::FontRef<'_>> {
        skrifa::FontRef::from_index(self.data.data.as_ref(), self.data.index)
            .map_err(|e| ImprintError::render(format!("font '{}' unreadable: {e}", self.name)))
    }
}

/// Name-keyed cache of font programs loaded from `<dir>/<name>.ttf`.
///
/// Embedded programs live apart from directory programs, keyed by name and content hash, so a
/// template's own `<name>.ttf` never shadows or is shadowed by another source of that name.
/// Entries are never evicted. Reads and first-time parses share one lock; parses are rare.
#[derive(Debug)]
pub struct FontRegistry {
    dir: PathBuf,
    fonts: Mutex<HashMap<String, Arc<FontProgram>>>,
    embedded: Mutex<HashMap<(String, u64), Arc<FontProgram>>>,
}

impl FontRegistry {
    /// Registry reading font files from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fonts: Mutex::new(HashMap::new()),
            embedded: Mutex::new(HashMap::new()),
        }
    }

    /// Directory font files are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the program for `name`, loading and parsing it on first request.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, name: &str) -> ImprintResult<Arc<FontProgram>> {
        let mut fonts = self.fonts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = fonts.get(name) {
            return Ok(Arc::clone(font));
        }

        let path = self.dir.join(format!("{name}.ttf"));
        let bytes = std::fs::read(&path).map_err(|e| {
            ImprintError::validation(format!("cannot read font '{}': {e}", path.display()))
        })?;
        let font = Arc::new(FontProgram::parse(name, bytes)?);
        fonts.insert(name.to_owned(), Arc::clone(&font));
        tracing::debug!(name, path = %path.display(), "font loaded");
        Ok(font)
    }

    /// Program for embedded `bytes` named `name`.
    ///
    /// Identical bytes share one program; directory fonts of the same name are not consulted.
    pub fn register(&self, name: &str, bytes: &[u8]) -> ImprintResult<Arc<FontProgram>> {
        let key = (name.to_owned(), xxh3_64(bytes));
        let mut embedded = self.embedded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = embedded.get(&key) {
            return Ok(Arc::clone(font));
        }
        let font = Arc::new(FontProgram::parse(name, bytes.to_vec())?);
        tracing::debug!(name, hash = key.1, "embedded font registered");
        embedded.insert(key, Arc::clone(&font));
        Ok(font)
    }

    /// Number of resident programs, directory and embedded.
    pub fn len(&self) -> usize {
        let dir = self.fonts.lock().unwrap_or_else(PoisonError::into_inner).len();
        dir + self
            .embedded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/registry.rs"]
mod tests;
