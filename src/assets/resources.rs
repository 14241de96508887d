use std::collections::{BTreeMap, HashMap};

/// Static resource bundle addressed by string key (embedded images, fonts).
#[derive(Clone, Debug, Default)]
pub struct Resources {
    entries: HashMap<String, Vec<u8>>,
}

impl Resources {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), bytes.into());
    }

    /// Merge a template's string map; values are taken as their UTF-8 bytes.
    pub fn extend_strings(&mut self, map: &BTreeMap<String, String>) {
        for (k, v) in map {
            self.entries.insert(k.clone(), v.as_bytes().to_vec());
        }
    }

    /// Look up raw bytes by key.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the bundle holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
