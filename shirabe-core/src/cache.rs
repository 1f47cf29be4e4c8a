use crate::error::{DwarfError, Result};
use crate::image::Image;
use crate::info::DwarfInfo;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Deduplicates parsed images by canonicalized path.
///
/// An explicit object rather than process-global state: construct one per
/// session and drop it when the session ends. Two `get` calls for the same
/// path return the same `Arc`; failed parses are not cached, so a caller
/// may retry after replacing a malformed file. Entries are never evicted.
#[derive(Default)]
pub struct ImageCache {
    entries: Mutex<HashMap<PathBuf, Arc<DwarfInfo>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared [`DwarfInfo`] for `path`, parsing it on first use.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Arc<DwarfInfo>> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|source| DwarfError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(hit) = self.entries.lock().unwrap().get(&canonical) {
            log::debug!("image cache hit for {}", canonical.display());
            return Ok(Arc::clone(hit));
        }

        // Parse outside the lock; a racing loser discards its copy below.
        let dwarf = Arc::new(DwarfInfo::parse(Image::open(&canonical)?)?);

        let mut entries = self.entries.lock().unwrap();
        Ok(Arc::clone(entries.entry(canonical).or_insert(dwarf)))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
