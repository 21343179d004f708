//! Parsed stylesheet cache
//!
//! Keyed by absolute CSS path and shared by every component importing that
//! file. An entry is stale when the live mtime differs from the one recorded at
//! parse time; stale entries are replaced wholesale, never patched.

use crate::extractors::CssFileRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct FileContentCache {
    entries: HashMap<PathBuf, Arc<CssFileRecord>>,
}

impl FileContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<CssFileRecord>> {
        self.entries.get(path).cloned()
    }

    pub fn insert(&mut self, record: CssFileRecord) -> Arc<CssFileRecord> {
        let record = Arc::new(record);
        self.entries.insert(record.file_path.clone(), record.clone());
        record
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Compare a cached record against the file on disk
///
/// A missing or unreadable file counts as stale so the caller reparses and
/// surfaces the real error.
pub async fn is_stale(record: &CssFileRecord) -> bool {
    match tokio::fs::metadata(&record.file_path).await {
        Ok(metadata) => match metadata.modified() {
            Ok(modified) => modified != record.last_modified,
            Err(_) => true,
        },
        Err(_) => true,
    }
}
