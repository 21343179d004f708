//! Type definitions for file watcher events
//!
//! A native notification is reduced to one or more [`FileChangeEvent`]s before
//! it is routed into the index.

use std::path::PathBuf;
use std::time::SystemTime;

/// Represents a file system change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub change_type: FileChangeType,
    pub timestamp: SystemTime,
}

impl FileChangeEvent {
    pub fn new(path: impl Into<PathBuf>, change_type: FileChangeType) -> Self {
        Self {
            path: path.into(),
            change_type,
            timestamp: SystemTime::now(),
        }
    }
}

/// Types of file system changes we track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeType {
    Created,
    Modified,
    Deleted,
}

/// What a watched path is to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedFileKind {
    Stylesheet,
    Component,
}
