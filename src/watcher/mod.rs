//! File Watcher & Incremental Index Updates
//!
//! Routes file-system changes into the [`CssIndex`].
//!
//! # Routing
//!
//! | path        | created / modified                     | deleted                        |
//! |-------------|----------------------------------------|--------------------------------|
//! | stylesheet  | debounced `update_css_file`            | immediate `remove_css_file`    |
//! | component   | debounced `handle_component_change`    | immediate `handle_component_change` |
//!
//! Native notifications (notify-rs) and editor-forwarded
//! `workspace/didChangeWatchedFiles` events both enter through
//! [`FileWatchers::dispatch`].

pub mod debounce;
mod events;
pub mod filtering;
pub mod types;

use crate::config::Config;
use crate::index::CssIndex;
use anyhow::{Context, Result};
use notify::Watcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use events::convert_event;
pub use filtering::WatchFilter;
pub use types::{FileChangeEvent, FileChangeType, WatchedFileKind};

/// Disposable handle over the workspace watch registration
pub struct FileWatchers {
    engine: Arc<CssIndex>,
    filter: Arc<WatchFilter>,
    watcher: Option<notify::RecommendedWatcher>,
    event_task: Option<JoinHandle<()>>,
    workspace_root: Option<PathBuf>,
}

impl FileWatchers {
    /// Routing only; events arrive through [`FileWatchers::dispatch`]
    pub fn new(engine: Arc<CssIndex>, config: &Config) -> Result<Self> {
        Ok(Self {
            engine,
            filter: Arc::new(WatchFilter::from_config(config)?),
            watcher: None,
            event_task: None,
            workspace_root: None,
        })
    }

    /// Watch `workspace_root` recursively for stylesheet and component changes
    ///
    /// Must be called from within a tokio runtime.
    pub fn setup(engine: Arc<CssIndex>, workspace_root: &Path, config: &Config) -> Result<Self> {
        let mut watchers = Self::new(engine, config)?;
        watchers.start(workspace_root)?;
        Ok(watchers)
    }

    fn start(&mut self, workspace_root: &Path) -> Result<()> {
        info!(
            "Starting file watcher for workspace: {}",
            workspace_root.display()
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();

        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Failed to send file event: {}", e);
            }
        })?;

        watcher
            .watch(workspace_root, notify::RecursiveMode::Recursive)
            .context("Failed to start watching workspace")?;

        let engine = self.engine.clone();
        let filter = self.filter.clone();
        let task = tokio::spawn(async move {
            debug!("File system event loop started");
            while let Some(event_result) = rx.recv().await {
                match event_result {
                    Ok(event) => {
                        for change in convert_event(event) {
                            dispatch_event(&engine, &filter, change);
                        }
                    }
                    Err(e) => warn!("File watcher error: {}", e),
                }
            }
            debug!("File system event loop stopped");
        });

        self.watcher = Some(watcher);
        self.event_task = Some(task);
        self.workspace_root = Some(workspace_root.to_path_buf());
        Ok(())
    }

    /// Route one change into the index
    pub fn dispatch(&self, event: FileChangeEvent) {
        dispatch_event(&self.engine, &self.filter, event);
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    /// Stop native notifications; pending debounced work belongs to the engine
    pub fn dispose(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            drop(watcher);
            info!("File watcher stopped");
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
    }
}

impl Drop for FileWatchers {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn dispatch_event(engine: &Arc<CssIndex>, filter: &WatchFilter, event: FileChangeEvent) {
    let Some(kind) = filter.classify(&event.path, event.change_type) else {
        return;
    };
    debug!(
        "{:?} {:?}: {}",
        kind,
        event.change_type,
        event.path.display()
    );

    match (kind, event.change_type) {
        (WatchedFileKind::Stylesheet, FileChangeType::Created | FileChangeType::Modified) => {
            engine.schedule_css_update(event.path);
        }
        (WatchedFileKind::Stylesheet, FileChangeType::Deleted) => {
            engine.cancel_pending_css_update(&event.path);
            engine.remove_css_file(&event.path);
        }
        (WatchedFileKind::Component, FileChangeType::Created | FileChangeType::Modified) => {
            engine.schedule_component_change(event.path);
        }
        (WatchedFileKind::Component, FileChangeType::Deleted) => {
            engine.handle_component_change(&event.path);
        }
    }
}
