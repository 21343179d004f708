//! Trailing-edge debouncing keyed by file path
//!
//! Each path has at most one pending timer. A new event for the same path
//! aborts the pending timer and starts a fresh window, so a burst collapses into
//! one action that runs `window` after the last event. Paths never interact.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingMap = HashMap<PathBuf, PendingTimer>;

pub struct Debouncer {
    window_ms: AtomicU64,
    pending: Arc<StdMutex<PendingMap>>,
    next_generation: AtomicU64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: AtomicU64::new(window.as_millis() as u64),
            pending: Arc::new(StdMutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.load(Ordering::Relaxed))
    }

    /// Applies to events scheduled from now on
    pub fn set_window(&self, window: Duration) {
        self.window_ms
            .store(window.as_millis() as u64, Ordering::Relaxed);
    }

    /// Run `action` once `window` has passed without another event for `path`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, path: PathBuf, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let window = self.window();
        let pending = self.pending.clone();
        let task_path = path.clone();

        let mut timers = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;

            // Leave the table before running so a new event starts a new
            // window instead of aborting work already underway
            {
                let mut timers = lock(&pending);
                match timers.get(&task_path) {
                    Some(timer) if timer.generation == generation => {
                        timers.remove(&task_path);
                    }
                    _ => return,
                }
            }

            debug!("Debounce window elapsed for {}", task_path.display());
            action.await;
        });

        if let Some(previous) = timers.insert(path, PendingTimer { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Drop the pending timer for `path` without running it
    pub fn cancel(&self, path: &Path) -> bool {
        match lock(&self.pending).remove(path) {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let mut timers = lock(&self.pending);
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        lock(&self.pending).contains_key(path)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock(pending: &StdMutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    match pending.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Debounce table mutex poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}
