//! Component-to-stylesheet index
//!
//! `CssIndex` owns three pieces of state:
//! - `index`: component path → [`ComponentIndex`]
//! - `file_cache`: CSS path → parsed [`CssFileRecord`], shared across components
//! - `css_file_to_components`: CSS path → components currently depending on it
//!
//! For every indexed component, each stylesheet it imports lists the component
//! in the reverse map, and the reverse map lists nothing else. Imports that
//! failed to parse are linked too, so fixing the file later reaches the
//! component. Every mutation restores this in both directions.
//!
//! Nothing here raises to callers. Parse and resolution failures are logged and
//! the offending file is skipped; lookups answer with `None` or empty results.

pub mod cache;
pub mod component;

use crate::extractors::{ClassDefinition, CssFileRecord, parse_css_file};
use crate::watcher::debounce::Debouncer;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

pub use cache::FileContentCache;
pub use component::ComponentIndex;

/// Trailing debounce applied to file-system change bursts
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

type InFlight = Shared<BoxFuture<'static, ()>>;

#[derive(Debug, Default)]
struct IndexState {
    index: HashMap<PathBuf, Arc<ComponentIndex>>,
    file_cache: FileContentCache,
    css_file_to_components: HashMap<PathBuf, HashSet<PathBuf>>,
}

impl IndexState {
    /// Drop `component_path` from the reverse-map entries of every stylesheet
    /// its current index imports
    fn unlink_component(&mut self, component_path: &Path) {
        let Some(previous) = self.index.get(component_path) else {
            return;
        };
        let previous_files: Vec<PathBuf> = previous.import_paths.clone();

        for css_path in previous_files {
            if let Some(dependents) = self.css_file_to_components.get_mut(&css_path) {
                dependents.remove(component_path);
                if dependents.is_empty() {
                    self.css_file_to_components.remove(&css_path);
                }
            }
        }
    }

    fn link_component(&mut self, component: &ComponentIndex) {
        for css_path in &component.import_paths {
            self.css_file_to_components
                .entry(css_path.clone())
                .or_default()
                .insert(component.component_path.clone());
        }
    }

    fn remove_component(&mut self, component_path: &Path) -> bool {
        self.unlink_component(component_path);
        self.index.remove(component_path).is_some()
    }
}

/// The indexing engine behind every editor feature
///
/// Explicitly constructed and owned by whatever composes the providers; call
/// [`CssIndex::clear`] at shutdown.
pub struct CssIndex {
    state: RwLock<IndexState>,
    in_flight: StdMutex<HashMap<PathBuf, InFlight>>,
    css_debouncer: Debouncer,
    component_debouncer: Debouncer,
}

impl Default for CssIndex {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl CssIndex {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            in_flight: StdMutex::new(HashMap::new()),
            css_debouncer: Debouncer::new(debounce),
            component_debouncer: Debouncer::new(debounce),
        }
    }

    pub fn set_debounce(&self, window: Duration) {
        self.css_debouncer.set_window(window);
        self.component_debouncer.set_window(window);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, IndexState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Index state lock poisoned during read, recovering: {}", poisoned);
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IndexState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Index state lock poisoned during write, recovering: {}", poisoned);
                poisoned.into_inner()
            }
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<PathBuf, InFlight>> {
        match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("In-flight table mutex poisoned, recovering: {}", poisoned);
                poisoned.into_inner()
            }
        }
    }

    /// Pure lookup; never triggers indexing
    pub fn get_component_index(&self, component_path: &Path) -> Option<Arc<ComponentIndex>> {
        self.read_state().index.get(component_path).cloned()
    }

    /// First occurrence of `class_name` among the component's stylesheets
    pub fn get_class(&self, component_path: &Path, class_name: &str) -> Option<ClassDefinition> {
        self.get_component_index(component_path)?
            .get_class(class_name)
            .cloned()
    }

    /// Every occurrence of `class_name`: import order across files, source
    /// order within each
    pub fn get_all_classes(&self, component_path: &Path, class_name: &str) -> Vec<ClassDefinition> {
        self.get_component_index(component_path)
            .map(|index| index.all_occurrences(class_name))
            .unwrap_or_default()
    }

    /// Build (or rebuild) the component's index from `css_file_paths`
    ///
    /// Stylesheets are consulted in order; cached records are reused unless the
    /// file on disk is newer. A stylesheet that fails to parse is logged and
    /// left out, the rest are still indexed.
    pub async fn index_component(&self, component_path: &Path, css_file_paths: &[PathBuf]) {
        debug!(
            "Indexing {} against {} stylesheet(s)",
            component_path.display(),
            css_file_paths.len()
        );

        let mut records: Vec<Arc<CssFileRecord>> = Vec::with_capacity(css_file_paths.len());
        for css_path in css_file_paths {
            if records.iter().any(|r| &r.file_path == css_path) {
                continue;
            }
            if let Some(record) = self.cached_or_parse(css_path).await {
                records.push(record);
            }
        }

        let component = ComponentIndex::new(
            component_path.to_path_buf(),
            css_file_paths.to_vec(),
            records,
        );

        let mut state = self.write_state();
        state.unlink_component(component_path);
        state.link_component(&component);
        info!(
            "Indexed {} ({} classes from {} stylesheet(s))",
            component_path.display(),
            component.len(),
            component.css_files().len()
        );
        state
            .index
            .insert(component_path.to_path_buf(), Arc::new(component));
    }

    async fn cached_or_parse(&self, css_path: &Path) -> Option<Arc<CssFileRecord>> {
        let cached = self.read_state().file_cache.get(css_path);
        if let Some(record) = cached {
            if !cache::is_stale(&record).await {
                return Some(record);
            }
            debug!("Cache entry for {} is stale", css_path.display());
        }

        match parse_css_file(css_path).await {
            Ok(record) => Some(self.write_state().file_cache.insert(record)),
            Err(e) => {
                warn!("Skipping stylesheet: {}", e);
                self.write_state().file_cache.invalidate(css_path);
                None
            }
        }
    }

    /// Index the component unless an index already exists
    ///
    /// Concurrent first queries for the same component share one indexing run
    /// instead of each reparsing.
    pub async fn ensure_indexed(
        self: &Arc<Self>,
        component_path: &Path,
        css_file_paths: Vec<PathBuf>,
    ) -> Option<Arc<ComponentIndex>> {
        if let Some(index) = self.get_component_index(component_path) {
            return Some(index);
        }

        let run = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.get(component_path) {
                Some(run) => run.clone(),
                None => {
                    let engine = self.clone();
                    let path = component_path.to_path_buf();
                    let run = async move {
                        engine.index_component(&path, &css_file_paths).await;
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(component_path.to_path_buf(), run.clone());
                    run
                }
            }
        };

        run.clone().await;

        {
            let mut in_flight = self.lock_in_flight();
            if in_flight
                .get(component_path)
                .is_some_and(|current| current.ptr_eq(&run))
            {
                in_flight.remove(component_path);
            }
        }

        self.get_component_index(component_path)
    }

    /// Reparse a changed stylesheet and rebuild every dependent component
    ///
    /// Each dependent is rebuilt from its full import set so its whole index
    /// stays consistent.
    pub async fn update_css_file(&self, file_path: &Path) {
        let dependents: Vec<(PathBuf, Vec<PathBuf>)> = {
            let mut state = self.write_state();
            state.file_cache.invalidate(file_path);
            let components: Vec<PathBuf> = state
                .css_file_to_components
                .get(file_path)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            components
                .into_iter()
                .filter_map(|component| {
                    let imports = state.index.get(&component)?.import_paths.clone();
                    Some((component, imports))
                })
                .collect()
        };

        info!(
            "Stylesheet {} changed, re-indexing {} component(s)",
            file_path.display(),
            dependents.len()
        );

        for (component_path, imports) in dependents {
            self.index_component(&component_path, &imports).await;
        }
    }

    /// Propagate a deleted stylesheet
    ///
    /// Dependent components lose their index outright; the next query rebuilds
    /// it from the live document's imports.
    pub fn remove_css_file(&self, file_path: &Path) {
        let mut state = self.write_state();
        state.file_cache.invalidate(file_path);

        let dependents: Vec<PathBuf> = state
            .css_file_to_components
            .remove(file_path)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        for component_path in &dependents {
            state.remove_component(component_path);
        }

        info!(
            "Stylesheet {} deleted, dropped {} component index(es)",
            file_path.display(),
            dependents.len()
        );
    }

    /// Forget a component whose source changed; reindexing happens lazily
    pub fn handle_component_change(&self, component_path: &Path) {
        if self.write_state().remove_component(component_path) {
            debug!("Invalidated index for {}", component_path.display());
        }
    }

    /// Debounced [`CssIndex::update_css_file`]
    pub fn schedule_css_update(self: &Arc<Self>, file_path: PathBuf) {
        let engine = self.clone();
        let path = file_path.clone();
        self.css_debouncer.schedule(file_path, async move {
            engine.update_css_file(&path).await;
        });
    }

    /// Debounced [`CssIndex::handle_component_change`]
    pub fn schedule_component_change(self: &Arc<Self>, component_path: PathBuf) {
        let engine = self.clone();
        let path = component_path.clone();
        self.component_debouncer.schedule(component_path, async move {
            engine.handle_component_change(&path);
        });
    }

    /// Deleted stylesheets propagate immediately; drop any pending update
    pub fn cancel_pending_css_update(&self, file_path: &Path) -> bool {
        self.css_debouncer.cancel(file_path)
    }

    pub fn pending_updates(&self) -> usize {
        self.css_debouncer.pending_count() + self.component_debouncer.pending_count()
    }

    /// Reset all state and cancel pending timers
    pub fn clear(&self) {
        self.css_debouncer.cancel_all();
        self.component_debouncer.cancel_all();
        self.lock_in_flight().clear();

        let mut state = self.write_state();
        state.index.clear();
        state.file_cache.clear();
        state.css_file_to_components.clear();
        info!("CSS index cleared");
    }

    /// Components currently depending on `css_path`
    pub fn dependents_of(&self, css_path: &Path) -> HashSet<PathBuf> {
        self.read_state()
            .css_file_to_components
            .get(css_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn indexed_components(&self) -> Vec<PathBuf> {
        self.read_state().index.keys().cloned().collect()
    }

    /// Stylesheets imported by at least one indexed component, parsed or not
    pub fn tracked_css_files(&self) -> Vec<PathBuf> {
        self.read_state()
            .css_file_to_components
            .keys()
            .cloned()
            .collect()
    }

    pub fn is_cached(&self, css_path: &Path) -> bool {
        self.read_state().file_cache.contains(css_path)
    }

    pub fn cached_record(&self, css_path: &Path) -> Option<Arc<CssFileRecord>> {
        self.read_state().file_cache.get(css_path)
    }

    /// Check the bidirectional index/reverse-map invariant
    pub fn is_consistent(&self) -> bool {
        let state = self.read_state();

        let forward = state.index.iter().all(|(component_path, component)| {
            component.import_paths.iter().all(|css_path| {
                state
                    .css_file_to_components
                    .get(css_path)
                    .is_some_and(|set| set.contains(component_path))
            })
        });

        let backward = state
            .css_file_to_components
            .iter()
            .all(|(css_path, components)| {
                !components.is_empty()
                    && components.iter().all(|component_path| {
                        state
                            .index
                            .get(component_path)
                            .is_some_and(|c| c.import_paths.contains(css_path))
                    })
            });

        forward && backward
    }
}
