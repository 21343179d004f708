//! Per-component aggregation of imported stylesheets

use crate::extractors::{ClassDefinition, CssFileRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Queryable view of every class available to one component
///
/// Built once per `index_component` call and replaced, never mutated.
/// `all_classes` is derived from `css_files` at construction.
#[derive(Debug, Clone)]
pub struct ComponentIndex {
    pub component_path: PathBuf,
    /// Stylesheets the component asked for, in import order, including any that
    /// failed to parse
    pub import_paths: Vec<PathBuf>,
    /// Successfully parsed stylesheets, in import order
    css_files: Vec<Arc<CssFileRecord>>,
    all_classes: HashMap<String, ClassDefinition>,
}

impl ComponentIndex {
    pub fn new(
        component_path: PathBuf,
        import_paths: Vec<PathBuf>,
        css_files: Vec<Arc<CssFileRecord>>,
    ) -> Self {
        let mut all_classes = HashMap::new();
        for record in &css_files {
            for (name, definition) in &record.classes {
                // First file in import order wins
                all_classes
                    .entry(name.clone())
                    .or_insert_with(|| definition.clone());
            }
        }

        Self {
            component_path,
            import_paths,
            css_files,
            all_classes,
        }
    }

    pub fn get_class(&self, class_name: &str) -> Option<&ClassDefinition> {
        self.all_classes.get(class_name)
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.all_classes.contains_key(class_name)
    }

    /// Every occurrence across all stylesheets: files in import order, source
    /// order within each file
    pub fn all_occurrences(&self, class_name: &str) -> Vec<ClassDefinition> {
        self.css_files
            .iter()
            .flat_map(|record| record.occurrences(class_name).iter().cloned())
            .collect()
    }

    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.all_classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn css_files(&self) -> &[Arc<CssFileRecord>] {
        &self.css_files
    }

    pub fn css_file(&self, path: &Path) -> Option<&CssFileRecord> {
        self.css_files
            .iter()
            .find(|record| record.file_path == path)
            .map(Arc::as_ref)
    }

    /// Enclosing `@media` prelude of an occurrence, if it comes from one of this
    /// component's stylesheets and sits inside a media block
    pub fn media_query_for(&self, definition: &ClassDefinition) -> Option<String> {
        self.css_file(&definition.source_file)?
            .media_query_for(definition)
    }

    pub fn len(&self) -> usize {
        self.all_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_classes.is_empty()
    }
}
