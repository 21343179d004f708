//! File filtering logic for watcher operations
//!
//! Decides whether a changed path is a stylesheet, a component, or noise, based
//! on configured extensions and ignore patterns.

use crate::config::Config;
use crate::watcher::types::{FileChangeType, WatchedFileKind};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct WatchFilter {
    css_extensions: Vec<String>,
    component_extensions: Vec<String>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl WatchFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            css_extensions: config.css_extensions.clone(),
            component_extensions: config.component_extensions.clone(),
            ignore_patterns: build_ignore_patterns(&config.ignore_patterns)?,
        })
    }

    /// Classify a changed path, or `None` when it should be ignored
    ///
    /// Deleted paths no longer exist, so only created/modified paths must be
    /// regular files.
    pub fn classify(&self, path: &Path, change: FileChangeType) -> Option<WatchedFileKind> {
        if change != FileChangeType::Deleted && !path.is_file() {
            return None;
        }

        let ext = path.extension().and_then(|s| s.to_str())?;
        let kind = if self.css_extensions.iter().any(|e| e == ext) {
            WatchedFileKind::Stylesheet
        } else if self.component_extensions.iter().any(|e| e == ext) {
            WatchedFileKind::Component
        } else {
            return None;
        };

        let path_str = path.to_string_lossy();
        if self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str))
        {
            return None;
        }

        Some(kind)
    }

    /// Glob patterns (relative to `root`) handed to editors that watch on our behalf
    pub fn watch_globs(&self) -> Vec<String> {
        self.css_extensions
            .iter()
            .chain(self.component_extensions.iter())
            .map(|ext| format!("**/*.{}", ext))
            .collect()
    }
}

/// Compile ignore patterns for files/directories to skip
pub fn build_ignore_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| anyhow::anyhow!("Invalid glob pattern {}: {}", p, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_patterns() {
        let patterns = build_ignore_patterns(&Config::default().ignore_patterns).unwrap();
        assert!(!patterns.is_empty());

        let node_modules_pattern = patterns
            .iter()
            .find(|p| p.as_str().contains("node_modules"))
            .expect("Should have node_modules pattern");

        assert!(node_modules_pattern.matches("/w/node_modules/lib/styles.css"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(build_ignore_patterns(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_classify_deleted_paths_by_extension() {
        let filter = WatchFilter::from_config(&Config::default()).unwrap();
        let deleted = FileChangeType::Deleted;

        assert_eq!(
            filter.classify(Path::new("/w/src/styles.css"), deleted),
            Some(WatchedFileKind::Stylesheet)
        );
        assert_eq!(
            filter.classify(Path::new("/w/src/Button.tsx"), deleted),
            Some(WatchedFileKind::Component)
        );
        assert_eq!(filter.classify(Path::new("/w/src/readme.md"), deleted), None);
        assert_eq!(
            filter.classify(Path::new("/w/node_modules/x/index.css"), deleted),
            None
        );
    }

    #[test]
    fn test_classify_requires_existing_file_for_changes() {
        let filter = WatchFilter::from_config(&Config::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let css = dir.path().join("a.css");
        std::fs::write(&css, ".a {}").unwrap();

        assert_eq!(
            filter.classify(&css, FileChangeType::Modified),
            Some(WatchedFileKind::Stylesheet)
        );
        assert_eq!(
            filter.classify(&dir.path().join("gone.css"), FileChangeType::Modified),
            None
        );
    }
}
