use crate::config::Config;
use crate::index::CssIndex;
use crate::providers::{AttributePattern, TextDocument};
use crate::providers::diagnostics::unknown_classes;
use crate::watcher::filtering::build_ignore_patterns;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One unknown class usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub file: PathBuf,
    /// 1-based
    pub line: u32,
    /// 1-based, UTF-16 units
    pub column: u32,
    pub class_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub files_checked: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Component files under `paths` (files are taken as given, directories walked)
pub fn collect_component_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let ignore_patterns = build_ignore_patterns(&config.ignore_patterns)?;
    let is_component = |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.is_component_extension(ext))
    };
    let is_ignored = |path: &Path| {
        let path_str = path.to_string_lossy();
        ignore_patterns.iter().any(|p| p.matches(&path_str))
    };

    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file() && is_component(path) && !is_ignored(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Index every component under `paths` and report classes missing from its imports
pub async fn run_check(paths: &[PathBuf], config: &Config) -> Result<CheckReport> {
    let engine = Arc::new(CssIndex::new(config.debounce()));
    let attribute = AttributePattern::new(&config.attribute_name);
    let mut report = CheckReport::default();

    for file in collect_component_files(paths, config)? {
        let path = std::path::absolute(&file)
            .with_context(|| format!("Failed to resolve {}", file.display()))?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let document = TextDocument::new(&path, text, 0);
        let unknown = unknown_classes(&engine, &document, &attribute).await;
        debug!("{}: {} unknown class(es)", path.display(), unknown.len());

        report.files_checked += 1;
        report
            .findings
            .extend(unknown.into_iter().map(|usage| {
                let position = document.position_at(usage.start);
                Finding {
                    file: path.clone(),
                    line: position.line + 1,
                    column: position.character + 1,
                    class_name: usage.class_name,
                }
            }));
    }

    engine.clear();
    Ok(report)
}
