//! Configuration
//!
//! Defaults, overridden by `.stylename.toml` at the workspace root, overridden
//! by the editor's `initializationOptions`. Every field is optional in both
//! sources.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = ".stylename.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// JSX attribute whose value holds class names
    pub attribute_name: String,

    /// Extensions of files that import stylesheets and use the attribute
    pub component_extensions: Vec<String>,

    pub css_extensions: Vec<String>,

    /// Trailing debounce for file-system change bursts
    pub debounce_ms: u64,

    /// Glob patterns the watcher ignores
    pub ignore_patterns: Vec<String>,

    /// Report unknown class names
    pub diagnostics: bool,

    pub diagnostic_severity: Severity,

    /// Watch the workspace with native file-system notifications
    pub watch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attribute_name: "styleName".to_string(),
            component_extensions: ["js", "jsx", "ts", "tsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            css_extensions: vec!["css".to_string()],
            debounce_ms: 2000,
            ignore_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/build/**".to_string(),
                "**/dist/**".to_string(),
                "**/.git/**".to_string(),
                "**/coverage/**".to_string(),
            ],
            diagnostics: true,
            diagnostic_severity: Severity::Information,
            watch: true,
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_component_extension(&self, ext: &str) -> bool {
        self.component_extensions.iter().any(|e| e == ext)
    }

    /// Defaults overlaid with `<root>/.stylename.toml` when present
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let path = workspace_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!("No {} in {}", CONFIG_FILE_NAME, workspace_root.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Overlay the fields present in an LSP `initializationOptions` object
    pub fn merge_json(&self, options: &serde_json::Value) -> Result<Self> {
        let mut merged = serde_json::to_value(self).context("Failed to serialize config")?;
        if let (Some(base), Some(overrides)) = (merged.as_object_mut(), options.as_object()) {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged).context("Invalid initializationOptions")
    }
}
