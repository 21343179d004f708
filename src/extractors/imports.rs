// Import Extractor
//
// Finds stylesheet imports in component source:
//   import './styles.css';
//   import styles from './styles.css';
//   import * as styles from './styles.css';
// Only same-directory imports resolve. Parent traversal, `@/` and `~` aliases are
// skipped without error, and so is any import whose target is missing on disk.

use crate::extractors::base::{ImportStatement, is_same_directory_import, normalize_path};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static CSS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"import\s+(?:(?:\*\s+as\s+[A-Za-z_$][\w$]*|[A-Za-z_$][\w$]*)\s+from\s+)?['"]([^'"\n]+\.css)['"]"#,
    )
    .unwrap()
});

/// Extract every resolvable CSS import from component source
pub fn extract_import_paths(content: &str, component_file_path: &Path) -> Vec<ImportStatement> {
    let mut imports = Vec::new();

    for captures in CSS_IMPORT_RE.captures_iter(content) {
        let (Some(whole), Some(path_match)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let import_path = path_match.as_str();

        if import_path.contains("../") || import_path.starts_with("@/") || import_path.starts_with('~')
        {
            debug!(
                "Skipping unsupported import {:?} in {}",
                import_path,
                component_file_path.display()
            );
            continue;
        }

        let line_number = content[..whole.start()].matches('\n').count() + 1;

        let Some(resolved) = resolve_import_path(import_path, component_file_path) else {
            warn!(
                "Could not resolve CSS import {:?} at {}:{}",
                import_path,
                component_file_path.display(),
                line_number
            );
            continue;
        };

        match ImportStatement::new(import_path, resolved, component_file_path, line_number) {
            Ok(statement) => imports.push(statement),
            Err(e) => warn!(
                "Invalid CSS import at {}:{}: {}",
                component_file_path.display(),
                line_number,
                e
            ),
        }
    }

    imports
}

/// Resolved stylesheet paths in import order, duplicates dropped
pub fn css_import_paths(content: &str, component_file_path: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for statement in extract_import_paths(content, component_file_path) {
        if !paths.contains(&statement.resolved_path) {
            paths.push(statement.resolved_path);
        }
    }
    paths
}

/// Resolve `./name.css` against the component's directory
///
/// Returns `None` for any other shape, or when the target does not exist.
pub fn resolve_import_path(import_path: &str, component_path: &Path) -> Option<PathBuf> {
    if !is_same_directory_import(import_path) {
        return None;
    }

    let relative = import_path.strip_prefix("./")?;
    let directory = component_path.parent()?;
    let resolved = normalize_path(&directory.join(relative));

    resolved.is_file().then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_same_directory_shapes_without_touching_disk() {
        let component = Path::new("/a/b/Component.tsx");
        assert_eq!(resolve_import_path("../x.css", component), None);
        assert_eq!(resolve_import_path("@/x.css", component), None);
        assert_eq!(resolve_import_path("~x.css", component), None);
        assert_eq!(resolve_import_path("x.css", component), None);
        assert_eq!(resolve_import_path("./nested/../x.css", component), None);
    }

    #[test]
    fn test_missing_target_does_not_resolve() {
        let component = Path::new("/definitely/not/here/Component.tsx");
        assert_eq!(resolve_import_path("./x.css", component), None);
    }
}
