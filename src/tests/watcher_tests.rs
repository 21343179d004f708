// Watcher routing tests
//
// Events are injected through `FileWatchers::dispatch`, the same entry point
// native notifications and editor-forwarded changes use.

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::index::CssIndex;
    use crate::tests::helpers::{unique_temp_dir, write_file};
    use crate::watcher::{FileChangeEvent, FileChangeType, FileWatchers};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    const WINDOW: Duration = Duration::from_millis(50);

    async fn indexed_engine(root: &Path) -> (Arc<CssIndex>, FileWatchers) {
        let engine = Arc::new(CssIndex::new(WINDOW));
        let styles = root.join("styles.css");
        engine
            .index_component(&root.join("Card.tsx"), &[styles])
            .await;
        let watchers = FileWatchers::new(engine.clone(), &Config::default()).unwrap();
        (engine, watchers)
    }

    #[tokio::test]
    async fn test_stylesheet_modification_is_debounced() {
        let temp_dir = unique_temp_dir("watch_css_modify");
        let root = temp_dir.path();
        write_file(root, "styles.css", ".before { color: red; }\n");
        let (engine, watchers) = indexed_engine(root).await;
        let component = root.join("Card.tsx");

        let styles = write_file(root, "styles.css", ".after { color: blue; }\n");
        watchers.dispatch(FileChangeEvent::new(&styles, FileChangeType::Modified));
        watchers.dispatch(FileChangeEvent::new(&styles, FileChangeType::Modified));

        assert_eq!(engine.pending_updates(), 1);
        assert!(engine.get_class(&component, "before").is_some());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(engine.get_class(&component, "after").is_some());
        assert!(engine.is_consistent());
    }

    #[tokio::test]
    async fn test_stylesheet_deletion_is_immediate() {
        let temp_dir = unique_temp_dir("watch_css_delete");
        let root = temp_dir.path();
        let styles = write_file(root, "styles.css", ".card { color: red; }\n");
        let (engine, watchers) = indexed_engine(root).await;

        watchers.dispatch(FileChangeEvent::new(&styles, FileChangeType::Modified));
        std::fs::remove_file(&styles).unwrap();
        watchers.dispatch(FileChangeEvent::new(&styles, FileChangeType::Deleted));

        assert_eq!(engine.pending_updates(), 0);
        assert!(engine.get_component_index(&root.join("Card.tsx")).is_none());
        assert!(engine.is_consistent());
    }

    #[tokio::test]
    async fn test_component_modification_invalidates_after_window() {
        let temp_dir = unique_temp_dir("watch_component_modify");
        let root = temp_dir.path();
        write_file(root, "styles.css", ".card { color: red; }\n");
        let (engine, watchers) = indexed_engine(root).await;
        let component = write_file(root, "Card.tsx", "import './styles.css';\n");

        watchers.dispatch(FileChangeEvent::new(&component, FileChangeType::Modified));
        assert!(engine.get_component_index(&component).is_some());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(engine.get_component_index(&component).is_none());
        assert!(engine.is_consistent());
    }

    #[tokio::test]
    async fn test_component_deletion_is_immediate() {
        let temp_dir = unique_temp_dir("watch_component_delete");
        let root = temp_dir.path();
        write_file(root, "styles.css", ".card { color: red; }\n");
        let (engine, watchers) = indexed_engine(root).await;
        let component = root.join("Card.tsx");

        watchers.dispatch(FileChangeEvent::new(&component, FileChangeType::Deleted));

        assert!(engine.get_component_index(&component).is_none());
        assert!(engine.tracked_css_files().is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_and_ignored_paths_are_dropped() {
        let temp_dir = unique_temp_dir("watch_ignored");
        let root = temp_dir.path();
        write_file(root, "styles.css", ".card { color: red; }\n");
        let (engine, watchers) = indexed_engine(root).await;

        let readme = write_file(root, "README.md", "# hi\n");
        let vendored = write_file(root, "node_modules/pkg/styles.css", ".x {}\n");
        watchers.dispatch(FileChangeEvent::new(&readme, FileChangeType::Modified));
        watchers.dispatch(FileChangeEvent::new(&vendored, FileChangeType::Modified));

        assert_eq!(engine.pending_updates(), 0);
        assert!(engine.get_component_index(&root.join("Card.tsx")).is_some());
    }

    #[tokio::test]
    async fn test_dispatch_only_watchers_do_not_watch() {
        let engine = Arc::new(CssIndex::new(WINDOW));
        let mut watchers = FileWatchers::new(engine, &Config::default()).unwrap();

        assert!(!watchers.is_watching());
        assert!(watchers.workspace_root().is_none());
        watchers.dispose();
    }

    #[tokio::test]
    async fn test_setup_watches_workspace_root() {
        let temp_dir = unique_temp_dir("watch_setup");
        let engine = Arc::new(CssIndex::new(WINDOW));
        let mut watchers =
            FileWatchers::setup(engine, temp_dir.path(), &Config::default()).unwrap();

        assert!(watchers.is_watching());
        assert_eq!(watchers.workspace_root(), Some(temp_dir.path()));
        watchers.dispose();
        assert!(!watchers.is_watching());
    }
}
