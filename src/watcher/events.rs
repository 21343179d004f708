//! File system event processing pipeline
//!
//! Converts notify::Event instances into FileChangeEvent entries. Renames are
//! treated as a delete of the old path and a create of the new one.

use crate::watcher::types::{FileChangeEvent, FileChangeType};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tracing::debug;

pub fn convert_event(event: Event) -> Vec<FileChangeEvent> {
    let change_type = match event.kind {
        EventKind::Create(_) => FileChangeType::Created,
        EventKind::Remove(_) => FileChangeType::Deleted,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => FileChangeType::Deleted,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FileChangeType::Created,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = event.paths.into_iter();
            return match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => vec![
                    FileChangeEvent::new(from, FileChangeType::Deleted),
                    FileChangeEvent::new(to, FileChangeType::Created),
                ],
                _ => Vec::new(),
            };
        }
        EventKind::Modify(_) => FileChangeType::Modified,
        _ => {
            debug!("Ignoring event kind: {:?}", event.kind);
            return Vec::new();
        }
    };

    event
        .paths
        .into_iter()
        .map(|path| FileChangeEvent::new(path, change_type))
        .collect()
}
