//! Class name completion inside the style attribute
//!
//! Items are cheap to build; documentation is filled in on `completionItem/resolve`.
//! Each item carries only a numeric id in `data`, which keys a typed side table
//! holding what resolution needs.

use crate::index::CssIndex;
use crate::providers::context::{AttributePattern, completion_context};
use crate::providers::document::{TextDocument, utf16_to_byte};
use crate::providers::{ensure_component_index, render};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent,
    MarkupKind, Position, Range, TextEdit,
};
use tracing::{debug, warn};

/// What `completionItem/resolve` needs to document one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResolve {
    pub component_path: PathBuf,
    pub class_name: String,
}

/// Side table from completion item id to its resolve context
///
/// Only the latest completion list is resolvable; registering a new list drops
/// the previous one.
#[derive(Debug, Default)]
pub struct CompletionResolveTable {
    next_id: AtomicU64,
    entries: StdMutex<HashMap<u64, PendingResolve>>,
}

impl CompletionResolveTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, PendingResolve>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Completion table mutex poisoned, recovering: {}", poisoned);
                poisoned.into_inner()
            }
        }
    }

    fn replace(&self, pending: Vec<PendingResolve>) -> Vec<u64> {
        let mut entries = self.lock();
        entries.clear();
        pending
            .into_iter()
            .map(|entry| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                entries.insert(id, entry);
                id
            })
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<PendingResolve> {
        self.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Completion items for the class token under the cursor
///
/// `None` when the cursor is not inside the attribute value.
pub async fn complete(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
    position: Position,
    attribute: &AttributePattern,
    table: &CompletionResolveTable,
) -> Option<Vec<CompletionItem>> {
    let line = document.line(position.line as usize)?;
    let column = utf16_to_byte(line, position.character);
    let ctx = completion_context(line, column, attribute.regex())?;

    let index = ensure_component_index(engine, document).await?;
    let line_start = document.offset_at(Position::new(position.line, 0))?;
    let range: Range = document.range_of(line_start + ctx.replace_start, line_start + ctx.replace_end);

    let candidates: Vec<String> = index
        .class_names()
        .into_iter()
        .filter(|name| !ctx.existing.iter().any(|existing| existing == name))
        .filter(|name| name.starts_with(ctx.prefix.as_str()))
        .map(str::to_string)
        .collect();

    let ids = table.replace(
        candidates
            .iter()
            .map(|class_name| PendingResolve {
                component_path: document.path().to_path_buf(),
                class_name: class_name.clone(),
            })
            .collect(),
    );

    debug!(
        "{} completion candidate(s) for prefix {:?} in {}",
        candidates.len(),
        ctx.prefix,
        document.path().display()
    );

    Some(
        candidates
            .into_iter()
            .zip(ids)
            .map(|(class_name, id)| CompletionItem {
                label: class_name.clone(),
                kind: Some(CompletionItemKind::VALUE),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(range, class_name))),
                data: Some(serde_json::Value::from(id)),
                ..Default::default()
            })
            .collect(),
    )
}

/// Fill in documentation for an item produced by [`complete`]
pub fn resolve(
    engine: &CssIndex,
    mut item: CompletionItem,
    table: &CompletionResolveTable,
) -> CompletionItem {
    let Some(pending) = item
        .data
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|id| table.get(id))
    else {
        return item;
    };

    let Some(index) = engine.get_component_index(&pending.component_path) else {
        return item;
    };
    let occurrences = index.all_occurrences(&pending.class_name);
    if occurrences.is_empty() {
        return item;
    }

    item.documentation = Some(Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value: render::render_markdown(&index, &occurrences),
    }));
    item
}
