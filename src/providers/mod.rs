//! Editor feature providers
//!
//! Stateless translators between editor queries and [`CssIndex`] lookups.
//! Each one detects the attribute context, indexes the document lazily on first
//! use, and shapes an LSP response.

pub mod completion;
pub mod context;
pub mod definition;
pub mod diagnostics;
pub mod document;
pub mod hover;
pub mod render;

use crate::extractors::css_import_paths;
use crate::index::{ComponentIndex, CssIndex};
use regex::Regex;
use std::sync::{Arc, LazyLock};

pub use completion::CompletionResolveTable;
pub use context::AttributePattern;
pub use document::TextDocument;

/// Characters a class token may contain when picking the word under the cursor
pub(crate) static CLASS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// The document's component index, built from its current imports if absent
pub async fn ensure_component_index(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
) -> Option<Arc<ComponentIndex>> {
    if let Some(index) = engine.get_component_index(document.path()) {
        return Some(index);
    }
    let imports = css_import_paths(document.text(), document.path());
    engine.ensure_indexed(document.path(), imports).await
}
