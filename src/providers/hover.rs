//! Hover: every definition of the class under the cursor as CSS blocks

use crate::index::CssIndex;
use crate::providers::context::{AttributePattern, attribute_value_at};
use crate::providers::document::{TextDocument, utf16_to_byte};
use crate::providers::{CLASS_TOKEN_RE, ensure_component_index, render};
use std::sync::Arc;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Class name under the cursor inside the attribute value, with its byte span
pub fn class_at(
    document: &TextDocument,
    position: Position,
    attribute: &AttributePattern,
) -> Option<(String, (usize, usize))> {
    let line = document.line(position.line as usize)?;
    let column = utf16_to_byte(line, position.character);
    attribute_value_at(line, column, attribute.regex())?;

    let (start, end) = document.word_range_at(position, &CLASS_TOKEN_RE)?;
    Some((document.text()[start..end].to_string(), (start, end)))
}

pub async fn hover(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
    position: Position,
    attribute: &AttributePattern,
) -> Option<Hover> {
    let (class_name, (start, end)) = class_at(document, position, attribute)?;
    let index = ensure_component_index(engine, document).await?;

    let occurrences = index.all_occurrences(&class_name);
    if occurrences.is_empty() {
        return None;
    }

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: render::render_markdown(&index, &occurrences),
        }),
        range: Some(document.range_of(start, end)),
    })
}
