//! Markdown rendering of class occurrences for hover and completion docs
//!
//! Occurrences are grouped per class, base definitions first, media-query
//! variants after (each wrapped in its `@media` block). Every occurrence is one
//! fenced `css` block; no file paths or labels.

use crate::extractors::ClassDefinition;
use crate::index::ComponentIndex;

/// An occurrence paired with its enclosing media query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOccurrence {
    pub media_query: Option<String>,
    pub css: String,
}

/// Base definitions before media-query variants, source order otherwise
pub fn order_occurrences(
    index: &ComponentIndex,
    occurrences: &[ClassDefinition],
) -> Vec<RenderedOccurrence> {
    let mut rendered: Vec<RenderedOccurrence> = occurrences
        .iter()
        .map(|definition| {
            let media_query = index.media_query_for(definition);
            let css = match &media_query {
                Some(query) => wrap_in_media(query, &definition.full_definition),
                None => definition.full_definition.trim().to_string(),
            };
            RenderedOccurrence { media_query, css }
        })
        .collect();

    rendered.sort_by_key(|occurrence| occurrence.media_query.is_some());
    rendered
}

pub fn render_markdown(index: &ComponentIndex, occurrences: &[ClassDefinition]) -> String {
    order_occurrences(index, occurrences)
        .iter()
        .map(|occurrence| format!("```css\n{}\n```", occurrence.css))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn wrap_in_media(query: &str, block: &str) -> String {
    let body = block
        .trim()
        .lines()
        .map(|line| format!("  {}", line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{} {{\n{}\n}}", query, body)
}
