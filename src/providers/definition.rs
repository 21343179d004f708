//! Go-to-definition: first occurrence of the class under the cursor

use crate::index::CssIndex;
use crate::providers::context::AttributePattern;
use crate::providers::hover::class_at;
use crate::providers::{TextDocument, ensure_component_index};
use std::sync::Arc;
use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::warn;

pub async fn definition(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
    position: Position,
    attribute: &AttributePattern,
) -> Option<Location> {
    let (class_name, _) = class_at(document, position, attribute)?;
    let index = ensure_component_index(engine, document).await?;
    let definition = index.get_class(&class_name)?;

    let uri = match Url::from_file_path(&definition.source_file) {
        Ok(uri) => uri,
        Err(()) => {
            warn!(
                "Cannot build a URI for {}",
                definition.source_file.display()
            );
            return None;
        }
    };

    let line = (definition.line_number - 1) as u32;
    let character = index
        .css_file(&definition.source_file)
        .map(|record| record.column_of(definition))
        .unwrap_or(0);

    Some(Location::new(
        uri,
        Range::new(Position::new(line, character), Position::new(line, character)),
    ))
}
