// Provider tests
//
// A component document that imports one stylesheet from its own directory,
// queried the way the server does. The engine starts empty in every test; the
// first query indexes the document.

#[cfg(test)]
mod tests {
    use crate::config::Severity;
    use crate::index::CssIndex;
    use crate::providers::diagnostics::{DIAGNOSTIC_SOURCE, diagnostics, unknown_classes};
    use crate::providers::{
        AttributePattern, CompletionResolveTable, TextDocument, completion, definition, hover,
    };
    use crate::tests::helpers::{unique_temp_dir, write_file};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower_lsp::lsp_types::{
        CompletionTextEdit, DiagnosticSeverity, Documentation, HoverContents, Position, Url,
    };

    const STYLES_CSS: &str = r#".container {
  display: flex;
  padding: 1rem;
}
.header { font-size: 2rem; }
.headline { font-weight: bold; }
@media (max-width: 600px) {
  .header { font-size: 1rem; }
}
"#;

    const CARD_TSX: &str = r#"import React from 'react';
import './styles.css';

export const Card = () => (
  <div styleName="container header">
    <h1 styleName="headline missing">Title</h1>
  </div>
);
"#;

    struct Fixture {
        _temp_dir: TempDir,
        engine: Arc<CssIndex>,
        document: TextDocument,
    }

    fn fixture(name: &str, source: &str) -> Fixture {
        let temp_dir = unique_temp_dir(name);
        write_file(temp_dir.path(), "styles.css", STYLES_CSS);
        let component = write_file(temp_dir.path(), "Card.tsx", source);
        Fixture {
            engine: Arc::new(CssIndex::default()),
            document: TextDocument::new(component, source, 1),
            _temp_dir: temp_dir,
        }
    }

    /// Position just after the first occurrence of `needle`
    fn after(document: &TextDocument, needle: &str) -> Position {
        let offset = document.text().find(needle).unwrap() + needle.len();
        document.position_at(offset)
    }

    /// Position on the first character of `needle`
    fn on(document: &TextDocument, needle: &str) -> Position {
        document.position_at(document.text().find(needle).unwrap())
    }

    fn style_name() -> AttributePattern {
        AttributePattern::new("styleName")
    }

    fn styles_path(fixture: &Fixture) -> PathBuf {
        fixture.document.path().with_file_name("styles.css")
    }

    #[tokio::test]
    async fn test_completion_filters_prefix_and_existing() {
        let source = CARD_TSX.replace(r#"styleName="container header""#, r#"styleName="container hea""#);
        let fx = fixture("provider_completion", &source);
        let table = CompletionResolveTable::new();

        let position = after(&fx.document, "container hea");
        let items = completion::complete(&fx.engine, &fx.document, position, &style_name(), &table)
            .await
            .unwrap();

        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["header", "headline"]);
        assert_eq!(table.len(), 2);

        let Some(CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
            panic!("expected a plain text edit");
        };
        assert_eq!(edit.new_text, "header");
        assert_eq!(edit.range.end, position);
        assert_eq!(edit.range.start.character, position.character - 3);
        assert!(items[0].documentation.is_none());
    }

    #[tokio::test]
    async fn test_completion_excludes_classes_already_in_value() {
        let fx = fixture("provider_completion_existing", CARD_TSX);
        let table = CompletionResolveTable::new();

        // Cursor right after the opening quote of the first attribute
        let position = after(&fx.document, r#"<div styleName=""#);
        let items = completion::complete(&fx.engine, &fx.document, position, &style_name(), &table)
            .await
            .unwrap();

        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["container", "headline"]);
    }

    #[tokio::test]
    async fn test_completion_outside_attribute_is_none() {
        let fx = fixture("provider_completion_outside", CARD_TSX);
        let table = CompletionResolveTable::new();

        let position = after(&fx.document, "export const");
        let items =
            completion::complete(&fx.engine, &fx.document, position, &style_name(), &table).await;

        assert!(items.is_none());
        assert!(fx.engine.get_component_index(fx.document.path()).is_none());
    }

    #[tokio::test]
    async fn test_resolve_fills_documentation() {
        let source = CARD_TSX.replace(r#"styleName="container header""#, r#"styleName="con""#);
        let fx = fixture("provider_resolve", &source);
        let table = CompletionResolveTable::new();

        let position = after(&fx.document, "styleName=\"con");
        let mut items = completion::complete(&fx.engine, &fx.document, position, &style_name(), &table)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);

        let resolved = completion::resolve(&fx.engine, items.remove(0), &table);
        let Some(Documentation::MarkupContent(markup)) = resolved.documentation else {
            panic!("expected markdown documentation");
        };
        assert!(markup.value.starts_with("```css\n.container {"));
        assert!(markup.value.contains("padding: 1rem;"));
    }

    #[tokio::test]
    async fn test_resolve_of_superseded_list_is_unchanged() {
        let fx = fixture("provider_resolve_stale", CARD_TSX);
        let table = CompletionResolveTable::new();
        let position = after(&fx.document, r#"<div styleName=""#);

        let first = completion::complete(&fx.engine, &fx.document, position, &style_name(), &table)
            .await
            .unwrap();
        let _second = completion::complete(&fx.engine, &fx.document, position, &style_name(), &table)
            .await
            .unwrap();

        let resolved = completion::resolve(&fx.engine, first[0].clone(), &table);
        assert!(resolved.documentation.is_none());
    }

    #[tokio::test]
    async fn test_hover_renders_base_then_media_variant() {
        let fx = fixture("provider_hover", CARD_TSX);

        let position = on(&fx.document, "header\"");
        let hover = hover::hover(&fx.engine, &fx.document, position, &style_name())
            .await
            .unwrap();

        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markdown hover");
        };
        assert_eq!(
            markup.value,
            "```css\n.header { font-size: 2rem; }\n```\n\n```css\n@media (max-width: 600px) {\n  .header { font-size: 1rem; }\n}\n```"
        );

        let range = hover.range.unwrap();
        assert_eq!(range.start, position);
        assert_eq!(range.end.character, position.character + "header".len() as u32);
    }

    #[tokio::test]
    async fn test_hover_on_unknown_class_is_none() {
        let fx = fixture("provider_hover_unknown", CARD_TSX);

        let position = on(&fx.document, "missing");
        assert!(
            hover::hover(&fx.engine, &fx.document, position, &style_name())
                .await
                .is_none()
        );
        // The query still indexed the document
        assert!(fx.engine.get_component_index(fx.document.path()).is_some());
    }

    #[tokio::test]
    async fn test_definition_points_at_first_occurrence() {
        let fx = fixture("provider_definition", CARD_TSX);

        let position = on(&fx.document, "header\"");
        let location = definition::definition(&fx.engine, &fx.document, position, &style_name())
            .await
            .unwrap();

        assert_eq!(location.uri, Url::from_file_path(styles_path(&fx)).unwrap());
        assert_eq!(location.range.start, Position::new(4, 0));
    }

    #[tokio::test]
    async fn test_definition_column_for_indented_selector() {
        let css = "@media print {\n  .printable { display: block; }\n}\n";
        let temp_dir = unique_temp_dir("provider_definition_indent");
        let root = temp_dir.path();
        write_file(root, "print.css", css);
        let source = "import './print.css';\nconst x = <p styleName=\"printable\" />;\n";
        let component = write_file(root, "Print.jsx", source);
        let engine = Arc::new(CssIndex::default());
        let document = TextDocument::new(&component, source, 1);

        let position = on(&document, "printable");
        let location = definition::definition(&engine, &document, position, &style_name())
            .await
            .unwrap();

        assert_eq!(location.range.start, Position::new(1, 2));
    }

    #[tokio::test]
    async fn test_definition_column_in_minified_stylesheet() {
        let css = ".ab{color:red}.a{color:blue}@media print{.a{color:black}}";
        let temp_dir = unique_temp_dir("provider_definition_minified");
        let root = temp_dir.path();
        write_file(root, "min.css", css);
        let source = "import './min.css';\nconst x = <p styleName=\"a\" />;\n";
        let component = write_file(root, "Min.jsx", source);
        let engine = Arc::new(CssIndex::default());
        let document = TextDocument::new(&component, source, 1);

        let position = on(&document, "a\"");
        let location = definition::definition(&engine, &document, position, &style_name())
            .await
            .unwrap();

        assert_eq!(location.range.start, Position::new(0, 14));
    }

    #[tokio::test]
    async fn test_one_attribute_pattern_serves_every_provider() {
        let fx = fixture("provider_shared_pattern", CARD_TSX);
        let attribute = style_name();
        let position = on(&fx.document, "header\"");

        assert!(hover::hover(&fx.engine, &fx.document, position, &attribute).await.is_some());
        assert!(
            definition::definition(&fx.engine, &fx.document, position, &attribute)
                .await
                .is_some()
        );
        let found = diagnostics(&fx.engine, &fx.document, &attribute, Severity::Hint).await;
        assert_eq!(found.len(), 1);
        assert_eq!(attribute.name(), "styleName");
    }

    #[tokio::test]
    async fn test_diagnostics_flag_unknown_classes_only() {
        let fx = fixture("provider_diagnostics", CARD_TSX);

        let found = diagnostics(&fx.engine, &fx.document, &style_name(), Severity::Information).await;

        assert_eq!(found.len(), 1);
        let diagnostic = &found[0];
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::INFORMATION));
        assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
        assert_eq!(
            diagnostic.message,
            "Class 'missing' not found in imported CSS files"
        );
        assert_eq!(diagnostic.range.start, on(&fx.document, "missing"));
        assert_eq!(diagnostic.range.end, after(&fx.document, "missing"));
    }

    #[tokio::test]
    async fn test_diagnostics_skip_documents_without_attribute() {
        let source = "import './styles.css';\nexport const x = 1;\n";
        let fx = fixture("provider_diagnostics_none", source);

        let found = unknown_classes(&fx.engine, &fx.document, &style_name()).await;

        assert!(found.is_empty());
        assert!(fx.engine.get_component_index(fx.document.path()).is_none());
    }

    #[tokio::test]
    async fn test_custom_attribute_name() {
        let source = "import './styles.css';\nconst x = <div cssClass=\"nope container\" />;\n";
        let fx = fixture("provider_custom_attribute", source);

        let found = unknown_classes(&fx.engine, &fx.document, &AttributePattern::new("cssClass")).await;
        let names: Vec<_> = found.iter().map(|u| u.class_name.as_str()).collect();
        assert_eq!(names, vec!["nope"]);

        assert!(unknown_classes(&fx.engine, &fx.document, &style_name()).await.is_empty());
    }
}
