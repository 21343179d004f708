//! Diagnostics: one low-severity marker per class name missing from the index

use crate::config::Severity;
use crate::index::CssIndex;
use crate::providers::context::{AttributePattern, attribute_values, class_tokens};
use crate::providers::{TextDocument, ensure_component_index};
use std::sync::Arc;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position};

pub const DIAGNOSTIC_SOURCE: &str = "stylename";

/// A class token used in the attribute but absent from the component's index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownClass {
    pub class_name: String,
    /// Byte span in the document
    pub start: usize,
    pub end: usize,
}

/// Scan every attribute value in the document for unknown classes
pub async fn unknown_classes(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
    attribute: &AttributePattern,
) -> Vec<UnknownClass> {
    let mut used = Vec::new();

    for line_no in 0..document.line_count() {
        let Some(line) = document.line(line_no) else {
            continue;
        };
        let Some(line_start) = document.offset_at(Position::new(line_no as u32, 0)) else {
            continue;
        };
        for value in attribute_values(line, attribute.regex()).into_iter().filter(|v| v.closed) {
            for (offset, token) in class_tokens(value.text(line)) {
                let start = line_start + value.start + offset;
                used.push(UnknownClass {
                    class_name: token.to_string(),
                    start,
                    end: start + token.len(),
                });
            }
        }
    }

    if used.is_empty() {
        return used;
    }

    let Some(index) = ensure_component_index(engine, document).await else {
        return Vec::new();
    };
    used.retain(|usage| !index.has_class(&usage.class_name));
    used
}

pub async fn diagnostics(
    engine: &Arc<CssIndex>,
    document: &TextDocument,
    attribute: &AttributePattern,
    severity: Severity,
) -> Vec<Diagnostic> {
    unknown_classes(engine, document, attribute)
        .await
        .into_iter()
        .map(|unknown| Diagnostic {
            range: document.range_of(unknown.start, unknown.end),
            severity: Some(lsp_severity(severity)),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: format!(
                "Class '{}' not found in imported CSS files",
                unknown.class_name
            ),
            ..Default::default()
        })
        .collect()
}

pub fn lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}
