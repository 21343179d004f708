// Stylesheet and import extractors
//
// Regex-driven extractors that turn CSS source into class definitions and
// component source into resolved stylesheet imports. Both are pure functions of
// their input (plus existence checks on disk for import resolution).

pub mod base;
pub mod css; // Class selectors, declaration blocks, media-query context
pub mod imports; // `import ... './x.css'` statements

pub use base::{ClassDefinition, ImportStatement, Properties};
pub use css::{CssFileRecord, ExtractedClasses, extract_classes, parse_css_content, parse_css_file};
pub use imports::{css_import_paths, extract_import_paths, resolve_import_path};
