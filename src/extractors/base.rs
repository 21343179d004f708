// Base types shared by the CSS class extractor and the import extractor
//
// Everything here is produced fresh on every parse and never mutated afterwards:
// a changed file yields an entirely new set of definitions.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static CLASS_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_-][A-Za-z0-9_-]*$").unwrap());

/// Check a class identifier against `[A-Za-z_-][A-Za-z0-9_-]*`
pub fn is_valid_class_name(name: &str) -> bool {
    CLASS_NAME_RE.is_match(name)
}

/// Declarations of one rule block in source order
///
/// A property declared twice in the same block keeps its first position and the
/// last value written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties(Vec<(String, String)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One occurrence of a class selector in a CSS source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    name: String,
    /// Absolute path of the stylesheet; empty until stamped by `parse_css_content`
    pub source_file: PathBuf,
    /// 1-based line of the selector
    pub line_number: usize,
    pub properties: Properties,
    /// Selector through closing brace, verbatim
    pub full_definition: String,
    /// Byte offset of the `.name` token within the stylesheet
    #[serde(default)]
    pub offset: usize,
}

impl ClassDefinition {
    pub fn new(
        name: impl Into<String>,
        source_file: impl Into<PathBuf>,
        line_number: usize,
        properties: Properties,
        full_definition: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if !is_valid_class_name(&name) {
            return Err(ValidationError::InvalidClassName(name));
        }
        if line_number < 1 {
            return Err(ValidationError::InvalidLineNumber(line_number));
        }

        Ok(Self {
            name,
            source_file: source_file.into(),
            line_number,
            properties,
            full_definition: full_definition.into(),
            offset: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    /// Same definition attributed to `source_file`
    pub fn with_source_file(self, source_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            ..self
        }
    }
}

/// One CSS import found in a component file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub import_path: String,
    pub resolved_path: PathBuf,
    pub component_path: PathBuf,
    pub line_number: usize,
}

impl ImportStatement {
    pub fn new(
        import_path: impl Into<String>,
        resolved_path: impl Into<PathBuf>,
        component_path: impl Into<PathBuf>,
        line_number: usize,
    ) -> Result<Self, ValidationError> {
        let import_path = import_path.into();
        let resolved_path = resolved_path.into();
        let component_path = component_path.into();

        if !is_same_directory_import(&import_path) {
            return Err(ValidationError::InvalidImportPath(import_path));
        }
        for path in [&resolved_path, &component_path] {
            if !path.is_absolute() {
                return Err(ValidationError::NotAbsolute(path.clone()));
            }
        }
        if line_number < 1 {
            return Err(ValidationError::InvalidLineNumber(line_number));
        }

        Ok(Self {
            import_path,
            resolved_path,
            component_path,
            line_number,
        })
    }
}

/// `./name.css` shape: no parent traversal, no alias prefixes
pub fn is_same_directory_import(import_path: &str) -> bool {
    import_path.starts_with("./")
        && !import_path.contains("../")
        && !import_path.starts_with("@/")
        && !import_path.starts_with('~')
}

/// Lexical normalization (`.`/`..` folding) without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_validation() {
        assert!(is_valid_class_name("container"));
        assert!(is_valid_class_name("-webkit-thing"));
        assert!(is_valid_class_name("_private"));
        assert!(is_valid_class_name("btn--primary_2"));
        assert!(!is_valid_class_name("2col"));
        assert!(!is_valid_class_name(""));
        assert!(!is_valid_class_name("a.b"));
    }

    #[test]
    fn test_class_definition_rejects_bad_input() {
        let err = ClassDefinition::new("9lives", "", 1, Properties::new(), "").unwrap_err();
        assert_eq!(err, ValidationError::InvalidClassName("9lives".to_string()));

        let err = ClassDefinition::new("ok", "", 0, Properties::new(), "").unwrap_err();
        assert_eq!(err, ValidationError::InvalidLineNumber(0));
    }

    #[test]
    fn test_properties_last_write_wins_in_first_position() {
        let mut props = Properties::new();
        props.insert("color", "red");
        props.insert("margin", "0");
        props.insert("color", "blue");

        assert_eq!(props.get("color"), Some("blue"));
        let names: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["color", "margin"]);
    }

    #[test]
    fn test_import_statement_validation() {
        let ok = ImportStatement::new("./a.css", "/p/a.css", "/p/A.tsx", 3);
        assert!(ok.is_ok());

        assert!(matches!(
            ImportStatement::new("../a.css", "/a.css", "/p/A.tsx", 1),
            Err(ValidationError::InvalidImportPath(_))
        ));
        assert!(matches!(
            ImportStatement::new("./a.css", "a.css", "/p/A.tsx", 1),
            Err(ValidationError::NotAbsolute(_))
        ));
        assert!(matches!(
            ImportStatement::new("./a.css", "/p/a.css", "/p/A.tsx", 0),
            Err(ValidationError::InvalidLineNumber(0))
        ));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d.css")),
            PathBuf::from("/a/b/d.css")
        );
    }
}
