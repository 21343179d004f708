// CSS Class Extractor
//
// Pattern-based extraction of class selectors and their declaration blocks.
// Not a CSS grammar. Each comma-separated selector defines the first class of
// its subject (last) compound: `.card .title` defines `title`, `.a.b` defines
// only `a`. Subjects carrying a pseudo-class or pseudo-element (`.btn:hover`)
// are state variants and define nothing. A block that never closes runs to end
// of content.

use crate::error::{CssParseError, Result};
use crate::extractors::base::{ClassDefinition, Properties};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::{debug, trace};

/// A rule prelude (selector list or at-rule) and the brace opening its block
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^{};]*\{").unwrap());

static CLASS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.([A-Za-z_-][A-Za-z0-9_-]*)").unwrap());

static MEDIA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@media\b([^{};]*)\{").unwrap());

/// Result of scanning one stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedClasses {
    /// First occurrence of each class name
    pub classes: HashMap<String, ClassDefinition>,
    /// Every occurrence of each class name in source order
    pub all_occurrences: HashMap<String, Vec<ClassDefinition>>,
}

/// One imported stylesheet's parse result
#[derive(Debug, Clone)]
pub struct CssFileRecord {
    pub file_path: PathBuf,
    pub last_modified: SystemTime,
    pub classes: HashMap<String, ClassDefinition>,
    pub all_class_occurrences: HashMap<String, Vec<ClassDefinition>>,
    pub raw_content: String,
}

impl CssFileRecord {
    /// Enclosing `@media` prelude of an occurrence from this file, if any
    pub fn media_query_for(&self, definition: &ClassDefinition) -> Option<String> {
        media_query_at(&strip_comments(&self.raw_content), definition.offset)
    }

    /// UTF-16 column of an occurrence's `.name` token on its line
    pub fn column_of(&self, definition: &ClassDefinition) -> u32 {
        let offset = definition.offset.min(self.raw_content.len());
        let line_start = self.raw_content[..offset]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        self.raw_content
            .get(line_start..offset)
            .map(|text| text.encode_utf16().count() as u32)
            .unwrap_or(0)
    }

    /// All occurrences of `class_name`, source order
    pub fn occurrences(&self, class_name: &str) -> &[ClassDefinition] {
        self.all_class_occurrences
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Extract every class selector occurrence from CSS source
pub fn extract_classes(css_content: &str) -> ExtractedClasses {
    let stripped = strip_comments(css_content);
    let line_starts = line_starts(&stripped);
    let mut extracted = ExtractedClasses::default();

    for rule in RULE_RE.find_iter(&stripped) {
        let open_brace = rule.end() - 1;
        let prelude = &stripped[rule.start()..open_brace];
        let selector = prelude.trim_start();
        if selector.starts_with('@') {
            continue;
        }
        let defined = selector_classes(prelude);
        if defined.is_empty() {
            continue;
        }

        let selector_start = rule.start() + (prelude.len() - selector.len());
        let close_brace = find_matching_brace(&stripped, open_brace);
        let end = close_brace.map(|idx| idx + 1).unwrap_or(stripped.len());
        let body_end = close_brace.unwrap_or(stripped.len());
        let properties = parse_declarations(&stripped[open_brace + 1..body_end]);
        let full_definition = css_content
            .get(selector_start..end)
            .unwrap_or(&stripped[selector_start..end]);

        for (relative, name) in defined {
            let offset = rule.start() + relative;
            let line_number = line_of(&line_starts, offset);
            let definition = match ClassDefinition::new(
                name,
                PathBuf::new(),
                line_number,
                properties.clone(),
                full_definition,
            ) {
                Ok(definition) => definition.with_offset(offset),
                Err(e) => {
                    debug!("Skipping class selector at line {}: {}", line_number, e);
                    continue;
                }
            };

            trace!("Found .{} at line {}", definition.name(), line_number);
            extracted
                .classes
                .entry(definition.name().to_string())
                .or_insert_with(|| definition.clone());
            extracted
                .all_occurrences
                .entry(definition.name().to_string())
                .or_default()
                .push(definition);
        }
    }

    extracted
}

/// Classes a selector list defines, with their byte offsets in `prelude`
///
/// One per comma-separated selector, duplicates within the list dropped.
fn selector_classes(prelude: &str) -> Vec<(usize, &str)> {
    let mut found: Vec<(usize, &str)> = Vec::new();
    for (start, selector) in split_top_level(prelude, b',') {
        let Some((offset, name)) = subject_class(selector) else {
            continue;
        };
        if found.iter().all(|(_, seen)| *seen != name) {
            found.push((start + offset, name));
        }
    }
    found
}

/// Pieces of `text` between `separator` bytes outside parentheses and brackets
fn split_top_level(text: &str, separator: u8) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, byte) in text.bytes().enumerate() {
        match byte {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                pieces.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push((start, &text[start..]));
    pieces
}

/// First class token of the selector's last compound, with its offset
fn subject_class(selector: &str) -> Option<(usize, &str)> {
    let selector = selector.trim_end();
    let mut depth = 0usize;
    let mut compound_start = 0;
    for (i, byte) in selector.bytes().enumerate() {
        match byte {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'+' | b'~' if depth == 0 => {
                compound_start = i + 1;
            }
            _ => {}
        }
    }

    let compound = &selector[compound_start..];
    let mut depth = 0usize;
    let mut class = None;
    for (i, byte) in compound.bytes().enumerate() {
        match byte {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return None,
            b'.' if depth == 0 && class.is_none() => {
                class = CLASS_TOKEN_RE
                    .captures(&compound[i..])
                    .and_then(|captures| captures.get(1))
                    .map(|name| (compound_start + i, name.as_str()));
            }
            _ => {}
        }
    }
    class
}

/// Parse in-memory CSS attributed to `file_path`
///
/// `last_modified` comes from the live file, or the current time when the file
/// does not exist on disk.
pub fn parse_css_content(content: &str, file_path: &Path) -> CssFileRecord {
    let last_modified = std::fs::metadata(file_path)
        .and_then(|meta| meta.modified())
        .unwrap_or_else(|_| SystemTime::now());
    build_record(content, file_path, last_modified)
}

/// Read and parse a stylesheet from disk
pub async fn parse_css_file(file_path: &Path) -> Result<CssFileRecord> {
    let metadata = match tokio::fs::metadata(file_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CssParseError::NotFound(file_path.to_path_buf()));
        }
        Err(source) => {
            return Err(CssParseError::Read {
                path: file_path.to_path_buf(),
                source,
            });
        }
    };
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CssParseError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;

    let last_modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    Ok(build_record(&content, file_path, last_modified))
}

fn build_record(content: &str, file_path: &Path, last_modified: SystemTime) -> CssFileRecord {
    let extracted = extract_classes(content);
    let stamp = |def: ClassDefinition| def.with_source_file(file_path);

    CssFileRecord {
        file_path: file_path.to_path_buf(),
        last_modified,
        classes: extracted
            .classes
            .into_iter()
            .map(|(name, def)| (name, stamp(def)))
            .collect(),
        all_class_occurrences: extracted
            .all_occurrences
            .into_iter()
            .map(|(name, defs)| (name, defs.into_iter().map(stamp).collect()))
            .collect(),
        raw_content: content.to_string(),
    }
}

/// Blank out `/* */` and `//` comments, keeping byte offsets and newlines intact
///
/// `//` only opens a comment at the start of a line or after `{`, `}` or `;`
/// (modulo whitespace), so `url(//cdn/x.png)` survives. Quoted strings are not
/// protected.
pub fn strip_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut line_comment_allowed = true;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = content[i + 2..]
                    .find("*/")
                    .map(|rel| i + 2 + rel + 2)
                    .unwrap_or(bytes.len());
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && line_comment_allowed => {
                let end = content[i..]
                    .find('\n')
                    .map(|rel| i + rel)
                    .unwrap_or(bytes.len());
                blank(&mut out, i, end);
                i = end;
            }
            b'\n' | b'{' | b'}' | b';' => {
                line_comment_allowed = true;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            _ => {
                line_comment_allowed = false;
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    for byte in &mut out[start..end] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
}

/// Index of the `}` closing the block opened at `open`
///
/// Braces inside single- or double-quoted strings are ignored; backslash escapes
/// are honoured inside strings.
pub fn find_matching_brace(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let byte = bytes[i];
        if let Some(q) = quote {
            if byte == b'\\' {
                i += 2;
                continue;
            }
            if byte == q {
                quote = None;
            }
        } else {
            match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    None
}

/// Split a block body on `;` then on the first `:`
fn parse_declarations(body: &str) -> Properties {
    let mut properties = Properties::new();
    for declaration in body.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty()
            || value.is_empty()
            || name.contains(['{', '}'])
            || value.contains(['{', '}'])
        {
            continue;
        }
        properties.insert(name, value);
    }
    properties
}

/// Innermost `@media` block containing byte `offset`, as `@media <prelude>`
pub fn media_query_at(stripped: &str, offset: usize) -> Option<String> {
    let mut innermost: Option<(usize, String)> = None;

    for captures in MEDIA_RE.captures_iter(stripped) {
        let (Some(whole), Some(prelude)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let open = whole.end() - 1;
        let close = find_matching_brace(stripped, open).unwrap_or(stripped.len());
        if open < offset && offset < close {
            let query = format!("@media {}", prelude.as_str().trim());
            if innermost.as_ref().is_none_or(|(start, _)| whole.start() > *start) {
                innermost = Some((whole.start(), query));
            }
        }
    }

    innermost.map(|(_, query)| query)
}

fn line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

fn line_of(line_starts: &[usize], offset: usize) -> usize {
    match line_starts.binary_search(&offset) {
        Ok(idx) => idx + 1,
        Err(idx) => idx,
    }
}
