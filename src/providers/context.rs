//! Attribute context detection
//!
//! Textual scan for `<attr>="` or `<attr>='` on the cursor's line. The cursor
//! is inside the value when it sits after the opening quote and no closing
//! quote precedes it, which covers both finished and in-progress edits.

use regex::Regex;

/// Byte span (within one line) of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeValue {
    /// First byte after the opening quote
    pub start: usize,
    /// Closing quote, or end of line while the value is still being typed
    pub end: usize,
    pub closed: bool,
}

impl AttributeValue {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

/// Class tokens of an attribute value with their byte offsets
pub fn class_tokens(value: &str) -> impl Iterator<Item = (usize, &str)> {
    value
        .split(|c: char| c.is_whitespace())
        .scan(0usize, |offset, token| {
            let start = *offset;
            *offset += token.len() + 1;
            Some((start, token))
        })
        .filter(|(_, token)| !token.is_empty())
}

/// The configured attribute name with its `<attr>="` matcher, built once per config
#[derive(Debug, Clone)]
pub struct AttributePattern {
    name: String,
    regex: Regex,
}

impl AttributePattern {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            regex: attribute_regex(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

fn attribute_regex(attribute: &str) -> Regex {
    Regex::new(&format!(r#"\b{}\s*=\s*(["'])"#, regex::escape(attribute)))
        .unwrap_or_else(|_| Regex::new(r#"\bstyleName\s*=\s*(["'])"#).unwrap())
}

/// Value span on `line` that contains byte column `column`
pub fn attribute_value_at(line: &str, column: usize, attribute: &Regex) -> Option<AttributeValue> {
    attribute_values(line, attribute)
        .into_iter()
        .find(|value| value.start <= column && column <= value.end)
}

/// Every attribute value span on `line`
pub fn attribute_values(line: &str, attribute: &Regex) -> Vec<AttributeValue> {
    let mut values = Vec::new();
    let mut search_from = 0;

    while let Some(captures) = attribute.captures_at(line, search_from) {
        let (Some(whole), Some(quote)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let start = whole.end();
        let value = match line[start..].find(quote.as_str()) {
            Some(rel) => AttributeValue {
                start,
                end: start + rel,
                closed: true,
            },
            None => AttributeValue {
                start,
                end: line.len(),
                closed: false,
            },
        };
        search_from = (value.end + 1).min(line.len());
        values.push(value);
        if !value.closed {
            break;
        }
    }

    values
}

/// What completion needs from the value around the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    /// Byte span (within the line) of the token being replaced
    pub replace_start: usize,
    pub replace_end: usize,
    pub prefix: String,
    /// Classes already present elsewhere in the value
    pub existing: Vec<String>,
}

pub fn completion_context(line: &str, column: usize, attribute: &Regex) -> Option<CompletionContext> {
    let value = attribute_value_at(line, column, attribute)?;
    let text = value.text(line);
    let cursor = column - value.start;

    let token_start = text[..cursor]
        .rfind(char::is_whitespace)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let token_end = text[cursor..]
        .find(char::is_whitespace)
        .map(|idx| cursor + idx)
        .unwrap_or(text.len());

    let existing = class_tokens(text)
        .filter(|(offset, _)| *offset != token_start)
        .map(|(_, token)| token.to_string())
        .collect();

    Some(CompletionContext {
        replace_start: value.start + token_start,
        replace_end: value.start + token_end,
        prefix: text[token_start..cursor].to_string(),
        existing,
    })
}
