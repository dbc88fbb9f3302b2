//! Shared frontmatter parsing and serialization utilities.
//!
//! Splitting is delegated to [`crate::markdown`]; this module turns the raw
//! block into an ordered YAML map and back.

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::Result;
use crate::markdown;

/// Ordered frontmatter map, preserving key order from the file.
pub type FrontMatter = IndexMap<String, Value>;

/// Result of parsing a markdown file with frontmatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFile {
    /// The parsed frontmatter as an ordered map.
    pub frontmatter: FrontMatter,
    /// The body content after the frontmatter.
    pub body: String,
    /// The delimiter line the block was written with, if there was a block.
    pub delimiter: Option<String>,
}

/// Parse frontmatter and body, returning empty frontmatter if none exists.
///
/// An empty block (or one containing only `null`) parses to an empty map.
/// YAML syntax errors and non-mapping blocks are errors.
pub fn parse(content: &str) -> Result<ParsedFile> {
    let body = markdown::extract_body(content).to_string();
    let delimiter = markdown::extract_delimiter(content).map(String::from);
    let frontmatter = match markdown::extract_front_matter(content) {
        Some(raw) if !raw.trim().is_empty() => match serde_yaml::from_str::<Value>(raw)? {
            Value::Null => FrontMatter::new(),
            value => serde_yaml::from_value(value)?,
        },
        _ => FrontMatter::new(),
    };

    Ok(ParsedFile {
        frontmatter,
        body,
        delimiter,
    })
}

/// Serialize frontmatter and body back to markdown content.
///
/// An empty map produces no frontmatter block at all.
pub fn serialize(frontmatter: &FrontMatter, body: &str) -> Result<String> {
    serialize_with_delimiter(frontmatter, markdown::DEFAULT_DELIMITER, body)
}

/// Like [`serialize`], writing the block between `delimiter` lines.
pub fn serialize_with_delimiter(
    frontmatter: &FrontMatter,
    delimiter: &str,
    body: &str,
) -> Result<String> {
    if frontmatter.is_empty() {
        return Ok(body.to_string());
    }

    let yaml_str = serde_yaml::to_string(frontmatter)?;
    Ok(markdown::join(&yaml_str, delimiter, body))
}

/// Get a string property value.
pub fn get_string<'a>(frontmatter: &'a FrontMatter, key: &str) -> Option<&'a str> {
    frontmatter.get(key).and_then(|v| v.as_str())
}

/// Get an array property as a Vec of strings. A single string becomes a one-element list.
pub fn get_string_array(frontmatter: &FrontMatter, key: &str) -> Vec<String> {
    match frontmatter.get(key) {
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}
