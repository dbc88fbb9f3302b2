//! Documents: parsed file contents bound to their location.
//!
//! A [`Content`] pairs typed metadata with a body; an [`Entity`] adds the
//! file's [`FilePath`] and archive flag. Every `with_*` method returns a new
//! value and leaves the receiver untouched. Nothing here performs I/O: reading
//! and writing goes through the reference layer.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{FolioError, Result};
use crate::frontmatter::{self, FrontMatter};
use crate::index_schema::{IndexMeta, IndexSchema};
use crate::markdown;
use crate::path::FilePath;
use crate::reference::FileKind;
use crate::schema::{CustomSchema, Meta};

/// Metadata that can be written back as frontmatter.
pub trait FrontMatterMeta {
    fn to_front_matter(&self) -> Result<FrontMatter>;
}

impl FrontMatterMeta for Meta {
    fn to_front_matter(&self) -> Result<FrontMatter> {
        Ok(Meta::to_front_matter(self))
    }
}

impl FrontMatterMeta for IndexMeta {
    fn to_front_matter(&self) -> Result<FrontMatter> {
        IndexMeta::to_front_matter(self)
    }
}

/// Typed metadata plus body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Content<M> {
    meta: M,
    body: String,
    delimiter: String,
}

impl<M: Clone> Content<M> {
    pub fn new(meta: M, body: impl Into<String>) -> Self {
        Self {
            meta,
            body: body.into(),
            delimiter: markdown::DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Keep the delimiter line a parsed file was written with.
    pub(crate) fn with_delimiter(mut self, delimiter: Option<String>) -> Self {
        if let Some(delimiter) = delimiter {
            self.delimiter = delimiter;
        }
        self
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The frontmatter delimiter line used when writing.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The body's H1 title.
    pub fn title(&self) -> Option<String> {
        markdown::extract_title(&self.body)
    }

    /// The line following the title.
    pub fn description(&self) -> Option<String> {
        markdown::extract_description(&self.body)
    }

    pub fn with_title(&self, title: &str) -> Self {
        self.with_body(markdown::update_title(&self.body, title))
    }

    pub fn with_description(&self, description: &str) -> Self {
        self.with_body(markdown::update_description(&self.body, description))
    }

    pub fn with_body(&self, body: impl Into<String>) -> Self {
        Self {
            meta: self.meta.clone(),
            body: body.into(),
            delimiter: self.delimiter.clone(),
        }
    }

    pub fn with_meta(&self, meta: M) -> Self {
        Self {
            meta,
            body: self.body.clone(),
            delimiter: self.delimiter.clone(),
        }
    }
}

impl<M: FrontMatterMeta> Content<M> {
    /// Serialize as `---\n{yaml}---\n\n{body}`, or just the body when there is no metadata.
    pub fn to_text(&self) -> Result<String> {
        frontmatter::serialize_with_delimiter(
            &self.meta.to_front_matter()?,
            &self.delimiter,
            &self.body,
        )
    }
}

/// A document bound to a file location.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<M> {
    path: FilePath,
    content: Content<M>,
    is_archived: bool,
}

/// A directory's `index.md`.
pub type IndexDocument = Entity<IndexMeta>;

/// Any other markdown file, typed by the consumer's schema.
pub type MarkdownDocument = Entity<Meta>;

impl<M: Clone> Entity<M> {
    pub fn new(path: FilePath, content: Content<M>, config: &Config) -> Self {
        let is_archived = path.is_archived(config);
        Self {
            path,
            content,
            is_archived,
        }
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn content(&self) -> &Content<M> {
        &self.content
    }

    pub fn meta(&self) -> &M {
        self.content.meta()
    }

    pub fn body(&self) -> &str {
        self.content.body()
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn title(&self) -> Option<String> {
        self.content.title()
    }

    /// The title, falling back to the file's name.
    pub fn display_title(&self) -> String {
        self.title().unwrap_or_else(|| self.path.name.clone())
    }

    pub fn description(&self) -> Option<String> {
        self.content.description()
    }

    fn with_content(&self, content: Content<M>) -> Self {
        Self {
            path: self.path.clone(),
            content,
            is_archived: self.is_archived,
        }
    }

    pub fn with_title(&self, title: &str) -> Self {
        self.with_content(self.content.with_title(title))
    }

    pub fn with_description(&self, description: &str) -> Self {
        self.with_content(self.content.with_description(description))
    }

    pub fn with_body(&self, body: impl Into<String>) -> Self {
        self.with_content(self.content.with_body(body))
    }

    pub fn with_meta(&self, meta: M) -> Self {
        self.with_content(self.content.with_meta(meta))
    }

    /// Rebind the document to another location; the archive flag follows the new path.
    pub fn with_path(&self, path: FilePath, config: &Config) -> Self {
        Self::new(path, self.content.clone(), config)
    }
}

impl<M: FrontMatterMeta + Clone> Entity<M> {
    pub fn to_text(&self) -> Result<String> {
        self.content.to_text()
    }
}

fn parse_front_matter(path: &FilePath, text: &str) -> Result<frontmatter::ParsedFile> {
    frontmatter::parse(text).map_err(|e| FolioError::InvalidFrontmatter {
        path: path.path.clone(),
        message: e.to_string(),
    })
}

impl IndexDocument {
    /// Parse an index document's text.
    pub fn parse(path: FilePath, text: &str, config: &Config) -> Result<Self> {
        let parsed = parse_front_matter(&path, text)?;
        let meta = IndexMeta::from_front_matter(&parsed.frontmatter, &config.index_meta_includes);
        let content = Content::new(meta, parsed.body).with_delimiter(parsed.delimiter);
        Ok(Self::new(path, content, config))
    }

    /// The document standing in for a missing index: no metadata, the given
    /// title as H1.
    pub fn synthesized(path: FilePath, title: &str, config: &Config) -> Self {
        let body = markdown::compose(title, "", "");
        Self::new(path, Content::new(IndexMeta::default(), body), config)
    }

    pub fn icon(&self) -> Option<&str> {
        self.meta().icon.as_deref()
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.meta().schema
    }
}

impl MarkdownDocument {
    /// Parse a markdown document's text, reading its frontmatter tolerantly.
    pub fn parse(
        path: FilePath,
        text: &str,
        schema: Arc<CustomSchema>,
        config: &Config,
    ) -> Result<Self> {
        let parsed = parse_front_matter(&path, text)?;
        let meta = Meta::from_front_matter(schema, &parsed.frontmatter);
        let content = Content::new(meta, parsed.body).with_delimiter(parsed.delimiter);
        Ok(Self::new(path, content, config))
    }

    /// A new document with every field at its fallback value and just a title.
    pub fn create(path: FilePath, title: &str, schema: Arc<CustomSchema>, config: &Config) -> Self {
        let body = markdown::compose(title, "", "");
        Self::new(path, Content::new(Meta::empty(schema), body), config)
    }
}

/// A file that is neither markdown nor an index. Its content is opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDocument {
    path: FilePath,
    content: String,
    extension: String,
    is_archived: bool,
}

impl UnknownDocument {
    pub fn new(path: FilePath, content: impl Into<String>, config: &Config) -> Self {
        let extension = path.extension().unwrap_or_default();
        let is_archived = path.is_archived(config);
        Self {
            path,
            content: content.into(),
            extension,
            is_archived,
        }
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    pub fn with_path(&self, path: FilePath, config: &Config) -> Self {
        Self::new(path, self.content.clone(), config)
    }
}

/// Any document read through a [`crate::reference::FileRef`].
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Index(IndexDocument),
    Markdown(MarkdownDocument),
    Unknown(UnknownDocument),
}

impl Document {
    pub fn kind(&self) -> FileKind {
        match self {
            Document::Index(_) => FileKind::Index,
            Document::Markdown(_) => FileKind::Markdown,
            Document::Unknown(_) => FileKind::Unknown,
        }
    }

    pub fn path(&self) -> &FilePath {
        match self {
            Document::Index(doc) => doc.path(),
            Document::Markdown(doc) => doc.path(),
            Document::Unknown(doc) => doc.path(),
        }
    }

    pub fn full_path(&self) -> &Path {
        &self.path().full_path
    }

    pub fn is_archived(&self) -> bool {
        match self {
            Document::Index(doc) => doc.is_archived(),
            Document::Markdown(doc) => doc.is_archived(),
            Document::Unknown(doc) => doc.is_archived(),
        }
    }

    /// The text to write back to storage.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Document::Index(doc) => doc.to_text(),
            Document::Markdown(doc) => doc.to_text(),
            Document::Unknown(doc) => Ok(doc.content().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, FieldValue};

    fn schema() -> Arc<CustomSchema> {
        Arc::new(
            CustomSchema::new()
                .add_field("author", FieldDefinition::relation("../authors"))
                .unwrap(),
        )
    }

    #[test]
    fn test_markdown_document_parse_and_write() {
        let config = Config::default();
        let path = FilePath::new("posts/hello.md", "/posts/hello.md", &config);
        let text = "---\nauthor: ada\nlayout: wide\n---\n\n# Hello\n\nA first post.\n";

        let doc = MarkdownDocument::parse(path, text, schema(), &config).unwrap();
        assert_eq!(doc.title().as_deref(), Some("Hello"));
        assert_eq!(doc.description().as_deref(), Some("A first post."));
        assert_eq!(doc.meta()["author"].as_str(), Some("ada"));
        assert!(!doc.is_archived());
        assert_eq!(doc.to_text().unwrap(), text);
    }

    #[test]
    fn test_custom_delimiter_survives_edits() {
        let config = Config::default();
        let path = FilePath::new("posts/hello.md", "", &config);
        let text = "-----\nauthor: ada\n-----\n\n# Hello\n";

        let doc = MarkdownDocument::parse(path, text, schema(), &config).unwrap();
        let renamed = doc.with_title("Hi");
        assert_eq!(renamed.to_text().unwrap(), "-----\nauthor: ada\n-----\n\n# Hi\n");
    }

    #[test]
    fn test_with_methods_do_not_mutate() {
        let config = Config::default();
        let path = FilePath::new("posts/hello.md", "", &config);
        let doc = MarkdownDocument::create(path, "Hello", schema(), &config);

        let renamed = doc.with_title("Goodbye").with_description("Later.");
        assert_eq!(doc.title().as_deref(), Some("Hello"));
        assert_eq!(renamed.title().as_deref(), Some("Goodbye"));
        assert_eq!(renamed.description().as_deref(), Some("Later."));

        let meta = doc
            .meta()
            .with_value("author", FieldValue::Relation(Some("grace".into())))
            .unwrap();
        let updated = doc.with_meta(meta);
        assert_eq!(updated.meta()["author"].as_str(), Some("grace"));
        assert_eq!(doc.meta()["author"].as_str(), None);
    }

    #[test]
    fn test_with_path_recomputes_archive_flag() {
        let config = Config::default();
        let doc = MarkdownDocument::create(FilePath::new("a/x.md", "", &config), "X", schema(), &config);
        let moved = doc.with_path(FilePath::new("a/_/x.md", "", &config), &config);
        assert!(moved.is_archived());
        assert_eq!(moved.body(), doc.body());
    }

    #[test]
    fn test_invalid_front_matter_names_the_file() {
        let config = Config::default();
        let path = FilePath::new("a/bad.md", "", &config);
        let err = MarkdownDocument::parse(path, "---\ntitle: [unclosed\n---\n", schema(), &config)
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidFrontmatter { path, .. } if path == Path::new("a/bad.md")));
    }

    #[test]
    fn test_synthesized_index() {
        let config = Config::default();
        let doc = IndexDocument::synthesized(FilePath::new("guide/index.md", "", &config), "guide", &config);
        assert_eq!(doc.title().as_deref(), Some("guide"));
        assert_eq!(doc.icon(), None);
        assert_eq!(doc.to_text().unwrap(), "# guide\n");
    }

    #[test]
    fn test_unknown_document() {
        let config = Config::default();
        let doc = UnknownDocument::new(FilePath::new("data/list.JSON", "", &config), "[]", &config);
        assert_eq!(doc.extension(), "json");
        assert_eq!(Document::Unknown(doc.clone()).to_text().unwrap(), "[]");
        assert_eq!(doc.with_content("{}").content(), "{}");
    }
}
