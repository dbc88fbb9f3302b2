use std::path::{Path, PathBuf};

use super::{Context, DirectoryRef, FileKind, FileStats, archive_path, classify, restore_path};
use crate::document::{Document, IndexDocument, MarkdownDocument, UnknownDocument};
use crate::error::{FolioError, Result};
use crate::frontmatter;
use crate::path::{FilePath, is_archived_file, logical_directory};
use crate::storage::normalize_path;

/// Read a file, falling back to its archive location. Returns the path the
/// text was actually found at.
async fn read_with_archive_fallback(ctx: &Context, path: &Path) -> Result<(PathBuf, String)> {
    if let Some(text) = ctx.read_text(path).await? {
        return Ok((path.to_path_buf(), text));
    }
    if !is_archived_file(path, ctx.config()) {
        let archived = archive_path(path, ctx.config());
        if let Some(text) = ctx.read_text(&archived).await? {
            log::debug!("Read {} from archive", path.display());
            return Ok((archived, text));
        }
    }
    Err(FolioError::NotFound(path.to_path_buf()))
}

async fn archive_file(ctx: &Context, path: &Path) -> Result<PathBuf> {
    if is_archived_file(path, ctx.config()) {
        log::debug!("{} is already archived", path.display());
        return Ok(path.to_path_buf());
    }
    let target = archive_path(path, ctx.config());
    ctx.move_file(path, &target).await?;
    Ok(target)
}

async fn restore_file(ctx: &Context, path: &Path) -> Result<PathBuf> {
    let target = restore_path(path, ctx.config())?;
    ctx.move_file(path, &target).await?;
    Ok(target)
}

/// Reference to a directory's index document.
#[derive(Debug, Clone)]
pub struct IndexFileRef {
    ctx: Context,
    path: PathBuf,
}

impl IndexFileRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            path: path.into(),
        }
    }

    /// The index of the given directory.
    pub fn for_directory(ctx: Context, directory: &Path) -> Self {
        let path = directory.join(&ctx.config().index_file_name);
        Self::new(ctx, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_path(&self) -> FilePath {
        self.ctx.file_path(&self.path)
    }

    /// The directory this index describes.
    pub fn directory(&self) -> DirectoryRef {
        let dir = self.path.parent().unwrap_or(Path::new(""));
        DirectoryRef::new(self.ctx.clone(), dir)
    }

    pub async fn exists(&self) -> bool {
        self.ctx.storage().is_file(&self.path).await
    }

    /// Read the index. A missing index is synthesized: no metadata, the
    /// directory's name as title.
    pub async fn read(&self) -> Result<IndexDocument> {
        let config = self.ctx.config();
        match self.ctx.read_text(&self.path).await? {
            Some(text) => IndexDocument::parse(self.file_path(), &text, config),
            None => {
                let dir = self.ctx.directory_path(self.path.parent().unwrap_or(Path::new("")));
                let title = dir.display_name(config);
                log::debug!("No index at {}, synthesizing one", self.path.display());
                Ok(IndexDocument::synthesized(self.file_path(), &title, config))
            }
        }
    }

    pub async fn write(&self, document: &IndexDocument) -> Result<()> {
        self.ctx.write_text(&self.path, &document.to_text()?).await
    }

    pub async fn stats(&self) -> Result<FileStats> {
        self.ctx.stats(&self.path).await
    }
}

/// Reference to a markdown file typed by the context's schema.
#[derive(Debug, Clone)]
pub struct MarkdownFileRef {
    ctx: Context,
    path: PathBuf,
}

impl MarkdownFileRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_path(&self) -> FilePath {
        self.ctx.file_path(&self.path)
    }

    /// The file stem, which is also the id relations use.
    pub fn slug(&self) -> String {
        self.file_path().name
    }

    pub fn is_archived(&self) -> bool {
        is_archived_file(&self.path, self.ctx.config())
    }

    /// The directory the file belongs to (the archive's parent for archived files).
    pub fn directory(&self) -> DirectoryRef {
        DirectoryRef::new(
            self.ctx.clone(),
            logical_directory(&self.path, self.ctx.config()),
        )
    }

    pub async fn exists(&self) -> bool {
        self.ctx.storage().is_file(&self.path).await
    }

    /// Read the document, trying the archive location when the primary path is missing.
    pub async fn read(&self) -> Result<MarkdownDocument> {
        let (path, text) = read_with_archive_fallback(&self.ctx, &self.path).await?;
        MarkdownDocument::parse(
            self.ctx.file_path(&path),
            &text,
            self.ctx.schema().clone(),
            self.ctx.config(),
        )
    }

    pub async fn write(&self, document: &MarkdownDocument) -> Result<()> {
        self.ctx.write_text(&self.path, &document.to_text()?).await
    }

    /// Write a new document with just a title and every field at its fallback value.
    pub async fn create(&self, title: &str) -> Result<MarkdownDocument> {
        let document = MarkdownDocument::create(
            self.file_path(),
            title,
            self.ctx.schema().clone(),
            self.ctx.config(),
        );
        self.write(&document).await?;
        Ok(document)
    }

    pub async fn delete(&self) -> Result<()> {
        self.ctx.delete(&self.path).await
    }

    /// Move the file into its directory's archive. Returns a reference to the new location.
    pub async fn archive(&self) -> Result<MarkdownFileRef> {
        let target = archive_file(&self.ctx, &self.path).await?;
        Ok(Self::new(self.ctx.clone(), target))
    }

    /// Move an archived file back to its directory. Fails with
    /// [`FolioError::NotArchived`] if the file is not in an archive.
    pub async fn restore(&self) -> Result<MarkdownFileRef> {
        let target = restore_file(&self.ctx, &self.path).await?;
        Ok(Self::new(self.ctx.clone(), target))
    }

    pub async fn stats(&self) -> Result<FileStats> {
        self.ctx.stats(&self.path).await
    }

    /// Resolve a single-valued relation field.
    ///
    /// Returns `None` when the field has no value or no related directory is
    /// declared for it, in the directory's index schema or in the context's schema.
    pub async fn relation(&self, field: &str) -> Result<Option<MarkdownFileRef>> {
        let Some(id) = self.relation_ids(field).await?.into_iter().next() else {
            return Ok(None);
        };
        let Some(directory) = self.relation_directory(field).await else {
            return Ok(None);
        };
        Ok(Some(self.related(&directory, &id)))
    }

    /// Resolve a multi-valued relation field. Unresolvable fields give an empty list.
    pub async fn relations(&self, field: &str) -> Result<Vec<MarkdownFileRef>> {
        let ids = self.relation_ids(field).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let Some(directory) = self.relation_directory(field).await else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().map(|id| self.related(&directory, id)).collect())
    }

    fn related(&self, directory: &Path, id: &str) -> MarkdownFileRef {
        Self::new(self.ctx.clone(), directory.join(format!("{}.md", id)))
    }

    async fn relation_ids(&self, field: &str) -> Result<Vec<String>> {
        let document = self.read().await?;
        let meta = document.meta();
        let raw = match meta.get(field) {
            Ok(value) => match (value.as_str(), value.as_strings()) {
                (Some(id), _) => vec![id.to_string()],
                (None, Some(ids)) => ids.to_vec(),
                (None, None) => Vec::new(),
            },
            Err(_) => frontmatter::get_string_array(meta.extra(), field),
        };

        Ok(raw
            .iter()
            .map(|id| {
                let id = id.trim();
                id.strip_suffix(".md").unwrap_or(id).to_string()
            })
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// The directory a relation field points at, resolved against this file's directory.
    async fn relation_directory(&self, field: &str) -> Option<PathBuf> {
        let directory = logical_directory(&self.path, self.ctx.config());
        let index = IndexFileRef::for_directory(self.ctx.clone(), &directory);

        let from_index = match index.read().await {
            Ok(doc) => doc.schema().relation_path(field).map(String::from),
            Err(e) => {
                log::warn!("Ignoring index schema of {}: {}", directory.display(), e);
                None
            }
        };
        let declared = from_index.or_else(|| {
            self.ctx
                .schema()
                .relation_path(field)
                .map(String::from)
        });

        match declared {
            Some(declared) => Some(resolve_relation_path(&directory, &declared)),
            None => {
                log::debug!("No relation path declared for field '{}'", field);
                None
            }
        }
    }
}

/// Resolve a declared relation path. A leading `/` anchors it at the backend root.
fn resolve_relation_path(directory: &Path, declared: &str) -> PathBuf {
    let declared = declared.trim();
    match declared.strip_prefix('/') {
        Some(rooted) => normalize_path(Path::new(rooted)),
        None => normalize_path(&directory.join(declared)),
    }
}

/// Reference to a file that is neither markdown nor an index.
#[derive(Debug, Clone)]
pub struct UnknownFileRef {
    ctx: Context,
    path: PathBuf,
}

impl UnknownFileRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_path(&self) -> FilePath {
        self.ctx.file_path(&self.path)
    }

    pub fn is_archived(&self) -> bool {
        is_archived_file(&self.path, self.ctx.config())
    }

    pub async fn exists(&self) -> bool {
        self.ctx.storage().is_file(&self.path).await
    }

    /// Read the file as opaque text, trying the archive location when the primary path is missing.
    pub async fn read(&self) -> Result<UnknownDocument> {
        let (path, text) = read_with_archive_fallback(&self.ctx, &self.path).await?;
        Ok(UnknownDocument::new(
            self.ctx.file_path(&path),
            text,
            self.ctx.config(),
        ))
    }

    pub async fn write(&self, document: &UnknownDocument) -> Result<()> {
        self.ctx.write_text(&self.path, document.content()).await
    }

    pub async fn delete(&self) -> Result<()> {
        self.ctx.delete(&self.path).await
    }

    pub async fn archive(&self) -> Result<UnknownFileRef> {
        let target = archive_file(&self.ctx, &self.path).await?;
        Ok(Self::new(self.ctx.clone(), target))
    }

    pub async fn restore(&self) -> Result<UnknownFileRef> {
        let target = restore_file(&self.ctx, &self.path).await?;
        Ok(Self::new(self.ctx.clone(), target))
    }

    pub async fn stats(&self) -> Result<FileStats> {
        self.ctx.stats(&self.path).await
    }
}

/// A reference to any file, dispatched on its [`FileKind`].
#[derive(Debug, Clone)]
pub enum FileRef {
    Index(IndexFileRef),
    Markdown(MarkdownFileRef),
    Unknown(UnknownFileRef),
}

impl FileRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match classify(&path, ctx.config()) {
            FileKind::Index => FileRef::Index(IndexFileRef::new(ctx, path)),
            FileKind::Markdown => FileRef::Markdown(MarkdownFileRef::new(ctx, path)),
            FileKind::Unknown => FileRef::Unknown(UnknownFileRef::new(ctx, path)),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            FileRef::Index(_) => FileKind::Index,
            FileRef::Markdown(_) => FileKind::Markdown,
            FileRef::Unknown(_) => FileKind::Unknown,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileRef::Index(r) => r.path(),
            FileRef::Markdown(r) => r.path(),
            FileRef::Unknown(r) => r.path(),
        }
    }

    pub async fn exists(&self) -> bool {
        match self {
            FileRef::Index(r) => r.exists().await,
            FileRef::Markdown(r) => r.exists().await,
            FileRef::Unknown(r) => r.exists().await,
        }
    }

    pub async fn read(&self) -> Result<Document> {
        Ok(match self {
            FileRef::Index(r) => Document::Index(r.read().await?),
            FileRef::Markdown(r) => Document::Markdown(r.read().await?),
            FileRef::Unknown(r) => Document::Unknown(r.read().await?),
        })
    }

    pub async fn stats(&self) -> Result<FileStats> {
        match self {
            FileRef::Index(r) => r.stats().await,
            FileRef::Markdown(r) => r.stats().await,
            FileRef::Unknown(r) => r.stats().await,
        }
    }
}
