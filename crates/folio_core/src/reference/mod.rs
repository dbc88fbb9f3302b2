//! Reference layer: lazy handles onto files and directories in a storage backend.
//!
//! A reference is just a [`Context`] plus a backend-relative path. Nothing is
//! read until an async method is called, so references are cheap to create
//! and clone. Every read reflects the backend's state at call time.
//!
//! ```ignore
//! let ctx = Context::new(Arc::new(storage), Config::default(), schema);
//! let post = ctx.markdown_file("posts/hello.md");
//! let doc = post.read().await?;
//! let author = post.relation("author").await?;
//! let archived = post.archive().await?;
//! ```

mod directory;
mod file;
mod relation;

pub use directory::{DirectoryEntry, DirectoryRef};
pub use file::{FileRef, IndexFileRef, MarkdownFileRef, UnknownFileRef};
pub use relation::{Relation, RelationDirectoryRef, RelationFile};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::{FolioError, Result};
use crate::path::{DirectoryPath, FilePath};
use crate::schema::CustomSchema;
use crate::storage::Storage;

/// How a file is treated by the reference layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Index,
    Markdown,
    Unknown,
}

/// Classify a path by its file name.
///
/// The configured index file name wins over the `.md` extension check.
pub fn classify(path: &Path, config: &Config) -> FileKind {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return FileKind::Unknown;
    };
    if name == config.index_file_name {
        FileKind::Index
    } else if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
    {
        FileKind::Markdown
    } else {
        FileKind::Unknown
    }
}

/// Everything a reference needs besides its path: the backend, the layout
/// configuration and the consumer's field schema.
#[derive(Clone)]
pub struct Context {
    storage: Arc<dyn Storage>,
    config: Arc<Config>,
    schema: Arc<CustomSchema>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("base_path", &self.storage.base_path())
            .field("config", &self.config)
            .field("schema", &self.schema)
            .finish()
    }
}

impl Context {
    pub fn new(storage: Arc<dyn Storage>, config: Config, schema: CustomSchema) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            schema: Arc::new(schema),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &Arc<CustomSchema> {
        &self.schema
    }

    /// A reference of the right kind for any file path.
    pub fn file(&self, path: impl Into<PathBuf>) -> FileRef {
        FileRef::new(self.clone(), path)
    }

    pub fn markdown_file(&self, path: impl Into<PathBuf>) -> MarkdownFileRef {
        MarkdownFileRef::new(self.clone(), path)
    }

    pub fn index_file(&self, path: impl Into<PathBuf>) -> IndexFileRef {
        IndexFileRef::new(self.clone(), path)
    }

    pub fn unknown_file(&self, path: impl Into<PathBuf>) -> UnknownFileRef {
        UnknownFileRef::new(self.clone(), path)
    }

    pub fn directory(&self, path: impl Into<PathBuf>) -> DirectoryRef {
        DirectoryRef::new(self.clone(), path)
    }

    pub fn relation_directory(&self, path: impl Into<PathBuf>) -> RelationDirectoryRef {
        RelationDirectoryRef::new(self.clone(), path)
    }

    pub(crate) fn file_path(&self, path: &Path) -> FilePath {
        FilePath::new(path, self.storage.resolve(path), &self.config)
    }

    pub(crate) fn directory_path(&self, path: &Path) -> DirectoryPath {
        DirectoryPath::new(path, self.storage.resolve(path))
    }

    pub(crate) async fn read_text(&self, path: &Path) -> Result<Option<String>> {
        self.storage
            .read_file(path)
            .await
            .map_err(|source| FolioError::FileRead {
                path: path.to_path_buf(),
                source,
            })
    }

    pub(crate) async fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        self.storage
            .write_file(path, text)
            .await
            .map_err(|source| FolioError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    pub(crate) async fn delete(&self, path: &Path) -> Result<()> {
        if !self.storage.is_file(path).await {
            return Err(FolioError::NotFound(path.to_path_buf()));
        }
        self.storage
            .delete_file(path)
            .await
            .map_err(|source| FolioError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Move a file without ever replacing one at the target.
    pub(crate) async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        if !self.storage.is_file(from).await {
            return Err(FolioError::NotFound(from.to_path_buf()));
        }
        if self.storage.is_file(to).await {
            return Err(FolioError::AlreadyExists(to.to_path_buf()));
        }
        log::debug!("Moving {} -> {}", from.display(), to.display());
        self.storage
            .move_file(from, to)
            .await
            .map_err(|source| FolioError::FileMove {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }

    pub(crate) async fn list_names(&self, dir: &Path) -> Result<Vec<String>> {
        if !self.storage.is_directory(dir).await {
            return Err(FolioError::NotFound(dir.to_path_buf()));
        }
        let mut names = self
            .storage
            .read_directory_file_names(dir)
            .await
            .map_err(|source| FolioError::DirectoryRead {
                path: dir.to_path_buf(),
                source,
            })?;
        names.sort();
        Ok(names)
    }

    pub(crate) async fn stats(&self, path: &Path) -> Result<FileStats> {
        let wrap = |source: std::io::Error| FolioError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        if !self.storage.is_file(path).await {
            return Err(FolioError::NotFound(path.to_path_buf()));
        }
        Ok(FileStats {
            size: self.storage.file_size(path).await.map_err(wrap)?,
            updated: self.storage.file_updated_time(path).await.map_err(wrap)?,
            created: self.storage.file_created_time(path).await.map_err(wrap)?,
        })
    }
}

/// Size and timestamps of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub size: u64,
    pub updated: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

/// Where a file goes when archived: the `_` directory next to it.
pub(crate) fn archive_path(path: &Path, config: &Config) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let name = path.file_name().unwrap_or_default();
    parent.join(&config.archive_directory_name).join(name)
}

/// Where an archived file goes when restored: one level up.
pub(crate) fn restore_path(path: &Path, config: &Config) -> Result<PathBuf> {
    if !crate::path::is_archived_file(path, config) {
        return Err(FolioError::NotArchived(path.to_path_buf()));
    }
    let directory = crate::path::logical_directory(path, config);
    let name = path.file_name().unwrap_or_default();
    Ok(directory.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let config = Config::default();
        assert_eq!(classify(Path::new("docs/index.md"), &config), FileKind::Index);
        assert_eq!(classify(Path::new("docs/a.md"), &config), FileKind::Markdown);
        assert_eq!(classify(Path::new("docs/A.MD"), &config), FileKind::Markdown);
        assert_eq!(classify(Path::new("docs/data.json"), &config), FileKind::Unknown);
        assert_eq!(classify(Path::new("docs/README"), &config), FileKind::Unknown);
    }

    #[test]
    fn test_classify_custom_index_name() {
        let config = Config {
            index_file_name: "_index.md".to_string(),
            ..Config::default()
        };
        assert_eq!(classify(Path::new("docs/_index.md"), &config), FileKind::Index);
        assert_eq!(classify(Path::new("docs/index.md"), &config), FileKind::Markdown);
    }

    #[test]
    fn test_archive_and_restore_paths() {
        let config = Config::default();
        let archived = archive_path(Path::new("docs/a.md"), &config);
        assert_eq!(archived, PathBuf::from("docs/_/a.md"));
        assert_eq!(restore_path(&archived, &config).unwrap(), PathBuf::from("docs/a.md"));
        assert!(matches!(
            restore_path(Path::new("docs/a.md"), &config),
            Err(FolioError::NotArchived(_))
        ));
        assert_eq!(archive_path(Path::new("a.md"), &config), PathBuf::from("_/a.md"));
    }
}
