use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{
    Context, FileKind, FileRef, IndexFileRef, MarkdownFileRef, RelationDirectoryRef,
    UnknownFileRef, classify,
};
use crate::error::{FolioError, Result};
use crate::path::DirectoryPath;

/// One visible child of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Reference to a directory.
///
/// Listings never include the archive directory, the reserved metadata file
/// or any configured exclude, and are sorted by name.
#[derive(Debug, Clone)]
pub struct DirectoryRef {
    ctx: Context,
    path: PathBuf,
}

impl DirectoryRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory_path(&self) -> DirectoryPath {
        self.ctx.directory_path(&self.path)
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> String {
        self.directory_path().name
    }

    pub fn parent(&self) -> Option<DirectoryRef> {
        let parent = self.directory_path().parent()?;
        Some(Self::new(self.ctx.clone(), parent.path))
    }

    pub fn child(&self, name: &str) -> DirectoryRef {
        Self::new(self.ctx.clone(), self.path.join(name))
    }

    pub fn index_file(&self) -> IndexFileRef {
        IndexFileRef::for_directory(self.ctx.clone(), &self.path)
    }

    /// This directory viewed as the target of relation fields.
    pub fn as_relation_directory(&self) -> RelationDirectoryRef {
        RelationDirectoryRef::new(self.ctx.clone(), self.path.clone())
    }

    pub async fn exists(&self) -> bool {
        self.ctx.storage().is_directory(&self.path).await
    }

    /// Create the directory and its parents.
    pub async fn create(&self) -> Result<()> {
        self.ctx
            .storage()
            .create_directory(&self.path)
            .await
            .map_err(|source| FolioError::FileWrite {
                path: self.path.clone(),
                source,
            })
    }

    /// Visible children, sorted by name.
    pub async fn entries(&self) -> Result<Vec<DirectoryEntry>> {
        let config = self.ctx.config();
        let mut entries = Vec::new();
        for name in self.ctx.list_names(&self.path).await? {
            if config.is_excluded_name(&name) {
                continue;
            }
            let path = self.path.join(&name);
            let is_directory = self.ctx.storage().is_directory(&path).await;
            entries.push(DirectoryEntry {
                name,
                path,
                is_directory,
            });
        }
        Ok(entries)
    }

    /// Names of the visible subdirectories.
    pub async fn directory_names(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.is_directory)
            .map(|e| e.name)
            .collect())
    }

    pub async fn directories(&self) -> Result<Vec<DirectoryRef>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.is_directory)
            .map(|e| Self::new(self.ctx.clone(), e.path))
            .collect())
    }

    /// Names of the visible files, index included.
    pub async fn file_names(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.name)
            .collect())
    }

    /// Every visible file, as a reference of the right kind.
    pub async fn files(&self) -> Result<Vec<FileRef>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|e| !e.is_directory)
            .map(|e| FileRef::new(self.ctx.clone(), e.path))
            .collect())
    }

    /// The directory's markdown files: first the normal ones, then the archived
    /// ones. The index is never included.
    pub async fn md_files(&self) -> Result<Vec<MarkdownFileRef>> {
        let mut files = self.markdown_files_in(&self.path, true).await?;

        let archive = self.path.join(&self.ctx.config().archive_directory_name);
        if self.ctx.storage().is_directory(&archive).await {
            files.extend(self.markdown_files_in(&archive, false).await?);
        }
        Ok(files)
    }

    /// Markdown files that are not archived.
    pub async fn active_md_files(&self) -> Result<Vec<MarkdownFileRef>> {
        self.markdown_files_in(&self.path, true).await
    }

    /// Every visible file that is neither markdown nor an index.
    pub async fn unknown_files(&self) -> Result<Vec<UnknownFileRef>> {
        Ok(self
            .files()
            .await?
            .into_iter()
            .filter_map(|f| match f {
                FileRef::Unknown(r) => Some(r),
                _ => None,
            })
            .collect())
    }

    async fn markdown_files_in(&self, dir: &Path, apply_excludes: bool) -> Result<Vec<MarkdownFileRef>> {
        let config = self.ctx.config();
        let mut files = Vec::new();
        for name in self.ctx.list_names(dir).await? {
            if name == config.meta_file_name || (apply_excludes && config.is_excluded_name(&name)) {
                continue;
            }
            let path = dir.join(&name);
            if classify(&path, config) != FileKind::Markdown {
                continue;
            }
            if self.ctx.storage().is_file(&path).await {
                files.push(MarkdownFileRef::new(self.ctx.clone(), path));
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::schema::CustomSchema;
    use crate::storage::{InMemoryStorage, block_on_test};

    fn context(files: &[(&str, &str)], config: Config) -> Context {
        let storage = InMemoryStorage::with_files(files.iter().copied());
        Context::new(Arc::new(storage), config, CustomSchema::new())
    }

    #[test]
    fn test_listing_excludes_hidden_names() {
        let config = Config {
            directory_excludes: vec!["node_modules".to_string()],
            ..Config::default()
        };
        let ctx = context(
            &[
                ("docs/index.md", "# Docs\n"),
                ("docs/b.md", "# B\n"),
                ("docs/a.md", "# A\n"),
                ("docs/.meta.json", "{}"),
                ("docs/_/old.md", "# Old\n"),
                ("docs/node_modules/x.js", ""),
                ("docs/guide/index.md", "# Guide\n"),
            ],
            config,
        );
        let docs = ctx.directory("docs");

        assert_eq!(block_on_test(docs.directory_names()).unwrap(), vec!["guide"]);
        assert_eq!(
            block_on_test(docs.file_names()).unwrap(),
            vec!["a.md", "b.md", "index.md"]
        );
    }

    #[test]
    fn test_md_files_lists_normal_then_archived() {
        let ctx = context(
            &[
                ("docs/index.md", "# Docs\n"),
                ("docs/b.md", "# B\n"),
                ("docs/_/a.md", "# A\n"),
                ("docs/data.json", "{}"),
            ],
            Config::default(),
        );
        let files = block_on_test(ctx.directory("docs").md_files()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("docs/b.md"), PathBuf::from("docs/_/a.md")]
        );
        assert!(files[1].is_archived());

        let doc = block_on_test(files[1].read()).unwrap();
        assert!(doc.is_archived());
    }

    #[test]
    fn test_unknown_files() {
        let ctx = context(
            &[("docs/a.md", ""), ("docs/data.json", "{}"), ("docs/img.png", "")],
            Config::default(),
        );
        let unknown = block_on_test(ctx.directory("docs").unknown_files()).unwrap();
        let names: Vec<_> = unknown.iter().map(|f| f.file_path().name_with_extension).collect();
        assert_eq!(names, vec!["data.json", "img.png"]);
    }

    #[test]
    fn test_navigation() {
        let ctx = context(&[("a/b/c.md", "")], Config::default());
        let b = ctx.directory("a/b");
        assert_eq!(b.name(), "b");
        assert_eq!(b.parent().unwrap().path(), Path::new("a"));
        assert_eq!(b.child("d").path(), Path::new("a/b/d"));
        assert_eq!(b.index_file().path(), Path::new("a/b/index.md"));
        assert!(block_on_test(b.exists()));
        assert!(!block_on_test(b.child("d").exists()));
    }

    #[test]
    fn test_listing_missing_directory_is_not_found() {
        let ctx = context(&[], Config::default());
        let err = block_on_test(ctx.directory("nope").entries()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_directory() {
        let ctx = context(&[], Config::default());
        let dir = ctx.directory("new/sub");
        block_on_test(dir.create()).unwrap();
        assert!(block_on_test(dir.exists()));
        assert!(block_on_test(dir.entries()).unwrap().is_empty());
    }
}
