use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Context, DirectoryRef};
use crate::error::Result;

/// One selectable target of a relation field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationFile {
    /// The file stem, which is the id stored in relation fields.
    pub name: String,
    /// The document's H1 title, or its name when it has none.
    pub label: String,
    /// Same as `name`; the value written to frontmatter when selected.
    pub value: String,
    pub path: PathBuf,
}

/// Every possible target of relation fields pointing at one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub path: PathBuf,
    pub files: Vec<RelationFile>,
}

impl Relation {
    /// Returns true if `id` names one of the files.
    pub fn contains(&self, id: &str) -> bool {
        self.files.iter().any(|f| f.name == id)
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Reference to a directory whose markdown files are relation targets.
///
/// Archived files and the index are not targets.
#[derive(Debug, Clone)]
pub struct RelationDirectoryRef {
    ctx: Context,
    path: PathBuf,
}

impl RelationDirectoryRef {
    pub fn new(ctx: Context, path: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> DirectoryRef {
        DirectoryRef::new(self.ctx.clone(), self.path.clone())
    }

    /// Read every target with its label.
    pub async fn relation(&self) -> Result<Relation> {
        let mut files = Vec::new();
        for file in self.directory().active_md_files().await? {
            let document = file.read().await?;
            let name = document.path().name.clone();
            files.push(RelationFile {
                label: document.title().unwrap_or_else(|| name.clone()),
                value: name.clone(),
                name,
                path: file.path().to_path_buf(),
            });
        }
        Ok(Relation {
            path: self.path.clone(),
            files,
        })
    }

    /// Returns true if a target with this id exists.
    pub async fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.slugs().await?.iter().any(|slug| slug == id))
    }

    /// The ids of every target, without reading the files.
    pub async fn slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .directory()
            .active_md_files()
            .await?
            .iter()
            .map(|file| file.slug())
            .collect())
    }
}
