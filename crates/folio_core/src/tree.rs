//! File tree building.
//!
//! Walks a directory through the reference layer and produces a tree for
//! navigation UIs. Directories come first, then files, each group sorted by
//! name. Index files never appear as file nodes: their title and icon belong to
//! the directory node instead. The build is fail-fast, so an unreadable file or
//! directory at any depth aborts it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::reference::{Context, DirectoryEntry, FileKind, classify};
use crate::storage::BoxFuture;

/// Icon shown for every file node.
pub const FILE_ICON: &str = "📄";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub path: PathBuf,
    pub icon: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub path: PathBuf,
    pub icon: String,
    pub title: String,
    pub children: Vec<TreeNode>,
}

/// A node of the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File(FileNode),
    Directory(DirectoryNode),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(node) => &node.name,
            TreeNode::Directory(node) => &node.name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            TreeNode::File(node) => &node.path,
            TreeNode::Directory(node) => &node.path,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            TreeNode::File(node) => &node.title,
            TreeNode::Directory(node) => &node.title,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            TreeNode::File(node) => &node.icon,
            TreeNode::Directory(node) => &node.icon,
        }
    }

    /// Child nodes; always empty for files.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File(_) => &[],
            TreeNode::Directory(node) => &node.children,
        }
    }
}

/// Builds trees below a directory of a [`Context`].
#[derive(Debug, Clone)]
pub struct FileTreeBuilder {
    ctx: Context,
}

impl FileTreeBuilder {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Every visible directory and file below `dir`.
    pub async fn build_file_tree(&self, dir: &Path) -> Result<Vec<TreeNode>> {
        self.file_tree(dir.to_path_buf()).await
    }

    /// Only the directories below `dir`.
    pub async fn build_directory_tree(&self, dir: &Path) -> Result<Vec<DirectoryNode>> {
        self.directory_tree(dir.to_path_buf()).await
    }

    fn file_tree<'a>(&'a self, dir: PathBuf) -> BoxFuture<'a, Result<Vec<TreeNode>>> {
        Box::pin(async move {
            let entries = self.ctx.directory(dir).entries().await?;

            let mut directories = Vec::new();
            let mut files = Vec::new();
            for entry in entries {
                if entry.is_directory {
                    let mut node = self.directory_node(&entry).await?;
                    node.children = self.file_tree(entry.path.clone()).await?;
                    directories.push(TreeNode::Directory(node));
                } else if classify(&entry.path, self.ctx.config()) != FileKind::Index {
                    files.push(TreeNode::File(self.file_node(&entry).await?));
                }
            }

            directories.extend(files);
            Ok(directories)
        })
    }

    fn directory_tree<'a>(&'a self, dir: PathBuf) -> BoxFuture<'a, Result<Vec<DirectoryNode>>> {
        Box::pin(async move {
            let entries = self.ctx.directory(dir).entries().await?;

            let mut directories = Vec::new();
            for entry in entries.into_iter().filter(|e| e.is_directory) {
                let mut node = self.directory_node(&entry).await?;
                node.children = self
                    .directory_tree(entry.path.clone())
                    .await?
                    .into_iter()
                    .map(TreeNode::Directory)
                    .collect();
                directories.push(node);
            }
            Ok(directories)
        })
    }

    async fn directory_node(&self, entry: &DirectoryEntry) -> Result<DirectoryNode> {
        let config = self.ctx.config();
        let index = self
            .ctx
            .index_file(entry.path.join(&config.index_file_name))
            .read()
            .await?;

        Ok(DirectoryNode {
            name: entry.name.clone(),
            path: entry.path.clone(),
            icon: index
                .icon()
                .map(String::from)
                .unwrap_or_else(|| config.default_index_icon.clone()),
            title: index.title().unwrap_or_else(|| entry.name.clone()),
            children: Vec::new(),
        })
    }

    async fn file_node(&self, entry: &DirectoryEntry) -> Result<FileNode> {
        let title = match classify(&entry.path, self.ctx.config()) {
            FileKind::Markdown => {
                let document = self.ctx.markdown_file(entry.path.clone()).read().await?;
                document
                    .meta()
                    .raw("title")
                    .and_then(|v| v.as_str().map(str::trim).map(String::from))
                    .filter(|t| !t.is_empty())
                    .or_else(|| document.title())
                    .unwrap_or_else(|| document.path().name.clone())
            }
            FileKind::Index | FileKind::Unknown => entry.name.clone(),
        };

        Ok(FileNode {
            name: entry.name.clone(),
            path: entry.path.clone(),
            icon: FILE_ICON.to_string(),
            title,
        })
    }
}

/// Render nodes like the `tree` command, one `icon title` per line.
pub fn format_tree(nodes: &[TreeNode]) -> String {
    let mut result = String::new();
    format_nodes(nodes, "", &mut result);
    result
}

fn format_nodes(nodes: &[TreeNode], prefix: &str, result: &mut String) {
    let count = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == count - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last { "    " } else { "│   " };

        result.push_str(prefix);
        result.push_str(connector);
        result.push_str(node.icon());
        result.push(' ');
        result.push_str(node.title());
        result.push('\n');

        format_nodes(
            node.children(),
            &format!("{}{}", prefix, child_prefix),
            result,
        );
    }
}
